//! SQL queries used by the cache and key rotation services.

use rusqlite::{params, Connection, OptionalExtension};

use super::models::{ApiConfiguration, CacheRow};

pub fn cache_get(conn: &Connection, key: &str) -> rusqlite::Result<Option<CacheRow>> {
    conn.query_row(
        "SELECT value, expires_at FROM cache_entries WHERE key = ?1",
        [key],
        |row| {
            Ok(CacheRow {
                value: row.get(0)?,
                expires_at: row.get(1)?,
            })
        },
    )
    .optional()
}

pub fn cache_put(
    conn: &Connection,
    key: &str,
    value: &str,
    expires_at: i64,
    now: i64,
) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        INSERT INTO cache_entries (key, value, expires_at, created_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            expires_at = excluded.expires_at,
            created_at = excluded.created_at
        "#,
        params![key, value, expires_at, now],
    )?;
    Ok(())
}

pub fn cache_delete(conn: &Connection, key: &str) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM cache_entries WHERE key = ?1", [key])
}

pub fn cache_purge_expired(conn: &Connection, now: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM cache_entries WHERE expires_at <= ?1", [now])
}

pub fn cache_count(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))
}

/// Active keys for a service, oldest first so rotation order is stable.
pub fn active_api_configurations(
    conn: &Connection,
    service: &str,
) -> rusqlite::Result<Vec<ApiConfiguration>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, service, api_key, proxy, active
        FROM api_configurations
        WHERE service = ?1 AND active = 1
        ORDER BY id
        "#,
    )?;

    let rows = stmt.query_map([service], |row| {
        Ok(ApiConfiguration {
            id: row.get(0)?,
            service: row.get(1)?,
            api_key: row.get(2)?,
            proxy: row.get(3)?,
            active: row.get(4)?,
        })
    })?;

    rows.collect()
}

pub fn insert_api_configuration(
    conn: &Connection,
    service: &str,
    api_key: &str,
    proxy: Option<&str>,
) -> rusqlite::Result<i64> {
    conn.execute(
        r#"
        INSERT INTO api_configurations (service, api_key, proxy)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(service, api_key) DO UPDATE SET
            proxy = excluded.proxy,
            active = 1,
            updated_at = datetime('now')
        "#,
        params![service, api_key, proxy],
    )?;
    conn.query_row(
        "SELECT id FROM api_configurations WHERE service = ?1 AND api_key = ?2",
        params![service, api_key],
        |row| row.get(0),
    )
}

pub fn deactivate_api_configuration(
    conn: &Connection,
    service: &str,
    api_key: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE api_configurations SET active = 0, updated_at = datetime('now')
         WHERE service = ?1 AND api_key = ?2",
        params![service, api_key],
    )
}
