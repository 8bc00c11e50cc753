//! Key-value cache for upstream responses.
//!
//! Values are stored as JSON in the `cache_entries` table with an absolute
//! expiry. Expired or undecodable entries behave as misses.

use rusqlite::Connection;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::db::queries;
use crate::error::{AppError, Result};

/// Build a cache key from a prefix and the request parts that identify it.
///
/// Free-form input (search queries) is hashed so keys stay short and safe.
pub fn cache_key(prefix: &str, parts: &[&str]) -> String {
    let digest = Sha256::digest(parts.join("_").as_bytes());
    format!("{}_{}", prefix, hex::encode(digest))
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// SQLite-backed response cache.
#[derive(Clone)]
pub struct ResponseCache {
    db: Arc<Mutex<Connection>>,
}

impl ResponseCache {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    /// Fetch a live entry.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let db = self.db.lock().await;
        let Some(row) = queries::cache_get(&db, key)? else {
            return Ok(None);
        };

        if row.is_expired(now()) {
            return Ok(None);
        }

        match serde_json::from_str(&row.value) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Dropping undecodable cache entry");
                queries::cache_delete(&db, key)?;
                Ok(None)
            }
        }
    }

    /// Store a value for `ttl`.
    pub async fn put<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let json = serde_json::to_string(value).map_err(|e| {
            AppError::Internal(format!("Failed to encode cache entry {}: {}", key, e))
        })?;
        let now = now();
        let expires_at = now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX));

        let db = self.db.lock().await;
        queries::cache_put(&db, key, &json, expires_at, now)?;
        tracing::trace!(key = %key, ttl_secs = ttl.as_secs(), "Cached value");
        Ok(())
    }

    /// Remove an entry. Returns whether something was removed.
    pub async fn forget(&self, key: &str) -> Result<bool> {
        let db = self.db.lock().await;
        Ok(queries::cache_delete(&db, key)? > 0)
    }

    /// Delete every expired entry.
    pub async fn purge_expired(&self) -> Result<usize> {
        let db = self.db.lock().await;
        Ok(queries::cache_purge_expired(&db, now())?)
    }

    /// Number of stored entries, live or expired.
    pub async fn len(&self) -> Result<i64> {
        let db = self.db.lock().await;
        Ok(queries::cache_count(&db)?)
    }

    /// Return the cached value for `key`, or compute, store and return it.
    ///
    /// Only successful results are stored. A cache read or write failure is
    /// logged and does not fail the request.
    pub async fn remember<T, F, Fut>(&self, key: &str, ttl: Duration, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.get(key).await {
            Ok(Some(hit)) => {
                tracing::debug!(key = %key, "Cache hit");
                return Ok(hit);
            }
            Ok(None) => tracing::debug!(key = %key, "Cache miss"),
            Err(e) => tracing::warn!(key = %key, error = %e, "Cache read failed"),
        }

        let value = compute().await?;

        if let Err(e) = self.put(key, &value, ttl).await {
            tracing::warn!(key = %key, error = %e, "Cache write failed");
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db_memory;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache() -> ResponseCache {
        ResponseCache::new(Arc::new(Mutex::new(init_db_memory().unwrap())))
    }

    #[test]
    fn test_cache_key_is_stable_and_prefixed() {
        let a = cache_key("movie_search", &["matrix", "1"]);
        let b = cache_key("movie_search", &["matrix", "1"]);
        let c = cache_key("movie_search", &["matrix", "2"]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("movie_search_"));
        assert_eq!(a.len(), "movie_search_".len() + 64);
    }

    #[tokio::test]
    async fn test_put_get_forget() {
        let cache = cache();
        cache
            .put("k", &vec![1, 2, 3], Duration::from_secs(60))
            .await
            .unwrap();

        let hit: Option<Vec<i32>> = cache.get("k").await.unwrap();
        assert_eq!(hit, Some(vec![1, 2, 3]));

        assert!(cache.forget("k").await.unwrap());
        assert!(!cache.forget("k").await.unwrap());
        let miss: Option<Vec<i32>> = cache.get("k").await.unwrap();
        assert_eq!(miss, None);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_immediately_expired() {
        let cache = cache();
        cache.put("k", &"v", Duration::ZERO).await.unwrap();

        let hit: Option<String> = cache.get("k").await.unwrap();
        assert_eq!(hit, None);
        assert_eq!(cache.purge_expired().await.unwrap(), 1);
        assert_eq!(cache.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let cache = cache();
        cache.put("k", &"not a number", Duration::from_secs(60)).await.unwrap();

        let hit: Option<u32> = cache.get("k").await.unwrap();
        assert_eq!(hit, None);
        assert_eq!(cache.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remember_computes_once() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: String = cache
                .remember("k", Duration::from_secs(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("computed".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value, "computed");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remember_does_not_cache_errors() {
        let cache = cache();

        let failed: Result<String> = cache
            .remember("k", Duration::from_secs(60), || async {
                Err(AppError::Upstream("down".to_string()))
            })
            .await;
        assert!(failed.is_err());
        assert_eq!(cache.len().await.unwrap(), 0);

        let value: String = cache
            .remember("k", Duration::from_secs(60), || async { Ok("ok".to_string()) })
            .await
            .unwrap();
        assert_eq!(value, "ok");
    }
}
