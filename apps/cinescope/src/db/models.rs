//! Row types for the Cinescope database.

/// Raw cache row: a JSON document and its absolute expiry (unix seconds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRow {
    pub value: String,
    pub expires_at: i64,
}

impl CacheRow {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// An API key stored in `api_configurations`.
#[derive(Clone)]
pub struct ApiConfiguration {
    pub id: i64,
    pub service: String,
    pub api_key: String,
    pub proxy: Option<String>,
    pub active: bool,
}

// Custom Debug implementation to avoid exposing api_key
impl std::fmt::Debug for ApiConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfiguration")
            .field("id", &self.id)
            .field("service", &self.service)
            .field("api_key", &"[REDACTED]")
            .field("proxy", &self.proxy)
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_row_expiry_boundary() {
        let row = CacheRow {
            value: "{}".to_string(),
            expires_at: 100,
        };
        assert!(!row.is_expired(99));
        assert!(row.is_expired(100));
    }

    #[test]
    fn test_api_configuration_debug_redacts_key() {
        let cfg = ApiConfiguration {
            id: 1,
            service: "tmdb".to_string(),
            api_key: "secret-key".to_string(),
            proxy: None,
            active: true,
        };
        assert!(!format!("{:?}", cfg).contains("secret-key"));
    }
}
