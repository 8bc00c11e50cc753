//! API key rotation.
//!
//! Keys come from configuration (comma-separated) and from active rows of the
//! `api_configurations` table. Each key may be paired with its own outbound
//! proxy, so every key carries its own HTTP client. Requests pick keys
//! round-robin.

use reqwest::{Client, Proxy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{AppError, Result};

/// One API key and the HTTP client that must be used with it.
pub struct ApiKeyEntry {
    key: String,
    proxy: Option<String>,
    client: Client,
}

impl ApiKeyEntry {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

// Custom Debug implementation to avoid exposing the key
impl std::fmt::Debug for ApiKeyEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyEntry")
            .field("key", &"[REDACTED]")
            .field("proxy", &self.proxy)
            .finish()
    }
}

/// Round-robin pool of API keys.
#[derive(Debug)]
pub struct KeyPool {
    entries: Vec<ApiKeyEntry>,
    cursor: AtomicUsize,
    timeout: Duration,
}

impl KeyPool {
    /// Create an empty pool. Entries are added with [`KeyPool::push`].
    pub fn new(timeout: Duration) -> Self {
        Self {
            entries: Vec::new(),
            cursor: AtomicUsize::new(0),
            timeout,
        }
    }

    /// Build a pool from comma-separated keys and proxies.
    ///
    /// Proxy *i* belongs to key *i*. A missing, empty or `none` proxy means a
    /// direct connection.
    pub fn from_csv(keys: &str, proxies: Option<&str>, timeout: Duration) -> Result<Self> {
        let proxies: Vec<&str> = proxies
            .map(|p| p.split(',').map(str::trim).collect())
            .unwrap_or_default();

        let mut pool = Self::new(timeout);
        for (index, key) in keys.split(',').enumerate() {
            pool.push(key, proxies.get(index).copied())?;
        }

        pool.ensure_not_empty()?;
        Ok(pool)
    }

    /// Add a key. Returns `false` when the key is blank or already present.
    pub fn push(&mut self, key: &str, proxy: Option<&str>) -> Result<bool> {
        let key = key.trim();
        if key.is_empty() || self.entries.iter().any(|e| e.key == key) {
            return Ok(false);
        }

        let proxy = proxy.and_then(normalize_proxy);
        let client = build_client(proxy.as_deref(), self.timeout)?;

        self.entries.push(ApiKeyEntry {
            key: key.to_string(),
            proxy,
            client,
        });
        Ok(true)
    }

    pub fn ensure_not_empty(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(AppError::Internal("API key cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Next key in rotation.
    pub fn next(&self) -> Result<&ApiKeyEntry> {
        if self.entries.is_empty() {
            return Err(AppError::Internal("No API keys available".to_string()));
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.entries.len();
        Ok(&self.entries[index])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_proxy(proxy: &str) -> Option<String> {
    let proxy = proxy.trim();
    if proxy.is_empty() || proxy.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(proxy.to_string())
    }
}

fn build_client(proxy: Option<&str>, timeout: Duration) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout);

    if let Some(url) = proxy {
        let proxy = Proxy::all(url)
            .map_err(|e| AppError::Internal(format!("Invalid proxy '{}': {}", url, e)))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))
}
