use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;

/// Cache entry key under which the bearer token is persisted.
pub const TOKEN_CACHE_KEY: &str = "openshift_api";

/// Persisted form of a bearer token
///
/// Entries are written with no expiry of their own; the cache may evict at
/// will, and staleness is judged by comparing `access_expiration_time` to
/// the current time, never by cache eviction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedToken {
    /// The bearer token string
    pub access_token: String,
    /// Unix timestamp after which the token must not be used
    pub access_expiration_time: i64,
}

/// Token cache trait for sharing bearer tokens across processes
///
/// This trait abstracts the cache store to allow for different
/// implementations (in-memory, memcached, database, etc.)
pub trait TokenCache: Send + Sync {
    /// Look up a cached token by key
    fn get(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<CachedToken>, CacheError>> + Send + '_>>;

    /// Store a token under the given key, overwriting any existing entry
    fn set(
        &self,
        key: &str,
        token: CachedToken,
    ) -> Pin<Box<dyn Future<Output = Result<(), CacheError>> + Send + '_>>;

    /// Remove the entry at the given key, if present
    fn remove(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), CacheError>> + Send + '_>>;
}

/// Cache errors
#[derive(Debug)]
pub enum CacheError {
    /// The cache backend could not be reached
    Backend(String),
    /// Stored data could not be decoded
    Decode(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Backend(msg) => write!(f, "Cache backend error: {}", msg),
            CacheError::Decode(msg) => write!(f, "Cache decode error: {}", msg),
        }
    }
}

impl std::error::Error for CacheError {}

/// In-process token cache
///
/// Suitable for single-process deployments and tests. Multi-process
/// deployments should implement [`TokenCache`] over a shared store so
/// that concurrent workers do not each perform their own token exchange.
#[derive(Default)]
pub struct MemoryTokenCache {
    entries: RwLock<HashMap<String, CachedToken>>,
}

impl MemoryTokenCache {
    /// Create an empty in-process cache
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenCache for MemoryTokenCache {
    fn get(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<CachedToken>, CacheError>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            let entries = self
                .entries
                .read()
                .map_err(|e| CacheError::Backend(format!("Cache lock poisoned: {}", e)))?;
            Ok(entries.get(&key).cloned())
        })
    }

    fn set(
        &self,
        key: &str,
        token: CachedToken,
    ) -> Pin<Box<dyn Future<Output = Result<(), CacheError>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut entries = self
                .entries
                .write()
                .map_err(|e| CacheError::Backend(format!("Cache lock poisoned: {}", e)))?;
            entries.insert(key, token);
            Ok(())
        })
    }

    fn remove(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), CacheError>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut entries = self
                .entries
                .write()
                .map_err(|e| CacheError::Backend(format!("Cache lock poisoned: {}", e)))?;
            entries.remove(&key);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_cache_roundtrip() {
        let cache = MemoryTokenCache::new();
        assert!(cache.get(TOKEN_CACHE_KEY).await.unwrap().is_none());

        let token = CachedToken {
            access_token: "tok123".to_string(),
            access_expiration_time: 1_900_000_000,
        };
        cache.set(TOKEN_CACHE_KEY, token.clone()).await.unwrap();

        let loaded = cache.get(TOKEN_CACHE_KEY).await.unwrap();
        assert_eq!(loaded, Some(token));

        cache.remove(TOKEN_CACHE_KEY).await.unwrap();
        assert!(cache.get(TOKEN_CACHE_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_overwrites() {
        let cache = MemoryTokenCache::new();
        cache
            .set(
                TOKEN_CACHE_KEY,
                CachedToken {
                    access_token: "first".to_string(),
                    access_expiration_time: 100,
                },
            )
            .await
            .unwrap();
        cache
            .set(
                TOKEN_CACHE_KEY,
                CachedToken {
                    access_token: "second".to_string(),
                    access_expiration_time: 200,
                },
            )
            .await
            .unwrap();

        let loaded = cache.get(TOKEN_CACHE_KEY).await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "second");
        assert_eq!(loaded.access_expiration_time, 200);
    }

    #[test]
    fn test_cached_token_wire_names() {
        let token = CachedToken {
            access_token: "tok".to_string(),
            access_expiration_time: 1234,
        };
        let json = serde_json::to_string(&token).unwrap();
        assert!(json.contains("\"accessToken\":\"tok\""));
        assert!(json.contains("\"accessExpirationTime\":1234"));
    }
}
