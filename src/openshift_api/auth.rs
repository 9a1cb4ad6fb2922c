use crate::cache::{CachedToken, TokenCache, TOKEN_CACHE_KEY};
use crate::openshift_api::types::{OpenShiftConfig, TokenGrant};
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, RwLock};

/// Validity window assumed when the token endpoint omits `expiresIn`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 86_400;

/// A short-lived bearer token and its expiry
#[derive(Debug, Clone)]
pub struct BearerToken {
    /// The token string sent as `Authorization: Bearer <value>`
    pub value: String,
    /// Instant after which the token must not be used
    pub expires_at: DateTime<Utc>,
}

impl BearerToken {
    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Owns the bearer token, its expiration, and the refresh protocol
///
/// Token exchange is a network round trip and the token is valid for a
/// bounded window, so lookups go memory first, shared cache second, and
/// only hit the identity endpoint when both are stale. Concurrent callers
/// may race into a redundant exchange; the overwrite is idempotent and the
/// design deliberately avoids cross-process locking.
pub struct TokenManager {
    origin: String,
    secret: String,
    http: reqwest::Client,
    cache: Arc<dyn TokenCache>,
    current: RwLock<Option<BearerToken>>,
}

impl TokenManager {
    /// Create a token manager over the given HTTP client and cache
    pub fn new(
        config: &OpenShiftConfig,
        http: reqwest::Client,
        cache: Arc<dyn TokenCache>,
    ) -> Self {
        Self {
            origin: config.origin().to_string(),
            secret: config.api_secret.clone(),
            http,
            cache,
            current: RwLock::new(None),
        }
    }

    /// Return a bearer token that is valid right now, refreshing if needed
    ///
    /// Returns `None` when no token can be obtained; the caller decides
    /// whether to proceed unauthenticated or abort. The in-memory check is
    /// lock-guarded so a reader never observes a partially written token;
    /// the lock is released before any I/O.
    pub async fn get_valid_token(&self) -> Option<String> {
        if let Ok(current) = self.current.read() {
            if let Some(token) = current.as_ref() {
                if !token.is_expired() {
                    return Some(token.value.clone());
                }
            }
        }

        match self.cache.get(TOKEN_CACHE_KEY).await {
            Ok(Some(cached)) => {
                // Staleness is judged by the embedded expiration, never by
                // whether the cache still holds the entry
                if Utc::now().timestamp() < cached.access_expiration_time {
                    if let Some(expires_at) =
                        DateTime::from_timestamp(cached.access_expiration_time, 0)
                    {
                        tracing::debug!("Adopting unexpired bearer token from shared cache");
                        let token = BearerToken {
                            value: cached.access_token,
                            expires_at,
                        };
                        let value = token.value.clone();
                        if let Ok(mut slot) = self.current.write() {
                            *slot = Some(token);
                        }
                        return Some(value);
                    }
                }
                tracing::debug!("Cached bearer token is stale, exchanging a new one");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Token cache lookup failed, treating as a miss: {}", e);
            }
        }

        if !self.refresh().await {
            return None;
        }
        self.current
            .read()
            .ok()
            .and_then(|slot| slot.as_ref().map(|token| token.value.clone()))
    }

    /// Exchange the configured secret for a fresh bearer token
    ///
    /// Returns `false` on any transport or non-success outcome; the
    /// manager degrades gracefully rather than raising, and the next
    /// `get_valid_token` call retries via re-fetch.
    pub async fn refresh(&self) -> bool {
        let url = format!("{}/v2/token", self.origin);
        tracing::debug!("Exchanging credentials for a bearer token at {}", url);

        let result = self
            .http
            .post(&url)
            .header("Authorization", format!("Basic {}", self.secret))
            .header("Content-Type", "application/json")
            .header("Cache-Control", "no-cache")
            .body(r#"{"grant_type": "client_credentials"}"#)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Token exchange transport failure: {}", e);
                return false;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                "Token exchange rejected: HTTP {} - {}",
                status.as_u16(),
                body
            );
            return false;
        }

        let grant: TokenGrant = match response.json().await {
            Ok(grant) => grant,
            Err(e) => {
                tracing::warn!("Token exchange returned an undecodable body: {}", e);
                return false;
            }
        };

        let expires_in = grant.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        let expires_at = Utc::now() + Duration::seconds(expires_in);
        let token = BearerToken {
            value: grant.access_token.unwrap_or_default(),
            expires_at,
        };

        tracing::info!(
            "Bearer token refreshed, valid until {}",
            expires_at.format("%Y-%m-%dT%H:%M:%SZ")
        );

        if let Ok(mut slot) = self.current.write() {
            *slot = Some(token.clone());
        }

        let cached = CachedToken {
            access_token: token.value,
            access_expiration_time: expires_at.timestamp(),
        };
        // No entry TTL: the cache may evict at will, freshness lives in the
        // stored expiration field
        if let Err(e) = self.cache.set(TOKEN_CACHE_KEY, cached).await {
            tracing::warn!("Failed to persist bearer token to shared cache: {}", e);
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_expiry() {
        let expired = BearerToken {
            value: "tok".to_string(),
            expires_at: Utc::now() - Duration::seconds(60),
        };
        assert!(expired.is_expired());

        let valid = BearerToken {
            value: "tok".to_string(),
            expires_at: Utc::now() + Duration::seconds(60),
        };
        assert!(!valid.is_expired());
    }
}
