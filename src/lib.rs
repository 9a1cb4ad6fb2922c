//! OpenShift SDK
//!
//! A Rust library for working with the OpenShift cluster management REST
//! API.
//!
//! This SDK provides:
//! - A bearer token lifecycle manager that exchanges a long-lived secret
//!   for a short-lived token, caches it in-process and in a shared token
//!   cache, and refreshes it transparently on expiry
//! - A resource dispatcher for build configs, builds, image streams and
//!   secrets, with per-kind default payloads and merge-patch update
//!   semantics
//! - Structural validation of JSON Web Token secrets (encoding and
//!   required claims, no signature verification)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use openshift_sdk::{
//!     validate_jwt, MemoryTokenCache, OpenShiftClient, OpenShiftConfig, ResourceKind,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OpenShiftConfig::new()
//!     .with_api_origin("https://openshift.example.com:8443")
//!     .with_api_secret("c2VjcmV0");
//!
//! // Warn the operator about a malformed service-account token
//! for error in validate_jwt(&config.api_secret) {
//!     eprintln!("{}", error);
//! }
//!
//! let client = OpenShiftClient::new(config, Arc::new(MemoryTokenCache::new()))?;
//!
//! let created = client
//!     .create(
//!         "proj1",
//!         ResourceKind::BuildConfig,
//!         json!({"metadata": {"name": "my-buildconfig"}}),
//!         true,
//!     )
//!     .await?;
//! assert!(created);
//!
//! let builds = client.list("proj1", ResourceKind::Build).await?;
//! println!("{} builds", builds.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod openshift_api;

// Re-export commonly used types and functions
pub use cache::{CacheError, CachedToken, MemoryTokenCache, TokenCache, TOKEN_CACHE_KEY};
pub use openshift_api::{
    auth::{BearerToken, TokenManager},
    client::OpenShiftClient,
    jwt::{validate_jwt, JwtValidationError},
    resources::ResourceKind,
    types::{ApiError, OpenShiftConfig, OpenShiftError},
};
