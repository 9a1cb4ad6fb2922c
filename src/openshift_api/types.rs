use serde::Deserialize;
use std::fmt;

/// Default API origin when none is configured.
pub const DEFAULT_API_ORIGIN: &str = "https://openshift.redhat.com:8443";

/// Configuration for the OpenShift API client
///
/// All settings are passed explicitly to the client and token manager
/// constructors; there are no process-wide lookups.
#[derive(Debug, Clone)]
pub struct OpenShiftConfig {
    /// Base origin URL for all API requests (scheme + host + optional port)
    pub api_origin: String,
    /// The base64 encoded secret exchanged for a bearer token. Never logged.
    pub api_secret: String,
    /// Whether TLS certificate validation is enforced
    pub verify_cert: bool,
    /// Enables diagnostic logging of every request/response pair
    pub debug: bool,
    /// The calling application's own base URL, sent as the `Origin` header
    /// on read-style queries when set
    pub app_origin: Option<String>,
}

impl Default for OpenShiftConfig {
    fn default() -> Self {
        Self {
            api_origin: DEFAULT_API_ORIGIN.to_string(),
            api_secret: String::new(),
            verify_cert: true,
            debug: false,
            app_origin: None,
        }
    }
}

impl OpenShiftConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API origin (builder pattern)
    pub fn with_api_origin(mut self, origin: impl Into<String>) -> Self {
        self.api_origin = origin.into();
        self
    }

    /// Set the API secret (builder pattern)
    pub fn with_api_secret(mut self, secret: impl Into<String>) -> Self {
        self.api_secret = secret.into();
        self
    }

    /// Set TLS certificate verification (builder pattern)
    pub fn with_verify_cert(mut self, verify: bool) -> Self {
        self.verify_cert = verify;
        self
    }

    /// Set diagnostic logging (builder pattern)
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the application origin sent on read queries (builder pattern)
    pub fn with_app_origin(mut self, origin: impl Into<String>) -> Self {
        self.app_origin = Some(origin.into());
        self
    }

    /// The configured origin with any trailing slash removed
    pub fn origin(&self) -> &str {
        self.api_origin.trim_end_matches('/')
    }
}

/// OpenShift SDK error type
///
/// Represents all possible errors that can occur when interacting with
/// the OpenShift API or performing related operations.
#[derive(Debug)]
pub enum OpenShiftError {
    /// API request failed (network, HTTP, or response parsing error)
    Api(ApiError),
    /// Configuration error (bad origin URL, client construction failure)
    Config(String),
}

impl fmt::Display for OpenShiftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenShiftError::Api(err) => write!(f, "API error: {}", err),
            OpenShiftError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for OpenShiftError {}

impl From<ApiError> for OpenShiftError {
    fn from(err: ApiError) -> Self {
        OpenShiftError::Api(err)
    }
}

/// API-specific errors
#[derive(Debug)]
pub enum ApiError {
    /// Network error, no response was received (connection, DNS, timeout)
    Network(String),
    /// HTTP error with status code
    Http { status: u16, message: String },
    /// Failed to parse response
    Parse(String),
    /// Request building failed
    Request(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Http { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            ApiError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ApiError::Request(msg) => write!(f, "Request error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timeout".to_string())
        } else if err.is_connect() {
            ApiError::Network(format!("Connection failed: {}", err))
        } else if let Some(status) = err.status() {
            ApiError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Successful response body from the token exchange endpoint
#[derive(Debug, Deserialize)]
pub struct TokenGrant {
    /// The issued bearer token; the endpoint may omit it on odd responses
    #[serde(default)]
    pub access_token: Option<String>,
    /// Validity window in seconds; defaults to a day when absent
    #[serde(rename = "expiresIn", default)]
    pub expires_in: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OpenShiftConfig::default();
        assert_eq!(config.api_origin, DEFAULT_API_ORIGIN);
        assert!(config.api_secret.is_empty());
        assert!(config.verify_cert);
        assert!(!config.debug);
        assert!(config.app_origin.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = OpenShiftConfig::new()
            .with_api_origin("https://api.example.com:8443/")
            .with_api_secret("c2VjcmV0")
            .with_verify_cert(false)
            .with_debug(true)
            .with_app_origin("https://app.example.com");

        assert_eq!(config.origin(), "https://api.example.com:8443");
        assert_eq!(config.api_secret, "c2VjcmV0");
        assert!(!config.verify_cert);
        assert!(config.debug);
        assert_eq!(config.app_origin.as_deref(), Some("https://app.example.com"));
    }

    #[test]
    fn test_token_grant_deserialization() {
        let grant: TokenGrant =
            serde_json::from_str(r#"{"access_token":"tok123","expiresIn":3600}"#).unwrap();
        assert_eq!(grant.access_token.as_deref(), Some("tok123"));
        assert_eq!(grant.expires_in, Some(3600));

        // Both fields are optional on the wire
        let bare: TokenGrant = serde_json::from_str("{}").unwrap();
        assert!(bare.access_token.is_none());
        assert!(bare.expires_in.is_none());
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Http {
            status: 403,
            message: "Forbidden".to_string(),
        };
        assert!(err.to_string().contains("403"));

        let err = ApiError::Network("Connection refused".to_string());
        assert!(err.to_string().contains("Network error"));
    }
}
