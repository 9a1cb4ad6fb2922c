use crate::cache::TokenCache;
use crate::openshift_api::auth::TokenManager;
use crate::openshift_api::resources::{
    apply_build_request_defaults, empty_descriptor, list_items, normalize_patch, ResourceKind,
};
use crate::openshift_api::types::{ApiError, OpenShiftConfig, OpenShiftError};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

/// Media type for partial updates; distinct from plain JSON so the server
/// applies merge-patch semantics.
const MERGE_PATCH_CONTENT_TYPE: &str = "application/strategic-merge-patch+json";

/// Outcome of a request that actually reached the server
///
/// A transport failure (no response received) never produces one of these;
/// it surfaces as an error from the send path instead. All status
/// classification (success signals, 404 softening) operates on this
/// value.
#[derive(Debug)]
struct HttpExchange {
    status: u16,
    body: String,
}

impl HttpExchange {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client for the OpenShift cluster management API
///
/// Dispatches CRUD operations for a resource kind within a project,
/// applying per-kind default payloads on create and merge-patch semantics
/// on update. Holds the transport and the token manager by composition;
/// every operation asks the manager for a current bearer token before
/// sending.
pub struct OpenShiftClient {
    config: OpenShiftConfig,
    http: reqwest::Client,
    auth: TokenManager,
}

impl OpenShiftClient {
    /// Create a new client from an explicit configuration and token cache
    ///
    /// Fails when the configured origin is not a valid URL or the HTTP
    /// client cannot be constructed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use openshift_sdk::{MemoryTokenCache, OpenShiftClient, OpenShiftConfig};
    ///
    /// let config = OpenShiftConfig::new()
    ///     .with_api_origin("https://openshift.example.com:8443")
    ///     .with_api_secret("c2VjcmV0");
    /// let client = OpenShiftClient::new(config, Arc::new(MemoryTokenCache::new())).unwrap();
    /// ```
    pub fn new(
        config: OpenShiftConfig,
        cache: Arc<dyn TokenCache>,
    ) -> Result<Self, OpenShiftError> {
        url::Url::parse(config.origin())
            .map_err(|e| OpenShiftError::Config(format!("Invalid API origin: {}", e)))?;

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_cert)
            .build()
            .map_err(|e| OpenShiftError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let auth = TokenManager::new(&config, http.clone(), cache);
        Ok(Self { config, http, auth })
    }

    /// The active configuration
    pub fn config(&self) -> &OpenShiftConfig {
        &self.config
    }

    /// The secret used for the token exchange
    pub fn secret(&self) -> &str {
        &self.config.api_secret
    }

    /// The token manager owning the bearer token lifecycle
    pub fn auth(&self) -> &TokenManager {
        &self.auth
    }

    fn resource_url(&self, pid: &str, kind: ResourceKind, name: Option<&str>) -> String {
        let mut url = format!(
            "{}/{}/v1/namespaces/{}/{}",
            self.config.origin(),
            kind.api_group_prefix(),
            pid,
            kind.url_segment()
        );
        if let Some(name) = name {
            url.push('/');
            url.push_str(name);
        }
        url
    }

    /// Create a cluster object of the given kind
    ///
    /// With `use_defaults` the per-kind default payload fills gaps in the
    /// descriptor (caller value wins). The server signals creation with
    /// 201; any other accepted status reports `false`.
    pub async fn create(
        &self,
        pid: &str,
        kind: ResourceKind,
        descriptor: Value,
        use_defaults: bool,
    ) -> Result<bool, OpenShiftError> {
        let descriptor = if use_defaults {
            kind.apply_defaults(descriptor)
        } else {
            descriptor
        };
        let url = self.resource_url(pid, kind, None);
        let exchange = self
            .send(Method::POST, &url, Some(descriptor), Some("application/json"))
            .await?;
        self.expect_status(exchange, 201)
    }

    /// Fetch a single object by name
    ///
    /// A 404 is softened to an empty descriptor; any other failure status
    /// propagates.
    pub async fn get(
        &self,
        pid: &str,
        kind: ResourceKind,
        name: &str,
    ) -> Result<Value, OpenShiftError> {
        let url = self.resource_url(pid, kind, Some(name));
        let exchange = self.send(Method::GET, &url, None, None).await?;
        if exchange.status == 404 {
            return Ok(empty_descriptor());
        }
        let exchange = self.require_success(exchange)?;
        if exchange.body.is_empty() {
            return Ok(empty_descriptor());
        }
        decode_body(&exchange.body).map_err(Into::into)
    }

    /// List objects of a kind within a project
    ///
    /// Returns the `items` sequence of the list body, empty when the body
    /// carries none. A 404 is softened to an empty sequence.
    pub async fn list(&self, pid: &str, kind: ResourceKind) -> Result<Vec<Value>, OpenShiftError> {
        let url = self.resource_url(pid, kind, None);
        let exchange = self.send(Method::GET, &url, None, None).await?;
        if exchange.status == 404 {
            return Ok(Vec::new());
        }
        let exchange = self.require_success(exchange)?;
        if exchange.body.is_empty() {
            return Ok(Vec::new());
        }
        let body = decode_body(&exchange.body)?;
        Ok(list_items(body))
    }

    /// Delete an object by name; 200 is the success signal
    pub async fn delete(
        &self,
        pid: &str,
        kind: ResourceKind,
        name: &str,
    ) -> Result<bool, OpenShiftError> {
        let url = self.resource_url(pid, kind, Some(name));
        let exchange = self.send(Method::DELETE, &url, None, None).await?;
        self.expect_status(exchange, 200)
    }

    /// Partially update an object via merge patch
    ///
    /// Empty-string fields in the partial descriptor are rewritten to
    /// explicit nulls so the server unsets them, and an unset source
    /// secret reference is collapsed to null as a whole. 200 is the
    /// success signal.
    pub async fn patch(
        &self,
        pid: &str,
        kind: ResourceKind,
        name: &str,
        partial: Value,
    ) -> Result<bool, OpenShiftError> {
        let partial = normalize_patch(partial);
        let url = self.resource_url(pid, kind, Some(name));
        let exchange = self
            .send(Method::PATCH, &url, Some(partial), Some(MERGE_PATCH_CONTENT_TYPE))
            .await?;
        self.expect_status(exchange, 200)
    }

    /// Trigger a new build from a build config
    ///
    /// Posts a build-request wrapper to the `instantiate` sub-path. On 201
    /// the created descriptor is returned; a non-201 response is softened
    /// to an empty descriptor. A transport failure with no response at all
    /// still propagates as an error.
    pub async fn instantiate(
        &self,
        pid: &str,
        config_name: &str,
        request: Value,
        use_defaults: bool,
    ) -> Result<Value, OpenShiftError> {
        let request = if use_defaults {
            apply_build_request_defaults(request)
        } else {
            request
        };
        let url = format!(
            "{}/instantiate",
            self.resource_url(pid, ResourceKind::BuildConfig, Some(config_name))
        );
        let exchange = self
            .send(Method::POST, &url, Some(request), Some("application/json"))
            .await?;
        if exchange.status != 201 {
            tracing::warn!(
                "Build instantiation for {} returned HTTP {}, treating as empty",
                config_name,
                exchange.status
            );
            return Ok(empty_descriptor());
        }
        if exchange.body.is_empty() {
            return Ok(empty_descriptor());
        }
        decode_body(&exchange.body).map_err(Into::into)
    }

    /// Fetch the raw log text of a build
    pub async fn build_log(&self, pid: &str, build_id: &str) -> Result<String, OpenShiftError> {
        let url = format!(
            "{}/log",
            self.resource_url(pid, ResourceKind::Build, Some(build_id))
        );
        let exchange = self.send(Method::GET, &url, None, None).await?;
        let exchange = self.require_success(exchange)?;
        Ok(exchange.body)
    }

    /// Query the cluster version endpoint
    ///
    /// Returns the decoded mapping, or an empty one when the endpoint is
    /// absent (404).
    pub async fn version(&self) -> Result<Value, OpenShiftError> {
        let url = format!("{}/version", self.config.origin());
        let exchange = self.send(Method::GET, &url, None, None).await?;
        if exchange.status == 404 {
            return Ok(empty_descriptor());
        }
        let exchange = self.require_success(exchange)?;
        decode_body(&exchange.body).map_err(Into::into)
    }

    /// Perform one request and return the received response as a value
    ///
    /// Only a transport-level failure (no response at all) is an error
    /// here; a response with an unwanted status is returned for the caller
    /// to classify. When the debug flag is set, both the request and the
    /// outcome are logged so operators can correlate successes as well as
    /// failures.
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        content_type: Option<&str>,
    ) -> Result<HttpExchange, ApiError> {
        let mut request = self.http.request(method.clone(), url);

        if let Some(token) = self.auth.get_valid_token().await {
            request = request.header("Authorization", format!("Bearer {}", token));
        } else {
            tracing::warn!("No bearer token available, sending unauthenticated request");
        }
        if method == Method::GET {
            if let Some(app_origin) = &self.config.app_origin {
                request = request.header("Origin", app_origin.as_str());
            }
        }

        let request_body = match &body {
            Some(value) => serde_json::to_string(value)
                .map_err(|e| ApiError::Request(format!("Failed to encode request body: {}", e)))?,
            None => String::new(),
        };
        if let Some(content_type) = content_type {
            request = request.header("Content-Type", content_type);
        }
        if body.is_some() {
            request = request.body(request_body.clone());
        }

        if self.config.debug {
            tracing::debug!("Request: {} {} body={}", method, url, request_body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                if self.config.debug {
                    tracing::debug!("Response: {} {} transport failure: {}", method, url, e);
                }
                return Err(ApiError::from(e));
            }
        };

        let status = response.status().as_u16();
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if self.config.debug {
            tracing::debug!(
                "Response: {} {} status={} body={}",
                method,
                url,
                status,
                response_body
            );
        }

        Ok(HttpExchange {
            status,
            body: response_body,
        })
    }

    /// Classify a mutation response against its expected success status
    ///
    /// Error-range statuses propagate; an accepted-but-unexpected status
    /// (e.g. 200 where 201 signals creation) reports `false`.
    fn expect_status(
        &self,
        exchange: HttpExchange,
        expected: u16,
    ) -> Result<bool, OpenShiftError> {
        if !exchange.is_success() {
            return Err(ApiError::Http {
                status: exchange.status,
                message: exchange.body,
            }
            .into());
        }
        Ok(exchange.status == expected)
    }

    fn require_success(&self, exchange: HttpExchange) -> Result<HttpExchange, OpenShiftError> {
        if !exchange.is_success() {
            return Err(ApiError::Http {
                status: exchange.status,
                message: exchange.body,
            }
            .into());
        }
        Ok(exchange)
    }
}

fn decode_body(body: &str) -> Result<Value, ApiError> {
    serde_json::from_str(body)
        .map_err(|e| ApiError::Parse(format!("Failed to parse response body: {}", e)))
}
