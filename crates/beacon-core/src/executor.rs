//! Resilient request execution.
//!
//! The executor replays one parameterized HTTP call against the currently
//! selected base URL and, for operations that opt in, falls back through
//! the candidate registry on connection-level failure. The asymmetric
//! retry rule is the load-bearing property of this module: an HTTP error
//! response ends the call (the server was reached and answered), while a
//! timeout or connect failure triggers discovery and a single retry, with
//! the *first* error carried forward to the caller.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::cache::EndpointCache;
use crate::discovery::EndpointDiscovery;
use crate::error::ApiError;
use crate::probe::HealthProbe;
use crate::registry::CandidateRegistry;
use crate::transport::{
    HttpClient, HttpMethod, HttpRequest, RequestBody, TransportErrorKind,
};

/// Whether an operation may be retried against other candidates.
///
/// Fallback is opt-in per operation; reads that tolerate failure stay
/// pinned to the active endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// On connection-level failure, discover a new endpoint and retry once.
    Chain,
    /// Fail immediately on any error against the active endpoint.
    Pinned,
}

/// One logical backend operation, replayed verbatim against each base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
    pub fallback: FallbackPolicy,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            body: None,
            timeout: Duration::from_secs(60),
            fallback: FallbackPolicy::Pinned,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn with_json(mut self, value: Value) -> Self {
        self.body = Some(RequestBody::Json(value));
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    fn to_http(&self, base_url: &str) -> HttpRequest {
        let mut request = HttpRequest::new(self.method, format!("{base_url}{}", self.path))
            .with_timeout(self.timeout);
        if let Some(token) = &self.bearer {
            request = request.with_bearer(token);
        }
        if let Some(body) = &self.body {
            request = request.with_body(body.clone());
        }
        request
    }
}

/// Decoded successful response, annotated with the endpoint that answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
    /// Base URL that produced this response.
    pub endpoint: String,
    /// Set when the call only succeeded after falling back to another
    /// candidate.
    pub fallback_endpoint: Option<String>,
}

impl ApiResponse {
    /// Decode the JSON body into a typed value.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(self.body.clone()).map_err(|error| ApiError::MalformedResponse {
            message: error.to_string(),
        })
    }
}

/// Executes API operations against the discovered backend with candidate
/// fallback.
#[derive(Clone)]
pub struct RequestExecutor {
    http: Arc<dyn HttpClient>,
    registry: Arc<CandidateRegistry>,
    cache: EndpointCache,
    discovery: EndpointDiscovery,
}

impl RequestExecutor {
    pub fn new(
        http: Arc<dyn HttpClient>,
        registry: Arc<CandidateRegistry>,
        cache: EndpointCache,
        probe_timeout: Duration,
    ) -> Self {
        let probe = HealthProbe::new(Arc::clone(&http), probe_timeout);
        let discovery = EndpointDiscovery::new(Arc::clone(&registry), probe);
        Self {
            http,
            registry,
            cache,
            discovery,
        }
    }

    pub fn cache(&self) -> &EndpointCache {
        &self.cache
    }

    pub fn discovery(&self) -> &EndpointDiscovery {
        &self.discovery
    }

    /// Execute one logical operation.
    ///
    /// The cached URL (or the configured primary when the cache is empty) is
    /// used optimistically, without a prior probe: verification is lazy, and
    /// a stale cache costs one failed attempt before fallback corrects it.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let active = match self.cache.get().await {
            Some(url) => url,
            None => self.registry.primary().base_url().to_string(),
        };

        let first_error = match self.attempt(&request, &active).await {
            Ok(response) => {
                self.cache.set(&active).await;
                return Ok(response);
            }
            Err(error) => error,
        };

        if request.fallback != FallbackPolicy::Chain || !first_error.is_connection_level() {
            return Err(first_error);
        }

        tracing::warn!(
            base_url = active,
            error = %first_error,
            path = request.path,
            "active endpoint failed at connection level; starting discovery"
        );

        match self.discovery.discover().await {
            Ok(found) => {
                let base_url = found.candidate.base_url().to_string();
                match self.attempt(&request, &base_url).await {
                    Ok(mut response) => {
                        self.cache.set(&base_url).await;
                        tracing::info!(
                            base_url,
                            path = request.path,
                            "request recovered via fallback endpoint"
                        );
                        response.fallback_endpoint = Some(base_url);
                        Ok(response)
                    }
                    // The user-facing error reflects the original failure,
                    // not the cascade of secondary ones.
                    Err(retry_error) => {
                        tracing::debug!(
                            base_url,
                            error = %retry_error,
                            "retry against discovered endpoint also failed"
                        );
                        Err(first_error)
                    }
                }
            }
            Err(_) => Err(first_error),
        }
    }

    /// One attempt against one base URL, classified per the error taxonomy.
    async fn attempt(&self, request: &ApiRequest, base_url: &str) -> Result<ApiResponse, ApiError> {
        let http_request = request.to_http(base_url);

        let response = match tokio::time::timeout(
            request.timeout,
            self.http.execute(http_request),
        )
        .await
        {
            Err(_) => {
                return Err(ApiError::Timeout {
                    url: base_url.to_string(),
                })
            }
            Ok(Err(error)) => {
                return Err(match error.kind() {
                    TransportErrorKind::Timeout => ApiError::Timeout {
                        url: base_url.to_string(),
                    },
                    TransportErrorKind::Connect | TransportErrorKind::Other => {
                        ApiError::Unreachable {
                            url: base_url.to_string(),
                            message: error.message().to_string(),
                        }
                    }
                })
            }
            Ok(Ok(response)) => response,
        };

        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                message: extract_server_message(&response.body, response.status),
            });
        }

        let body = if response.body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&response.body).map_err(|error| ApiError::MalformedResponse {
                message: error.to_string(),
            })?
        };

        Ok(ApiResponse {
            status: response.status,
            body,
            endpoint: base_url.to_string(),
            fallback_endpoint: None,
        })
    }
}

/// Pull the server's own error message out of a failure body when present.
fn extract_server_message(body: &str, status: u16) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for field in ["error", "message"] {
            if let Some(message) = value.get(field).and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }
    format!("HTTP {status}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_prefers_error_field() {
        assert_eq!(
            extract_server_message(r#"{"error":"Invalid credentials"}"#, 401),
            "Invalid credentials"
        );
        assert_eq!(
            extract_server_message(r#"{"message":"nope"}"#, 400),
            "nope"
        );
        assert_eq!(extract_server_message("<html></html>", 502), "HTTP 502");
    }

    #[test]
    fn api_request_renders_onto_base_url() {
        let request = ApiRequest::post("/api/auth/login")
            .with_json(serde_json::json!({"email": "a@b.c", "password": "pw"}))
            .with_timeout(Duration::from_secs(30))
            .with_bearer("tok");

        let http = request.to_http("http://10.0.2.2:5000");
        assert_eq!(http.url, "http://10.0.2.2:5000/api/auth/login");
        assert_eq!(http.timeout, Duration::from_secs(30));
        assert_eq!(
            http.headers.get("authorization").map(String::as_str),
            Some("Bearer tok")
        );
    }

    #[test]
    fn requests_default_to_pinned_fallback() {
        let request = ApiRequest::get("/api/assessments");
        assert_eq!(request.fallback, FallbackPolicy::Pinned);
    }
}
