//! HTTP transport abstraction.
//!
//! The discovery and dispatch layers never talk to `reqwest` directly; they
//! go through the [`HttpClient`] trait so tests can script transports and
//! the executor can classify failures uniformly. The production
//! implementation is [`ReqwestHttpClient`].

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// HTTP methods used by the backend API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

/// One field of a multipart form body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File {
        filename: String,
        content_type: String,
        data: Vec<u8>,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: PartValue::Text(value.into()),
        }
    }

    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            value: PartValue::File {
                filename: filename.into(),
                content_type: content_type.into(),
                data,
            },
        }
    }
}

/// Request payload variants the backend accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

/// Transport-level request envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_bearer(self, token: impl AsRef<str>) -> Self {
        let token = token.as_ref();
        self.with_header("authorization", format!("Bearer {token}"))
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Transport-level response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failure classification for a transport call.
///
/// `Timeout` and `Connect` map directly onto the connection-level error
/// taxonomy; `Other` covers transport failures that produced no HTTP
/// response (aborted streams, protocol errors) and is treated the same as
/// `Connect` by the dispatch layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Other,
}

/// Error raised by an [`HttpClient`] before any HTTP response arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Timeout,
            message: message.into(),
        }
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Connect,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Other,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

/// Transport contract used by the probe and the executor.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>>;
}

/// Transport that returns one fixed result for every request.
///
/// Used for deterministic offline unit tests of the probe and cache layers.
#[derive(Debug, Clone)]
pub struct StaticHttpClient {
    result: Result<HttpResponse, TransportError>,
}

impl StaticHttpClient {
    pub fn respond(status: u16, body: impl Into<String>) -> Self {
        Self {
            result: Ok(HttpResponse {
                status,
                body: body.into(),
            }),
        }
    }

    pub fn fail(error: TransportError) -> Self {
        Self { result: Err(error) }
    }
}

impl HttpClient for StaticHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>> {
        let _ = request;
        let result = self.result.clone();
        Box::pin(async move { result })
    }
}

/// Production transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent("beacon/0.1.0")
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(&request.url),
                HttpMethod::Post => self.client.post(&request.url),
                HttpMethod::Put => self.client.put(&request.url),
            };

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            builder = builder.timeout(request.timeout);

            match request.body {
                Some(RequestBody::Json(value)) => {
                    builder = builder.json(&value);
                }
                Some(RequestBody::Multipart(parts)) => {
                    let mut form = reqwest::multipart::Form::new();
                    for part in parts {
                        form = match part.value {
                            PartValue::Text(text) => form.text(part.name, text),
                            PartValue::File {
                                filename,
                                content_type,
                                data,
                            } => {
                                let file = reqwest::multipart::Part::bytes(data)
                                    .file_name(filename)
                                    .mime_str(&content_type)
                                    .map_err(|error| {
                                        TransportError::other(format!(
                                            "invalid content type: {error}"
                                        ))
                                    })?;
                                form.part(part.name, file)
                            }
                        };
                    }
                    builder = builder.multipart(form);
                }
                None => {}
            }

            let response = builder.send().await.map_err(|error| {
                if error.is_timeout() {
                    TransportError::timeout(format!("request timed out: {error}"))
                } else if error.is_connect() {
                    TransportError::connect(format!("connection failed: {error}"))
                } else {
                    TransportError::other(format!("request failed: {error}"))
                }
            })?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(|error| {
                TransportError::other(format!("failed to read response body: {error}"))
            })?;

            Ok(HttpResponse { status, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_helper_populates_authorization_header() {
        let request = HttpRequest::get("http://localhost:5000/api/assessments")
            .with_bearer("token-123");

        assert_eq!(
            request.headers.get("authorization").map(String::as_str),
            Some("Bearer token-123")
        );
    }

    #[test]
    fn header_names_are_lowercased() {
        let request =
            HttpRequest::post("http://localhost:5000/api/assess").with_header("X-Request-Id", "1");

        assert_eq!(request.headers.get("x-request-id").map(String::as_str), Some("1"));
    }

    #[test]
    fn success_covers_the_whole_2xx_range() {
        assert!(HttpResponse { status: 200, body: String::new() }.is_success());
        assert!(HttpResponse { status: 201, body: String::new() }.is_success());
        assert!(!HttpResponse { status: 301, body: String::new() }.is_success());
        assert!(!HttpResponse { status: 401, body: String::new() }.is_success());
    }

    #[tokio::test]
    async fn static_client_replays_its_result() {
        let client = StaticHttpClient::respond(200, r#"{"status":"ok"}"#);
        let response = client
            .execute(HttpRequest::get("http://localhost:5000/api/health"))
            .await
            .expect("static response");
        assert_eq!(response.status, 200);

        let failing = StaticHttpClient::fail(TransportError::connect("connection refused"));
        let error = failing
            .execute(HttpRequest::get("http://localhost:5000/api/health"))
            .await
            .expect_err("static failure");
        assert_eq!(error.kind(), TransportErrorKind::Connect);
    }
}
