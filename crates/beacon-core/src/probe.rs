//! Bounded-time health probing of candidate endpoints.
//!
//! A probe is a single `GET {base}/api/health` with a hard timeout. It never
//! caches and never retries; it only classifies what happened so the
//! discovery sweep can decide what to do next.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::transport::{HttpClient, HttpRequest, TransportErrorKind};

/// Well-known health path served by the backend.
pub const HEALTH_PATH: &str = "/api/health";

/// Classification of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 2xx and a JSON body whose `status` field equals `"ok"`.
    Ok,
    /// 2xx but the body is missing, unparseable, or not `status: ok`.
    BadBody,
    /// The server answered with a non-2xx status.
    HttpError(u16),
    /// Connection-level failure before any HTTP response.
    Unreachable,
    /// The probe did not complete within its bound.
    Timeout,
}

impl ProbeOutcome {
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::BadBody => "bad_body",
            Self::HttpError(_) => "http_error",
            Self::Unreachable => "unreachable",
            Self::Timeout => "timeout",
        }
    }
}

/// Transient result of one probe; consumed immediately by discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub outcome: ProbeOutcome,
    pub latency: Duration,
}

/// Issues bounded-time health probes against one base URL at a time.
#[derive(Clone)]
pub struct HealthProbe {
    http: Arc<dyn HttpClient>,
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(http: Arc<dyn HttpClient>, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe one base URL.
    ///
    /// The timeout cancels the in-flight transport call on expiry; it does
    /// not leave the request running in the background.
    pub async fn probe(&self, base_url: &str) -> ProbeResult {
        let request =
            HttpRequest::get(format!("{base_url}{HEALTH_PATH}")).with_timeout(self.timeout);

        let started = Instant::now();
        let outcome = match tokio::time::timeout(self.timeout, self.http.execute(request)).await {
            Err(_) => ProbeOutcome::Timeout,
            Ok(Err(error)) => match error.kind() {
                TransportErrorKind::Timeout => ProbeOutcome::Timeout,
                TransportErrorKind::Connect | TransportErrorKind::Other => {
                    ProbeOutcome::Unreachable
                }
            },
            Ok(Ok(response)) if !response.is_success() => ProbeOutcome::HttpError(response.status),
            Ok(Ok(response)) => classify_health_body(&response.body),
        };
        let latency = started.elapsed();

        tracing::debug!(
            base_url,
            outcome = outcome.label(),
            latency_ms = latency.as_millis() as u64,
            "health probe finished"
        );

        ProbeResult { outcome, latency }
    }
}

fn classify_health_body(body: &str) -> ProbeOutcome {
    match serde_json::from_str::<Value>(body) {
        Ok(value) if value.get("status").and_then(Value::as_str) == Some("ok") => ProbeOutcome::Ok,
        _ => ProbeOutcome::BadBody,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{StaticHttpClient, TransportError};

    fn probe_with(client: StaticHttpClient) -> HealthProbe {
        HealthProbe::new(Arc::new(client), Duration::from_secs(3))
    }

    #[tokio::test]
    async fn healthy_body_classifies_as_ok() {
        let probe = probe_with(StaticHttpClient::respond(
            200,
            r#"{"status":"ok","mongodb":true,"model_manager":true}"#,
        ));
        let result = probe.probe("http://localhost:5000").await;
        assert_eq!(result.outcome, ProbeOutcome::Ok);
    }

    #[tokio::test]
    async fn wrong_status_field_classifies_as_bad_body() {
        let probe = probe_with(StaticHttpClient::respond(200, r#"{"status":"degraded"}"#));
        let result = probe.probe("http://localhost:5000").await;
        assert_eq!(result.outcome, ProbeOutcome::BadBody);
    }

    #[tokio::test]
    async fn unparseable_body_classifies_as_bad_body() {
        let probe = probe_with(StaticHttpClient::respond(200, "<html>proxy error</html>"));
        let result = probe.probe("http://localhost:5000").await;
        assert_eq!(result.outcome, ProbeOutcome::BadBody);
    }

    #[tokio::test]
    async fn non_2xx_classifies_as_http_error() {
        let probe = probe_with(StaticHttpClient::respond(503, r#"{"status":"down"}"#));
        let result = probe.probe("http://localhost:5000").await;
        assert_eq!(result.outcome, ProbeOutcome::HttpError(503));
    }

    #[tokio::test]
    async fn connect_failure_classifies_as_unreachable() {
        let probe = probe_with(StaticHttpClient::fail(TransportError::connect(
            "connection refused",
        )));
        let result = probe.probe("http://10.0.2.2:5000").await;
        assert_eq!(result.outcome, ProbeOutcome::Unreachable);
    }

    #[tokio::test]
    async fn transport_timeout_classifies_as_timeout() {
        let probe = probe_with(StaticHttpClient::fail(TransportError::timeout(
            "deadline exceeded",
        )));
        let result = probe.probe("http://10.0.2.2:5000").await;
        assert_eq!(result.outcome, ProbeOutcome::Timeout);
    }
}
