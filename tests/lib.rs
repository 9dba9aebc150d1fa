//! Shared test support: a scripted transport and registry builders.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

pub use beacon_core::{
    BackendClient, CandidateEndpoint, CandidateRegistry, ClientConfig, EndpointCache,
    EndpointDiscovery, EndpointRole, HealthProbe, MemoryStore, RequestExecutor,
};
use beacon_core::{HttpClient, HttpRequest, HttpResponse, TransportError};

/// Scripted behavior for one URL.
#[derive(Debug, Clone)]
pub enum Script {
    Respond { status: u16, body: String },
    Refuse,
    TimeOut,
    /// Never completes within any probe bound; exercises cancellation.
    Hang,
}

impl Script {
    pub fn ok_health() -> Self {
        Self::Respond {
            status: 200,
            body: String::from(r#"{"status":"ok","mongodb":true}"#),
        }
    }

    pub fn respond(status: u16, body: &str) -> Self {
        Self::Respond {
            status,
            body: body.to_string(),
        }
    }
}

/// Transport whose responses are scripted per full URL.
///
/// Unrequested URLs behave as connection-refused, matching a server that is
/// simply not there. Every request is recorded in arrival order.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<HashMap<String, Script>>,
    log: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, url: &str, script: Script) {
        self.routes
            .lock()
            .expect("routes lock")
            .insert(url.to_string(), script);
    }

    /// URLs requested so far, in order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.log
            .lock()
            .expect("log lock")
            .iter()
            .map(|request| request.url.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().expect("log lock").clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.log
            .lock()
            .expect("log lock")
            .iter()
            .filter(|request| request.url == url)
            .count()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>> {
        let url = request.url.clone();
        self.log.lock().expect("log lock").push(request);
        let script = self.routes.lock().expect("routes lock").get(&url).cloned();

        Box::pin(async move {
            match script {
                Some(Script::Respond { status, body }) => Ok(HttpResponse { status, body }),
                Some(Script::TimeOut) => {
                    Err(TransportError::timeout(format!("deadline exceeded: {url}")))
                }
                Some(Script::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3_600)).await;
                    Err(TransportError::other("hung request completed unexpectedly"))
                }
                Some(Script::Refuse) | None => {
                    Err(TransportError::connect(format!("connection refused: {url}")))
                }
            }
        })
    }
}

/// Three-candidate registry matching the original deployment shape.
pub fn lan_registry() -> CandidateRegistry {
    registry_of(&[
        ("http://192.168.18.29:5000", EndpointRole::Primary),
        ("http://10.0.2.2:5000", EndpointRole::Backup),
        ("http://localhost:5000", EndpointRole::Localhost),
    ])
}

pub fn registry_of(entries: &[(&str, EndpointRole)]) -> CandidateRegistry {
    let candidates = entries
        .iter()
        .map(|(url, role)| CandidateEndpoint::new(url, *role).expect("valid candidate url"))
        .collect();
    CandidateRegistry::new(candidates).expect("non-empty registry")
}

pub fn health_url(base: &str) -> String {
    format!("{base}/api/health")
}
