//! # Beacon Core
//!
//! Endpoint discovery and resilient request dispatch for a backend whose
//! address is not fixed: a LAN IP, an emulator loopback alias, or localhost,
//! any of which may change between sessions or die mid-session.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Last-known-good endpoint cache with verify-before-trust |
//! | [`client`] | Typed backend API surface (auth, assessments, alerts) |
//! | [`config`] | Candidate URLs and timeout configuration |
//! | [`discovery`] | Ordered discovery sweeps over the registry |
//! | [`error`] | Classified error taxonomy |
//! | [`executor`] | Resilient dispatch with candidate fallback |
//! | [`probe`] | Bounded-time health probes |
//! | [`registry`] | Ordered, validated candidate endpoints |
//! | [`store`] | Minimal persistent key-value storage |
//! | [`transport`] | HTTP transport abstraction (reqwest in production) |
//!
//! ## Control flow
//!
//! ```text
//! ┌────────────────┐      ┌─────────────────┐
//! │ BackendClient  │─────▶│ RequestExecutor │
//! └────────────────┘      └────────┬────────┘
//!                    cached URL │  │ connection failure
//!               ┌───────────────┘  ▼
//!               ▼          ┌───────────────────┐   ┌─────────────┐
//!        ┌──────────────┐  │ EndpointDiscovery │──▶│ HealthProbe │
//!        │ EndpointCache│  └─────────┬─────────┘   └─────────────┘
//!        └──────────────┘            ▼
//!                          ┌───────────────────┐
//!                          │ CandidateRegistry │
//!                          └───────────────────┘
//! ```
//!
//! The executor tries the cached (or primary) base URL optimistically. An
//! HTTP error response ends the call there; only a connection-level failure
//! triggers one sequential discovery pass and a single retry against the
//! first healthy candidate, after which the cache records the winner.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use beacon_core::{BackendClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BackendClient::from_config(&ClientConfig::default())?;
//!     let health = client.check_health().await?;
//!     println!("backend status: {}", health.status);
//!
//!     let session = client.login("user@example.com", "password").await?;
//!     println!("signed in as {}", session.user.email);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod probe;
pub mod registry;
pub mod store;
pub mod transport;

pub use cache::{EndpointCache, CACHE_KEY};
pub use client::{
    AlertFeed, AssessmentOutcome, AssessmentPage, AssessmentRecord, AssessmentSubmission,
    AuthSession, BackendClient, CostBreakdown, DashboardStats, DisasterAlert, DistributionBucket,
    HealthReport, ProfileUpdate, RegisterRequest, UserProfile,
};
pub use config::ClientConfig;
pub use discovery::{DiscoveredEndpoint, DiscoveryFailure, EndpointDiscovery, ProbeAttempt};
pub use error::{ApiError, ConfigError};
pub use executor::{ApiRequest, ApiResponse, FallbackPolicy, RequestExecutor};
pub use probe::{HealthProbe, ProbeOutcome, ProbeResult, HEALTH_PATH};
pub use registry::{CandidateEndpoint, CandidateRegistry, EndpointRole};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use transport::{
    FormPart, HttpClient, HttpMethod, HttpRequest, HttpResponse, PartValue, ReqwestHttpClient,
    RequestBody, StaticHttpClient, TransportError, TransportErrorKind,
};
