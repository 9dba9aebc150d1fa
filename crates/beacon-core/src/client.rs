//! Typed backend API surface.
//!
//! One method per business action, each dispatched through the resilient
//! executor and returning a classified outcome, never a raw transport
//! error. The client is an explicitly constructed instance holding its own
//! session token; nothing here is a module-level global.
//!
//! Response shapes follow the backend's JSON documents, decoded leniently:
//! the server stores free-form MongoDB documents, so optional fields default
//! instead of failing the whole payload.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;

use crate::cache::EndpointCache;
use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};
use crate::executor::{ApiRequest, FallbackPolicy, RequestExecutor};
use crate::store::{KeyValueStore, MemoryStore};
use crate::transport::{FormPart, HttpClient, RequestBody, ReqwestHttpClient};

/// Authenticated user document returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub profile_picture: String,
}

/// Result of a successful login/register/firebase-login call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: UserProfile,
}

/// Payload for `/api/auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

impl RegisterRequest {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            full_name: full_name.into(),
            phone: None,
            organization: None,
        }
    }
}

/// Decoded `/api/health` body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub mongodb: Option<bool>,
    #[serde(default)]
    pub model_manager: Option<bool>,
}

/// Form fields and image for an assessment submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentSubmission {
    pub building_name: String,
    pub building_type: String,
    pub pin_location: String,
    pub damage_types: Vec<String>,
    pub is_public: bool,
    pub image_name: String,
    pub image: Vec<u8>,
}

impl AssessmentSubmission {
    fn into_form(self) -> Vec<FormPart> {
        vec![
            FormPart::file("image", self.image_name, "image/jpeg", self.image),
            FormPart::text("building_name", self.building_name),
            FormPart::text("building_type", self.building_type),
            FormPart::text("pin_location", self.pin_location),
            FormPart::text("damage_types", self.damage_types.join(",")),
            FormPart::text("is_public", if self.is_public { "true" } else { "false" }),
        ]
    }
}

/// Per-category cost estimate.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CostBreakdown {
    #[serde(default)]
    pub structural_cost: f64,
    #[serde(default)]
    pub non_structural_cost: f64,
    #[serde(default)]
    pub content_cost: f64,
    #[serde(default)]
    pub total_cost_usd: f64,
}

/// Completed damage assessment returned by `/api/assess`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssessmentOutcome {
    pub assessment_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub damage_severity: String,
    #[serde(default)]
    pub damage_percentage: f64,
    #[serde(default)]
    pub estimated_cost: f64,
    #[serde(default)]
    pub building_area_sqm: Option<f64>,
    #[serde(default)]
    pub heatmap_url: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub cost_breakdown: CostBreakdown,
}

/// Stored assessment document, decoded leniently.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssessmentRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub building_name: String,
    #[serde(default)]
    pub building_type: String,
    #[serde(default)]
    pub pin_location: String,
    #[serde(default)]
    pub damage_severity: Option<String>,
    #[serde(default)]
    pub damage_percentage: Option<f64>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

/// One page of assessments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssessmentPage {
    pub assessments: Vec<AssessmentRecord>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub total_pages: u64,
}

/// One active disaster alert.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DisasterAlert {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub alert_type: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlertFeed {
    pub alerts: Vec<DisasterAlert>,
}

/// Bucketed count used by the dashboard distributions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DistributionBucket {
    #[serde(rename = "_id")]
    pub key: String,
    pub count: u64,
}

/// Decoded `/api/dashboard/stats` body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub user_assessments: u64,
    #[serde(default)]
    pub total_estimated_cost: f64,
    #[serde(default)]
    pub average_severity: f64,
    #[serde(default)]
    pub recent_assessments: Vec<AssessmentRecord>,
    #[serde(default)]
    pub severity_distribution: Vec<DistributionBucket>,
    #[serde(default)]
    pub building_distribution: Vec<DistributionBucket>,
}

/// Fields updatable via `PUT /api/auth/profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileEnvelope {
    user: UserProfile,
}

/// High-level backend client.
///
/// Construction wires the whole resilient stack: validated registry,
/// endpoint cache over the injected store, and the shared executor every
/// operation dispatches through, so fallback order cannot diverge between
/// call sites.
pub struct BackendClient {
    executor: RequestExecutor,
    request_timeout: Duration,
    session: RwLock<Option<String>>,
}

impl BackendClient {
    pub fn new(
        config: &ClientConfig,
        http: Arc<dyn HttpClient>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ConfigError> {
        let registry = Arc::new(config.registry()?);
        let cache = EndpointCache::new(store);
        let executor = RequestExecutor::new(http, registry, cache, config.probe_timeout());
        Ok(Self {
            executor,
            request_timeout: config.request_timeout(),
            session: RwLock::new(None),
        })
    }

    /// Convenience wiring: reqwest transport and a volatile in-memory
    /// endpoint cache. The last working URL is forgotten when this client is
    /// dropped; pass a [`crate::store::JsonFileStore`] to [`Self::new`] to
    /// persist it across sessions.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Self::new(
            config,
            Arc::new(ReqwestHttpClient::new()),
            Arc::new(MemoryStore::new()),
        )
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub async fn session_token(&self) -> Option<String> {
        self.session.read().await.clone()
    }

    pub async fn set_session_token(&self, token: impl Into<String>) {
        *self.session.write().await = Some(token.into());
    }

    pub async fn sign_out(&self) {
        *self.session.write().await = None;
    }

    /// Resilient health check against whichever endpoint currently answers.
    pub async fn check_health(&self) -> Result<HealthReport, ApiError> {
        let response = self
            .executor
            .execute(
                ApiRequest::get("/api/health")
                    .with_timeout(self.request_timeout)
                    .with_fallback(FallbackPolicy::Chain),
            )
            .await?;
        response.decode()
    }

    /// `POST /api/auth/login`; stores the session token on success.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        let response = self
            .executor
            .execute(
                ApiRequest::post("/api/auth/login")
                    .with_json(json!({ "email": email, "password": password }))
                    .with_timeout(self.request_timeout)
                    .with_fallback(FallbackPolicy::Chain),
            )
            .await?;
        let session: AuthSession = response.decode()?;
        self.set_session_token(&session.access_token).await;
        Ok(session)
    }

    /// `POST /api/auth/register`; stores the session token on success.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSession, ApiError> {
        let payload = serde_json::to_value(request).map_err(|error| {
            ApiError::MalformedResponse {
                message: error.to_string(),
            }
        })?;
        let response = self
            .executor
            .execute(
                ApiRequest::post("/api/auth/register")
                    .with_json(payload)
                    .with_timeout(self.request_timeout)
                    .with_fallback(FallbackPolicy::Chain),
            )
            .await?;
        let session: AuthSession = response.decode()?;
        self.set_session_token(&session.access_token).await;
        Ok(session)
    }

    /// `POST /api/auth/firebase-login` with an already-acquired Firebase
    /// token; stores the session token on success.
    pub async fn firebase_login(&self, firebase_token: &str) -> Result<AuthSession, ApiError> {
        let response = self
            .executor
            .execute(
                ApiRequest::post("/api/auth/firebase-login")
                    .with_json(json!({ "firebase_token": firebase_token }))
                    .with_timeout(self.request_timeout)
                    .with_fallback(FallbackPolicy::Chain),
            )
            .await?;
        let session: AuthSession = response.decode()?;
        self.set_session_token(&session.access_token).await;
        Ok(session)
    }

    /// `POST /api/assess` (multipart). Opts into fallback: losing a finished
    /// upload to a dead endpoint is the worst user experience in the app.
    pub async fn submit_assessment(
        &self,
        submission: AssessmentSubmission,
    ) -> Result<AssessmentOutcome, ApiError> {
        let request = self
            .authorized(ApiRequest::post("/api/assess"))
            .await
            .with_body(RequestBody::Multipart(submission.into_form()))
            .with_timeout(self.request_timeout)
            .with_fallback(FallbackPolicy::Chain);
        let response = self.executor.execute(request).await?;
        response.decode()
    }

    /// `GET /api/assessments` for the signed-in user. Pinned: a failed page
    /// load is cheap to retry from the UI.
    pub async fn assessments(&self, page: u64, limit: u64) -> Result<AssessmentPage, ApiError> {
        self.fetch_assessments("/api/assessments", page, limit).await
    }

    /// `GET /api/assessments/public`.
    pub async fn public_assessments(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<AssessmentPage, ApiError> {
        self.fetch_assessments("/api/assessments/public", page, limit)
            .await
    }

    async fn fetch_assessments(
        &self,
        path: &str,
        page: u64,
        limit: u64,
    ) -> Result<AssessmentPage, ApiError> {
        let request = self
            .authorized(ApiRequest::get(format!("{path}?page={page}&limit={limit}")))
            .await
            .with_timeout(self.request_timeout);
        let response = self.executor.execute(request).await?;
        response.decode()
    }

    /// `GET /api/disaster-alerts`.
    pub async fn disaster_alerts(&self) -> Result<AlertFeed, ApiError> {
        let request = self
            .authorized(ApiRequest::get("/api/disaster-alerts"))
            .await
            .with_timeout(self.request_timeout);
        let response = self.executor.execute(request).await?;
        response.decode()
    }

    /// `GET /api/dashboard/stats`.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let request = self
            .authorized(ApiRequest::get("/api/dashboard/stats"))
            .await
            .with_timeout(self.request_timeout);
        let response = self.executor.execute(request).await?;
        response.decode()
    }

    /// `PUT /api/auth/profile`.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        let payload = serde_json::to_value(update).map_err(|error| {
            ApiError::MalformedResponse {
                message: error.to_string(),
            }
        })?;
        let request = self
            .authorized(ApiRequest::put("/api/auth/profile"))
            .await
            .with_json(payload)
            .with_timeout(self.request_timeout);
        let response = self.executor.execute(request).await?;
        let envelope: ProfileEnvelope = response.decode()?;
        Ok(envelope.user)
    }

    /// Attach the session token when one is held. Without a token the
    /// request goes out unauthenticated and the server's own 401 surfaces
    /// as a business failure.
    async fn authorized(&self, request: ApiRequest) -> ApiRequest {
        match self.session.read().await.as_deref() {
            Some(token) => request.with_bearer(token),
            None => request,
        }
    }
}
