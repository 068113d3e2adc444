use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use mockable::Clock;
use serde::Deserialize;
use tracing::error;

use super::auth;
use super::github::{GitHubClient, RepositoryLister};
use super::models::{ImplementationView, ScanView};
use super::store::{ImplementationStore, ScanStore};
use super::users::UserStore;
use crate::config::{Config, OAuthCredentials};
use crate::errors::StoreError;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub scans: ScanStore,
    pub implementations: ImplementationStore,
    pub users: UserStore,
    pub github: GitHubClient,
    pub repositories: Arc<dyn RepositoryLister>,
    /// `None` means mock mode: no OAuth app configured.
    pub oauth: Option<OAuthCredentials>,
    pub frontend_url: String,
    pub clock: SharedClock,
}

impl AppState {
    pub fn new(config: &Config, clock: SharedClock) -> Self {
        let scans = ScanStore::new(config.jobs.scan_threshold());
        let implementations =
            ImplementationStore::new(scans.clone(), config.jobs.implementation_threshold());
        let github = GitHubClient::new(&config.github.api_base, &config.github.oauth_base);
        Self {
            scans,
            implementations,
            users: UserStore::new(),
            repositories: Arc::new(github.clone()),
            github,
            oauth: config.github.oauth_credentials(),
            frontend_url: config.server.frontend_url.trim_end_matches('/').to_string(),
            clock,
        }
    }

    /// Replace the repository source, e.g. with a stub in tests.
    pub fn with_repository_lister(mut self, lister: Arc<dyn RepositoryLister>) -> Self {
        self.repositories = lister;
        self
    }

    pub fn is_mock_github(&self) -> bool {
        self.oauth.is_none()
    }
}

pub type SharedState = Arc<AppState>;

/// Source of "now" for job resolution. `DefaultClock` in production.
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

// ── Request payload types ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ScanRequest {
    pub repository_url: String,
}

#[derive(Deserialize)]
pub struct ImplementationRequest {
    pub scan_id: String,
    pub issue_id: i64,
}

// ── Error handling ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ScanNotFound { .. } => ApiError::NotFound("Scan not found".into()),
            StoreError::ImplementationNotFound { .. } => {
                ApiError::NotFound("Implementation not found".into())
            }
            StoreError::LockPoisoned => {
                error!("job store lock poisoned");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/repositories/scan", post(create_scan))
        .route("/api/repositories/scan/{scan_id}", get(get_scan))
        .route("/api/repositories/implement", post(create_implementation))
        .route(
            "/api/repositories/implement/{implementation_id}",
            get(get_implementation),
        )
        .merge(auth::auth_router())
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({"message": "Welcome to the Issue Scout API"}))
}

async fn health_check() -> &'static str {
    "ok"
}

/// Start a simulated scan of a GitHub repository.
async fn create_scan(
    State(state): State<SharedState>,
    Json(req): Json<ScanRequest>,
) -> Result<Json<ScanView>, ApiError> {
    let view = state.scans.create(&req.repository_url, state.clock.utc())?;
    Ok(Json(view))
}

/// Poll a scan. Completes it as a side effect once its delay has elapsed.
async fn get_scan(
    State(state): State<SharedState>,
    Path(scan_id): Path<String>,
) -> Result<Json<ScanView>, ApiError> {
    let view = state.scans.get(&scan_id, state.clock.utc())?;
    Ok(Json(view))
}

/// Start a simulated implementation of one issue from an existing scan.
async fn create_implementation(
    State(state): State<SharedState>,
    Json(req): Json<ImplementationRequest>,
) -> Result<Json<ImplementationView>, ApiError> {
    let view = state
        .implementations
        .create(&req.scan_id, req.issue_id, state.clock.utc())?;
    Ok(Json(view))
}

async fn get_implementation(
    State(state): State<SharedState>,
    Path(implementation_id): Path<String>,
) -> Result<Json<ImplementationView>, ApiError> {
    let view = state
        .implementations
        .get(&implementation_id, state.clock.utc())?;
    Ok(Json(view))
}
