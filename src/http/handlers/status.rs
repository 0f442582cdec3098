//! Status and health endpoint handlers

use crate::core::service::AddonManagerService;
use crate::http::auth::{SessionContext, SessionManager};
use crate::http::models::{AuthStatusResponse, HealthResponse};
use axum::{Extension, Json};
use std::sync::Arc;
use tracing::debug;

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AddonManagerService>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(service: Arc<AddonManagerService>) -> Self {
        let sessions = Arc::new(SessionManager::from_config(&service.config().admin));
        Self { service, sessions }
    }
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    let status = HealthResponse {
        status: "OK".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: crate::VERSION.to_string(),
    };
    debug!("Health check: {:?}", status);
    Json(status)
}

/// GET /api/auth/status
pub async fn auth_status(Extension(session): Extension<SessionContext>) -> Json<AuthStatusResponse> {
    let stremio_user = session.data.stremio.as_ref().map(|s| s.user.clone());
    debug!(
        "Auth status check: authenticated={}, stremio={}",
        session.is_admin(),
        stremio_user.is_some()
    );

    Json(AuthStatusResponse {
        is_authenticated: session.is_admin(),
        stremio_connected: stremio_user.is_some(),
        stremio_user,
    })
}
