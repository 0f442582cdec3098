//! Admin login and logout handlers

use crate::http::auth::{SessionContext, SessionData, SessionManager};
use crate::http::errors::{HttpError, HttpResult};
use crate::http::extract::ApiJson;
use crate::http::handlers::AppState;
use crate::http::models::{LoginRequest, SuccessResponse};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use tracing::{info, warn};

/// POST /api/login - Admin login
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> HttpResult<Response> {
    let admin = &state.service.config().admin;

    if request.username != admin.username || request.password != admin.password {
        warn!("Failed login attempt for {}", request.username);
        return Err(HttpError::Unauthorized("Invalid credentials".to_string()));
    }

    let data = SessionData {
        admin: true,
        ..session.data
    };
    let token = state.sessions.rotate(session.id.as_ref(), data).await?;

    info!("Successful admin login: {}", request.username);
    Ok((
        [(header::SET_COOKIE, state.sessions.cookie(&token))],
        Json(SuccessResponse::ok()),
    )
        .into_response())
}

/// POST /api/logout - Destroy the session
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Response {
    if let Some(id) = &session.id {
        state.sessions.destroy(id).await;
    }

    info!("User logged out");
    (
        [(header::SET_COOKIE, SessionManager::clear_cookie())],
        Json(SuccessResponse::ok()),
    )
        .into_response()
}
