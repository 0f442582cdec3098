//! Axum middleware for the session gate

use crate::http::auth::session::{SessionContext, SessionManager, SESSION_COOKIE};
use crate::http::errors::HttpError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Extract the session token from the cookie or an `Authorization: Bearer` header
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    // Try Authorization header first
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(stripped) = auth_str.strip_prefix("Bearer ") {
                return Some(stripped.trim().to_string());
            }
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Resolve the caller's session and attach it as a [`SessionContext`]
pub async fn session_middleware(
    State(sessions): State<Arc<SessionManager>>,
    mut req: Request,
    next: Next,
) -> Response {
    let context = match extract_token(req.headers()) {
        Some(token) => sessions.resolve(&token).await.unwrap_or_else(|| {
            debug!("Ignoring stale or invalid session token");
            SessionContext::default()
        }),
        None => SessionContext::default(),
    };

    req.extensions_mut().insert(context);
    next.run(req).await
}

/// Reject requests whose session has not passed admin login
pub async fn require_admin(req: Request, next: Next) -> Response {
    let authorized = req
        .extensions()
        .get::<SessionContext>()
        .is_some_and(SessionContext::is_admin);

    if authorized {
        debug!("Auth check passed: {} {}", req.method(), req.uri().path());
        next.run(req).await
    } else {
        warn!(
            "Unauthorized access attempt: {} {}",
            req.method(),
            req.uri().path()
        );
        HttpError::Unauthorized("Unauthorized".to_string()).into_response()
    }
}
