//! Direct Stremio account handlers

use crate::http::auth::session::StremioSession;
use crate::http::auth::{SessionContext, SessionData};
use crate::http::errors::{HttpError, HttpResult};
use crate::http::extract::ApiJson;
use crate::http::handlers::AppState;
use crate::http::models::{CredentialsRequest, StremioUser, SuccessResponse};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use tracing::{error, info};
use validator::Validate;

/// POST /api/stremio/register - Register a new Stremio account
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialsRequest>,
) -> HttpResult<Json<SuccessResponse>> {
    request.validate().map_err(HttpError::from_validation)?;

    state
        .service
        .account()
        .register(&request.email, &request.password)
        .await
        .map_err(|e| {
            error!("Stremio registration error for {}: {}", request.email, e);
            HttpError::from(e)
        })?;

    info!("User registered successfully with Stremio: {}", request.email);
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/stremio/login - Log this session into a Stremio account
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    ApiJson(request): ApiJson<CredentialsRequest>,
) -> HttpResult<Response> {
    request.validate().map_err(HttpError::from_validation)?;

    let auth_key = state
        .service
        .account()
        .login(&request.email, &request.password)
        .await
        .map_err(|e| HttpError::from_credentials(e, "Invalid credentials"))?;

    let data = SessionData {
        stremio: Some(StremioSession {
            auth_key,
            user: StremioUser {
                email: request.email.clone(),
            },
        }),
        ..session.data
    };
    let token = state.sessions.rotate(session.id.as_ref(), data).await?;

    info!("User logged in successfully to Stremio: {}", request.email);
    Ok((
        [(header::SET_COOKIE, state.sessions.cookie(&token))],
        Json(SuccessResponse::ok()),
    )
        .into_response())
}
