//! Managed user handlers

use crate::core::sync::BulkSyncResult;
use crate::http::errors::{HttpError, HttpResult};
use crate::http::extract::ApiJson;
use crate::http::handlers::AppState;
use crate::http::models::{CredentialsRequest, SuccessResponse, SyncResponse, UserListResponse};
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;
use validator::Validate;

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> HttpResult<Json<UserListResponse>> {
    let users = state.service.users().list().await?;
    Ok(Json(users))
}

/// POST /api/users - Add a managed user after checking the credentials
pub async fn add_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialsRequest>,
) -> HttpResult<Json<SuccessResponse>> {
    request.validate().map_err(HttpError::from_validation)?;

    state
        .service
        .users()
        .add(&request.email, &request.password)
        .await
        .map_err(|e| HttpError::from_credentials(e, "Invalid Stremio credentials"))?;

    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /api/users/:email
pub async fn delete_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> HttpResult<Json<SuccessResponse>> {
    state.service.users().remove(&email).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/users/:email/sync - Push the combined collection to one account
pub async fn sync_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> HttpResult<Json<SyncResponse>> {
    debug!("Starting user sync for {}", email);

    let report = state
        .service
        .sync()
        .sync_user(&email)
        .await
        .map_err(|e| HttpError::from_credentials(e, "Failed to authenticate with Stremio"))?;

    Ok(Json(SyncResponse {
        success: true,
        report,
    }))
}

/// POST /api/users/sync - Sync every managed account in turn
pub async fn sync_all_users(
    State(state): State<AppState>,
) -> HttpResult<Json<Vec<BulkSyncResult>>> {
    let results = state.service.sync().sync_all().await?;
    Ok(Json(results))
}
