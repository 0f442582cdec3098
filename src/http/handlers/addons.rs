//! Curated addon handlers

use crate::core::addon::AddonEntry;
use crate::http::errors::HttpResult;
use crate::http::extract::ApiJson;
use crate::http::handlers::AppState;
use crate::http::models::{AddAddonRequest, ImportRequest, ImportResponse, SuccessResponse};
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::warn;

/// GET /api/addons
pub async fn list_addons(State(state): State<AppState>) -> HttpResult<Json<Vec<AddonEntry>>> {
    Ok(Json(state.service.addons().list().await?))
}

/// POST /api/addons - Fetch a manifest and add it to the registry
pub async fn add_addon(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddAddonRequest>,
) -> HttpResult<Json<SuccessResponse>> {
    let url = request.url.unwrap_or_default();
    state.service.addons().add(&url).await?;

    Ok(Json(SuccessResponse::with_message("Addon added successfully")))
}

/// DELETE /api/addons/:id
pub async fn delete_addon(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HttpResult<Json<SuccessResponse>> {
    state.service.addons().remove(&id).await?;

    Ok(Json(SuccessResponse::with_message(
        "Addon deleted successfully",
    )))
}

/// GET /api/export
pub async fn export_addons(State(state): State<AppState>) -> HttpResult<Json<Vec<AddonEntry>>> {
    Ok(Json(state.service.addons().export().await?))
}

/// POST /api/import - Bulk import previously exported entries
pub async fn import_addons(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ImportRequest>,
) -> HttpResult<Json<ImportResponse>> {
    let mut malformed = 0;
    let entries: Vec<AddonEntry> = request
        .into_values()
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping malformed import entry: {}", e);
                malformed += 1;
                None
            }
        })
        .collect();

    let mut results = state.service.addons().import(entries).await?;
    results.failed += malformed;

    Ok(Json(ImportResponse {
        success: true,
        results,
    }))
}
