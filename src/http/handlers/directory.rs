//! Public addon-index endpoints served to Stremio clients

use crate::core::addon::AddonEntry;
use crate::http::errors::{HttpError, HttpResult};
use crate::http::handlers::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

const CATALOG_TYPE: &str = "addon";
const CATALOG_ID: &str = "community";

/// GET /manifest.json - Manifest of this service as an addon index
pub async fn manifest() -> Json<Value> {
    Json(json!({
        "id": "community.stremio.addons-index",
        "version": "1.0.0",
        "name": "Stremio Addons Index",
        "description": "Index of Stremio addons with user synchronization",
        "types": ["movie", "series", "channel", "tv", "addon"],
        "catalogs": [{
            "type": CATALOG_TYPE,
            "id": CATALOG_ID,
            "name": "Community Addons"
        }],
        "resources": ["catalog"],
        "idPrefixes": ["addon"]
    }))
}

/// GET /catalog.json - Full curated list
pub async fn catalog_json(State(state): State<AppState>) -> HttpResult<Json<Vec<AddonEntry>>> {
    Ok(Json(state.service.addons().list().await?))
}

/// GET /catalog/:type/:id.json
///
/// Axum cannot split `:id.json` inside one segment, so the whole file name is
/// captured and the suffix stripped here.
pub async fn catalog(
    State(state): State<AppState>,
    Path((catalog_type, file)): Path<(String, String)>,
) -> HttpResult<Json<Vec<AddonEntry>>> {
    let id = file.strip_suffix(".json");
    if catalog_type != CATALOG_TYPE || id != Some(CATALOG_ID) {
        return Err(HttpError::NotFound("Catalog not found".to_string()));
    }

    Ok(Json(state.service.addons().list().await?))
}
