use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::CurrentUser;
use crate::db::stores::{self, Store};
use crate::error::ApiError;
use crate::state::AppState;

use super::{parse_id, require_string};

#[derive(Debug, Deserialize)]
pub struct StoreBody {
    pub name: Option<String>,
}

/// POST /api/stores - create a store owned by the caller
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<StoreBody>,
) -> Result<Json<Store>, ApiError> {
    let name = require_string(body.name.as_deref(), "Name")?;

    let store = stores::create(&state.db, user.id, &name)
        .await
        .map_err(|e| ApiError::internal("[STORES_POST]", e))?;
    Ok(Json(store))
}

/// GET /api/stores/:store_id - single store (public)
pub async fn find(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> Result<Json<Option<Store>>, ApiError> {
    let store_id = parse_id(&store_id, "Store id")?;
    // Missing rows come back as 200/null, not 404
    let store = stores::find(&state.db, store_id)
        .await
        .map_err(|e| ApiError::internal("[STORES_GET]", e))?;
    Ok(Json(store))
}

/// PATCH /api/stores/:store_id - rename, owner only.
/// The owner scope is part of the update predicate, so a store the caller
/// does not own yields a zero-count result rather than leaking existence.
pub async fn update(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    user: CurrentUser,
    Json(body): Json<StoreBody>,
) -> Result<Json<Value>, ApiError> {
    let name = require_string(body.name.as_deref(), "Name")?;
    let store_id = parse_id(&store_id, "Store id")?;

    let count = stores::update(&state.db, store_id, user.id, &name)
        .await
        .map_err(|e| ApiError::internal("[STORES_PATCH]", e))?;
    Ok(Json(json!({ "count": count })))
}

/// DELETE /api/stores/:store_id - owner only, idempotent
pub async fn delete(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    user: CurrentUser,
) -> Result<Json<Value>, ApiError> {
    let store_id = parse_id(&store_id, "Store id")?;

    let count = stores::delete(&state.db, store_id, user.id)
        .await
        .map_err(|e| ApiError::internal("[STORES_DELETE]", e))?;
    Ok(Json(json!({ "count": count })))
}
