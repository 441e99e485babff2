use axum::{
    extract::{Extension, Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::CurrentUser;
use crate::db::attributes::{self, Attribute, AttributeSpec};
use crate::error::ApiError;
use crate::state::AppState;

use super::{ensure_store_owner, parse_id, require_string};

/// Request body shared by all four catalogs; `value` is ignored for
/// categories.
#[derive(Debug, Deserialize)]
pub struct AttributeBody {
    pub name: Option<String>,
    pub value: Option<String>,
}

fn tag(spec: &AttributeSpec, op: &str) -> String {
    format!("[{}_{}]", spec.table.to_uppercase(), op)
}

/// Checks run in fixed order: name, then value (where the catalog has one).
/// The first failing field produces the response.
fn validate(
    spec: &AttributeSpec,
    body: &AttributeBody,
) -> Result<(String, Option<String>), ApiError> {
    let name = require_string(body.name.as_deref(), "Name")?;
    let value = if spec.has_value {
        Some(require_string(body.value.as_deref(), "Value")?)
    } else {
        None
    };
    Ok((name, value))
}

/// GET /api/:store_id/{catalog} - list rows, newest first (public)
pub async fn list(
    State(state): State<AppState>,
    Extension(spec): Extension<&'static AttributeSpec>,
    Path(store_id): Path<String>,
) -> Result<Json<Vec<Attribute>>, ApiError> {
    let store_id = parse_id(&store_id, "Store id")?;
    let rows = attributes::list(&state.db, spec, store_id)
        .await
        .map_err(|e| ApiError::internal(&tag(spec, "GET"), e))?;
    Ok(Json(rows))
}

/// GET /api/:store_id/{catalog}/:id - single row (public)
pub async fn find(
    State(state): State<AppState>,
    Extension(spec): Extension<&'static AttributeSpec>,
    Path((_store_id, id)): Path<(String, String)>,
) -> Result<Json<Option<Attribute>>, ApiError> {
    let id = parse_id(&id, &format!("{} id", spec.singular))?;
    // A missing row serializes as 200/null rather than 404; storefront
    // clients treat null as absent.
    let row = attributes::find(&state.db, spec, id)
        .await
        .map_err(|e| ApiError::internal(&tag(spec, "GET"), e))?;
    Ok(Json(row))
}

/// POST /api/:store_id/{catalog} - create a row (owner only)
pub async fn create(
    State(state): State<AppState>,
    Extension(spec): Extension<&'static AttributeSpec>,
    Path(store_id): Path<String>,
    user: CurrentUser,
    Json(body): Json<AttributeBody>,
) -> Result<Json<Attribute>, ApiError> {
    let (name, value) = validate(spec, &body)?;
    let store_id = parse_id(&store_id, "Store id")?;
    ensure_store_owner(&state.db, store_id, &user).await?;

    let row = attributes::create(&state.db, spec, store_id, &name, value.as_deref())
        .await
        .map_err(|e| ApiError::internal(&tag(spec, "POST"), e))?;
    Ok(Json(row))
}

/// PATCH /api/:store_id/{catalog}/:id - update by id (owner only)
///
/// updateMany semantics: the response is the affected row count, and a
/// missing id is a zero-count success.
pub async fn update(
    State(state): State<AppState>,
    Extension(spec): Extension<&'static AttributeSpec>,
    Path((store_id, id)): Path<(String, String)>,
    user: CurrentUser,
    Json(body): Json<AttributeBody>,
) -> Result<Json<Value>, ApiError> {
    let (name, value) = validate(spec, &body)?;
    let id = parse_id(&id, &format!("{} id", spec.singular))?;
    let store_id = parse_id(&store_id, "Store id")?;
    ensure_store_owner(&state.db, store_id, &user).await?;

    let count = attributes::update(&state.db, spec, store_id, id, &name, value.as_deref())
        .await
        .map_err(|e| ApiError::internal(&tag(spec, "PATCH"), e))?;
    Ok(Json(json!({ "count": count })))
}

/// DELETE /api/:store_id/{catalog}/:id - delete by id (owner only, idempotent)
pub async fn delete(
    State(state): State<AppState>,
    Extension(spec): Extension<&'static AttributeSpec>,
    Path((store_id, id)): Path<(String, String)>,
    user: CurrentUser,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, &format!("{} id", spec.singular))?;
    let store_id = parse_id(&store_id, "Store id")?;
    ensure_store_owner(&state.db, store_id, &user).await?;

    let count = attributes::delete(&state.db, spec, store_id, id)
        .await
        .map_err(|e| ApiError::internal(&tag(spec, "DELETE"), e))?;
    Ok(Json(json!({ "count": count })))
}
