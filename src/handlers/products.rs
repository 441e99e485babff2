use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::CurrentUser;
use crate::db::products::{
    self, ProductDetail, ProductInput, ProductWithCategory, ProductWithImages,
};
use crate::error::ApiError;
use crate::state::AppState;

use super::{ensure_store_owner, parse_id, require_string};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub category_id: Option<String>,
    pub color_id: Option<String>,
    pub size_id: Option<String>,
    pub gender_id: Option<String>,
    pub images: Option<Vec<ImageBody>>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_archived: bool,
}

#[derive(Debug, Deserialize)]
pub struct ImageBody {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub category_id: Option<String>,
    pub is_featured: Option<String>,
}

/// Field checks in declared order, first failure wins: name, price,
/// quantity, categoryId, colorId, sizeId, genderId, images.
fn validate(body: &ProductBody) -> Result<(ProductInput, Vec<String>), ApiError> {
    let name = require_string(body.name.as_deref(), "Name")?;

    let price = match body.price {
        Some(p) if p > Decimal::ZERO => p,
        _ => return Err(ApiError::bad_request("Price is required")),
    };

    let quantity = match body.quantity {
        None => return Err(ApiError::bad_request("Quantity is required")),
        Some(q) if q < 0 || q > i32::MAX as i64 => {
            return Err(ApiError::bad_request("Quantity must be a non-negative integer"))
        }
        Some(q) => q as i32,
    };

    let category_id = parse_id(body.category_id.as_deref().unwrap_or(""), "Category id")?;
    let color_id = parse_id(body.color_id.as_deref().unwrap_or(""), "Color id")?;
    let size_id = parse_id(body.size_id.as_deref().unwrap_or(""), "Size id")?;
    let gender_id = parse_id(body.gender_id.as_deref().unwrap_or(""), "Gender id")?;

    let image_urls: Vec<String> = body
        .images
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|image| image.url.clone())
        .collect();
    if image_urls.is_empty() {
        return Err(ApiError::bad_request("Images are required"));
    }

    Ok((
        ProductInput {
            name,
            price,
            quantity,
            category_id,
            color_id,
            size_id,
            gender_id,
            is_featured: body.is_featured,
            is_archived: body.is_archived,
        },
        image_urls,
    ))
}

/// Every referenced attribute row must belong to the same store as the
/// product being written.
async fn ensure_scoped_references(
    state: &AppState,
    store_id: uuid::Uuid,
    input: &ProductInput,
    tag: &str,
) -> Result<(), ApiError> {
    match products::find_unscoped_reference(&state.db, store_id, input)
        .await
        .map_err(|e| ApiError::internal(tag, e))?
    {
        Some(label) => Err(ApiError::bad_request(format!("{label} id is invalid"))),
        None => Ok(()),
    }
}

/// GET /api/:store_id/products - storefront listing (public).
/// Archived rows are never served; `isFeatured` present-and-nonempty narrows
/// to featured rows; omitting it returns all non-archived rows.
pub async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<ProductWithCategory>>, ApiError> {
    let store_id = parse_id(&store_id, "Store id")?;

    let category_id = match query.category_id.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(parse_id(raw, "Category id")?),
        _ => None,
    };
    let featured_only = matches!(query.is_featured.as_deref(), Some(s) if !s.is_empty());

    let rows = products::list(&state.db, store_id, category_id, featured_only)
        .await
        .map_err(|e| ApiError::internal("[PRODUCTS_GET]", e))?;
    Ok(Json(rows))
}

/// GET /api/:store_id/products/:product_id - single product with relations
/// (public)
pub async fn find(
    State(state): State<AppState>,
    Path((_store_id, product_id)): Path<(String, String)>,
) -> Result<Json<Option<ProductDetail>>, ApiError> {
    let product_id = parse_id(&product_id, "Product id")?;
    // Missing rows come back as 200/null, not 404
    let row = products::find(&state.db, product_id)
        .await
        .map_err(|e| ApiError::internal("[PRODUCT_GET]", e))?;
    Ok(Json(row))
}

/// POST /api/:store_id/products - create with nested images (owner only)
pub async fn create(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    user: CurrentUser,
    Json(body): Json<ProductBody>,
) -> Result<Json<ProductWithImages>, ApiError> {
    let (input, image_urls) = validate(&body)?;
    let store_id = parse_id(&store_id, "Store id")?;
    ensure_store_owner(&state.db, store_id, &user).await?;
    ensure_scoped_references(&state, store_id, &input, "[PRODUCT_POST]").await?;

    let created = products::create(&state.db, store_id, &input, &image_urls)
        .await
        .map_err(|e| ApiError::internal("[PRODUCT_POST]", e))?;
    Ok(Json(created))
}

/// PATCH /api/:store_id/products/:product_id - update scalars and replace
/// the entire image set (owner only). Clients must resend every image they
/// want retained.
pub async fn update(
    State(state): State<AppState>,
    Path((store_id, product_id)): Path<(String, String)>,
    user: CurrentUser,
    Json(body): Json<ProductBody>,
) -> Result<Json<ProductWithImages>, ApiError> {
    let (input, image_urls) = validate(&body)?;
    let product_id = parse_id(&product_id, "Product id")?;
    let store_id = parse_id(&store_id, "Store id")?;
    ensure_store_owner(&state.db, store_id, &user).await?;
    ensure_scoped_references(&state, store_id, &input, "[PRODUCT_PATCH]").await?;

    let updated = products::update_with_images(&state.db, store_id, product_id, &input, &image_urls)
        .await
        .map_err(|e| ApiError::internal("[PRODUCT_PATCH]", e))?;
    Ok(Json(updated))
}

/// DELETE /api/:store_id/products/:product_id - owner only, idempotent.
/// Image rows vanish with the product via the cascade.
pub async fn delete(
    State(state): State<AppState>,
    Path((store_id, product_id)): Path<(String, String)>,
    user: CurrentUser,
) -> Result<Json<Value>, ApiError> {
    let product_id = parse_id(&product_id, "Product id")?;
    let store_id = parse_id(&store_id, "Store id")?;
    ensure_store_owner(&state.db, store_id, &user).await?;

    let count = products::delete(&state.db, store_id, product_id)
        .await
        .map_err(|e| ApiError::internal("[PRODUCT_DELETE]", e))?;
    Ok(Json(json!({ "count": count })))
}
