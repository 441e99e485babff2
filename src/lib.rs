pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod state;

use axum::{extract::State, routing::get, Extension, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::attributes::{AttributeSpec, CATEGORIES, COLORS, GENDERS, SIZES};
use crate::state::AppState;

/// Build the full application router over the shared state.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Store management
        .merge(store_routes())
        // Attribute catalogs (categories, sizes, colors, genders)
        .merge(attribute_routes(&CATEGORIES))
        .merge(attribute_routes(&SIZES))
        .merge(attribute_routes(&COLORS))
        .merge(attribute_routes(&GENDERS))
        // Products
        .merge(product_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn store_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::stores;

    Router::new()
        .route("/api/stores", post(stores::create))
        .route(
            "/api/stores/:store_id",
            get(stores::find)
                .patch(stores::update)
                .delete(stores::delete),
        )
}

/// One route set serves all four attribute catalogs; the spec rides along as
/// an extension so the shared handlers know which table and messages to use.
fn attribute_routes(spec: &'static AttributeSpec) -> Router<AppState> {
    use handlers::attributes;

    Router::new()
        .route(
            &format!("/api/:store_id/{}", spec.table),
            get(attributes::list).post(attributes::create),
        )
        .route(
            &format!("/api/:store_id/{}/:id", spec.table),
            get(attributes::find)
                .patch(attributes::update)
                .delete(attributes::delete),
        )
        .layer(Extension(spec))
}

fn product_routes() -> Router<AppState> {
    use handlers::products;

    Router::new()
        .route(
            "/api/:store_id/products",
            get(products::list).post(products::create),
        )
        .route(
            "/api/:store_id/products/:product_id",
            get(products::find)
                .patch(products::update)
                .delete(products::delete),
        )
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Catalog Admin API",
        "version": version,
        "description": "Admin backend for a multi-store e-commerce catalog",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "stores": "/api/stores[/:storeId] (mutations require bearer token)",
            "categories": "/api/:storeId/categories[/:id]",
            "sizes": "/api/:storeId/sizes[/:id]",
            "colors": "/api/:storeId/colors[/:id]",
            "genders": "/api/:storeId/genders[/:id]",
            "products": "/api/:storeId/products[/:productId]",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match db::health_check(&state.db).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
