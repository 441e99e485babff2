//! Auth and validation ordering tests, run in-process against the router.
//! Every request here is rejected before any database work happens, so the
//! suite runs without Postgres.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

fn request(method: Method, uri: String, auth: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn mutations_without_token_are_401() {
    let app = common::test_app();
    let store = Uuid::new_v4();
    let gender = Uuid::new_v4();

    let res = app
        .clone()
        .oneshot(request(
            Method::PATCH,
            format!("/api/{}/genders/{}", store, gender),
            None,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(common::body_text(res).await, "Unauthenticated");

    let res = app
        .oneshot(request(
            Method::DELETE,
            format!("/api/{}/products/{}", store, Uuid::new_v4()),
            None,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_tokens_are_401() {
    let app = common::test_app();
    let res = app
        .oneshot(request(
            Method::POST,
            format!("/api/{}/genders", Uuid::new_v4()),
            Some("Bearer not.a.jwt"),
            json!({"name": "Men", "value": "men"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(common::body_text(res).await, "Unauthenticated");
}

#[tokio::test]
async fn auth_runs_before_field_validation() {
    // Missing token AND empty body: the 401 wins
    let app = common::test_app();
    let res = app
        .oneshot(request(
            Method::POST,
            format!("/api/{}/genders", Uuid::new_v4()),
            None,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn gender_fields_are_checked_in_order() {
    let app = common::test_app();
    let auth = common::bearer_for(Uuid::new_v4());
    let uri = format!("/api/{}/genders", Uuid::new_v4());

    let res = app
        .clone()
        .oneshot(request(Method::POST, uri.clone(), Some(&auth), json!({})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body_text(res).await, "Name is required");

    let res = app
        .oneshot(request(
            Method::POST,
            uri,
            Some(&auth),
            json!({"name": "Men"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body_text(res).await, "Value is required");
}

#[tokio::test]
async fn malformed_store_id_fails_after_field_checks() {
    // Valid body, junk store id: the path check runs after the body checks
    let app = common::test_app();
    let auth = common::bearer_for(Uuid::new_v4());

    let res = app
        .oneshot(request(
            Method::POST,
            "/api/not-a-store/categories".to_string(),
            Some(&auth),
            json!({"name": "Shirts"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body_text(res).await, "Store id is required");
}

#[tokio::test]
async fn product_validation_is_first_failure_wins() {
    let app = common::test_app();
    let auth = common::bearer_for(Uuid::new_v4());
    let uri = format!("/api/{}/products", Uuid::new_v4());

    // price and images both missing: price is declared first
    let res = app
        .clone()
        .oneshot(request(
            Method::POST,
            uri.clone(),
            Some(&auth),
            json!({
                "name": "Tee",
                "quantity": 3,
                "categoryId": Uuid::new_v4(),
                "colorId": Uuid::new_v4(),
                "sizeId": Uuid::new_v4(),
                "genderId": Uuid::new_v4(),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body_text(res).await, "Price is required");

    // Everything present except images
    let res = app
        .oneshot(request(
            Method::POST,
            uri,
            Some(&auth),
            json!({
                "name": "Tee",
                "price": "19.99",
                "quantity": 3,
                "categoryId": Uuid::new_v4(),
                "colorId": Uuid::new_v4(),
                "sizeId": Uuid::new_v4(),
                "genderId": Uuid::new_v4(),
                "images": [],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body_text(res).await, "Images are required");
}

#[tokio::test]
async fn product_create_requires_every_reference_id() {
    // colorId, sizeId, and genderId are required on create, same as update
    let app = common::test_app();
    let auth = common::bearer_for(Uuid::new_v4());
    let uri = format!("/api/{}/products", Uuid::new_v4());

    for (missing, message) in [
        ("categoryId", "Category id is required"),
        ("colorId", "Color id is required"),
        ("sizeId", "Size id is required"),
        ("genderId", "Gender id is required"),
    ] {
        let mut body = json!({
            "name": "Tee",
            "price": "19.99",
            "quantity": 3,
            "categoryId": Uuid::new_v4(),
            "colorId": Uuid::new_v4(),
            "sizeId": Uuid::new_v4(),
            "genderId": Uuid::new_v4(),
            "images": [{"url": "https://cdn.example.com/a.png"}],
        });
        body.as_object_mut().unwrap().remove(missing);

        let res = app
            .clone()
            .oneshot(request(Method::POST, uri.clone(), Some(&auth), body))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(common::body_text(res).await, message);
    }
}

#[tokio::test]
async fn malformed_record_ids_are_400() {
    let app = common::test_app();
    let store = Uuid::new_v4();

    // Single-record reads are public but still require a well-formed id
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri(format!("/api/{}/genders/not-an-id", store))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body_text(res).await, "Gender id is required");

    // Mutations check the record id after the body fields
    let auth = common::bearer_for(Uuid::new_v4());
    let res = app
        .oneshot(request(
            Method::PATCH,
            format!("/api/{}/products/not-an-id", store),
            Some(&auth),
            json!({
                "name": "Tee",
                "price": "19.99",
                "quantity": 3,
                "categoryId": Uuid::new_v4(),
                "colorId": Uuid::new_v4(),
                "sizeId": Uuid::new_v4(),
                "genderId": Uuid::new_v4(),
                "images": [{"url": "https://cdn.example.com/a.png"}],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body_text(res).await, "Product id is required");
}

#[tokio::test]
async fn store_create_requires_name() {
    let app = common::test_app();
    let auth = common::bearer_for(Uuid::new_v4());

    let res = app
        .oneshot(request(
            Method::POST,
            "/api/stores".to_string(),
            Some(&auth),
            json!({"name": "  "}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body_text(res).await, "Name is required");
}

#[tokio::test]
async fn index_lists_the_api_surface() {
    let app = common::test_app();
    let res = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&common::body_text(res).await).unwrap();
    assert_eq!(body["name"], "Catalog Admin API");
    assert!(body["endpoints"].get("products").is_some());
}
