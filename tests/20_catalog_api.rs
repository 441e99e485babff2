//! End-to-end CRUD suite against a spawned server binary.
//!
//! Requires DATABASE_URL pointing at a Postgres database with the catalog
//! schema applied. Run with: `cargo test -- --ignored`

mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

struct Ctx {
    base_url: String,
    client: reqwest::Client,
    token: String,
}

async fn ctx() -> Result<Ctx> {
    let server = common::ensure_server().await?;
    Ok(Ctx {
        base_url: server.base_url.clone(),
        client: reqwest::Client::new(),
        token: common::bearer_for(Uuid::new_v4()),
    })
}

impl Ctx {
    async fn create_store(&self, name: &str) -> Result<String> {
        let res = self
            .client
            .post(format!("{}/api/stores", self.base_url))
            .header("authorization", &self.token)
            .json(&json!({ "name": name }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "store create failed");
        let body: Value = res.json().await?;
        Ok(body["id"].as_str().unwrap().to_string())
    }

    async fn create_attribute(&self, store: &str, catalog: &str, name: &str) -> Result<String> {
        let mut body = json!({ "name": name });
        if catalog != "categories" {
            body["value"] = json!(name.to_lowercase());
        }
        let res = self
            .client
            .post(format!("{}/api/{}/{}", self.base_url, store, catalog))
            .header("authorization", &self.token)
            .json(&body)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "{} create failed", catalog);
        let body: Value = res.json().await?;
        Ok(body["id"].as_str().unwrap().to_string())
    }

    async fn product_body(&self, store: &str, urls: &[&str]) -> Result<Value> {
        let category = self.create_attribute(store, "categories", "Shirts").await?;
        let color = self.create_attribute(store, "colors", "Black").await?;
        let size = self.create_attribute(store, "sizes", "Medium").await?;
        let gender = self.create_attribute(store, "genders", "Men").await?;
        let images: Vec<Value> = urls.iter().map(|u| json!({ "url": u })).collect();
        Ok(json!({
            "name": "Tee",
            "price": "19.99",
            "quantity": 4,
            "categoryId": category,
            "colorId": color,
            "sizeId": size,
            "genderId": gender,
            "images": images,
        }))
    }
}

fn image_urls(product: &Value) -> Vec<String> {
    product["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["url"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
#[ignore = "requires DATABASE_URL with the catalog schema applied"]
async fn gender_crud_roundtrip() -> Result<()> {
    let ctx = ctx().await?;
    let store = ctx.create_store("Roundtrip").await?;

    let gender = ctx.create_attribute(&store, "genders", "Men").await?;

    // Collection is newest-first and contains the new row
    let list: Value = ctx
        .client
        .get(format!("{}/api/{}/genders", ctx.base_url, store))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(list[0]["id"], json!(gender));

    // updateMany semantics: a missing id is a zero-count success
    let res = ctx
        .client
        .patch(format!("{}/api/{}/genders/{}", ctx.base_url, store, Uuid::new_v4()))
        .header("authorization", &ctx.token)
        .json(&json!({"name": "Women", "value": "women"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["count"], json!(0));

    // Real update counts one row
    let res = ctx
        .client
        .patch(format!("{}/api/{}/genders/{}", ctx.base_url, store, gender))
        .header("authorization", &ctx.token)
        .json(&json!({"name": "Women", "value": "women"}))
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["count"], json!(1));

    // Delete is idempotent: first call counts one, second counts zero
    for expected in [1, 0] {
        let res = ctx
            .client
            .delete(format!("{}/api/{}/genders/{}", ctx.base_url, store, gender))
            .header("authorization", &ctx.token)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await?;
        assert_eq!(body["count"], json!(expected));
    }

    Ok(())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL with the catalog schema applied"]
async fn missing_single_record_is_200_null() -> Result<()> {
    let ctx = ctx().await?;
    let store = ctx.create_store("NullStore").await?;

    let res = ctx
        .client
        .get(format!("{}/api/{}/genders/{}", ctx.base_url, store, Uuid::new_v4()))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert!(body.is_null());
    Ok(())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL with the catalog schema applied"]
async fn foreign_owner_is_403_and_mutates_nothing() -> Result<()> {
    let ctx = ctx().await?;
    let store = ctx.create_store("Owned").await?;
    let gender = ctx.create_attribute(&store, "genders", "Men").await?;

    let intruder = common::bearer_for(Uuid::new_v4());
    let res = ctx
        .client
        .patch(format!("{}/api/{}/genders/{}", ctx.base_url, store, gender))
        .header("authorization", &intruder)
        .json(&json!({"name": "Hacked", "value": "hacked"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(res.text().await?, "Unauthorized");

    // Row is untouched
    let body: Value = ctx
        .client
        .get(format!("{}/api/{}/genders/{}", ctx.base_url, store, gender))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["name"], json!("Men"));
    Ok(())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL with the catalog schema applied"]
async fn non_owner_store_mutations_are_zero_count() -> Result<()> {
    let ctx = ctx().await?;
    let store = ctx.create_store("Mine").await?;

    // The owner scope sits in the mutation predicate: another user's PATCH
    // and DELETE succeed with count 0 and leave the store untouched.
    let intruder = common::bearer_for(Uuid::new_v4());
    let res = ctx
        .client
        .patch(format!("{}/api/stores/{}", ctx.base_url, store))
        .header("authorization", &intruder)
        .json(&json!({"name": "Taken"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["count"], json!(0));

    let res = ctx
        .client
        .delete(format!("{}/api/stores/{}", ctx.base_url, store))
        .header("authorization", &intruder)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["count"], json!(0));

    let body: Value = ctx
        .client
        .get(format!("{}/api/stores/{}", ctx.base_url, store))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["name"], json!("Mine"));

    // The owner's own delete counts the row
    let res = ctx
        .client
        .delete(format!("{}/api/stores/{}", ctx.base_url, store))
        .header("authorization", &ctx.token)
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["count"], json!(1));

    Ok(())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL with the catalog schema applied"]
async fn product_image_replacement_law() -> Result<()> {
    let ctx = ctx().await?;
    let store = ctx.create_store("Images").await?;

    let mut body = ctx.product_body(&store, &["https://cdn/a", "https://cdn/b"]).await?;
    let res = ctx
        .client
        .post(format!("{}/api/{}/products", ctx.base_url, store))
        .header("authorization", &ctx.token)
        .json(&body)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let created: Value = res.json().await?;
    let product_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(image_urls(&created), vec!["https://cdn/a", "https://cdn/b"]);

    // Round-trip preserves creation order
    let fetched: Value = ctx
        .client
        .get(format!("{}/api/{}/products/{}", ctx.base_url, store, product_id))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(image_urls(&fetched), vec!["https://cdn/a", "https://cdn/b"]);

    // Full replace, not merge
    body["images"] = json!([{"url": "https://cdn/c"}]);
    let res = ctx
        .client
        .patch(format!("{}/api/{}/products/{}", ctx.base_url, store, product_id))
        .header("authorization", &ctx.token)
        .json(&body)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(image_urls(&updated), vec!["https://cdn/c"]);

    Ok(())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL with the catalog schema applied"]
async fn product_filter_law() -> Result<()> {
    let ctx = ctx().await?;
    let store = ctx.create_store("Filters").await?;

    let base = ctx.product_body(&store, &["https://cdn/a"]).await?;

    let mut featured = base.clone();
    featured["name"] = json!("Featured");
    featured["isFeatured"] = json!(true);

    let mut plain = base.clone();
    plain["name"] = json!("Plain");

    let mut archived = base;
    archived["name"] = json!("Archived");
    archived["isArchived"] = json!(true);

    for body in [&featured, &plain, &archived] {
        let res = ctx
            .client
            .post(format!("{}/api/{}/products", ctx.base_url, store))
            .header("authorization", &ctx.token)
            .json(body)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    // Featured filter excludes plain and archived rows
    let list: Value = ctx
        .client
        .get(format!("{}/api/{}/products?isFeatured=true", ctx.base_url, store))
        .send()
        .await?
        .json()
        .await?;
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Featured"]);

    // Omitting the filter returns all non-archived rows, newest first
    let list: Value = ctx
        .client
        .get(format!("{}/api/{}/products", ctx.base_url, store))
        .send()
        .await?
        .json()
        .await?;
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Plain", "Featured"]);

    Ok(())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL with the catalog schema applied"]
async fn cross_store_references_are_rejected() -> Result<()> {
    let ctx = ctx().await?;
    let store_a = ctx.create_store("A").await?;
    let store_b = ctx.create_store("B").await?;

    // Category belongs to store B, product targets store A
    let mut body = ctx.product_body(&store_a, &["https://cdn/a"]).await?;
    let foreign_category = ctx.create_attribute(&store_b, "categories", "Foreign").await?;
    body["categoryId"] = json!(foreign_category);

    let res = ctx
        .client
        .post(format!("{}/api/{}/products", ctx.base_url, store_a))
        .header("authorization", &ctx.token)
        .json(&body)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.text().await?, "Category id is invalid");

    Ok(())
}
