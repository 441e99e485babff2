use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::attributes::{self, Attribute, CATEGORIES, COLORS, GENDERS, SIZES};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub category_id: Uuid,
    pub color_id: Uuid,
    pub size_id: Uuid,
    pub gender_id: Uuid,
    pub is_featured: bool,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Image rows are fully owned by their product: created and replaced only
/// through product writes, removed by cascade on product delete. `position`
/// records submission order so listings come back in creation order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: Uuid,
    pub product_id: Uuid,
    pub url: String,
    #[serde(skip_serializing)]
    pub position: i32,
}

/// Validated scalar fields for a product write
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub category_id: Uuid,
    pub color_id: Uuid,
    pub size_id: Uuid,
    pub gender_id: Uuid,
    pub is_featured: bool,
    pub is_archived: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithImages {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<Image>,
}

/// Listing shape: images plus the category row, as served to storefronts
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithCategory {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<Image>,
    pub category: Option<Attribute>,
}

/// Single-record shape: every relation attached
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<Image>,
    pub category: Option<Attribute>,
    pub size: Option<Attribute>,
    pub color: Option<Attribute>,
    pub gender: Option<Attribute>,
}

const PRODUCT_COLUMNS: &str = "id, store_id, name, price, quantity, category_id, color_id, \
     size_id, gender_id, is_featured, is_archived, created_at, updated_at";

/// Create the product row and its image rows in one transaction.
pub async fn create(
    pool: &PgPool,
    store_id: Uuid,
    input: &ProductInput,
    image_urls: &[String],
) -> Result<ProductWithImages, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let sql = format!(
        "INSERT INTO products \
         (id, store_id, name, price, quantity, category_id, color_id, size_id, gender_id, is_featured, is_archived) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {PRODUCT_COLUMNS}"
    );
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(Uuid::new_v4())
        .bind(store_id)
        .bind(&input.name)
        .bind(input.price)
        .bind(input.quantity)
        .bind(input.category_id)
        .bind(input.color_id)
        .bind(input.size_id)
        .bind(input.gender_id)
        .bind(input.is_featured)
        .bind(input.is_archived)
        .fetch_one(&mut *tx)
        .await?;

    let images = insert_images(&mut tx, product.id, image_urls).await?;

    tx.commit().await?;
    Ok(ProductWithImages { product, images })
}

/// Update scalars and replace the full image set in one transaction.
///
/// Replacement is non-incremental: the submitted list becomes the entire set,
/// so clients must resend every image they want retained. Running the delete
/// and reinsert inside one transaction closes the partial-failure window a
/// two-statement sequence would leave.
pub async fn update_with_images(
    pool: &PgPool,
    store_id: Uuid,
    product_id: Uuid,
    input: &ProductInput,
    image_urls: &[String],
) -> Result<ProductWithImages, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let sql = format!(
        "UPDATE products SET \
         name = $1, price = $2, quantity = $3, category_id = $4, color_id = $5, \
         size_id = $6, gender_id = $7, is_featured = $8, is_archived = $9, updated_at = now() \
         WHERE id = $10 AND store_id = $11 \
         RETURNING {PRODUCT_COLUMNS}"
    );
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(&input.name)
        .bind(input.price)
        .bind(input.quantity)
        .bind(input.category_id)
        .bind(input.color_id)
        .bind(input.size_id)
        .bind(input.gender_id)
        .bind(input.is_featured)
        .bind(input.is_archived)
        .bind(product_id)
        .bind(store_id)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM product_images WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

    let images = insert_images(&mut tx, product_id, image_urls).await?;

    tx.commit().await?;
    Ok(ProductWithImages { product, images })
}

async fn insert_images(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product_id: Uuid,
    urls: &[String],
) -> Result<Vec<Image>, sqlx::Error> {
    let mut images = Vec::with_capacity(urls.len());
    for (position, url) in urls.iter().enumerate() {
        let image = sqlx::query_as::<_, Image>(
            "INSERT INTO product_images (id, product_id, url, position) \
             VALUES ($1, $2, $3, $4) RETURNING id, product_id, url, position",
        )
        .bind(Uuid::new_v4())
        .bind(product_id)
        .bind(url)
        .bind(position as i32)
        .fetch_one(&mut **tx)
        .await?;
        images.push(image);
    }
    Ok(images)
}

/// Storefront listing: non-archived rows, newest first, optionally narrowed
/// to a category or to featured products, each with images and category.
pub async fn list(
    pool: &PgPool,
    store_id: Uuid,
    category_id: Option<Uuid>,
    featured_only: bool,
) -> Result<Vec<ProductWithCategory>, sqlx::Error> {
    let mut sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE store_id = $1 AND is_archived = FALSE"
    );
    if category_id.is_some() {
        sql.push_str(" AND category_id = $2");
    }
    if featured_only {
        sql.push_str(" AND is_featured = TRUE");
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut query = sqlx::query_as::<_, Product>(&sql).bind(store_id);
    if let Some(category_id) = category_id {
        query = query.bind(category_id);
    }
    let products = query.fetch_all(pool).await?;

    let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let mut images_by_product = images_for(pool, &ids).await?;

    let category_ids: Vec<Uuid> = products.iter().map(|p| p.category_id).collect();
    let categories: HashMap<Uuid, Attribute> = attributes::find_ids(pool, &CATEGORIES, &category_ids)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    Ok(products
        .into_iter()
        .map(|product| {
            let images = images_by_product.remove(&product.id).unwrap_or_default();
            let category = categories.get(&product.category_id).cloned();
            ProductWithCategory {
                product,
                images,
                category,
            }
        })
        .collect())
}

/// Single-record fetch with all relations attached. Reads are not scoped to
/// an owner; a missing id is simply None.
pub async fn find(pool: &PgPool, product_id: Uuid) -> Result<Option<ProductDetail>, sqlx::Error> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
    let Some(product) = sqlx::query_as::<_, Product>(&sql)
        .bind(product_id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };

    let mut images_by_product = images_for(pool, &[product.id]).await?;
    let images = images_by_product.remove(&product.id).unwrap_or_default();

    let category = attributes::find(pool, &CATEGORIES, product.category_id).await?;
    let size = attributes::find(pool, &SIZES, product.size_id).await?;
    let color = attributes::find(pool, &COLORS, product.color_id).await?;
    let gender = attributes::find(pool, &GENDERS, product.gender_id).await?;

    Ok(Some(ProductDetail {
        product,
        images,
        category,
        size,
        color,
        gender,
    }))
}

/// deleteMany semantics: missing ids are a zero-count success. Image rows
/// vanish with their product via the cascade.
pub async fn delete(pool: &PgPool, store_id: Uuid, product_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1 AND store_id = $2")
        .bind(product_id)
        .bind(store_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Verify every referenced attribute row belongs to the product's store.
/// Returns the singular name of the first reference that does not.
pub async fn find_unscoped_reference(
    pool: &PgPool,
    store_id: Uuid,
    input: &ProductInput,
) -> Result<Option<&'static str>, sqlx::Error> {
    let refs = [
        (&CATEGORIES, input.category_id),
        (&COLORS, input.color_id),
        (&SIZES, input.size_id),
        (&GENDERS, input.gender_id),
    ];

    for (spec, id) in refs {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1 AND store_id = $2)",
            spec.table
        );
        let (exists,): (bool,) = sqlx::query_as(&sql)
            .bind(id)
            .bind(store_id)
            .fetch_one(pool)
            .await?;
        if !exists {
            return Ok(Some(spec.singular));
        }
    }
    Ok(None)
}

async fn images_for(
    pool: &PgPool,
    product_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Image>>, sqlx::Error> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let images = sqlx::query_as::<_, Image>(
        "SELECT id, product_id, url, position FROM product_images \
         WHERE product_id = ANY($1) ORDER BY position",
    )
    .bind(product_ids)
    .fetch_all(pool)
    .await?;

    let mut by_product: HashMap<Uuid, Vec<Image>> = HashMap::new();
    for image in images {
        by_product.entry(image.product_id).or_default().push(image);
    }
    Ok(by_product)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_serialize_without_position() {
        let image = Image {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            url: "https://cdn.example.com/a.png".to_string(),
            position: 3,
        };
        let value = serde_json::to_value(&image).unwrap();
        assert!(value.get("position").is_none());
        assert_eq!(value["url"], "https://cdn.example.com/a.png");
        assert!(value.get("productId").is_some());
    }

    #[test]
    fn product_wire_shape_is_camel_case() {
        let product = Product {
            id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            name: "Tee".to_string(),
            price: Decimal::new(1999, 2),
            quantity: 4,
            category_id: Uuid::new_v4(),
            color_id: Uuid::new_v4(),
            size_id: Uuid::new_v4(),
            gender_id: Uuid::new_v4(),
            is_featured: true,
            is_archived: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(ProductWithImages {
            product,
            images: vec![],
        })
        .unwrap();
        assert!(value.get("isFeatured").is_some());
        assert!(value.get("categoryId").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["images"], serde_json::json!([]));
    }
}
