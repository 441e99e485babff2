use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// A tenant/workspace owning its own products and attribute catalogs
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const STORE_COLUMNS: &str = "id, owner_user_id, name, created_at, updated_at";

pub async fn create(pool: &PgPool, owner_user_id: Uuid, name: &str) -> Result<Store, sqlx::Error> {
    let sql = format!(
        "INSERT INTO stores (id, owner_user_id, name) VALUES ($1, $2, $3) RETURNING {STORE_COLUMNS}"
    );
    sqlx::query_as::<_, Store>(&sql)
        .bind(Uuid::new_v4())
        .bind(owner_user_id)
        .bind(name)
        .fetch_one(pool)
        .await
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Store>, sqlx::Error> {
    let sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = $1");
    sqlx::query_as::<_, Store>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// The ownership check: resolve the store only when the caller owns it.
/// Every mutation on a child entity is gated on this lookup.
pub async fn find_owned(
    pool: &PgPool,
    id: Uuid,
    owner_user_id: Uuid,
) -> Result<Option<Store>, sqlx::Error> {
    let sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = $1 AND owner_user_id = $2");
    sqlx::query_as::<_, Store>(&sql)
        .bind(id)
        .bind(owner_user_id)
        .fetch_optional(pool)
        .await
}

/// Update by id, scoped to the owner. Returns the affected row count;
/// a missing id is a zero-count success, not an error.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    owner_user_id: Uuid,
    name: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE stores SET name = $1, updated_at = now() WHERE id = $2 AND owner_user_id = $3",
    )
    .bind(name)
    .bind(id)
    .bind(owner_user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &PgPool, id: Uuid, owner_user_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM stores WHERE id = $1 AND owner_user_id = $2")
        .bind(id)
        .bind(owner_user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
