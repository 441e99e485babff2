use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Static description of one attribute catalog. One gateway and one handler
/// set serve all four catalogs instead of a hand-written copy per entity.
///
/// `table` is always one of the constants below, never user input, so it is
/// safe to splice into SQL.
#[derive(Debug)]
pub struct AttributeSpec {
    /// Capitalized singular used in error messages ("Gender id is required")
    pub singular: &'static str,
    /// Table name, also the URL collection segment
    pub table: &'static str,
    /// Categories carry only a name; sizes/colors/genders also carry a value
    pub has_value: bool,
}

pub static CATEGORIES: AttributeSpec = AttributeSpec {
    singular: "Category",
    table: "categories",
    has_value: false,
};

pub static SIZES: AttributeSpec = AttributeSpec {
    singular: "Size",
    table: "sizes",
    has_value: true,
};

pub static COLORS: AttributeSpec = AttributeSpec {
    singular: "Color",
    table: "colors",
    has_value: true,
};

pub static GENDERS: AttributeSpec = AttributeSpec {
    singular: "Gender",
    table: "genders",
    has_value: true,
};

/// A row in one of the attribute catalogs. `value` is None for categories.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttributeSpec {
    fn columns(&self) -> String {
        if self.has_value {
            "id, store_id, name, value, created_at, updated_at".to_string()
        } else {
            "id, store_id, name, NULL::text AS value, created_at, updated_at".to_string()
        }
    }
}

pub async fn list(
    pool: &PgPool,
    spec: &AttributeSpec,
    store_id: Uuid,
) -> Result<Vec<Attribute>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM {} WHERE store_id = $1 ORDER BY created_at DESC",
        spec.columns(),
        spec.table
    );
    sqlx::query_as::<_, Attribute>(&sql)
        .bind(store_id)
        .fetch_all(pool)
        .await
}

pub async fn find(
    pool: &PgPool,
    spec: &AttributeSpec,
    id: Uuid,
) -> Result<Option<Attribute>, sqlx::Error> {
    let sql = format!("SELECT {} FROM {} WHERE id = $1", spec.columns(), spec.table);
    sqlx::query_as::<_, Attribute>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Batch fetch by id, for attaching relations to product listings
pub async fn find_ids(
    pool: &PgPool,
    spec: &AttributeSpec,
    ids: &[Uuid],
) -> Result<Vec<Attribute>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let sql = format!("SELECT {} FROM {} WHERE id = ANY($1)", spec.columns(), spec.table);
    sqlx::query_as::<_, Attribute>(&sql)
        .bind(ids)
        .fetch_all(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    spec: &AttributeSpec,
    store_id: Uuid,
    name: &str,
    value: Option<&str>,
) -> Result<Attribute, sqlx::Error> {
    let sql = if spec.has_value {
        format!(
            "INSERT INTO {} (id, store_id, name, value) VALUES ($1, $2, $3, $4) RETURNING {}",
            spec.table,
            spec.columns()
        )
    } else {
        format!(
            "INSERT INTO {} (id, store_id, name) VALUES ($1, $2, $3) RETURNING {}",
            spec.table,
            spec.columns()
        )
    };

    let mut query = sqlx::query_as::<_, Attribute>(&sql)
        .bind(Uuid::new_v4())
        .bind(store_id)
        .bind(name);
    if spec.has_value {
        query = query.bind(value);
    }
    query.fetch_one(pool).await
}

/// Update-by-id scoped to the store. updateMany semantics: the affected row
/// count is the result, and a missing id yields a zero-count success.
pub async fn update(
    pool: &PgPool,
    spec: &AttributeSpec,
    store_id: Uuid,
    id: Uuid,
    name: &str,
    value: Option<&str>,
) -> Result<u64, sqlx::Error> {
    let result = if spec.has_value {
        let sql = format!(
            "UPDATE {} SET name = $1, value = $2, updated_at = now() WHERE id = $3 AND store_id = $4",
            spec.table
        );
        sqlx::query(&sql)
            .bind(name)
            .bind(value)
            .bind(id)
            .bind(store_id)
            .execute(pool)
            .await?
    } else {
        let sql = format!(
            "UPDATE {} SET name = $1, updated_at = now() WHERE id = $2 AND store_id = $3",
            spec.table
        );
        sqlx::query(&sql)
            .bind(name)
            .bind(id)
            .bind(store_id)
            .execute(pool)
            .await?
    };
    Ok(result.rows_affected())
}

/// deleteMany semantics: deleting an already-deleted id is a zero-count
/// success, not an error.
pub async fn delete(
    pool: &PgPool,
    spec: &AttributeSpec,
    store_id: Uuid,
    id: Uuid,
) -> Result<u64, sqlx::Error> {
    let sql = format!("DELETE FROM {} WHERE id = $1 AND store_id = $2", spec.table);
    let result = sqlx::query(&sql).bind(id).bind(store_id).execute(pool).await?;
    Ok(result.rows_affected())
}
