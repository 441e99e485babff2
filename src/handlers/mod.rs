pub mod attributes;
pub mod products;
pub mod stores;

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::db;
use crate::error::ApiError;

/// Parse a path or body id. Empty and malformed ids both fail the
/// "<label> is required" check, keeping the observed 400 contract.
pub(crate) fn parse_id(raw: &str, label: &str) -> Result<Uuid, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request(format!("{label} is required")));
    }
    Uuid::parse_str(trimmed).map_err(|_| ApiError::bad_request(format!("{label} is required")))
}

/// Required-string check for body fields, first-failure-wins style
pub(crate) fn require_string(value: Option<&str>, label: &str) -> Result<String, ApiError> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(ApiError::bad_request(format!("{label} is required"))),
    }
}

/// The ownership gate: the caller must own the store before any mutation on
/// it or its children proceeds. Runs after field validation, never on reads.
pub(crate) async fn ensure_store_owner(
    pool: &PgPool,
    store_id: Uuid,
    user: &CurrentUser,
) -> Result<(), ApiError> {
    let owned = db::stores::find_owned(pool, store_id, user.id)
        .await
        .map_err(|e| ApiError::internal("[OWNERSHIP]", e))?;
    if owned.is_none() {
        return Err(ApiError::forbidden("Unauthorized"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_empty_and_malformed() {
        assert!(parse_id("", "Store id").is_err());
        assert!(parse_id("  ", "Store id").is_err());
        assert!(parse_id("not-a-uuid", "Store id").is_err());

        let err = parse_id("", "Gender id").unwrap_err();
        assert_eq!(err.message(), "Gender id is required");

        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "Store id").unwrap(), id);
    }

    #[test]
    fn require_string_trims_and_rejects_blank() {
        assert_eq!(require_string(Some("  Men "), "Name").unwrap(), "Men");
        assert_eq!(
            require_string(Some("   "), "Name").unwrap_err().message(),
            "Name is required"
        );
        assert_eq!(
            require_string(None, "Value").unwrap_err().message(),
            "Value is required"
        );
    }
}
