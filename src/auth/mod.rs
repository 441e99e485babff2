use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::error::ApiError;

/// JWT claims carried by the bearer token. The token issuer (the auth
/// provider) is an external collaborator; this service only validates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Caller's user id
    pub sub: Uuid,
    /// Expiry, seconds since epoch
    pub exp: usize,
}

/// Authenticated caller identity, extracted per-request from the bearer JWT.
///
/// Mutating handlers take this as an argument; read-only GET handlers do not
/// (reads are intentionally public). A missing or invalid token rejects with
/// 401 before any validation or database work.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Unauthenticated"))?;

        let claims = validate_token(&token, &config::config().security.jwt_secret)
            .map_err(|_| ApiError::unauthorized("Unauthenticated"))?;

        Ok(CurrentUser { id: claims.sub })
    }
}

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))?
        .to_str()
        .ok()?;

    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Validate a JWT and return its claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, String> {
    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid JWT token: {}", e))?;

    Ok(token_data.claims)
}

/// Mint a token for the given user. Used by the CLI `token` command and the
/// test harness; the production issuer lives outside this service.
pub fn issue_token(user_id: Uuid, secret: &str, expiry_hours: u64) -> Result<String, String> {
    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let exp = Utc::now() + Duration::hours(expiry_hours as i64);
    let claims = Claims {
        sub: user_id,
        exp: exp.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("Failed to sign token: {}", e))
}
