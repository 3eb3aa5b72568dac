use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::AppError;
use crate::models::user::User;

pub const REFRESH_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id encoded as a decimal string.
    pub sub: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User, ttl_minutes: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::minutes(ttl_minutes);

        Self {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }
}

/// An opaque refresh token. `raw` goes to the client, `lookup_hash` to storage.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub raw: String,
    pub lookup_hash: String,
}

pub fn create_access_token(user: &User, secret: &str, ttl_minutes: i64) -> Result<String, AppError> {
    if secret.is_empty() {
        return Err(AppError::Signing("jwt secret is empty".into()));
    }
    let claims = Claims::new(user, ttl_minutes);
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Signing(e.to_string()))
}

/// Checks signature and expiry and decodes the typed claims.
///
/// Claims of the wrong shape surface as [`AppError::MalformedToken`]; every
/// other failure is a plain `Unauthorized`.
pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::Json(_) => AppError::MalformedToken,
        _ => AppError::Unauthorized("invalid token".into()),
    })?;

    Ok(token_data.claims)
}

pub fn issue_refresh_token() -> Result<IssuedRefreshToken, AppError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::Randomness(e.to_string()))?;

    let raw = URL_SAFE_NO_PAD.encode(bytes);
    let lookup_hash = hash_refresh_token(&raw);
    Ok(IssuedRefreshToken { raw, lookup_hash })
}

pub fn hash_refresh_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}
