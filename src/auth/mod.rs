pub mod password;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;

pub use password::{hash_password, verify_password};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidToken(String),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Password hash error: {0}")]
    PasswordHash(String),
}

/// What a signed token may be used for. Tokens are never accepted for a
/// purpose other than the one they were issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Access,
    ResetLink,
    Reset,
}

/// Bearer token claims. `jti` ties the token to its `api_tokens` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub jti: Uuid,
    pub purpose: TokenPurpose,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            jti: Uuid::new_v4(),
            purpose: TokenPurpose::Access,
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Claims of the password-reset link and reset signature. `sub` is the email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetClaims {
    pub sub: String,
    pub purpose: TokenPurpose,
    pub exp: i64,
    pub iat: i64,
}

impl ResetClaims {
    fn new(email: &str, purpose: TokenPurpose, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: email.to_string(),
            purpose,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Freshly issued bearer token, before it is recorded.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: Uuid,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

fn secret() -> Result<&'static str, AuthError> {
    let secret = config::config().security.jwt_secret.as_str();
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }
    Ok(secret)
}

fn sign<T: Serialize>(claims: &T) -> Result<String, AuthError> {
    let encoding_key = EncodingKey::from_secret(secret()?.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

fn verify<T: for<'de> Deserialize<'de>>(token: &str) -> Result<T, jsonwebtoken::errors::Error> {
    let decoding_key = DecodingKey::from_secret(config::config().security.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;
    decode::<T>(token, &decoding_key, &validation).map(|data| data.claims)
}

pub fn generate_jwt(claims: &Claims) -> Result<String, AuthError> {
    sign(claims)
}

/// Sign a new bearer token for `user_id`.
pub fn issue_access_token(user_id: i64) -> Result<IssuedToken, AuthError> {
    let claims = Claims::new(user_id);
    let token = generate_jwt(&claims)?;
    let expires_at = Utc
        .timestamp_opt(claims.exp, 0)
        .single()
        .ok_or_else(|| AuthError::TokenGeneration("expiry out of range".to_string()))?;

    Ok(IssuedToken { token, jti: claims.jti, user_id, expires_at })
}

/// Decode a bearer token. Revocation is checked by the caller against storage.
pub fn validate_access_token(token: &str) -> Result<Claims, AuthError> {
    secret()?;
    let claims: Claims = verify(token).map_err(|e| AuthError::InvalidToken(format!("Invalid JWT token: {}", e)))?;
    if claims.purpose != TokenPurpose::Access {
        return Err(AuthError::InvalidToken("Invalid JWT token: wrong purpose".to_string()));
    }
    Ok(claims)
}

/// Signature for the emailed `reset/<email>` link.
pub fn sign_reset_link(email: &str) -> Result<String, AuthError> {
    let ttl = Duration::minutes(config::config().security.reset_link_expiry_minutes as i64);
    sign(&ResetClaims::new(email, TokenPurpose::ResetLink, ttl))
}

/// Accept a link signature only for the email it was issued for.
pub fn verify_reset_link(email: &str, signature: &str) -> Result<(), AuthError> {
    let claims: ResetClaims = verify(signature).map_err(|_| AuthError::InvalidSignature)?;
    if claims.purpose != TokenPurpose::ResetLink || claims.sub != email {
        return Err(AuthError::InvalidSignature);
    }
    Ok(())
}

/// Short-lived signature that authorizes setting a new password.
pub fn sign_reset_signature(email: &str) -> Result<String, AuthError> {
    let ttl = Duration::minutes(config::config().security.reset_signature_expiry_minutes as i64);
    sign(&ResetClaims::new(email, TokenPurpose::Reset, ttl))
}

/// Returns the email the reset signature was issued for.
pub fn verify_reset_signature(signature: &str) -> Result<String, AuthError> {
    let claims: ResetClaims = verify(signature).map_err(|_| AuthError::InvalidSignature)?;
    if claims.purpose != TokenPurpose::Reset {
        return Err(AuthError::InvalidSignature);
    }
    Ok(claims.sub)
}
