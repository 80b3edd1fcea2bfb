use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::validate_access_token;
use crate::database::models::User;
use crate::error::ApiError;
use crate::AppState;

/// Authenticated user resolved from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user: User,
    /// Token id, so logout can revoke exactly the presenting token
    pub jti: Uuid,
}

/// Bearer authentication: the JWT must verify, its `api_tokens` row must still
/// exist and be unexpired, and its user must exist.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    let claims = validate_access_token(&token).map_err(|e| {
        tracing::warn!("Rejected bearer token: {}", e);
        ApiError::from(e)
    })?;

    let record = state.store.find_api_token(claims.jti).await?;
    match record {
        Some(record) if record.user_id == claims.sub && record.expires_at > Utc::now() => {}
        _ => {
            tracing::warn!("Bearer token {} is revoked or expired", claims.jti);
            return Err(ApiError::unauthorized("Token has been revoked"));
        }
    }

    let user = state
        .store
        .find_user(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

    tracing::debug!("Authenticated user {} with token {}", user.id, claims.jti);
    request.extensions_mut().insert(AuthUser { user, jti: claims.jti });

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
