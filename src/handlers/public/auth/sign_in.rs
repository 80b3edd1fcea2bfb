// handlers/public/auth/sign_in.rs - POST /auth/sign-in handler

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::payloads::SignInPayload;
use crate::api::JsonBody;
use crate::auth::{issue_access_token, verify_password};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct BearerToken {
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/**
 * POST /auth/sign-in - Exchange credentials for a bearer token
 *
 * Expected Output (Success):
 * ```json
 * {
 *   "success": true,
 *   "data": { "type": "bearer", "token": "eyJhbGciOiJIUzI1NiI...", "expires_at": "..." }
 * }
 * ```
 *
 * Unknown email and wrong password are indistinguishable to the caller.
 */
pub async fn sign_in_post(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignInPayload>,
) -> ApiResult<BearerToken> {
    let (email, password) = payload.validate()?;

    let user = match state.store.find_user_by_email(&email).await? {
        Some(user) if verify_password(&password, &user.password)? => user,
        _ => {
            tracing::warn!("Failed sign-in attempt");
            return Err(ApiError::bad_request("Invalid credentials"));
        }
    };

    let issued = issue_access_token(user.id)?;
    state.store.create_api_token(user.id, issued.jti, issued.expires_at).await?;

    tracing::info!("Issued token {} for user {}", issued.jti, user.id);
    Ok(ApiResponse::success(BearerToken {
        token_type: "bearer",
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}
