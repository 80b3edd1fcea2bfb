// handlers/public/password_reset.rs - POST /forgot, POST /reset/:email, POST /reset

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::api::payloads::{ForgotPayload, ResetPayload};
use crate::api::{JsonBody, RouteIds};
use crate::auth::{self, hash_password};
use crate::config;
use crate::database::models::NewPasswordReset;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::lookup;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SignatureQuery {
    pub signature: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResetSignature {
    pub signature: String,
}

/// `<APP_URL>/reset/<email>?signature=<sig>`
fn reset_link(email: &str, signature: &str) -> Result<String, ApiError> {
    let mut url = url::Url::parse(&config::config().api.app_url)
        .map_err(|e| ApiError::internal_server_error(format!("Invalid APP_URL: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::internal_server_error("Invalid APP_URL"))?
        .pop_if_empty()
        .push("reset")
        .push(email);
    url.query_pairs_mut().append_pair("signature", signature);
    Ok(url.to_string())
}

/// POST /forgot - record a reset request and emit a signed link.
///
/// Mail delivery is not wired up; the link is logged.
pub async fn forgot_post(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ForgotPayload>,
) -> ApiResult<&'static str> {
    let email = payload.validate()?;
    let user = lookup::user_by_email(state.store.as_ref(), &email).await?;

    let signature = auth::sign_reset_link(&email)?;
    let link = reset_link(&email, &signature)?;
    tracing::info!("Password reset link for user {}: {}", user.id, link);

    state
        .store
        .create_password_reset(NewPasswordReset { user_id: user.id, email, signature: Some(signature) })
        .await?;

    Ok(ApiResponse::success("OK"))
}

/// POST /reset/:email?signature= - trade a valid link for a reset signature.
pub async fn verify_post(ids: RouteIds, Query(query): Query<SignatureQuery>) -> ApiResult<ResetSignature> {
    let email = ids.text("email")?;
    let signature = query.signature.as_deref().ok_or(auth::AuthError::InvalidSignature)?;
    auth::verify_reset_link(email, signature)?;

    Ok(ApiResponse::success(ResetSignature { signature: auth::sign_reset_signature(email)? }))
}

/// POST /reset - set a new password and revoke every token of the user.
pub async fn reset_post(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ResetPayload>,
) -> ApiResult<&'static str> {
    let (signature, password) = payload.validate()?;
    let email = auth::verify_reset_signature(&signature)?;
    let user = lookup::user_by_email(state.store.as_ref(), &email).await?;

    let password_hash = hash_password(&password)?;
    state.store.update_user_password(user.id, &password_hash).await?;
    let revoked = state.store.delete_api_tokens_for_user(user.id).await?;

    tracing::info!("Password reset for user {}, revoked {} tokens", user.id, revoked);
    Ok(ApiResponse::success("OK"))
}
