// handlers/protected/auth/session.rs - POST /auth/logout, POST /users/me

use axum::extract::{Extension, State};
use serde::Serialize;

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct Revoked {
    pub revoked: bool,
}

/// Revoke the presenting token. Other sessions of the user stay valid.
pub async fn logout_post(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<Revoked> {
    state.store.delete_api_token(auth.jti).await?;
    tracing::info!("Revoked token {} for user {}", auth.jti, auth.user.id);
    Ok(ApiResponse::success(Revoked { revoked: true }))
}

pub async fn me_post(Extension(auth): Extension<AuthUser>) -> ApiResult<User> {
    Ok(ApiResponse::success(auth.user))
}
