// handlers/public/auth/sign_up.rs - POST /auth/sign-up handler

use axum::extract::State;

use crate::api::payloads::SignUpPayload;
use crate::api::JsonBody;
use crate::auth::hash_password;
use crate::database::models::{NewUser, User};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::uniqueness;
use crate::AppState;

/**
 * POST /auth/sign-up - Register a new account
 *
 * Expected Input:
 * ```json
 * {
 *   "name": "string",
 *   "email": "string",
 *   "password": "string",
 *   "password_confirmation": "string"
 * }
 * ```
 *
 * A taken email is `E_ALREADY_EXISTS`. The stored password is an Argon2id
 * hash and is never serialized back.
 */
pub async fn sign_up_post(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignUpPayload>,
) -> ApiResult<User> {
    let signup = payload.validate()?;
    uniqueness::user_email(state.store.as_ref(), &signup.email).await?;

    let password_hash = hash_password(&signup.password)?;
    let user = state
        .store
        .create_user(NewUser { name: signup.name, email: signup.email, password_hash })
        .await?;

    tracing::info!("Registered user {}", user.id);
    Ok(ApiResponse::created(user))
}
