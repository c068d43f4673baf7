use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use tracing::info;

use super::utils::{hash_password, is_unique_violation, token_payload, validate_email, validate_password};
use crate::database::models::user::User;
use crate::database::Database;
use crate::error::ApiError;
use crate::middleware::response::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// POST /auth/register - create an account and return a JWT
pub async fn register_post(
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    let pool = Database::pool().await?;

    if User::find_by_email(&pool, &payload.email).await?.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let hashed = hash_password(&payload.password)?;

    let user = User::insert(&pool, &payload.email, &hashed, payload.full_name.as_deref())
        .await
        .map_err(|e| {
            // Pre-check raced with another registration
            if is_unique_violation(&e) {
                ApiError::conflict("Email already registered")
            } else {
                ApiError::from(e)
            }
        })?;

    info!(user_id = %user.id, "registered new user");

    Ok(ApiResponse::created(token_payload(&user)?))
}
