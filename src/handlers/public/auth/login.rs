use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use tracing::info;

use super::utils::{token_payload, verify_password};
use crate::database::models::user::User;
use crate::database::Database;
use crate::error::ApiError;
use crate::middleware::response::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - authenticate credentials and return a JWT
pub async fn login_post(Json(payload): Json<LoginRequest>) -> Result<impl IntoResponse, ApiError> {
    let pool = Database::pool().await?;

    // Same error for unknown email and wrong password
    let user = User::find_by_email(&pool, &payload.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Incorrect email or password"))?;

    if !verify_password(&payload.password, &user.hashed_password) {
        return Err(ApiError::unauthorized("Incorrect email or password"));
    }

    if !user.is_active {
        return Err(ApiError::forbidden("User account is inactive"));
    }

    info!(user_id = %user.id, "user logged in");

    Ok(ApiResponse::success(token_payload(&user)?))
}
