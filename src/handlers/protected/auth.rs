use axum::{response::IntoResponse, Extension};
use serde_json::json;

use super::utils::current_user;
use crate::database::models::subscription::{Subscription, SubscriptionResponse};
use crate::database::models::user::UserResponse;
use crate::database::Database;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::ApiResponse;

/// GET /api/auth/me - current user profile
pub async fn me_get(Extension(auth): Extension<AuthUser>) -> Result<impl IntoResponse, ApiError> {
    let user = current_user(&auth).await?;
    Ok(ApiResponse::success(UserResponse::from(&user)))
}

/// GET /api/auth/subscription - active subscription and effective tier
pub async fn subscription_get(
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = current_user(&auth).await?;
    let pool = Database::pool().await?;

    let subscription = Subscription::find_active_for_user(&pool, user.id).await?;

    Ok(ApiResponse::success(json!({
        "effective_tier": user.effective_tier(),
        "subscription": subscription.as_ref().map(SubscriptionResponse::from),
    })))
}
