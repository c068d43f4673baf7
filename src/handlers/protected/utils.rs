use crate::database::models::user::User;
use crate::database::Database;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

/// Fresh user row for the authenticated request. Token claims can go stale
/// (tier changes, deactivation), so tier gates always read the database.
pub async fn current_user(auth: &AuthUser) -> Result<User, ApiError> {
    let pool = Database::pool().await?;

    let user = User::find_by_id(&pool, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    if !user.is_active {
        return Err(ApiError::forbidden("Inactive user"));
    }

    Ok(user)
}
