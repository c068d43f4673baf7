use axum::{
    extract::Path,
    response::IntoResponse,
    Extension,
};
use uuid::Uuid;

use crate::database::models::natal_chart::NatalChart;
use crate::database::Database;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::ApiResponse;

/// GET /api/charts/:id - fetch one owned chart
pub async fn get(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = Database::pool().await?;

    let chart = NatalChart::find_owned(&pool, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Chart not found"))?;

    Ok(ApiResponse::success(chart))
}

/// DELETE /api/charts/:id - delete one owned chart
pub async fn delete(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = Database::pool().await?;

    if !NatalChart::delete_owned(&pool, id, auth.user_id).await? {
        return Err(ApiError::not_found("Chart not found"));
    }

    Ok(ApiResponse::no_content())
}
