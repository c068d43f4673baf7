use axum::{extract::Path, response::IntoResponse, Extension};
use uuid::Uuid;

use crate::astrology::chart::compute_synastry;
use crate::config;
use crate::database::models::natal_chart::NatalChart;
use crate::database::Database;
use crate::error::ApiError;
use crate::handlers::protected::utils::current_user;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::ApiResponse;

/// POST /api/charts/:id/synastry/:other_id - compatibility between two owned
/// charts (premium)
pub async fn post(
    Extension(auth): Extension<AuthUser>,
    Path((id, other_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let user = current_user(&auth).await?;
    if !user.effective_tier().is_premium() {
        return Err(ApiError::forbidden(
            "Premium subscription required for this feature",
        ));
    }

    let pool = Database::pool().await?;

    let first = NatalChart::find_owned(&pool, id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Chart not found"))?;
    let second = NatalChart::find_owned(&pool, other_id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Chart not found"))?;

    let natal_a = first
        .decoded_chart()?
        .ok_or_else(|| ApiError::internal_server_error("Chart has no stored data"))?;
    let natal_b = second
        .decoded_chart()?
        .ok_or_else(|| ApiError::internal_server_error("Chart has no stored data"))?;

    let report = compute_synastry(&natal_a, &natal_b, config::config().astro.aspect_orb_deg);

    Ok(ApiResponse::success(report))
}
