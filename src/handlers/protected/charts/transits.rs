use axum::{extract::Path, response::IntoResponse, Extension};
use chrono::Utc;
use uuid::Uuid;

use crate::astrology::chart::compute_transits;
use crate::config;
use crate::database::models::natal_chart::NatalChart;
use crate::database::Database;
use crate::error::ApiError;
use crate::handlers::protected::utils::current_user;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::ApiResponse;

/// POST /api/charts/:id/transits - current sky against a natal chart (premium)
pub async fn post(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = current_user(&auth).await?;
    if !user.effective_tier().is_premium() {
        return Err(ApiError::forbidden(
            "Premium subscription required for this feature",
        ));
    }

    let pool = Database::pool().await?;
    let chart = NatalChart::find_owned(&pool, id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Chart not found"))?;

    let natal = chart
        .decoded_chart()?
        .ok_or_else(|| ApiError::internal_server_error("Chart has no stored data"))?;

    let report = compute_transits(&natal, Utc::now(), config::config().astro.transit_orb_deg);

    Ok(ApiResponse::success(report))
}
