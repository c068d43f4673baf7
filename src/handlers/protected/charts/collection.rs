use axum::{
    response::{IntoResponse, Json},
    Extension,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::astrology::chart::{compute_natal_chart, BirthInfo};
use crate::astrology::svg::render_wheel;
use crate::config;
use crate::database::models::natal_chart::{NatalChart, NewNatalChart};
use crate::database::Database;
use crate::error::ApiError;
use crate::handlers::protected::utils::current_user;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::ApiResponse;
use crate::services::interpretation::InterpretationEngine;
use crate::types::SubscriptionTier;

#[derive(Debug, Deserialize)]
pub struct CreateChartRequest {
    pub name: String,
    pub birth_date: NaiveDate,
    /// Local wall-clock time, "HH:MM"
    pub birth_time: String,
    /// IANA timezone name
    pub birth_timezone: String,
    pub birth_latitude: f64,
    pub birth_longitude: f64,
    pub birth_city: String,
    pub birth_country: String,
    #[serde(default)]
    pub is_primary: bool,
}

/// POST /api/charts - cast and store a natal chart
pub async fn post(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateChartRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.name.trim().is_empty() || payload.name.chars().count() > 100 {
        return Err(ApiError::bad_request("Chart name must be 1-100 characters"));
    }

    let user = current_user(&auth).await?;
    let tier = user.effective_tier();
    let pool = Database::pool().await?;

    if tier == SubscriptionTier::Free {
        let limit = config::config().limits.free_chart_limit;
        let existing = NatalChart::count_for_user(&pool, user.id).await?;
        if existing >= limit {
            return Err(ApiError::forbidden(format!(
                "Free tier allows only {} natal chart{}. Upgrade to create more.",
                limit,
                if limit == 1 { "" } else { "s" }
            )));
        }
    }

    let birth = BirthInfo {
        date: payload.birth_date,
        time: payload.birth_time.clone(),
        timezone: payload.birth_timezone.clone(),
        latitude: payload.birth_latitude,
        longitude: payload.birth_longitude,
    };
    let chart_data = compute_natal_chart(&birth, config::config().astro.aspect_orb_deg)?;

    let interpretation = InterpretationEngine::default()
        .natal_interpretation(&chart_data, tier)
        .await?;
    let svg = render_wheel(&chart_data);

    let chart = NatalChart::insert(
        &pool,
        NewNatalChart {
            user_id: user.id,
            name: payload.name.trim(),
            birth_date: payload.birth_date,
            birth_time: &payload.birth_time,
            birth_timezone: &payload.birth_timezone,
            birth_latitude: payload.birth_latitude,
            birth_longitude: payload.birth_longitude,
            birth_city: &payload.birth_city,
            birth_country: &payload.birth_country,
            chart_data: serde_json::to_value(&chart_data)?,
            interpretation_text: &interpretation,
            svg_chart: &svg,
            is_primary: payload.is_primary,
        },
    )
    .await?;

    info!(user_id = %user.id, chart_id = %chart.id, "created natal chart");

    Ok(ApiResponse::created(chart))
}

/// GET /api/charts - all charts of the current user, newest first
pub async fn get(Extension(auth): Extension<AuthUser>) -> Result<impl IntoResponse, ApiError> {
    let pool = Database::pool().await?;
    let charts = NatalChart::list_for_user(&pool, auth.user_id).await?;
    Ok(ApiResponse::success(charts))
}
