use axum::{
    extract::Query,
    response::IntoResponse,
    Extension,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::astrology::ZodiacSign;
use crate::database::models::horoscope::HoroscopeResponse;
use crate::database::Database;
use crate::error::ApiError;
use crate::handlers::protected::utils::current_user;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::ApiResponse;
use crate::services::horoscope::HoroscopeService;
use crate::types::HoroscopePeriod;

#[derive(Debug, Deserialize)]
pub struct ExtendedQuery {
    pub sign: ZodiacSign,
    pub date: Option<NaiveDate>,
}

/// GET /api/horoscopes/weekly?sign= - weekly horoscope (paid tiers)
pub async fn weekly_get(
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ExtendedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    extended(auth, query, HoroscopePeriod::Weekly).await
}

/// GET /api/horoscopes/monthly?sign= - monthly horoscope (paid tiers)
pub async fn monthly_get(
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ExtendedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    extended(auth, query, HoroscopePeriod::Monthly).await
}

async fn extended(
    auth: AuthUser,
    query: ExtendedQuery,
    period: HoroscopePeriod,
) -> Result<ApiResponse<HoroscopeResponse>, ApiError> {
    let user = current_user(&auth).await?;
    if !user.effective_tier().is_paid() {
        return Err(ApiError::forbidden(
            "Paid subscription required for this feature",
        ));
    }

    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let pool = Database::pool().await?;

    let row = HoroscopeService::get_or_generate(&pool, query.sign, date, period).await?;

    Ok(ApiResponse::success(HoroscopeResponse::from(&row)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_deserializes_sign_and_optional_date() {
        let query: ExtendedQuery =
            serde_json::from_value(serde_json::json!({"sign": "leo"})).unwrap();
        assert_eq!(query.sign, ZodiacSign::Leo);
        assert!(query.date.is_none());

        let query: ExtendedQuery =
            serde_json::from_value(serde_json::json!({"sign": "pisces", "date": "2024-02-29"}))
                .unwrap();
        assert_eq!(query.date, Some(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
    }
}
