use axum::{
    extract::Query,
    response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::astrology::ZodiacSign;
use crate::database::models::horoscope::HoroscopeResponse;
use crate::database::Database;
use crate::error::ApiError;
use crate::middleware::response::ApiResponse;
use crate::services::horoscope::HoroscopeService;
use crate::types::HoroscopePeriod;

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub sign: ZodiacSign,
    pub date: Option<NaiveDate>,
}

/// GET /api/horoscopes/daily?sign=&date= - daily horoscope for one sign
pub async fn get(Query(query): Query<DailyQuery>) -> Result<impl IntoResponse, ApiError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let pool = Database::pool().await?;

    let row =
        HoroscopeService::get_or_generate(&pool, query.sign, date, HoroscopePeriod::Daily).await?;

    Ok(ApiResponse::success(HoroscopeResponse::from(&row)))
}
