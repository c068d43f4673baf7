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
pub struct AllSignsQuery {
    pub date: Option<NaiveDate>,
}

/// GET /api/horoscopes/all-signs?date= - daily horoscopes for every sign,
/// filling cache misses as it goes
pub async fn get(Query(query): Query<AllSignsQuery>) -> Result<impl IntoResponse, ApiError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let pool = Database::pool().await?;

    let mut horoscopes = Vec::with_capacity(ZodiacSign::ALL.len());
    for sign in ZodiacSign::ALL {
        let row =
            HoroscopeService::get_or_generate(&pool, sign, date, HoroscopePeriod::Daily).await?;
        horoscopes.push(HoroscopeResponse::from(&row));
    }

    Ok(ApiResponse::success(horoscopes))
}
