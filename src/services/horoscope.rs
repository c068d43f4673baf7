//! Lookup-or-insert horoscope cache. There is no eviction or invalidation;
//! the unique (sign, date, period) constraint arbitrates concurrent writers.

use chrono::NaiveDate;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::astrology::ZodiacSign;
use crate::database::models::horoscope::{HoroscopeCache, NewHoroscope};
use crate::services::interpretation;
use crate::types::HoroscopePeriod;

#[derive(Debug, Error)]
pub enum HoroscopeError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("horoscope cache row vanished after insert")]
    CacheInconsistent,
}

pub struct HoroscopeService;

impl HoroscopeService {
    /// Cached row for (sign, date, period), generating and inserting on miss.
    /// Losing a concurrent insert race falls through to the winner's row.
    pub async fn get_or_generate(
        pool: &PgPool,
        sign: ZodiacSign,
        date: NaiveDate,
        period: HoroscopePeriod,
    ) -> Result<HoroscopeCache, HoroscopeError> {
        let anchor = period.normalize(date);

        if let Some(row) = HoroscopeCache::find(pool, sign.as_str(), anchor, period.as_str()).await? {
            return Ok(row);
        }

        debug!(%sign, %period, date = %anchor, "horoscope cache miss, generating");
        let generated = interpretation::horoscope_content(sign, anchor, period);

        let inserted = HoroscopeCache::insert_if_absent(
            pool,
            NewHoroscope {
                sign: sign.as_str(),
                date: anchor,
                period: period.as_str(),
                content_text: &generated.content,
                mood: generated.mood,
                keywords: serde_json::json!(generated.keywords),
                lucky_color: generated.lucky_color,
                lucky_number: &generated.lucky_number,
            },
        )
        .await?;

        if let Some(row) = inserted {
            return Ok(row);
        }

        // Another writer won the race; their row is identical by construction
        HoroscopeCache::find(pool, sign.as_str(), anchor, period.as_str())
            .await?
            .ok_or(HoroscopeError::CacheInconsistent)
    }
}
