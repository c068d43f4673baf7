use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HoroscopeCache {
    pub id: Uuid,
    pub sign: String,
    pub date: NaiveDate,
    pub period: String,
    pub content_text: String,
    pub mood: Option<String>,
    pub keywords: Option<Value>,
    pub lucky_color: Option<String>,
    pub lucky_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewHoroscope<'a> {
    pub sign: &'a str,
    pub date: NaiveDate,
    pub period: &'a str,
    pub content_text: &'a str,
    pub mood: &'a str,
    pub keywords: Value,
    pub lucky_color: &'a str,
    pub lucky_number: &'a str,
}

impl HoroscopeCache {
    pub async fn find(
        pool: &PgPool,
        sign: &str,
        date: NaiveDate,
        period: &str,
    ) -> Result<Option<HoroscopeCache>, sqlx::Error> {
        sqlx::query_as::<_, HoroscopeCache>(
            "SELECT * FROM horoscope_cache WHERE sign = $1 AND date = $2 AND period = $3",
        )
        .bind(sign)
        .bind(date)
        .bind(period)
        .fetch_optional(pool)
        .await
    }

    /// Insert unless another writer got there first. The unique constraint on
    /// (sign, date, period) is the only concurrency control; losers read the
    /// winning row back.
    pub async fn insert_if_absent(
        pool: &PgPool,
        new: NewHoroscope<'_>,
    ) -> Result<Option<HoroscopeCache>, sqlx::Error> {
        sqlx::query_as::<_, HoroscopeCache>(
            "INSERT INTO horoscope_cache \
               (id, sign, date, period, content_text, mood, keywords, lucky_color, lucky_number) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (sign, date, period) DO NOTHING \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new.sign)
        .bind(new.date)
        .bind(new.period)
        .bind(new.content_text)
        .bind(new.mood)
        .bind(new.keywords)
        .bind(new.lucky_color)
        .bind(new.lucky_number)
        .fetch_optional(pool)
        .await
    }
}

/// Wire shape for horoscope responses
#[derive(Debug, Clone, Serialize)]
pub struct HoroscopeResponse {
    pub sign: String,
    pub date: NaiveDate,
    pub period: String,
    pub content_text: String,
    pub mood: Option<String>,
    pub keywords: Option<Value>,
    pub lucky_color: Option<String>,
    pub lucky_number: Option<String>,
}

impl From<&HoroscopeCache> for HoroscopeResponse {
    fn from(row: &HoroscopeCache) -> Self {
        Self {
            sign: row.sign.clone(),
            date: row.date,
            period: row.period.clone(),
            content_text: row.content_text.clone(),
            mood: row.mood.clone(),
            keywords: row.keywords.clone(),
            lucky_color: row.lucky_color.clone(),
            lucky_number: row.lucky_number.clone(),
        }
    }
}
