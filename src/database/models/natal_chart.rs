use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::astrology::NatalChartData;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NatalChart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub birth_date: NaiveDate,
    pub birth_time: String,
    pub birth_timezone: String,
    pub birth_latitude: f64,
    pub birth_longitude: f64,
    pub birth_city: String,
    pub birth_country: String,
    pub chart_data: Option<Value>,
    pub interpretation_text: Option<String>,
    pub svg_chart: Option<String>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a freshly computed chart
#[derive(Debug)]
pub struct NewNatalChart<'a> {
    pub user_id: Uuid,
    pub name: &'a str,
    pub birth_date: NaiveDate,
    pub birth_time: &'a str,
    pub birth_timezone: &'a str,
    pub birth_latitude: f64,
    pub birth_longitude: f64,
    pub birth_city: &'a str,
    pub birth_country: &'a str,
    pub chart_data: Value,
    pub interpretation_text: &'a str,
    pub svg_chart: &'a str,
    pub is_primary: bool,
}

impl NatalChart {
    pub async fn insert(pool: &PgPool, new: NewNatalChart<'_>) -> Result<NatalChart, sqlx::Error> {
        sqlx::query_as::<_, NatalChart>(
            "INSERT INTO natal_charts \
               (id, user_id, name, birth_date, birth_time, birth_timezone, \
                birth_latitude, birth_longitude, birth_city, birth_country, \
                chart_data, interpretation_text, svg_chart, is_primary) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.name)
        .bind(new.birth_date)
        .bind(new.birth_time)
        .bind(new.birth_timezone)
        .bind(new.birth_latitude)
        .bind(new.birth_longitude)
        .bind(new.birth_city)
        .bind(new.birth_country)
        .bind(new.chart_data)
        .bind(new.interpretation_text)
        .bind(new.svg_chart)
        .bind(new.is_primary)
        .fetch_one(pool)
        .await
    }

    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<NatalChart>, sqlx::Error> {
        sqlx::query_as::<_, NatalChart>(
            "SELECT * FROM natal_charts WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Owner-scoped lookup; other users' charts are invisible
    pub async fn find_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<NatalChart>, sqlx::Error> {
        sqlx::query_as::<_, NatalChart>(
            "SELECT * FROM natal_charts WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM natal_charts WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Returns whether a row was deleted
    pub async fn delete_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM natal_charts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Decode the stored chart payload
    pub fn decoded_chart(&self) -> Result<Option<NatalChartData>, serde_json::Error> {
        match &self.chart_data {
            Some(value) => serde_json::from_value(value.clone()).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astrology::chart::{compute_natal_chart, BirthInfo};

    #[test]
    fn chart_payload_round_trips_through_jsonb_value() {
        let data = compute_natal_chart(
            &BirthInfo {
                date: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
                time: "08:30".to_string(),
                timezone: "UTC".to_string(),
                latitude: 52.5,
                longitude: 13.4,
            },
            8.0,
        )
        .unwrap();

        let row = NatalChart {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "test".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
            birth_time: "08:30".to_string(),
            birth_timezone: "UTC".to_string(),
            birth_latitude: 52.5,
            birth_longitude: 13.4,
            birth_city: "Berlin".to_string(),
            birth_country: "Germany".to_string(),
            chart_data: Some(serde_json::to_value(&data).unwrap()),
            interpretation_text: None,
            svg_chart: None,
            is_primary: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let decoded = row.decoded_chart().unwrap().unwrap();
        assert_eq!(decoded.planets.len(), data.planets.len());
        assert_eq!(decoded.houses.len(), 12);
    }

    #[test]
    fn missing_chart_payload_decodes_to_none() {
        let row = NatalChart {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "empty".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
            birth_time: "08:30".to_string(),
            birth_timezone: "UTC".to_string(),
            birth_latitude: 0.0,
            birth_longitude: 0.0,
            birth_city: "x".to_string(),
            birth_country: "y".to_string(),
            chart_data: None,
            interpretation_text: None,
            svg_chart: None,
            is_primary: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(row.decoded_chart().unwrap().is_none());
    }
}
