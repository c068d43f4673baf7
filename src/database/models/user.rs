use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::types::SubscriptionTier;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub subscription_tier: String,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn insert(
        pool: &PgPool,
        email: &str,
        hashed_password: &str,
        full_name: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, hashed_password, full_name, subscription_tier) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .bind(full_name)
        .bind(SubscriptionTier::Free.as_str())
        .fetch_one(pool)
        .await
    }

    /// Tier used at gating points. An expired subscription end date drops the
    /// account back to free regardless of the stored tier.
    pub fn effective_tier(&self) -> SubscriptionTier {
        let stored = self
            .subscription_tier
            .parse::<SubscriptionTier>()
            .unwrap_or(SubscriptionTier::Free);

        match self.subscription_end_date {
            Some(end) if end < Utc::now() => SubscriptionTier::Free,
            _ => stored,
        }
    }
}

/// Public profile shape; never exposes the password hash
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub subscription_tier: SubscriptionTier,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            subscription_tier: user.effective_tier(),
            subscription_end_date: user.subscription_end_date,
            is_active: user.is_active,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user_with(tier: &str, end: Option<DateTime<Utc>>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            hashed_password: "hash".to_string(),
            full_name: None,
            subscription_tier: tier.to_string(),
            subscription_end_date: end,
            is_active: true,
            is_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn effective_tier_reads_stored_value() {
        assert_eq!(user_with("premium", None).effective_tier(), SubscriptionTier::Premium);
        assert_eq!(user_with("basic", None).effective_tier(), SubscriptionTier::Basic);
        assert_eq!(user_with("free", None).effective_tier(), SubscriptionTier::Free);
    }

    #[test]
    fn expired_subscription_drops_to_free() {
        let expired = Some(Utc::now() - Duration::days(1));
        assert_eq!(user_with("premium", expired).effective_tier(), SubscriptionTier::Free);

        let current = Some(Utc::now() + Duration::days(30));
        assert_eq!(user_with("premium", current).effective_tier(), SubscriptionTier::Premium);
    }

    #[test]
    fn unknown_tier_string_falls_back_to_free() {
        assert_eq!(user_with("gold", None).effective_tier(), SubscriptionTier::Free);
    }

    #[test]
    fn response_hides_password_hash() {
        let user = user_with("free", None);
        let response = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert!(response.get("hashed_password").is_none());
        assert_eq!(response["email"], "a@example.com");
        assert_eq!(response["subscription_tier"], "free");
    }
}
