use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::types::{SubscriptionStatus, SubscriptionTier};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tier: String,
    pub status: String,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Most recent active subscription for a user, if any
    pub async fn find_active_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions \
             WHERE user_id = $1 AND status = $2 \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .bind(SubscriptionStatus::Active.as_str())
        .fetch_optional(pool)
        .await
    }

    pub fn tier(&self) -> SubscriptionTier {
        self.tier.parse().unwrap_or(SubscriptionTier::Free)
    }
}

/// Wire shape for subscription lookups
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub tier: SubscriptionTier,
    pub status: String,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
}

impl From<&Subscription> for SubscriptionResponse {
    fn from(sub: &Subscription) -> Self {
        Self {
            id: sub.id,
            tier: sub.tier(),
            status: sub.status.clone(),
            current_period_start: sub.current_period_start,
            current_period_end: sub.current_period_end,
            cancel_at_period_end: sub.cancel_at_period_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_parses_with_free_fallback() {
        let mut sub = Subscription {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            tier: "premium".to_string(),
            status: "active".to_string(),
            current_period_start: Utc::now(),
            current_period_end: None,
            cancel_at_period_end: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(sub.tier(), SubscriptionTier::Premium);

        sub.tier = "unheard-of".to_string();
        assert_eq!(sub.tier(), SubscriptionTier::Free);
    }
}
