//! Shared cross-cutting enums typed at the edges. Database rows keep the
//! plain strings (`User.subscription_tier: String`, `Subscription.status:
//! String`); these enums parse/serialize at the boundary with lowercase wire
//! values matching the original platform's payloads.

use serde::{Deserialize, Serialize};

/// Account capability tier. Stored as a plain string in the DB and parsed at
/// gating points; an unknown stored value falls back to [`SubscriptionTier::Free`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Basic,
    Premium,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Basic => "basic",
            SubscriptionTier::Premium => "premium",
        }
    }

    /// Whether this tier unlocks paid-only features.
    pub fn is_paid(&self) -> bool {
        !matches!(self, SubscriptionTier::Free)
    }

    /// Whether this tier unlocks premium-only features.
    pub fn is_premium(&self) -> bool {
        matches!(self, SubscriptionTier::Premium)
    }
}

impl std::str::FromStr for SubscriptionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(SubscriptionTier::Free),
            "basic" => Ok(SubscriptionTier::Basic),
            "premium" => Ok(SubscriptionTier::Premium),
            other => Err(format!("unknown subscription tier: {}", other)),
        }
    }
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a subscription record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Unpaid,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Unpaid => "unpaid",
        }
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(SubscriptionStatus::Active),
            "trialing" => Ok(SubscriptionStatus::Trialing),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            "canceled" => Ok(SubscriptionStatus::Canceled),
            "unpaid" => Ok(SubscriptionStatus::Unpaid),
            other => Err(format!("unknown subscription status: {}", other)),
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horoscope cadence. The date anchor keying the cache differs per period:
/// weekly normalizes to the ISO Monday, monthly to the first of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoroscopePeriod {
    Daily,
    Weekly,
    Monthly,
}

impl HoroscopePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoroscopePeriod::Daily => "daily",
            HoroscopePeriod::Weekly => "weekly",
            HoroscopePeriod::Monthly => "monthly",
        }
    }

    /// Normalize an arbitrary date to this period's cache anchor.
    pub fn normalize(&self, date: chrono::NaiveDate) -> chrono::NaiveDate {
        use chrono::Datelike;
        match self {
            HoroscopePeriod::Daily => date,
            HoroscopePeriod::Weekly => {
                let back = date.weekday().num_days_from_monday() as i64;
                date - chrono::Duration::days(back)
            }
            HoroscopePeriod::Monthly => {
                chrono::NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
            }
        }
    }
}

impl std::str::FromStr for HoroscopePeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(HoroscopePeriod::Daily),
            "weekly" => Ok(HoroscopePeriod::Weekly),
            "monthly" => Ok(HoroscopePeriod::Monthly),
            other => Err(format!("unknown horoscope period: {}", other)),
        }
    }
}

impl std::fmt::Display for HoroscopePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
