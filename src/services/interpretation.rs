//! Interpretation engine: turns chart data into reader-facing text, and
//! generates the deterministic horoscope content that feeds the cache.
//!
//! Text generation sits behind [`InterpretationBackend`] so a hosted language
//! model can be dropped in for paid tiers later; the template backend is the
//! only one wired in today.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::fmt::Write;
use thiserror::Error;

use crate::astrology::{CelestialBody, NatalChartData, ZodiacSign};
use crate::types::{HoroscopePeriod, SubscriptionTier};

#[derive(Debug, Error)]
pub enum InterpretationError {
    #[error("interpretation backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait InterpretationBackend: Send + Sync {
    async fn natal_interpretation(
        &self,
        chart: &NatalChartData,
        tier: SubscriptionTier,
    ) -> Result<String, InterpretationError>;
}

pub struct InterpretationEngine {
    backend: Box<dyn InterpretationBackend>,
}

impl Default for InterpretationEngine {
    fn default() -> Self {
        Self {
            backend: Box::new(TemplateBackend),
        }
    }
}

impl InterpretationEngine {
    pub fn with_backend(backend: Box<dyn InterpretationBackend>) -> Self {
        Self { backend }
    }

    pub async fn natal_interpretation(
        &self,
        chart: &NatalChartData,
        tier: SubscriptionTier,
    ) -> Result<String, InterpretationError> {
        self.backend.natal_interpretation(chart, tier).await
    }
}

const SUN_IN_SIGNS: [&str; 12] = [
    "You are energetic, direct and happiest when leading the charge. Boldness opens your doors.",
    "You are steady, practical and value what lasts. Patience is your quiet superpower.",
    "You are curious, quick-witted and adaptable. Conversation is where your ideas catch fire.",
    "You are caring, intuitive and protective of your inner circle. Feeling deeply is a strength.",
    "You are confident, generous and naturally magnetic. Creative work rewards you richly.",
    "You are analytical, precise and attentive to detail. Order turns your plans into results.",
    "You are diplomatic, fair-minded and drawn to harmony. Seeing every side is your gift.",
    "You are intense, perceptive and transformative. Depth matters more to you than breadth.",
    "You are optimistic, philosophical and freedom-loving. New horizons keep you alive.",
    "You are ambitious, disciplined and built for the long climb. Structure serves your goals.",
    "You are original, independent and humanitarian. Your ideas arrive ahead of their time.",
    "You are compassionate, artistic and deeply intuitive. Imagination is your native country.",
];

const MOON_IN_SIGNS: [&str; 12] = [
    "Your feelings flare fast and burn bright; motion settles you.",
    "You need comfort and reliability before your heart relaxes.",
    "You process emotion by talking it through; silence unsettles you.",
    "Home and familiar faces restore you like nothing else.",
    "You need to feel seen; warmth given returns to you doubled.",
    "You show care through practical help, and tidy surroundings calm you.",
    "You seek emotional balance and flourish in considerate company.",
    "Your feelings run deep and private; trust is earned slowly.",
    "You need room to roam; optimism is your emotional reset.",
    "You keep feelings composed and find safety in routine.",
    "You need emotional independence; friendship is your love language.",
    "You absorb the moods around you; solitude recharges your empathy.",
];

const ASCENDANT_NOTE: &str =
    "Your ascendant shapes first impressions: it is the style in which you meet the unfamiliar.";

const UPGRADE_NOTE: &str =
    "Upgrade to a paid plan for the full reading: every placement, house emphasis and aspect pattern.";

struct TemplateBackend;

#[async_trait]
impl InterpretationBackend for TemplateBackend {
    async fn natal_interpretation(
        &self,
        chart: &NatalChartData,
        tier: SubscriptionTier,
    ) -> Result<String, InterpretationError> {
        let mut text = String::from("# Your Natal Chart\n\n");

        if let Some(sun) = chart.planet(CelestialBody::Sun) {
            let _ = writeln!(text, "## Sun in {}\n", title_case(sun.sign.as_str()));
            let _ = writeln!(text, "{}\n", SUN_IN_SIGNS[sun.sign.index()]);
        }

        if let Some(moon) = chart.planet(CelestialBody::Moon) {
            let _ = writeln!(text, "## Moon in {}\n", title_case(moon.sign.as_str()));
            let _ = writeln!(text, "{}\n", MOON_IN_SIGNS[moon.sign.index()]);
        }

        let _ = writeln!(
            text,
            "## Ascendant in {}\n\n{}\n",
            title_case(chart.ascendant.sign.as_str()),
            ASCENDANT_NOTE
        );

        if tier.is_paid() {
            let _ = writeln!(text, "## Placements\n");
            for planet in &chart.planets {
                let motion = if planet.retrograde { ", retrograde" } else { "" };
                let _ = writeln!(
                    text,
                    "- {} in {} ({:.1} deg, house {}{})",
                    title_case(planet.body.as_str()),
                    title_case(planet.sign.as_str()),
                    planet.position,
                    planet.house,
                    motion
                );
            }

            if !chart.aspects.is_empty() {
                let _ = writeln!(text, "\n## Aspects\n");
                for aspect in &chart.aspects {
                    let state = if aspect.applying { "applying" } else { "separating" };
                    let _ = writeln!(
                        text,
                        "- {} {:?} {} (orb {:.1} deg, {})",
                        title_case(aspect.body_a.as_str()),
                        aspect.kind,
                        title_case(aspect.body_b.as_str()),
                        aspect.orb,
                        state
                    );
                }
            }
        } else {
            let _ = writeln!(text, "---\n\n{}", UPGRADE_NOTE);
        }

        Ok(text)
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Generated horoscope fields before they land in the cache table
#[derive(Debug, Clone)]
pub struct HoroscopeContent {
    pub content: String,
    pub mood: &'static str,
    pub keywords: Vec<&'static str>,
    pub lucky_color: &'static str,
    pub lucky_number: String,
}

const SIGN_THEMES: [&str; 12] = [
    "your energy peaks and new beginnings favor you",
    "money and material matters reward a practical eye",
    "conversations open doors you did not know existed",
    "home and close ties ask for your attention",
    "your charisma is lit; use it toward a real goal",
    "organization turns a vague plan into progress",
    "balance is the work: weigh before you commit",
    "your instincts are sharper than the available facts",
    "a wider horizon calls; say yes to the detour",
    "steady effort compounds; keep climbing",
    "an unconventional idea of yours is ready to share",
    "creativity and intuition set the day's direction",
];

const FOCUS_LINES: [&str; 6] = [
    "Guard an hour for what matters most to you.",
    "An honest question clears more air than a clever answer.",
    "Small promises kept build the trust you want.",
    "Let go of one thing that is finished.",
    "Someone nearby needs the encouragement only you can give.",
    "Review before you commit; the details carry the day.",
];

const MOODS: [&str; 5] = ["positive", "energetic", "reflective", "calm", "challenging"];

const COLORS: [&str; 8] = ["blue", "green", "gold", "crimson", "violet", "silver", "amber", "teal"];

const KEYWORD_POOL: [&str; 10] = [
    "growth", "clarity", "patience", "courage", "connection",
    "focus", "renewal", "balance", "momentum", "insight",
];

/// Deterministic content per (sign, date, period): the cache's unique
/// constraint means concurrent generators must agree on the row they race to
/// insert.
pub fn horoscope_content(
    sign: ZodiacSign,
    date: NaiveDate,
    period: HoroscopePeriod,
) -> HoroscopeContent {
    let period_salt = match period {
        HoroscopePeriod::Daily => 0usize,
        HoroscopePeriod::Weekly => 1,
        HoroscopePeriod::Monthly => 2,
    };
    let seed = sign.index()
        .wrapping_mul(131)
        .wrapping_add(date.num_days_from_ce() as usize)
        .wrapping_mul(31)
        .wrapping_add(period_salt * 17);

    let lead = match period {
        HoroscopePeriod::Daily => "Today",
        HoroscopePeriod::Weekly => "This week",
        HoroscopePeriod::Monthly => "This month",
    };

    let content = format!(
        "{}, {}. {}",
        lead,
        SIGN_THEMES[sign.index()],
        FOCUS_LINES[seed % FOCUS_LINES.len()]
    );

    let keywords = vec![
        KEYWORD_POOL[seed % KEYWORD_POOL.len()],
        KEYWORD_POOL[(seed / 7 + 3) % KEYWORD_POOL.len()],
        KEYWORD_POOL[(seed / 13 + 6) % KEYWORD_POOL.len()],
    ];

    HoroscopeContent {
        content,
        mood: MOODS[seed % MOODS.len()],
        keywords,
        lucky_color: COLORS[seed % COLORS.len()],
        lucky_number: ((seed % 99) + 1).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astrology::chart::{compute_natal_chart, BirthInfo};

    fn sample_chart() -> NatalChartData {
        compute_natal_chart(
            &BirthInfo {
                date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
                time: "12:00".to_string(),
                timezone: "UTC".to_string(),
                latitude: 0.0,
                longitude: 0.0,
            },
            8.0,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn free_reading_has_core_sections_and_upsell() {
        let engine = InterpretationEngine::default();
        let text = engine
            .natal_interpretation(&sample_chart(), SubscriptionTier::Free)
            .await
            .unwrap();

        assert!(text.contains("## Sun in Capricorn"));
        assert!(text.contains("## Moon in"));
        assert!(text.contains("## Ascendant in"));
        assert!(text.contains(UPGRADE_NOTE));
        assert!(!text.contains("## Placements"));
    }

    #[tokio::test]
    async fn paid_reading_includes_placements_without_upsell() {
        let engine = InterpretationEngine::default();
        let text = engine
            .natal_interpretation(&sample_chart(), SubscriptionTier::Premium)
            .await
            .unwrap();

        assert!(text.contains("## Placements"));
        assert!(text.contains("- Sun in Capricorn"));
        assert!(!text.contains(UPGRADE_NOTE));
    }

    #[test]
    fn horoscope_content_is_deterministic() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let a = horoscope_content(ZodiacSign::Leo, date, HoroscopePeriod::Daily);
        let b = horoscope_content(ZodiacSign::Leo, date, HoroscopePeriod::Daily);
        assert_eq!(a.content, b.content);
        assert_eq!(a.mood, b.mood);
        assert_eq!(a.lucky_number, b.lucky_number);
    }

    #[test]
    fn horoscope_content_varies_by_sign_and_period() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let leo = horoscope_content(ZodiacSign::Leo, date, HoroscopePeriod::Daily);
        let virgo = horoscope_content(ZodiacSign::Virgo, date, HoroscopePeriod::Daily);
        assert_ne!(leo.content, virgo.content);

        let weekly = horoscope_content(ZodiacSign::Leo, date, HoroscopePeriod::Weekly);
        assert!(weekly.content.starts_with("This week"));
        assert!(leo.content.starts_with("Today"));
    }

    #[test]
    fn lucky_number_stays_in_range() {
        for (i, sign) in ZodiacSign::ALL.iter().enumerate() {
            let date = NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).unwrap();
            let content = horoscope_content(*sign, date, HoroscopePeriod::Daily);
            let n: u32 = content.lucky_number.parse().unwrap();
            assert!((1..=99).contains(&n));
            assert_eq!(content.keywords.len(), 3);
        }
    }
}
