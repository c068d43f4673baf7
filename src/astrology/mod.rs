//! Astrological domain types and chart assembly. All planetary positions are
//! delegated to the external ephemeris backend wrapped in [`ephemeris`].

pub mod chart;
pub mod ephemeris;
pub mod svg;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AstroError {
    #[error("unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("invalid birth time (expected HH:MM): {0}")]
    InvalidBirthTime(String),

    #[error("local time {0} does not exist in timezone {1}")]
    NonexistentLocalTime(String, String),

    #[error("latitude must be within [-90, 90], got {0}")]
    LatitudeOutOfRange(f64),

    #[error("longitude must be within [-180, 180], got {0}")]
    LongitudeOutOfRange(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// Sign containing an ecliptic longitude in degrees
    pub fn from_longitude(longitude: f64) -> ZodiacSign {
        let normalized = longitude.rem_euclid(360.0);
        let index = (normalized / 30.0) as usize;
        Self::ALL[index.min(11)]
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "aries",
            ZodiacSign::Taurus => "taurus",
            ZodiacSign::Gemini => "gemini",
            ZodiacSign::Cancer => "cancer",
            ZodiacSign::Leo => "leo",
            ZodiacSign::Virgo => "virgo",
            ZodiacSign::Libra => "libra",
            ZodiacSign::Scorpio => "scorpio",
            ZodiacSign::Sagittarius => "sagittarius",
            ZodiacSign::Capricorn => "capricorn",
            ZodiacSign::Aquarius => "aquarius",
            ZodiacSign::Pisces => "pisces",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "\u{2648}",
            ZodiacSign::Taurus => "\u{2649}",
            ZodiacSign::Gemini => "\u{264A}",
            ZodiacSign::Cancer => "\u{264B}",
            ZodiacSign::Leo => "\u{264C}",
            ZodiacSign::Virgo => "\u{264D}",
            ZodiacSign::Libra => "\u{264E}",
            ZodiacSign::Scorpio => "\u{264F}",
            ZodiacSign::Sagittarius => "\u{2650}",
            ZodiacSign::Capricorn => "\u{2651}",
            ZodiacSign::Aquarius => "\u{2652}",
            ZodiacSign::Pisces => "\u{2653}",
        }
    }

    pub fn element(&self) -> Element {
        match self {
            ZodiacSign::Aries | ZodiacSign::Leo | ZodiacSign::Sagittarius => Element::Fire,
            ZodiacSign::Taurus | ZodiacSign::Virgo | ZodiacSign::Capricorn => Element::Earth,
            ZodiacSign::Gemini | ZodiacSign::Libra | ZodiacSign::Aquarius => Element::Air,
            ZodiacSign::Cancer | ZodiacSign::Scorpio | ZodiacSign::Pisces => Element::Water,
        }
    }
}

impl std::str::FromStr for ZodiacSign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .find(|sign| sign.as_str() == lower)
            .copied()
            .ok_or_else(|| format!("unknown zodiac sign: {}", s))
    }
}

impl std::fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

/// Bodies included in a chart, in traditional order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CelestialBody {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl CelestialBody {
    pub const ALL: [CelestialBody; 10] = [
        CelestialBody::Sun,
        CelestialBody::Moon,
        CelestialBody::Mercury,
        CelestialBody::Venus,
        CelestialBody::Mars,
        CelestialBody::Jupiter,
        CelestialBody::Saturn,
        CelestialBody::Uranus,
        CelestialBody::Neptune,
        CelestialBody::Pluto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CelestialBody::Sun => "sun",
            CelestialBody::Moon => "moon",
            CelestialBody::Mercury => "mercury",
            CelestialBody::Venus => "venus",
            CelestialBody::Mars => "mars",
            CelestialBody::Jupiter => "jupiter",
            CelestialBody::Saturn => "saturn",
            CelestialBody::Uranus => "uranus",
            CelestialBody::Neptune => "neptune",
            CelestialBody::Pluto => "pluto",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            CelestialBody::Sun => "\u{2609}",
            CelestialBody::Moon => "\u{263D}",
            CelestialBody::Mercury => "\u{263F}",
            CelestialBody::Venus => "\u{2640}",
            CelestialBody::Mars => "\u{2642}",
            CelestialBody::Jupiter => "\u{2643}",
            CelestialBody::Saturn => "\u{2644}",
            CelestialBody::Uranus => "\u{2645}",
            CelestialBody::Neptune => "\u{2646}",
            CelestialBody::Pluto => "\u{2647}",
        }
    }
}

impl std::fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectKind {
    Conjunction,
    Sextile,
    Square,
    Trine,
    Opposition,
}

impl AspectKind {
    pub const ALL: [AspectKind; 5] = [
        AspectKind::Conjunction,
        AspectKind::Sextile,
        AspectKind::Square,
        AspectKind::Trine,
        AspectKind::Opposition,
    ];

    /// Exact angle of the aspect in degrees
    pub fn angle(&self) -> f64 {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::Sextile => 60.0,
            AspectKind::Square => 90.0,
            AspectKind::Trine => 120.0,
            AspectKind::Opposition => 180.0,
        }
    }
}

/// A planet placed on the chart wheel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetPosition {
    pub body: CelestialBody,
    pub sign: ZodiacSign,
    /// Ecliptic longitude in degrees, [0, 360)
    pub longitude: f64,
    /// Degrees into the sign, [0, 30)
    pub position: f64,
    /// Equal house the planet falls in, 1..=12
    pub house: u8,
    pub retrograde: bool,
}

/// Ascendant / midheaven
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnglePosition {
    pub sign: ZodiacSign,
    pub longitude: f64,
    pub position: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseCusp {
    pub house: u8,
    pub sign: ZodiacSign,
    pub longitude: f64,
    pub position: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aspect {
    pub body_a: CelestialBody,
    pub body_b: CelestialBody,
    pub kind: AspectKind,
    /// Deviation from the exact aspect angle, in degrees
    pub orb: f64,
    /// True when the bodies are moving toward the exact angle
    pub applying: bool,
}

/// Everything computed for a natal chart; serialized into the chart row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NatalChartData {
    pub planets: Vec<PlanetPosition>,
    pub ascendant: AnglePosition,
    pub midheaven: AnglePosition,
    pub houses: Vec<HouseCusp>,
    pub aspects: Vec<Aspect>,
    pub calculated_at: DateTime<Utc>,
}

impl NatalChartData {
    pub fn planet(&self, body: CelestialBody) -> Option<&PlanetPosition> {
        self.planets.iter().find(|p| p.body == body)
    }
}

/// Separation between two ecliptic longitudes, in [0, 180]
pub fn angular_separation(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(360.0);
    diff.min(360.0 - diff)
}

/// Match a separation against the classic aspects within `orb_deg`
pub fn detect_aspect(long_a: f64, long_b: f64, orb_deg: f64) -> Option<(AspectKind, f64)> {
    let separation = angular_separation(long_a, long_b);
    AspectKind::ALL
        .iter()
        .map(|kind| (*kind, (separation - kind.angle()).abs()))
        .filter(|(_, orb)| *orb <= orb_deg)
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
}
