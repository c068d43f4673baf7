//! Natal chart assembly from delegated ephemeris positions, plus the derived
//! transit and synastry computations.

use std::str::FromStr;

use chrono::{DateTime, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::ephemeris;
use super::{
    angular_separation, detect_aspect, AnglePosition, Aspect, AspectKind, AstroError,
    CelestialBody, Element, HouseCusp, NatalChartData, PlanetPosition, ZodiacSign,
};

/// Birth data needed to cast a chart
#[derive(Debug, Clone)]
pub struct BirthInfo {
    pub date: NaiveDate,
    /// Local wall-clock time, "HH:MM"
    pub time: String,
    /// IANA timezone name, e.g. "Europe/Berlin"
    pub timezone: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl BirthInfo {
    /// Resolve the birth moment to UTC
    pub fn to_utc(&self) -> Result<DateTime<Utc>, AstroError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AstroError::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AstroError::LongitudeOutOfRange(self.longitude));
        }

        let (hour, minute) = parse_birth_time(&self.time)?;
        let tz = Tz::from_str(&self.timezone)
            .map_err(|_| AstroError::InvalidTimezone(self.timezone.clone()))?;

        let naive = self
            .date
            .and_hms_opt(hour, minute, 0)
            .ok_or_else(|| AstroError::InvalidBirthTime(self.time.clone()))?;

        let local = match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            // DST fold: take the earlier reading of the repeated hour
            LocalResult::Ambiguous(earlier, _) => earlier,
            LocalResult::None => {
                return Err(AstroError::NonexistentLocalTime(
                    naive.to_string(),
                    self.timezone.clone(),
                ))
            }
        };

        Ok(local.with_timezone(&Utc))
    }
}

/// Parse a "HH:MM" wall-clock string
pub fn parse_birth_time(time: &str) -> Result<(u32, u32), AstroError> {
    let invalid = || AstroError::InvalidBirthTime(time.to_string());

    let (hours, minutes) = time.split_once(':').ok_or_else(invalid)?;
    let hour: u32 = hours.parse().map_err(|_| invalid())?;
    let minute: u32 = minutes.parse().map_err(|_| invalid())?;

    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

/// Cast a full natal chart: planet placements, angles, equal houses, aspects
pub fn compute_natal_chart(birth: &BirthInfo, orb_deg: f64) -> Result<NatalChartData, AstroError> {
    let utc = birth.to_utc()?;
    let jd = ephemeris::julian_day(utc);
    let jd_next = jd + 1.0;

    // Two samples per body: today's longitude places the planet, tomorrow's
    // gives retrograde motion and applying/separating aspect state
    let longitudes: Vec<(CelestialBody, f64, f64)> = CelestialBody::ALL
        .iter()
        .map(|&body| {
            (
                body,
                ephemeris::body_longitude(body, jd),
                ephemeris::body_longitude(body, jd_next),
            )
        })
        .collect();

    let eps = ephemeris::mean_obliquity(jd);
    let ramc = ephemeris::greenwich_sidereal_time(jd) + birth.longitude.to_radians();
    let asc = ascendant_from_ramc(ramc, eps, birth.latitude.to_radians());
    let mc = midheaven_from_ramc(ramc, eps);

    let planets: Vec<PlanetPosition> = longitudes
        .iter()
        .map(|&(body, long, long_next)| PlanetPosition {
            body,
            sign: ZodiacSign::from_longitude(long),
            longitude: long,
            position: long.rem_euclid(30.0),
            house: house_of(long, asc),
            retrograde: signed_delta(long, long_next) < 0.0,
        })
        .collect();

    let houses: Vec<HouseCusp> = (0..12)
        .map(|i| {
            let cusp = (asc + 30.0 * i as f64).rem_euclid(360.0);
            HouseCusp {
                house: i as u8 + 1,
                sign: ZodiacSign::from_longitude(cusp),
                longitude: cusp,
                position: cusp.rem_euclid(30.0),
            }
        })
        .collect();

    let mut aspects = Vec::new();
    for (i, &(body_a, long_a, next_a)) in longitudes.iter().enumerate() {
        for &(body_b, long_b, next_b) in longitudes.iter().skip(i + 1) {
            if let Some((kind, orb)) = detect_aspect(long_a, long_b, orb_deg) {
                let orb_next = (angular_separation(next_a, next_b) - kind.angle()).abs();
                aspects.push(Aspect {
                    body_a,
                    body_b,
                    kind,
                    orb,
                    applying: orb_next < orb,
                });
            }
        }
    }

    Ok(NatalChartData {
        planets,
        ascendant: angle_position(asc),
        midheaven: angle_position(mc),
        houses,
        aspects,
        calculated_at: Utc::now(),
    })
}

fn angle_position(longitude: f64) -> AnglePosition {
    AnglePosition {
        sign: ZodiacSign::from_longitude(longitude),
        longitude,
        position: longitude.rem_euclid(30.0),
    }
}

/// Ecliptic longitude of the ascendant in degrees, from the right ascension
/// of the midheaven, obliquity and geographic latitude (all radians)
pub(crate) fn ascendant_from_ramc(ramc: f64, eps: f64, lat: f64) -> f64 {
    let asc = ramc
        .cos()
        .atan2(-(ramc.sin() * eps.cos() + lat.tan() * eps.sin()));
    asc.to_degrees().rem_euclid(360.0)
}

/// Ecliptic longitude of the midheaven in degrees
pub(crate) fn midheaven_from_ramc(ramc: f64, eps: f64) -> f64 {
    let mc = ramc.sin().atan2(ramc.cos() * eps.cos());
    mc.to_degrees().rem_euclid(360.0)
}

/// Equal house containing an ecliptic longitude, counted from the ascendant
pub(crate) fn house_of(longitude: f64, ascendant: f64) -> u8 {
    ((longitude - ascendant).rem_euclid(360.0) / 30.0) as u8 + 1
}

/// Shortest signed difference b - a in degrees, in [-180, 180)
pub(crate) fn signed_delta(a: f64, b: f64) -> f64 {
    (b - a + 180.0).rem_euclid(360.0) - 180.0
}

/// A transiting body making an aspect to a natal placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transit {
    pub transiting: CelestialBody,
    pub transit_longitude: f64,
    pub transit_sign: ZodiacSign,
    pub natal: CelestialBody,
    pub kind: AspectKind,
    pub orb: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitReport {
    pub transit_date: DateTime<Utc>,
    pub active_transits: Vec<Transit>,
}

/// Current sky against a natal chart, within a tight orb
pub fn compute_transits(natal: &NatalChartData, at: DateTime<Utc>, orb_deg: f64) -> TransitReport {
    let jd = ephemeris::julian_day(at);

    let mut active_transits = Vec::new();
    for &transiting in CelestialBody::ALL.iter() {
        let transit_longitude = ephemeris::body_longitude(transiting, jd);
        for natal_planet in &natal.planets {
            if let Some((kind, orb)) = detect_aspect(transit_longitude, natal_planet.longitude, orb_deg)
            {
                active_transits.push(Transit {
                    transiting,
                    transit_longitude,
                    transit_sign: ZodiacSign::from_longitude(transit_longitude),
                    natal: natal_planet.body,
                    kind,
                    orb,
                });
            }
        }
    }

    TransitReport {
        transit_date: at,
        active_transits,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterAspect {
    pub body_a: CelestialBody,
    pub body_b: CelestialBody,
    pub kind: AspectKind,
    pub orb: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementBalance {
    pub fire: u32,
    pub earth: u32,
    pub air: u32,
    pub water: u32,
}

impl ElementBalance {
    fn count(&mut self, element: Element) {
        match element {
            Element::Fire => self.fire += 1,
            Element::Earth => self.earth += 1,
            Element::Air => self.air += 1,
            Element::Water => self.water += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynastryReport {
    /// 0-100, from weighted inter-chart aspects
    pub compatibility_score: u32,
    pub inter_aspects: Vec<InterAspect>,
    pub element_balance: ElementBalance,
}

/// Inter-chart aspects and a naive compatibility score for two charts
pub fn compute_synastry(a: &NatalChartData, b: &NatalChartData, orb_deg: f64) -> SynastryReport {
    let mut inter_aspects = Vec::new();
    for pa in &a.planets {
        for pb in &b.planets {
            if let Some((kind, orb)) = detect_aspect(pa.longitude, pb.longitude, orb_deg) {
                inter_aspects.push(InterAspect {
                    body_a: pa.body,
                    body_b: pb.body,
                    kind,
                    orb,
                });
            }
        }
    }

    let mut score: i64 = 50;
    for aspect in &inter_aspects {
        score += match aspect.kind {
            AspectKind::Trine => 5,
            AspectKind::Sextile => 3,
            AspectKind::Conjunction => 2,
            AspectKind::Opposition => -3,
            AspectKind::Square => -4,
        };
    }

    let mut element_balance = ElementBalance::default();
    for planet in a.planets.iter().chain(b.planets.iter()) {
        element_balance.count(planet.sign.element());
    }

    SynastryReport {
        compatibility_score: score.clamp(0, 100) as u32,
        inter_aspects,
        element_balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn birth_j2000() -> BirthInfo {
        BirthInfo {
            date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            time: "12:00".to_string(),
            timezone: "UTC".to_string(),
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    #[test]
    fn parses_birth_times() {
        assert_eq!(parse_birth_time("00:00").unwrap(), (0, 0));
        assert_eq!(parse_birth_time("23:59").unwrap(), (23, 59));
        assert_eq!(parse_birth_time("7:05").unwrap(), (7, 5));
        assert!(parse_birth_time("24:00").is_err());
        assert!(parse_birth_time("12:60").is_err());
        assert!(parse_birth_time("noonish").is_err());
        assert!(parse_birth_time("12").is_err());
    }

    #[test]
    fn resolves_timezone_to_utc() {
        // EST is UTC-5 with no DST in January
        let birth = BirthInfo {
            date: NaiveDate::from_ymd_opt(2000, 1, 15).unwrap(),
            time: "12:00".to_string(),
            timezone: "America/New_York".to_string(),
            latitude: 40.7,
            longitude: -74.0,
        };
        let utc = birth.to_utc().unwrap();
        assert_eq!(utc.to_rfc3339(), "2000-01-15T17:00:00+00:00");
    }

    #[test]
    fn rejects_unknown_timezone() {
        let mut birth = birth_j2000();
        birth.timezone = "Mars/Olympus_Mons".to_string();
        assert!(matches!(birth.to_utc(), Err(AstroError::InvalidTimezone(_))));
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let mut birth = birth_j2000();
        birth.latitude = 91.0;
        assert!(matches!(birth.to_utc(), Err(AstroError::LatitudeOutOfRange(_))));

        let mut birth = birth_j2000();
        birth.longitude = -200.0;
        assert!(matches!(birth.to_utc(), Err(AstroError::LongitudeOutOfRange(_))));
    }

    #[test]
    fn equator_angles_are_orthogonal() {
        let eps = 23.44_f64.to_radians();
        // RAMC 0h: midheaven on the vernal point, ascendant 90 deg later
        assert_abs_diff_eq!(midheaven_from_ramc(0.0, eps), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ascendant_from_ramc(0.0, eps, 0.0), 90.0, epsilon = 1e-9);
        // RAMC 6h
        assert_abs_diff_eq!(midheaven_from_ramc(90.0_f64.to_radians(), eps), 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            ascendant_from_ramc(90.0_f64.to_radians(), eps, 0.0),
            180.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn house_assignment_counts_from_ascendant() {
        assert_eq!(house_of(100.0, 100.0), 1);
        assert_eq!(house_of(129.9, 100.0), 1);
        assert_eq!(house_of(130.0, 100.0), 2);
        assert_eq!(house_of(99.9, 100.0), 12);
        assert_eq!(house_of(10.0, 100.0), 10);
    }

    #[test]
    fn signed_delta_wraps() {
        assert_abs_diff_eq!(signed_delta(359.9, 0.1), 0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(signed_delta(0.1, 359.9), -0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(signed_delta(10.0, 15.0), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn casts_a_complete_chart() {
        let chart = compute_natal_chart(&birth_j2000(), 8.0).unwrap();

        assert_eq!(chart.planets.len(), 10);
        assert_eq!(chart.houses.len(), 12);

        let sun = chart.planet(CelestialBody::Sun).unwrap();
        assert_eq!(sun.sign, ZodiacSign::Capricorn);
        assert!((0.0..30.0).contains(&sun.position));

        for planet in &chart.planets {
            assert!((1..=12).contains(&planet.house));
            assert!((0.0..360.0).contains(&planet.longitude));
        }

        // Equal houses: consecutive cusps are 30 degrees apart
        for pair in chart.houses.windows(2) {
            let gap = (pair[1].longitude - pair[0].longitude).rem_euclid(360.0);
            assert_abs_diff_eq!(gap, 30.0, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(chart.houses[0].longitude, chart.ascendant.longitude, epsilon = 1e-9);

        for aspect in &chart.aspects {
            assert!(aspect.orb <= 8.0);
        }
    }

    #[test]
    fn transits_against_self_are_conjunctions() {
        let chart = compute_natal_chart(&birth_j2000(), 8.0).unwrap();
        let at = birth_j2000().to_utc().unwrap();

        let report = compute_transits(&chart, at, 1.0);
        let sun_to_sun = report
            .active_transits
            .iter()
            .find(|t| t.transiting == CelestialBody::Sun && t.natal == CelestialBody::Sun)
            .expect("sun conjunct its own natal position");
        assert_eq!(sun_to_sun.kind, AspectKind::Conjunction);
        assert!(sun_to_sun.orb < 0.01);
    }

    #[test]
    fn synastry_of_identical_charts_scores_high() {
        let chart = compute_natal_chart(&birth_j2000(), 8.0).unwrap();
        let report = compute_synastry(&chart, &chart, 3.0);

        // Every planet at least conjuncts itself
        assert!(report.inter_aspects.len() >= 10);
        assert!(report.compatibility_score <= 100);

        let total = report.element_balance.fire
            + report.element_balance.earth
            + report.element_balance.air
            + report.element_balance.water;
        assert_eq!(total, 20);
    }
}
