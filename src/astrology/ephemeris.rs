//! Thin wrapper over the `astro` ephemeris crate. Everything that touches the
//! external backend lives here; the rest of the crate works in degrees.

use astro::{angle, ecliptic, lunar, planet, pluto, sun, time};
use chrono::{DateTime, Datelike, Timelike, Utc};

use super::CelestialBody;

/// Julian Day for a UTC instant
pub fn julian_day(utc: DateTime<Utc>) -> f64 {
    let decimal_day = utc.day() as f64
        + (utc.hour() as f64 + utc.minute() as f64 / 60.0 + utc.second() as f64 / 3600.0) / 24.0;

    let date = time::Date {
        year: utc.year() as i16,
        month: utc.month() as u8,
        decimal_day,
        cal_type: time::CalType::Gregorian,
    };

    time::julian_day(&date)
}

/// Geocentric ecliptic longitude of a body in degrees, [0, 360)
pub fn body_longitude(body: CelestialBody, jd: f64) -> f64 {
    match body {
        CelestialBody::Sun => {
            let (ecl_point, _) = sun::geocent_ecl_pos(jd);
            angle::limit_to_360(ecl_point.long.to_degrees())
        }
        CelestialBody::Moon => {
            let (ecl_point, _) = lunar::geocent_ecl_pos(jd);
            angle::limit_to_360(ecl_point.long.to_degrees())
        }
        CelestialBody::Pluto => {
            let (long, lat, rad_vec) = pluto::heliocent_pos(jd);
            geocentric_longitude(long, lat, rad_vec, jd)
        }
        other => {
            let target = match other {
                CelestialBody::Mercury => planet::Planet::Mercury,
                CelestialBody::Venus => planet::Planet::Venus,
                CelestialBody::Mars => planet::Planet::Mars,
                CelestialBody::Jupiter => planet::Planet::Jupiter,
                CelestialBody::Saturn => planet::Planet::Saturn,
                CelestialBody::Uranus => planet::Planet::Uranus,
                // Sun/Moon/Pluto handled above
                _ => planet::Planet::Neptune,
            };
            let (long, lat, rad_vec) = planet::heliocent_coords(&target, jd);
            geocentric_longitude(long, lat, rad_vec, jd)
        }
    }
}

/// Shift heliocentric ecliptic coordinates (radians, AU) to the geocentric
/// longitude seen from Earth at the same instant
fn geocentric_longitude(long: f64, lat: f64, rad_vec: f64, jd: f64) -> f64 {
    let (earth_long, earth_lat, earth_rad) =
        planet::heliocent_coords(&planet::Planet::Earth, jd);

    let (x, y, _) = rectangular(long, lat, rad_vec);
    let (ex, ey, _) = rectangular(earth_long, earth_lat, earth_rad);

    let geo_long = (y - ey).atan2(x - ex);
    angle::limit_to_360(geo_long.to_degrees())
}

fn rectangular(long: f64, lat: f64, r: f64) -> (f64, f64, f64) {
    (
        r * lat.cos() * long.cos(),
        r * lat.cos() * long.sin(),
        r * lat.sin(),
    )
}

/// Mean obliquity of the ecliptic, radians
pub fn mean_obliquity(jd: f64) -> f64 {
    ecliptic::mn_oblq_IAU(jd)
}

/// Greenwich mean sidereal time, radians
pub fn greenwich_sidereal_time(jd: f64) -> f64 {
    time::mn_sidr(jd)
}
