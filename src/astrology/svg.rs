//! Minimal SVG chart wheel: zodiac ring, house spokes, planet glyphs. The
//! ascendant sits at the left edge (9 o'clock), the classic wheel layout.

use std::fmt::Write;

use super::{NatalChartData, ZodiacSign};

const SIZE: f64 = 400.0;
const CENTER: f64 = SIZE / 2.0;
const OUTER_R: f64 = 190.0;
const ZODIAC_R: f64 = 172.0;
const INNER_R: f64 = 150.0;
const PLANET_R: f64 = 120.0;

/// Screen coordinates for an ecliptic longitude at radius `r`. Longitudes
/// increase counter-clockwise with the ascendant pinned at 180 deg screen
/// angle.
fn point(longitude: f64, ascendant: f64, r: f64) -> (f64, f64) {
    let screen_deg = 180.0 - (longitude - ascendant);
    let rad = screen_deg.to_radians();
    (CENTER + r * rad.cos(), CENTER - r * rad.sin())
}

/// Render a chart wheel as a standalone SVG document
pub fn render_wheel(chart: &NatalChartData) -> String {
    let asc = chart.ascendant.longitude;
    let mut out = String::with_capacity(4096);

    let _ = write!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {size} {size}\">",
        size = SIZE
    );
    let _ = write!(
        out,
        "<circle cx=\"{c}\" cy=\"{c}\" r=\"{r}\" fill=\"none\" stroke=\"#444\" stroke-width=\"1.5\"/>",
        c = CENTER,
        r = OUTER_R
    );
    let _ = write!(
        out,
        "<circle cx=\"{c}\" cy=\"{c}\" r=\"{r}\" fill=\"none\" stroke=\"#444\" stroke-width=\"1\"/>",
        c = CENTER,
        r = INNER_R
    );

    // House spokes from the cusps
    for cusp in &chart.houses {
        let (x1, y1) = point(cusp.longitude, asc, INNER_R);
        let (x2, y2) = point(cusp.longitude, asc, OUTER_R);
        let _ = write!(
            out,
            "<line x1=\"{x1:.1}\" y1=\"{y1:.1}\" x2=\"{x2:.1}\" y2=\"{y2:.1}\" stroke=\"#888\" stroke-width=\"0.75\"/>"
        );
    }

    // Sign glyphs at each sector's midpoint
    for (i, sign) in ZodiacSign::ALL.iter().enumerate() {
        let mid = i as f64 * 30.0 + 15.0;
        let (x, y) = point(mid, asc, ZODIAC_R);
        let _ = write!(
            out,
            "<text x=\"{x:.1}\" y=\"{y:.1}\" font-size=\"14\" text-anchor=\"middle\" dominant-baseline=\"central\">{glyph}</text>",
            glyph = sign.glyph()
        );
    }

    // Planet glyphs, retrograde ones marked
    for planet in &chart.planets {
        let (x, y) = point(planet.longitude, asc, PLANET_R);
        let marker = if planet.retrograde { " \u{211E}" } else { "" };
        let _ = write!(
            out,
            "<text x=\"{x:.1}\" y=\"{y:.1}\" font-size=\"13\" text-anchor=\"middle\" dominant-baseline=\"central\">{glyph}{marker}</text>",
            glyph = planet.body.glyph()
        );
    }

    out.push_str("</svg>");
    out
}
