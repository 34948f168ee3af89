//! Colormap machinery: color stops and gradient interpolation.

use map_common::{MapError, MapResult};
use serde::{Deserialize, Serialize};

/// Color value in RGBA format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
}

/// A gradient stop: fractional position in 0..=1 plus a hex color.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColorStop {
    pub position: f64,
    pub color: String,
}

/// A colormap built from ordered color stops.
#[derive(Debug, Clone)]
pub struct Colormap {
    stops: Vec<(f64, Color)>,
}

impl Colormap {
    /// Build a colormap from stops; positions must be ascending and
    /// cover 0..=1.
    pub fn from_stops(stops: &[ColorStop]) -> MapResult<Self> {
        if stops.len() < 2 {
            return Err(MapError::Render("colormap needs at least 2 stops".into()));
        }

        let mut parsed = Vec::with_capacity(stops.len());
        for stop in stops {
            let (r, g, b) = hex_to_rgb(&stop.color).ok_or_else(|| {
                MapError::Render(format!("bad colormap color '{}'", stop.color))
            })?;
            parsed.push((stop.position, Color::rgb(r, g, b)));
        }

        if parsed.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(MapError::Render("colormap stops must ascend".into()));
        }

        Ok(Self { stops: parsed })
    }

    /// Load a colormap from a JSON stop list.
    pub fn from_json(json: &str) -> MapResult<Self> {
        let stops: Vec<ColorStop> = serde_json::from_str(json)
            .map_err(|e| MapError::Render(format!("bad colormap JSON: {}", e)))?;
        Self::from_stops(&stops)
    }

    /// The classic blue-to-red spectral ramp.
    pub fn spectral() -> Self {
        Self::from_stops(&[
            ColorStop { position: 0.0, color: "#000083".into() },
            ColorStop { position: 0.125, color: "#0000ff".into() },
            ColorStop { position: 0.375, color: "#00ffff".into() },
            ColorStop { position: 0.625, color: "#ffff00".into() },
            ColorStop { position: 0.875, color: "#ff0000".into() },
            ColorStop { position: 1.0, color: "#800000".into() },
        ])
        .expect("builtin ramp is valid")
    }

    /// Map a fraction in 0..=1 to a color by linear interpolation
    /// between the surrounding stops. Out-of-range input clamps.
    pub fn sample(&self, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);

        let mut lo = self.stops[0];
        for &hi in &self.stops[1..] {
            if t <= hi.0 {
                let span = hi.0 - lo.0;
                let f = if span > 0.0 { (t - lo.0) / span } else { 0.0 };
                return Color {
                    r: lerp(lo.1.r, hi.1.r, f),
                    g: lerp(lo.1.g, hi.1.g, f),
                    b: lerp(lo.1.b, hi.1.b, f),
                    a: 255,
                };
            }
            lo = hi;
        }
        self.stops[self.stops.len() - 1].1
    }
}

fn lerp(a: u8, b: u8, f: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * f).round() as u8
}

/// Parse a `#rrggbb` hex color.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}
