//! Hammer equal-area projection.
//!
//! Whole-earth elliptical projection used by products that want
//! area-true global fluxes. Spherical form; plane units span
//! x in [-2√2, 2√2] and y in [-√2, √2].

use std::f64::consts::SQRT_2;

use map_common::BoundingBox;

use crate::MapProjection;

/// Hammer projection centered on a chosen meridian.
#[derive(Debug, Clone)]
pub struct Hammer {
    /// Central meridian in degrees
    lon_0: f64,
}

impl Hammer {
    pub fn new(lon_0: f64) -> Self {
        Self { lon_0 }
    }
}

impl Default for Hammer {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl MapProjection for Hammer {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        // Normalize the longitude difference to [-180, 180].
        let mut dlon = lon - self.lon_0;
        while dlon > 180.0 {
            dlon -= 360.0;
        }
        while dlon < -180.0 {
            dlon += 360.0;
        }

        let lam = dlon.to_radians();
        let phi = lat.to_radians();

        let denom = (1.0 + phi.cos() * (lam / 2.0).cos()).sqrt();
        if denom == 0.0 {
            return None;
        }

        let x = 2.0 * SQRT_2 * phi.cos() * (lam / 2.0).sin() / denom;
        let y = SQRT_2 * phi.sin() / denom;
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let z2 = 1.0 - (x / 4.0) * (x / 4.0) - (y / 2.0) * (y / 2.0);
        if z2 < 0.5 {
            // Outside the projection ellipse.
            return None;
        }
        let z = z2.sqrt();

        let lam = 2.0 * (z * x).atan2(2.0 * (2.0 * z2 - 1.0));
        let sin_phi = z * y;
        if sin_phi.abs() > 1.0 {
            return None;
        }
        let phi = sin_phi.asin();

        let mut lon = self.lon_0 + lam.to_degrees();
        if lon > 180.0 {
            lon -= 360.0;
        } else if lon < -180.0 {
            lon += 360.0;
        }
        Some((lon, phi.to_degrees()))
    }

    fn plane_bounds(&self) -> BoundingBox {
        BoundingBox::new(-2.0 * SQRT_2, -SQRT_2, 2.0 * SQRT_2, SQRT_2)
    }

    fn graticule_intervals(&self) -> (f64, f64) {
        (45.0, 45.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_maps_to_origin() {
        let proj = Hammer::default();
        let (x, y) = proj.forward(0.0, 0.0).unwrap();
        assert!(x.abs() < 1e-12);
        assert!(y.abs() < 1e-12);
    }

    #[test]
    fn test_poles_touch_the_minor_axis() {
        let proj = Hammer::default();
        let (x, y) = proj.forward(0.0, 90.0).unwrap();
        assert!(x.abs() < 1e-12);
        assert!((y - SQRT_2).abs() < 1e-12);

        let (_, y) = proj.forward(0.0, -90.0).unwrap();
        assert!((y + SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_equator_edges_touch_the_major_axis() {
        let proj = Hammer::default();
        let (x, y) = proj.forward(180.0, 0.0).unwrap();
        assert!((x - 2.0 * SQRT_2).abs() < 1e-9);
        assert!(y.abs() < 1e-12);
    }

    #[test]
    fn test_everything_inside_plane_bounds() {
        let proj = Hammer::new(0.0);
        let bounds = proj.plane_bounds();
        for lat in (-90..=90).step_by(15) {
            for lon in (-180..=180).step_by(15) {
                let (x, y) = proj.forward(lon as f64, lat as f64).unwrap();
                assert!(
                    bounds.contains_point(x, y),
                    "({}, {}) projected outside bounds",
                    lon,
                    lat
                );
            }
        }
    }

    #[test]
    fn test_forward_inverse_roundtrip() {
        let proj = Hammer::new(0.0);
        for lat in [-80.0, -30.0, 0.0, 45.0, 80.0] {
            for lon in [-150.0, -60.0, 0.0, 90.0, 150.0] {
                let (x, y) = proj.forward(lon, lat).unwrap();
                let (lon2, lat2) = proj.inverse(x, y).unwrap();
                assert!((lon - lon2).abs() < 1e-6, "lon {} vs {}", lon, lon2);
                assert!((lat - lat2).abs() < 1e-6, "lat {} vs {}", lat, lat2);
            }
        }
    }

    #[test]
    fn test_inverse_outside_ellipse() {
        let proj = Hammer::default();
        assert!(proj.inverse(2.0 * SQRT_2, SQRT_2).is_none());
    }

    #[test]
    fn test_recentred_meridian() {
        // With lon_0 = 180 the dateline becomes the center line.
        let proj = Hammer::new(180.0);
        let (x, _) = proj.forward(180.0, 30.0).unwrap();
        assert!(x.abs() < 1e-12);
    }
}
