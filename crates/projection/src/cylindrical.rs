//! Equidistant cylindrical (plate carrée) projection.
//!
//! Plane coordinates are longitude/latitude degrees directly, clipped
//! to a geographic window. Global products use either the -180..180 or
//! the 0..360 longitude convention; the window decides which, and
//! incoming longitudes are normalized to match before clipping.

use map_common::BoundingBox;

use crate::{nice_interval, MapProjection};

/// Equidistant cylindrical projection over a geographic window.
#[derive(Debug, Clone)]
pub struct Cylindrical {
    window: BoundingBox,
}

impl Cylindrical {
    /// Projection over an arbitrary window (regional products).
    pub fn new(window: BoundingBox) -> Self {
        Self { window }
    }

    /// Global extent, -180..180 longitudes.
    pub fn global() -> Self {
        Self::new(BoundingBox::global())
    }

    /// Global extent, 0..360 longitudes.
    pub fn global_0_360() -> Self {
        Self::new(BoundingBox::global_0_360())
    }

    /// Normalize a longitude into the window's convention.
    fn normalize_lon(&self, lon: f64) -> f64 {
        let mut lon = lon;
        if self.window.max_x > 180.0 && lon < 0.0 {
            lon += 360.0;
        } else if self.window.min_x < 0.0 && lon > 180.0 {
            lon -= 360.0;
        }
        lon
    }
}

impl MapProjection for Cylindrical {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let lon = self.normalize_lon(lon);
        if !self.window.contains_point(lon, lat) {
            return None;
        }
        Some((lon, lat))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !self.window.contains_point(x, y) {
            return None;
        }
        Some((x, y))
    }

    fn plane_bounds(&self) -> BoundingBox {
        self.window
    }

    fn graticule_intervals(&self) -> (f64, f64) {
        (
            nice_interval(self.window.height(), 6.0),
            nice_interval(self.window.width(), 8.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_passthrough() {
        let proj = Cylindrical::global();
        assert_eq!(proj.forward(-75.0, 40.0), Some((-75.0, 40.0)));
        assert_eq!(proj.forward(0.0, -90.0), Some((0.0, -90.0)));
    }

    #[test]
    fn test_0_360_normalization() {
        let proj = Cylindrical::global_0_360();
        // -75°W normalizes to 285°E inside the 0..360 window.
        assert_eq!(proj.forward(-75.0, 40.0), Some((285.0, 40.0)));
    }

    #[test]
    fn test_regional_clipping() {
        // MCD43B4 tile window
        let proj = Cylindrical::new(BoundingBox::new(75.0, 28.0, 110.0, 42.0));
        assert!(proj.forward(90.0, 35.0).is_some());
        assert!(proj.forward(60.0, 35.0).is_none());
        assert!(proj.forward(90.0, 50.0).is_none());
    }

    #[test]
    fn test_inverse_is_identity_inside_window() {
        let proj = Cylindrical::global();
        assert_eq!(proj.inverse(-75.0, 40.0), Some((-75.0, 40.0)));
        assert_eq!(proj.inverse(-200.0, 40.0), None);
    }

    #[test]
    fn test_regional_graticule_is_finer_than_global() {
        let global = Cylindrical::global();
        let regional = Cylindrical::new(BoundingBox::new(75.0, 28.0, 110.0, 42.0));
        assert!(regional.graticule_intervals().0 < global.graticule_intervals().0);
    }
}
