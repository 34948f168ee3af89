//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic or projected bounding box.
///
/// For geographic extents, x is longitude and y is latitude in degrees.
/// Global products use either the -180..180 or the 0..360 longitude
/// convention; the box carries whichever the product declared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The whole globe in -180..180 longitude convention.
    pub fn global() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// The whole globe in 0..360 longitude convention.
    pub fn global_0_360() -> Self {
        Self::new(0.0, -90.0, 360.0, 90.0)
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_extent() {
        let bbox = BoundingBox::global();
        assert_eq!(bbox.width(), 360.0);
        assert_eq!(bbox.height(), 180.0);
        assert!(bbox.contains_point(0.0, 0.0));
        assert!(!bbox.contains_point(181.0, 0.0));
    }

    #[test]
    fn test_regional_contains() {
        // MCD43B4 tile window over central Asia
        let bbox = BoundingBox::new(75.0, 28.0, 110.0, 42.0);
        assert!(bbox.contains_point(90.0, 35.0));
        assert!(!bbox.contains_point(60.0, 35.0));
    }
}
