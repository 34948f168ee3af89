//! Linear grid axes for products that store no geolocation arrays.
//!
//! Several gridded products define their coordinates by formula only:
//! `coord[i] = first + i * step`. Descending axes (latitude running
//! 90°N to 90°S) use a negative step.

use serde::{Deserialize, Serialize};

/// One linear coordinate axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridAxis {
    /// Coordinate of the first point
    pub first: f64,
    /// Spacing between points (negative for descending axes)
    pub step: f64,
    /// Number of points
    pub count: usize,
}

impl GridAxis {
    /// Create a new axis from its formula parameters.
    pub fn new(first: f64, step: f64, count: usize) -> Self {
        Self { first, step, count }
    }

    /// Axis of `count` cell centers evenly covering `[min, max]`.
    ///
    /// This is the computed-grid case: a global field with no stored
    /// geolocation puts cell centers at `min + step/2, min + 3*step/2, ...`.
    pub fn cell_centers(min: f64, max: f64, count: usize) -> Self {
        let step = (max - min) / count as f64;
        Self {
            first: min + step / 2.0,
            step,
            count,
        }
    }

    /// Same as [`GridAxis::cell_centers`] but running high-to-low, for
    /// latitude axes stored north-to-south.
    pub fn cell_centers_descending(min: f64, max: f64, count: usize) -> Self {
        let step = (max - min) / count as f64;
        Self {
            first: max - step / 2.0,
            step: -step,
            count,
        }
    }

    /// Materialize the axis values.
    pub fn values(&self) -> Vec<f64> {
        (0..self.count)
            .map(|i| self.first + i as f64 * self.step)
            .collect()
    }

    /// Coordinate of the last point.
    pub fn last(&self) -> f64 {
        self.first + (self.count.saturating_sub(1)) as f64 * self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descending_latitude_axis() {
        // TRMM 3A46: 1-degree grid, latitudes 89.5 down to -89.5
        let lat = GridAxis::new(89.5, -1.0, 180);
        let values = lat.values();
        assert_eq!(values.len(), 180);
        assert_eq!(values[0], 89.5);
        assert_eq!(*values.last().unwrap(), -89.5);
    }

    #[test]
    fn test_cell_centers() {
        // CERES-style computed grid: centers of 360 cells spanning the globe
        let lon = GridAxis::cell_centers(-180.0, 180.0, 360);
        let values = lon.values();
        assert!((values[0] - (-179.5)).abs() < 1e-9);
        assert!((values[359] - 179.5).abs() < 1e-9);
    }

    #[test]
    fn test_cell_centers_descending() {
        let lat = GridAxis::cell_centers_descending(-90.0, 90.0, 180);
        assert!((lat.first - 89.5).abs() < 1e-9);
        assert!((lat.last() - (-89.5)).abs() < 1e-9);
    }
}
