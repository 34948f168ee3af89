//! Polar stereographic projection, north or south aspect.
//!
//! Spherical form, tangent at the pole. Plane units are fractions of
//! the sphere radius; the drawable disk is bounded at a latitude
//! cutoff, matching the polar plots' circular frame.

use std::f64::consts::FRAC_PI_4;

use map_common::BoundingBox;

use crate::MapProjection;

/// Which pole the projection is centered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolarAspect {
    North,
    South,
}

/// Polar stereographic projection bounded at a latitude cutoff.
#[derive(Debug, Clone)]
pub struct PolarStereographic {
    aspect: PolarAspect,
    /// Latitude (degrees) of the map edge; the plot covers poleward of this
    bounding_lat: f64,
    /// Central meridian (degrees), drawn pointing down the plane's -y axis
    lon_0: f64,
    /// Plane radius at the bounding latitude
    rho_max: f64,
}

impl PolarStereographic {
    /// Create a projection for the given aspect, bounded at
    /// `bounding_lat` degrees, with central meridian `lon_0`.
    pub fn new(aspect: PolarAspect, bounding_lat: f64, lon_0: f64) -> Self {
        let rho_max = Self::rho(aspect, bounding_lat);
        Self {
            aspect,
            bounding_lat,
            lon_0,
            rho_max,
        }
    }

    /// Antarctic view bounded at `bounding_lat` (e.g. -60).
    pub fn south(bounding_lat: f64, lon_0: f64) -> Self {
        Self::new(PolarAspect::South, bounding_lat, lon_0)
    }

    /// Arctic view bounded at `bounding_lat` (e.g. 60).
    pub fn north(bounding_lat: f64, lon_0: f64) -> Self {
        Self::new(PolarAspect::North, bounding_lat, lon_0)
    }

    /// Distance from the pole in plane units for a latitude.
    fn rho(aspect: PolarAspect, lat_deg: f64) -> f64 {
        let lat = lat_deg.to_radians();
        match aspect {
            PolarAspect::North => 2.0 * (FRAC_PI_4 - lat / 2.0).tan(),
            PolarAspect::South => 2.0 * (FRAC_PI_4 + lat / 2.0).tan(),
        }
    }

    /// The latitude cutoff of the map edge.
    pub fn bounding_lat(&self) -> f64 {
        self.bounding_lat
    }
}

impl MapProjection for PolarStereographic {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        match self.aspect {
            PolarAspect::North if lat < self.bounding_lat => return None,
            PolarAspect::South if lat > self.bounding_lat => return None,
            _ => {}
        }

        let rho = Self::rho(self.aspect, lat);
        let dlon = (lon - self.lon_0).to_radians();

        // The central meridian runs toward the bottom of the plot.
        let (x, y) = match self.aspect {
            PolarAspect::North => (rho * dlon.sin(), -rho * dlon.cos()),
            PolarAspect::South => (rho * dlon.sin(), rho * dlon.cos()),
        };
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let rho = x.hypot(y);
        if rho > self.rho_max {
            return None;
        }
        if rho == 0.0 {
            let pole = match self.aspect {
                PolarAspect::North => 90.0,
                PolarAspect::South => -90.0,
            };
            return Some((self.lon_0, pole));
        }

        let (lat, dlon) = match self.aspect {
            PolarAspect::North => (90.0 - 2.0 * (rho / 2.0).atan().to_degrees(), x.atan2(-y)),
            PolarAspect::South => (2.0 * (rho / 2.0).atan().to_degrees() - 90.0, x.atan2(y)),
        };

        let mut lon = self.lon_0 + dlon.to_degrees();
        if lon > 180.0 {
            lon -= 360.0;
        } else if lon < -180.0 {
            lon += 360.0;
        }
        Some((lon, lat))
    }

    fn plane_bounds(&self) -> BoundingBox {
        BoundingBox::new(-self.rho_max, -self.rho_max, self.rho_max, self.rho_max)
    }

    fn graticule_intervals(&self) -> (f64, f64) {
        // Polar plots read best with tight parallels and wide meridians.
        (10.0, 30.0)
    }
}
