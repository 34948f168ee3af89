//! Low-resolution coastline database.
//!
//! The polylines are embedded as a JSON asset and parsed once per
//! process. Resolution is deliberately coarse: gallery figures draw
//! coastlines as context, not as cartography.

use std::sync::OnceLock;

use serde::Deserialize;

/// One named coastline polyline, vertices as (lon, lat) degrees.
#[derive(Debug, Clone, Deserialize)]
pub struct Segment {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct CoastlineFile {
    segments: Vec<Segment>,
}

/// The embedded coastline set.
#[derive(Debug)]
pub struct CoastlineDb {
    segments: Vec<Segment>,
}

impl CoastlineDb {
    /// The built-in low-resolution database. Parsed on first use.
    pub fn builtin() -> &'static CoastlineDb {
        static DB: OnceLock<CoastlineDb> = OnceLock::new();
        DB.get_or_init(|| {
            let raw = include_str!("../assets/coastlines_low.json");
            let file: CoastlineFile =
                serde_json::from_str(raw).expect("embedded coastline asset is valid JSON");
            CoastlineDb {
                segments: file.segments,
            }
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_loads() {
        let db = CoastlineDb::builtin();
        assert!(db.segments().len() >= 10);

        // Every vertex must be a plausible geographic coordinate.
        for segment in db.segments() {
            assert!(segment.points.len() >= 2, "{} too short", segment.name);
            for &[lon, lat] in &segment.points {
                assert!((-180.0..=180.0).contains(&lon), "{}: lon {}", segment.name, lon);
                assert!((-90.0..=90.0).contains(&lat), "{}: lat {}", segment.name, lat);
            }
        }
    }

    #[test]
    fn test_major_landmasses_present() {
        let db = CoastlineDb::builtin();
        for name in ["africa", "eurasia", "north-america", "antarctica"] {
            assert!(
                db.segments().iter().any(|s| s.name == name),
                "missing {}",
                name
            );
        }
    }
}
