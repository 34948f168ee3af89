//! Data field and coordinate types.

/// Metadata attributes read alongside a field.
///
/// Every attribute is optional: which ones a product carries depends on
/// the format and the producing instrument. Readers fill in what the
/// backend exposes; the normalizer decides what is required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldAttributes {
    pub units: Option<String>,
    pub long_name: Option<String>,
    pub fill_value: Option<f64>,
    /// Inclusive (min, max) bounds on physically meaningful raw values
    pub valid_range: Option<(f64, f64)>,
    pub scale_factor: Option<f64>,
    pub add_offset: Option<f64>,
}

/// A multi-dimensional numeric field as read from a file.
///
/// Values are row-major, widened to f64 regardless of the stored type.
/// Immutable once read; owned by the pipeline invocation that read it.
#[derive(Debug, Clone)]
pub struct DataField {
    pub name: String,
    pub values: Vec<f64>,
    pub shape: Vec<usize>,
    pub attrs: FieldAttributes,
}

impl DataField {
    /// Total number of elements implied by the shape.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Best available human-readable description: the long_name
    /// attribute, falling back to the field name.
    pub fn description(&self) -> &str {
        self.attrs.long_name.as_deref().unwrap_or(&self.name)
    }
}

/// Geolocation for a field.
#[derive(Debug, Clone)]
pub enum Coordinates {
    /// Regular grid: 1-D latitude and longitude axes. Data shape is
    /// (lat.len(), lon.len()).
    Grid { lat: Vec<f64>, lon: Vec<f64> },
    /// Swath: per-sample 2-D geolocation, same shape as the data (or a
    /// subsampled view of it).
    Swath {
        lat: Vec<f64>,
        lon: Vec<f64>,
        shape: (usize, usize),
    },
}

impl Coordinates {
    /// The (rows, cols) shape the data must have to match.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Coordinates::Grid { lat, lon } => (lat.len(), lon.len()),
            Coordinates::Swath { shape, .. } => *shape,
        }
    }

    /// Latitude and longitude of the cell/sample at (row, col).
    pub fn lat_lon(&self, row: usize, col: usize) -> (f64, f64) {
        match self {
            Coordinates::Grid { lat, lon } => (lat[row], lon[col]),
            Coordinates::Swath { lat, lon, shape } => {
                let idx = row * shape.1 + col;
                (lat[idx], lon[idx])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_falls_back_to_name() {
        let field = DataField {
            name: "ssmiData".into(),
            values: vec![],
            shape: vec![0, 0],
            attrs: FieldAttributes::default(),
        };
        assert_eq!(field.description(), "ssmiData");

        let field = DataField {
            attrs: FieldAttributes {
                long_name: Some("Column Amount Ozone".into()),
                ..Default::default()
            },
            ..field
        };
        assert_eq!(field.description(), "Column Amount Ozone");
    }

    #[test]
    fn test_coordinates_shape_and_lookup() {
        let grid = Coordinates::Grid {
            lat: vec![10.0, 20.0],
            lon: vec![100.0, 110.0, 120.0],
        };
        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.lat_lon(1, 2), (20.0, 120.0));

        let swath = Coordinates::Swath {
            lat: vec![1.0, 2.0, 3.0, 4.0],
            lon: vec![5.0, 6.0, 7.0, 8.0],
            shape: (2, 2),
        };
        assert_eq!(swath.shape(), (2, 2));
        assert_eq!(swath.lat_lon(1, 0), (3.0, 7.0));
    }
}
