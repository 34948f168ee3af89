//! The shared read → mask → plot pipeline.
//!
//! A [`Product`] describes one gallery entry completely: which file to
//! look for, which backend opens it, which field(s) to plot, where the
//! geolocation comes from, how raw values become physical ones, and how
//! the figure is presented. [`run`] executes the pipeline for every
//! field and returns the written PNG paths.
//!
//! Control flow is strictly sequential. Any failure propagates
//! immediately; either all of a field's stages complete and its image
//! is written, or nothing is written for that field.

pub mod locator;
pub mod writer;

use std::path::{Path, PathBuf};

use format_reader::{
    EosGridBackend, FallbackTable, FileHandle, FormatBackend, Hdf5Backend, NetCdfBackend,
};
use map_common::{
    BoundingBox, Coordinates, DataField, FieldAttributes, GridAxis, MapError, MapResult,
};
use normalize::NormalizeSpec;
use projection::{Cylindrical, Hammer, MapProjection, PolarStereographic};
use renderer::{Annotations, LabelFormat, PlotStyle, Renderer};
use tracing::info;

/// Which format backend opens the product's file.
#[derive(Debug)]
pub enum BackendChoice {
    NetCdf,
    Hdf5,
    /// HDF-EOS2 grid access with fallback metadata for the named product.
    EosGrid {
        product: &'static str,
        table: FallbackTable,
    },
}

impl BackendChoice {
    fn build(&self) -> Box<dyn FormatBackend> {
        match self {
            BackendChoice::NetCdf => Box::new(NetCdfBackend),
            BackendChoice::Hdf5 => Box::new(Hdf5Backend),
            BackendChoice::EosGrid { product, table } => {
                Box::new(EosGridBackend::new(*product, table.clone()))
            }
        }
    }
}

/// Where a product's geolocation comes from.
#[derive(Debug, Clone)]
pub enum CoordSource {
    /// 1-D latitude/longitude axis variables in the data file.
    GridAxes {
        lat: &'static str,
        lon: &'static str,
    },
    /// Per-sample geolocation variables in the data file.
    Swath {
        lat: &'static str,
        lon: &'static str,
    },
    /// Geolocation stored in a companion file, resolved through the
    /// same locator policy as the data file.
    Companion {
        default_filename: &'static str,
        lat: &'static str,
        lon: &'static str,
    },
    /// Axes given by the grid formula (products with documented grids
    /// but no stored geolocation).
    Linear { lat: GridAxis, lon: GridAxis },
    /// Global cell-centered axes computed from the data shape, latitude
    /// running north to south.
    ComputedGlobal,
}

/// Values patched over the attributes a backend managed to read, for
/// metadata the file carries somewhere the backend cannot reach.
#[derive(Debug, Clone, Default)]
pub struct AttrOverrides {
    pub units: Option<&'static str>,
    pub long_name: Option<&'static str>,
    pub fill_value: Option<f64>,
    pub valid_range: Option<(f64, f64)>,
    pub scale_factor: Option<f64>,
    pub add_offset: Option<f64>,
}

impl AttrOverrides {
    fn apply(&self, attrs: &mut FieldAttributes) {
        if let Some(v) = self.units {
            attrs.units = Some(v.to_string());
        }
        if let Some(v) = self.long_name {
            attrs.long_name = Some(v.to_string());
        }
        if let Some(v) = self.fill_value {
            attrs.fill_value = Some(v);
        }
        if let Some(v) = self.valid_range {
            attrs.valid_range = Some(v);
        }
        if let Some(v) = self.scale_factor {
            attrs.scale_factor = Some(v);
        }
        if let Some(v) = self.add_offset {
            attrs.add_offset = Some(v);
        }
    }
}

/// One plotted field of a product.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Variable name, or slash-separated dataset path for HDF5.
    pub name: &'static str,
    pub normalize: NormalizeSpec,
    pub overrides: AttrOverrides,
}

impl FieldSpec {
    /// Field with attribute-driven normalization and no overrides.
    pub fn simple(name: &'static str) -> Self {
        Self {
            name,
            normalize: NormalizeSpec::from_attributes(),
            overrides: AttrOverrides::default(),
        }
    }

    /// Short name used in output filenames ("/a/b/xco2" -> "xco2").
    fn short_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(self.name)
    }
}

/// Map projection choice, fixed per product.
#[derive(Debug, Clone)]
pub enum ProjectionChoice {
    CylindricalGlobal,
    CylindricalGlobal0To360,
    CylindricalRegion(BoundingBox),
    NorthPolar { bounding_lat: f64, lon_0: f64 },
    SouthPolar { bounding_lat: f64, lon_0: f64 },
    Hammer { lon_0: f64 },
}

impl ProjectionChoice {
    fn build(&self) -> Box<dyn MapProjection + Sync> {
        match *self {
            ProjectionChoice::CylindricalGlobal => Box::new(Cylindrical::global()),
            ProjectionChoice::CylindricalGlobal0To360 => Box::new(Cylindrical::global_0_360()),
            ProjectionChoice::CylindricalRegion(bbox) => Box::new(Cylindrical::new(bbox)),
            ProjectionChoice::NorthPolar { bounding_lat, lon_0 } => {
                Box::new(PolarStereographic::north(bounding_lat, lon_0))
            }
            ProjectionChoice::SouthPolar { bounding_lat, lon_0 } => {
                Box::new(PolarStereographic::south(bounding_lat, lon_0))
            }
            ProjectionChoice::Hammer { lon_0 } => Box::new(Hammer::new(lon_0)),
        }
    }
}

/// Output naming policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputNaming {
    /// `<basename>.png`
    Basename,
    /// `<stem>.<field>.png`, for products emitting one figure per field
    BasenameField,
}

/// Complete description of one gallery entry.
#[derive(Debug)]
pub struct Product {
    pub name: &'static str,
    pub default_filename: &'static str,
    pub backend: BackendChoice,
    pub fields: Vec<FieldSpec>,
    pub coords: CoordSource,
    pub projection: ProjectionChoice,
    pub style: PlotStyle,
    pub label_format: LabelFormat,
    /// Extra text appended to the field description in the title
    /// (e.g. a plane annotation).
    pub title_qualifier: Option<&'static str>,
    pub output: OutputNaming,
}

/// Execute the pipeline for every field of a product.
///
/// Returns the paths of the written PNGs. The input file handle is
/// released when this function returns, error or not.
pub fn run(product: &Product, renderer: &Renderer) -> MapResult<Vec<PathBuf>> {
    let path = locator::resolve(product.default_filename);
    info!(product = product.name, path = %path.display(), "starting pipeline");

    let backend = product.backend.build();
    let handle = backend.open(&path)?;

    // Companion-file geolocation is read once, up front.
    let companion_coords = match &product.coords {
        CoordSource::Companion {
            default_filename,
            lat,
            lon,
        } => {
            let geo_path = locator::resolve(default_filename);
            info!(path = %geo_path.display(), "reading companion geolocation");
            let geo_handle = backend.open(&geo_path)?;
            Some(load_swath(geo_handle.as_ref(), lat, lon)?)
        }
        _ => None,
    };

    let proj = product.projection.build();
    let mut written = Vec::with_capacity(product.fields.len());

    for spec in &product.fields {
        let mut field = handle.read_field(spec.name)?;
        spec.overrides.apply(&mut field.attrs);

        let (normalized, coords) = match &product.coords {
            CoordSource::ComputedGlobal => {
                let normalized = normalize::normalize_unchecked(&field, &spec.normalize)?;
                let lat = GridAxis::cell_centers_descending(-90.0, 90.0, normalized.rows);
                let lon = GridAxis::cell_centers(-180.0, 180.0, normalized.cols);
                let coords = Coordinates::Grid {
                    lat: lat.values(),
                    lon: lon.values(),
                };
                (normalized, coords)
            }
            CoordSource::Linear { lat, lon } => {
                let coords = Coordinates::Grid {
                    lat: lat.values(),
                    lon: lon.values(),
                };
                let normalized = normalize::normalize(&field, &spec.normalize, coords.shape())?;
                (normalized, coords)
            }
            CoordSource::GridAxes { lat, lon } => {
                let (lat_values, _) = handle.read_coord(lat)?;
                let (lon_values, _) = handle.read_coord(lon)?;
                let coords = Coordinates::Grid {
                    lat: lat_values,
                    lon: lon_values,
                };
                let normalized = normalize::normalize(&field, &spec.normalize, coords.shape())?;
                (normalized, coords)
            }
            CoordSource::Swath { lat, lon } => {
                let coords = load_swath(handle.as_ref(), lat, lon)?;
                let normalized = normalize::normalize(&field, &spec.normalize, coords.shape())?;
                (normalized, coords)
            }
            CoordSource::Companion { .. } => {
                let coords = companion_coords
                    .clone()
                    .expect("companion coordinates read above");
                let normalized = normalize::normalize(&field, &spec.normalize, coords.shape())?;
                (normalized, coords)
            }
        };

        let annotations = Annotations {
            title: compose_title(&path, &field, product.title_qualifier),
            colorbar_label: field.attrs.units.clone().unwrap_or_default(),
            label_format: product.label_format,
        };

        let figure = renderer.render(&normalized, &coords, proj.as_ref(), product.style, &annotations)?;

        let suffix = match product.output {
            OutputNaming::Basename => None,
            OutputNaming::BasenameField => Some(spec.short_name()),
        };
        written.push(writer::save_png(&figure, &path, suffix)?);
    }

    info!(product = product.name, figures = written.len(), "pipeline finished");
    Ok(written)
}

/// `"{basename}\n{description}[ {qualifier}]"`.
fn compose_title(path: &Path, field: &DataField, qualifier: Option<&str>) -> String {
    let basename = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match qualifier {
        Some(q) => format!("{}\n{} {}", basename, field.description(), q),
        None => format!("{}\n{}", basename, field.description()),
    }
}

/// Read per-sample geolocation, accepting 1-D tracks, 2-D swaths and
/// 3-D blocked swaths (flattened along the leading dimension).
fn load_swath(handle: &dyn FileHandle, lat: &str, lon: &str) -> MapResult<Coordinates> {
    let (lat_values, lat_shape) = handle.read_coord(lat)?;
    let (lon_values, lon_shape) = handle.read_coord(lon)?;

    if lat_shape != lon_shape {
        let to_2d = |s: &[usize]| swath_shape(s).unwrap_or((0, 0));
        let (data_rows, data_cols) = to_2d(&lat_shape);
        let (coord_rows, coord_cols) = to_2d(&lon_shape);
        return Err(MapError::ShapeMismatch {
            data_rows,
            data_cols,
            coord_rows,
            coord_cols,
        });
    }

    let shape = swath_shape(&lat_shape).ok_or_else(|| {
        MapError::Format(format!("geolocation '{}' has unsupported rank {}", lat, lat_shape.len()))
    })?;

    Ok(Coordinates::Swath {
        lat: lat_values,
        lon: lon_values,
        shape,
    })
}

fn swath_shape(shape: &[usize]) -> Option<(usize, usize)> {
    match shape {
        [n] => Some((1, *n)),
        [rows, cols] => Some((*rows, *cols)),
        [blocks, rows, cols] => Some((blocks * rows, *cols)),
        _ => None,
    }
}
