//! Format backends for satellite/earth-science data files.
//!
//! Three interchangeable backends sit behind the [`FormatBackend`]
//! capability trait, so the pipeline never knows which library opened
//! the file:
//!
//! - [`NetCdfBackend`] — classic multi-dimensional datasets via the
//!   `netcdf` crate. Also covers HDF4 products when libnetcdf is built
//!   with HDF4 support.
//! - [`Hdf5Backend`] — hierarchical containers via `hdf5-metno`, with
//!   slash-separated dataset paths.
//! - [`EosGridBackend`] — the grid/swath abstraction over HDF-EOS2
//!   files. Field-level attribute retrieval is not available for this
//!   format version, so attributes come from a configuration-time
//!   fallback table keyed by product (a backend limitation, not a
//!   defect).
//!
//! Handles are RAII: the underlying file is released when the handle is
//! dropped, even if extraction failed partway through.

pub mod eos;
pub mod fallback;
pub mod hdf5;
pub mod netcdf;

use std::path::Path;

use map_common::{DataField, MapResult};

pub use self::eos::EosGridBackend;
pub use self::fallback::{FallbackAttrs, FallbackTable};
pub use self::hdf5::Hdf5Backend;
pub use self::netcdf::NetCdfBackend;

/// A format backend: opens files read-only and hands out [`FileHandle`]s.
pub trait FormatBackend {
    fn open(&self, path: &Path) -> MapResult<Box<dyn FileHandle>>;
}

/// An open data file.
///
/// Dropping the handle releases the underlying file deterministically.
pub trait FileHandle {
    /// Read a named numeric field and whatever attributes the backend
    /// exposes for it.
    fn read_field(&self, name: &str) -> MapResult<DataField>;

    /// Read a coordinate array (values plus shape).
    fn read_coord(&self, name: &str) -> MapResult<(Vec<f64>, Vec<usize>)>;
}
