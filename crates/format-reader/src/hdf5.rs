//! Hierarchical-array backend via the `hdf5-metno` crate.
//!
//! Datasets are addressed by slash-separated group paths
//! (`/RetrievalResults/xco2`). Attribute spellings vary by product:
//! newer files carry CF names (`units`, `long_name`), older swath
//! products use `Units` / `Description`, so both are consulted.

use std::path::Path;

use hdf5_metno as hdf5;
use map_common::{DataField, FieldAttributes, MapError, MapResult};
use tracing::debug;

use crate::netcdf::silence_hdf5_errors;
use crate::{FileHandle, FormatBackend};

/// Backend for HDF5 files.
#[derive(Debug, Default)]
pub struct Hdf5Backend;

impl FormatBackend for Hdf5Backend {
    fn open(&self, path: &Path) -> MapResult<Box<dyn FileHandle>> {
        silence_hdf5_errors();

        if !path.exists() {
            return Err(MapError::FileNotFound(path.to_path_buf()));
        }

        let file = hdf5::File::open(path)
            .map_err(|e| MapError::Format(format!("failed to open {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "opened HDF5 file");
        Ok(Box::new(Hdf5Handle { file }))
    }
}

/// An open HDF5 file. Dropping it closes the file.
struct Hdf5Handle {
    file: hdf5::File,
}

impl Hdf5Handle {
    fn dataset(&self, name: &str) -> MapResult<hdf5::Dataset> {
        self.file
            .dataset(name)
            .map_err(|_| MapError::FieldNotFound(name.to_string()))
    }
}

impl FileHandle for Hdf5Handle {
    fn read_field(&self, name: &str) -> MapResult<DataField> {
        let ds = self.dataset(name)?;
        let shape = ds.shape();
        let values: Vec<f64> = ds
            .read_raw()
            .map_err(|e| MapError::Format(format!("failed to read {}: {}", name, e)))?;

        let attrs = read_attributes(&ds);
        debug!(field = name, ?shape, "read dataset");

        Ok(DataField {
            name: name.to_string(),
            values,
            shape,
            attrs,
        })
    }

    fn read_coord(&self, name: &str) -> MapResult<(Vec<f64>, Vec<usize>)> {
        let ds = self.dataset(name)?;
        let shape = ds.shape();
        let values: Vec<f64> = ds
            .read_raw()
            .map_err(|e| MapError::Format(format!("failed to read {}: {}", name, e)))?;
        Ok((values, shape))
    }
}

fn read_attributes(ds: &hdf5::Dataset) -> FieldAttributes {
    FieldAttributes {
        units: get_string_attr(ds, &["units", "Units"]),
        long_name: get_string_attr(ds, &["long_name", "Description"]),
        fill_value: get_f64_attr(ds, &["_FillValue", "missing_value"]),
        valid_range: get_f64_pair_attr(ds, "valid_range"),
        scale_factor: get_f64_attr(ds, &["scale_factor"]),
        add_offset: get_f64_attr(ds, &["add_offset"]),
    }
}

fn has_attr(ds: &hdf5::Dataset, name: &str) -> bool {
    ds.attr_names().map_or(false, |names| names.iter().any(|n| n == name))
}

/// First attribute under any of the given spellings, as a string.
///
/// Some products store text attributes as length-1 string arrays, so
/// everything is read through `read_raw` and the first element taken.
fn get_string_attr(ds: &hdf5::Dataset, names: &[&str]) -> Option<String> {
    for name in names {
        if !has_attr(ds, name) {
            continue;
        }
        let Ok(attr) = ds.attr(name) else { continue };
        if let Ok(v) = attr.read_raw::<hdf5::types::VarLenUnicode>() {
            if let Some(s) = v.into_iter().next() {
                return Some(s.to_string());
            }
        }
        if let Ok(v) = attr.read_raw::<hdf5::types::VarLenAscii>() {
            if let Some(s) = v.into_iter().next() {
                return Some(s.to_string());
            }
        }
    }
    None
}

fn get_f64_attr(ds: &hdf5::Dataset, names: &[&str]) -> Option<f64> {
    for name in names {
        if !has_attr(ds, name) {
            continue;
        }
        let Ok(attr) = ds.attr(name) else { continue };
        if let Ok(v) = attr.read_raw::<f64>() {
            if let Some(x) = v.into_iter().next() {
                return Some(x);
            }
        }
    }
    None
}

fn get_f64_pair_attr(ds: &hdf5::Dataset, name: &str) -> Option<(f64, f64)> {
    if !has_attr(ds, name) {
        return None;
    }
    let attr = ds.attr(name).ok()?;
    let v = attr.read_raw::<f64>().ok()?;
    if v.len() != 2 {
        return None;
    }
    Some((v[0], v[1]))
}
