//! Classic scientific-data-format backend via the `netcdf` crate.
//!
//! Covers netCDF-3/netCDF-4 files directly, and HDF4 products when
//! libnetcdf is built with HDF4 support (the HDF-EOS2 grid objects then
//! appear as plain variables with `XDim:GridName`-style names).

use std::path::Path;
use std::sync::Once;

use map_common::{DataField, FieldAttributes, MapError, MapResult};
use tracing::debug;

use crate::{FileHandle, FormatBackend};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose diagnostics to stderr even when
/// errors are handled gracefully (e.g. probing for optional attributes
/// that don't exist). Calling H5Eset_auto2 with null handlers once per
/// process disables that output; safe to call repeatedly.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and null handlers are a
        // documented way to disable the error stack printing.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Backend for netCDF and netCDF-readable HDF4 files.
#[derive(Debug, Default)]
pub struct NetCdfBackend;

impl FormatBackend for NetCdfBackend {
    fn open(&self, path: &Path) -> MapResult<Box<dyn FileHandle>> {
        silence_hdf5_errors();

        if !path.exists() {
            return Err(MapError::FileNotFound(path.to_path_buf()));
        }

        let file = netcdf::open(path)
            .map_err(|e| MapError::Format(format!("failed to open {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "opened netCDF file");
        Ok(Box::new(NetCdfHandle { file }))
    }
}

/// An open netCDF file. Dropping it closes the file.
struct NetCdfHandle {
    file: netcdf::File,
}

impl FileHandle for NetCdfHandle {
    fn read_field(&self, name: &str) -> MapResult<DataField> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| MapError::FieldNotFound(name.to_string()))?;

        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

        // Widen to f64 on read regardless of the stored type.
        let values: Vec<f64> = var
            .get_values(..)
            .map_err(|e| MapError::Format(format!("failed to read {}: {}", name, e)))?;

        let attrs = read_attributes(&var);
        debug!(field = name, ?shape, "read field");

        Ok(DataField {
            name: name.to_string(),
            values,
            shape,
            attrs,
        })
    }

    fn read_coord(&self, name: &str) -> MapResult<(Vec<f64>, Vec<usize>)> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| MapError::FieldNotFound(name.to_string()))?;

        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let values: Vec<f64> = var
            .get_values(..)
            .map_err(|e| MapError::Format(format!("failed to read {}: {}", name, e)))?;

        Ok((values, shape))
    }
}

/// Extract the attribute set the normalizer understands.
///
/// `_FillValue` and `missing_value` are both in the wild for the fill
/// sentinel; CF prefers the former, older products carry the latter.
fn read_attributes(var: &netcdf::Variable) -> FieldAttributes {
    FieldAttributes {
        units: get_string_attr(var, "units"),
        long_name: get_string_attr(var, "long_name"),
        fill_value: get_f64_attr(var, "_FillValue").or_else(|| get_f64_attr(var, "missing_value")),
        valid_range: get_f64_pair_attr(var, "valid_range"),
        scale_factor: get_f64_attr(var, "scale_factor"),
        add_offset: get_f64_attr(var, "add_offset"),
    }
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when probing for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let value = var.attribute_value(name)?.ok()?;
    f64::try_from(value).ok()
}

fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        netcdf::AttributeValue::Strs(v) => v.into_iter().next(),
        // Some HDF4 products store text attributes as byte arrays
        netcdf::AttributeValue::Uchars(v) => String::from_utf8(v).ok(),
        netcdf::AttributeValue::Schars(v) => {
            String::from_utf8(v.into_iter().map(|b| b as u8).collect()).ok()
        }
        _ => None,
    }
}

/// Read a two-element numeric attribute as (min, max).
fn get_f64_pair_attr(var: &netcdf::Variable, name: &str) -> Option<(f64, f64)> {
    if !has_attr(var, name) {
        return None;
    }
    let values = attr_to_f64_vec(var.attribute_value(name)?.ok()?)?;
    if values.len() != 2 {
        return None;
    }
    Some((values[0], values[1]))
}

fn attr_to_f64_vec(value: netcdf::AttributeValue) -> Option<Vec<f64>> {
    use netcdf::AttributeValue::*;
    Some(match value {
        Uchars(v) => v.into_iter().map(f64::from).collect(),
        Schars(v) => v.into_iter().map(f64::from).collect(),
        Ushorts(v) => v.into_iter().map(f64::from).collect(),
        Shorts(v) => v.into_iter().map(f64::from).collect(),
        Uints(v) => v.into_iter().map(f64::from).collect(),
        Ints(v) => v.into_iter().map(f64::from).collect(),
        Ulonglongs(v) => v.into_iter().map(|x| x as f64).collect(),
        Longlongs(v) => v.into_iter().map(|x| x as f64).collect(),
        Floats(v) => v.into_iter().map(f64::from).collect(),
        Doubles(v) => v,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fixture(path: &Path) {
        let mut file = netcdf::create(path).unwrap();
        file.add_dimension("y", 2).unwrap();
        file.add_dimension("x", 3).unwrap();

        let mut var = file.add_variable::<f64>("Ozone", &["y", "x"]).unwrap();
        var.put_attribute("units", "DU").unwrap();
        var.put_attribute("long_name", "Column Amount Ozone").unwrap();
        var.put_attribute("_FillValue", 0.0f64).unwrap();
        var.put_attribute("valid_range", vec![50.0f64, 650.0]).unwrap();
        var.put_values(&[100.0, 200.0, 300.0, 0.0, 400.0, 500.0], ..)
            .unwrap();

        let mut lat = file.add_variable::<f64>("Latitude", &["y"]).unwrap();
        lat.put_values(&[10.0, 20.0], ..).unwrap();
    }

    #[test]
    fn test_read_field_and_attributes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.nc");
        write_fixture(&path);

        let handle = NetCdfBackend.open(&path).unwrap();
        let field = handle.read_field("Ozone").unwrap();

        assert_eq!(field.shape, vec![2, 3]);
        assert_eq!(field.values.len(), 6);
        assert_eq!(field.attrs.units.as_deref(), Some("DU"));
        assert_eq!(field.attrs.long_name.as_deref(), Some("Column Amount Ozone"));
        assert_eq!(field.attrs.fill_value, Some(0.0));
        assert_eq!(field.attrs.valid_range, Some((50.0, 650.0)));
        assert_eq!(field.attrs.scale_factor, None);
    }

    #[test]
    fn test_read_coord() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.nc");
        write_fixture(&path);

        let handle = NetCdfBackend.open(&path).unwrap();
        let (values, shape) = handle.read_coord("Latitude").unwrap();
        assert_eq!(shape, vec![2]);
        assert_eq!(values, vec![10.0, 20.0]);
    }

    #[test]
    fn test_missing_file_and_field() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.nc");
        assert!(matches!(
            NetCdfBackend.open(&missing),
            Err(MapError::FileNotFound(_))
        ));

        let path = dir.path().join("fixture.nc");
        write_fixture(&path);
        let handle = NetCdfBackend.open(&path).unwrap();
        assert!(matches!(
            handle.read_field("NoSuchField"),
            Err(MapError::FieldNotFound(_))
        ));
    }
}
