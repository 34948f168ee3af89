//! Grid/swath abstraction backend for HDF-EOS2 files.
//!
//! Values are read through libnetcdf like the classic backend (the
//! grid's fields surface as plain variables), but field-level attribute
//! retrieval is not available for HDF-EOS2, so attributes are taken
//! from the registered [`FallbackTable`] instead. A product without a
//! table entry fails with AttributeMissing rather than proceeding with
//! silent defaults.

use std::path::Path;

use map_common::{DataField, MapError, MapResult};
use tracing::debug;

use crate::fallback::FallbackTable;
use crate::netcdf::silence_hdf5_errors;
use crate::{FileHandle, FormatBackend};

/// Backend for HDF-EOS2 grid/swath files.
#[derive(Debug)]
pub struct EosGridBackend {
    product: String,
    table: FallbackTable,
}

impl EosGridBackend {
    /// Create a backend for the named product, with the fallback
    /// metadata table to consult for its fields.
    pub fn new(product: impl Into<String>, table: FallbackTable) -> Self {
        Self {
            product: product.into(),
            table,
        }
    }
}

impl FormatBackend for EosGridBackend {
    fn open(&self, path: &Path) -> MapResult<Box<dyn FileHandle>> {
        silence_hdf5_errors();

        if !path.exists() {
            return Err(MapError::FileNotFound(path.to_path_buf()));
        }

        let file = netcdf::open(path)
            .map_err(|e| MapError::Format(format!("failed to open {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), product = %self.product, "opened HDF-EOS2 file");
        Ok(Box::new(EosGridHandle {
            file,
            product: self.product.clone(),
            table: self.table.clone(),
        }))
    }
}

struct EosGridHandle {
    file: netcdf::File,
    product: String,
    table: FallbackTable,
}

impl FileHandle for EosGridHandle {
    fn read_field(&self, name: &str) -> MapResult<DataField> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| MapError::FieldNotFound(name.to_string()))?;

        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let values: Vec<f64> = var
            .get_values(..)
            .map_err(|e| MapError::Format(format!("failed to read {}: {}", name, e)))?;

        // Attribute retrieval is unavailable through this abstraction;
        // the registered per-product metadata stands in.
        let attrs = self
            .table
            .get(&self.product)
            .ok_or_else(|| MapError::AttributeMissing {
                field: name.to_string(),
                attribute: format!("fallback metadata for product '{}'", self.product),
            })?
            .to_field_attributes();

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::FallbackAttrs;

    fn write_fixture(path: &Path) {
        let mut file = netcdf::create(path).unwrap();
        file.add_dimension("YDim", 2).unwrap();
        file.add_dimension("XDim", 2).unwrap();
        // HDF-EOS2 grid fields carry no usable attributes here, which is
        // exactly the case the fallback table exists for.
        let mut var = file.add_variable::<f64>("Ozone", &["YDim", "XDim"]).unwrap();
        var.put_values(&[280.0, 300.0, 0.0, 320.0], ..).unwrap();
    }

    #[test]
    fn test_attributes_come_from_fallback_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toms.nc");
        write_fixture(&path);

        let mut table = FallbackTable::new();
        table.insert(
            "TOMS Level 3",
            FallbackAttrs {
                long_name: "Column Amount Ozone",
                units: "DU",
                fill_value: 0.0,
            },
        );

        let backend = EosGridBackend::new("TOMS Level 3", table);
        let handle = backend.open(&path).unwrap();
        let field = handle.read_field("Ozone").unwrap();

        assert_eq!(field.attrs.long_name.as_deref(), Some("Column Amount Ozone"));
        assert_eq!(field.attrs.fill_value, Some(0.0));
    }

    #[test]
    fn test_unregistered_product_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toms.nc");
        write_fixture(&path);

        let backend = EosGridBackend::new("TOMS Level 3", FallbackTable::new());
        let handle = backend.open(&path).unwrap();
        assert!(matches!(
            handle.read_field("Ozone"),
            Err(MapError::AttributeMissing { .. })
        ));
    }
}
