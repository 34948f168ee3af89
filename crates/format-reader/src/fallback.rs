//! Per-product fallback metadata for the HDF-EOS2 backend.
//!
//! HDF-EOS2 field-level attributes cannot be retrieved through the
//! grid/swath abstraction, so the known metadata is registered at
//! configuration time, keyed by product. This is a documented backend
//! limitation; whether the underlying gaps are permanent is an open
//! question, so the table is explicit rather than a silent default.

use std::collections::HashMap;

use map_common::FieldAttributes;

/// Known metadata for one product's plotted field.
#[derive(Debug, Clone)]
pub struct FallbackAttrs {
    pub long_name: &'static str,
    pub units: &'static str,
    pub fill_value: f64,
}

impl FallbackAttrs {
    pub fn to_field_attributes(&self) -> FieldAttributes {
        FieldAttributes {
            units: Some(self.units.to_string()),
            long_name: Some(self.long_name.to_string()),
            fill_value: Some(self.fill_value),
            valid_range: None,
            scale_factor: None,
            add_offset: None,
        }
    }
}

/// Fallback metadata table keyed by product name.
#[derive(Debug, Clone, Default)]
pub struct FallbackTable {
    entries: HashMap<String, FallbackAttrs>,
}

impl FallbackTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, product: impl Into<String>, attrs: FallbackAttrs) {
        self.entries.insert(product.into(), attrs);
    }

    pub fn get(&self, product: &str) -> Option<&FallbackAttrs> {
        self.entries.get(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let mut table = FallbackTable::new();
        table.insert(
            "TOMS Level 3",
            FallbackAttrs {
                long_name: "Column Amount Ozone",
                units: "DU",
                fill_value: 0.0,
            },
        );

        let attrs = table.get("TOMS Level 3").unwrap().to_field_attributes();
        assert_eq!(attrs.units.as_deref(), Some("DU"));
        assert_eq!(attrs.fill_value, Some(0.0));
        assert!(table.get("Unknown Product").is_none());
    }
}
