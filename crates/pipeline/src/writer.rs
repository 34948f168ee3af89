//! Figure output.
//!
//! Figures are written as PNG to the working directory, named after the
//! input file: `<basename>.png`, or `<stem>.<field>.png` when a product
//! emits one figure per field. Existing files are overwritten without
//! warning; re-running with identical inputs reproduces the output.

use std::path::{Path, PathBuf};

use map_common::{MapError, MapResult};
use renderer::Figure;
use tracing::info;

/// Output filename for a figure derived from `source`.
pub fn output_name(source: &Path, field: Option<&str>) -> PathBuf {
    match field {
        None => {
            let base = source
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "figure".to_string());
            PathBuf::from(format!("{}.png", base))
        }
        Some(field) => {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "figure".to_string());
            PathBuf::from(format!("{}.{}.png", stem, field.replace(' ', "_")))
        }
    }
}

/// Encode and write a figure; returns the path written.
pub fn save_png(figure: &Figure, source: &Path, field: Option<&str>) -> MapResult<PathBuf> {
    let out = output_name(source, field);
    let bytes = figure.png_bytes()?;
    std::fs::write(&out, &bytes).map_err(MapError::Io)?;
    info!(path = %out.display(), bytes = bytes.len(), "wrote figure");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_name_plain() {
        let name = output_name(Path::new("/data/TOMS-EP_L3.HDF"), None);
        assert_eq!(name, PathBuf::from("TOMS-EP_L3.HDF.png"));
    }

    #[test]
    fn test_output_name_with_field() {
        let name = output_name(
            Path::new("MOD05_L2.A2010001.hdf"),
            Some("Water Vapor Near Infrared"),
        );
        assert_eq!(
            name,
            PathBuf::from("MOD05_L2.A2010001.Water_Vapor_Near_Infrared.png")
        );
    }
}
