//! MCD43B4 nadir reflectance (band 1) over its sinusoidal tile window.
//!
//! The tile's geolocation lives in a companion file (the dumped
//! per-cell latitude/longitude for tile h25v05), resolved through the
//! same locator policy as the data file.

use pipeline::{BackendChoice, CoordSource, FieldSpec, OutputNaming, Product, ProjectionChoice};
use map_common::BoundingBox;
use renderer::{LabelFormat, PlotStyle};

fn main() {
    gallery::init();

    let product = Product {
        name: "mcd43b4-reflectance",
        default_filename: "MCD43B4.A2007193.h25v05.005.2007211152315.hdf",
        backend: BackendChoice::NetCdf,
        fields: vec![FieldSpec::simple("Nadir_Reflectance_Band1")],
        coords: CoordSource::Companion {
            default_filename: "MCD43B4.A2007193.h25v05.geolocation.hdf",
            lat: "Latitude",
            lon: "Longitude",
        },
        projection: ProjectionChoice::CylindricalRegion(BoundingBox::new(75.0, 28.0, 110.0, 42.0)),
        style: PlotStyle::Mesh,
        label_format: LabelFormat::Plain(2),
        title_qualifier: None,
        output: OutputNaming::Basename,
    };

    gallery::run(&product);
}
