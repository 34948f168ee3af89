//! TOMS Level 3 daily column ozone on a global cylindrical map.
//!
//! The HDF-EOS2 grid abstraction cannot surface field attributes, so
//! the known metadata is registered in the fallback table.

use format_reader::{FallbackAttrs, FallbackTable};
use pipeline::{BackendChoice, CoordSource, FieldSpec, OutputNaming, Product, ProjectionChoice};
use renderer::{LabelFormat, PlotStyle};

fn main() {
    gallery::init();

    let mut table = FallbackTable::new();
    table.insert(
        "TOMS Level 3",
        FallbackAttrs {
            long_name: "Column Amount Ozone",
            units: "DU",
            fill_value: 0.0,
        },
    );

    let product = Product {
        name: "toms-ozone",
        default_filename: "TOMS-EP_L3-TOMSEPL3_2000m0101_v8.HDF",
        backend: BackendChoice::EosGrid {
            product: "TOMS Level 3",
            table,
        },
        fields: vec![FieldSpec::simple("Ozone")],
        coords: CoordSource::GridAxes {
            lat: "YDim:TOMS Level 3",
            lon: "XDim:TOMS Level 3",
        },
        projection: ProjectionChoice::CylindricalGlobal,
        style: PlotStyle::Mesh,
        label_format: LabelFormat::Plain(0),
        title_qualifier: None,
        output: OutputNaming::Basename,
    };

    gallery::run(&product);
}
