//! TRMM 3A46 SSM/I surface rain rate on a 0..360 cylindrical map.
//!
//! The grid stores no geolocation; the documented 1-degree grid runs
//! 89.5..-89.5 / 0.5..359.5. Fill is defined only by example, as the
//! value found at the grid's first cell.

use map_common::GridAxis;
use normalize::{NormalizeSpec, SentinelPolicy};
use pipeline::{
    AttrOverrides, BackendChoice, CoordSource, FieldSpec, OutputNaming, Product, ProjectionChoice,
};
use renderer::{LabelFormat, PlotStyle};

fn main() {
    gallery::init();

    let product = Product {
        name: "trmm-ssmi",
        default_filename: "3A46.080101.2.HDF",
        backend: BackendChoice::NetCdf,
        fields: vec![FieldSpec {
            name: "ssmiData",
            normalize: NormalizeSpec {
                // The file stores (1, 1, 180, 360); plot the only plane.
                plane: vec![0, 0],
                sentinel: SentinelPolicy::ReferenceCell(0, 0),
                ..NormalizeSpec::from_attributes()
            },
            overrides: AttrOverrides {
                // The dataset carries no attributes at all.
                units: Some("mm/hr"),
                ..Default::default()
            },
        }],
        coords: CoordSource::Linear {
            lat: GridAxis::new(89.5, -1.0, 180),
            lon: GridAxis::new(0.5, 1.0, 360),
        },
        projection: ProjectionChoice::CylindricalGlobal0To360,
        style: PlotStyle::Mesh,
        label_format: LabelFormat::Plain(1),
        title_qualifier: None,
        output: OutputNaming::Basename,
    };

    gallery::run(&product);
}
