//! MODIS MOD05 near-infrared water vapor over a south polar view.
//!
//! Geolocation is stored at 1/5 of the data resolution anchored on the
//! fifth sample, so the field is subsampled `[4::5]` before masking.
//! The stored integers convert with the offset-then-scale rule.

use normalize::{NormalizeSpec, Subsample};
use pipeline::{
    AttrOverrides, BackendChoice, CoordSource, FieldSpec, OutputNaming, Product, ProjectionChoice,
};
use renderer::{LabelFormat, PlotStyle};

fn main() {
    gallery::init();

    let product = Product {
        name: "mod05-water-vapor",
        default_filename: "MOD05_L2.A2010001.0000.005.2010005211557.hdf",
        backend: BackendChoice::NetCdf,
        fields: vec![FieldSpec {
            name: "Water_Vapor_Near_Infrared",
            normalize: NormalizeSpec {
                subsample: Some(Subsample::offset_stride(4, 5)),
                ..NormalizeSpec::from_attributes()
            },
            overrides: AttrOverrides::default(),
        }],
        coords: CoordSource::Swath {
            lat: "Latitude",
            lon: "Longitude",
        },
        projection: ProjectionChoice::SouthPolar {
            bounding_lat: -60.0,
            lon_0: 180.0,
        },
        style: PlotStyle::Mesh,
        label_format: LabelFormat::Plain(1),
        title_qualifier: None,
        output: OutputNaming::BasenameField,
    };

    gallery::run(&product);
}
