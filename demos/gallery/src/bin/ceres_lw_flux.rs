//! CERES longwave clear-sky flux at synoptic hour 2, Hammer projection.
//!
//! The file stores no geolocation; global cell-centered axes are
//! computed from the data shape, latitude running north to south.

use normalize::NormalizeSpec;
use pipeline::{
    AttrOverrides, BackendChoice, CoordSource, FieldSpec, OutputNaming, Product, ProjectionChoice,
};
use renderer::{LabelFormat, PlotStyle};

fn main() {
    gallery::init();

    let product = Product {
        name: "ceres-lw-flux",
        default_filename: "CER_SYN_Aqua-FM3-MODIS_Edition2B_007005.20051031.hdf",
        backend: BackendChoice::NetCdf,
        fields: vec![FieldSpec {
            name: "LW TOA Clear-Sky",
            normalize: NormalizeSpec {
                // (hours, lat, lon): plot synoptic hour 2.
                plane: vec![2],
                ..NormalizeSpec::from_attributes()
            },
            overrides: AttrOverrides::default(),
        }],
        coords: CoordSource::ComputedGlobal,
        projection: ProjectionChoice::Hammer { lon_0: 0.0 },
        style: PlotStyle::Mesh,
        label_format: LabelFormat::Plain(0),
        title_qualifier: Some("at Synoptic_Hours=2"),
        output: OutputNaming::Basename,
    };

    gallery::run(&product);
}
