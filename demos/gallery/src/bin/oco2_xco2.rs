//! OCO-2 column CO2 swath, scattered on a global cylindrical map.

use normalize::{NormalizeSpec, SentinelPolicy};
use pipeline::{
    AttrOverrides, BackendChoice, CoordSource, FieldSpec, OutputNaming, Product, ProjectionChoice,
};
use renderer::{LabelFormat, PlotStyle};

fn main() {
    gallery::init();

    let product = Product {
        name: "oco2-xco2",
        default_filename: "oco2_L2StdND_03945a_150330_B6000_150331024816.h5",
        backend: BackendChoice::Hdf5,
        fields: vec![FieldSpec {
            name: "/RetrievalResults/xco2",
            normalize: NormalizeSpec {
                // The product documents -999999 as its bad-retrieval
                // marker; the file carries no fill attribute.
                sentinel: SentinelPolicy::Literal(-999999.0),
                ..NormalizeSpec::from_attributes()
            },
            overrides: AttrOverrides::default(),
        }],
        coords: CoordSource::Swath {
            lat: "/RetrievalGeometry/retrieval_latitude",
            lon: "/RetrievalGeometry/retrieval_longitude",
        },
        projection: ProjectionChoice::CylindricalGlobal,
        style: PlotStyle::Scatter { point_radius: 2 },
        label_format: LabelFormat::Scientific,
        title_qualifier: None,
        output: OutputNaming::Basename,
    };

    gallery::run(&product);
}
