//! Shared types for the earth-science map gallery.
//!
//! Every crate in the workspace speaks in terms of these types:
//! [`DataField`] (a raw array plus its metadata attributes),
//! [`Coordinates`] (gridded axes or swath geolocation), and
//! [`MapError`] (the failure taxonomy for the whole pipeline).

pub mod bbox;
pub mod error;
pub mod field;
pub mod grid;

pub use bbox::BoundingBox;
pub use error::{MapError, MapResult};
pub use field::{Coordinates, DataField, FieldAttributes};
pub use grid::GridAxis;
