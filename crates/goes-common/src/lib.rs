//! Shared types for the GOES scene toolkit.
//!
//! The fetcher, scene preparer and renderer only meet through the types in
//! this crate: a [`Field`] with labelled coordinate axes, the bounds used to
//! crop it, the map extent used to draw it and an optional [`FlightTrack`].

pub mod bbox;
pub mod error;
pub mod field;
pub mod goes;
pub mod track;

pub use bbox::{Bounds, MapExtent};
pub use error::{FieldError, FieldResult};
pub use field::{subset_domain, AxisOrder, CoordAxis, Field, DEFAULT_LAT_NAME, DEFAULT_LON_NAME};
pub use goes::{GoesFileInfo, GoesScene};
pub use track::FlightTrack;
