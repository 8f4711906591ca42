//! Scene preparation for GOES NetCDF files.
//!
//! Opens a file with the `netcdf` engine, reads one variable into a
//! [`Field`] with labelled coordinates, and cuts it to a latitude/longitude
//! window by coordinate value.
//!
//! ```ignore
//! use netcdf_scene::{prepare_scene, Bounds};
//!
//! let field = prepare_scene(
//!     "OR_ABI-L2-CMIPF-M6C13_G19_s20251231200205_e20251231209513_c20251231209581.nc",
//!     "CMI",
//!     Bounds::new(-5.0, 5.0),
//!     Bounds::new(-85.0, -75.0),
//!     "y",
//!     "x",
//! )?;
//! ```
//!
//! # Coordinates
//!
//! No reprojection happens here. ABI L2 files store `x`/`y` as scan angles
//! in radians; the window only makes geographic sense for files whose axes
//! are already in degrees.

pub mod error;
pub mod native;
pub mod prepare;
pub mod scene;

pub use error::{SceneError, SceneResult};
pub use goes_common::{subset_domain, Bounds, CoordAxis, Field, FieldError};
pub use native::silence_hdf5_errors;
pub use prepare::{prepare, prepare_scene, SceneRequest};
pub use scene::{open_scene, select_variable, DimensionInfo, Scene, VariableInfo};
