//! Map rendering for gridded GOES fields.
//!
//! Produces a single plate-carree figure per call:
//! - Pseudocolour raster of a 2-D field, scaled to its finite range
//! - Coastlines and a flight track, clipped to the map
//! - Dashed grid lines with degree labels on the left and bottom
//! - A labelled colorbar and optional title
//!
//! Figures are 8x6 inches at 150 dpi. PNG output carries the dpi in a
//! `pHYs` chunk; other extensions go through the `image` crate.

pub mod colormap;
pub mod config;
pub mod display;
pub mod error;
pub mod figure;
pub mod frame;
pub mod overlay;
pub mod png;
pub mod raster;
pub mod text;

pub use colormap::{Color, Colormap, Ramp};
pub use config::RendererConfig;
pub use error::{RenderError, RenderResult};
pub use figure::{render, RenderOptions, Renderer, DEFAULT_COLORBAR_LABEL};
pub use goes_common::{Field, FlightTrack, MapExtent};
pub use overlay::{embedded_coastlines, load_polylines, load_track, Polyline};
pub use text::TextRenderer;
