//! Open, select and subset in one call.

use std::path::{Path, PathBuf};

use goes_common::{subset_domain, Bounds, Field, DEFAULT_LAT_NAME, DEFAULT_LON_NAME};
use tracing::info;

use crate::error::SceneResult;
use crate::scene::{open_scene, select_variable};

/// Everything needed to turn a file into a regional field.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRequest {
    pub path: PathBuf,
    pub variable: String,
    pub lat_bounds: Bounds,
    pub lon_bounds: Bounds,
    pub lat_name: String,
    pub lon_name: String,
}

impl SceneRequest {
    /// A request using the ABI axis names `y` and `x`.
    pub fn new(
        path: impl Into<PathBuf>,
        variable: impl Into<String>,
        lat_bounds: impl Into<Bounds>,
        lon_bounds: impl Into<Bounds>,
    ) -> Self {
        Self {
            path: path.into(),
            variable: variable.into(),
            lat_bounds: lat_bounds.into(),
            lon_bounds: lon_bounds.into(),
            lat_name: DEFAULT_LAT_NAME.to_string(),
            lon_name: DEFAULT_LON_NAME.to_string(),
        }
    }

    pub fn with_axis_names(mut self, lat_name: impl Into<String>, lon_name: impl Into<String>) -> Self {
        self.lat_name = lat_name.into();
        self.lon_name = lon_name.into();
        self
    }

    pub fn prepare(&self) -> SceneResult<Field> {
        prepare_scene(
            &self.path,
            &self.variable,
            self.lat_bounds,
            self.lon_bounds,
            &self.lat_name,
            &self.lon_name,
        )
    }
}

/// [`open_scene`], then [`select_variable`], then [`subset_domain`].
///
/// The first failing step aborts with its error.
pub fn prepare_scene(
    path: impl AsRef<Path>,
    var_name: &str,
    lat_bounds: Bounds,
    lon_bounds: Bounds,
    lat_name: &str,
    lon_name: &str,
) -> SceneResult<Field> {
    let scene = open_scene(path.as_ref())?;
    let field = select_variable(&scene, var_name)?;
    let subset = subset_domain(&field, lat_bounds, lon_bounds, lat_name, lon_name)?;

    info!(
        path = %path.as_ref().display(),
        variable = var_name,
        shape = ?subset.shape(),
        "Prepared scene"
    );
    Ok(subset)
}

/// [`SceneRequest::prepare`].
pub fn prepare(request: &SceneRequest) -> SceneResult<Field> {
    request.prepare()
}
