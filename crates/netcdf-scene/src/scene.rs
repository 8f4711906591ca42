//! Opened scenes and variable selection.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use goes_common::{CoordAxis, Field};
use tracing::{debug, info, instrument};

use crate::error::{SceneError, SceneResult};
use crate::native::{self, attr_to_string, read_unpacked, string_attr, PACKING_ATTRIBUTES};

/// A dimension of an opened scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionInfo {
    pub name: String,
    pub len: usize,
}

/// Summary of one variable, for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub name: String,
    pub dims: Vec<String>,
    pub shape: Vec<usize>,
    pub units: Option<String>,
    pub long_name: Option<String>,
}

/// An opened NetCDF scene. Variables are read on demand.
pub struct Scene {
    path: PathBuf,
    file: netcdf::File,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene").field("path", &self.path).finish()
    }
}

/// Open the file at `path` with the NetCDF engine.
///
/// A missing file or an unrecognised format fails with
/// [`SceneError::Open`] carrying the engine's message.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open_scene(path: impl AsRef<Path>) -> SceneResult<Scene> {
    native::silence_hdf5_errors();

    let path = path.as_ref();
    let file = netcdf::open(path).map_err(|e| SceneError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    info!(variables = file.variables().count(), "Opened scene");
    Ok(Scene {
        path: path.to_path_buf(),
        file,
    })
}

/// Read variable `name` from `scene` as a [`Field`].
///
/// Each dimension's coordinates come from the variable of the same name
/// when there is one, otherwise from positions `0..len`.
pub fn select_variable(scene: &Scene, name: &str) -> SceneResult<Field> {
    scene.field(name)
}

impl Scene {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of all variables, in file order.
    pub fn variable_names(&self) -> Vec<String> {
        self.file.variables().map(|v| v.name()).collect()
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.file.variables().any(|v| v.name() == name)
    }

    pub fn dimensions(&self) -> Vec<DimensionInfo> {
        self.file
            .dimensions()
            .map(|d| DimensionInfo {
                name: d.name(),
                len: d.len(),
            })
            .collect()
    }

    /// Shape and metadata of every variable, without reading values.
    pub fn variables(&self) -> Vec<VariableInfo> {
        self.file
            .variables()
            .map(|v| VariableInfo {
                name: v.name(),
                dims: v.dimensions().iter().map(|d| d.name()).collect(),
                shape: v.dimensions().iter().map(|d| d.len()).collect(),
                units: string_attr(&v, "units"),
                long_name: string_attr(&v, "long_name"),
            })
            .collect()
    }

    /// A global attribute rendered as text.
    pub fn global_attribute(&self, name: &str) -> Option<String> {
        self.file
            .attributes()
            .find(|a| a.name() == name)
            .and_then(|a| a.value().ok())
            .map(|v| attr_to_string(&v))
    }

    /// See [`select_variable`].
    pub fn field(&self, name: &str) -> SceneResult<Field> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| SceneError::VariableNotFound {
                name: name.to_string(),
                available: self.variable_names(),
            })?;

        let axes = var
            .dimensions()
            .iter()
            .map(|dim| self.coordinate_axis(&dim.name(), dim.len()))
            .collect::<SceneResult<Vec<_>>>()?;

        let data: Vec<f32> = read_unpacked(&var)
            .map_err(|e| SceneError::Read {
                variable: name.to_string(),
                message: e.to_string(),
            })?
            .into_iter()
            .map(|v| v as f32)
            .collect();

        let mut attributes = BTreeMap::new();
        for attr in var.attributes() {
            let key = attr.name().to_string();
            if PACKING_ATTRIBUTES.contains(&key.as_str()) || key == "units" || key == "long_name" {
                continue;
            }
            if let Ok(value) = attr.value() {
                attributes.insert(key, attr_to_string(&value));
            }
        }

        let mut field = Field::new(Some(name.to_string()), axes, data)?;
        field.units = string_attr(&var, "units");
        field.long_name = string_attr(&var, "long_name");
        field.attributes = attributes;

        debug!(variable = name, dims = ?field.dims(), shape = ?field.shape(), "Selected variable");
        Ok(field)
    }

    /// Coordinates for dimension `dim`: its 1-D coordinate variable,
    /// unpacked, or positions when there is none.
    fn coordinate_axis(&self, dim: &str, len: usize) -> SceneResult<CoordAxis> {
        let coord = self.file.variable(dim).filter(|v| {
            let dims = v.dimensions();
            dims.len() == 1 && dims[0].name() == dim && dims[0].len() == len
        });

        match coord {
            Some(var) => {
                let values = read_unpacked(&var).map_err(|e| SceneError::Read {
                    variable: dim.to_string(),
                    message: e.to_string(),
                })?;
                Ok(CoordAxis::new(dim, values))
            }
            None => {
                debug!(dimension = dim, "No coordinate variable, using positions");
                Ok(CoordAxis::positional(dim, len))
            }
        }
    }
}
