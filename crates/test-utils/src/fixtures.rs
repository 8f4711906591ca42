//! Common test fixtures for the GOES scene toolkit.
//!
//! This module provides pre-defined regions, grid specifications and a
//! writer for small NetCDF scenes shaped like GOES L2 products.

use std::path::{Path, PathBuf};

use crate::generators::{axis_values, create_brightness_temperature_grid};

/// Common regions as `(lat_min, lat_max, lon_min, lon_max)`.
pub mod region {
    /// Mainland Ecuador study window
    pub const ECUADOR: (f64, f64, f64, f64) = (-5.0, 5.0, -85.0, -75.0);

    /// Galapagos islands
    pub const GALAPAGOS: (f64, f64, f64, f64) = (-1.6, 0.7, -92.1, -89.2);

    /// Far from any test grid
    pub const NORTH_ATLANTIC: (f64, f64, f64, f64) = (40.0, 50.0, -40.0, -30.0);
}

/// Common grid specifications for testing.
pub mod grid {
    /// 0.5 degree grid around Ecuador, latitude stored north to south like ABI `y`
    pub const ECUADOR_HALF_DEGREE: GridSpec = GridSpec {
        width: 41,
        height: 41,
        min_lon: -90.0,
        max_lon: -70.0,
        min_lat: -10.0,
        max_lat: 10.0,
        descending_lat: true,
    };

    /// Simple 10x10 ascending test grid
    pub const SIMPLE_10X10: GridSpec = GridSpec {
        width: 10,
        height: 10,
        min_lon: -10.0,
        max_lon: 8.0,
        min_lat: -10.0,
        max_lat: 8.0,
        descending_lat: false,
    };

    /// Grid specification for testing.
    #[derive(Debug, Clone, Copy)]
    pub struct GridSpec {
        pub width: usize,
        pub height: usize,
        pub min_lon: f64,
        pub max_lon: f64,
        pub min_lat: f64,
        pub max_lat: f64,
        /// Store latitudes from max to min
        pub descending_lat: bool,
    }

    impl GridSpec {
        /// Returns the total number of grid cells.
        pub fn size(&self) -> usize {
            self.width * self.height
        }

        /// Spacing between grid points in degrees.
        pub fn resolution(&self) -> (f64, f64) {
            let dx = (self.max_lon - self.min_lon) / (self.width.max(2) - 1) as f64;
            let dy = (self.max_lat - self.min_lat) / (self.height.max(2) - 1) as f64;
            (dx, dy)
        }
    }
}

/// Common variable names.
pub mod variables {
    /// Cloud and Moisture Imagery
    pub const CMI: &str = "CMI";

    /// Data quality flags
    pub const DQF: &str = "DQF";
}

/// Packing used for the CMI variable in written fixtures.
pub const CMI_SCALE_FACTOR: f32 = 0.01;
pub const CMI_ADD_OFFSET: f32 = 150.0;
pub const CMI_FILL_VALUE: i16 = -1;

/// Write a NetCDF scene with `CMI` (packed i16, with fill values) and `DQF`
/// variables over `y`/`x` coordinate variables in degrees.
///
/// The first row of CMI is entirely fill so tests can check masking.
pub fn write_scene_fixture(path: &Path, spec: &grid::GridSpec) -> Result<PathBuf, netcdf::Error> {
    let xs = axis_values(spec.min_lon, spec.max_lon, spec.width, false);
    let ys = axis_values(spec.min_lat, spec.max_lat, spec.height, spec.descending_lat);
    let kelvin = create_brightness_temperature_grid(spec.width, spec.height);

    let packed: Vec<i16> = kelvin
        .iter()
        .enumerate()
        .map(|(i, &k)| {
            if i < spec.width {
                CMI_FILL_VALUE
            } else {
                ((k - CMI_ADD_OFFSET) / CMI_SCALE_FACTOR).round() as i16
            }
        })
        .collect();
    let dqf: Vec<u8> = (0..spec.size()).map(|i| (i % 4) as u8).collect();

    let mut file = netcdf::create(path)?;
    file.add_attribute("title", "Synthetic ABI L2 Cloud and Moisture Imagery")?;
    file.add_attribute("platform_ID", "G19")?;

    file.add_dimension("y", spec.height)?;
    file.add_dimension("x", spec.width)?;

    {
        let mut y = file.add_variable::<f64>("y", &["y"])?;
        y.put_attribute("units", "degrees_north")?;
        y.put_attribute("long_name", "latitude")?;
        y.put_values(&ys, ..)?;
    }
    {
        let mut x = file.add_variable::<f64>("x", &["x"])?;
        x.put_attribute("units", "degrees_east")?;
        x.put_attribute("long_name", "longitude")?;
        x.put_values(&xs, ..)?;
    }
    {
        let mut cmi = file.add_variable::<i16>(variables::CMI, &["y", "x"])?;
        cmi.put_attribute("_FillValue", CMI_FILL_VALUE)?;
        cmi.put_attribute("scale_factor", CMI_SCALE_FACTOR)?;
        cmi.put_attribute("add_offset", CMI_ADD_OFFSET)?;
        cmi.put_attribute("units", "K")?;
        cmi.put_attribute("long_name", "ABI L2+ Cloud and Moisture Imagery brightness temperature")?;
        cmi.put_values(&packed, ..)?;
    }
    {
        let mut dqf_var = file.add_variable::<u8>(variables::DQF, &["y", "x"])?;
        dqf_var.put_attribute("units", "1")?;
        dqf_var.put_values(&dqf, ..)?;
    }

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_resolution() {
        let (dx, dy) = grid::ECUADOR_HALF_DEGREE.resolution();
        assert!((dx - 0.5).abs() < 1e-12);
        assert!((dy - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_write_scene_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.nc");
        write_scene_fixture(&path, &grid::SIMPLE_10X10).unwrap();
        assert!(path.exists());
    }
}
