//! Coordinate intervals and map extents.

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};

/// A closed coordinate interval `[min, max]`.
///
/// The pair is taken as given: `Bounds::new(5.0, -5.0)` is a valid value
/// that simply selects nothing on an ascending axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies inside the closed interval.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Whether `min > max`.
    pub fn is_reversed(&self) -> bool {
        self.min > self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

impl From<(f64, f64)> for Bounds {
    fn from((min, max): (f64, f64)) -> Self {
        Self { min, max }
    }
}

impl From<Bounds> for (f64, f64) {
    fn from(b: Bounds) -> Self {
        (b.min, b.max)
    }
}

/// Visible map area as `(lon_min, lon_max, lat_min, lat_max)` in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct MapExtent {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl MapExtent {
    /// Create an extent, rejecting empty, inverted or non-finite boxes.
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> FieldResult<Self> {
        let all_finite = [lon_min, lon_max, lat_min, lat_max]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(FieldError::InvalidExtent(format!(
                "non-finite value in ({}, {}, {}, {})",
                lon_min, lon_max, lat_min, lat_max
            )));
        }
        if lon_max <= lon_min || lat_max <= lat_min {
            return Err(FieldError::InvalidExtent(format!(
                "expected lon_min < lon_max and lat_min < lat_max, got ({}, {}, {}, {})",
                lon_min, lon_max, lat_min, lat_max
            )));
        }
        Ok(Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        })
    }

    /// Build an extent from the longitude and latitude intervals of a subset.
    pub fn from_bounds(lon: Bounds, lat: Bounds) -> FieldResult<Self> {
        Self::new(lon.min, lon.max, lat.min, lat.max)
    }

    pub fn width(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    pub fn height(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        lon >= self.lon_min && lon <= self.lon_max && lat >= self.lat_min && lat <= self.lat_max
    }

    pub fn lon_bounds(&self) -> Bounds {
        Bounds::new(self.lon_min, self.lon_max)
    }

    pub fn lat_bounds(&self) -> Bounds {
        Bounds::new(self.lat_min, self.lat_max)
    }
}

impl TryFrom<[f64; 4]> for MapExtent {
    type Error = FieldError;

    fn try_from(v: [f64; 4]) -> Result<Self, Self::Error> {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<MapExtent> for [f64; 4] {
    fn from(e: MapExtent) -> Self {
        [e.lon_min, e.lon_max, e.lat_min, e.lat_max]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_contains_is_closed() {
        let b = Bounds::new(-5.0, 5.0);
        assert!(b.contains(-5.0));
        assert!(b.contains(5.0));
        assert!(b.contains(0.0));
        assert!(!b.contains(5.0001));
    }

    #[test]
    fn test_extent_rejects_inverted() {
        assert!(MapExtent::new(-75.0, -85.0, -5.0, 5.0).is_err());
        assert!(MapExtent::new(-85.0, -75.0, 5.0, 5.0).is_err());
        assert!(MapExtent::new(-85.0, -75.0, f64::NAN, 5.0).is_err());
    }

    #[test]
    fn test_extent_serde_as_array() {
        let extent: MapExtent = serde_json::from_str("[-85.0, -75.0, -5.0, 5.0]").unwrap();
        assert_eq!(extent.width(), 10.0);
        assert_eq!(extent.height(), 10.0);

        let bad: Result<MapExtent, _> = serde_json::from_str("[-75.0, -85.0, -5.0, 5.0]");
        assert!(bad.is_err());
    }

    #[test]
    fn test_bounds_serde_as_pair() {
        let bounds: Bounds = serde_json::from_str("[-5.0, 5.0]").unwrap();
        assert_eq!(bounds, Bounds::new(-5.0, 5.0));
    }
}
