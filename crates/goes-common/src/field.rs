//! Labelled N-dimensional fields and label-based selection.
//!
//! A [`Field`] is a row-major `f32` array with one [`CoordAxis`] per
//! dimension. Selection works on coordinate *values*, never on positions, so
//! the same bounds crop a 2 km grid and a 500 m grid to the same window
//! regardless of resolution or axis orientation.

use std::collections::BTreeMap;
use std::ops::Range;

use tracing::debug;

use crate::bbox::Bounds;
use crate::error::{FieldError, FieldResult};

/// Default name of the latitude-like axis.
pub const DEFAULT_LAT_NAME: &str = "y";
/// Default name of the longitude-like axis.
pub const DEFAULT_LON_NAME: &str = "x";

/// Ordering of the values along a coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// Non-decreasing (also used for axes of length 0 or 1)
    Ascending,
    /// Non-increasing
    Descending,
    /// Neither, or contains NaN
    NonMonotonic,
}

/// A named coordinate axis.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordAxis {
    pub name: String,
    pub values: Vec<f64>,
}

impl CoordAxis {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Axis whose labels are the positions `0..len`.
    pub fn positional(name: impl Into<String>, len: usize) -> Self {
        Self::new(name, (0..len).map(|i| i as f64).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn order(&self) -> AxisOrder {
        if self.values.len() < 2 {
            return AxisOrder::Ascending;
        }
        if self.values.windows(2).all(|w| w[0] <= w[1]) {
            AxisOrder::Ascending
        } else if self.values.windows(2).all(|w| w[0] >= w[1]) {
            AxisOrder::Descending
        } else {
            AxisOrder::NonMonotonic
        }
    }

    /// Smallest and largest label.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let first = *self.values.first()?;
        let last = *self.values.last()?;
        match self.order() {
            AxisOrder::Ascending => Some((first, last)),
            AxisOrder::Descending => Some((last, first)),
            AxisOrder::NonMonotonic => {
                let finite = self.values.iter().copied().filter(|v| v.is_finite());
                let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                });
                (lo <= hi).then_some((lo, hi))
            }
        }
    }

    /// Outer cell edges, assuming labels mark cell centres.
    ///
    /// A single-label axis gets a unit-wide cell.
    pub fn cell_edges(&self) -> Option<(f64, f64)> {
        let (lo, hi) = self.value_range()?;
        if self.values.len() < 2 {
            return Some((lo - 0.5, hi + 0.5));
        }
        let half_step = (hi - lo) / (self.values.len() - 1) as f64 / 2.0;
        Some((lo - half_step, hi + half_step))
    }

    /// Position range selected by the closed label interval `bounds`.
    ///
    /// Ascending and descending axes both select the contiguous run of labels
    /// inside the interval, keeping the axis order. Reversed bounds select
    /// nothing.
    pub fn label_slice(&self, bounds: Bounds) -> FieldResult<Range<usize>> {
        let values = &self.values;
        let (start, end) = match self.order() {
            AxisOrder::Ascending => (
                values.partition_point(|v| *v < bounds.min),
                values.partition_point(|v| *v <= bounds.max),
            ),
            AxisOrder::Descending => {
                debug!(axis = %self.name, "Selecting labels on a descending axis");
                (
                    values.partition_point(|v| *v > bounds.max),
                    values.partition_point(|v| *v >= bounds.min),
                )
            }
            AxisOrder::NonMonotonic => {
                return Err(FieldError::NonMonotonicAxis(self.name.clone()));
            }
        };
        Ok(start..end.max(start))
    }
}

/// A named multi-dimensional array with labelled axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: Option<String>,
    pub long_name: Option<String>,
    pub units: Option<String>,
    pub attributes: BTreeMap<String, String>,
    axes: Vec<CoordAxis>,
    data: Vec<f32>,
}

impl Field {
    /// Create a field, checking that `data` matches the axis lengths.
    pub fn new(name: Option<String>, axes: Vec<CoordAxis>, data: Vec<f32>) -> FieldResult<Self> {
        for (i, axis) in axes.iter().enumerate() {
            if axes[..i].iter().any(|other| other.name == axis.name) {
                return Err(FieldError::DuplicateAxis(axis.name.clone()));
            }
        }
        let shape: Vec<usize> = axes.iter().map(CoordAxis::len).collect();
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(FieldError::ShapeMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            name,
            long_name: None,
            units: None,
            attributes: BTreeMap::new(),
            axes,
            data,
        })
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn axes(&self) -> &[CoordAxis] {
        &self.axes
    }

    pub fn axis(&self, name: &str) -> Option<&CoordAxis> {
        self.axes.iter().find(|a| a.name == name)
    }

    pub fn axis_index(&self, name: &str) -> Option<usize> {
        self.axes.iter().position(|a| a.name == name)
    }

    pub fn dims(&self) -> Vec<&str> {
        self.axes.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(CoordAxis::len).collect()
    }

    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at a multi-index, `None` when out of range.
    pub fn get(&self, index: &[usize]) -> Option<f32> {
        if index.len() != self.axes.len() {
            return None;
        }
        let strides = self.strides();
        let mut offset = 0;
        for ((&i, axis), stride) in index.iter().zip(&self.axes).zip(&strides) {
            if i >= axis.len() {
                return None;
            }
            offset += i * stride;
        }
        self.data.get(offset).copied()
    }

    /// Minimum and maximum of the finite values.
    pub fn finite_range(&self) -> Option<(f32, f32)> {
        let (lo, hi) = self
            .data
            .iter()
            .filter(|v| v.is_finite())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        (lo <= hi).then_some((lo, hi))
    }

    /// Drop axes of length one.
    pub fn squeeze(&self) -> Field {
        self.squeeze_to(0)
    }

    /// Drop axes of length one, keeping at least `min_axes` axes.
    ///
    /// When too few longer axes remain, the trailing unit axes are kept, so
    /// a `[1, 1, N]` field squeezed to two axes becomes `[1, N]`.
    pub fn squeeze_to(&self, min_axes: usize) -> Field {
        let longer = self.axes.iter().filter(|a| a.len() != 1).count();
        let mut unit_to_keep = min_axes.saturating_sub(longer);
        let mut keep = vec![false; self.axes.len()];
        for (i, axis) in self.axes.iter().enumerate().rev() {
            if axis.len() != 1 {
                keep[i] = true;
            } else if unit_to_keep > 0 {
                keep[i] = true;
                unit_to_keep -= 1;
            }
        }
        let axes = self
            .axes
            .iter()
            .zip(keep)
            .filter_map(|(axis, kept)| kept.then(|| axis.clone()))
            .collect();
        Field {
            axes,
            ..self.clone()
        }
    }

    /// Label-based selection along one named axis.
    pub fn select_by_label(&self, axis: &str, bounds: Bounds) -> FieldResult<Field> {
        self.select_by_labels(&[(axis, bounds)])
    }

    /// Label-based selection along several named axes at once.
    pub fn select_by_labels(&self, selections: &[(&str, Bounds)]) -> FieldResult<Field> {
        let mut ranges: Vec<Range<usize>> = self.axes.iter().map(|a| 0..a.len()).collect();
        for (name, bounds) in selections {
            let idx = self
                .axis_index(name)
                .ok_or_else(|| FieldError::MissingAxis(name.to_string(), self.axis_names()))?;
            ranges[idx] = self.axes[idx].label_slice(*bounds)?;
        }
        Ok(self.slice(&ranges))
    }

    /// Positional selection, one range per axis.
    ///
    /// Ranges must lie within the axis lengths.
    pub fn slice(&self, ranges: &[Range<usize>]) -> Field {
        debug_assert_eq!(ranges.len(), self.axes.len());

        let axes: Vec<CoordAxis> = self
            .axes
            .iter()
            .zip(ranges)
            .map(|(a, r)| CoordAxis::new(a.name.clone(), a.values[r.clone()].to_vec()))
            .collect();
        let out_shape: Vec<usize> = ranges.iter().map(|r| r.len()).collect();
        let total: usize = out_shape.iter().product();

        let mut data = Vec::with_capacity(total);
        if let Some((last_range, outer_ranges)) = ranges.split_last() {
            if total > 0 {
                let strides = self.strides();
                let outer_shape = &out_shape[..outer_ranges.len()];
                let mut idx = vec![0usize; outer_ranges.len()];
                'rows: loop {
                    let base: usize = idx
                        .iter()
                        .zip(outer_ranges)
                        .zip(&strides)
                        .map(|((i, r), s)| (r.start + i) * s)
                        .sum();
                    data.extend_from_slice(
                        &self.data[base + last_range.start..base + last_range.end],
                    );

                    let mut d = idx.len();
                    loop {
                        if d == 0 {
                            break 'rows;
                        }
                        d -= 1;
                        idx[d] += 1;
                        if idx[d] < outer_shape[d] {
                            break;
                        }
                        idx[d] = 0;
                    }
                }
            }
        } else {
            data.extend_from_slice(&self.data);
        }

        Field {
            name: self.name.clone(),
            long_name: self.long_name.clone(),
            units: self.units.clone(),
            attributes: self.attributes.clone(),
            axes,
            data,
        }
    }

    fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1usize; self.axes.len()];
        for i in (0..self.axes.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.axes[i + 1].len();
        }
        strides
    }

    fn axis_names(&self) -> Vec<String> {
        self.axes.iter().map(|a| a.name.clone()).collect()
    }
}

/// Restrict `field` to a latitude/longitude window by coordinate value.
///
/// `lat_name` and `lon_name` name the axes to cut; nothing checks that they
/// carry geographic units. A window that misses the data yields an empty
/// field.
pub fn subset_domain(
    field: &Field,
    lat_bounds: Bounds,
    lon_bounds: Bounds,
    lat_name: &str,
    lon_name: &str,
) -> FieldResult<Field> {
    let subset = field.select_by_labels(&[(lat_name, lat_bounds), (lon_name, lon_bounds)])?;
    debug!(
        field = field.name.as_deref().unwrap_or("<unnamed>"),
        lat = ?(lat_bounds.min, lat_bounds.max),
        lon = ?(lon_bounds.min, lon_bounds.max),
        shape_in = ?field.shape(),
        shape_out = ?subset.shape(),
        "Subset field to domain"
    );
    Ok(subset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(ys: Vec<f64>, xs: Vec<f64>) -> Field {
        let n = ys.len() * xs.len();
        Field::new(
            Some("CMI".to_string()),
            vec![CoordAxis::new("y", ys), CoordAxis::new("x", xs)],
            (0..n).map(|i| i as f32).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_shape_mismatch() {
        let err = Field::new(None, vec![CoordAxis::positional("x", 3)], vec![0.0; 2]);
        assert!(matches!(err, Err(FieldError::ShapeMismatch { expected: 3, actual: 2, .. })));
    }

    #[test]
    fn test_new_rejects_duplicate_axes() {
        let err = Field::new(
            None,
            vec![CoordAxis::positional("x", 1), CoordAxis::positional("x", 1)],
            vec![0.0],
        );
        assert!(matches!(err, Err(FieldError::DuplicateAxis(_))));
    }

    #[test]
    fn test_axis_order() {
        assert_eq!(CoordAxis::new("a", vec![1.0, 2.0, 3.0]).order(), AxisOrder::Ascending);
        assert_eq!(CoordAxis::new("a", vec![3.0, 2.0, 1.0]).order(), AxisOrder::Descending);
        assert_eq!(CoordAxis::new("a", vec![1.0, 3.0, 2.0]).order(), AxisOrder::NonMonotonic);
        assert_eq!(CoordAxis::new("a", vec![1.0, f64::NAN]).order(), AxisOrder::NonMonotonic);
        assert_eq!(CoordAxis::new("a", vec![]).order(), AxisOrder::Ascending);
    }

    #[test]
    fn test_label_slice_ascending_closed() {
        let axis = CoordAxis::new("x", vec![-90.0, -85.0, -80.0, -75.0, -70.0]);
        assert_eq!(axis.label_slice(Bounds::new(-85.0, -75.0)).unwrap(), 1..4);
        assert_eq!(axis.label_slice(Bounds::new(-84.0, -76.0)).unwrap(), 2..3);
    }

    #[test]
    fn test_label_slice_descending() {
        let axis = CoordAxis::new("y", vec![10.0, 5.0, 0.0, -5.0, -10.0]);
        assert_eq!(axis.label_slice(Bounds::new(-5.0, 5.0)).unwrap(), 1..4);
    }

    #[test]
    fn test_label_slice_outside_and_reversed_are_empty() {
        let axis = CoordAxis::new("x", vec![0.0, 1.0, 2.0]);
        assert!(axis.label_slice(Bounds::new(10.0, 20.0)).unwrap().is_empty());
        assert!(axis.label_slice(Bounds::new(2.0, 0.0)).unwrap().is_empty());
    }

    #[test]
    fn test_label_slice_non_monotonic_fails() {
        let axis = CoordAxis::new("x", vec![0.0, 2.0, 1.0]);
        assert!(matches!(
            axis.label_slice(Bounds::new(0.0, 1.0)),
            Err(FieldError::NonMonotonicAxis(_))
        ));
    }

    #[test]
    fn test_slice_copies_expected_values() {
        // 3x4 grid, value = row * 4 + col
        let field = grid(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0, 3.0]);
        let sub = field.slice(&[1..3, 1..3]);
        assert_eq!(sub.shape(), vec![2, 2]);
        assert_eq!(sub.data(), &[5.0, 6.0, 9.0, 10.0]);
        assert_eq!(sub.axis("x").unwrap().values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_slice_empty_range() {
        let field = grid(vec![0.0, 1.0], vec![0.0, 1.0]);
        let sub = field.slice(&[0..0, 0..2]);
        assert!(sub.is_empty());
        assert_eq!(sub.shape(), vec![0, 2]);
    }

    #[test]
    fn test_get_multi_index() {
        let field = grid(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(field.get(&[2, 3]), Some(11.0));
        assert_eq!(field.get(&[3, 0]), None);
        assert_eq!(field.get(&[0]), None);
    }

    #[test]
    fn test_squeeze_drops_unit_axes() {
        let field = Field::new(
            None,
            vec![
                CoordAxis::positional("t", 1),
                CoordAxis::positional("y", 2),
                CoordAxis::positional("x", 2),
            ],
            vec![1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();
        assert_eq!(field.squeeze().dims(), vec!["y", "x"]);
        assert_eq!(field.squeeze_to(2).dims(), vec!["y", "x"]);
    }

    #[test]
    fn test_squeeze_to_keeps_single_row() {
        let field = Field::new(
            None,
            vec![
                CoordAxis::positional("t", 1),
                CoordAxis::new("y", vec![0.0]),
                CoordAxis::new("x", vec![1.0, 2.0, 3.0]),
            ],
            vec![1.0, 2.0, 3.0],
        )
        .unwrap();
        assert_eq!(field.squeeze().dims(), vec!["x"]);
        let plane = field.squeeze_to(2);
        assert_eq!(plane.dims(), vec!["y", "x"]);
        assert_eq!(plane.shape(), vec![1, 3]);
        assert_eq!(plane.data(), field.data());
    }

    #[test]
    fn test_subset_domain_missing_axis() {
        let field = grid(vec![0.0], vec![0.0]);
        let err = subset_domain(&field, Bounds::new(0.0, 1.0), Bounds::new(0.0, 1.0), "lat", "x");
        assert!(matches!(err, Err(FieldError::MissingAxis(name, _)) if name == "lat"));
    }

    #[test]
    fn test_finite_range_ignores_nan() {
        let field = Field::new(
            None,
            vec![CoordAxis::positional("x", 4)],
            vec![f32::NAN, 2.0, -1.0, f32::NAN],
        )
        .unwrap();
        assert_eq!(field.finite_range(), Some((-1.0, 2.0)));
    }

    #[test]
    fn test_cell_edges() {
        let axis = CoordAxis::new("x", vec![0.0, 1.0, 2.0]);
        assert_eq!(axis.cell_edges(), Some((-0.5, 2.5)));
        let desc = CoordAxis::new("y", vec![2.0, 1.0, 0.0]);
        assert_eq!(desc.cell_edges(), Some((-0.5, 2.5)));
    }
}
