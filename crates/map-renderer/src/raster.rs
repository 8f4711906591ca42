//! Pseudocolour rendering of a 2-D field into the map rectangle.
//!
//! Each pixel takes the value of the nearest grid cell on each axis
//! (labels are treated as cell centres). Pixels outside the data or on a
//! `NaN` cell are left untouched.

use goes_common::{AxisOrder, CoordAxis, Field};
use tiny_skia::Pixmap;

use crate::colormap::Colormap;
use crate::error::{RenderError, RenderResult};
use crate::frame::MapFrame;

/// A field reduced to two axes: rows (latitude-like) and columns
/// (longitude-like).
#[derive(Debug, Clone, Copy)]
pub struct Grid2D<'a> {
    pub rows: &'a CoordAxis,
    pub cols: &'a CoordAxis,
    pub data: &'a [f32],
}

impl<'a> Grid2D<'a> {
    /// View a field with exactly two axes; the first is rows.
    pub fn from_field(field: &'a Field) -> RenderResult<Self> {
        if field.is_empty() {
            return Err(RenderError::EmptyField);
        }
        match field.axes() {
            [rows, cols] => Ok(Self {
                rows,
                cols,
                data: field.data(),
            }),
            _ => Err(RenderError::NotTwoDimensional {
                dims: field.dims().iter().map(|d| d.to_string()).collect(),
            }),
        }
    }

    pub fn value(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols.len() + col]
    }
}

/// Index of the cell whose centre is nearest to `coord`, or `None` when
/// `coord` lies outside the outer cell edges.
pub fn nearest_index(axis: &CoordAxis, coord: f64) -> Option<usize> {
    let values = &axis.values;
    let (lo, hi) = axis.cell_edges()?;
    if coord < lo || coord > hi || coord.is_nan() {
        return None;
    }
    if values.len() == 1 {
        return Some(0);
    }

    let order = axis.order();
    let pos = match order {
        AxisOrder::Ascending => values.partition_point(|v| *v < coord),
        AxisOrder::Descending => values.partition_point(|v| *v > coord),
        AxisOrder::NonMonotonic => {
            return values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_finite())
                .min_by(|a, b| (a.1 - coord).abs().total_cmp(&(b.1 - coord).abs()))
                .map(|(i, _)| i);
        }
    };

    if pos == 0 {
        return Some(0);
    }
    if pos >= values.len() {
        return Some(values.len() - 1);
    }
    let before = (values[pos - 1] - coord).abs();
    let after = (values[pos] - coord).abs();
    // Ties go to the lower coordinate on either orientation
    let take_before = match order {
        AxisOrder::Ascending => before <= after,
        _ => before < after,
    };
    Some(if take_before { pos - 1 } else { pos })
}

/// Paint `grid` into the frame's rectangle, scaling colours over `range`.
pub fn draw_field(
    pixmap: &mut Pixmap,
    frame: &MapFrame,
    grid: &Grid2D<'_>,
    colormap: &Colormap,
    range: (f32, f32),
) {
    let lut = colormap.lut();
    let (vmin, vmax) = (range.0 as f64, range.1 as f64);
    let span = if (vmax - vmin).abs() < f32::EPSILON as f64 { 1.0 } else { vmax - vmin };

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let x0 = frame.rect.x.floor().max(0.0) as usize;
    let x1 = (frame.rect.right().ceil() as usize).min(width);
    let y0 = frame.rect.y.floor().max(0.0) as usize;
    let y1 = (frame.rect.bottom().ceil() as usize).min(height);

    // Column and row lookups are separable on a plate-carree grid
    let col_idx: Vec<Option<usize>> = (x0..x1)
        .map(|px| nearest_index(grid.cols, frame.lon_at(px as f32)))
        .collect();
    let row_idx: Vec<Option<usize>> = (y0..y1)
        .map(|py| nearest_index(grid.rows, frame.lat_at(py as f32)))
        .collect();

    let pixels = pixmap.data_mut();
    for (ry, row) in row_idx.iter().enumerate() {
        let Some(row) = *row else { continue };
        let py = y0 + ry;
        let py_center = py as f32 + 0.5;
        if py_center < frame.rect.y || py_center > frame.rect.bottom() {
            continue;
        }
        for (rx, col) in col_idx.iter().enumerate() {
            let Some(col) = *col else { continue };
            let px = x0 + rx;
            let px_center = px as f32 + 0.5;
            if px_center < frame.rect.x || px_center > frame.rect.right() {
                continue;
            }
            let value = grid.value(row, col);
            if !value.is_finite() {
                continue;
            }
            let t = ((value as f64 - vmin) / span).clamp(0.0, 1.0);
            let color = lut[(t * 255.0).round() as usize];
            let offset = (py * width + px) * 4;
            pixels[offset..offset + 4].copy_from_slice(&color.to_array());
        }
    }
}
