//! Test data generators for synthetic satellite-like fields.
//!
//! These generators create predictable, verifiable patterns that can be
//! used across the test suite.

/// Evenly spaced labels from `min` to `max` inclusive.
///
/// With `descending` the same labels are returned from `max` down to `min`,
/// the way ABI stores its `y` axis.
pub fn axis_values(min: f64, max: f64, count: usize, descending: bool) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![min];
    }
    let step = (max - min) / (count - 1) as f64;
    let mut values: Vec<f64> = (0..count).map(|i| min + step * i as f64).collect();
    if descending {
        values.reverse();
    }
    values
}

/// Creates a test grid with predictable values.
///
/// Each cell value is `row * 1000 + col`, so a value read back after slicing
/// tells exactly which source cell it came from.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1.0);     // row 0, col 1
/// assert_eq!(grid[10], 1000.0); // row 1, col 0
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((row * 1000 + col) as f32);
        }
    }
    data
}

/// Creates a brightness-temperature-like grid in Kelvin.
///
/// Values range from about 200 K (cold cloud tops) at the centre to about
/// 300 K (warm surface) at the corners, similar to a convective cell in an
/// IR window channel.
pub fn create_brightness_temperature_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt().max(1.0);

    for row in 0..height {
        for col in 0..width {
            let dx = col as f32 - cx;
            let dy = row as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt() / max_dist;
            data.push(200.0 + 100.0 * dist);
        }
    }
    data
}

/// Creates a grid where every cell is `NaN` except the listed positions.
pub fn create_sparse_grid(width: usize, height: usize, cells: &[(usize, usize, f32)]) -> Vec<f32> {
    let mut data = vec![f32::NAN; width * height];
    for &(row, col, value) in cells {
        if row < height && col < width {
            data[row * width + col] = value;
        }
    }
    data
}

/// A straight flight track from `start` to `end` as `(lons, lats)`.
pub fn create_flight_track(start: (f64, f64), end: (f64, f64), points: usize) -> (Vec<f64>, Vec<f64>) {
    let lons = axis_values(start.0, end.0, points, false);
    let lats = axis_values(start.1, end.1, points, false);
    (lons, lats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_values() {
        assert_eq!(axis_values(0.0, 2.0, 3, false), vec![0.0, 1.0, 2.0]);
        assert_eq!(axis_values(0.0, 2.0, 3, true), vec![2.0, 1.0, 0.0]);
        assert!(axis_values(0.0, 1.0, 0, false).is_empty());
    }

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(4, 3);
        assert_eq!(grid.len(), 12);
        assert_eq!(grid[4 * 2 + 3], 2003.0);
    }

    #[test]
    fn test_brightness_temperature_range() {
        let grid = create_brightness_temperature_grid(21, 21);
        let min = grid.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = grid.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!((min - 200.0).abs() < 0.01);
        assert!((max - 300.0).abs() < 0.01);
    }

    #[test]
    fn test_sparse_grid() {
        let grid = create_sparse_grid(3, 3, &[(1, 1, 5.0)]);
        assert_eq!(grid.iter().filter(|v| v.is_nan()).count(), 8);
        assert_eq!(grid[4], 5.0);
    }
}
