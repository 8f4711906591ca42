//! Plate-carree map frame: figure layout, projection to pixels and grid ticks.

use goes_common::MapExtent;

/// An axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn to_skia(&self) -> Option<tiny_skia::Rect> {
        tiny_skia::Rect::from_xywh(self.x, self.y, self.width, self.height)
    }
}

/// Where each part of the figure goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub figure: (u32, u32),
    pub map: PixelRect,
    pub colorbar: PixelRect,
}

impl Layout {
    /// Fit a map of `extent` into a `width` x `height` figure at `dpi`,
    /// keeping one degree of longitude as wide as one degree of latitude.
    pub fn new(width: u32, height: u32, dpi: u32, extent: &MapExtent) -> Self {
        let inch = dpi as f32;
        let (w, h) = (width as f32, height as f32);

        let left = 0.75 * inch;
        let right = 1.3 * inch;
        let top = 0.55 * inch;
        let bottom = 0.55 * inch;

        let avail_w = (w - left - right).max(1.0);
        let avail_h = (h - top - bottom).max(1.0);

        let aspect = (extent.width() / extent.height()) as f32;
        let (map_w, map_h) = if avail_w / avail_h > aspect {
            (avail_h * aspect, avail_h)
        } else {
            (avail_w, avail_w / aspect)
        };

        let map = PixelRect {
            x: left + (avail_w - map_w) / 2.0,
            y: top + (avail_h - map_h) / 2.0,
            width: map_w,
            height: map_h,
        };
        let colorbar = PixelRect {
            x: map.right() + 0.2 * inch,
            y: map.y,
            width: 0.18 * inch,
            height: map.height,
        };

        Self {
            figure: (width, height),
            map,
            colorbar,
        }
    }
}

/// Maps longitude/latitude to pixels inside the map rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapFrame {
    pub extent: MapExtent,
    pub rect: PixelRect,
}

impl MapFrame {
    pub fn new(extent: MapExtent, rect: PixelRect) -> Self {
        Self { extent, rect }
    }

    pub fn project(&self, lon: f64, lat: f64) -> (f32, f32) {
        let e = &self.extent;
        let px = self.rect.x as f64 + (lon - e.lon_min) / e.width() * self.rect.width as f64;
        let py = self.rect.y as f64 + (e.lat_max - lat) / e.height() * self.rect.height as f64;
        (px as f32, py as f32)
    }

    /// Longitude of a pixel column's centre.
    pub fn lon_at(&self, px: f32) -> f64 {
        let e = &self.extent;
        e.lon_min + ((px as f64 + 0.5) - self.rect.x as f64) / self.rect.width as f64 * e.width()
    }

    /// Latitude of a pixel row's centre.
    pub fn lat_at(&self, py: f32) -> f64 {
        let e = &self.extent;
        e.lat_max - ((py as f64 + 0.5) - self.rect.y as f64) / self.rect.height as f64 * e.height()
    }
}

/// A 1-2-2.5-5 step giving roughly `target` intervals over `range`.
pub fn nice_step(range: f64, target: usize) -> f64 {
    if !(range.is_finite() && range > 0.0) {
        return 1.0;
    }
    let raw = range / target.max(1) as f64;
    let mag = 10f64.powf(raw.log10().floor());
    let norm = raw / mag;
    let nice = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 2.5 {
        2.5
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * mag
}

/// Most ticks a single axis may carry.
const MAX_TICKS: f64 = 1000.0;

/// Multiples of `step` inside `[min, max]`.
///
/// Returns nothing for non-finite bounds or when more than `MAX_TICKS`
/// multiples would fit.
pub fn ticks(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || step.is_nan() || step <= 0.0 || max < min {
        return Vec::new();
    }
    if (max - min) / step > MAX_TICKS {
        return Vec::new();
    }
    let first = (min / step - 1e-9).ceil() as i64;
    let last = (max / step + 1e-9).floor() as i64;
    (first..=last)
        .map(|k| if k == 0 { 0.0 } else { k as f64 * step })
        .collect()
}

/// Decimal places needed to print multiples of `step`, up to 3.
fn decimals_for(step: f64) -> usize {
    (0..=3)
        .find(|&d| {
            let scaled = step * 10f64.powi(d as i32);
            (scaled - scaled.round()).abs() < 1e-6
        })
        .unwrap_or(3)
}

/// Plain tick value, e.g. `250` or `0.25`, with decimals to match `step`.
pub fn format_value(value: f64, step: f64) -> String {
    let decimals = decimals_for(step);
    let text = format!("{:.*}", decimals, value);
    // "-0" reads badly on a colorbar
    if text.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        text.trim_start_matches('-').to_string()
    } else {
        text
    }
}

fn degrees(abs: f64, decimals: usize) -> String {
    format!("{:.*}°", decimals, abs)
}

/// `80°W`, `0°`, `10°E`, `180°`.
pub fn format_lon(value: f64, step: f64) -> String {
    let decimals = decimals_for(step);
    let tol = 0.5 * 10f64.powi(-(decimals as i32));
    let wrapped = ((value + 180.0).rem_euclid(360.0)) - 180.0;
    if wrapped.abs() < tol {
        return "0°".to_string();
    }
    if (wrapped.abs() - 180.0).abs() < tol || (value.abs() - 180.0).abs() < tol {
        return "180°".to_string();
    }
    let suffix = if wrapped < 0.0 { "W" } else { "E" };
    format!("{}{}", degrees(wrapped.abs(), decimals), suffix)
}

/// `5°S`, `0°`, `5°N`.
pub fn format_lat(value: f64, step: f64) -> String {
    let decimals = decimals_for(step);
    let tol = 0.5 * 10f64.powi(-(decimals as i32));
    if value.abs() < tol {
        return "0°".to_string();
    }
    let suffix = if value < 0.0 { "S" } else { "N" };
    format!("{}{}", degrees(value.abs(), decimals), suffix)
}
