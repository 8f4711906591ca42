//! Named colour ramps for pseudocolour images.
//!
//! `turbo` uses the published polynomial fit; the others interpolate
//! linearly between stops sampled from the matplotlib ramps.

use std::fmt;
use std::str::FromStr;

use crate::error::RenderError;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Parse `#rrggbb`.
pub fn hex_to_color(hex: &str) -> Option<Color> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;

    Some(Color::rgb(r, g, b))
}

const VIRIDIS: [&str; 9] = [
    "#440154", "#472d7b", "#3b528b", "#2c728e", "#21918c", "#28ae80", "#5ec962", "#addc30",
    "#fde725",
];

const INFERNO: [&str; 9] = [
    "#000004", "#1b0c41", "#4a0c6b", "#781c6d", "#a52c60", "#cf4446", "#ed6925", "#fb9b06",
    "#fcffa4",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    Turbo,
    Viridis,
    Inferno,
    Gray,
}

/// A ramp, optionally reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colormap {
    pub ramp: Ramp,
    pub reversed: bool,
}

impl Default for Colormap {
    fn default() -> Self {
        Self {
            ramp: Ramp::Turbo,
            reversed: false,
        }
    }
}

impl FromStr for Colormap {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (base, reversed) = match lower.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (lower.as_str(), false),
        };
        let ramp = match base {
            "turbo" => Ramp::Turbo,
            "viridis" => Ramp::Viridis,
            "inferno" => Ramp::Inferno,
            "gray" | "grey" | "greys" => Ramp::Gray,
            _ => return Err(RenderError::UnknownColormap(s.to_string())),
        };
        Ok(Self { ramp, reversed })
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.ramp {
            Ramp::Turbo => "turbo",
            Ramp::Viridis => "viridis",
            Ramp::Inferno => "inferno",
            Ramp::Gray => "gray",
        };
        write!(f, "{}{}", name, if self.reversed { "_r" } else { "" })
    }
}

impl Colormap {
    /// Colour at position `t` in `[0, 1]`; out-of-range values are clamped.
    pub fn sample(&self, t: f32) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let t = if self.reversed { 1.0 - t } else { t };
        match self.ramp {
            Ramp::Turbo => turbo(t),
            Ramp::Viridis => from_stops(&VIRIDIS, t),
            Ramp::Inferno => from_stops(&INFERNO, t),
            Ramp::Gray => {
                let v = (t * 255.0).round() as u8;
                Color::rgb(v, v, v)
            }
        }
    }

    /// Colour for `value` scaled between `min` and `max`.
    pub fn map(&self, value: f32, min: f32, max: f32) -> Color {
        let range = max - min;
        let range = if range.abs() < f32::EPSILON { 1.0 } else { range };
        self.sample((value - min) / range)
    }

    /// 256-entry lookup table, first entry for `t = 0`.
    pub fn lut(&self) -> Vec<Color> {
        (0..256).map(|i| self.sample(i as f32 / 255.0)).collect()
    }
}

fn turbo(t: f32) -> Color {
    let t = t as f64;
    let r = 0.13572138
        + t * (4.61539260 + t * (-42.66032258 + t * (132.13108234 + t * (-152.94239396 + t * 59.28637943))));
    let g = 0.09140261
        + t * (2.19418839 + t * (4.84296658 + t * (-14.18503333 + t * (4.27729857 + t * 2.82956604))));
    let b = 0.10667330
        + t * (12.64194608 + t * (-60.58204836 + t * (110.36276771 + t * (-89.90310912 + t * 27.34824973))));
    let to_u8 = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::rgb(to_u8(r), to_u8(g), to_u8(b))
}

fn from_stops(stops: &[&str], t: f32) -> Color {
    let scaled = t * (stops.len() - 1) as f32;
    let i = (scaled.floor() as usize).min(stops.len() - 2);
    let frac = scaled - i as f32;
    let black = Color::rgb(0, 0, 0);
    let lo = hex_to_color(stops[i]).unwrap_or(black);
    let hi = hex_to_color(stops[i + 1]).unwrap_or(black);
    interpolate_color(lo, hi, frac)
}

/// Linear color interpolation
fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;
    let mix = |a: u8, b: u8| ((a as f32 * t_inv) + (b as f32 * t)).round() as u8;

    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("turbo".parse::<Colormap>().unwrap(), Colormap::default());
        let r: Colormap = "Viridis_r".parse().unwrap();
        assert_eq!(r.ramp, Ramp::Viridis);
        assert!(r.reversed);
        assert_eq!("greys".parse::<Colormap>().unwrap().ramp, Ramp::Gray);
        assert!(matches!(
            "jet".parse::<Colormap>(),
            Err(RenderError::UnknownColormap(_))
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for name in ["turbo", "viridis_r", "inferno", "gray_r"] {
            let cmap: Colormap = name.parse().unwrap();
            assert_eq!(cmap.to_string(), name);
        }
    }

    #[test]
    fn test_reversed_turbo() {
        let fwd: Colormap = "turbo".parse().unwrap();
        let rev: Colormap = "turbo_r".parse().unwrap();
        assert_eq!(fwd.sample(0.0), rev.sample(1.0));
        assert_eq!(fwd.sample(0.25), rev.sample(0.75));
    }

    #[test]
    fn test_stop_endpoints() {
        let viridis: Colormap = "viridis".parse().unwrap();
        assert_eq!(viridis.sample(0.0), Color::rgb(0x44, 0x01, 0x54));
        assert_eq!(viridis.sample(1.0), Color::rgb(0xfd, 0xe7, 0x25));
        assert_eq!(viridis.sample(2.0), viridis.sample(1.0));
    }

    #[test]
    fn test_turbo_is_dark_blue_to_dark_red() {
        let turbo = Colormap::default();
        let lo = turbo.sample(0.0);
        let hi = turbo.sample(1.0);
        assert!(lo.b > lo.r);
        assert!(hi.r > hi.b);
    }

    #[test]
    fn test_gray_and_map() {
        let gray: Colormap = "gray".parse().unwrap();
        assert_eq!(gray.map(5.0, 0.0, 10.0), Color::rgb(128, 128, 128));
        assert_eq!(gray.map(3.0, 3.0, 3.0), Color::rgb(0, 0, 0));
        assert_eq!(gray.lut().len(), 256);
    }

    #[test]
    fn test_hex_to_color() {
        assert_eq!(hex_to_color("#ff8000"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(hex_to_color("fff"), None);
    }
}
