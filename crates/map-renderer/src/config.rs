//! Renderer configuration.

use std::path::PathBuf;

/// Figure geometry and optional resources.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Figure width in inches
    pub width_in: f32,
    /// Figure height in inches
    pub height_in: f32,
    pub dpi: u32,
    /// TrueType font for labels; the embedded DejaVu Sans Mono when unset
    pub font_path: Option<PathBuf>,
    /// GeoJSON coastline file; the embedded 110m coastlines when unset
    pub coastline_path: Option<PathBuf>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width_in: 8.0,
            height_in: 6.0,
            dpi: 150,
            font_path: None,
            coastline_path: None,
        }
    }
}

impl RendererConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("GOES_FONT_PATH") {
            if !path.is_empty() {
                config.font_path = Some(PathBuf::from(path));
            }
        }

        if let Ok(path) = std::env::var("GOES_COASTLINE_PATH") {
            if !path.is_empty() {
                config.coastline_path = Some(PathBuf::from(path));
            }
        }

        config
    }

    /// Figure size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let w = (self.width_in * self.dpi as f32).round().max(1.0) as u32;
        let h = (self.height_in * self.dpi as f32).round().max(1.0) as u32;
        (w, h)
    }

    /// Points to pixels at this dpi.
    pub fn pt(&self, points: f32) -> f32 {
        points * self.dpi as f32 / 72.0
    }
}
