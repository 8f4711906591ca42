//! Figure composition: the pseudocolour map, overlays, colorbar and title.

use std::path::{Path, PathBuf};

use goes_common::{Field, FlightTrack, MapExtent};
use image::{DynamicImage, ImageFormat, RgbaImage};
use tiny_skia::Pixmap;
use tracing::{debug, info, instrument, warn};

use crate::colormap::{Color, Colormap};
use crate::config::RendererConfig;
use crate::display;
use crate::error::{RenderError, RenderResult};
use crate::frame::{format_lat, format_lon, format_value, nice_step, ticks, Layout, MapFrame, PixelRect};
use crate::overlay::{self, LineStyle, Polyline};
use crate::png::create_png_auto;
use crate::raster::{draw_field, Grid2D};
use crate::text::{HAlign, TextItem, TextRenderer, VAlign};

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
const INK: [u8; 4] = [0, 0, 0, 255];
const GRID_COLOR: [u8; 4] = [128, 128, 128, 255];
const TRACK_COLOR: [u8; 4] = [220, 20, 60, 255];

/// Label used on the colorbar when the field has no name.
pub const DEFAULT_COLORBAR_LABEL: &str = "Value";

/// Per-call rendering choices.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Visible area; the data extent when `None`
    pub extent: Option<MapExtent>,
    pub colormap: Colormap,
    pub title: Option<String>,
    pub flight_track: Option<FlightTrack>,
    /// Where to write the figure; nothing is written when `None`
    pub save_path: Option<PathBuf>,
    /// Open the figure in the platform viewer
    pub show: bool,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extent(mut self, extent: MapExtent) -> Self {
        self.extent = Some(extent);
        self
    }

    pub fn colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn flight_track(mut self, track: FlightTrack) -> Self {
        self.flight_track = Some(track);
        self
    }

    pub fn save_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = Some(path.into());
        self
    }

    pub fn show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }
}

/// Renders fields to map figures with a fixed configuration.
pub struct Renderer {
    config: RendererConfig,
    text: TextRenderer,
    coastlines: Vec<Polyline>,
}

impl Renderer {
    /// Load the configured font and coastlines.
    pub fn new(config: RendererConfig) -> RenderResult<Self> {
        let text = TextRenderer::load(config.font_path.as_deref())?;
        let coastlines = match &config.coastline_path {
            Some(path) => overlay::load_polylines(path)?,
            None => overlay::embedded_coastlines()?,
        };
        Ok(Self {
            config,
            text,
            coastlines,
        })
    }

    /// Use `text` for labels instead of the configured font.
    pub fn with_text_renderer(mut self, text: TextRenderer) -> Self {
        self.text = text;
        self
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Draw `field` on a plate-carree map.
    ///
    /// Unit axes are dropped down to two, then the first axis is plotted as
    /// latitude and the second as longitude. Returns the saved path when
    /// `save_path` is set.
    #[instrument(skip_all, fields(field = field.name.as_deref().unwrap_or("<unnamed>")))]
    pub fn render(&self, field: &Field, options: &RenderOptions) -> RenderResult<Option<PathBuf>> {
        let image = self.draw(field, options)?;

        let saved = match &options.save_path {
            Some(path) => {
                self.save(&image, path)?;
                println!("Figure saved to: {}", path.display());
                info!(path = %path.display(), "Figure saved");
                Some(path.clone())
            }
            None => None,
        };

        if options.show {
            let png = self.encode_png(&image)?;
            let path = display::write_temp_png(&png)?;
            display::open_in_viewer(&path)?;
        }

        Ok(saved)
    }

    /// Compose the figure in memory.
    pub fn draw(&self, field: &Field, options: &RenderOptions) -> RenderResult<RgbaImage> {
        let squeezed = field.squeeze_to(2);
        let grid = Grid2D::from_field(&squeezed)?;

        let extent = match options.extent {
            Some(extent) => extent,
            None => data_extent(&grid)?,
        };

        let (width, height) = self.config.pixel_size();
        let layout = Layout::new(width, height, self.config.dpi, &extent);
        let frame = MapFrame::new(extent, layout.map);
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| RenderError::Encode(format!("cannot allocate {}x{} figure", width, height)))?;
        overlay::fill_rect(
            &mut pixmap,
            &PixelRect {
                x: 0.0,
                y: 0.0,
                width: width as f32,
                height: height as f32,
            },
            BACKGROUND,
        );

        let range = match squeezed.finite_range() {
            Some(range) => range,
            None => {
                warn!("Field has no finite values, drawing an empty map");
                (0.0, 1.0)
            }
        };
        debug!(?extent, ?range, "Drawing field");
        draw_field(&mut pixmap, &frame, &grid, &options.colormap, range);

        let mask = overlay::clip_mask(width, height, &layout.map);
        let mut labels = Vec::new();

        if !self.coastlines.is_empty() {
            let style = LineStyle {
                width: self.config.pt(0.7),
                color: INK,
                dash: None,
            };
            overlay::draw_geo_lines(&mut pixmap, &frame, &self.coastlines, &style, mask.as_ref());
        }

        self.draw_gridlines(&mut pixmap, &frame, &mut labels);

        if let Some(track) = &options.flight_track {
            let style = LineStyle {
                width: self.config.pt(1.5),
                color: TRACK_COLOR,
                dash: None,
            };
            overlay::draw_track(&mut pixmap, &frame, track, &style, mask.as_ref());
        }

        let border = LineStyle {
            width: self.config.pt(0.8),
            color: INK,
            dash: None,
        };
        overlay::draw_border(&mut pixmap, &layout.map, &border);

        let label = squeezed
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_COLORBAR_LABEL.to_string());
        self.draw_colorbar(&mut pixmap, &layout.colorbar, &options.colormap, range, &label, &mut labels);

        if let Some(title) = &options.title {
            labels.push(
                TextItem::new(
                    title.clone(),
                    layout.map.x + layout.map.width / 2.0,
                    layout.map.y - self.config.pt(8.0),
                    self.config.pt(12.0),
                )
                .align(HAlign::Center, VAlign::Bottom),
            );
        }

        Ok(self.text.finish(pixmap, &labels))
    }

    fn draw_gridlines(&self, pixmap: &mut Pixmap, frame: &MapFrame, labels: &mut Vec<TextItem>) {
        let e = &frame.extent;
        let lon_step = nice_step(e.width(), 5);
        let lat_step = nice_step(e.height(), 5);
        let lon_ticks = ticks(e.lon_min, e.lon_max, lon_step);
        let lat_ticks = ticks(e.lat_min, e.lat_max, lat_step);

        let style = LineStyle {
            width: self.config.pt(0.3),
            color: GRID_COLOR,
            dash: Some((self.config.pt(2.0), self.config.pt(2.0))),
        };
        overlay::draw_graticule(pixmap, frame, &lon_ticks, &lat_ticks, &style);

        let size = self.config.pt(8.0);
        let pad = self.config.pt(3.0);
        for &lon in &lon_ticks {
            let (x, _) = frame.project(lon, e.lat_min);
            labels.push(
                TextItem::new(format_lon(lon, lon_step), x, frame.rect.bottom() + pad, size)
                    .align(HAlign::Center, VAlign::Top),
            );
        }
        for &lat in &lat_ticks {
            let (_, y) = frame.project(e.lon_min, lat);
            labels.push(
                TextItem::new(format_lat(lat, lat_step), frame.rect.x - pad, y, size)
                    .align(HAlign::Right, VAlign::Middle),
            );
        }
    }

    fn draw_colorbar(
        &self,
        pixmap: &mut Pixmap,
        bar: &PixelRect,
        colormap: &Colormap,
        (vmin, vmax): (f32, f32),
        label: &str,
        labels: &mut Vec<TextItem>,
    ) {
        let rows = bar.height.round().max(1.0) as usize;
        for i in 0..rows {
            let t = 1.0 - (i as f32 + 0.5) / rows as f32;
            let Color { r, g, b, a } = colormap.sample(t);
            let row = PixelRect {
                x: bar.x,
                y: bar.y + i as f32 * bar.height / rows as f32,
                width: bar.width,
                height: bar.height / rows as f32 + 0.5,
            };
            overlay::fill_rect(pixmap, &row, [r, g, b, a]);
        }
        let border = LineStyle {
            width: self.config.pt(0.5),
            color: INK,
            dash: None,
        };
        overlay::draw_border(pixmap, bar, &border);

        let size = self.config.pt(8.0);
        let tick_len = self.config.pt(3.0);
        let span = vmax as f64 - vmin as f64;
        let step = nice_step(span, 5);
        let mut widest: f32 = 0.0;
        for value in ticks(vmin as f64, vmax as f64, step) {
            let frac = if span > 0.0 { (value - vmin as f64) / span } else { 0.5 };
            let y = bar.bottom() - frac as f32 * bar.height;
            overlay::stroke_pixel_lines(
                pixmap,
                &[vec![(bar.right(), y), (bar.right() + tick_len, y)]],
                &border,
                None,
            );
            let text = format_value(value, step);
            widest = widest.max(self.text.measure(&text, size).0);
            labels.push(
                TextItem::new(text, bar.right() + tick_len + 2.0, y, size)
                    .align(HAlign::Left, VAlign::Middle),
            );
        }

        labels.push(
            TextItem::new(
                label,
                bar.right() + tick_len + widest + self.config.pt(6.0),
                bar.y + bar.height / 2.0,
                self.config.pt(10.0),
            )
            .align(HAlign::Left, VAlign::Middle)
            .vertical(),
        );
    }

    fn encode_png(&self, image: &RgbaImage) -> RenderResult<Vec<u8>> {
        create_png_auto(
            image.as_raw(),
            image.width() as usize,
            image.height() as usize,
            self.config.dpi,
        )
    }

    /// Write `image` to `path`, choosing the format from the extension.
    fn save(&self, image: &RgbaImage, path: &Path) -> RenderResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| RenderError::io(parent, e))?;
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            None | Some("png") => {
                let png = self.encode_png(image)?;
                std::fs::write(path, png).map_err(|e| RenderError::io(path, e))
            }
            Some(_) => {
                let format = ImageFormat::from_path(path).map_err(|e| RenderError::Encode(e.to_string()))?;
                DynamicImage::ImageRgba8(image.clone())
                    .to_rgb8()
                    .save_with_format(path, format)
                    .map_err(|e| RenderError::Encode(e.to_string()))
            }
        }
    }
}

/// The outer cell edges of the grid as a map extent.
fn data_extent(grid: &Grid2D<'_>) -> RenderResult<MapExtent> {
    let (lon_min, lon_max) = grid
        .cols
        .cell_edges()
        .ok_or_else(|| RenderError::InvalidExtent(format!("axis '{}' has no coordinates", grid.cols.name)))?;
    let (lat_min, lat_max) = grid
        .rows
        .cell_edges()
        .ok_or_else(|| RenderError::InvalidExtent(format!("axis '{}' has no coordinates", grid.rows.name)))?;
    MapExtent::new(lon_min, lon_max, lat_min, lat_max).map_err(|e| RenderError::InvalidExtent(e.to_string()))
}

/// Render with a renderer configured from the environment.
pub fn render(field: &Field, options: &RenderOptions) -> RenderResult<Option<PathBuf>> {
    Renderer::new(RendererConfig::from_env())?.render(field, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use goes_common::{subset_domain, Bounds, CoordAxis};

    fn field() -> Field {
        Field::new(
            Some("CMI".to_string()),
            vec![
                CoordAxis::new("y", vec![1.0, 0.0, -1.0]),
                CoordAxis::new("x", vec![-81.0, -80.0, -79.0]),
            ],
            (0..9).map(|v| 200.0 + v as f32).collect(),
        )
        .unwrap()
    }

    fn renderer() -> Renderer {
        Renderer::new(RendererConfig::default())
            .unwrap()
            .with_text_renderer(TextRenderer::fallback())
    }

    #[test]
    fn test_data_extent_uses_cell_edges() {
        let f = field();
        let grid = Grid2D::from_field(&f).unwrap();
        let extent = data_extent(&grid).unwrap();
        assert_eq!(extent, MapExtent::new(-81.5, -78.5, -1.5, 1.5).unwrap());
    }

    #[test]
    fn test_draw_has_figure_size_and_colored_map() {
        let image = renderer().draw(&field(), &RenderOptions::new()).unwrap();
        assert_eq!(image.dimensions(), (1200, 900));
        let colored = image
            .pixels()
            .filter(|p| p.0[0] != p.0[1] || p.0[1] != p.0[2])
            .count();
        assert!(colored > 1000);
    }

    #[test]
    fn test_draw_rejects_1d() {
        let line = Field::new(None, vec![CoordAxis::positional("x", 4)], vec![1.0; 4]).unwrap();
        assert!(matches!(
            renderer().draw(&line, &RenderOptions::new()),
            Err(RenderError::NotTwoDimensional { .. })
        ));
    }

    #[test]
    fn test_squeezes_singleton_time_axis() {
        let f = field();
        let with_time = Field::new(
            f.name.clone(),
            vec![
                CoordAxis::positional("t", 1),
                f.axes()[0].clone(),
                f.axes()[1].clone(),
            ],
            f.data().to_vec(),
        )
        .unwrap();
        assert!(renderer().draw(&with_time, &RenderOptions::new()).is_ok());
    }

    #[test]
    fn test_draws_single_row_and_single_column() {
        let f = field();
        let row = subset_domain(&f, Bounds::new(-0.5, 0.5), Bounds::new(-82.0, -78.0), "y", "x").unwrap();
        assert_eq!(row.shape(), vec![1, 3]);
        let image = renderer().draw(&row, &RenderOptions::new()).unwrap();
        assert_eq!(image.dimensions(), (1200, 900));

        let column = subset_domain(&f, Bounds::new(-2.0, 2.0), Bounds::new(-80.5, -79.5), "y", "x").unwrap();
        assert_eq!(column.shape(), vec![3, 1]);
        assert!(renderer().draw(&column, &RenderOptions::new()).is_ok());
    }

    #[test]
    fn test_draws_extreme_finite_values() {
        let f = Field::new(
            None,
            vec![CoordAxis::new("y", vec![0.0, 1.0]), CoordAxis::new("x", vec![0.0, 1.0])],
            vec![-f32::MAX, 0.0, 1.0, f32::MAX],
        )
        .unwrap();
        assert!(renderer().draw(&f, &RenderOptions::new()).is_ok());
    }

    #[test]
    fn test_all_nan_field_still_draws() {
        let f = Field::new(
            None,
            vec![CoordAxis::new("y", vec![0.0, 1.0]), CoordAxis::new("x", vec![0.0, 1.0])],
            vec![f32::NAN; 4],
        )
        .unwrap();
        assert!(renderer().draw(&f, &RenderOptions::new()).is_ok());
    }
}
