//! Text for tick labels, the colorbar and the title.
//!
//! Labels are collected while the vector layers are drawn and rendered last.
//! TrueType text goes through `imageproc`, using the built-in DejaVu Sans Mono
//! unless another font is configured. The stroked fallback covers digits,
//! signs and hemisphere letters, and skips any other text with a warning.

use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};
use tracing::{debug, warn};

use crate::error::{RenderError, RenderResult};

// Embedded font data (DejaVu Sans Mono)
const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

/// One piece of text anchored at `(x, y)`.
#[derive(Debug, Clone)]
pub struct TextItem {
    pub text: String,
    pub x: f32,
    pub y: f32,
    /// Pixel height
    pub size: f32,
    pub halign: HAlign,
    pub valign: VAlign,
    /// Read bottom-to-top
    pub vertical: bool,
    pub color: [u8; 4],
}

impl TextItem {
    pub fn new(text: impl Into<String>, x: f32, y: f32, size: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            size,
            halign: HAlign::Left,
            valign: VAlign::Top,
            vertical: false,
            color: [0, 0, 0, 255],
        }
    }

    pub fn align(mut self, halign: HAlign, valign: VAlign) -> Self {
        self.halign = halign;
        self.valign = valign;
        self
    }

    pub fn vertical(mut self) -> Self {
        self.vertical = true;
        self
    }
}

/// Draws [`TextItem`]s with a TrueType font or the stroked fallback.
pub struct TextRenderer {
    font: Option<Font<'static>>,
}

impl TextRenderer {
    /// Load `font_path`, or the embedded font when `None`.
    pub fn load(font_path: Option<&Path>) -> RenderResult<Self> {
        let font = match font_path {
            Some(path) => read_font(path)?,
            None => Font::try_from_bytes(FONT_DATA)
                .ok_or_else(|| RenderError::Font("embedded font is not usable".to_string()))?,
        };
        Ok(Self { font: Some(font) })
    }

    /// Renderer that always uses the stroked glyphs.
    pub fn fallback() -> Self {
        Self { font: None }
    }

    /// Width and height of `text` at pixel height `size`.
    pub fn measure(&self, text: &str, size: f32) -> (f32, f32) {
        match &self.font {
            Some(font) => {
                let (w, h) = text_size(Scale::uniform(size), font, text);
                (w as f32, h.max(size as i32) as f32)
            }
            None => {
                let n = text.chars().count() as f32;
                let advance = glyph_advance(size);
                ((n * advance - size * 0.1).max(0.0), size)
            }
        }
    }

    /// Top-left corner of `item`'s (unrotated) box.
    fn origin(&self, item: &TextItem) -> (f32, f32) {
        let (w, h) = self.measure(&item.text, item.size);
        let (w, h) = if item.vertical { (h, w) } else { (w, h) };
        let x = match item.halign {
            HAlign::Left => item.x,
            HAlign::Center => item.x - w / 2.0,
            HAlign::Right => item.x - w,
        };
        let y = match item.valign {
            VAlign::Top => item.y,
            VAlign::Middle => item.y - h / 2.0,
            VAlign::Bottom => item.y - h,
        };
        (x, y)
    }

    /// Draw `items` and convert the finished pixmap into an image.
    pub fn finish(&self, mut pixmap: Pixmap, items: &[TextItem]) -> RgbaImage {
        match &self.font {
            Some(font) => {
                let mut img = pixmap_to_image(&pixmap);
                for item in items {
                    self.draw_with_font(&mut img, font, item);
                }
                img
            }
            None => {
                for item in items {
                    self.draw_stroked(&mut pixmap, item);
                }
                pixmap_to_image(&pixmap)
            }
        }
    }

    fn draw_with_font(&self, img: &mut RgbaImage, font: &Font<'static>, item: &TextItem) {
        let scale = Scale::uniform(item.size);
        let (x, y) = self.origin(item);
        let color = Rgba(item.color);

        if !item.vertical {
            draw_text_mut(img, color, x.round() as i32, y.round() as i32, scale, font, &item.text);
            return;
        }

        let (w, h) = self.measure(&item.text, item.size);
        let mut label = RgbaImage::new(w.ceil() as u32 + 2, h.ceil() as u32 + 2);
        draw_text_mut(&mut label, color, 1, 1, scale, font, &item.text);
        let rotated = image::imageops::rotate270(&label);
        image::imageops::overlay(img, &rotated, x.round() as i64, y.round() as i64);
    }

    fn draw_stroked(&self, pixmap: &mut Pixmap, item: &TextItem) {
        if let Some(ch) = item.text.chars().find(|c| glyph_segments(*c, 1.0, 1.0).is_none()) {
            warn!(text = %item.text, unsupported = %ch, "Skipping label without a font");
            return;
        }

        let (x, y) = self.origin(item);
        let (w, h) = self.measure(&item.text, item.size);
        let advance = glyph_advance(item.size);
        let char_w = item.size * 0.5;

        let mut paint = Paint::default();
        paint.set_color_rgba8(item.color[0], item.color[1], item.color[2], item.color[3]);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: (item.size * 0.1).max(1.0),
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        // Glyph centres along the baseline, then rotated for vertical text
        let (cx, cy, angle) = if item.vertical {
            (x + h / 2.0, y + w, -std::f32::consts::FRAC_PI_2)
        } else {
            (x, y + h / 2.0, 0.0)
        };
        let (cos_a, sin_a) = (angle.cos(), angle.sin());

        for (i, ch) in item.text.chars().enumerate() {
            let along = i as f32 * advance + char_w / 2.0;
            let gx = cx + along * cos_a;
            let gy = cy + along * sin_a;
            let Some(segments) = glyph_segments(ch, char_w / 2.0, item.size / 2.0) else {
                continue;
            };
            for ((x1, y1), (x2, y2)) in segments {
                let rot = |px: f32, py: f32| (px * cos_a - py * sin_a + gx, px * sin_a + py * cos_a + gy);
                let (rx1, ry1) = rot(x1, y1);
                let (rx2, ry2) = rot(x2, y2);
                let mut pb = PathBuilder::new();
                pb.move_to(rx1, ry1);
                pb.line_to(rx2, ry2);
                if let Some(path) = pb.finish() {
                    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
                }
            }
        }
        debug!(text = %item.text, "Drew stroked label");
    }
}

fn read_font(path: &Path) -> RenderResult<Font<'static>> {
    let bytes = std::fs::read(path).map_err(|e| RenderError::io(path, e))?;
    Font::try_from_vec(bytes)
        .ok_or_else(|| RenderError::Font(format!("{} is not a usable TrueType font", path.display())))
}

fn glyph_advance(size: f32) -> f32 {
    size * 0.6
}

/// Copy a pixmap into an image, undoing premultiplied alpha.
pub fn pixmap_to_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

type Segment = ((f32, f32), (f32, f32));

/// Seven-segment style strokes for a glyph centred on the origin.
fn glyph_segments(ch: char, hw: f32, hh: f32) -> Option<Vec<Segment>> {
    let top = ((-hw, -hh), (hw, -hh));
    let mid = ((-hw, 0.0), (hw, 0.0));
    let bot = ((-hw, hh), (hw, hh));
    let tl = ((-hw, -hh), (-hw, 0.0));
    let tr = ((hw, -hh), (hw, 0.0));
    let bl = ((-hw, 0.0), (-hw, hh));
    let br = ((hw, 0.0), (hw, hh));

    let segments = match ch {
        '0' => vec![top, tr, br, bot, bl, tl],
        '1' => vec![((0.0, -hh), (0.0, hh))],
        '2' => vec![top, tr, mid, bl, bot],
        '3' => vec![top, tr, mid, br, bot],
        '4' => vec![tl, mid, tr, br],
        '5' => vec![top, tl, mid, br, bot],
        '6' => vec![top, tl, bl, bot, br, mid],
        '7' => vec![top, ((hw, -hh), (0.0, hh))],
        '8' => vec![top, tr, br, bot, bl, tl, mid],
        '9' => vec![mid, tl, top, tr, br, bot],
        '-' => vec![mid],
        '+' => vec![mid, ((0.0, -hh * 0.5), (0.0, hh * 0.5))],
        '.' => vec![((0.0, hh * 0.8), (0.0, hh))],
        ' ' => vec![],
        '°' => {
            let s = hw * 0.5;
            vec![
                ((-s, -hh), (s, -hh)),
                ((s, -hh), (s, -hh + 2.0 * s)),
                ((s, -hh + 2.0 * s), (-s, -hh + 2.0 * s)),
                ((-s, -hh + 2.0 * s), (-s, -hh)),
            ]
        }
        'N' => vec![((-hw, hh), (-hw, -hh)), ((-hw, -hh), (hw, hh)), ((hw, hh), (hw, -hh))],
        'S' => vec![top, tl, mid, br, bot],
        'E' => vec![top, tl, bl, mid, bot],
        'W' => vec![
            ((-hw, -hh), (-hw * 0.5, hh)),
            ((-hw * 0.5, hh), (0.0, 0.0)),
            ((0.0, 0.0), (hw * 0.5, hh)),
            ((hw * 0.5, hh), (hw, -hh)),
        ],
        _ => return None,
    };
    Some(segments)
}
