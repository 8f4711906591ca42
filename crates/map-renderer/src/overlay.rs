//! Vector overlays: coastlines, flight tracks, grid lines and the map border.
//!
//! Natural Earth 110m coastlines are built in; a GeoJSON file can replace
//! them. Every line is clipped to the map rectangle with a mask.

use std::path::Path;

use geojson::{GeoJson, Geometry, Value};
use goes_common::FlightTrack;
use tiny_skia::{
    FillRule, LineCap, LineJoin, Mask, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform,
};
use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::frame::{MapFrame, PixelRect};

/// Natural Earth 1:110m coastlines as a single MultiLineString feature.
const COASTLINE_DATA: &str = include_str!("../assets/coastline_110m.geojson");

/// A polyline as `(lon, lat)` vertices.
pub type Polyline = Vec<(f64, f64)>;

/// Line appearance in pixels.
#[derive(Debug, Clone, Copy)]
pub struct LineStyle {
    pub width: f32,
    pub color: [u8; 4],
    /// On/off lengths for a dashed line
    pub dash: Option<(f32, f32)>,
}

/// Read every line, ring and polygon boundary from a GeoJSON file.
pub fn load_polylines(path: &Path) -> RenderResult<Vec<Polyline>> {
    let text = std::fs::read_to_string(path).map_err(|e| RenderError::io(path, e))?;
    let lines = parse_polylines(&text, path)?;
    debug!(path = %path.display(), lines = lines.len(), "Loaded polylines");
    Ok(lines)
}

/// The built-in 110m coastlines.
pub fn embedded_coastlines() -> RenderResult<Vec<Polyline>> {
    let lines = parse_polylines(COASTLINE_DATA, Path::new("<embedded coastline_110m.geojson>"))?;
    debug!(lines = lines.len(), "Loaded embedded coastlines");
    Ok(lines)
}

fn parse_polylines(text: &str, source: &Path) -> RenderResult<Vec<Polyline>> {
    let geojson: GeoJson = text.parse().map_err(|e: geojson::Error| RenderError::Coastline {
        path: source.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut lines = Vec::new();
    match geojson {
        GeoJson::Geometry(g) => collect_geometry(&g, &mut lines),
        GeoJson::Feature(f) => {
            if let Some(g) = &f.geometry {
                collect_geometry(g, &mut lines);
            }
        }
        GeoJson::FeatureCollection(fc) => {
            for f in &fc.features {
                if let Some(g) = &f.geometry {
                    collect_geometry(g, &mut lines);
                }
            }
        }
    }
    Ok(lines)
}

/// Read a flight track from the first line in a GeoJSON file.
pub fn load_track(path: &Path) -> RenderResult<FlightTrack> {
    let lines = load_polylines(path)?;
    let first = lines.into_iter().next().ok_or_else(|| RenderError::Coastline {
        path: path.to_path_buf(),
        message: "no LineString geometry found".to_string(),
    })?;
    Ok(FlightTrack::from_points(first))
}

fn to_polyline(positions: &[Vec<f64>]) -> Polyline {
    positions
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| (p[0], p[1]))
        .collect()
}

fn collect_geometry(geometry: &Geometry, out: &mut Vec<Polyline>) {
    match &geometry.value {
        Value::LineString(line) => out.push(to_polyline(line)),
        Value::MultiLineString(lines) => out.extend(lines.iter().map(|l| to_polyline(l))),
        Value::Polygon(rings) => out.extend(rings.iter().map(|r| to_polyline(r))),
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                out.extend(rings.iter().map(|r| to_polyline(r)));
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_geometry(g, out);
            }
        }
        _ => {}
    }
}

/// A mask that only lets the map rectangle through.
pub fn clip_mask(width: u32, height: u32, rect: &PixelRect) -> Option<Mask> {
    let mut mask = Mask::new(width, height)?;
    let path = PathBuilder::from_rect(rect.to_skia()?);
    mask.fill_path(&path, FillRule::Winding, false, Transform::identity());
    Some(mask)
}

fn paint_for(color: [u8; 4]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
    paint.anti_alias = true;
    paint
}

fn stroke_for(style: &LineStyle) -> Stroke {
    let mut stroke = Stroke {
        width: style.width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    if let Some((on, off)) = style.dash {
        stroke.line_cap = LineCap::Butt;
        stroke.dash = StrokeDash::new(vec![on, off], 0.0);
    }
    stroke
}

/// Stroke pixel-space polylines with `style`, optionally through `mask`.
pub fn stroke_pixel_lines(
    pixmap: &mut Pixmap,
    lines: &[Vec<(f32, f32)>],
    style: &LineStyle,
    mask: Option<&Mask>,
) {
    let paint = paint_for(style.color);
    let stroke = stroke_for(style);

    for line in lines {
        if line.len() < 2 {
            continue;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(line[0].0, line[0].1);
        for &(x, y) in &line[1..] {
            pb.line_to(x, y);
        }
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), mask);
        }
    }
}

/// Project geographic polylines and stroke them clipped to the map.
///
/// Lines are split where they jump more than half the globe in longitude,
/// so antimeridian crossings do not draw across the map.
pub fn draw_geo_lines(
    pixmap: &mut Pixmap,
    frame: &MapFrame,
    lines: &[Polyline],
    style: &LineStyle,
    mask: Option<&Mask>,
) {
    let projected = project_lines(frame, lines);
    stroke_pixel_lines(pixmap, &projected, style, mask);
}

/// Project polylines to pixels, breaking them at gaps and antimeridian jumps.
///
/// Pieces shorter than two points are dropped.
fn project_lines(frame: &MapFrame, lines: &[Polyline]) -> Vec<Vec<(f32, f32)>> {
    let mut projected = Vec::with_capacity(lines.len());
    for line in lines {
        let mut current: Vec<(f32, f32)> = Vec::with_capacity(line.len());
        let mut prev_lon: Option<f64> = None;
        for &(lon, lat) in line {
            if !(lon.is_finite() && lat.is_finite()) {
                if current.len() >= 2 {
                    projected.push(std::mem::take(&mut current));
                }
                current.clear();
                prev_lon = None;
                continue;
            }
            if let Some(prev) = prev_lon {
                if (lon - prev).abs() > 180.0 {
                    if current.len() >= 2 {
                        projected.push(std::mem::take(&mut current));
                    }
                    current.clear();
                }
            }
            current.push(frame.project(lon, lat));
            prev_lon = Some(lon);
        }
        if current.len() >= 2 {
            projected.push(current);
        }
    }
    projected
}

/// Draw a flight track as one solid line clipped to the map.
pub fn draw_track(
    pixmap: &mut Pixmap,
    frame: &MapFrame,
    track: &FlightTrack,
    style: &LineStyle,
    mask: Option<&Mask>,
) {
    let line: Polyline = track.points().collect();
    draw_geo_lines(pixmap, frame, &[line], style, mask);
}

/// Dashed meridians at `lon_ticks` and parallels at `lat_ticks`.
pub fn draw_graticule(
    pixmap: &mut Pixmap,
    frame: &MapFrame,
    lon_ticks: &[f64],
    lat_ticks: &[f64],
    style: &LineStyle,
) {
    let e = &frame.extent;
    let mut lines = Vec::with_capacity(lon_ticks.len() + lat_ticks.len());
    for &lon in lon_ticks {
        lines.push(vec![frame.project(lon, e.lat_min), frame.project(lon, e.lat_max)]);
    }
    for &lat in lat_ticks {
        lines.push(vec![frame.project(e.lon_min, lat), frame.project(e.lon_max, lat)]);
    }
    stroke_pixel_lines(pixmap, &lines, style, None);
}

/// Fill a rectangle.
pub fn fill_rect(pixmap: &mut Pixmap, rect: &PixelRect, color: [u8; 4]) {
    if let Some(r) = rect.to_skia() {
        pixmap.fill_rect(r, &paint_for(color), Transform::identity(), None);
    }
}

/// Outline a rectangle.
pub fn draw_border(pixmap: &mut Pixmap, rect: &PixelRect, style: &LineStyle) {
    if let Some(r) = rect.to_skia() {
        let path = PathBuilder::from_rect(r);
        pixmap.stroke_path(&path, &paint_for(style.color), &stroke_for(style), Transform::identity(), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goes_common::MapExtent;
    use std::io::Write;

    const COAST: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {},
             "geometry": {"type": "LineString", "coordinates": [[-81.0, -4.0], [-80.0, -2.0], [-80.5, 0.5]]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "Polygon", "coordinates": [[[-91.0, -1.0], [-90.0, -1.0], [-90.0, 0.0], [-91.0, -1.0]]]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "Point", "coordinates": [-78.5, -0.2]}}
        ]
    }"#;

    #[test]
    fn test_load_polylines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(COAST.as_bytes()).unwrap();
        let lines = load_polylines(file.path()).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0][1], (-80.0, -2.0));
    }

    #[test]
    fn test_load_track_uses_first_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(COAST.as_bytes()).unwrap();
        let track = load_track(file.path()).unwrap();
        assert_eq!(track.len(), 3);
        assert_eq!(track.lons()[0], -81.0);
    }

    #[test]
    fn test_load_polylines_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();
        assert!(matches!(
            load_polylines(file.path()),
            Err(RenderError::Coastline { .. })
        ));
    }

    #[test]
    fn test_embedded_coastlines_cover_ecuador() {
        let lines = embedded_coastlines().unwrap();
        assert!(lines.len() > 100);
        let near_ecuador = lines
            .iter()
            .flatten()
            .any(|&(lon, lat)| (-85.0..=-75.0).contains(&lon) && (-5.0..=5.0).contains(&lat));
        assert!(near_ecuador);
    }

    #[test]
    fn test_antimeridian_jump_never_bridges_the_map() {
        let extent = MapExtent::new(-180.0, 180.0, -90.0, 90.0).unwrap();
        let rect = PixelRect {
            x: 0.0,
            y: 0.0,
            width: 360.0,
            height: 180.0,
        };
        let frame = MapFrame::new(extent, rect);

        let pieces = project_lines(&frame, &[vec![(170.0, 0.0), (-170.0, 0.0), (-160.0, 1.0)]]);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].len(), 2);
        for pair in pieces[0].windows(2) {
            assert!((pair[0].0 - pair[1].0).abs() < 180.0);
        }

        let pieces = project_lines(&frame, &[vec![(10.0, 0.0), (20.0, 0.0), (-170.0, 0.0), (-160.0, 0.0)]]);
        assert_eq!(pieces.len(), 2);
    }

    #[test]
    fn test_track_is_clipped_to_map() {
        let extent = MapExtent::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let rect = PixelRect {
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 20.0,
        };
        let frame = MapFrame::new(extent, rect);
        let mut pixmap = Pixmap::new(40, 40).unwrap();
        let mask = clip_mask(40, 40, &rect).unwrap();
        let track = FlightTrack::new(vec![-10.0, 20.0], vec![5.0, 5.0]).unwrap();
        let style = LineStyle {
            width: 2.0,
            color: [255, 0, 0, 255],
            dash: None,
        };

        draw_track(&mut pixmap, &frame, &track, &style, Some(&mask));

        let alpha = |x: usize, y: usize| pixmap.data()[(y * 40 + x) * 4 + 3];
        assert!(alpha(20, 20) > 0);
        assert_eq!(alpha(2, 20), 0);
        assert_eq!(alpha(37, 20), 0);
    }
}
