//! Map figure rendering for the gallery pipeline.
//!
//! A [`Renderer`] is built from an explicit [`RenderConfig`] — there is
//! no process-global plotting state. One [`Renderer::render`] call
//! produces a [`Figure`]: coastlines and a labeled graticule under the
//! chosen projection, the normalized field overlaid as a filled mesh or
//! a point scatter, a horizontal colorbar, and a title block.
//!
//! Gridded fields are drawn by inverse-projecting every map pixel and
//! sampling the nearest grid cell, so meshes stay gapless under every
//! projection. Swath fields are forward-projected and splatted.

pub mod coastline;
pub mod colorbar;
pub mod glyphs;
pub mod gradient;
pub mod png;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use map_common::{BoundingBox, Coordinates, MapError, MapResult};
use normalize::NormalizedField;
use projection::MapProjection;
use rayon::prelude::*;
use tracing::debug;

pub use colorbar::LabelFormat;
pub use gradient::{Color, ColorStop, Colormap};

/// Canvas geometry and presentation knobs, passed at construction.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub margin_left: u32,
    pub margin_right: u32,
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub background: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 720,
            margin_left: 70,
            margin_right: 40,
            margin_top: 58,
            margin_bottom: 110,
            background: Color::WHITE,
        }
    }
}

/// How the field is drawn. Fixed per data product, never inferred.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlotStyle {
    /// Filled mesh for gridded (and gridded-swath) products.
    Mesh,
    /// Point scatter for discrete geolocated samples.
    Scatter { point_radius: i32 },
}

/// Text placed on the figure.
#[derive(Debug, Clone)]
pub struct Annotations {
    /// Title block; lines separated by '\n'.
    pub title: String,
    /// Caption under the colorbar (usually the units).
    pub colorbar_label: String,
    pub label_format: LabelFormat,
}

/// A rendered figure, alive until its PNG bytes are written.
#[derive(Debug)]
pub struct Figure {
    image: RgbaImage,
}

impl Figure {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Encode the figure as PNG bytes.
    pub fn png_bytes(&self) -> MapResult<Vec<u8>> {
        png::encode(
            self.image.as_raw(),
            self.image.width() as usize,
            self.image.height() as usize,
        )
    }
}

/// Pixel rectangle of the map area.
#[derive(Debug, Clone, Copy)]
struct MapRect {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl MapRect {
    fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x0 as f64 && px < self.x1 as f64 && py >= self.y0 as f64 && py < self.y1 as f64
    }
}

/// Affine mapping between projection plane coordinates and pixels.
#[derive(Debug, Clone, Copy)]
struct PlaneMap {
    bounds: BoundingBox,
    rect: MapRect,
}

impl PlaneMap {
    fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let fx = (x - self.bounds.min_x) / self.bounds.width();
        let fy = (self.bounds.max_y - y) / self.bounds.height();
        (
            self.rect.x0 as f64 + fx * self.rect.width() as f64,
            self.rect.y0 as f64 + fy * self.rect.height() as f64,
        )
    }

    fn to_plane(&self, px: f64, py: f64) -> (f64, f64) {
        let fx = (px - self.rect.x0 as f64) / self.rect.width() as f64;
        let fy = (py - self.rect.y0 as f64) / self.rect.height() as f64;
        (
            self.bounds.min_x + fx * self.bounds.width(),
            self.bounds.max_y - fy * self.bounds.height(),
        )
    }
}

/// Figure renderer.
#[derive(Debug, Clone)]
pub struct Renderer {
    config: RenderConfig,
    colormap: Colormap,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            colormap: Colormap::spectral(),
        }
    }

    pub fn with_colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }

    /// Render one figure. Inputs are not mutated.
    pub fn render(
        &self,
        field: &NormalizedField,
        coords: &Coordinates,
        proj: &(dyn MapProjection + Sync),
        style: PlotStyle,
        annotations: &Annotations,
    ) -> MapResult<Figure> {
        if coords.shape() != (field.rows, field.cols) {
            let (coord_rows, coord_cols) = coords.shape();
            return Err(MapError::ShapeMismatch {
                data_rows: field.rows,
                data_cols: field.cols,
                coord_rows,
                coord_cols,
            });
        }

        let range = field
            .value_range()
            .ok_or_else(|| MapError::Render("no valid cells to plot".into()))?;

        let cfg = &self.config;
        if cfg.margin_left + cfg.margin_right + 16 >= cfg.width
            || cfg.margin_top + cfg.margin_bottom + 16 >= cfg.height
        {
            return Err(MapError::Render("margins leave no map area".into()));
        }

        let rect = MapRect {
            x0: cfg.margin_left,
            y0: cfg.margin_top,
            x1: cfg.width - cfg.margin_right,
            y1: cfg.height - cfg.margin_bottom,
        };
        let plane = PlaneMap {
            bounds: proj.plane_bounds(),
            rect,
        };

        let bg = Rgba([cfg.background.r, cfg.background.g, cfg.background.b, 255]);
        let mut img = RgbaImage::from_pixel(cfg.width, cfg.height, bg);

        match (style, coords) {
            (PlotStyle::Mesh, Coordinates::Grid { lat, lon }) => {
                self.draw_mesh_grid(&mut img, &plane, field, lat, lon, proj, range);
            }
            (PlotStyle::Mesh, Coordinates::Swath { .. }) => {
                self.draw_mesh_swath(&mut img, &plane, field, coords, proj, range);
            }
            (PlotStyle::Scatter { point_radius }, _) => {
                self.draw_scatter(&mut img, &plane, field, coords, proj, range, point_radius);
            }
        }

        self.draw_coastlines(&mut img, &plane, proj);
        self.draw_graticule(&mut img, &plane, proj);

        let frame = Rect::at(rect.x0 as i32, rect.y0 as i32)
            .of_size(rect.width(), rect.height());
        draw_hollow_rect_mut(&mut img, frame, Rgba([0, 0, 0, 255]));

        let bar = Rect::at(rect.x0 as i32, rect.y1 as i32 + 28).of_size(rect.width(), 14);
        colorbar::draw_colorbar(
            &mut img,
            bar,
            &self.colormap,
            range,
            &annotations.colorbar_label,
            annotations.label_format,
        );

        self.draw_title(&mut img, &rect, &annotations.title);

        debug!(
            width = cfg.width,
            height = cfg.height,
            lo = range.0,
            hi = range.1,
            "rendered figure"
        );

        Ok(Figure { image: img })
    }

    fn color_for(&self, value: f64, range: (f64, f64)) -> Color {
        let (lo, hi) = range;
        let t = if hi > lo { (value - lo) / (hi - lo) } else { 0.5 };
        self.colormap.sample(t)
    }

    /// Per-pixel inverse sampling of a gridded field.
    fn draw_mesh_grid(
        &self,
        img: &mut RgbaImage,
        plane: &PlaneMap,
        field: &NormalizedField,
        lat_axis: &[f64],
        lon_axis: &[f64],
        proj: &(dyn MapProjection + Sync),
        range: (f64, f64),
    ) {
        let rect = plane.rect;
        let width = img.width() as usize;
        let buf: &mut [u8] = img;

        buf.par_chunks_exact_mut(width * 4)
            .enumerate()
            .for_each(|(y, row)| {
                if (y as u32) < rect.y0 || (y as u32) >= rect.y1 {
                    return;
                }
                for x in rect.x0..rect.x1 {
                    let (plx, ply) = plane.to_plane(x as f64 + 0.5, y as f64 + 0.5);
                    let Some((lon, lat)) = proj.inverse(plx, ply) else {
                        continue;
                    };
                    let Some(r) = nearest_index(lat_axis, lat) else {
                        continue;
                    };
                    let Some(c) = nearest_index(lon_axis, lon) else {
                        continue;
                    };
                    if !field.is_valid(r, c) {
                        continue;
                    }
                    let color = self.color_for(field.value(r, c), range);
                    let o = x as usize * 4;
                    row[o..o + 4].copy_from_slice(&[color.r, color.g, color.b, 255]);
                }
            });
    }

    /// Forward-project swath cells and splat footprint-sized squares.
    fn draw_mesh_swath(
        &self,
        img: &mut RgbaImage,
        plane: &PlaneMap,
        field: &NormalizedField,
        coords: &Coordinates,
        proj: &(dyn MapProjection + Sync),
        range: (f64, f64),
    ) {
        let rect = plane.rect;

        let project = |r: usize, c: usize| -> Option<(f64, f64)> {
            let (lat, lon) = coords.lat_lon(r, c);
            let (x, y) = proj.forward(lon, lat)?;
            Some(plane.to_pixel(x, y))
        };

        for r in 0..field.rows {
            for c in 0..field.cols {
                if !field.is_valid(r, c) {
                    continue;
                }
                let Some((px, py)) = project(r, c) else {
                    continue;
                };

                // Cell footprint estimated from the next sample along
                // each axis; edge cells fall back to the default.
                let mut half = 1.5f64;
                if c + 1 < field.cols {
                    if let Some((nx, ny)) = project(r, c + 1) {
                        half = half.max((nx - px).hypot(ny - py) / 2.0);
                    }
                }
                if r + 1 < field.rows {
                    if let Some((nx, ny)) = project(r + 1, c) {
                        half = half.max((nx - px).hypot(ny - py) / 2.0);
                    }
                }
                let half = half.clamp(1.0, 24.0);

                let color = self.color_for(field.value(r, c), range);
                let pixel = Rgba([color.r, color.g, color.b, 255]);
                let x_lo = ((px - half).floor().max(rect.x0 as f64)) as u32;
                let x_hi = ((px + half).ceil().min(rect.x1 as f64)) as u32;
                let y_lo = ((py - half).floor().max(rect.y0 as f64)) as u32;
                let y_hi = ((py + half).ceil().min(rect.y1 as f64)) as u32;
                for y in y_lo..y_hi {
                    for x in x_lo..x_hi {
                        img.put_pixel(x, y, pixel);
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_scatter(
        &self,
        img: &mut RgbaImage,
        plane: &PlaneMap,
        field: &NormalizedField,
        coords: &Coordinates,
        proj: &(dyn MapProjection + Sync),
        range: (f64, f64),
        point_radius: i32,
    ) {
        let rect = plane.rect;
        for r in 0..field.rows {
            for c in 0..field.cols {
                if !field.is_valid(r, c) {
                    continue;
                }
                let (lat, lon) = coords.lat_lon(r, c);
                let Some((x, y)) = proj.forward(lon, lat) else {
                    continue;
                };
                let (px, py) = plane.to_pixel(x, y);
                if !rect.contains(px, py) {
                    continue;
                }
                let color = self.color_for(field.value(r, c), range);
                draw_filled_circle_mut(
                    img,
                    (px as i32, py as i32),
                    point_radius,
                    Rgba([color.r, color.g, color.b, 255]),
                );
            }
        }
    }

    fn draw_coastlines(
        &self,
        img: &mut RgbaImage,
        plane: &PlaneMap,
        proj: &(dyn MapProjection + Sync),
    ) {
        let rect = plane.rect;
        let color = Rgba([60, 60, 60, 255]);
        // A segment jumping more than this many pixels is a wrap
        // artifact (e.g. -180/180 seam), not a coastline.
        let jump_limit = rect.width() as f64 * 0.5;

        for segment in coastline::CoastlineDb::builtin().segments() {
            let mut prev: Option<(f64, f64)> = None;
            for &[lon, lat] in &segment.points {
                let here = proj
                    .forward(lon, lat)
                    .map(|(x, y)| plane.to_pixel(x, y));

                if let (Some((x0, y0)), Some((x1, y1))) = (prev, here) {
                    let in_rect = rect.contains(x0, y0) && rect.contains(x1, y1);
                    let jump = (x1 - x0).hypot(y1 - y0);
                    if in_rect && jump < jump_limit {
                        draw_line_segment_mut(
                            img,
                            (x0 as f32, y0 as f32),
                            (x1 as f32, y1 as f32),
                            color,
                        );
                    }
                }
                prev = here;
            }
        }
    }

    fn draw_graticule(
        &self,
        img: &mut RgbaImage,
        plane: &PlaneMap,
        proj: &(dyn MapProjection + Sync),
    ) {
        let rect = plane.rect;
        let (lat_step, lon_step) = proj.graticule_intervals();
        let color = Rgba([150, 150, 150, 255]);
        let jump_limit = rect.width() as f64 * 0.5;

        // Parallels, labeled at their leftmost drawn point.
        let mut lat = -90.0 + lat_step;
        while lat < 90.0 {
            let mut prev: Option<(f64, f64)> = None;
            let mut leftmost: Option<(f64, f64)> = None;

            let mut lon = -180.0;
            while lon <= 180.0 {
                let here = proj.forward(lon, lat).map(|(x, y)| plane.to_pixel(x, y));
                if let Some((px, py)) = here {
                    if rect.contains(px, py)
                        && leftmost.map_or(true, |(lx, _)| px < lx)
                    {
                        leftmost = Some((px, py));
                    }
                }
                if let (Some((x0, y0)), Some((x1, y1))) = (prev, here) {
                    if rect.contains(x0, y0)
                        && rect.contains(x1, y1)
                        && (x1 - x0).hypot(y1 - y0) < jump_limit
                    {
                        draw_line_segment_mut(
                            img,
                            (x0 as f32, y0 as f32),
                            (x1 as f32, y1 as f32),
                            color,
                        );
                    }
                }
                prev = here;
                lon += 2.0;
            }

            if let Some((px, py)) = leftmost {
                let text = deg_label(lat, 'N', 'S');
                let tx = px as i32 - glyphs::text_width(&text, 1) as i32 - 4;
                draw_text_label(img, tx, py as i32 - 3, &text);
            }
            lat += lat_step;
        }

        // Meridians, labeled at their bottommost drawn point.
        let mut lon = -180.0;
        while lon < 180.0 {
            let mut prev: Option<(f64, f64)> = None;
            let mut bottom: Option<(f64, f64)> = None;

            let mut lat = -89.0;
            while lat <= 89.0 {
                let here = proj.forward(lon, lat).map(|(x, y)| plane.to_pixel(x, y));
                if let Some((px, py)) = here {
                    if rect.contains(px, py) && bottom.map_or(true, |(_, by)| py > by) {
                        bottom = Some((px, py));
                    }
                }
                if let (Some((x0, y0)), Some((x1, y1))) = (prev, here) {
                    if rect.contains(x0, y0)
                        && rect.contains(x1, y1)
                        && (x1 - x0).hypot(y1 - y0) < jump_limit
                    {
                        draw_line_segment_mut(
                            img,
                            (x0 as f32, y0 as f32),
                            (x1 as f32, y1 as f32),
                            color,
                        );
                    }
                }
                prev = here;
                lat += 2.0;
            }

            if let Some((px, py)) = bottom {
                let text = deg_label(lon, 'E', 'W');
                let tx = px as i32 - glyphs::text_width(&text, 1) as i32 / 2;
                draw_text_label(img, tx, py as i32 + 5, &text);
            }
            lon += lon_step;
        }
    }

    fn draw_title(&self, img: &mut RgbaImage, rect: &MapRect, title: &str) {
        let scale = 2;
        let mut y = 8i32;
        let center = rect.x0 as i32 + rect.width() as i32 / 2;
        for line in title.lines() {
            let x = center - glyphs::text_width(line, scale) as i32 / 2;
            glyphs::draw_text(img, x, y, line, scale, Color::BLACK);
            y += glyphs::text_height(scale) as i32 + 6;
        }
    }
}

fn draw_text_label(img: &mut RgbaImage, x: i32, y: i32, text: &str) {
    glyphs::draw_text(img, x, y, text, 1, Color::BLACK);
}

/// "30N", "45S", "90E", "180", "0".
fn deg_label(value: f64, positive: char, negative: char) -> String {
    let magnitude = value.abs().round();
    if magnitude == 0.0 || magnitude == 180.0 {
        format!("{:.0}", magnitude)
    } else if value > 0.0 {
        format!("{:.0}{}", magnitude, positive)
    } else {
        format!("{:.0}{}", magnitude, negative)
    }
}

/// Nearest index on a monotone coordinate axis, or `None` when the
/// value falls more than half an edge cell outside the axis.
fn nearest_index(axis: &[f64], value: f64) -> Option<usize> {
    let n = axis.len();
    if n == 0 {
        return None;
    }
    if n == 1 {
        return Some(0);
    }

    let ascending = axis[n - 1] >= axis[0];
    let key = |x: f64| if ascending { x } else { -x };

    let target = key(value);
    let mut lo = 0usize;
    let mut hi = n;
    while lo < hi {
        let mid = (lo + hi) / 2;
        if key(axis[mid]) < target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }

    let mut best = None;
    let mut best_dist = f64::INFINITY;
    for i in [lo.wrapping_sub(1), lo] {
        if i < n {
            let dist = (axis[i] - value).abs();
            if dist < best_dist {
                best_dist = dist;
                best = Some(i);
            }
        }
    }

    let edge_step = (axis[1] - axis[0]).abs().max((axis[n - 1] - axis[n - 2]).abs());
    match best {
        Some(i) if best_dist <= edge_step * 0.5 + 1e-9 => Some(i),
        _ => None,
    }
}
