//! Horizontal colorbar with tick labels.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::glyphs::{draw_text, text_height, text_width};
use crate::gradient::{Color, Colormap};

/// Tick label formatting, a per-product presentation choice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelFormat {
    /// Fixed decimals, e.g. `Plain(1)` renders 273.15 as "273.2".
    Plain(usize),
    /// Scientific notation with one fractional digit ("4.0e-4").
    Scientific,
}

impl LabelFormat {
    pub fn format(&self, value: f64) -> String {
        match self {
            LabelFormat::Plain(precision) => format!("{:.*}", precision, value),
            LabelFormat::Scientific => format!("{:.1e}", value),
        }
    }
}

/// Draw a horizontal colorbar strip with min/mid/max ticks and a
/// caption underneath. `rect` is the strip itself; labels render below.
pub(crate) fn draw_colorbar(
    img: &mut RgbaImage,
    rect: Rect,
    colormap: &Colormap,
    range: (f64, f64),
    caption: &str,
    format: LabelFormat,
) {
    let (lo, hi) = range;
    let width = rect.width();

    for dx in 0..width {
        let t = dx as f64 / (width.saturating_sub(1)).max(1) as f64;
        let color = colormap.sample(t);
        let pixel = Rgba([color.r, color.g, color.b, 255]);
        for dy in 0..rect.height() {
            let x = rect.left() as u32 + dx;
            let y = rect.top() as u32 + dy;
            if x < img.width() && y < img.height() {
                img.put_pixel(x, y, pixel);
            }
        }
    }

    let frame = Rgba([Color::BLACK.r, Color::BLACK.g, Color::BLACK.b, 255]);
    draw_hollow_rect_mut(img, rect, frame);

    // Ticks at both ends and the midpoint.
    let label_y = rect.top() + rect.height() as i32 + 4;
    for (t, value) in [(0.0, lo), (0.5, lo + (hi - lo) / 2.0), (1.0, hi)] {
        let text = format.format(value);
        let tick_x = rect.left() + (t * (width.saturating_sub(1)) as f64) as i32;
        let text_x = tick_x - text_width(&text, 1) as i32 / 2;
        draw_text(img, text_x, label_y, &text, 1, Color::BLACK);
    }

    if !caption.is_empty() {
        let caption_y = label_y + text_height(1) as i32 + 6;
        let caption_x =
            rect.left() + width as i32 / 2 - text_width(caption, 1) as i32 / 2;
        draw_text(img, caption_x, caption_y, caption, 1, Color::BLACK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_format() {
        assert_eq!(LabelFormat::Plain(1).format(273.15), "273.2");
        assert_eq!(LabelFormat::Plain(0).format(42.0), "42");
    }

    #[test]
    fn test_scientific_format() {
        let s = LabelFormat::Scientific.format(0.000395);
        assert!(s.contains('e'), "got {}", s);
        assert!(s.starts_with("4.0") || s.starts_with("3.9"), "got {}", s);
    }

    #[test]
    fn test_draw_fills_strip() {
        let mut img = RgbaImage::from_pixel(200, 80, Rgba([255, 255, 255, 255]));
        let rect = Rect::at(20, 10).of_size(160, 16);
        draw_colorbar(
            &mut img,
            rect,
            &Colormap::spectral(),
            (0.0, 100.0),
            "DU",
            LabelFormat::Plain(0),
        );

        // Strip interior must no longer be background white.
        let left = img.get_pixel(25, 18);
        let right = img.get_pixel(175, 18);
        assert_ne!(left, &Rgba([255, 255, 255, 255]));
        assert_ne!(right, &Rgba([255, 255, 255, 255]));
        assert_ne!(left, right);
    }
}
