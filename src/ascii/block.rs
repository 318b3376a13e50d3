//! Half-block rendering: two pixel rows per terminal row.

use crossterm::style::Color;
use image::{Rgba, RgbaImage};

use super::paint::RowPainter;
use crate::terminal::{ColorProfile, Rgb};

/// Upper half block; its foreground paints the top pixel, its background the
/// bottom pixel.
pub const UPPER_HALF_BLOCK: char = '▀';

/// Lower half block, used when only the bottom pixel is visible.
pub const LOWER_HALF_BLOCK: char = '▄';

/// Renders each vertical pixel pair as one colored half-block cell.
#[derive(Debug, Clone)]
pub struct BlockRenderer {
    profile: ColorProfile,
    columns: u32,
}

impl BlockRenderer {
    /// `columns` is the output width; narrower images are centered by
    /// left-padding each row.
    pub fn new(profile: ColorProfile, columns: u32) -> Self {
        Self { profile, columns }
    }

    /// Blank cells placed before each row of an image `image_width` wide.
    pub fn left_padding(&self, image_width: u32) -> usize {
        self.columns.saturating_sub(image_width).div_ceil(2) as usize
    }

    fn color(&self, pixel: Option<&Rgba<u8>>) -> Option<Color> {
        match pixel {
            Some(p) if p[3] > 0 => self.profile.nearest(Rgb::new(p[0], p[1], p[2])),
            _ => None,
        }
    }

    /// Render `img` to `ceil(height / 2)` newline-terminated rows.
    ///
    /// A missing bottom row (odd height) and transparent pixels leave the
    /// terminal's default color showing.
    pub fn render(&self, img: &RgbaImage) -> String {
        let (width, height) = img.dimensions();
        let pad = self.left_padding(width);
        let mut out = String::with_capacity((pad + width as usize * 40 + 1) * height.div_ceil(2) as usize);

        for y in (0..height).step_by(2) {
            let mut painter = RowPainter::new(&mut out);
            painter.blank(pad);

            for x in 0..width {
                let top = img.get_pixel(x, y);
                let bottom = (y + 1 < height).then(|| img.get_pixel(x, y + 1));
                let top_visible = top[3] > 0;
                let bottom_visible = bottom.is_some_and(|p| p[3] > 0);

                match (top_visible, bottom_visible) {
                    (true, _) => painter.cell(UPPER_HALF_BLOCK, self.color(Some(top)), self.color(bottom)),
                    (false, true) => painter.cell(LOWER_HALF_BLOCK, self.color(bottom), None),
                    (false, false) => painter.cell(' ', None, None),
                }
            }
            painter.finish();
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascii::strip_escapes;

    #[test]
    fn test_pair_colors() {
        let mut img = RgbaImage::from_pixel(1, 2, Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        let out = BlockRenderer::new(ColorProfile::TrueColor, 1).render(&img);
        assert_eq!(out, "\x1b[38;2;255;0;0m\x1b[48;2;0;0;255m▀\x1b[0m\n");
    }

    #[test]
    fn test_odd_height_row_count() {
        let img = RgbaImage::from_pixel(3, 5, Rgba([9, 9, 9, 255]));
        let out = BlockRenderer::new(ColorProfile::Ansi256, 3).render(&img);
        let visible = strip_escapes(&out);
        let rows: Vec<&str> = visible.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.chars().count() == 3));
    }

    #[test]
    fn test_centering_pad() {
        let r = BlockRenderer::new(ColorProfile::NoColor, 10);
        assert_eq!(r.left_padding(10), 0);
        assert_eq!(r.left_padding(6), 2);
        assert_eq!(r.left_padding(5), 3);
        assert_eq!(r.left_padding(12), 0);

        let img = RgbaImage::from_pixel(2, 2, Rgba([1, 1, 1, 255]));
        assert_eq!(BlockRenderer::new(ColorProfile::NoColor, 6).render(&img), "  ▀▀\n");
    }

    #[test]
    fn test_transparent_halves() {
        let mut img = RgbaImage::from_pixel(3, 2, Rgba([0, 0, 0, 0]));
        img.put_pixel(1, 1, Rgba([0, 255, 0, 255]));
        img.put_pixel(2, 0, Rgba([0, 255, 0, 255]));
        let out = BlockRenderer::new(ColorProfile::TrueColor, 3).render(&img);
        assert_eq!(
            out,
            " \x1b[38;2;0;255;0m▄▀\x1b[0m\n"
        );
    }
}
