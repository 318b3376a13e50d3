//! Luminance-to-glyph rendering.

use image::{Rgba, RgbaImage};

use super::charset::IntensityRamp;
use super::paint::RowPainter;
use crate::terminal::{ColorProfile, Rgb};

/// Renders one glyph per pixel, picked from an [`IntensityRamp`] by the
/// pixel's summed channel intensity.
///
/// Glyphs are colored with the forced color (foreground pixels only) or with
/// the pixel's own color mapped through the [`ColorProfile`].
#[derive(Debug, Clone)]
pub struct GlyphRenderer {
    ramp: IntensityRamp,
    forced_color: Option<Rgb>,
    profile: ColorProfile,
}

impl GlyphRenderer {
    pub fn new(ramp: IntensityRamp, forced_color: Option<Rgb>, profile: ColorProfile) -> Self {
        Self {
            ramp,
            forced_color,
            profile,
        }
    }

    pub fn ramp(&self) -> &IntensityRamp {
        &self.ramp
    }

    /// `(R + G + B) * A / 255` on straight (non-premultiplied) channels.
    pub fn intensity(pixel: &Rgba<u8>) -> u32 {
        let [r, g, b, a] = pixel.0;
        (r as u32 + g as u32 + b as u32) * a as u32 / 255
    }

    pub fn glyph_index(&self, pixel: &Rgba<u8>) -> usize {
        self.ramp.index_for(Self::intensity(pixel))
    }

    /// Render the whole buffer: one newline-terminated line per pixel row.
    pub fn render(&self, img: &RgbaImage) -> String {
        let (width, height) = img.dimensions();
        // Glyph plus the longest truecolor escape is a generous upper bound
        let mut out = String::with_capacity((width as usize + 1) * height as usize * 4);

        for row in img.rows() {
            let mut painter = RowPainter::new(&mut out);
            for pixel in row {
                let glyph = self.ramp.glyphs()[self.glyph_index(pixel)];
                let color = match self.forced_color {
                    Some(forced) if pixel[3] > 0 => forced,
                    _ => Rgb::new(pixel[0], pixel[1], pixel[2]),
                };
                painter.cell(glyph, self.profile.nearest(color), None);
            }
            painter.finish();
        }

        out
    }
}
