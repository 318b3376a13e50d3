//! Resolution changes between pipeline stages.

use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Interpolation kernel used when scaling a [`super::PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Kernel {
    Nearest,
    /// Fast; used for the per-frame resize in glyph mode
    #[default]
    Bilinear,
    Bicubic,
    /// Highest quality; used for background samples and the block-mode fit
    Lanczos3,
}

impl Kernel {
    fn filter(self) -> FilterType {
        match self {
            Kernel::Nearest => FilterType::Nearest,
            Kernel::Bilinear => FilterType::Triangle,
            Kernel::Bicubic => FilterType::CatmullRom,
            Kernel::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Scale `src` to exactly `width` x `height`.
///
/// All four channels are interpolated the same way, so transparency from the
/// chroma key survives a later resize. Equal dimensions produce a plain copy.
pub fn resample(src: &RgbaImage, width: u32, height: u32, kernel: Kernel) -> RgbaImage {
    if src.dimensions() == (width, height) {
        return src.clone();
    }
    imageops::resize(src, width, height, kernel.filter())
}

/// Largest size with the aspect ratio of `width` x `height` that fits inside
/// `max_width` x `max_height`.
pub fn fit_size(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (max_width, max_height);
    }

    let scale = f64::min(max_width as f64 / width as f64, max_height as f64 / height as f64);
    let w = ((width as f64 * scale).round() as u32).clamp(1, max_width.max(1));
    let h = ((height as f64 * scale).round() as u32).clamp(1, max_height.max(1));
    (w, h)
}
