//! Frame types and the first two pipeline stages.
//!
//! A camera delivers a [`RawFrame`] in packed YUYV (4:2:2) layout. It is
//! decoded into a [`PixelBuffer`] (RGBA, 8 bits per channel) and then scaled
//! to the working resolution:
//!
//! 1. **Colorspace decode** - [`decode_yuyv`]
//! 2. **Resampling** - [`resample`] with a selectable [`Kernel`]

mod resample;
mod yuyv;

pub use resample::{fit_size, resample, Kernel};
pub use yuyv::{decode_yuyv, DecodeError, RawFrame};

/// Full-color working buffer shared by every pipeline stage.
///
/// Alpha is 255 everywhere except where the chroma key marked a pixel as
/// background (alpha 0).
pub type PixelBuffer = image::RgbaImage;
