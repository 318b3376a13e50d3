//! Text renderers that turn a pixel buffer into a terminal frame.
//!
//! Two strategies are available:
//!
//! - [`GlyphRenderer`] - one glyph per pixel, chosen from an [`IntensityRamp`]
//!   by brightness, colored per pixel or with a single forced color
//! - [`BlockRenderer`] - one half-block cell per vertical pixel pair, with
//!   color as the only information channel
//!
//! Both produce newline-terminated rows and reset colors at the end of every
//! row.

mod block;
mod charset;
mod glyph;
mod paint;

pub use block::{BlockRenderer, LOWER_HALF_BLOCK, UPPER_HALF_BLOCK};
pub use charset::{
    CharSet, IntensityRamp, RampTooShort, BLOCKS_RAMP, CLASSIC_RAMP, MAX_INTENSITY, MINIMAL_RAMP,
    STANDARD_RAMP,
};
pub use glyph::GlyphRenderer;
pub use paint::strip_escapes;
