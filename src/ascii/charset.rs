//! Intensity ramps for glyph rendering.

use std::fmt;

/// Default ramp (15 levels), emptiest to densest.
pub const CLASSIC_RAMP: &[char] = &[
    ' ', '.', ',', ':', ';', 'i', '1', 't', 'f', 'L', 'C', 'G', '0', '8', '@',
];

/// Standard ASCII density ramp (10 levels).
pub const STANDARD_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Unicode shade blocks (5 levels).
pub const BLOCKS_RAMP: &[char] = &[' ', '░', '▒', '▓', '█'];

/// Minimal ramp (4 levels) for a clean look.
pub const MINIMAL_RAMP: &[char] = &[' ', '.', ':', '#'];

/// Maximum intensity on the summed-channel scale (R + G + B).
pub const MAX_INTENSITY: u32 = 255 * 3;

/// Error for a ramp that cannot quantize anything.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("intensity ramp needs at least 2 glyphs, got {0}")]
pub struct RampTooShort(pub usize);

/// Ordered glyphs from emptiest (index 0, zero intensity) to densest
/// (last index, [`MAX_INTENSITY`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntensityRamp {
    glyphs: Vec<char>,
}

impl IntensityRamp {
    pub fn new(glyphs: Vec<char>) -> Result<Self, RampTooShort> {
        if glyphs.len() < 2 {
            return Err(RampTooShort(glyphs.len()));
        }
        Ok(Self { glyphs })
    }

    /// Build a ramp from the characters of a string, e.g. `" .:#"`.
    pub fn parse(s: &str) -> Result<Self, RampTooShort> {
        Self::new(s.chars().collect())
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    /// Quantize a summed intensity (`0..=MAX_INTENSITY`) to a ramp index.
    ///
    /// `index = round(intensity / precision)` with the integer step
    /// `precision = MAX_INTENSITY / (len - 1)`, rounding half away from zero.
    /// The truncated step can overshoot the last index, so it is clamped.
    pub fn index_for(&self, intensity: u32) -> usize {
        let step = (MAX_INTENSITY / (self.glyphs.len() - 1) as u32).max(1);
        let precision = step as f64;
        let idx = (intensity.min(MAX_INTENSITY) as f64 / precision).round() as usize;
        idx.min(self.glyphs.len() - 1)
    }

    pub fn glyph_for(&self, intensity: u32) -> char {
        self.glyphs[self.index_for(intensity)]
    }
}

impl Default for IntensityRamp {
    fn default() -> Self {
        Self {
            glyphs: CLASSIC_RAMP.to_vec(),
        }
    }
}

impl fmt::Display for IntensityRamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.glyphs.iter().try_for_each(|c| write!(f, "{}", c))
    }
}

/// Built-in ramp presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharSet {
    /// 15-level ramp ` .,:;i1tfLCG08@`
    #[default]
    Classic,
    /// 10-level ASCII density ramp
    Standard,
    /// Unicode shade blocks
    Blocks,
    /// 4-level ramp
    Minimal,
}

impl CharSet {
    pub fn chars(&self) -> &'static [char] {
        match self {
            CharSet::Classic => CLASSIC_RAMP,
            CharSet::Standard => STANDARD_RAMP,
            CharSet::Blocks => BLOCKS_RAMP,
            CharSet::Minimal => MINIMAL_RAMP,
        }
    }

    pub fn ramp(&self) -> IntensityRamp {
        IntensityRamp {
            glyphs: self.chars().to_vec(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CharSet::Classic => "classic",
            CharSet::Standard => "standard",
            CharSet::Blocks => "blocks",
            CharSet::Minimal => "minimal",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "classic" => Some(CharSet::Classic),
            "standard" => Some(CharSet::Standard),
            "blocks" => Some(CharSet::Blocks),
            "minimal" => Some(CharSet::Minimal),
            _ => None,
        }
    }
}
