//! Background removal by perceptual color distance.
//!
//! Every live pixel is compared against the pixel at the same position in one
//! or more reference images of the empty scene. Distances are measured in CIE
//! L*a*b* (D65 white, L scaled to `0..=1`), so a threshold around `0.1` keys
//! out colors a viewer would call "the same".

use image::{Rgba, RgbaImage};

/// Default distance below which a pixel is considered background.
pub const DEFAULT_THRESHOLD: f64 = 0.13;

/// D65 reference white in XYZ.
const D65: [f64; 3] = [0.950_47, 1.0, 1.088_83];

/// A color in CIE L*a*b*, derived on demand for distance comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    /// Convert an sRGB pixel (alpha ignored) to Lab.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let r = linearize(r);
        let g = linearize(g);
        let b = linearize(b);

        let x = 0.412_390_799_265_959_5 * r + 0.357_584_339_383_878 * g + 0.180_480_788_401_834_3 * b;
        let y = 0.212_639_005_871_510_36 * r + 0.715_168_678_767_756 * g + 0.072_192_315_360_733_71 * b;
        let z = 0.019_330_818_715_591_85 * r + 0.119_194_779_794_625_99 * g + 0.950_532_152_249_660_6 * b;

        let fx = lab_f(x / D65[0]);
        let fy = lab_f(y / D65[1]);
        let fz = lab_f(z / D65[2]);

        Lab {
            l: 1.16 * fy - 0.16,
            a: 5.0 * (fx - fy),
            b: 2.0 * (fy - fz),
        }
    }

    pub fn from_pixel(p: &Rgba<u8>) -> Self {
        Self::from_rgb(p[0], p[1], p[2])
    }

    /// Euclidean distance in Lab space.
    pub fn distance(&self, other: &Lab) -> f64 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        (dl * dl + da * da + db * db).sqrt()
    }
}

fn linearize(v: u8) -> f64 {
    let v = v as f64 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f64) -> f64 {
    const EPSILON: f64 = 216.0 / 24389.0; // (6/29)^3
    if t > EPSILON {
        t.cbrt()
    } else {
        t / 3.0 * (29.0 / 6.0) * (29.0 / 6.0) + 4.0 / 29.0
    }
}

/// Errors raised while setting up or applying the chroma key.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ChromaKeyError {
    #[error("no background samples supplied")]
    NoSamples,

    #[error("threshold must be a finite, non-negative number (got {0})")]
    InvalidThreshold(f64),

    #[error("background sample {index} is {sample_width}x{sample_height} but frame is {frame_width}x{frame_height}")]
    DimensionMismatch {
        index: usize,
        sample_width: u32,
        sample_height: u32,
        frame_width: u32,
        frame_height: u32,
    },
}

/// Compositor that marks background pixels transparent.
///
/// Samples are converted to Lab once at construction; they are read-only for
/// the rest of the session.
#[derive(Debug, Clone)]
pub struct ChromaKey {
    samples: Vec<Vec<Lab>>,
    width: u32,
    height: u32,
    threshold: f64,
}

impl ChromaKey {
    /// Build a compositor from same-sized reference images.
    pub fn new(samples: &[RgbaImage], threshold: f64) -> Result<Self, ChromaKeyError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ChromaKeyError::InvalidThreshold(threshold));
        }
        let first = samples.first().ok_or(ChromaKeyError::NoSamples)?;
        let (width, height) = first.dimensions();

        for (index, sample) in samples.iter().enumerate() {
            if sample.dimensions() != (width, height) {
                return Err(ChromaKeyError::DimensionMismatch {
                    index,
                    sample_width: sample.width(),
                    sample_height: sample.height(),
                    frame_width: width,
                    frame_height: height,
                });
            }
        }

        let samples = samples
            .iter()
            .map(|img| img.pixels().map(Lab::from_pixel).collect())
            .collect();

        Ok(Self {
            samples,
            width,
            height,
            threshold,
        })
    }

    /// Working resolution the samples were prepared for.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Set alpha to 0 on every pixel that is closer than the threshold to the
    /// corresponding pixel of *any* sample. Returns the number of keyed pixels.
    ///
    /// The frame must have the samples' dimensions.
    pub fn apply(&self, img: &mut RgbaImage) -> Result<usize, ChromaKeyError> {
        if img.dimensions() != (self.width, self.height) {
            return Err(ChromaKeyError::DimensionMismatch {
                index: 0,
                sample_width: self.width,
                sample_height: self.height,
                frame_width: img.width(),
                frame_height: img.height(),
            });
        }

        let mut keyed = 0;
        for (i, pixel) in img.pixels_mut().enumerate() {
            let live = Lab::from_pixel(pixel);
            let is_background = self
                .samples
                .iter()
                .any(|sample| live.distance(&sample[i]) < self.threshold);
            if is_background {
                pixel[3] = 0;
                keyed += 1;
            }
        }
        Ok(keyed)
    }
}
