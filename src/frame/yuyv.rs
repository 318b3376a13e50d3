//! Packed YUYV (4:2:2) to RGBA conversion.

use image::{Rgba, RgbaImage};

/// Bytes per pixel in a packed 4:2:2 stream (Y0 Cb Y1 Cr covers two pixels).
pub const YUYV_BYTES_PER_PIXEL: usize = 2;

/// A raw frame exactly as the capture device produced it.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Packed Y0 Cb Y1 Cr quadruplets, row-major
    pub data: Vec<u8>,
    /// Declared frame width in pixels
    pub width: u32,
    /// Declared frame height in pixels
    pub height: u32,
}

impl RawFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// Number of bytes a complete frame of the declared size occupies.
    pub fn expected_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * YUYV_BYTES_PER_PIXEL
    }
}

/// Errors produced while decoding a raw frame.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty frame")]
    Empty,

    #[error("frame dimensions {width}x{height} are invalid for 4:2:2 data")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("truncated frame: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
}

/// Decode a packed YUYV frame into an opaque RGBA buffer.
///
/// Each quadruplet `Y0 Cb Y1 Cr` yields two horizontally adjacent pixels that
/// share the chroma pair. The conversion is the full-range (JFIF) BT.601
/// transform evaluated in 16.16 fixed point; results outside `0..=255` are
/// clamped.
///
/// Frames shorter than `width * height * 2` bytes are rejected so that a
/// partially delivered frame is never rendered. Extra trailing bytes are
/// ignored.
pub fn decode_yuyv(frame: &RawFrame) -> Result<RgbaImage, DecodeError> {
    if frame.data.is_empty() {
        return Err(DecodeError::Empty);
    }
    if frame.width == 0 || frame.height == 0 || frame.width % 2 != 0 {
        return Err(DecodeError::InvalidDimensions {
            width: frame.width,
            height: frame.height,
        });
    }

    let expected = RawFrame::expected_len(frame.width, frame.height);
    if frame.data.len() < expected {
        return Err(DecodeError::Truncated {
            expected,
            actual: frame.data.len(),
        });
    }

    let width = frame.width as usize;
    let mut img = RgbaImage::new(frame.width, frame.height);

    for (i, quad) in frame.data[..expected].chunks_exact(4).enumerate() {
        let x = ((i * 2) % width) as u32;
        let y = ((i * 2) / width) as u32;
        let (cb, cr) = (quad[1], quad[3]);
        img.put_pixel(x, y, ycbcr_to_rgba(quad[0], cb, cr));
        img.put_pixel(x + 1, y, ycbcr_to_rgba(quad[2], cb, cr));
    }

    Ok(img)
}

/// Convert one Y'CbCr sample to an opaque RGBA pixel.
///
/// Coefficients are the JFIF ones scaled by 2^16:
/// R = Y + 1.40200 Cr, G = Y - 0.34414 Cb - 0.71414 Cr, B = Y + 1.77200 Cb.
#[inline]
pub fn ycbcr_to_rgba(y: u8, cb: u8, cr: u8) -> Rgba<u8> {
    // Y * 0x10101 spreads the 8-bit luma over the 16.16 range exactly
    let yy = y as i32 * 0x10101;
    let cb = cb as i32 - 128;
    let cr = cr as i32 - 128;

    let r = yy + 91881 * cr;
    let g = yy - 22554 * cb - 46802 * cr;
    let b = yy + 116130 * cb;

    Rgba([clamp_fixed(r), clamp_fixed(g), clamp_fixed(b), u8::MAX])
}

#[inline]
fn clamp_fixed(v: i32) -> u8 {
    (v.clamp(0, 0x00ff_ffff) >> 16) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(y: u8, cb: u8, cr: u8, width: u32, height: u32) -> RawFrame {
        let quads = (width * height / 2) as usize;
        let data = [y, cb, y, cr].repeat(quads);
        RawFrame::new(data, width, height)
    }

    #[test]
    fn test_decode_dimensions_match_declared() {
        let img = decode_yuyv(&solid(90, 128, 128, 6, 4)).unwrap();
        assert_eq!(img.dimensions(), (6, 4));
    }

    #[test]
    fn test_neutral_chroma_is_gray() {
        let img = decode_yuyv(&solid(128, 128, 128, 4, 2)).unwrap();
        for p in img.pixels() {
            assert_eq!(*p, Rgba([128, 128, 128, 255]));
        }
    }

    #[test]
    fn test_extremes_clamp() {
        // Full luma with strong red chroma overflows R and underflows G
        let p = ycbcr_to_rgba(255, 128, 255);
        assert_eq!(p[0], 255);
        assert!(p[1] < 255);
        let p = ycbcr_to_rgba(0, 0, 0);
        assert_eq!(p[0], 0);
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_chroma_shared_by_pixel_pair() {
        // Different luma, same chroma: both pixels get the same red shift
        let frame = RawFrame::new(vec![60, 128, 200, 200], 2, 1);
        let img = decode_yuyv(&frame).unwrap();
        let left = img.get_pixel(0, 0);
        let right = img.get_pixel(1, 0);
        assert!(left[0] > left[2]);
        assert!(right[0] > right[2]);
        assert!(right[0] > left[0]);
    }

    #[test]
    fn test_truncated_frame_rejected() {
        let frame = RawFrame::new(vec![0; 15], 4, 2);
        assert_eq!(
            decode_yuyv(&frame),
            Err(DecodeError::Truncated {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn test_empty_frame_rejected() {
        let frame = RawFrame::new(Vec::new(), 4, 2);
        assert_eq!(decode_yuyv(&frame), Err(DecodeError::Empty));
    }

    #[test]
    fn test_odd_width_rejected() {
        let frame = RawFrame::new(vec![0; 64], 3, 2);
        assert!(matches!(
            decode_yuyv(&frame),
            Err(DecodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut frame = solid(128, 128, 128, 2, 2);
        frame.data.extend_from_slice(&[1, 2, 3]);
        assert!(decode_yuyv(&frame).is_ok());
    }
}
