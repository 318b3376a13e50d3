//! Unit tests for the text renderers.
//!
//! These tests cover:
//! - Intensity ramps and quantization
//! - Glyph rendering and forced colors
//! - Half-block rendering, padding and row counts

use image::{Rgba, RgbaImage};
use termcam::ascii::*;
use termcam::terminal::{ColorProfile, Rgb};

fn gray(level: u8) -> Rgba<u8> {
    Rgba([level, level, level, 255])
}

// ==================== Ramp Tests ====================

#[test]
fn test_every_charset_starts_blank() {
    for set in [CharSet::Classic, CharSet::Standard, CharSet::Blocks, CharSet::Minimal] {
        assert_eq!(set.chars()[0], ' ', "{} should start with a space", set.name());
        assert_eq!(CharSet::from_name(set.name()), Some(set));
    }
}

#[test]
fn test_index_is_monotonic() {
    let ramp = CharSet::Classic.ramp();
    let mut last = 0;
    for intensity in 0..=MAX_INTENSITY {
        let idx = ramp.index_for(intensity);
        assert!(idx >= last, "index went down at intensity {}", intensity);
        assert!(idx < ramp.len());
        last = idx;
    }
    assert_eq!(last, ramp.len() - 1);
}

#[test]
fn test_ramp_needs_two_glyphs() {
    assert!(IntensityRamp::parse("").is_err());
    assert!(IntensityRamp::parse("#").is_err());
    assert!(IntensityRamp::parse(" #").is_ok());
}

// ==================== Glyph Renderer Tests ====================

#[test]
fn test_glyph_render_gradient() {
    let mut img = RgbaImage::new(3, 1);
    img.put_pixel(0, 0, gray(0));
    img.put_pixel(1, 0, gray(128));
    img.put_pixel(2, 0, gray(255));

    let renderer = GlyphRenderer::new(IntensityRamp::parse(" +#").unwrap(), None, ColorProfile::NoColor);
    assert_eq!(renderer.render(&img), " +#\n");
}

#[test]
fn test_glyph_transparent_is_blank() {
    let img = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 0]));
    let renderer = GlyphRenderer::new(CharSet::Standard.ramp(), None, ColorProfile::NoColor);
    assert_eq!(renderer.render(&img), "  \n  \n");
}

#[test]
fn test_glyph_forced_color_truecolor() {
    let img = RgbaImage::from_pixel(2, 1, gray(255));
    let renderer = GlyphRenderer::new(
        IntensityRamp::parse(" #").unwrap(),
        Some(Rgb::new(0, 255, 0)),
        ColorProfile::TrueColor,
    );
    let out = renderer.render(&img);
    assert!(out.contains("\x1b[38;2;0;255;0m"));
    assert_eq!(strip_escapes(&out), "##\n");
}

#[test]
fn test_glyph_one_line_per_row() {
    let img = RgbaImage::from_pixel(7, 5, gray(90));
    let renderer = GlyphRenderer::new(CharSet::Classic.ramp(), None, ColorProfile::Ansi256);
    let visible = strip_escapes(&renderer.render(&img));
    let lines: Vec<&str> = visible.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines.iter().all(|l| l.chars().count() == 7));
}

// ==================== Block Renderer Tests ====================

#[test]
fn test_block_row_counts() {
    for height in 1..=6u32 {
        let img = RgbaImage::from_pixel(4, height, gray(200));
        let out = BlockRenderer::new(ColorProfile::TrueColor, 4).render(&img);
        assert_eq!(
            strip_escapes(&out).lines().count() as u32,
            height.div_ceil(2),
            "height {}",
            height
        );
    }
}

#[test]
fn test_block_odd_height_uses_upper_half() {
    let img = RgbaImage::from_pixel(2, 1, gray(200));
    let out = BlockRenderer::new(ColorProfile::NoColor, 2).render(&img);
    assert_eq!(out, format!("{0}{0}\n", UPPER_HALF_BLOCK));
}

#[test]
fn test_block_centers_narrow_image() {
    let img = RgbaImage::from_pixel(4, 2, gray(50));
    let out = BlockRenderer::new(ColorProfile::NoColor, 9).render(&img);
    let visible = strip_escapes(&out);
    assert_eq!(visible, format!("   {}\n", UPPER_HALF_BLOCK.to_string().repeat(4)));
}
