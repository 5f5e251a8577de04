//! Grayscale filter.

use image::{Rgba, RgbaImage};

use super::{Filter, FilterError};
use crate::icon::Surface;

/// BT.709 luma weights for red, green and blue.
const LUMA_WEIGHTS: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Filter converting every pixel to its BT.709 luma, alpha untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Grayscale;

impl Filter for Grayscale {
    fn name(&self) -> &str {
        "grayscale"
    }

    fn apply(&self, surface: Surface) -> Result<Surface, FilterError> {
        Ok(grayscale(surface))
    }
}

/// Returns a surface of the same size holding the luma of each input pixel.
///
/// The luma is stored into all three colour channels with clamped 8-bit
/// semantics (rounded to nearest, ties to even), so gray input maps to
/// itself and applying the filter twice changes nothing.
pub fn grayscale(surface: Surface) -> Surface {
    let source = surface.into_image();
    let mut out = RgbaImage::new(source.width(), source.height());

    for (dst, src) in out.pixels_mut().zip(source.pixels()) {
        let [r, g, b, a] = src.0;
        let gray = clamp_channel(luma(r, g, b));
        *dst = Rgba([gray, gray, gray, a]);
    }

    Surface::from_image(out)
}

fn luma(r: u8, g: u8, b: u8) -> f64 {
    f64::from(r) * LUMA_WEIGHTS[0] + f64::from(g) * LUMA_WEIGHTS[1] + f64::from(b) * LUMA_WEIGHTS[2]
}

fn clamp_channel(value: f64) -> u8 {
    // Float to int casts saturate, so only rounding is needed here.
    value.round_ties_even() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(pixel: [u8; 4]) -> Surface {
        Surface::from_image(RgbaImage::from_pixel(1, 1, Rgba(pixel)))
    }

    fn pixel_after(pixel: [u8; 4]) -> [u8; 4] {
        grayscale(single(pixel)).data.get_pixel(0, 0).0
    }

    #[test]
    fn pure_red_becomes_dark_gray() {
        assert_eq!(pixel_after([255, 0, 0, 255]), [54, 54, 54, 255]);
    }

    #[test]
    fn pure_green_and_blue() {
        assert_eq!(pixel_after([0, 255, 0, 255]), [182, 182, 182, 255]);
        assert_eq!(pixel_after([0, 0, 255, 255]), [18, 18, 18, 255]);
    }

    #[test]
    fn transparent_black_is_unchanged() {
        assert_eq!(pixel_after([0, 0, 0, 0]), [0, 0, 0, 0]);
    }

    #[test]
    fn white_keeps_alpha() {
        assert_eq!(pixel_after([255, 255, 255, 128]), [255, 255, 255, 128]);
    }

    #[test]
    fn every_gray_level_maps_to_itself() {
        for level in 0..=255u8 {
            assert_eq!(
                pixel_after([level, level, level, 200]),
                [level, level, level, 200],
                "level {level}"
            );
        }
    }

    #[test]
    fn second_pass_is_identical() {
        let mut img = RgbaImage::new(16, 16);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            pixel.0 = [(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8, (x * y) as u8];
        }
        let once = grayscale(Surface::from_image(img));
        let twice = grayscale(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn dimensions_preserved() {
        let out = Grayscale
            .apply(Surface::from_image(RgbaImage::new(32, 32)))
            .unwrap();
        assert_eq!(out.width(), 32);
        assert_eq!(out.height(), 32);
    }
}
