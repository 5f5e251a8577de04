//! Hue rotation filter.

use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

use super::{Filter, FilterError};
use crate::icon::Surface;

/// Rotates the hue of every visible pixel by a fixed angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct HueRotation {
    /// Rotation angle in degrees (0-360).
    pub degrees: f32,
}

impl HueRotation {
    /// Creates a new hue rotation.
    ///
    /// The angle is normalized to the 0-360 range.
    pub fn new(degrees: f32) -> Self {
        Self {
            degrees: degrees.rem_euclid(360.0),
        }
    }
}

impl Filter for HueRotation {
    fn name(&self) -> &str {
        "hue-rotation"
    }

    fn apply(&self, surface: Surface) -> Result<Surface, FilterError> {
        Ok(rotate_hue(surface, self.degrees))
    }
}

/// Rotates the hue of each pixel in place. Fully transparent pixels are skipped.
pub fn rotate_hue(mut surface: Surface, degrees: f32) -> Surface {
    for pixel in surface.data.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            continue;
        }

        let rgb = Srgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        let mut hsl: Hsl = rgb.into_color();
        hsl.hue += degrees;
        let rotated: Srgb = hsl.into_color();

        pixel.0 = [
            (rotated.red * 255.0).round() as u8,
            (rotated.green * 255.0).round() as u8,
            (rotated.blue * 255.0).round() as u8,
            a,
        ];
    }

    surface
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid(pixel: [u8; 4]) -> Surface {
        Surface::from_image(RgbaImage::from_pixel(16, 16, Rgba(pixel)))
    }

    #[test]
    fn angle_is_normalized() {
        assert_eq!(HueRotation::new(450.0).degrees, 90.0);
        assert_eq!(HueRotation::new(-90.0).degrees, 270.0);
    }

    #[test]
    fn red_rotates_towards_green() {
        let out = HueRotation::new(120.0).apply(solid([255, 0, 0, 255])).unwrap();
        let pixel = out.data.get_pixel(0, 0);
        assert!(pixel[1] > pixel[0], "Green should be > Red after 120° rotation");
        assert!(pixel[1] > pixel[2], "Green should be > Blue after 120° rotation");
        assert_eq!(pixel[3], 255);
    }

    #[test]
    fn transparent_pixels_untouched() {
        let out = HueRotation::new(180.0).apply(solid([255, 0, 0, 0])).unwrap();
        assert_eq!(out.data.get_pixel(3, 3).0, [255, 0, 0, 0]);
    }

    #[test]
    fn gray_has_no_hue_to_rotate() {
        let out = HueRotation::new(200.0).apply(solid([90, 90, 90, 255])).unwrap();
        assert_eq!(out.data.get_pixel(0, 0).0, [90, 90, 90, 255]);
    }
}
