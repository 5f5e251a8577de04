//! Surface and size types for favicon rendering.
//!
//! A [`Surface`] is the offscreen square pixel buffer a render draws into,
//! filters and badges, and finally encodes. [`IconSize`] is the set of side
//! lengths a favicon may be rendered at.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Side length used when neither the configuration nor the link declares one.
pub const DEFAULT_ICON_SIZE: IconSize = IconSize::Small;

// ============================================================================
// IconSize
// ============================================================================

/// The supported favicon side lengths, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum IconSize {
    /// 16x16
    #[default]
    Small,
    /// 32x32
    Large,
}

impl IconSize {
    /// Returns the side length in pixels.
    pub fn pixels(self) -> u32 {
        match self {
            Self::Small => 16,
            Self::Large => 32,
        }
    }

    /// Returns the size with the given side length, if it is supported.
    pub fn from_pixels(pixels: u32) -> Option<Self> {
        match pixels {
            16 => Some(Self::Small),
            32 => Some(Self::Large),
            _ => None,
        }
    }
}

impl TryFrom<u32> for IconSize {
    type Error = String;

    fn try_from(pixels: u32) -> Result<Self, Self::Error> {
        Self::from_pixels(pixels)
            .ok_or_else(|| format!("unsupported icon size {pixels}, expected 16 or 32"))
    }
}

impl From<IconSize> for u32 {
    fn from(size: IconSize) -> Self {
        size.pixels()
    }
}

#[cfg(feature = "jsonschema")]
impl schemars::JsonSchema for IconSize {
    fn schema_name() -> String {
        "IconSize".to_owned()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        let mut schema = <u32 as schemars::JsonSchema>::json_schema(generator).into_object();
        schema.enum_values = Some(vec![16.into(), 32.into()]);
        schema.into()
    }
}

/// Resolves the render size for an icon link.
///
/// An explicit size wins. Otherwise the first two characters of the link's
/// `sizes` attribute are read as a decimal number (`"32x32"` gives 32). A
/// missing attribute, or one that does not name a supported size, yields
/// [`DEFAULT_ICON_SIZE`].
pub fn resolve_size(explicit: Option<IconSize>, sizes_attr: Option<&str>) -> IconSize {
    if let Some(size) = explicit {
        return size;
    }

    let Some(sizes) = sizes_attr else {
        return DEFAULT_ICON_SIZE;
    };

    let prefix: String = sizes.chars().take(2).collect();
    match prefix.trim().parse::<u32>().ok().and_then(IconSize::from_pixels) {
        Some(size) => size,
        None => {
            tracing::debug!(sizes, "ignoring unsupported sizes attribute");
            DEFAULT_ICON_SIZE
        }
    }
}

// ============================================================================
// SizePx
// ============================================================================

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if width equals height.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

// ============================================================================
// Surface
// ============================================================================

/// An offscreen RGBA pixel buffer.
///
/// Pixels use straight (non-premultiplied) alpha, 8 bits per channel.
/// Rendering creates one square surface per call and drops it once the
/// result has been encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// The pixel data.
    pub data: RgbaImage,
}

impl Surface {
    /// Creates a fully transparent `size x size` surface.
    pub fn new(size: u32) -> Self {
        Self {
            data: RgbaImage::new(size, size),
        }
    }

    /// Wraps existing pixel data.
    pub fn from_image(data: RgbaImage) -> Self {
        Self { data }
    }

    /// Draws `image` at the origin, scaled to fill a `size x size` surface.
    pub fn draw_scaled(image: &RgbaImage, size: u32) -> Self {
        if image.width() == size && image.height() == size {
            return Self::from_image(image.clone());
        }
        Self::from_image(imageops::resize(image, size, size, FilterType::Triangle))
    }

    pub fn width(&self) -> u32 {
        self.data.width()
    }

    pub fn height(&self) -> u32 {
        self.data.height()
    }

    /// Returns the pixel dimensions of the surface.
    pub fn dimensions(&self) -> SizePx {
        SizePx::new(self.data.width(), self.data.height())
    }

    /// Consumes the surface, returning its pixel data.
    pub fn into_image(self) -> RgbaImage {
        self.data
    }
}

impl From<RgbaImage> for Surface {
    fn from(data: RgbaImage) -> Self {
        Self::from_image(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn explicit_size_wins_over_attribute() {
        assert_eq!(
            resolve_size(Some(IconSize::Large), Some("16x16")),
            IconSize::Large
        );
        assert_eq!(
            resolve_size(Some(IconSize::Small), Some("32x32")),
            IconSize::Small
        );
    }

    #[test]
    fn size_read_from_attribute_prefix() {
        assert_eq!(resolve_size(None, Some("32x32")), IconSize::Large);
        assert_eq!(resolve_size(None, Some("16x16")), IconSize::Small);
    }

    #[test]
    fn missing_attribute_defaults_to_small() {
        assert_eq!(resolve_size(None, None), IconSize::Small);
    }

    #[test]
    fn unsupported_attribute_falls_back_to_default() {
        // "any" is not numeric, "128x128" reads as 12, "48x48" as 48.
        for sizes in ["any", "128x128", "48x48", "", "x"] {
            assert_eq!(resolve_size(None, Some(sizes)), IconSize::Small, "{sizes}");
        }
    }

    #[test]
    fn icon_size_serde_uses_pixels() {
        let json = serde_json::to_string(&IconSize::Large).unwrap();
        assert_eq!(json, "32");
        let size: IconSize = serde_json::from_str("16").unwrap();
        assert_eq!(size, IconSize::Small);
        assert!(serde_json::from_str::<IconSize>("24").is_err());
    }

    #[test]
    fn new_surface_is_transparent_square() {
        let surface = Surface::new(32);
        assert!(surface.dimensions().is_square());
        assert_eq!(surface.width(), 32);
        assert!(surface.data.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn draw_scaled_resizes_to_target() {
        let source = RgbaImage::from_pixel(64, 64, Rgba([10, 200, 30, 255]));
        let surface = Surface::draw_scaled(&source, 16);
        assert_eq!(surface.dimensions(), SizePx::new(16, 16));
        assert_eq!(surface.data.get_pixel(8, 8).0, [10, 200, 30, 255]);
    }

    #[test]
    fn draw_scaled_keeps_matching_image() {
        let source = RgbaImage::from_pixel(16, 16, Rgba([1, 2, 3, 4]));
        let surface = Surface::draw_scaled(&source, 16);
        assert_eq!(surface.data, source);
    }

    #[test]
    fn size_px_is_square() {
        assert!(SizePx::new(16, 16).is_square());
        assert!(!SizePx::new(16, 32).is_square());
    }
}
