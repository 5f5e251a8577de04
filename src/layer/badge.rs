//! Notification badge overlay.
//!
//! The badge is a filled circle anchored to the top-right corner whose
//! radius is a fifth of the surface width, so it scales with the icon.

use image::Rgba;
use resvg::tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

use super::svg::{composite_over, pixmap_to_rgba_image};
use crate::error::FaviconError;
use crate::icon::Surface;

/// Colour used when the configuration does not name one.
pub const DEFAULT_BADGE_COLOR: &str = "red";

// ============================================================================
// BadgeColor
// ============================================================================

/// A badge fill colour parsed from a CSS colour string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeColor(pub Rgba<u8>);

impl BadgeColor {
    /// Parses any CSS colour (`"red"`, `"#f80"`, `"rgb(0 128 255 / 50%)"`, ...).
    pub fn parse(color: &str) -> Result<Self, FaviconError> {
        let parsed = csscolorparser::parse(color).map_err(|e| FaviconError::InvalidColor {
            color: color.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self(Rgba(parsed.to_rgba8())))
    }
}

impl Default for BadgeColor {
    fn default() -> Self {
        Self(Rgba([255, 0, 0, 255]))
    }
}

// ============================================================================
// Badge Geometry
// ============================================================================

/// Circle geometry of a badge on a surface of a given width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadgeGeometry {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
}

impl BadgeGeometry {
    /// Computes the badge circle for a surface `width` pixels wide.
    pub fn for_width(width: u32) -> Self {
        let radius = width as f32 / 5.0;
        Self {
            center_x: width as f32 - radius,
            center_y: radius,
            radius,
        }
    }
}

/// Draws the notification badge onto `surface` and returns it.
///
/// Pixels outside the circle are left untouched.
pub fn apply_badge(mut surface: Surface, color: BadgeColor) -> Result<Surface, FaviconError> {
    let (width, height) = (surface.width(), surface.height());
    if width == 0 || height == 0 {
        return Err(FaviconError::EmptySurface);
    }

    let geometry = BadgeGeometry::for_width(width);
    let Some(circle) = PathBuilder::from_circle(geometry.center_x, geometry.center_y, geometry.radius)
    else {
        // Radius rounds to nothing; there is no badge to draw.
        return Ok(surface);
    };

    let mut pixmap = Pixmap::new(width, height).ok_or(FaviconError::EmptySurface)?;
    let [r, g, b, a] = color.0 .0;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    pixmap.fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);

    let badge = pixmap_to_rgba_image(&pixmap);
    composite_over(&mut surface.data, &badge);

    tracing::debug!(
        radius = geometry.radius,
        center_x = geometry.center_x,
        center_y = geometry.center_y,
        "applied notification badge"
    );
    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn solid(size: u32, pixel: [u8; 4]) -> Surface {
        Surface::from_image(RgbaImage::from_pixel(size, size, Rgba(pixel)))
    }

    #[test]
    fn geometry_scales_with_width() {
        let g = BadgeGeometry::for_width(32);
        assert!((g.radius - 6.4).abs() < 1e-5);
        assert!((g.center_x - 25.6).abs() < 1e-5);
        assert!((g.center_y - 6.4).abs() < 1e-5);

        let g = BadgeGeometry::for_width(16);
        assert!((g.radius - 3.2).abs() < 1e-5);
        assert!((g.center_x - 12.8).abs() < 1e-5);
    }

    #[test]
    fn badge_fills_top_right_only() {
        let base = solid(32, [0, 0, 255, 255]);
        let out = apply_badge(base.clone(), BadgeColor::default()).unwrap();

        assert_eq!(out.data.get_pixel(25, 6).0, [255, 0, 0, 255]);

        for (x, y, pixel) in out.data.enumerate_pixels() {
            if x < 16 || y >= 16 {
                assert_eq!(pixel, base.data.get_pixel(x, y), "pixel ({x}, {y}) changed");
            }
        }
        // The corner lies outside the circle.
        assert_eq!(out.data.get_pixel(31, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn badge_on_small_icon_stays_right_of_center() {
        let base = solid(16, [0, 0, 0, 0]);
        let out = apply_badge(base, BadgeColor::parse("#00ff00").unwrap()).unwrap();

        assert_eq!(out.data.get_pixel(12, 3).0, [0, 255, 0, 255]);
        for (x, _, pixel) in out.data.enumerate_pixels() {
            if x < 8 {
                assert_eq!(pixel.0, [0, 0, 0, 0]);
            }
        }
    }

    #[test]
    fn dimensions_unchanged() {
        let out = apply_badge(solid(16, [1, 1, 1, 255]), BadgeColor::default()).unwrap();
        assert_eq!(out.width(), 16);
        assert_eq!(out.height(), 16);
    }

    #[test]
    fn empty_surface_rejected() {
        let err = apply_badge(Surface::new(0), BadgeColor::default()).unwrap_err();
        assert!(matches!(err, FaviconError::EmptySurface));
    }

    #[test]
    fn parses_css_colors() {
        assert_eq!(BadgeColor::parse("red").unwrap(), BadgeColor::default());
        assert_eq!(
            BadgeColor::parse("#0080ff").unwrap().0 .0,
            [0, 128, 255, 255]
        );
        assert_eq!(
            BadgeColor::parse(DEFAULT_BADGE_COLOR).unwrap(),
            BadgeColor::default()
        );
    }

    #[test]
    fn rejects_unknown_color() {
        let err = BadgeColor::parse("not-a-colour").unwrap_err();
        assert!(matches!(err, FaviconError::InvalidColor { .. }));
    }
}
