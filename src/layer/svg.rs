//! SVG rasterisation and compositing utilities using resvg/tiny-skia.
//!
//! SVG favicons are rasterised straight at the target size rather than
//! decoded and rescaled. The compositing helpers are shared with the badge
//! overlay.

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::error::FaviconError;

// ============================================================================
// SVG Rendering
// ============================================================================

/// Returns true if `bytes` look like SVG markup rather than a raster format.
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

/// Renders SVG markup to a `size x size` RGBA image.
///
/// The drawing is stretched to fill the square, the way drawing a
/// non-square image into the icon surface does.
pub fn render_svg(svg_data: &[u8], size: u32) -> Result<RgbaImage, FaviconError> {
    let opts = Options::default();
    let tree = Tree::from_data(svg_data, &opts).map_err(|e| FaviconError::Svg(e.to_string()))?;

    let mut pixmap = Pixmap::new(size, size).ok_or(FaviconError::EmptySurface)?;

    let svg_size = tree.size();
    let transform = Transform::from_scale(
        size as f32 / svg_size.width(),
        size as f32 / svg_size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    Ok(pixmap_to_rgba_image(&pixmap))
}

/// Converts a tiny_skia Pixmap to an image::RgbaImage.
pub fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let width = pixmap.width();
    let height = pixmap.height();

    // tiny_skia stores premultiplied alpha.
    RgbaImage::from_fn(width, height, |x, y| match pixmap.pixel(x, y) {
        Some(pixel) => {
            let (r, g, b, a) = unpremultiply(pixel.red(), pixel.green(), pixel.blue(), pixel.alpha());
            Rgba([r, g, b, a])
        }
        None => Rgba([0, 0, 0, 0]),
    })
}

/// Unpremultiplies a premultiplied alpha pixel.
fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> (u8, u8, u8, u8) {
    if a == 0 {
        (0, 0, 0, 0)
    } else {
        let a_f = a as f32 / 255.0;
        (
            (r as f32 / a_f).round().min(255.0) as u8,
            (g as f32 / a_f).round().min(255.0) as u8,
            (b as f32 / a_f).round().min(255.0) as u8,
            a,
        )
    }
}

// ============================================================================
// Compositing
// ============================================================================

/// Composites a same-sized source image over a destination image.
///
/// Uses standard alpha blending (source over destination). Fully transparent
/// source pixels leave the destination bit-identical.
pub fn composite_over(dest: &mut RgbaImage, src: &RgbaImage) {
    debug_assert_eq!(dest.dimensions(), src.dimensions());

    for (dst_pixel, src_pixel) in dest.pixels_mut().zip(src.pixels()) {
        if src_pixel[3] != 0 {
            *dst_pixel = alpha_blend(*src_pixel, *dst_pixel);
        }
    }
}

/// Alpha blends two RGBA pixels (source over destination).
fn alpha_blend(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    if src[3] == 255 {
        return src;
    }

    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    if out_a == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |s: u8, d: u8| -> u8 {
        let sf = s as f32 / 255.0;
        let df = d as f32 / 255.0;
        let out = (sf * sa + df * da * (1.0 - sa)) / out_a;
        (out * 255.0).round() as u8
    };

    Rgba([
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

// ============================================================================
// Tests
// ============================================================================
