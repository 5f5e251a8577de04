//! Loading icon sources.
//!
//! Loading is the one suspension point of a render. The renderer asks an
//! [`ImageLoader`] for the link's current `href` and waits for the result.
//! [`DataUriLoader`] handles inline `data:` URIs without any I/O; the `web`
//! feature adds a loader that lets the browser fetch and decode the image.

use async_trait::async_trait;
use base64::prelude::*;
use image::RgbaImage;
use percent_encoding::percent_decode_str;

use crate::error::FaviconError;
use crate::icon::Surface;
use crate::layer::svg::{looks_like_svg, render_svg};

/// An icon as produced by a loader.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedImage {
    /// Encoded image bytes (PNG, ICO, JPEG, GIF, BMP, WebP or SVG). SVG is
    /// recognised by its markup.
    Encoded(Vec<u8>),
    /// SVG markup, as declared by the source's media type.
    Svg(Vec<u8>),
    /// Pixels already decoded by the host.
    Pixels(RgbaImage),
}

impl LoadedImage {
    /// Draws the image into a fresh `size x size` surface.
    ///
    /// Raster images are scaled to fit; SVG is rasterised straight at `size`.
    pub fn into_surface(self, size: u32) -> Result<Surface, FaviconError> {
        match self {
            Self::Svg(bytes) => render_svg(&bytes, size).map(Surface::from_image),
            Self::Encoded(bytes) if looks_like_svg(&bytes) => {
                render_svg(&bytes, size).map(Surface::from_image)
            }
            Self::Encoded(bytes) => {
                let image = image::load_from_memory(&bytes)
                    .map_err(FaviconError::Decode)?
                    .to_rgba8();
                Ok(Surface::draw_scaled(&image, size))
            }
            Self::Pixels(image) => Ok(Surface::draw_scaled(&image, size)),
        }
    }
}

/// Fetches the image behind an icon URL.
#[async_trait(?Send)]
pub trait ImageLoader {
    async fn load(&self, url: &str) -> Result<LoadedImage, FaviconError>;
}

// ============================================================================
// DataUriLoader
// ============================================================================

/// Loads `data:` URIs. Any other scheme is [`FaviconError::UnsupportedSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUriLoader;

#[async_trait(?Send)]
impl ImageLoader for DataUriLoader {
    async fn load(&self, url: &str) -> Result<LoadedImage, FaviconError> {
        let uri = decode_data_uri(url)?;
        Ok(if uri.is_svg() {
            LoadedImage::Svg(uri.bytes)
        } else {
            LoadedImage::Encoded(uri.bytes)
        })
    }
}

/// A decoded `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Lowercased media type, `text/plain` when the URI omits it.
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUri {
    pub fn is_svg(&self) -> bool {
        self.mime == "image/svg+xml"
    }
}

/// Decodes a `data:[<mime>][;base64],<payload>` URI.
pub fn decode_data_uri(url: &str) -> Result<DataUri, FaviconError> {
    let rest = url
        .get(..5)
        .filter(|scheme| scheme.eq_ignore_ascii_case("data:"))
        .map(|_| &url[5..])
        .ok_or_else(|| FaviconError::UnsupportedSource {
            url: truncated(url),
        })?;

    let (meta, payload) = rest.split_once(',').ok_or_else(|| FaviconError::Load {
        url: truncated(url),
        reason: "data URI has no payload separator".to_owned(),
    })?;

    let mime = match meta.split(';').next().map(str::trim) {
        Some(mime) if !mime.is_empty() => mime.to_ascii_lowercase(),
        _ => "text/plain".to_owned(),
    };

    let is_base64 = meta
        .rsplit(';')
        .next()
        .is_some_and(|param| param.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        let compact: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let compact = percent_decode_str(&compact).decode_utf8_lossy();
        BASE64_STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| FaviconError::Load {
                url: truncated(url),
                reason: e.to_string(),
            })?
    } else {
        percent_decode_str(payload).collect()
    };

    Ok(DataUri { mime, bytes })
}

/// Keeps error messages readable when the URI embeds a whole image.
fn truncated(url: &str) -> String {
    const MAX: usize = 64;
    match url.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &url[..end]),
        None => url.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_data_uri;
    use image::Rgba;

    const SVG_URI: &str = "data:image/svg+xml,%3Csvg%20xmlns%3D%22http%3A%2F%2Fwww.w3.org%2F2000%2Fsvg%22%20width%3D%2210%22%20height%3D%2210%22%3E%3Crect%20width%3D%2210%22%20height%3D%2210%22%20fill%3D%22%23ff0000%22%2F%3E%3C%2Fsvg%3E";

    #[tokio::test]
    async fn loads_base64_png() {
        let source = Surface::from_image(RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255])));
        let uri = encode_data_uri(&source).unwrap();

        let loaded = DataUriLoader.load(&uri).await.unwrap();
        let surface = loaded.into_surface(8).unwrap();
        assert_eq!(surface, source);
    }

    #[tokio::test]
    async fn loads_percent_encoded_svg() {
        let loaded = DataUriLoader.load(SVG_URI).await.unwrap();
        let surface = loaded.into_surface(16).unwrap();
        assert_eq!(surface.width(), 16);
        assert_eq!(surface.data.get_pixel(8, 8).0, [255, 0, 0, 255]);
    }

    #[tokio::test]
    async fn rejects_other_schemes() {
        let err = DataUriLoader.load("https://example.com/favicon.ico").await.unwrap_err();
        assert!(matches!(err, FaviconError::UnsupportedSource { .. }));
    }

    #[test]
    fn missing_separator_is_a_load_error() {
        let err = decode_data_uri("data:image/png;base64").unwrap_err();
        assert!(matches!(err, FaviconError::Load { .. }));
    }

    #[test]
    fn bad_base64_is_a_load_error() {
        let err = decode_data_uri("data:image/png;base64,@@@").unwrap_err();
        assert!(matches!(err, FaviconError::Load { .. }));
    }

    #[test]
    fn base64_tolerates_whitespace() {
        let uri = decode_data_uri("DATA:text/plain;base64,aGVs\n bG8=").unwrap();
        assert_eq!(uri.bytes, b"hello");
    }

    #[test]
    fn media_type_is_kept() {
        let uri = decode_data_uri("data:Image/SVG+XML;charset=utf-8,%3Csvg%2F%3E").unwrap();
        assert_eq!(uri.mime, "image/svg+xml");
        assert!(uri.is_svg());
        assert_eq!(uri.bytes, b"<svg/>");

        let uri = decode_data_uri("data:,hi").unwrap();
        assert_eq!(uri.mime, "text/plain");
        assert!(!uri.is_svg());
    }

    #[tokio::test]
    async fn declared_svg_is_rasterised_without_leading_tag() {
        let markup = concat!(
            "<!-- icon -->\n",
            "<!DOCTYPE svg>\n",
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4">"##,
            r##"<rect width="4" height="4" fill="#00ff00"/></svg>"##,
        );
        let uri = format!("data:image/svg+xml;base64,{}", BASE64_STANDARD.encode(markup));

        let loaded = DataUriLoader.load(&uri).await.unwrap();
        assert!(matches!(loaded, LoadedImage::Svg(_)));
        let surface = loaded.into_surface(16).unwrap();
        assert_eq!(surface.data.get_pixel(8, 8).0, [0, 255, 0, 255]);
    }

    #[tokio::test]
    async fn unsupported_scheme_error_is_truncated() {
        let long = format!("https://example.com/{}", "a".repeat(5000));
        let err = DataUriLoader.load(&long).await.unwrap_err();
        match err {
            FaviconError::UnsupportedSource { url } => assert!(url.len() < 100),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn undecodable_bytes_are_a_decode_error() {
        let err = LoadedImage::Encoded(b"not an image".to_vec())
            .into_surface(16)
            .unwrap_err();
        assert!(matches!(err, FaviconError::Decode(_)));
    }

    #[test]
    fn decoded_pixels_are_scaled() {
        let pixels = RgbaImage::from_pixel(48, 48, Rgba([5, 6, 7, 255]));
        let surface = LoadedImage::Pixels(pixels).into_surface(32).unwrap();
        assert_eq!(surface.width(), 32);
        assert_eq!(surface.data.get_pixel(16, 16).0, [5, 6, 7, 255]);
    }

    #[test]
    fn long_urls_are_truncated_in_errors() {
        let long = format!("data:{}", "a".repeat(500));
        let err = decode_data_uri(&long).unwrap_err();
        assert!(err.to_string().len() < 200);
    }
}
