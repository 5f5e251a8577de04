//! Error types for favicon rendering.

use std::time::Duration;

use thiserror::Error;

use crate::layer::FilterError;

/// Errors that can abort a favicon render.
///
/// A render that finds no icon link, or a link without an `href`, is not an
/// error; see [`RenderOutcome::Skipped`](crate::RenderOutcome::Skipped).
#[derive(Debug, Error)]
pub enum FaviconError {
    /// The badge colour is not a CSS colour.
    #[error("invalid notification color {color:?}: {reason}")]
    InvalidColor { color: String, reason: String },

    /// The loader has no way to fetch this URL.
    #[error("unsupported icon source {url:?}")]
    UnsupportedSource { url: String },

    /// The loader failed to fetch the icon.
    #[error("failed to load icon from {url:?}: {reason}")]
    Load { url: String, reason: String },

    /// The loader did not finish within the configured timeout.
    #[error("loading icon from {url:?} timed out after {timeout:?}")]
    LoadTimedOut { url: String, timeout: Duration },

    /// The loaded bytes are not a decodable raster image.
    #[error("failed to decode icon: {0}")]
    Decode(#[source] image::ImageError),

    /// The loaded bytes look like SVG but could not be rasterised.
    #[error("failed to render SVG icon: {0}")]
    Svg(String),

    /// A zero-sized surface reached a step that needs pixels.
    #[error("surface has no pixels")]
    EmptySurface,

    /// A filter returned a surface with different dimensions.
    #[error("filter {filter:?} resized the surface from {expected}x{expected} to {width}x{height}")]
    SurfaceResized {
        filter: String,
        expected: u32,
        width: u32,
        height: u32,
    },

    /// A filter reported a failure.
    #[error("filter {filter:?} failed")]
    Filter {
        filter: String,
        #[source]
        source: FilterError,
    },

    /// The final surface could not be encoded as PNG.
    #[error("failed to encode icon: {0}")]
    Encode(#[source] image::ImageError),

    /// The host document rejected an operation.
    #[error("document error: {0}")]
    Document(String),
}
