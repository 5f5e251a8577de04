//! PNG data URI encoding of finished surfaces.

use std::io::Cursor;

use base64::prelude::*;
use image::ImageFormat;

use crate::error::FaviconError;
use crate::icon::Surface;

/// Prefix of every URI produced by [`encode_data_uri`].
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Encodes a surface as a self-contained `data:image/png;base64,` URI.
pub fn encode_data_uri(surface: &Surface) -> Result<String, FaviconError> {
    if surface.width() == 0 || surface.height() == 0 {
        return Err(FaviconError::EmptySurface);
    }

    let mut png = Vec::new();
    surface
        .data
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(FaviconError::Encode)?;

    Ok(format!("{PNG_DATA_URI_PREFIX}{}", BASE64_STANDARD.encode(png)))
}
