//! favicon-renderer: runtime favicon rewriting
//!
//! This crate loads a page's current favicon, runs it through an ordered
//! list of pixel filters, optionally draws a notification badge, and writes
//! the result back into the icon link as a PNG data URI.
//!
//! The host document and the image loader are injected, so the same pipeline
//! runs in the browser (`web` feature) and headless against a
//! [`MemoryDocument`].
//!
//! # Example
//!
//! ```
//! use favicon_renderer::{
//!     DataUriLoader, FaviconRenderer, Grayscale, IconConfiguration, IconSize,
//!     MemoryDocument, RenderOutcome,
//! };
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let document = MemoryDocument::new();
//! document.add_icon(
//!     "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='8' height='8'/%3E",
//!     None,
//! );
//!
//! let renderer = FaviconRenderer::new(document, DataUriLoader);
//! let config = IconConfiguration::new()
//!     .with_size(IconSize::Large)
//!     .with_filter(Grayscale)
//!     .with_notification(true);
//!
//! match renderer.render(&config).await.unwrap() {
//!     RenderOutcome::Applied { size, href } => {
//!         assert_eq!(size, IconSize::Large);
//!         assert!(href.starts_with("data:image/png;base64,"));
//!     }
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! # });
//! ```
//!
//! # Serializable Settings
//!
//! For WASM/frontend communication, use [`FaviconSettings`], which converts
//! into an [`IconConfiguration`]:
//!
//! ```
//! use favicon_renderer::{FaviconSettings, MemoryLink};
//!
//! let settings = FaviconSettings::from_json(
//!     r#"{"size":32,"showNotification":true,"filters":[{"kind":"grayscale"}]}"#,
//! )
//! .unwrap();
//! let config = settings.into_configuration::<MemoryLink>(None);
//! assert_eq!(config.filters.len(), 1);
//! ```

mod document;
mod encode;
mod error;
mod icon;
mod layer;
mod loader;
mod profile;
mod renderer;

#[cfg(feature = "web")]
mod canvas;

pub use async_trait::async_trait;
pub use document::{locate, IconDocument, IconLink, LinkKey, MemoryDocument, MemoryLink};
pub use encode::{encode_data_uri, PNG_DATA_URI_PREFIX};
pub use error::FaviconError;
pub use icon::{resolve_size, IconSize, SizePx, Surface, DEFAULT_ICON_SIZE};
pub use layer::badge::BadgeGeometry;
pub use layer::{
    apply_badge, apply_filters, grayscale, BadgeColor, Filter, FilterError, Grayscale, HueRotation,
    DEFAULT_BADGE_COLOR,
};
pub use loader::{decode_data_uri, DataUri, DataUriLoader, ImageLoader, LoadedImage};
pub use profile::{FaviconSettings, FilterSettings};
pub use renderer::{
    FaviconRenderer, IconConfiguration, RenderOutcome, RendererOptions, SkipReason,
};

#[cfg(feature = "web")]
pub use canvas::{WebDocument, WebImageLoader, WebLink};
