//! Filter infrastructure for favicon rendering.
//!
//! A filter is a transform from one [`Surface`] to the next. The renderer
//! folds the configured filters over the drawn icon in list order, then
//! applies the notification badge on top.
//!
//! # Architecture
//!
//! Each filter implements [`Filter`], which defines:
//! - A name used in logs and error reports
//! - How the surface is transformed
//!
//! Closures of type `Fn(Surface) -> Result<Surface, FilterError>` are
//! filters too, so callers can plug in ad-hoc transforms without a type.

pub mod badge;
pub mod grayscale;
pub mod hue_rotation;
pub mod svg;

pub use badge::{apply_badge, BadgeColor, DEFAULT_BADGE_COLOR};
pub use grayscale::{grayscale, Grayscale};
pub use hue_rotation::HueRotation;

use std::error::Error as StdError;
use std::fmt;

use crate::error::FaviconError;
use crate::icon::Surface;

// ============================================================================
// FilterError
// ============================================================================

/// A failure reported by a [`Filter`].
#[derive(Debug)]
pub struct FilterError {
    message: String,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl FilterError {
    /// Creates an error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for FilterError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

// ============================================================================
// Filter Trait
// ============================================================================

/// A bitmap transform applied to the rendered icon.
///
/// Implementations receive the current surface by value and return the
/// surface for the next step, either the same buffer modified in place or a
/// new one. The returned surface must keep the input's dimensions; the
/// pipeline rejects any filter that resizes it.
pub trait Filter {
    /// Name used in logs and errors.
    fn name(&self) -> &str {
        "custom"
    }

    /// Transforms the surface.
    fn apply(&self, surface: Surface) -> Result<Surface, FilterError>;
}

impl<F> Filter for F
where
    F: Fn(Surface) -> Result<Surface, FilterError>,
{
    fn apply(&self, surface: Surface) -> Result<Surface, FilterError> {
        self(surface)
    }
}

impl fmt::Debug for dyn Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Filter").field(&self.name()).finish()
    }
}

/// Folds `filters` over `surface` in order.
///
/// Each filter receives exactly the surface the previous one returned. Stops
/// at the first failure, or at the first filter that changes the surface's
/// dimensions.
pub fn apply_filters(
    surface: Surface,
    filters: &[Box<dyn Filter>],
) -> Result<Surface, FaviconError> {
    let expected = surface.dimensions();

    filters.iter().try_fold(surface, |surface, filter| {
        tracing::debug!(filter = filter.name(), "applying filter");
        let next = filter.apply(surface).map_err(|source| FaviconError::Filter {
            filter: filter.name().to_owned(),
            source,
        })?;

        let actual = next.dimensions();
        if actual != expected {
            return Err(FaviconError::SurfaceResized {
                filter: filter.name().to_owned(),
                expected: expected.width,
                width: actual.width,
                height: actual.height,
            });
        }
        Ok(next)
    })
}

// ============================================================================
// Tests
// ============================================================================
