//! Serializable favicon settings for cross-process communication.
//!
//! [`FaviconSettings`] captures everything about a render except the target
//! element in a JSON-friendly form. It is what the browser entry points
//! accept, and it converts into an [`IconConfiguration`] for any document.
//!
//! # Example
//!
//! ```
//! use favicon_renderer::{FaviconSettings, FilterSettings, IconSize};
//!
//! let settings = FaviconSettings::new()
//!     .with_size(IconSize::Large)
//!     .with_notification("#ff8800")
//!     .with_filter(FilterSettings::Grayscale);
//!
//! let json = settings.to_json().unwrap();
//! let restored = FaviconSettings::from_json(&json).unwrap();
//! assert_eq!(restored, settings);
//! ```

use serde::{Deserialize, Serialize};

use crate::document::IconLink;
use crate::icon::IconSize;
use crate::layer::{Filter, Grayscale, HueRotation};
use crate::renderer::IconConfiguration;

// ============================================================================
// Filter Settings
// ============================================================================

/// Serializable description of a built-in filter.
///
/// ```json
/// { "kind": "grayscale" }
/// { "kind": "hueRotation", "degrees": 180.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "tsify", derive(tsify_next::Tsify))]
pub enum FilterSettings {
    Grayscale,
    HueRotation { degrees: f32 },
}

impl FilterSettings {
    /// Builds the filter this entry describes.
    pub fn to_filter(self) -> Box<dyn Filter> {
        match self {
            Self::Grayscale => Box::new(Grayscale),
            Self::HueRotation { degrees } => Box::new(HueRotation::new(degrees)),
        }
    }
}

// ============================================================================
// FaviconSettings
// ============================================================================

/// A serializable favicon render configuration.
///
/// # JSON Format
///
/// ```json
/// {
///   "size": 32,
///   "showNotification": true,
///   "notificationColor": "red",
///   "filters": [{ "kind": "grayscale" }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "tsify", derive(tsify_next::Tsify))]
pub struct FaviconSettings {
    /// Output size. `None` reads the link's `sizes` attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "tsify", tsify(optional, type = "16 | 32"))]
    pub size: Option<IconSize>,

    /// Whether to draw the notification badge.
    #[serde(default)]
    pub show_notification: bool,

    /// Badge colour as a CSS colour string. `None` means red.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "tsify", tsify(optional))]
    pub notification_color: Option<String>,

    /// Filters applied in order before the badge.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterSettings>,
}

impl FaviconSettings {
    /// Creates settings with every option at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit output size.
    pub fn with_size(mut self, size: IconSize) -> Self {
        self.size = Some(size);
        self
    }

    /// Enables the badge in the given colour.
    pub fn with_notification(mut self, color: impl Into<String>) -> Self {
        self.show_notification = true;
        self.notification_color = Some(color.into());
        self
    }

    /// Appends a filter.
    pub fn with_filter(mut self, filter: FilterSettings) -> Self {
        self.filters.push(filter);
        self
    }

    /// Builds a render configuration, optionally bound to an explicit link.
    pub fn into_configuration<L: IconLink>(self, target: Option<L>) -> IconConfiguration<L> {
        IconConfiguration {
            target,
            size: self.size,
            show_notification: self.show_notification,
            notification_color: self.notification_color,
            filters: self.filters.into_iter().map(FilterSettings::to_filter).collect(),
        }
    }

    /// Serializes the settings to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the settings to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// Tests
// ============================================================================
