//! Favicon rendering engine.

use std::cell::RefCell;
use std::collections::HashMap;
#[cfg(feature = "tokio")]
use std::time::Duration;

use crate::document::{locate, IconDocument, IconLink, LinkKey};
use crate::encode::encode_data_uri;
use crate::error::FaviconError;
use crate::icon::{resolve_size, IconSize};
use crate::layer::{apply_badge, apply_filters, BadgeColor, Filter, DEFAULT_BADGE_COLOR};
use crate::loader::{ImageLoader, LoadedImage};

// ============================================================================
// IconConfiguration
// ============================================================================

/// Settings for a single render.
///
/// `L` is the document's link type. Every field is optional; the default
/// configuration re-encodes the page icon at the size its `sizes` attribute
/// declares, without filters or badge.
#[derive(Debug)]
pub struct IconConfiguration<L> {
    /// Link to rewrite. `None` searches the document for `[rel="icon"]`.
    pub target: Option<L>,

    /// Output size. `None` reads the link's `sizes` attribute, else 16.
    pub size: Option<IconSize>,

    /// Whether to draw the notification badge.
    pub show_notification: bool,

    /// Badge colour as a CSS colour string. `None` means red.
    pub notification_color: Option<String>,

    /// Filters applied in order before the badge.
    pub filters: Vec<Box<dyn Filter>>,
}

impl<L> Default for IconConfiguration<L> {
    fn default() -> Self {
        Self {
            target: None,
            size: None,
            show_notification: false,
            notification_color: None,
            filters: Vec::new(),
        }
    }
}

impl<L> IconConfiguration<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders into `target` instead of the document's icon link.
    pub fn with_target(mut self, target: L) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_size(mut self, size: IconSize) -> Self {
        self.size = Some(size);
        self
    }

    /// Toggles the notification badge.
    pub fn with_notification(mut self, show: bool) -> Self {
        self.show_notification = show;
        self
    }

    /// Sets the badge colour. Does not enable the badge by itself.
    pub fn with_notification_color(mut self, color: impl Into<String>) -> Self {
        self.notification_color = Some(color.into());
        self
    }

    /// Appends a filter to the pipeline.
    pub fn with_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Resolves the badge colour, `None` when no badge is drawn.
    fn badge_color(&self) -> Result<Option<BadgeColor>, FaviconError> {
        if !self.show_notification {
            return Ok(None);
        }
        let color = self.notification_color.as_deref().unwrap_or(DEFAULT_BADGE_COLOR);
        BadgeColor::parse(color).map(Some)
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Why a render finished without doing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No target was given and the document has no icon link.
    MissingTarget,
    /// The link has no `href`, or an empty one.
    MissingSource,
}

/// How a render that did not fail ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The link's `href` now holds `href`, an icon of `size`.
    Applied { size: IconSize, href: String },
    /// Nothing was loaded and nothing was written.
    Skipped(SkipReason),
    /// A newer render of the same link, or a cancel, overtook this one
    /// while it was loading. Nothing was written.
    Superseded,
}

impl RenderOutcome {
    /// Returns true if the link was rewritten.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

// ============================================================================
// RendererOptions
// ============================================================================

/// Renderer-wide settings.
#[derive(Debug, Clone, Default)]
pub struct RendererOptions {
    /// Upper bound on waiting for the icon to load. `None` waits forever.
    #[cfg(feature = "tokio")]
    pub load_timeout: Option<Duration>,
}

// ============================================================================
// FaviconRenderer
// ============================================================================

/// Rewrites a document's favicon.
///
/// The renderer owns its document and loader capabilities, and a generation
/// counter per icon link. Each render takes the next generation for its link
/// before it starts loading; when the load completes it only writes if no
/// newer render (or [`cancel`](Self::cancel)) has happened for that link in
/// the meantime. Overlapping renders of one link therefore resolve to the
/// most recently started one, whatever order their loads finish in.
///
/// # Example
///
/// ```
/// use favicon_renderer::{
///     DataUriLoader, FaviconRenderer, Grayscale, IconConfiguration, MemoryDocument,
///     RenderOutcome,
/// };
///
/// # tokio_test_block_on(async {
/// let document = MemoryDocument::new();
/// let link = document.add_icon(
///     "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='1' height='1'/%3E",
///     Some("32x32"),
/// );
///
/// let renderer = FaviconRenderer::new(document, DataUriLoader);
/// let config = IconConfiguration::new()
///     .with_filter(Grayscale)
///     .with_notification(true);
///
/// let outcome = renderer.render(&config).await.unwrap();
/// assert!(outcome.is_applied());
/// assert_eq!(link.href_writes(), 1);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(f)
/// # }
/// ```
pub struct FaviconRenderer<D, I> {
    document: D,
    loader: I,
    options: RendererOptions,
    generations: RefCell<HashMap<LinkKey, u64>>,
}

impl<D: IconDocument, I: ImageLoader> FaviconRenderer<D, I> {
    /// Creates a renderer with default options.
    pub fn new(document: D, loader: I) -> Self {
        Self::with_options(document, loader, RendererOptions::default())
    }

    pub fn with_options(document: D, loader: I, options: RendererOptions) -> Self {
        Self {
            document,
            loader,
            options,
            generations: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the document this renderer rewrites.
    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    /// Renders the favicon and writes it to the link's `href`.
    ///
    /// This is the main entry point. It:
    /// 1. Resolves the link, skipping if there is none or it has no `href`
    /// 2. Resolves the size and validates the badge colour
    /// 3. Loads the current icon (the only await point)
    /// 4. Draws it scaled into a fresh surface
    /// 5. Applies each filter in order, then the badge
    /// 6. Encodes a PNG data URI and writes it, unless superseded
    ///
    /// The link is written at most once, and only after every step succeeded.
    pub async fn render(
        &self,
        config: &IconConfiguration<D::Link>,
    ) -> Result<RenderOutcome, FaviconError> {
        let Some(link) = locate(config.target.as_ref(), &self.document) else {
            tracing::debug!("no icon link found, skipping render");
            return Ok(RenderOutcome::Skipped(SkipReason::MissingTarget));
        };
        let Some(url) = link.source() else {
            tracing::debug!(link = ?link.key(), "icon link has no href, skipping render");
            return Ok(RenderOutcome::Skipped(SkipReason::MissingSource));
        };

        let size = resolve_size(config.size, link.attribute("sizes").as_deref());
        let badge = config.badge_color()?;

        let key = link.key();
        let generation = self.begin(key);
        tracing::debug!(link = ?key, generation, size = size.pixels(), "loading icon");

        let loaded = self.load(&url).await?;

        if !self.is_current(key, generation) {
            tracing::debug!(link = ?key, generation, "render superseded");
            return Ok(RenderOutcome::Superseded);
        }

        let surface = loaded.into_surface(size.pixels())?;
        let surface = apply_filters(surface, &config.filters)?;
        let surface = match badge {
            Some(color) => apply_badge(surface, color)?,
            None => surface,
        };
        let href = encode_data_uri(&surface)?;

        link.set_href(&href)?;
        tracing::info!(
            link = ?key,
            size = size.pixels(),
            filters = config.filters.len(),
            badge = badge.is_some(),
            "favicon updated"
        );

        Ok(RenderOutcome::Applied { size, href })
    }

    /// Abandons every in-flight render of `link`.
    ///
    /// Renders that are still loading complete as
    /// [`RenderOutcome::Superseded`] without touching the link.
    pub fn cancel(&self, link: &D::Link) {
        let generation = self.begin(link.key());
        tracing::debug!(link = ?link.key(), generation, "cancelled pending renders");
    }

    fn begin(&self, key: LinkKey) -> u64 {
        let mut generations = self.generations.borrow_mut();
        let generation = generations.entry(key).or_insert(0);
        *generation += 1;
        *generation
    }

    fn is_current(&self, key: LinkKey, generation: u64) -> bool {
        self.generations.borrow().get(&key) == Some(&generation)
    }

    async fn load(&self, url: &str) -> Result<LoadedImage, FaviconError> {
        #[cfg(feature = "tokio")]
        if let Some(timeout) = self.options.load_timeout {
            return match tokio::time::timeout(timeout, self.loader.load(url)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(?timeout, "icon load timed out");
                    Err(FaviconError::LoadTimedOut {
                        url: url.chars().take(64).collect(),
                        timeout,
                    })
                }
            };
        }

        self.loader.load(url).await
    }
}

// ============================================================================
// Tests
// ============================================================================
