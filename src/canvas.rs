//! Browser bindings for WASM environments.
//!
//! This module provides [`WebDocument`] and [`WebImageLoader`], the DOM
//! backed capabilities a [`FaviconRenderer`] needs in a real page, plus the
//! JavaScript entry points.
//!
//! # Feature Flag
//!
//! This module is only available with the `web` feature enabled:
//!
//! ```toml
//! [dependencies]
//! favicon-renderer = { version = "0.1", features = ["web"] }
//! ```
//!
//! # Example (JavaScript/TypeScript)
//!
//! ```javascript
//! import init, { favicon, faviconFor, grayscaleFilter } from 'favicon-renderer';
//!
//! await init();
//!
//! // Badge the page icon and gray it out
//! await favicon({ showNotification: true, filters: [{ kind: 'grayscale' }] });
//!
//! // Or target a specific link element
//! const link = document.querySelector('link[rel="icon"][sizes="32x32"]');
//! await faviconFor(link, { size: 32, showNotification: true, notificationColor: '#0a0' });
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use image::RgbaImage;
use js_sys::{Promise, WeakMap};
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlImageElement,
    HtmlLinkElement, ImageData,
};

use crate::document::{IconDocument, IconLink, LinkKey};
use crate::error::FaviconError;
use crate::icon::Surface;
use crate::layer::grayscale;
use crate::loader::{ImageLoader, LoadedImage};
use crate::profile::FaviconSettings;
use crate::renderer::{FaviconRenderer, RenderOutcome, SkipReason};

type WebRenderer = FaviconRenderer<WebDocument, WebImageLoader>;

thread_local! {
    static NEXT_KEY: Cell<u64> = const { Cell::new(0) };
    // Element -> key, held weakly so removed links can be collected.
    static LINK_KEYS: WeakMap = WeakMap::new();
    static RENDERER: RefCell<Option<Rc<WebRenderer>>> = const { RefCell::new(None) };
}

fn js_failure(context: &str, value: JsValue) -> FaviconError {
    FaviconError::Document(format!("{context}: {value:?}"))
}

// ============================================================================
// WebDocument
// ============================================================================

/// The browser document.
#[derive(Debug, Clone)]
pub struct WebDocument {
    document: Document,
}

impl WebDocument {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Returns the document of the current window.
    pub fn from_window() -> Result<Self, FaviconError> {
        web_sys::window()
            .and_then(|window| window.document())
            .map(Self::new)
            .ok_or_else(|| FaviconError::Document("no document available".to_owned()))
    }
}

impl IconDocument for WebDocument {
    type Link = WebLink;

    fn query_icon_link(&self) -> Option<WebLink> {
        self.document
            .query_selector("[rel=\"icon\"]")
            .ok()
            .flatten()
            .map(WebLink::new)
    }
}

/// A `<link>` element in the browser document.
#[derive(Debug, Clone)]
pub struct WebLink {
    element: Element,
}

impl WebLink {
    pub fn new(element: Element) -> Self {
        Self { element }
    }
}

impl From<HtmlLinkElement> for WebLink {
    fn from(link: HtmlLinkElement) -> Self {
        Self::new(link.unchecked_into())
    }
}

impl IconLink for WebLink {
    /// Keys are assigned the first time an element is seen and never
    /// written to the DOM.
    fn key(&self) -> LinkKey {
        LINK_KEYS.with(|keys| {
            let element: &js_sys::Object = self.element.as_ref();
            if let Some(key) = keys.get(element).as_f64() {
                return LinkKey(key as u64);
            }

            let key = NEXT_KEY.with(|next| {
                let key = next.get() + 1;
                next.set(key);
                key
            });
            keys.set(element, &JsValue::from_f64(key as f64));
            LinkKey(key)
        })
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn set_href(&self, href: &str) -> Result<(), FaviconError> {
        self.element
            .set_attribute("href", href)
            .map_err(|e| js_failure("failed to set href", e))
    }
}

// ============================================================================
// WebImageLoader
// ============================================================================

/// Loads icons through an `<img>` element and reads the pixels back from a
/// 2D canvas.
///
/// The browser fetches and decodes the image. Icons served from another
/// origin without CORS headers taint the canvas and fail to load.
#[derive(Debug, Clone)]
pub struct WebImageLoader {
    document: Document,
}

impl WebImageLoader {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn context_2d(&self, width: u32, height: u32) -> Result<CanvasRenderingContext2d, FaviconError> {
        let canvas: HtmlCanvasElement = self
            .document
            .create_element("canvas")
            .map_err(|e| js_failure("failed to create canvas", e))?
            .dyn_into()
            .map_err(|_| FaviconError::Document("element is not a canvas".to_owned()))?;
        canvas.set_width(width);
        canvas.set_height(height);

        canvas
            .get_context("2d")
            .map_err(|e| js_failure("failed to get 2d context", e))?
            .ok_or_else(|| FaviconError::Document("canvas 2d context is null".to_owned()))?
            .dyn_into()
            .map_err(|_| FaviconError::Document("failed to cast to CanvasRenderingContext2d".to_owned()))
    }
}

#[async_trait(?Send)]
impl ImageLoader for WebImageLoader {
    async fn load(&self, url: &str) -> Result<LoadedImage, FaviconError> {
        let load_error = |reason: String| FaviconError::Load {
            url: url.chars().take(64).collect(),
            reason,
        };

        let image = HtmlImageElement::new().map_err(|e| load_error(format!("{e:?}")))?;
        let loaded = Promise::new(&mut |resolve, reject| {
            image.set_onload(Some(&resolve));
            image.set_onerror(Some(&reject));
        });
        image.set_src(url);

        let result = JsFuture::from(loaded).await;
        image.set_onload(None);
        image.set_onerror(None);
        result.map_err(|_| load_error("image failed to load".to_owned()))?;

        let (width, height) = (image.natural_width(), image.natural_height());
        if width == 0 || height == 0 {
            return Err(FaviconError::EmptySurface);
        }

        let ctx = self.context_2d(width, height)?;
        ctx.draw_image_with_html_image_element(&image, 0.0, 0.0)
            .map_err(|e| js_failure("failed to draw image", e))?;
        let data = ctx
            .get_image_data(0.0, 0.0, width as f64, height as f64)
            .map_err(|e| load_error(format!("failed to read pixels: {e:?}")))?;

        RgbaImage::from_raw(width, height, data.data().0)
            .map(LoadedImage::Pixels)
            .ok_or_else(|| load_error("pixel buffer has the wrong length".to_owned()))
    }
}

// ============================================================================
// JavaScript Entry Points
// ============================================================================

fn shared_renderer() -> Result<Rc<WebRenderer>, JsError> {
    RENDERER.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(renderer) = slot.as_ref() {
            return Ok(Rc::clone(renderer));
        }

        let document = WebDocument::from_window()?;
        let loader = WebImageLoader::new(document.document.clone());
        let renderer = Rc::new(FaviconRenderer::new(document, loader));
        *slot = Some(Rc::clone(&renderer));
        Ok(renderer)
    })
}

fn parse_settings(settings: JsValue) -> Result<FaviconSettings, JsError> {
    if settings.is_undefined() || settings.is_null() {
        return Ok(FaviconSettings::default());
    }
    serde_wasm_bindgen::from_value(settings)
        .map_err(|e| JsError::new(&format!("Invalid favicon settings: {}", e)))
}

fn outcome_label(outcome: &RenderOutcome) -> &'static str {
    match outcome {
        RenderOutcome::Applied { .. } => "applied",
        RenderOutcome::Skipped(SkipReason::MissingTarget) => "missing-target",
        RenderOutcome::Skipped(SkipReason::MissingSource) => "missing-source",
        RenderOutcome::Superseded => "superseded",
    }
}

async fn render_with(target: Option<WebLink>, settings: JsValue) -> Result<JsValue, JsError> {
    let renderer = shared_renderer()?;
    let config = parse_settings(settings)?.into_configuration(target);
    let outcome = renderer.render(&config).await?;
    Ok(JsValue::from_str(outcome_label(&outcome)))
}

/// Rewrites the page's `[rel="icon"]` link.
///
/// Resolves to `"applied"`, `"missing-target"`, `"missing-source"` or
/// `"superseded"`; rejects if loading, a filter or encoding fails.
#[wasm_bindgen]
pub async fn favicon(settings: JsValue) -> Result<JsValue, JsError> {
    render_with(None, settings).await
}

/// Rewrites the given link element instead of searching the page.
#[wasm_bindgen(js_name = "faviconFor")]
pub async fn favicon_for(target: HtmlLinkElement, settings: JsValue) -> Result<JsValue, JsError> {
    render_with(Some(target.into()), settings).await
}

/// Converts a canvas to grayscale in place and returns it for chaining.
#[wasm_bindgen(js_name = "grayscaleFilter")]
pub fn grayscale_filter(canvas: &HtmlCanvasElement) -> Result<HtmlCanvasElement, JsError> {
    let (width, height) = (canvas.width(), canvas.height());

    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(|_| JsError::new("Failed to get 2d context"))?
        .ok_or_else(|| JsError::new("Canvas 2d context is null"))?
        .dyn_into()
        .map_err(|_| JsError::new("Failed to cast to CanvasRenderingContext2d"))?;

    let source = ctx
        .get_image_data(0.0, 0.0, width as f64, height as f64)
        .map_err(|_| JsError::new("Failed to read image data"))?;
    let pixels = RgbaImage::from_raw(width, height, source.data().0)
        .ok_or_else(|| JsError::new("Image data has the wrong length"))?;

    let raw_pixels = grayscale(Surface::from_image(pixels)).into_image().into_raw();
    let image_data =
        ImageData::new_with_u8_clamped_array_and_sh(Clamped(&raw_pixels), width, height)
            .map_err(|_| JsError::new("Failed to create ImageData"))?;

    ctx.put_image_data(&image_data, 0.0, 0.0)
        .map_err(|_| JsError::new("Failed to put image data"))?;

    Ok(canvas.clone())
}
