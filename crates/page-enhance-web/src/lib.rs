//! Browser host for `page-enhance`.
//!
//! Binds the scrollspy and footnote tooltips to the live page: the document
//! port is backed by `web-sys` elements, geometry by the window, and listeners
//! by `wasm-bindgen` closures.
//!
//! With the default `autostart` feature the module enhances the page as soon
//! as it is instantiated, waiting for `DOMContentLoaded` when the document is
//! still loading. Without it, call `enhance` yourself:
//!
//! ```javascript
//! import init, { enhance } from 'page-enhance-web';
//!
//! await init();
//! const summary = enhance({ scrollspy: { scroll_margin: 64 } });
//! ```
//!
//! Option objects mirror `EnhanceOptions`; omitted fields keep their defaults.

mod dom;
mod error;
mod events;
mod viewport;

pub use dom::WebDocument;
pub use error::{ErrorCode, WebError};
pub use events::WebEvents;
pub use viewport::WebViewport;

use page_enhance::{
    decorate_footnotes, enhance_page, Document, DocumentTree, EnhanceOptions, EnhanceReport,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::error::js_message;

/// What one enhancement run did, as handed to JavaScript.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceSummary {
    /// Footnote references wrapped with a tooltip.
    pub footnotes_decorated: usize,
    /// Footnote references left alone.
    pub footnotes_skipped: usize,
    /// Whether a TOC was found and listeners attached.
    pub scrollspy_active: bool,
    /// TOC links bound.
    pub toc_links: usize,
    /// Headings resolved from those links.
    pub headings: usize,
    /// DOM listeners attached.
    pub listeners: usize,
}

impl EnhanceSummary {
    fn new(report: EnhanceReport, listeners: usize) -> Self {
        Self {
            footnotes_decorated: report.footnotes.decorated,
            footnotes_skipped: report.footnotes.skipped,
            scrollspy_active: report.scrollspy_active,
            toc_links: report.toc_links,
            headings: report.headings,
            listeners,
        }
    }
}

/// Initialize the module.
///
/// Installs the panic hook and, with `autostart`, enhances the page using
/// default options.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    #[cfg(feature = "console-logging")]
    {
        console_log::init_with_level(log::Level::Debug).ok();
    }

    #[cfg(feature = "autostart")]
    {
        if let Err(err) = boot(EnhanceOptions::default()) {
            log::warn!("page enhancement skipped: {}", err.message());
        }
    }
}

/// Enhance the current page.
///
/// Returns a summary object, or `undefined` when the document is still loading
/// and the work has been deferred to `DOMContentLoaded`.
#[wasm_bindgen]
pub fn enhance(options: JsValue) -> Result<JsValue, JsValue> {
    let options = options_from_js(options)?;
    match boot(options)? {
        Some(summary) => Ok(serde_wasm_bindgen::to_value(&summary).map_err(WebError::from)?),
        None => Ok(JsValue::UNDEFINED),
    }
}

/// Add footnote tooltips to an HTML string, for pages rendered ahead of time.
#[wasm_bindgen(js_name = renderFootnoteTooltips)]
pub fn render_footnote_tooltips(html: &str, options: JsValue) -> Result<String, JsValue> {
    let options = options_from_js(options)?;
    let mut tree = DocumentTree::parse_html(html).map_err(WebError::from)?;
    decorate_footnotes(&mut tree, &options.footnotes);
    Ok(tree.to_html())
}

/// Send crate logs at or above `level` (`"error"` … `"trace"`, or `"off"`)
/// to the browser console.
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter = level
        .parse::<log::LevelFilter>()
        .map_err(|err| WebError::new(ErrorCode::Options, format!("log level {:?}: {}", level, err)))?;
    if let Some(level) = filter.to_level() {
        // Only the first call installs the logger; later calls just move the filter.
        console_log::init_with_level(level).ok();
    }
    log::set_max_level(filter);
    Ok(())
}

/// Get the version of the page-enhance-web library.
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn options_from_js(value: JsValue) -> Result<EnhanceOptions, WebError> {
    if value.is_undefined() || value.is_null() {
        return Ok(EnhanceOptions::default());
    }
    Ok(serde_wasm_bindgen::from_value(value)?)
}

fn boot(options: EnhanceOptions) -> Result<Option<EnhanceSummary>, WebError> {
    let window =
        web_sys::window().ok_or_else(|| WebError::new(ErrorCode::NoWindow, "no global window"))?;
    let raw = window
        .document()
        .ok_or_else(|| WebError::new(ErrorCode::NoDocument, "window has no document"))?;

    if WebDocument::new(raw.clone()).ready_state().is_ready() {
        return Ok(Some(run(window, raw, &options)));
    }

    log::debug!("document still loading; waiting for DOMContentLoaded");
    let target = raw.clone();
    let deferred = Closure::once_into_js(move || {
        run(window, raw, &options);
    });
    target
        .add_event_listener_with_callback("DOMContentLoaded", deferred.unchecked_ref())
        .map_err(|err| WebError::new(ErrorCode::Dom, js_message(&err)))?;
    Ok(None)
}

fn run(window: Window, raw: web_sys::Document, options: &EnhanceOptions) -> EnhanceSummary {
    let mut document = WebDocument::new(raw.clone());
    let mut viewport = WebViewport::new(window.clone(), raw);
    let mut events = WebEvents::new(window, document.clone(), viewport.clone());
    let (report, _scrollspy) = enhance_page(&mut document, &mut viewport, &mut events, options);
    let summary = EnhanceSummary::new(report, events.attached());
    log::info!(
        "page enhanced: {} footnotes, {} toc links, {} listeners",
        summary.footnotes_decorated,
        summary.toc_links,
        summary.listeners
    );
    summary
}
