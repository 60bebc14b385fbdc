//! Window geometry and scrolling.

use page_enhance::{ScrollBehavior, ScrollRequest, Scroller, ViewportGeometry};
use web_sys::{Element, ScrollToOptions, Window};

/// Geometry of the browser window.
///
/// Offsets come from `getBoundingClientRect`, the viewport height from
/// `innerHeight` and the document height from `document.body.scrollHeight`.
#[derive(Clone, Debug)]
pub struct WebViewport {
    window: Window,
    document: web_sys::Document,
}

impl WebViewport {
    /// Viewport of `window`, measuring `document`.
    pub fn new(window: Window, document: web_sys::Document) -> Self {
        Self { window, document }
    }
}

impl ViewportGeometry for WebViewport {
    type Node = Element;

    fn top_offset_of(&self, node: &Element) -> f64 {
        node.get_bounding_client_rect().top()
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0)
    }

    fn document_height(&self) -> f64 {
        self.document
            .body()
            .map(|body| f64::from(body.scroll_height()))
            .unwrap_or(0.0)
    }

    fn current_scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }
}

impl Scroller for WebViewport {
    fn scroll_to(&mut self, request: ScrollRequest) {
        let options = ScrollToOptions::new();
        options.set_top(request.top);
        options.set_behavior(match request.behavior {
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }
}
