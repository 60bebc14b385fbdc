//! Real DOM listeners.
//!
//! Each subscription becomes a `wasm-bindgen` closure registered with the
//! window (scroll) or the element (click). The page never tears enhancements
//! down, so closures are leaked with `forget` once attached.

use page_enhance::{EventSource, EventTarget, Listener, PageEvent};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::dom::WebDocument;
use crate::error::js_message;
use crate::viewport::WebViewport;

/// Event source backed by `addEventListener`.
pub struct WebEvents {
    window: Window,
    document: WebDocument,
    viewport: WebViewport,
    attached: usize,
}

impl WebEvents {
    /// Listeners will receive copies of `document` and `viewport`.
    pub fn new(window: Window, document: WebDocument, viewport: WebViewport) -> Self {
        Self {
            window,
            document,
            viewport,
            attached: 0,
        }
    }

    /// Number of listeners attached so far.
    pub fn attached(&self) -> usize {
        self.attached
    }
}

impl EventSource<WebDocument, WebViewport> for WebEvents {
    fn subscribe(
        &mut self,
        target: EventTarget<web_sys::Element>,
        mut listener: Listener<WebDocument, WebViewport>,
    ) {
        let kind = target.kind();
        let mut document = self.document.clone();
        let mut viewport = self.viewport.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let mut page_event = PageEvent::new(kind);
            listener(&mut document, &mut viewport, &mut page_event);
            if page_event.default_prevented() {
                event.prevent_default();
            }
        });

        let result = match &target {
            EventTarget::Scroll => self
                .window
                .add_event_listener_with_callback("scroll", callback.as_ref().unchecked_ref()),
            EventTarget::Click(element) => {
                element.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())
            }
        };
        match result {
            Ok(()) => {
                self.attached += 1;
                callback.forget();
            }
            Err(err) => log::warn!("addEventListener({:?}) failed: {}", kind, js_message(&err)),
        }
    }
}
