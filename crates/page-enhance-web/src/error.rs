//! Error handling for the browser host.
//!
//! Everything that can fail while wiring the page is reported to JavaScript as
//! an `Error` carrying a stable `code` property.

use page_enhance::EnhanceError;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Error codes for JavaScript consumption.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// No global `window` (workers, Node.js).
    NoWindow,
    /// The window has no document.
    NoDocument,
    /// The options object did not match the expected shape.
    Options,
    /// Markup could not be parsed.
    Markup,
    /// The DOM rejected an operation.
    Dom,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NoWindow => "NO_WINDOW",
            ErrorCode::NoDocument => "NO_DOCUMENT",
            ErrorCode::Options => "OPTIONS_ERROR",
            ErrorCode::Markup => "MARKUP_ERROR",
            ErrorCode::Dom => "DOM_ERROR",
        }
    }
}

/// A JavaScript-friendly error.
#[derive(Debug)]
pub struct WebError {
    code: ErrorCode,
    message: String,
}

impl WebError {
    /// Create an error with `code` and `message`.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<EnhanceError> for WebError {
    fn from(err: EnhanceError) -> Self {
        let code = match &err {
            EnhanceError::Markup { .. } => ErrorCode::Markup,
            EnhanceError::UnknownNode(_) | EnhanceError::Dom { .. } => ErrorCode::Dom,
        };
        Self::new(code, err.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for WebError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        Self::new(ErrorCode::Options, err.to_string())
    }
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        let js_error = js_sys::Error::new(&err.message);
        js_sys::Reflect::set(
            &js_error,
            &"code".into(),
            &JsValue::from_str(err.code.as_str()),
        )
        .ok();
        js_error.into()
    }
}

/// Best-effort message of a thrown JavaScript value.
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(message) = value.as_string() {
        return message;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{:?}", value)
}
