//! Error types for document construction and editing.
//!
//! The page behaviors themselves never fail: a missing TOC, an unresolved
//! heading or a dangling footnote reference degrade to "feature does not
//! activate". Errors only surface where markup enters the crate.

use core::fmt;

/// Errors produced while building or editing a document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnhanceError {
    /// Markup could not be tokenized or decoded.
    Markup {
        /// Stable machine-readable code.
        code: &'static str,
        /// Human-readable message.
        message: Box<str>,
        /// Byte offset in the markup where the tokenizer stopped.
        offset: usize,
    },
    /// A node handle does not belong to the tree it was used with.
    UnknownNode(usize),
    /// The host document rejected an operation.
    Dom {
        /// Operation that failed, e.g. `createElement`.
        operation: &'static str,
        /// Message reported by the host.
        message: Box<str>,
    },
}

impl EnhanceError {
    pub(crate) fn markup(code: &'static str, message: impl Into<String>, offset: usize) -> Self {
        Self::Markup {
            code,
            message: message.into().into_boxed_str(),
            offset,
        }
    }

    /// Host DOM failure for `operation`.
    pub fn dom(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Dom {
            operation,
            message: message.into().into_boxed_str(),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Markup { code, .. } => code,
            Self::UnknownNode(_) => "UNKNOWN_NODE",
            Self::Dom { .. } => "DOM_ERROR",
        }
    }
}

impl fmt::Display for EnhanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markup {
                code,
                message,
                offset,
            } => write!(f, "{}: {} [offset={}]", code, message, offset),
            Self::UnknownNode(index) => write!(f, "UNKNOWN_NODE: no node #{} in tree", index),
            Self::Dom { operation, message } => write!(f, "DOM_ERROR: {} failed: {}", operation, message),
        }
    }
}

impl std::error::Error for EnhanceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_offset() {
        let err = EnhanceError::markup("MARKUP_TOKENIZE_ERROR", "unexpected end", 42);
        assert_eq!(
            err.to_string(),
            "MARKUP_TOKENIZE_ERROR: unexpected end [offset=42]"
        );
        assert_eq!(err.code(), "MARKUP_TOKENIZE_ERROR");
    }

    #[test]
    fn unknown_node_has_stable_code() {
        let err = EnhanceError::UnknownNode(7);
        assert_eq!(err.code(), "UNKNOWN_NODE");
        assert!(err.to_string().contains("#7"));
    }

    #[test]
    fn dom_error_names_operation() {
        let err = EnhanceError::dom("createElement", "InvalidCharacterError");
        assert_eq!(err.code(), "DOM_ERROR");
        assert_eq!(
            err.to_string(),
            "DOM_ERROR: createElement failed: InvalidCharacterError"
        );
    }
}
