//! Document port.
//!
//! The behaviors never reach for a global document. They take a
//! [`Document`] and work through its handle type, so the same code drives the
//! in-memory [`DocumentTree`](crate::tree::DocumentTree) in tests and a real
//! browser document in `page-enhance-web`.

use crate::error::EnhanceError;

/// Parsing progress of the host document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReadyState {
    /// Still parsing; enhancements must wait.
    Loading,
    /// Parsed; subresources may still be loading.
    Interactive,
    /// Fully loaded.
    #[default]
    Complete,
}

impl ReadyState {
    /// Map a `document.readyState` string. Unknown values count as complete.
    pub fn from_str(value: &str) -> Self {
        match value {
            "loading" => Self::Loading,
            "interactive" => Self::Interactive,
            _ => Self::Complete,
        }
    }

    /// Whether enhancements may run now.
    pub fn is_ready(self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// A queryable, mutable element tree.
///
/// Lookups return handles in document order. Mutations on a handle that does
/// not belong to the document are ignored; implementations may log them.
pub trait Document {
    /// Element handle. Cheap to clone; equal handles refer to the same node.
    type Node: Clone + PartialEq + core::fmt::Debug;

    /// Current parsing state.
    fn ready_state(&self) -> ReadyState;

    /// First element whose `id` attribute equals `id`.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// All elements carrying `class`, in document order.
    fn elements_by_class(&self, class: &str) -> Vec<Self::Node>;

    /// Descendants of `root` (excluding `root`) with tag `tag`, in document order.
    fn descendants_by_tag(&self, root: &Self::Node, tag: &str) -> Vec<Self::Node>;

    /// First descendant of `root` (excluding `root`) carrying `class`.
    fn first_descendant_by_class(&self, root: &Self::Node, class: &str) -> Option<Self::Node>;

    /// Nearest inclusive ancestor of `node` with tag `tag`.
    fn closest_by_tag(&self, node: &Self::Node, tag: &str) -> Option<Self::Node>;

    /// Nearest inclusive ancestor of `node` carrying `class`.
    fn closest_by_class(&self, node: &Self::Node, class: &str) -> Option<Self::Node>;

    /// Attribute value, if present.
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Set an attribute, replacing an existing value.
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    /// Whether `node`'s class list contains `class`.
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Add `class` to `node`'s class list (no-op when present).
    fn add_class(&mut self, node: &Self::Node, class: &str);

    /// Remove `class` from `node`'s class list (no-op when absent).
    fn remove_class(&mut self, node: &Self::Node, class: &str);

    /// Replace the whole `class` attribute.
    fn set_class_name(&mut self, node: &Self::Node, value: &str);

    /// Concatenated text of `node` and its descendants.
    fn text_content(&self, node: &Self::Node) -> String;

    /// Replace `node`'s children with a single text node.
    fn set_text_content(&mut self, node: &Self::Node, text: &str);

    /// Serialized markup of `node`'s children.
    fn inner_markup(&self, node: &Self::Node) -> String;

    /// Serialized markup of `node` itself.
    fn outer_markup(&self, node: &Self::Node) -> String;

    /// Replace `node`'s children with parsed `markup`.
    fn set_inner_markup(&mut self, node: &Self::Node, markup: &str) -> Result<(), EnhanceError>;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> Result<Self::Node, EnhanceError>;

    /// Detached deep copy of `node`, attributes included.
    fn deep_clone(&mut self, node: &Self::Node) -> Result<Self::Node, EnhanceError>;

    /// Append `child` as the last child of `parent`, detaching it first.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Put `replacement` where `node` is and detach `node`.
    fn replace_with(&mut self, node: &Self::Node, replacement: &Self::Node);

    /// Detach `node` from its parent.
    fn remove(&mut self, node: &Self::Node);
}

/// Strip the leading `#` from a same-page fragment reference.
///
/// Returns `None` for anything that is not a same-page fragment.
pub fn fragment_id(href: &str) -> Option<&str> {
    href.strip_prefix('#')
}
