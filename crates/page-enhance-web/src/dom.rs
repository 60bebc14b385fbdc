//! [`Document`] over the live browser DOM.

use page_enhance::{Document, EnhanceError, ReadyState};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlCollection};

use crate::error::js_message;

/// Handle to the page's `document`.
#[derive(Clone, Debug)]
pub struct WebDocument {
    document: web_sys::Document,
}

impl WebDocument {
    /// Wrap `document`.
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    /// The wrapped document.
    pub fn raw(&self) -> &web_sys::Document {
        &self.document
    }
}

fn collect(collection: HtmlCollection) -> Vec<Element> {
    (0..collection.length())
        .filter_map(|idx| collection.item(idx))
        .collect()
}

fn log_failure(operation: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        log::warn!("{} failed: {}", operation, js_message(&err));
    }
}

impl Document for WebDocument {
    type Node = Element;

    fn ready_state(&self) -> ReadyState {
        ReadyState::from_str(&self.document.ready_state())
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn elements_by_class(&self, class: &str) -> Vec<Element> {
        collect(self.document.get_elements_by_class_name(class))
    }

    fn descendants_by_tag(&self, root: &Element, tag: &str) -> Vec<Element> {
        collect(root.get_elements_by_tag_name(tag))
    }

    fn first_descendant_by_class(&self, root: &Element, class: &str) -> Option<Element> {
        root.get_elements_by_class_name(class).item(0)
    }

    fn closest_by_tag(&self, node: &Element, tag: &str) -> Option<Element> {
        node.closest(tag).ok().flatten()
    }

    fn closest_by_class(&self, node: &Element, class: &str) -> Option<Element> {
        let mut current = Some(node.clone());
        while let Some(element) = current {
            if element.class_list().contains(class) {
                return Some(element);
            }
            current = element.parent_element();
        }
        None
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) {
        log_failure("setAttribute", node.set_attribute(name, value));
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&mut self, node: &Element, class: &str) {
        log_failure("classList.add", node.class_list().add_1(class));
    }

    fn remove_class(&mut self, node: &Element, class: &str) {
        log_failure("classList.remove", node.class_list().remove_1(class));
    }

    fn set_class_name(&mut self, node: &Element, value: &str) {
        node.set_class_name(value);
    }

    fn text_content(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text_content(&mut self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn inner_markup(&self, node: &Element) -> String {
        node.inner_html()
    }

    fn outer_markup(&self, node: &Element) -> String {
        node.outer_html()
    }

    fn set_inner_markup(&mut self, node: &Element, markup: &str) -> Result<(), EnhanceError> {
        node.set_inner_html(markup);
        Ok(())
    }

    fn create_element(&mut self, tag: &str) -> Result<Element, EnhanceError> {
        self.document
            .create_element(tag)
            .map_err(|err| EnhanceError::dom("createElement", js_message(&err)))
    }

    fn deep_clone(&mut self, node: &Element) -> Result<Element, EnhanceError> {
        node.clone_node_with_deep(true)
            .map_err(|err| EnhanceError::dom("cloneNode", js_message(&err)))?
            .dyn_into::<Element>()
            .map_err(|_| EnhanceError::dom("cloneNode", "clone is not an element"))
    }

    fn append_child(&mut self, parent: &Element, child: &Element) {
        log_failure("appendChild", parent.append_child(child).map(|_| ()));
    }

    fn replace_with(&mut self, node: &Element, replacement: &Element) {
        log_failure("replaceWith", node.replace_with_with_node_1(replacement));
    }

    fn remove(&mut self, node: &Element) {
        node.remove();
    }
}
