//! In-memory document tree.
//!
//! An arena of element and text nodes built from HTML with `quick-xml`. The
//! tokenizer is XML-based, so parsing is lenient in the ways rendered HTML
//! needs: void elements (`<br>`, `<img>`) never take children, mismatched end
//! tags close the nearest open element with that name, stray end tags are
//! dropped, attributes may be unquoted or bare, a lone `&` is plain text,
//! `<script>`/`<style>` bodies are raw text, and every HTML5 named entity is
//! decoded.
//!
//! Detached nodes (fresh elements, clones, replaced nodes) stay in the arena
//! but are invisible to document-wide lookups.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::dom::{Document, ReadyState};
use crate::error::EnhanceError;

/// Handle to a node inside one [`DocumentTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
enum NodeData {
    Root,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    /// Body of `<script>`/`<style>`, serialized unescaped.
    RawText(String),
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// Arena-backed HTML tree implementing [`Document`].
#[derive(Clone, Debug)]
pub struct DocumentTree {
    nodes: Vec<Node>,
    root: NodeId,
    ready_state: ReadyState,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

impl DocumentTree {
    /// Empty tree with only the document root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::with_capacity(8),
                data: NodeData::Root,
            }],
            root: NodeId(0),
            ready_state: ReadyState::Complete,
        }
    }

    /// Parse an HTML document or fragment.
    pub fn parse_html(html: &str) -> Result<Self, EnhanceError> {
        let mut tree = Self::new();
        let root = tree.root;
        tree.parse_into(root, html)?;
        Ok(tree)
    }

    /// Document root. Its children are the top-level parsed nodes.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Override the reported parsing state.
    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    /// Lowercase tag name, `None` for text nodes and the root.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.get(node)?.data {
            NodeData::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    /// Parent node, `None` when detached or for the root.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node)?.parent
    }

    /// Child nodes in order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.get(node)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Whether `node` is reachable from the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.root {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(256);
        for child in self.children(self.root) {
            self.write_node(*child, &mut out);
        }
        out
    }

    fn get(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.0)
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node.0)
    }

    fn push_node(&mut self, parent: Option<NodeId>, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            data,
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    fn push_text(&mut self, parent: NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        // Entity references arrive as separate events; merge them into the preceding text.
        if let Some(&last) = self.nodes[parent.0].children.last() {
            if let NodeData::Text(existing) = &mut self.nodes[last.0].data {
                existing.push_str(text);
                return;
            }
        }
        self.push_node(Some(parent), NodeData::Text(text.to_string()));
    }

    fn element_from_start(
        reader: &Reader<&[u8]>,
        e: &BytesStart<'_>,
        base: usize,
    ) -> Result<NodeData, EnhanceError> {
        let tag = decode_tag_name(reader, e.name().as_ref(), base)?;
        let mut attrs = Vec::with_capacity(4);
        // HTML attributes: unquoted values and bare names are both legal.
        let mut parsed = e.html_attributes();
        parsed.with_checks(false);
        for attr in parsed.flatten() {
            let key = match reader.decoder().decode(attr.key.as_ref()) {
                Ok(v) => v.to_ascii_lowercase(),
                Err(_) => continue,
            };
            let raw = match reader.decoder().decode(&attr.value) {
                Ok(v) => v,
                Err(_) => continue,
            };
            attrs.push((key, decode_entities(raw.as_ref())));
        }
        Ok(NodeData::Element { tag, attrs })
    }

    fn parse_into(&mut self, parent: NodeId, markup: &str) -> Result<(), EnhanceError> {
        // Offset of the current reader's input within `markup`. Raw-text
        // elements are skipped by hand, after which reading resumes on a
        // fresh reader.
        let mut base = 0usize;
        let mut reader = html_reader(markup);
        let mut stack: Vec<(NodeId, String)> = Vec::with_capacity(16);

        loop {
            let current = stack.last().map(|(id, _)| *id).unwrap_or(parent);
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let data = Self::element_from_start(&reader, &e, base)?;
                    let tag = match &data {
                        NodeData::Element { tag, .. } => tag.clone(),
                        _ => String::new(),
                    };
                    let id = self.push_node(Some(current), data);
                    if is_raw_text_element(&tag) {
                        let body_start = base + reader_token_offset(&reader);
                        let rest = markup.get(body_start..).unwrap_or_default();
                        let (body_len, close_len) =
                            find_raw_text_end(rest, &tag).unwrap_or((rest.len(), 0));
                        if body_len > 0 {
                            self.push_node(Some(id), NodeData::RawText(rest[..body_len].to_string()));
                        }
                        base = body_start + body_len + close_len;
                        reader = html_reader(markup.get(base..).unwrap_or_default());
                    } else if !is_void_element(&tag) {
                        stack.push((id, tag));
                    }
                }
                Ok(Event::Empty(e)) => {
                    let data = Self::element_from_start(&reader, &e, base)?;
                    self.push_node(Some(current), data);
                }
                Ok(Event::End(e)) => {
                    let tag = decode_tag_name(&reader, e.name().as_ref(), base)?;
                    if let Some(pos) = stack.iter().rposition(|(_, open)| *open == tag) {
                        stack.truncate(pos);
                    } else {
                        log::trace!("dropping stray end tag </{}>", tag);
                    }
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .decode()
                        .map_err(|err| decode_error(err, base + reader_token_offset(&reader)))?;
                    self.push_text(current, text.as_ref());
                }
                Ok(Event::CData(e)) => {
                    let text = reader
                        .decoder()
                        .decode(&e)
                        .map_err(|err| decode_error(err, base + reader_token_offset(&reader)))?;
                    self.push_text(current, text.as_ref());
                }
                Ok(Event::GeneralRef(e)) => {
                    let name = e
                        .decode()
                        .map_err(|err| decode_error(err, base + reader_token_offset(&reader)))?;
                    let reference = format!("&{};", name);
                    // Unknown or malformed references stay literal text, as in browsers.
                    let resolved = decode_entities(&reference);
                    self.push_text(current, &resolved);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => {
                    return Err(EnhanceError::markup(
                        "MARKUP_TOKENIZE_ERROR",
                        format!("XML error: {:?}", err),
                        base + reader_token_offset(&reader),
                    ));
                }
            }
        }

        Ok(())
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        self.nodes[parent.0].children.retain(|child| *child != node);
        self.nodes[node.0].parent = None;
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Pre-order walk of `root`'s descendants, excluding `root`.
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(16);
        let mut pending: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = pending.pop() {
            out.push(id);
            pending.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    fn element_attrs(&self, node: NodeId) -> Option<&[(String, String)]> {
        match &self.get(node)?.data {
            NodeData::Element { attrs, .. } => Some(attrs.as_slice()),
            _ => None,
        }
    }

    fn class_list(&self, node: NodeId) -> Vec<String> {
        self.element_attrs(node)
            .and_then(|attrs| attrs.iter().find(|(key, _)| key == "class"))
            .map(|(_, value)| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.get(node) else {
            return;
        };
        match &n.data {
            NodeData::Root => {
                for child in &n.children {
                    self.write_node(*child, out);
                }
            }
            NodeData::Text(text) => out.push_str(&quick_xml::escape::partial_escape(text.as_str())),
            NodeData::RawText(text) => out.push_str(text),
            NodeData::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (key, value) in attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&quick_xml::escape::escape(value.as_str()));
                    out.push('"');
                }
                out.push('>');
                if is_void_element(tag) {
                    return;
                }
                for child in &n.children {
                    self.write_node(*child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for DocumentTree {
    type Node = NodeId;

    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root).into_iter().find(|node| {
            self.element_attrs(*node)
                .is_some_and(|attrs| attrs.iter().any(|(key, value)| key == "id" && value == id))
        })
    }

    fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|node| self.has_class(node, class))
            .collect()
    }

    fn descendants_by_tag(&self, root: &NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(*root)
            .into_iter()
            .filter(|node| self.tag_name(*node) == Some(tag))
            .collect()
    }

    fn first_descendant_by_class(&self, root: &NodeId, class: &str) -> Option<NodeId> {
        self.descendants(*root)
            .into_iter()
            .find(|node| self.has_class(node, class))
    }

    fn closest_by_tag(&self, node: &NodeId, tag: &str) -> Option<NodeId> {
        let mut current = Some(*node);
        while let Some(id) = current {
            if self.tag_name(id) == Some(tag) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    fn closest_by_class(&self, node: &NodeId, class: &str) -> Option<NodeId> {
        let mut current = Some(*node);
        while let Some(id) = current {
            if self.has_class(&id, class) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        if let Some(NodeData::Element { attrs, .. }) = self.get_mut(*node).map(|n| &mut n.data) {
            match attrs.iter_mut().find(|(key, _)| key == name) {
                Some(existing) => existing.1 = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.element_attrs(*node)?
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.class_list(*node).iter().any(|c| c == class)
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        if self.element_attrs(*node).is_none() || self.has_class(node, class) {
            return;
        }
        let mut classes = self.class_list(*node);
        classes.push(class.to_string());
        self.set_attribute(node, "class", &classes.join(" "));
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) {
        if !self.has_class(node, class) {
            return;
        }
        let classes: Vec<String> = self
            .class_list(*node)
            .into_iter()
            .filter(|c| c != class)
            .collect();
        self.set_attribute(node, "class", &classes.join(" "));
    }

    fn set_class_name(&mut self, node: &NodeId, value: &str) {
        self.set_attribute(node, "class", value);
    }

    fn text_content(&self, node: &NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeData::Text(text) | NodeData::RawText(text)) = self.get(*node).map(|n| &n.data) {
            out.push_str(text);
            return out;
        }
        for id in self.descendants(*node) {
            if let NodeData::Text(text) | NodeData::RawText(text) = &self.nodes[id.0].data {
                out.push_str(text);
            }
        }
        out
    }

    fn set_text_content(&mut self, node: &NodeId, text: &str) {
        if self.get(*node).is_none() {
            return;
        }
        for child in self.children(*node).to_vec() {
            self.detach(child);
        }
        self.push_text(*node, text);
    }

    fn inner_markup(&self, node: &NodeId) -> String {
        let mut out = String::with_capacity(64);
        for child in self.children(*node) {
            self.write_node(*child, &mut out);
        }
        out
    }

    fn outer_markup(&self, node: &NodeId) -> String {
        let mut out = String::with_capacity(64);
        self.write_node(*node, &mut out);
        out
    }

    fn set_inner_markup(&mut self, node: &NodeId, markup: &str) -> Result<(), EnhanceError> {
        if self.get(*node).is_none() {
            return Err(EnhanceError::UnknownNode(node.0));
        }
        // Parse into a detached holder first so a failure leaves `node` untouched.
        let holder = self.push_node(None, NodeData::Root);
        self.parse_into(holder, markup)?;
        for child in self.children(*node).to_vec() {
            self.detach(child);
        }
        let parsed = core::mem::take(&mut self.nodes[holder.0].children);
        for child in &parsed {
            self.nodes[child.0].parent = Some(*node);
        }
        self.nodes[node.0].children = parsed;
        Ok(())
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId, EnhanceError> {
        Ok(self.push_node(
            None,
            NodeData::Element {
                tag: tag.to_ascii_lowercase(),
                attrs: Vec::new(),
            },
        ))
    }

    fn deep_clone(&mut self, node: &NodeId) -> Result<NodeId, EnhanceError> {
        let Some(source) = self.get(*node) else {
            return Err(EnhanceError::UnknownNode(node.0));
        };
        let data = source.data.clone();
        let children = source.children.clone();
        let copy = self.push_node(None, data);
        for child in children {
            let child_copy = self.deep_clone(&child)?;
            self.nodes[child_copy.0].parent = Some(copy);
            self.nodes[copy.0].children.push(child_copy);
        }
        Ok(copy)
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        if self.get(*parent).is_none() || self.get(*child).is_none() {
            return;
        }
        if self.is_inclusive_ancestor(*child, *parent) {
            log::warn!(
                "refusing to append node #{} into its own subtree #{}",
                child.0,
                parent.0
            );
            return;
        }
        self.detach(*child);
        self.nodes[child.0].parent = Some(*parent);
        self.nodes[parent.0].children.push(*child);
    }

    fn replace_with(&mut self, node: &NodeId, replacement: &NodeId) {
        if node == replacement || self.get(*replacement).is_none() {
            return;
        }
        let Some(parent) = self.parent(*node) else {
            return;
        };
        if self.is_inclusive_ancestor(*replacement, parent) {
            return;
        }
        self.detach(*replacement);
        let Some(pos) = self.nodes[parent.0]
            .children
            .iter()
            .position(|child| child == node)
        else {
            return;
        };
        self.nodes[parent.0].children[pos] = *replacement;
        self.nodes[replacement.0].parent = Some(parent);
        self.nodes[node.0].parent = None;
    }

    fn remove(&mut self, node: &NodeId) {
        self.detach(*node);
    }
}

fn html_reader(markup: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.allow_dangling_amp = true;
    reader
}

fn reader_token_offset(reader: &Reader<&[u8]>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

fn decode_error(err: impl core::fmt::Debug, offset: usize) -> EnhanceError {
    EnhanceError::markup("MARKUP_DECODE_ERROR", format!("Decode error: {:?}", err), offset)
}

fn decode_tag_name(reader: &Reader<&[u8]>, raw: &[u8], base: usize) -> Result<String, EnhanceError> {
    let decoded = reader
        .decoder()
        .decode(raw)
        .map_err(|err| decode_error(err, base + reader_token_offset(reader)))?;
    Ok(decoded.to_ascii_lowercase())
}

/// Elements whose content is text up to the matching end tag.
fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

/// Locate `</tag` (any case) in `rest`. Returns the body length and the
/// length of the end tag through its `>`.
fn find_raw_text_end(rest: &str, tag: &str) -> Option<(usize, usize)> {
    let bytes = rest.as_bytes();
    let mut from = 0;
    while let Some(found) = rest[from..].find("</") {
        let start = from + found;
        let name_start = start + 2;
        let name_end = name_start + tag.len();
        let name_matches = bytes
            .get(name_start..name_end)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag.as_bytes()));
        let boundary = bytes
            .get(name_end)
            .map_or(true, |b| *b == b'>' || *b == b'/' || b.is_ascii_whitespace());
        if name_matches && boundary {
            let close_end = rest[name_end..]
                .find('>')
                .map_or(rest.len(), |idx| name_end + idx + 1);
            return Some((start, close_end - start));
        }
        from = name_start;
    }
    None
}

/// Decode character references and the HTML5 named entities.
/// Unknown or malformed references are kept verbatim.
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let end = rest[1..]
            .find(|c: char| c == ';' || c == '&' || c.is_whitespace())
            .map(|idx| idx + 1)
            .filter(|idx| rest.as_bytes()[*idx] == b';');
        let Some(end) = end else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let reference = &rest[..=end];
        match quick_xml::escape::unescape_with(reference, quick_xml::escape::resolve_html5_entity) {
            Ok(decoded) => out.push_str(&decoded),
            Err(_) => out.push_str(reference),
        }
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    out
}
