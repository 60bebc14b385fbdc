//! Explicit event subscription.
//!
//! Listeners are plain callbacks registered against a named source. The
//! document and viewport are handed to each invocation instead of being
//! captured, so a host can dispatch by direct call.

use core::fmt;

use crate::dom::Document;

/// Event category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// The window scrolled.
    Scroll,
    /// An element was clicked.
    Click,
}

/// Where a listener is attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventTarget<N> {
    /// Window scroll events.
    Scroll,
    /// Clicks on one element.
    Click(N),
}

impl<N> EventTarget<N> {
    /// Category of events delivered to this target.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Scroll => EventKind::Scroll,
            Self::Click(_) => EventKind::Click,
        }
    }
}

/// Payload passed to listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageEvent {
    kind: EventKind,
    default_prevented: bool,
}

impl PageEvent {
    /// Fresh event of `kind`.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            default_prevented: false,
        }
    }

    /// Event category.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Suppress the host's default action (link navigation for clicks).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a listener suppressed the default action.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Callback invoked with the document, the viewport and the event.
pub type Listener<D, V> = Box<dyn FnMut(&mut D, &mut V, &mut PageEvent)>;

/// Something listeners can be registered with.
pub trait EventSource<D: Document, V> {
    /// Register `listener` for events delivered to `target`. Listeners live as
    /// long as the source.
    fn subscribe(&mut self, target: EventTarget<D::Node>, listener: Listener<D, V>);
}

/// Headless event source dispatching by direct invocation.
pub struct EventHub<D: Document, V> {
    listeners: Vec<(EventTarget<D::Node>, Listener<D, V>)>,
}

impl<D: Document, V> EventHub<D, V> {
    /// Hub with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: Vec::with_capacity(8),
        }
    }

    /// Number of listeners registered for events of `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .iter()
            .filter(|(target, _)| target.kind() == kind)
            .count()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver an event to every listener registered for `target`, in
    /// registration order. Returns the event as the listeners left it.
    pub fn dispatch(
        &mut self,
        target: &EventTarget<D::Node>,
        document: &mut D,
        viewport: &mut V,
    ) -> PageEvent {
        let mut event = PageEvent::new(target.kind());
        for (registered, listener) in self.listeners.iter_mut() {
            if registered == target {
                listener(document, viewport, &mut event);
            }
        }
        event
    }
}

impl<D: Document, V> Default for EventHub<D, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Document, V> EventSource<D, V> for EventHub<D, V> {
    fn subscribe(&mut self, target: EventTarget<D::Node>, listener: Listener<D, V>) {
        self.listeners.push((target, listener));
    }
}

impl<D: Document, V> fmt::Debug for EventHub<D, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("scroll_listeners", &self.listener_count(EventKind::Scroll))
            .field("click_listeners", &self.listener_count(EventKind::Click))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::tree::DocumentTree;

    #[test]
    fn dispatch_reaches_only_matching_target() {
        let mut tree = DocumentTree::parse_html(r#"<p id="a">A</p><p id="b">B</p>"#)
            .expect("parse should succeed");
        let a = tree.element_by_id("a").expect("a exists");
        let b = tree.element_by_id("b").expect("b exists");
        let mut hub: EventHub<DocumentTree, u32> = EventHub::new();
        hub.subscribe(
            EventTarget::Click(a),
            Box::new(|_, count, event| {
                *count += 1;
                event.prevent_default();
            }),
        );
        hub.subscribe(EventTarget::Scroll, Box::new(|_, count, _| *count += 100));

        let mut count = 0u32;
        let event = hub.dispatch(&EventTarget::Click(b), &mut tree, &mut count);
        assert_eq!(count, 0);
        assert!(!event.default_prevented());

        let event = hub.dispatch(&EventTarget::Click(a), &mut tree, &mut count);
        assert_eq!(count, 1);
        assert!(event.default_prevented());
        assert_eq!(event.kind(), EventKind::Click);

        hub.dispatch(&EventTarget::Scroll, &mut tree, &mut count);
        assert_eq!(count, 101);
        assert_eq!(hub.listener_count(EventKind::Click), 1);
        assert_eq!(hub.listener_count(EventKind::Scroll), 1);
    }
}
