//! Page-load orchestration.
//!
//! Once the document is parsed, footnotes are decorated and then the
//! scrollspy is bound. The two share nothing. [`Page`] is the headless host:
//! it owns the document, viewport and listeners and replays what a browser
//! would do on load, scroll and click.

use std::rc::Rc;

use crate::dom::Document;
use crate::events::{EventHub, EventSource, EventTarget, PageEvent};
use crate::footnotes::{decorate_footnotes, FootnoteConfig, FootnoteReport};
use crate::geometry::{ScrollRequest, Scroller, ViewportGeometry};
use crate::scrollspy::{Scrollspy, ScrollspyConfig};

/// Options for both enhancements.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnhanceOptions {
    /// Scrollspy tuning.
    pub scrollspy: ScrollspyConfig,
    /// Footnote class names.
    pub footnotes: FootnoteConfig,
}

/// What a page load changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnhanceReport {
    /// Footnote decoration counts.
    pub footnotes: FootnoteReport,
    /// Whether the scrollspy found a TOC and installed listeners.
    pub scrollspy_active: bool,
    /// TOC links bound.
    pub toc_links: usize,
    /// Headings resolved from those links.
    pub headings: usize,
}

/// Run both enhancements against a parsed document.
///
/// Listeners are registered with `events`. Returns the bound scrollspy, if
/// any, alongside the report. A second run on the same document finds
/// everything already enhanced and changes nothing.
pub fn enhance_page<D, V, S>(
    document: &mut D,
    viewport: &mut V,
    events: &mut S,
    options: &EnhanceOptions,
) -> (EnhanceReport, Option<Rc<Scrollspy<D::Node>>>)
where
    D: Document + 'static,
    D::Node: 'static,
    V: ViewportGeometry<Node = D::Node> + Scroller + 'static,
    S: EventSource<D, V>,
{
    let mut report = EnhanceReport {
        footnotes: decorate_footnotes(document, &options.footnotes),
        ..EnhanceReport::default()
    };

    let spy = Scrollspy::new(document, options.scrollspy.clone())
        .map(|spy| spy.install(document, viewport, events));
    if let Some(spy) = &spy {
        report.scrollspy_active = true;
        report.toc_links = spy.links().len();
        report.headings = spy.headings().len();
    }
    log::debug!(
        "page enhanced: scrollspy_active={} toc_links={} headings={}",
        report.scrollspy_active,
        report.toc_links,
        report.headings
    );
    (report, spy)
}

/// Headless page host.
pub struct Page<D: Document, V> {
    document: D,
    viewport: V,
    events: EventHub<D, V>,
    options: EnhanceOptions,
    report: Option<EnhanceReport>,
    scrollspy: Option<Rc<Scrollspy<D::Node>>>,
}

impl<D, V> Page<D, V>
where
    D: Document + 'static,
    D::Node: 'static,
    V: ViewportGeometry<Node = D::Node> + Scroller + 'static,
{
    /// Load a page. Enhancements run now unless the document is still
    /// loading, in which case they wait for [`Page::content_loaded`].
    pub fn load(document: D, viewport: V, options: EnhanceOptions) -> Self {
        let mut page = Self {
            document,
            viewport,
            events: EventHub::new(),
            options,
            report: None,
            scrollspy: None,
        };
        if page.document.ready_state().is_ready() {
            page.enhance();
        } else {
            log::debug!("document still loading; deferring enhancements");
        }
        page
    }

    /// The document finished parsing. Runs deferred enhancements once.
    pub fn content_loaded(&mut self) {
        if self.report.is_none() {
            self.enhance();
        }
    }

    fn enhance(&mut self) {
        let (report, spy) = enhance_page(
            &mut self.document,
            &mut self.viewport,
            &mut self.events,
            &self.options,
        );
        self.report = Some(report);
        self.scrollspy = spy;
    }

    /// Jump the viewport to `top` and deliver a scroll event.
    pub fn scroll_to(&mut self, top: f64) -> PageEvent {
        self.viewport.scroll_to(ScrollRequest::instant(top));
        self.events
            .dispatch(&EventTarget::Scroll, &mut self.document, &mut self.viewport)
    }

    /// Deliver a scroll event without moving the viewport.
    pub fn dispatch_scroll(&mut self) -> PageEvent {
        self.events
            .dispatch(&EventTarget::Scroll, &mut self.document, &mut self.viewport)
    }

    /// Click `node` and deliver the event.
    pub fn click(&mut self, node: D::Node) -> PageEvent {
        self.events.dispatch(
            &EventTarget::Click(node),
            &mut self.document,
            &mut self.viewport,
        )
    }

    /// Report from the enhancement run, `None` while deferred.
    pub fn report(&self) -> Option<&EnhanceReport> {
        self.report.as_ref()
    }

    /// Bound scrollspy, if the page has a TOC.
    pub fn scrollspy(&self) -> Option<&Scrollspy<D::Node>> {
        self.scrollspy.as_deref()
    }

    /// Id of the heading currently considered active.
    pub fn active_heading_id(&self) -> Option<&str> {
        self.scrollspy()?.active_heading_id(&self.viewport)
    }

    /// The document.
    pub fn document(&self) -> &D {
        &self.document
    }

    /// The document, mutably.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    /// The viewport.
    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    /// The viewport, mutably. Moving it does not dispatch a scroll event.
    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    /// Registered listeners.
    pub fn events(&self) -> &EventHub<D, V> {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ReadyState;
    use crate::events::EventKind;
    use crate::geometry::SimulatedViewport;
    use crate::tree::{DocumentTree, NodeId};

    const PAGE: &str = r##"<body>
<nav id="TableOfContents"><a id="l-a" href="#a">A</a><a id="l-b" href="#b">B</a></nav>
<h2 id="a">A</h2><p>See<sup><a href="#fn:1" class="footnote-ref">1</a></sup></p>
<h2 id="b">B</h2>
<ol><li id="fn:1"><p>Note</p></li></ol>
</body>"##;

    fn viewport_for(tree: &DocumentTree) -> SimulatedViewport<NodeId> {
        let mut viewport = SimulatedViewport::new(400.0, 3000.0);
        viewport.place(tree.element_by_id("a").expect("a"), 50.0);
        viewport.place(tree.element_by_id("b").expect("b"), 1500.0);
        viewport
    }

    #[test]
    fn load_runs_both_enhancements() {
        let tree = DocumentTree::parse_html(PAGE).expect("parse should succeed");
        let viewport = viewport_for(&tree);
        let page = Page::load(tree, viewport, EnhanceOptions::default());
        let report = page.report().copied().expect("enhanced");
        assert_eq!(report.footnotes.decorated, 1);
        assert!(report.scrollspy_active);
        assert_eq!(report.toc_links, 2);
        assert_eq!(report.headings, 2);
        assert_eq!(page.active_heading_id(), Some("a"));
        assert_eq!(page.events().listener_count(EventKind::Click), 2);
    }

    #[test]
    fn loading_document_defers_until_content_loaded() {
        let mut tree = DocumentTree::parse_html(PAGE).expect("parse should succeed");
        tree.set_ready_state(ReadyState::Loading);
        let viewport = viewport_for(&tree);
        let mut page = Page::load(tree, viewport, EnhanceOptions::default());
        assert!(page.report().is_none());
        assert!(page.events().is_empty());

        page.content_loaded();
        assert!(page.report().is_some());
        let scroll_listeners = page.events().listener_count(EventKind::Scroll);
        assert_eq!(scroll_listeners, 1);

        page.content_loaded();
        assert_eq!(page.events().listener_count(EventKind::Scroll), scroll_listeners);
    }

    #[test]
    fn page_without_toc_installs_nothing() {
        let tree = DocumentTree::parse_html("<p>plain</p>").expect("parse should succeed");
        let viewport: SimulatedViewport<NodeId> = SimulatedViewport::new(400.0, 300.0);
        let mut page = Page::load(tree, viewport, EnhanceOptions::default());
        let report = page.report().copied().expect("enhanced");
        assert!(!report.scrollspy_active);
        assert!(page.events().is_empty());
        assert!(!page.scroll_to(100.0).default_prevented());
        assert_eq!(page.active_heading_id(), None);
    }

    #[test]
    fn second_run_on_same_document_is_a_no_op() {
        let mut tree = DocumentTree::parse_html(PAGE).expect("parse should succeed");
        let mut viewport = viewport_for(&tree);
        let mut hub = EventHub::new();
        let options = EnhanceOptions::default();
        let (first, spy) = enhance_page(&mut tree, &mut viewport, &mut hub, &options);
        assert!(first.scrollspy_active);
        assert!(spy.is_some());
        let html = tree.to_html();

        let (second, spy) = enhance_page(&mut tree, &mut viewport, &mut hub, &options);
        assert_eq!(second, EnhanceReport::default());
        assert!(spy.is_none());
        assert_eq!(tree.to_html(), html);
        assert_eq!(hub.listener_count(EventKind::Click), 2);
        assert_eq!(hub.listener_count(EventKind::Scroll), 1);
        assert_eq!(tree.elements_by_class("has-footnote-tooltip").len(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_options_fill_in_defaults() {
        let options: EnhanceOptions =
            serde_json::from_str(r#"{"scrollspy":{"scroll_margin":64.0}}"#)
                .expect("options should deserialize");
        assert_eq!(options.scrollspy.scroll_margin, 64.0);
        assert_eq!(options.scrollspy.container_id, "TableOfContents");
        assert_eq!(options.footnotes, FootnoteConfig::default());
    }
}
