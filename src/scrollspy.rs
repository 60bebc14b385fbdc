//! Table-of-contents scrollspy.
//!
//! The TOC rendered by the site generator is a container of same-page links:
//!
//! ```html
//! <nav id="TableOfContents">
//!   <ul>
//!     <li><a href="#heading-1">Heading 1</a></li>
//!     <li><a href="#heading-2">Heading 2</a></li>
//!   </ul>
//! </nav>
//! ```
//!
//! Each link's fragment names a heading elsewhere in the page. [`Scrollspy`]
//! resolves those headings once, highlights the link of the heading the
//! reader is currently looking at, and turns link clicks into smooth scrolls.
//!
//! # Usage
//!
//! ```rust
//! use page_enhance::{DocumentTree, Scrollspy, ScrollspyConfig, SimulatedViewport};
//!
//! # fn example() -> Result<(), page_enhance::EnhanceError> {
//! let mut tree = DocumentTree::parse_html(
//!     r##"<nav id="TableOfContents"><a href="#a">A</a></nav><h2 id="a">A</h2>"##,
//! )?;
//! let viewport: SimulatedViewport<_> = SimulatedViewport::new(800.0, 600.0);
//! let spy = Scrollspy::new(&tree, ScrollspyConfig::default()).expect("toc present");
//! let selection = spy.evaluate(&mut tree, &viewport);
//! assert_eq!(selection.map(|s| s.index), Some(0));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::dom::{fragment_id, Document};
use crate::events::{EventSource, EventTarget, PageEvent};
use crate::geometry::{ScrollRequest, Scroller, ViewportGeometry, ViewportMetrics};

/// Scrollspy tuning.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScrollspyConfig {
    /// `id` of the element holding the TOC links.
    pub container_id: String,
    /// Class toggled on active links.
    pub active_class: String,
    /// Fraction of the viewport height a heading's top must reach before it
    /// can overtake the previous heading.
    pub activation_ratio: f64,
    /// Gap in pixels left above a heading after click navigation.
    pub scroll_margin: f64,
    /// Slack in pixels when deciding the viewport reached the document bottom.
    pub bottom_tolerance: f64,
}

impl Default for ScrollspyConfig {
    fn default() -> Self {
        Self {
            container_id: "TableOfContents".to_string(),
            active_class: "active".to_string(),
            activation_ratio: 0.25,
            scroll_margin: 10.0,
            bottom_tolerance: 1.0,
        }
    }
}

/// A link inside the TOC container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocLink<N> {
    /// Anchor element.
    pub node: N,
    /// Fragment id the link points at, `None` when `href` is missing or not a
    /// same-page fragment.
    pub target_id: Option<String>,
}

/// A heading referenced by at least one TOC link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heading<N> {
    /// Heading `id`.
    pub id: String,
    /// Heading element.
    pub node: N,
}

/// Why a heading was selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionReason {
    /// Document-order walk over heading positions.
    Walk,
    /// The viewport reached the bottom of a scrollable page.
    BottomOfPage,
    /// The page does not scroll.
    NotScrollable,
}

/// Outcome of active heading selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Index into the resolved heading sequence.
    pub index: usize,
    /// Rule that produced the selection.
    pub reason: SelectionReason,
}

/// Pick the active heading from viewport-relative heading tops.
///
/// The first heading is the default. Heading `i` overtakes the running
/// candidate once heading `i - 1` has scrolled above the viewport and heading
/// `i` has entered the top `activation_ratio` of it. A scrollable page
/// scrolled to its bottom selects the last heading; a page that does not
/// scroll selects the first.
///
/// Returns `None` only when `tops` is empty.
pub fn select_active_heading(
    tops: &[f64],
    metrics: ViewportMetrics,
    config: &ScrollspyConfig,
) -> Option<Selection> {
    if tops.is_empty() {
        return None;
    }

    let threshold = metrics.viewport_height * config.activation_ratio;
    let mut index = 0;
    for (i, pair) in tops.windows(2).enumerate() {
        if pair[0] < 0.0 && pair[1] <= threshold {
            index = i + 1;
        }
    }

    let selection = if !metrics.is_scrollable() {
        Selection {
            index: 0,
            reason: SelectionReason::NotScrollable,
        }
    } else if metrics.is_at_bottom(config.bottom_tolerance) {
        Selection {
            index: tops.len() - 1,
            reason: SelectionReason::BottomOfPage,
        }
    } else {
        Selection {
            index,
            reason: SelectionReason::Walk,
        }
    };
    Some(selection)
}

/// Collect the links inside the TOC container in document order.
///
/// A missing container yields no links.
pub fn collect_toc_links<D: Document>(
    document: &D,
    config: &ScrollspyConfig,
) -> Vec<TocLink<D::Node>> {
    let Some(container) = document.element_by_id(&config.container_id) else {
        return Vec::new();
    };
    document
        .descendants_by_tag(&container, "a")
        .into_iter()
        .map(|node| {
            let target_id = document
                .attribute(&node, "href")
                .and_then(|href| fragment_id(&href).map(str::to_string));
            TocLink { node, target_id }
        })
        .collect()
}

/// Resolve the headings the links point at.
///
/// One heading per distinct target id, in first-occurrence order. Ids that
/// name no element are dropped.
pub fn resolve_headings<D: Document>(
    document: &D,
    links: &[TocLink<D::Node>],
) -> Vec<Heading<D::Node>> {
    let mut seen = BTreeSet::new();
    let mut headings = Vec::with_capacity(links.len());
    for id in links.iter().filter_map(|link| link.target_id.as_deref()) {
        if !seen.insert(id) {
            continue;
        }
        match document.element_by_id(id) {
            Some(node) => headings.push(Heading {
                id: id.to_string(),
                node,
            }),
            None => log::debug!("TOC link target #{} not found; skipping", id),
        }
    }
    headings
}

/// Attribute set on the TOC container once listeners are installed.
pub const BOUND_ATTRIBUTE: &str = "data-scrollspy-bound";

/// Resolved TOC state for one page.
///
/// Links and headings are bound once; later document mutations are not
/// picked up.
#[derive(Clone, Debug)]
pub struct Scrollspy<N> {
    config: ScrollspyConfig,
    container: N,
    links: Vec<TocLink<N>>,
    headings: Vec<Heading<N>>,
}

impl<N: Clone + PartialEq + core::fmt::Debug> Scrollspy<N> {
    /// Bind to the TOC in `document`.
    ///
    /// Returns `None` when the page has no TOC links, or when a scrollspy was
    /// already installed on this TOC; nothing should be installed then.
    pub fn new<D>(document: &D, config: ScrollspyConfig) -> Option<Self>
    where
        D: Document<Node = N>,
    {
        let container = document.element_by_id(&config.container_id)?;
        if document.attribute(&container, BOUND_ATTRIBUTE).is_some() {
            log::debug!("scrollspy already bound to #{}", config.container_id);
            return None;
        }
        let links = collect_toc_links(document, &config);
        if links.is_empty() {
            log::debug!("no TOC links under #{}; scrollspy inactive", config.container_id);
            return None;
        }
        let headings = resolve_headings(document, &links);
        Some(Self {
            config,
            container,
            links,
            headings,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &ScrollspyConfig {
        &self.config
    }

    /// TOC links in document order.
    pub fn links(&self) -> &[TocLink<N>] {
        &self.links
    }

    /// Resolved headings in first-occurrence order.
    pub fn headings(&self) -> &[Heading<N>] {
        &self.headings
    }

    /// Select the heading the reader is looking at, from current geometry.
    pub fn select<V>(&self, viewport: &V) -> Option<Selection>
    where
        V: ViewportGeometry<Node = N>,
    {
        let tops: Vec<f64> = self
            .headings
            .iter()
            .map(|heading| viewport.top_offset_of(&heading.node))
            .collect();
        select_active_heading(&tops, viewport.metrics(), &self.config)
    }

    /// Id of the heading the reader is looking at.
    pub fn active_heading_id<V>(&self, viewport: &V) -> Option<&str>
    where
        V: ViewportGeometry<Node = N>,
    {
        self.select(viewport)
            .map(|selection| self.headings[selection.index].id.as_str())
    }

    /// Recompute the active heading and move the active marker to its links.
    ///
    /// With no resolved headings the markers are left alone.
    pub fn evaluate<D, V>(&self, document: &mut D, viewport: &V) -> Option<Selection>
    where
        D: Document<Node = N>,
        V: ViewportGeometry<Node = N>,
    {
        let selection = self.select(viewport)?;
        let active_id = self.headings[selection.index].id.as_str();
        log::trace!(
            "scrollspy selected #{} ({:?}) at scroll_y={}",
            active_id,
            selection.reason,
            viewport.current_scroll_y()
        );
        self.sync_markers(document, active_id);
        Some(selection)
    }

    /// Mark exactly the links targeting `active_id`.
    pub fn sync_markers<D>(&self, document: &mut D, active_id: &str)
    where
        D: Document<Node = N>,
    {
        self.clear_markers(document);
        for link in &self.links {
            if link.target_id.as_deref() == Some(active_id) {
                document.add_class(&link.node, &self.config.active_class);
            }
        }
    }

    fn clear_markers<D>(&self, document: &mut D)
    where
        D: Document<Node = N>,
    {
        for link in &self.links {
            document.remove_class(&link.node, &self.config.active_class);
        }
    }

    /// Handle a click on `link`: suppress navigation, mark the clicked link,
    /// and smooth-scroll to its heading.
    ///
    /// The target is looked up at click time. When it is gone the marker
    /// still moves but no scroll is requested. Returns the request issued.
    pub fn handle_click<D, V>(
        &self,
        link: &N,
        event: &mut PageEvent,
        document: &mut D,
        viewport: &mut V,
    ) -> Option<ScrollRequest>
    where
        D: Document<Node = N>,
        V: ViewportGeometry<Node = N> + Scroller,
    {
        event.prevent_default();
        self.clear_markers(document);
        document.add_class(link, &self.config.active_class);

        let href = document.attribute(link, "href")?;
        let Some(target_id) = fragment_id(&href) else {
            log::debug!("TOC link {:?} is not a same-page fragment; not scrolling", href);
            return None;
        };
        let Some(target) = document.element_by_id(target_id) else {
            log::debug!("click target #{} not found; not scrolling", target_id);
            return None;
        };
        let request =
            ScrollRequest::smooth(viewport.document_offset_of(&target) - self.config.scroll_margin);
        viewport.scroll_to(request);
        Some(request)
    }
}

impl<N: Clone + PartialEq + core::fmt::Debug + 'static> Scrollspy<N> {
    /// Register click listeners on every link and a scroll listener, then
    /// run the first evaluation so the right link is marked before any
    /// scrolling. The container is tagged with [`BOUND_ATTRIBUTE`].
    pub fn install<D, V, S>(self, document: &mut D, viewport: &mut V, events: &mut S) -> Rc<Self>
    where
        D: Document<Node = N> + 'static,
        V: ViewportGeometry<Node = N> + Scroller + 'static,
        S: EventSource<D, V>,
    {
        document.set_attribute(&self.container, BOUND_ATTRIBUTE, "");
        let spy = Rc::new(self);

        for link in &spy.links {
            let handler = Rc::clone(&spy);
            let node = link.node.clone();
            events.subscribe(
                EventTarget::Click(link.node.clone()),
                Box::new(move |document: &mut D, viewport: &mut V, event: &mut PageEvent| {
                    handler.handle_click(&node, event, document, viewport);
                }),
            );
        }

        let handler = Rc::clone(&spy);
        events.subscribe(
            EventTarget::Scroll,
            Box::new(move |document: &mut D, viewport: &mut V, _event: &mut PageEvent| {
                handler.evaluate(document, viewport);
            }),
        );

        spy.evaluate(document, viewport);
        spy
    }
}
