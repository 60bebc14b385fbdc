//! Page enhancements for statically rendered documents.
//!
//! Two behaviors run once per page load:
//!
//! - [`footnotes`] wraps every footnote reference with a hover tooltip that
//!   carries a copy of the footnote body.
//! - [`scrollspy`] keeps the table-of-contents links in sync with the reader's
//!   scroll position and turns link clicks into smooth scrolls.
//!
//! Both talk to the page only through ports: [`dom::Document`] for the
//! element tree, [`geometry::ViewportGeometry`] and [`geometry::Scroller`] for
//! layout reads and scrolling, and [`events::EventSource`] for listener
//! registration. The crate ships headless implementations of all of them
//! ([`DocumentTree`], [`SimulatedViewport`], [`EventHub`]) so every behavior
//! can be driven without a browser. The `page-enhance-web` crate implements
//! the same ports over `web-sys`.
//!
//! # Usage
//!
//! ```rust
//! use page_enhance::{Document, DocumentTree, EnhanceOptions, Page, SimulatedViewport};
//!
//! # fn example() -> Result<(), page_enhance::EnhanceError> {
//! let html = r##"<body>
//!   <nav id="TableOfContents"><a href="#intro">Intro</a><a href="#usage">Usage</a></nav>
//!   <h2 id="intro">Intro</h2>
//!   <h2 id="usage">Usage</h2>
//! </body>"##;
//! let tree = DocumentTree::parse_html(html)?;
//! let intro = tree.element_by_id("intro").unwrap();
//! let usage = tree.element_by_id("usage").unwrap();
//!
//! let mut viewport = SimulatedViewport::new(400.0, 2000.0);
//! viewport.place(intro, 100.0);
//! viewport.place(usage, 900.0);
//!
//! let mut page = Page::load(tree, viewport, EnhanceOptions::default());
//! page.scroll_to(850.0);
//! assert_eq!(page.active_heading_id(), Some("usage"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod bootstrap;
pub mod dom;
pub mod error;
pub mod events;
pub mod footnotes;
pub mod geometry;
pub mod scrollspy;
pub mod tree;

pub use bootstrap::{enhance_page, EnhanceOptions, EnhanceReport, Page};
pub use dom::{Document, ReadyState};
pub use error::EnhanceError;
pub use events::{EventHub, EventKind, EventSource, EventTarget, Listener, PageEvent};
pub use footnotes::{decorate_footnotes, FootnoteConfig, FootnoteReport};
pub use geometry::{
    ScrollBehavior, ScrollRequest, Scroller, SimulatedViewport, ViewportGeometry, ViewportMetrics,
};
pub use scrollspy::{
    select_active_heading, Heading, Scrollspy, ScrollspyConfig, Selection, SelectionReason,
    TocLink,
};
pub use tree::{DocumentTree, NodeId};
