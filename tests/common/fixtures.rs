use std::path::Path;

use page_enhance::{Document, DocumentTree, NodeId, SimulatedViewport};

pub const HUGO_POST_FIXTURE: &str = "tests/fixtures/hugo_post.html";

/// Heading ids of the fixture in document order.
pub const HUGO_POST_HEADINGS: &[&str] = &["motivation", "design", "tokenizer", "results", "wrap-up"];

pub fn hugo_post() -> DocumentTree {
    let path = Path::new(HUGO_POST_FIXTURE);
    let html = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("read {}: {}", path.display(), e));
    DocumentTree::parse_html(&html).unwrap_or_else(|e| panic!("parse {}: {}", path.display(), e))
}

/// Lay the fixture out with each heading `section_height` below the last,
/// starting at `first_top`.
pub fn hugo_post_viewport(
    tree: &DocumentTree,
    viewport_height: f64,
    first_top: f64,
    section_height: f64,
) -> SimulatedViewport<NodeId> {
    let document_height = first_top + section_height * HUGO_POST_HEADINGS.len() as f64;
    let mut viewport = SimulatedViewport::new(viewport_height, document_height);
    for (idx, id) in HUGO_POST_HEADINGS.iter().enumerate() {
        let node = tree
            .element_by_id(id)
            .unwrap_or_else(|| panic!("fixture heading #{} missing", id));
        viewport.place(node, first_top + section_height * idx as f64);
    }
    viewport
}

/// Page with `sections` headings, a TOC linking each, and one footnote per
/// section.
pub fn synthetic_page(sections: usize) -> String {
    let mut html = String::with_capacity(sections * 256);
    html.push_str("<html><body><nav id=\"TableOfContents\"><ul>");
    for idx in 0..sections {
        html.push_str(&format!(
            "<li><a href=\"#section-{idx}\">Section {idx}</a></li>"
        ));
    }
    html.push_str("</ul></nav><article>");
    for idx in 0..sections {
        html.push_str(&format!(
            "<h2 id=\"section-{idx}\">Section {idx}</h2><p>Body {idx}<sup id=\"fnref:{idx}\"><a href=\"#fn:{idx}\" class=\"footnote-ref\">{idx}</a></sup></p>"
        ));
    }
    html.push_str("</article><ol>");
    for idx in 0..sections {
        html.push_str(&format!(
            "<li id=\"fn:{idx}\"><p>Note {idx}&nbsp;<a href=\"#fnref:{idx}\" class=\"footnote-backref\">&#8617;</a></p></li>"
        ));
    }
    html.push_str("</ol></body></html>");
    html
}

pub fn synthetic_viewport(
    tree: &DocumentTree,
    sections: usize,
    section_height: f64,
) -> SimulatedViewport<NodeId> {
    let mut viewport = SimulatedViewport::new(800.0, section_height * sections as f64 + 200.0);
    for idx in 0..sections {
        let id = format!("section-{idx}");
        let node = tree
            .element_by_id(&id)
            .unwrap_or_else(|| panic!("synthetic heading #{} missing", id));
        viewport.place(node, 100.0 + section_height * idx as f64);
    }
    viewport
}
