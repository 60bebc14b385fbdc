//! Footnote reference tooltips.
//!
//! Site generators render footnote references as superscript links and the
//! footnotes themselves as a list at the end of the page:
//!
//! ```html
//! <sup id="fnref:1"><a href="#fn:1" class="footnote-ref" role="doc-noteref">1</a></sup>
//! ...
//! <li id="fn:1">
//!   <p>The footnote with <strong>markup</strong>.&nbsp;<a href="#fnref:1" class="footnote-backref">↩︎</a></p>
//! </li>
//! ```
//!
//! [`decorate_footnotes`] wraps each reference so the footnote text can be
//! shown on hover, without leaving the paragraph:
//!
//! ```html
//! <span class="has-footnote-tooltip">
//!   <sup id="fnref:1"><a href="#fn:1" class="footnote-ref" role="doc-noteref">1</a></sup>
//!   <span class="footnote-tooltip"><sup>1</sup> The footnote with <strong>markup</strong>.&nbsp;</span>
//! </span>
//! ```
//!
//! Showing and hiding the tooltip is left to the stylesheet.

use crate::dom::{fragment_id, Document};
use crate::error::EnhanceError;

/// Class names used to find references and build tooltips.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FootnoteConfig {
    /// Class carried by footnote reference links.
    pub reference_class: String,
    /// Class of the back-reference link stripped from tooltip content.
    pub backref_class: String,
    /// Class of the wrapper holding the reference and its tooltip.
    pub wrapper_class: String,
    /// Class of the tooltip element.
    pub tooltip_class: String,
}

impl Default for FootnoteConfig {
    fn default() -> Self {
        Self {
            reference_class: "footnote-ref".to_string(),
            backref_class: "footnote-backref".to_string(),
            wrapper_class: "has-footnote-tooltip".to_string(),
            tooltip_class: "footnote-tooltip".to_string(),
        }
    }
}

/// Counts from one decoration pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FootnoteReport {
    /// References wrapped with a tooltip.
    pub decorated: usize,
    /// References left untouched.
    pub skipped: usize,
}

/// Wrap every footnote reference in `document` with a tooltip.
///
/// References whose footnote cannot be found are left as they are. References
/// already inside a tooltip wrapper are not counted, so running this again on
/// the same document changes nothing.
pub fn decorate_footnotes<D: Document>(
    document: &mut D,
    config: &FootnoteConfig,
) -> FootnoteReport {
    let mut report = FootnoteReport::default();
    for reference in document.elements_by_class(&config.reference_class) {
        if document
            .closest_by_class(&reference, &config.wrapper_class)
            .is_some()
        {
            continue;
        }
        if decorate_reference(document, &reference, config) {
            report.decorated += 1;
        } else {
            report.skipped += 1;
        }
    }
    if report.decorated + report.skipped > 0 {
        log::debug!(
            "footnote tooltips: {} decorated, {} skipped",
            report.decorated,
            report.skipped
        );
    }
    report
}

/// Footnote id referenced by `reference`, from its `href` fragment.
pub fn footnote_id<D: Document>(document: &D, reference: &D::Node) -> Option<String> {
    let href = document.attribute(reference, "href")?;
    let id = fragment_id(&href).unwrap_or(href.as_str());
    if id.is_empty() {
        return None;
    }
    Some(id.to_string())
}

/// Footnote body markup: the first paragraph of a copy of `footnote`, with the
/// back-reference removed. Empty when the footnote has no paragraph.
pub fn footnote_body<D: Document>(
    document: &mut D,
    footnote: &D::Node,
    config: &FootnoteConfig,
) -> Result<String, EnhanceError> {
    let copy = document.deep_clone(footnote)?;
    if let Some(backref) = document.first_descendant_by_class(&copy, &config.backref_class) {
        document.remove(&backref);
    }
    Ok(document
        .descendants_by_tag(&copy, "p")
        .first()
        .map(|paragraph| document.inner_markup(paragraph))
        .unwrap_or_default())
}

fn decorate_reference<D: Document>(
    document: &mut D,
    reference: &D::Node,
    config: &FootnoteConfig,
) -> bool {
    let Some(id) = footnote_id(document, reference) else {
        log::debug!("footnote reference without href; skipping");
        return false;
    };
    let Some(footnote) = document.element_by_id(&id) else {
        log::debug!("footnote #{} not found; leaving reference as is", id);
        return false;
    };
    match build_tooltip(document, reference, &footnote, config) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("footnote #{} left undecorated: {}", id, err);
            false
        }
    }
}

fn build_tooltip<D: Document>(
    document: &mut D,
    reference: &D::Node,
    footnote: &D::Node,
    config: &FootnoteConfig,
) -> Result<(), EnhanceError> {
    let body = footnote_body(document, footnote, config)?;
    let number = document.text_content(reference).trim().to_string();
    let anchor = document
        .closest_by_tag(reference, "sup")
        .unwrap_or_else(|| reference.clone());

    let number_sup = document.create_element("sup")?;
    document.set_text_content(&number_sup, &number);
    let tooltip_markup = format!("{} {}", document.outer_markup(&number_sup), body);

    let tooltip = document.create_element("span")?;
    document.set_class_name(&tooltip, &config.tooltip_class);
    document.set_inner_markup(&tooltip, &tooltip_markup)?;

    let wrapper = document.create_element("span")?;
    document.set_class_name(&wrapper, &config.wrapper_class);
    let anchor_copy = document.deep_clone(&anchor)?;
    document.append_child(&wrapper, &anchor_copy);
    document.append_child(&wrapper, &tooltip);
    document.replace_with(&anchor, &wrapper);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::DocumentTree;

    const PAGE: &str = r##"<article>
<p>Claim<sup id="fnref:1"><a href="#fn:1" class="footnote-ref" role="doc-noteref">1</a></sup> and more<sup id="fnref:2"><a href="#fn:2" class="footnote-ref" role="doc-noteref">2</a></sup>.</p>
<div class="footnotes"><ol>
<li id="fn:1"><p>Text with <strong>markup</strong>.&nbsp;<a href="#fnref:1" class="footnote-backref" role="doc-backlink">&#8617;</a></p></li>
</ol></div>
</article>"##;

    #[test]
    fn decorates_reference_and_strips_backref() {
        let mut tree = DocumentTree::parse_html(PAGE).expect("parse should succeed");
        let report = decorate_footnotes(&mut tree, &FootnoteConfig::default());
        assert_eq!(report, FootnoteReport { decorated: 1, skipped: 1 });

        let wrappers = tree.elements_by_class("has-footnote-tooltip");
        assert_eq!(wrappers.len(), 1);
        let tooltip = tree
            .first_descendant_by_class(&wrappers[0], "footnote-tooltip")
            .expect("tooltip present");
        assert_eq!(
            tree.inner_markup(&tooltip),
            "<sup>1</sup> Text with <strong>markup</strong>.\u{a0}"
        );
        assert!(!tree.inner_markup(&tooltip).contains("footnote-backref"));
    }

    #[test]
    fn wrapper_keeps_original_reference_markup() {
        let mut tree = DocumentTree::parse_html(PAGE).expect("parse should succeed");
        decorate_footnotes(&mut tree, &FootnoteConfig::default());
        let wrapper = tree.elements_by_class("has-footnote-tooltip")[0];
        let sup = tree.element_by_id("fnref:1").expect("reference still addressable");
        assert_eq!(tree.parent(sup), Some(wrapper));
        assert_eq!(
            tree.outer_markup(&sup),
            r##"<sup id="fnref:1"><a href="#fn:1" class="footnote-ref" role="doc-noteref">1</a></sup>"##
        );
    }

    #[test]
    fn footnote_list_is_not_modified() {
        let mut tree = DocumentTree::parse_html(PAGE).expect("parse should succeed");
        decorate_footnotes(&mut tree, &FootnoteConfig::default());
        let footnote = tree.element_by_id("fn:1").expect("footnote present");
        assert!(tree
            .first_descendant_by_class(&footnote, "footnote-backref")
            .is_some());
    }

    #[test]
    fn missing_footnote_leaves_reference_untouched() {
        let html = r##"<p>x<sup id="fnref:9"><a href="#fn:9" class="footnote-ref">9</a></sup></p>"##;
        let mut tree = DocumentTree::parse_html(html).expect("parse should succeed");
        let before = tree.to_html();
        let report = decorate_footnotes(&mut tree, &FootnoteConfig::default());
        assert_eq!(report, FootnoteReport { decorated: 0, skipped: 1 });
        assert_eq!(tree.to_html(), before);
    }

    #[test]
    fn reference_without_sup_is_wrapped_directly() {
        let html = r##"<p>x<a href="#n" class="footnote-ref">*</a></p><li id="n"><p>Note</p></li>"##;
        let mut tree = DocumentTree::parse_html(html).expect("parse should succeed");
        decorate_footnotes(&mut tree, &FootnoteConfig::default());
        assert!(tree.to_html().starts_with(
            r##"<p>x<span class="has-footnote-tooltip"><a href="#n" class="footnote-ref">*</a><span class="footnote-tooltip"><sup>*</sup> Note</span></span></p>"##
        ));
    }

    #[test]
    fn footnote_without_paragraph_yields_empty_body() {
        let html = r##"<sup><a href="#n" class="footnote-ref">1</a></sup><li id="n">bare</li>"##;
        let mut tree = DocumentTree::parse_html(html).expect("parse should succeed");
        let report = decorate_footnotes(&mut tree, &FootnoteConfig::default());
        assert_eq!(report.decorated, 1);
        let tooltip = tree.elements_by_class("footnote-tooltip")[0];
        assert_eq!(tree.inner_markup(&tooltip), "<sup>1</sup> ");
    }

    #[test]
    fn footnote_id_strips_hash() {
        let tree =
            DocumentTree::parse_html(r##"<a id="r" href="#fn:3">3</a><a id="e" href="">x</a>"##)
                .expect("parse should succeed");
        let r = tree.element_by_id("r").expect("r exists");
        let e = tree.element_by_id("e").expect("e exists");
        assert_eq!(footnote_id(&tree, &r).as_deref(), Some("fn:3"));
        assert_eq!(footnote_id(&tree, &e), None);
    }

    #[test]
    fn second_pass_leaves_decorated_references_alone() {
        let mut tree = DocumentTree::parse_html(PAGE).expect("parse should succeed");
        let config = FootnoteConfig::default();
        decorate_footnotes(&mut tree, &config);
        let once = tree.to_html();

        let report = decorate_footnotes(&mut tree, &config);
        assert_eq!(report, FootnoteReport { decorated: 0, skipped: 1 });
        assert_eq!(tree.to_html(), once);
        assert_eq!(tree.elements_by_class("has-footnote-tooltip").len(), 1);
        assert_eq!(tree.elements_by_class("footnote-tooltip").len(), 1);
    }
}
