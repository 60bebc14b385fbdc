mod common;

use common::budget_alloc::BudgetAlloc;
use common::fixtures::{synthetic_page, synthetic_viewport};
use page_enhance::{DocumentTree, EnhanceOptions, Page};

const SECTIONS: usize = 200;
const SECTION_HEIGHT: f64 = 900.0;
// A scroll evaluation only needs one offset per heading on top of the
// class-list edits. Keep a guardrail well above that.
const SCROLL_BUDGET_BYTES: usize = 32 * 1024;

#[global_allocator]
static ALLOC: BudgetAlloc = BudgetAlloc::new();

#[test]
fn scroll_evaluation_stays_under_budget_on_long_pages() {
    let html = synthetic_page(SECTIONS);
    let tree = DocumentTree::parse_html(&html).unwrap_or_else(|e| panic!("parse synthetic: {}", e));
    let viewport = synthetic_viewport(&tree, SECTIONS, SECTION_HEIGHT);
    let mut page = Page::load(tree, viewport, EnhanceOptions::default());
    let report = page.report().copied().expect("enhanced");
    assert_eq!(report.headings, SECTIONS);
    assert_eq!(report.footnotes.decorated, SECTIONS);

    let mut worst = 0usize;
    for step in [0usize, 1, 17, 99, 150, 199] {
        let top = SECTION_HEIGHT * step as f64 + 100.0;
        ALLOC.reset();
        page.scroll_to(top);
        let peak = ALLOC.peak_bytes();
        worst = worst.max(peak);

        let expected = format!("section-{step}");
        assert_eq!(page.active_heading_id(), Some(expected.as_str()));
        assert!(
            peak <= SCROLL_BUDGET_BYTES,
            "scroll peak over budget at section {}: {} bytes ({:.1}KB), budget: {}KB",
            step,
            peak,
            peak as f64 / 1024.0,
            SCROLL_BUDGET_BYTES / 1024
        );
    }
    println!(
        "scroll sections={} worst_peak_kib={:.1} allocs={}",
        SECTIONS,
        worst as f64 / 1024.0,
        ALLOC.alloc_count()
    );
}
