//! Viewport geometry and scrolling ports.

/// Read access to layout geometry.
///
/// Values are read fresh on every call. Layout is volatile, so callers never
/// cache them across events.
pub trait ViewportGeometry {
    /// Element handle understood by this viewport.
    type Node;

    /// Top edge of `node` relative to the viewport top. Negative once the
    /// element has scrolled above the viewport.
    fn top_offset_of(&self, node: &Self::Node) -> f64;

    /// Height of the visible area.
    fn viewport_height(&self) -> f64;

    /// Full scrollable height of the document.
    fn document_height(&self) -> f64;

    /// Current vertical scroll position.
    fn current_scroll_y(&self) -> f64;

    /// Snapshot of the viewport-level values.
    fn metrics(&self) -> ViewportMetrics {
        ViewportMetrics {
            viewport_height: self.viewport_height(),
            document_height: self.document_height(),
            scroll_y: self.current_scroll_y(),
        }
    }

    /// Top edge of `node` relative to the document top.
    fn document_offset_of(&self, node: &Self::Node) -> f64 {
        self.top_offset_of(node) + self.current_scroll_y()
    }
}

/// Programmatic scrolling.
pub trait Scroller {
    /// Scroll the viewport as requested.
    fn scroll_to(&mut self, request: ScrollRequest);
}

/// Viewport-level values used by active heading selection.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportMetrics {
    /// Height of the visible area.
    pub viewport_height: f64,
    /// Full scrollable height of the document.
    pub document_height: f64,
    /// Current vertical scroll position.
    pub scroll_y: f64,
}

impl ViewportMetrics {
    /// Whether the content overflows the viewport.
    pub fn is_scrollable(&self) -> bool {
        self.document_height > self.viewport_height
    }

    /// Whether the viewport bottom reached the document bottom within `tolerance`.
    pub fn is_at_bottom(&self, tolerance: f64) -> bool {
        self.viewport_height + self.scroll_y >= self.document_height - tolerance
    }
}

/// Scroll animation style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollBehavior {
    /// Jump immediately.
    #[default]
    Instant,
    /// Animate.
    Smooth,
}

/// A request to scroll the viewport to an absolute document offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollRequest {
    /// Target scroll position in document coordinates.
    pub top: f64,
    /// Animation style.
    pub behavior: ScrollBehavior,
}

impl ScrollRequest {
    /// Jump straight to `top`.
    pub fn instant(top: f64) -> Self {
        Self {
            top,
            behavior: ScrollBehavior::Instant,
        }
    }

    /// Animate to `top`.
    pub fn smooth(top: f64) -> Self {
        Self {
            top,
            behavior: ScrollBehavior::Smooth,
        }
    }
}

/// Headless viewport with hand-placed elements.
///
/// Elements are placed at document offsets; their viewport offsets follow the
/// scroll position. Scrolling clamps to the scrollable range and completes
/// immediately regardless of behavior. Every request is recorded.
#[derive(Clone, Debug)]
pub struct SimulatedViewport<N> {
    viewport_height: f64,
    document_height: f64,
    scroll_y: f64,
    placements: Vec<(N, f64)>,
    requests: Vec<ScrollRequest>,
}

impl<N: PartialEq> SimulatedViewport<N> {
    /// Viewport of `viewport_height` over a document of `document_height`, scrolled to the top.
    pub fn new(viewport_height: f64, document_height: f64) -> Self {
        Self {
            viewport_height,
            document_height,
            scroll_y: 0.0,
            placements: Vec::with_capacity(8),
            requests: Vec::with_capacity(8),
        }
    }

    /// Place `node` at document offset `document_top`, replacing any earlier placement.
    pub fn place(&mut self, node: N, document_top: f64) {
        match self.placements.iter_mut().find(|(n, _)| *n == node) {
            Some(entry) => entry.1 = document_top,
            None => self.placements.push((node, document_top)),
        }
    }

    /// Change the document height (content reflow).
    pub fn set_document_height(&mut self, document_height: f64) {
        self.document_height = document_height;
    }

    /// Change the viewport height (window resize).
    pub fn set_viewport_height(&mut self, viewport_height: f64) {
        self.viewport_height = viewport_height;
    }

    /// Largest reachable scroll position.
    pub fn max_scroll_y(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }

    /// Every scroll request received so far, oldest first.
    pub fn requests(&self) -> &[ScrollRequest] {
        &self.requests
    }

    /// Most recent scroll request.
    pub fn last_request(&self) -> Option<&ScrollRequest> {
        self.requests.last()
    }
}

impl<N: PartialEq> ViewportGeometry for SimulatedViewport<N> {
    type Node = N;

    fn top_offset_of(&self, node: &N) -> f64 {
        let document_top = self
            .placements
            .iter()
            .find(|(n, _)| n == node)
            .map(|(_, top)| *top)
            .unwrap_or(0.0);
        document_top - self.scroll_y
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn document_height(&self) -> f64 {
        self.document_height
    }

    fn current_scroll_y(&self) -> f64 {
        self.scroll_y
    }
}

impl<N: PartialEq> Scroller for SimulatedViewport<N> {
    fn scroll_to(&mut self, request: ScrollRequest) {
        self.requests.push(request);
        self.scroll_y = request.top.clamp(0.0, self.max_scroll_y());
    }
}
