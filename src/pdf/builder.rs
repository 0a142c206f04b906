use pdf_writer::Content;

// US Letter. Every page of the base document shares this geometry.
pub(crate) const PAGE_WIDTH: f32 = 612.0;
pub(crate) const PAGE_HEIGHT: f32 = 792.0;
pub(crate) const MARGIN: f32 = 50.0;
pub(crate) const BOTTOM_MARGIN: f32 = 50.0;

/// Fixed row unit. Section headers reserve two units, table rows one.
pub(crate) const ROW_HEIGHT: f32 = 18.0;

pub(crate) const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

/// Owns the page list and the cursor during base-document assembly.
///
/// Pagination is resolved before drawing, never after: callers check
/// [`fits`](Self::fits) / call [`ensure_space`](Self::ensure_space) for the
/// rows they are about to draw, then draw into [`page`](Self::page). The
/// cursor always points at the last page.
pub(crate) struct ReportBuilder {
    pages: Vec<Content>,
    y: f32,
}

impl ReportBuilder {
    pub(crate) fn new() -> Self {
        ReportBuilder {
            pages: vec![Content::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    /// Current vertical position (PDF coordinates, y grows upward).
    pub(crate) fn y(&self) -> f32 {
        self.y
    }

    /// Move the cursor down after drawing.
    pub(crate) fn advance(&mut self, dy: f32) {
        self.y -= dy;
    }

    /// Whether `row_units` fixed-height rows fit above the bottom margin.
    pub(crate) fn fits(&self, row_units: usize) -> bool {
        self.y - row_units as f32 * ROW_HEIGHT >= BOTTOM_MARGIN
    }

    /// Allocate a new page and reset the cursor if the pending rows would
    /// cross the bottom margin. The single page-break transition.
    pub(crate) fn ensure_space(&mut self, row_units: usize) {
        if !self.fits(row_units) {
            self.new_page();
        }
    }

    /// Start a fresh page unconditionally (image pages always do).
    pub(crate) fn new_page(&mut self) {
        self.pages.push(Content::new());
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// The page currently under the cursor.
    pub(crate) fn page(&mut self) -> &mut Content {
        self.pages.last_mut().expect("builder always owns a page")
    }

    pub(crate) fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub(crate) fn into_pages(self) -> Vec<Content> {
        self.pages
    }
}
