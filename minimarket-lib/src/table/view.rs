//! Derived, render-agnostic view of the table.

use super::row::{Row, RowId};

/// Target of [`DataTable::set_page`](super::DataTable::set_page).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// Explicit 1-based page number.
    Number(usize),
    /// The page before the current one.
    Prev,
    /// The page after the current one.
    Next,
}

impl From<usize> for PageRequest {
    fn from(page: usize) -> Self {
        PageRequest::Number(page)
    }
}

/// One row of the current page.
#[derive(Debug, Clone, Copy)]
pub struct ViewRow<'a> {
    /// Stable row id.
    pub id: &'a RowId,
    /// Position in the table's data set.
    pub index: usize,
    /// The row itself.
    pub row: &'a Row,
    /// Whether the row is selected.
    pub selected: bool,
}

/// Display content of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Text to show.
    pub text: String,
    /// Style class for badge cells.
    pub badge: Option<String>,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            badge: None,
        }
    }
}

/// Result of [`DataTable::derive_view`](super::DataTable::derive_view).
///
/// `page_start` and `page_end` are 1-based positions within the filtered
/// rows and are both 0 when the view is empty.
#[derive(Debug, Clone)]
pub struct TableView<'a> {
    /// Rows of the current page, in display order.
    pub rows: Vec<ViewRow<'a>>,
    /// Number of rows that passed search and filters.
    pub total_filtered: usize,
    /// Number of pages (0 when nothing passed the filters).
    pub total_pages: usize,
    /// Current 1-based page.
    pub current_page: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Position of the first row of the page.
    pub page_start: usize,
    /// Position of the last row of the page.
    pub page_end: usize,
    /// Whether the table is flagged as loading.
    pub loading: bool,
}

impl TableView<'_> {
    /// Check if the page holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a previous page exists.
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Whether a next page exists.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Whether every row on the page is selected (false for an empty page).
    pub fn all_selected(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(|r| r.selected)
    }

    /// Page numbers for a pager showing at most `max_visible` buttons,
    /// centred on the current page where possible.
    pub fn page_numbers(&self, max_visible: usize) -> Vec<usize> {
        if self.total_pages == 0 || max_visible == 0 {
            return Vec::new();
        }
        let mut start = self.current_page.saturating_sub(max_visible / 2).max(1);
        let end = (start + max_visible - 1).min(self.total_pages);
        if end + 1 - start < max_visible {
            start = (end + 1).saturating_sub(max_visible).max(1);
        }
        (start..=end).collect()
    }
}
