//! Events published by the data table.

use super::row::RowId;
use super::state::SortDirection;

/// A state change of a [`DataTable`](super::DataTable).
///
/// Delivered to subscribers after the change has been applied, so calling
/// `derive_view()` from a subscriber sees the new state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// Rows were replaced, added, updated or removed.
    DataChanged { total: usize },
    /// The search term changed.
    SearchChanged { term: String },
    /// A column filter was set (`Some`) or cleared (`None`).
    FilterChanged { column: String, value: Option<String> },
    /// Sort column or direction changed.
    SortChanged {
        column: String,
        direction: SortDirection,
    },
    /// Sorting was switched off.
    SortCleared,
    /// The current page changed.
    PageChanged { page: usize },
    /// The page size changed.
    PageSizeChanged { page_size: usize },
    /// The selected row ids changed.
    SelectionChanged { selected: Vec<RowId> },
    /// The loading flag changed.
    LoadingChanged { loading: bool },
}
