//! Table behaviour options.

use serde::{Deserialize, Serialize};

use super::selection::SelectionMode;

/// Options controlling paging, sorting and selection of a [`DataTable`](super::DataTable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Rows per page.
    pub page_size: usize,
    /// Page sizes a front-end offers.
    pub page_size_options: Vec<usize>,
    /// When false the view holds every filtered row on a single page.
    pub pageable: bool,
    /// When false `set_sort` is ignored for every column.
    pub sortable: bool,
    /// How rows may be selected.
    pub selection_mode: SelectionMode,
    /// Number of page buttons in the pager window.
    pub page_window: usize,
    /// Text shown for an empty view.
    pub empty_message: String,
    /// Text shown while loading.
    pub loading_message: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            page_size: 10,
            page_size_options: vec![10, 25, 50, 100],
            pageable: true,
            sortable: true,
            selection_mode: SelectionMode::Multiple,
            page_window: 5,
            empty_message: "No hay datos disponibles".to_string(),
            loading_message: "Cargando...".to_string(),
        }
    }
}
