//! Data table state and its filter → sort → paginate pipeline.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::TableError;
use crate::events::{Listeners, SubscriptionId};
use crate::format::Formatter;

use super::column::{Column, ColumnKind, ColumnSet};
use super::events::TableEvent;
use super::options::TableOptions;
use super::row::{Row, RowId};
use super::selection::{Selection, SelectionMode};
use super::value::Value;
use super::view::{Cell, PageRequest, TableView, ViewRow};

static NULL: Value = Value::Null;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub column: String,
    pub direction: SortDirection,
}

/// Search, filter, sort and paging state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// Case-insensitive search across filterable columns.
    pub search_term: String,
    /// Active per-column filters (never holds empty values).
    pub filters: BTreeMap<String, String>,
    /// Current sort, if any.
    pub sort: Option<SortState>,
    /// 1-based page.
    pub current_page: usize,
    /// Rows per page, at least 1.
    pub page_size: usize,
}

impl ViewState {
    fn new(page_size: usize) -> Self {
        Self {
            search_term: String::new(),
            filters: BTreeMap::new(),
            sort: None,
            current_page: 1,
            page_size: page_size.max(1),
        }
    }
}

/// A render-agnostic data table.
///
/// `DataTable` owns:
/// - Column descriptors (validated once, at construction)
/// - A shared, copy-on-write row collection
/// - View state (search, filters, sort, page)
/// - Selection by row id
/// - Subscribers notified after every state change
///
/// All mutations are total: unknown columns, out-of-range pages and unknown
/// row ids are ignored. After every mutation the current page is clamped to
/// `[1, max(1, total_pages)]`.
pub struct DataTable {
    columns: ColumnSet,
    rows: Arc<Vec<Row>>,
    ids: Vec<RowId>,
    positions: HashMap<RowId, usize>,
    options: TableOptions,
    formatter: Formatter,
    state: ViewState,
    selection: Selection,
    loading: bool,
    listeners: Listeners<TableEvent>,
}

impl DataTable {
    /// Create an empty table with column definitions.
    ///
    /// Fails if two columns share a key.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let options = TableOptions::default();
        Ok(Self {
            columns: ColumnSet::new(columns)?,
            rows: Arc::new(Vec::new()),
            ids: Vec::new(),
            positions: HashMap::new(),
            state: ViewState::new(options.page_size),
            options,
            formatter: Formatter::default(),
            selection: Selection::new(),
            loading: false,
            listeners: Listeners::new(),
        })
    }

    /// Apply options (page size, selection mode, ...).
    pub fn with_options(mut self, options: TableOptions) -> Self {
        self.state.page_size = options.page_size.max(1);
        self.state.current_page = 1;
        if options.selection_mode == SelectionMode::None {
            self.selection.clear();
        }
        self.options = options;
        self
    }

    /// Use `formatter` for currency and date cells.
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Start with `rows`.
    pub fn with_rows(mut self, rows: impl Into<Arc<Vec<Row>>>) -> Self {
        self.rows = rows.into();
        self.reindex();
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The column set.
    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// The options in use.
    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// The current view state.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// All rows, unfiltered.
    pub fn rows(&self) -> &Arc<Vec<Row>> {
        &self.rows
    }

    /// Number of rows, unfiltered.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Current sort column.
    pub fn sort_column(&self) -> Option<&str> {
        self.state.sort.as_ref().map(|s| s.column.as_str())
    }

    /// Current sort direction (ascending when unsorted).
    pub fn sort_direction(&self) -> SortDirection {
        self.state
            .sort
            .as_ref()
            .map(|s| s.direction)
            .unwrap_or_default()
    }

    /// Whether the loading flag is set.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Find a row by id.
    pub fn row(&self, id: &RowId) -> Option<&Row> {
        self.positions.get(id).map(|&i| &self.rows[i])
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    /// Subscribe to state changes.
    pub fn subscribe(&mut self, listener: impl Fn(&TableEvent) + Send + Sync + 'static) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    /// Remove a subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn emit(&self, event: TableEvent) {
        self.listeners.emit(&event);
    }

    // -------------------------------------------------------------------------
    // Data
    // -------------------------------------------------------------------------

    /// Replace all rows. Resets to page 1 and clears the selection.
    pub fn set_data(&mut self, rows: impl Into<Arc<Vec<Row>>>) {
        self.rows = rows.into();
        self.reindex();
        self.state.current_page = 1;
        let had_selection = !self.selection.clear().is_empty();

        log::debug!("Table data replaced: {} rows", self.rows.len());
        self.emit(TableEvent::DataChanged {
            total: self.rows.len(),
        });
        if had_selection {
            self.emit_selection();
        }
    }

    /// Append a row.
    pub fn add_row(&mut self, row: Row) {
        Arc::make_mut(&mut self.rows).push(row);
        self.reindex();
        self.clamp_page();
        self.emit(TableEvent::DataChanged {
            total: self.rows.len(),
        });
    }

    /// Merge `patch` into the row with `id`. Returns false if no such row.
    pub fn update_row(&mut self, id: &RowId, patch: &Row) -> bool {
        let Some(&index) = self.positions.get(id) else {
            log::debug!("Ignoring update of unknown row {}", id);
            return false;
        };
        Arc::make_mut(&mut self.rows)[index].merge(patch);
        self.reindex();

        // A patched id field renames the row; the selection follows it.
        let before = self.selection.selected();
        let new_id = self.ids[index].clone();
        if new_id != *id && self.selection.is_selected(id) {
            self.selection.forget(id);
            self.selection.select_all(std::slice::from_ref(&new_id));
        }
        let positions = &self.positions;
        self.selection.retain(|sel| positions.contains_key(sel));

        self.clamp_page();
        self.emit(TableEvent::DataChanged {
            total: self.rows.len(),
        });
        if self.selection.selected() != before {
            self.emit_selection();
        }
        true
    }

    /// Remove the row with `id`, dropping it from the selection.
    /// Returns false if no such row.
    pub fn remove_row(&mut self, id: &RowId) -> bool {
        let Some(&index) = self.positions.get(id) else {
            log::debug!("Ignoring removal of unknown row {}", id);
            return false;
        };
        Arc::make_mut(&mut self.rows).remove(index);

        // Positional ids after the removed row shift down by one.
        let before = self.selection.selected();
        let mut after = Selection::new();
        let shifted: Vec<RowId> = before
            .iter()
            .filter(|sel| *sel != id)
            .map(|sel| match sel {
                RowId::Index(i) if *i > index => RowId::Index(i - 1),
                other => other.clone(),
            })
            .collect();
        after.select_all(&shifted);
        self.selection = after;

        self.reindex();
        self.clamp_page();
        self.emit(TableEvent::DataChanged {
            total: self.rows.len(),
        });
        if self.selection.selected() != before {
            self.emit_selection();
        }
        true
    }

    /// Set the loading flag shown in the view.
    pub fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.emit(TableEvent::LoadingChanged { loading });
        }
    }

    fn reindex(&mut self) {
        self.ids = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| RowId::resolve(row, i))
            .collect();
        self.positions.clear();
        for (i, id) in self.ids.iter().enumerate() {
            self.positions.entry(id.clone()).or_insert(i);
        }
    }

    // -------------------------------------------------------------------------
    // Search & filters
    // -------------------------------------------------------------------------

    /// Set the search term. Resets to page 1.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.state.search_term = term.into();
        self.state.current_page = 1;
        self.emit(TableEvent::SearchChanged {
            term: self.state.search_term.clone(),
        });
    }

    /// Set (or clear, with an empty value) the filter of one column.
    ///
    /// Unknown and non-filterable columns are ignored. Resets to page 1.
    pub fn set_filter(&mut self, column_key: &str, value: impl Into<String>) {
        if !self.columns.get(column_key).is_some_and(|c| c.filterable) {
            log::debug!("Ignoring filter on unknown or non-filterable column '{}'", column_key);
            return;
        }

        let value = value.into();
        let value = if value.is_empty() {
            self.state.filters.remove(column_key);
            None
        } else {
            self.state.filters.insert(column_key.to_string(), value.clone());
            Some(value)
        };
        self.state.current_page = 1;
        self.emit(TableEvent::FilterChanged {
            column: column_key.to_string(),
            value,
        });
    }

    /// Clear search and every filter.
    pub fn clear_filters(&mut self) {
        let columns: Vec<String> = self.state.filters.keys().cloned().collect();
        for column in columns {
            self.set_filter(&column, "");
        }
        if !self.state.search_term.is_empty() {
            self.set_search_term("");
        }
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Sort by `column_key`.
    ///
    /// Sorting by the current column flips the direction; a new column
    /// starts ascending. Unknown or non-sortable columns are ignored.
    pub fn set_sort(&mut self, column_key: &str) {
        let sortable = self.options.sortable
            && self.columns.get(column_key).is_some_and(|c| c.sortable);
        if !sortable {
            log::debug!("Ignoring sort on unknown or non-sortable column '{}'", column_key);
            return;
        }

        let new_sort = match &self.state.sort {
            Some(current) if current.column == column_key => SortState {
                column: current.column.clone(),
                direction: current.direction.toggle(),
            },
            _ => SortState {
                column: column_key.to_string(),
                direction: SortDirection::Asc,
            },
        };
        let event = TableEvent::SortChanged {
            column: new_sort.column.clone(),
            direction: new_sort.direction,
        };
        self.state.sort = Some(new_sort);
        self.emit(event);
    }

    /// Clear sort state; rows return to data order.
    pub fn clear_sort(&mut self) {
        if self.state.sort.take().is_some() {
            self.emit(TableEvent::SortCleared);
        }
    }

    // -------------------------------------------------------------------------
    // Paging
    // -------------------------------------------------------------------------

    /// Move to a page. Out-of-range numbers are clamped; `Prev` on the first
    /// page and `Next` on the last are no-ops.
    pub fn set_page(&mut self, request: impl Into<PageRequest>) {
        let max_page = self.total_pages().max(1);
        let current = self.state.current_page;
        let target = match request.into() {
            PageRequest::Number(n) => n.clamp(1, max_page),
            PageRequest::Prev => current.saturating_sub(1).max(1),
            PageRequest::Next => (current + 1).min(max_page),
        };
        if target != current {
            self.state.current_page = target;
            self.emit(TableEvent::PageChanged { page: target });
        }
    }

    /// Change the page size. Zero is ignored. Resets to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        if page_size == 0 {
            log::debug!("Ignoring page size 0");
            return;
        }
        self.state.page_size = page_size;
        self.state.current_page = 1;
        self.emit(TableEvent::PageSizeChanged { page_size });
    }

    /// Number of pages for the current filters (0 when nothing matches).
    pub fn total_pages(&self) -> usize {
        self.pages_for(self.filtered_indices().len())
    }

    fn pages_for(&self, filtered: usize) -> usize {
        if !self.options.pageable {
            return usize::from(filtered > 0);
        }
        filtered.div_ceil(self.state.page_size)
    }

    fn clamp_page(&mut self) {
        let max_page = self.total_pages().max(1);
        let clamped = self.state.current_page.clamp(1, max_page);
        if clamped != self.state.current_page {
            self.state.current_page = clamped;
            self.emit(TableEvent::PageChanged { page: clamped });
        }
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Get all selected ids, sorted.
    pub fn selected_ids(&self) -> Vec<RowId> {
        self.selection.selected()
    }

    /// Get the selected rows in data order.
    pub fn selected_rows(&self) -> Vec<&Row> {
        self.ids
            .iter()
            .zip(self.rows.iter())
            .filter(|(id, _)| self.selection.is_selected(id))
            .map(|(_, row)| row)
            .collect()
    }

    /// Check if a row is selected.
    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selection.is_selected(id)
    }

    /// Toggle selection of one row. Unknown ids are ignored.
    pub fn toggle_select(&mut self, id: &RowId) {
        if !self.positions.contains_key(id) {
            log::debug!("Ignoring selection of unknown row {}", id);
            return;
        }
        let (added, removed) = match self.options.selection_mode {
            SelectionMode::None => return,
            SelectionMode::Single if !self.selection.is_selected(id) => self.selection.select(id),
            SelectionMode::Single | SelectionMode::Multiple => self.selection.toggle(id),
        };
        if !added.is_empty() || !removed.is_empty() {
            self.emit_selection();
        }
    }

    /// Select every row of the current page, or deselect them all when they
    /// are already all selected. Rows on other pages keep their state.
    pub fn toggle_select_all(&mut self) {
        if self.options.selection_mode != SelectionMode::Multiple {
            return;
        }
        let (page_ids, all_selected) = {
            let view = self.derive_view();
            let ids: Vec<RowId> = view.rows.iter().map(|r| r.id.clone()).collect();
            (ids, view.all_selected())
        };
        if page_ids.is_empty() {
            return;
        }
        let changed = if all_selected {
            self.selection.deselect_all(&page_ids)
        } else {
            self.selection.select_all(&page_ids)
        };
        if !changed.is_empty() {
            self.emit_selection();
        }
    }

    /// Clear the whole selection.
    pub fn clear_selection(&mut self) {
        if !self.selection.clear().is_empty() {
            self.emit_selection();
        }
    }

    fn emit_selection(&self) {
        self.emit(TableEvent::SelectionChanged {
            selected: self.selection.selected(),
        });
    }

    // -------------------------------------------------------------------------
    // Pipeline
    // -------------------------------------------------------------------------

    fn resolve<'a>(row: &'a Row, key: &str) -> &'a Value {
        row.get_path(key).unwrap_or(&NULL)
    }

    fn matches_search(&self, row: &Row, term: &str) -> bool {
        self.columns
            .filterable()
            .any(|col| Self::resolve(row, &col.key).to_string().to_lowercase().contains(term))
    }

    fn matches_filters(&self, row: &Row, filters: &[(&str, String)]) -> bool {
        filters.iter().all(|(key, needle)| {
            Self::resolve(row, key).to_string().to_lowercase().contains(needle.as_str())
        })
    }

    /// Indices of rows passing search and filters, in sorted order.
    fn filtered_indices(&self) -> Vec<usize> {
        let term = self.state.search_term.to_lowercase();
        let filters: Vec<(&str, String)> = self
            .state
            .filters
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.as_str(), v.to_lowercase()))
            .collect();

        let mut indices: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| term.is_empty() || self.matches_search(row, &term))
            .filter(|(_, row)| self.matches_filters(row, &filters))
            .map(|(i, _)| i)
            .collect();

        if let Some(sort) = &self.state.sort {
            // Vec::sort_by is stable; desc flips the comparison, not the
            // result, so equal keys keep their relative order either way.
            indices.sort_by(|&a, &b| {
                let ord = Self::resolve(&self.rows[a], &sort.column)
                    .compare(Self::resolve(&self.rows[b], &sort.column));
                match sort.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }
        indices
    }

    /// Rows passing search and filters, sorted, across all pages.
    pub fn filtered_rows(&self) -> Vec<&Row> {
        self.filtered_indices()
            .into_iter()
            .map(|i| &self.rows[i])
            .collect()
    }

    /// Derive the current page. Pure: never changes state.
    pub fn derive_view(&self) -> TableView<'_> {
        let indices = self.filtered_indices();
        let total = indices.len();
        let page_size = self.state.page_size;

        let (start, end) = if self.options.pageable {
            let start = ((self.state.current_page - 1) * page_size).min(total);
            (start, (start + page_size).min(total))
        } else {
            (0, total)
        };

        let rows = indices[start..end]
            .iter()
            .map(|&i| ViewRow {
                id: &self.ids[i],
                index: i,
                row: &self.rows[i],
                selected: self.selection.is_selected(&self.ids[i]),
            })
            .collect();

        let (page_start, page_end) = if end > start { (start + 1, end) } else { (0, 0) };

        TableView {
            rows,
            total_filtered: total,
            total_pages: self.pages_for(total),
            current_page: self.state.current_page,
            page_size,
            page_start,
            page_end,
            loading: self.loading,
        }
    }

    // -------------------------------------------------------------------------
    // Cells & actions
    // -------------------------------------------------------------------------

    /// Display text of `column` for `row`.
    pub fn display_value(&self, row: &Row, column: &Column) -> String {
        self.cell(row, column).text
    }

    /// Display content of `column` for `row`.
    ///
    /// A custom renderer wins; otherwise the column kind decides.
    pub fn cell(&self, row: &Row, column: &Column) -> Cell {
        let value = Self::resolve(row, &column.key);
        if let Some(render) = &column.render {
            return Cell::text(render(value, row));
        }
        match column.kind {
            ColumnKind::Text => Cell::text(value.to_string()),
            ColumnKind::Currency => Cell::text(self.formatter.currency(value.as_f64().unwrap_or(0.0))),
            ColumnKind::Date => Cell::text(self.formatter.date(value)),
            ColumnKind::DateTime => Cell::text(self.formatter.date_time(value)),
            ColumnKind::Badge => Cell {
                text: value.to_string(),
                badge: Some(
                    column
                        .badge_class
                        .as_ref()
                        .map(|class| class(value))
                        .unwrap_or_else(|| "primary".to_string()),
                ),
            },
            ColumnKind::Actions => Cell::text(
                column
                    .actions
                    .iter()
                    .map(|a| a.label.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        }
    }

    /// Display content of every column for `row`.
    pub fn cells(&self, row: &Row) -> Vec<Cell> {
        self.columns.iter().map(|col| self.cell(row, col)).collect()
    }

    /// Run the handler of action `name` of the actions column on row `id`.
    ///
    /// Returns false if the row, the action or its handler is missing.
    pub fn invoke_action(&self, name: &str, id: &RowId) -> bool {
        let handler = self
            .columns
            .actions_column()
            .and_then(|col| col.actions.iter().find(|a| a.name == name))
            .and_then(|a| a.handler.as_ref());
        let (Some(handler), Some(row)) = (handler, self.row(id)) else {
            log::debug!("Ignoring action '{}' on row {}", name, id);
            return false;
        };
        handler(row, id);
        true
    }
}

impl fmt::Debug for DataTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataTable")
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("state", &self.state)
            .field("selection", &self.selection)
            .field("loading", &self.loading)
            .field("listeners", &self.listeners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products() -> DataTable {
        DataTable::new(vec![
            Column::new("name", "Producto"),
            Column::new("price", "Precio").currency(),
        ])
        .unwrap()
        .with_rows(vec![
            Row::new().set("id", 1).set("name", "Coke").set("price", 5),
            Row::new().set("id", 2).set("name", "Bread").set("price", 2),
            Row::new().set("id", 3).set("name", "Milk").set("price", 5),
        ])
    }

    #[test]
    fn test_sort_toggle_cycle() {
        let mut table = products();
        table.set_sort("price");
        assert_eq!(table.sort_direction(), SortDirection::Asc);
        table.set_sort("price");
        assert_eq!(table.sort_direction(), SortDirection::Desc);
        assert_eq!(table.sort_column(), Some("price"));
        table.set_sort("price");
        assert_eq!(table.sort_direction(), SortDirection::Asc);
        table.set_sort("name");
        assert_eq!(table.sort_column(), Some("name"));
        assert_eq!(table.sort_direction(), SortDirection::Asc);
    }

    #[test]
    fn test_unknown_sort_column_ignored() {
        let mut table = products();
        table.set_sort("nope");
        assert_eq!(table.sort_column(), None);
    }

    #[test]
    fn test_cell_formatting() {
        let table = products();
        let row = &table.rows()[0];
        let cells = table.cells(row);
        assert_eq!(cells[0].text, "Coke");
        assert_eq!(cells[1].text, "S/ 5.00");
    }

    #[test]
    fn test_custom_render_wins() {
        let table = DataTable::new(vec![
            Column::new("stock", "Stock").render(|v, _| format!("{} u.", v)),
        ])
        .unwrap();
        let row = Row::new().set("stock", 12);
        assert_eq!(table.display_value(&row, table.columns().get("stock").unwrap()), "12 u.");
    }

    #[test]
    fn test_not_pageable_single_page() {
        let mut table = products().with_options(TableOptions {
            pageable: false,
            page_size: 1,
            ..TableOptions::default()
        });
        let view = table.derive_view();
        assert_eq!(view.rows.len(), 3);
        assert_eq!(view.total_pages, 1);
        table.set_page(PageRequest::Next);
        assert_eq!(table.state().current_page, 1);
    }
}
