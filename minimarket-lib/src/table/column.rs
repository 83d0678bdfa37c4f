//! Column descriptors for the data table.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::TableError;

use super::row::{Row, RowId};
use super::value::Value;

/// Custom cell renderer: `(value, row) -> display text`.
pub type CellRenderer = Arc<dyn Fn(&Value, &Row) -> String + Send + Sync>;

/// Maps a badge value to a style class (`"success"`, `"danger"`, ...).
pub type BadgeClass = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Handler run when a row action is invoked.
pub type ActionHandler = Arc<dyn Fn(&Row, &RowId) + Send + Sync>;

/// How a column's values are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Text,
    Currency,
    Date,
    #[serde(alias = "date_time")]
    DateTime,
    Badge,
    Actions,
}

/// Which input a front-end should offer for the column filter.
///
/// Every filter type matches as a case-insensitive substring; the type only
/// tells the renderer what control to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    Text,
    Select,
    Date,
    Number,
}

/// One choice of a `select` filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A button in an `actions` column.
#[derive(Clone)]
pub struct RowAction {
    /// Identifier passed to [`DataTable::invoke_action`](super::DataTable::invoke_action).
    pub name: String,
    /// Button label.
    pub label: String,
    /// Style hint (`primary`, `danger`, ...).
    pub style: String,
    /// What to run.
    pub handler: Option<ActionHandler>,
}

impl RowAction {
    /// Create an action without a handler.
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            style: "primary".to_string(),
            handler: None,
        }
    }

    /// Set the style hint.
    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Set the handler.
    pub fn handler(mut self, handler: impl Fn(&Row, &RowId) + Send + Sync + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }
}

impl fmt::Debug for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowAction")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("style", &self.style)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// Column configuration.
///
/// Columns describe how one field of a row is searched, filtered, sorted
/// and displayed. The `key` is a dotted path into the row.
///
/// # Examples
///
/// ```
/// use minimarket_lib::table::{Column, RowAction};
///
/// let columns = vec![
///     Column::new("name", "Producto"),
///     Column::new("price", "Precio").currency(),
///     Column::new("supplier.name", "Proveedor").sortable(false),
///     Column::actions("actions", "Acciones", vec![RowAction::new("edit", "Editar")]),
/// ];
/// ```
#[derive(Clone)]
pub struct Column {
    /// Dotted path of the field.
    pub key: String,
    /// Header text.
    pub title: String,
    /// Display kind.
    pub kind: ColumnKind,
    /// Whether header clicks sort by this column.
    pub sortable: bool,
    /// Whether search and filters look at this column.
    pub filterable: bool,
    /// Filter control hint.
    pub filter_type: FilterType,
    /// Choices for `select` filters.
    pub filter_options: Vec<FilterOption>,
    /// Custom display transform.
    pub render: Option<CellRenderer>,
    /// Badge style class.
    pub badge_class: Option<BadgeClass>,
    /// Buttons of an `actions` column.
    pub actions: Vec<RowAction>,
}

impl Column {
    /// Create a sortable, filterable text column.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            kind: ColumnKind::Text,
            sortable: true,
            filterable: true,
            filter_type: FilterType::Text,
            filter_options: Vec::new(),
            render: None,
            badge_class: None,
            actions: Vec::new(),
        }
    }

    /// Create an `actions` column. It never sorts and never filters.
    pub fn actions(key: impl Into<String>, title: impl Into<String>, actions: Vec<RowAction>) -> Self {
        let mut column = Self::new(key, title).kind(ColumnKind::Actions);
        column.actions = actions;
        column
    }

    /// Set the display kind.
    pub fn kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        if kind == ColumnKind::Actions {
            self.sortable = false;
            self.filterable = false;
        }
        self
    }

    /// Display as currency.
    pub fn currency(self) -> Self {
        self.kind(ColumnKind::Currency)
    }

    /// Display as date.
    pub fn date(self) -> Self {
        self.kind(ColumnKind::Date).filter_type(FilterType::Date)
    }

    /// Display as date and time.
    pub fn date_time(self) -> Self {
        self.kind(ColumnKind::DateTime).filter_type(FilterType::Date)
    }

    /// Display as a badge, optionally styled by `class`.
    pub fn badge(mut self, class: Option<BadgeClass>) -> Self {
        self.badge_class = class;
        self.kind(ColumnKind::Badge)
    }

    /// Enable or disable sorting.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable && self.kind != ColumnKind::Actions;
        self
    }

    /// Enable or disable search and filtering.
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable && self.kind != ColumnKind::Actions;
        self
    }

    /// Set the filter control hint.
    pub fn filter_type(mut self, filter_type: FilterType) -> Self {
        self.filter_type = filter_type;
        self
    }

    /// Use a `select` filter with these choices.
    pub fn filter_options(mut self, options: Vec<FilterOption>) -> Self {
        self.filter_type = FilterType::Select;
        self.filter_options = options;
        self
    }

    /// Set a custom display transform.
    pub fn render(mut self, render: impl Fn(&Value, &Row) -> String + Send + Sync + 'static) -> Self {
        self.render = Some(Arc::new(render));
        self
    }

    /// Whether this is an `actions` column.
    pub fn is_actions(&self) -> bool {
        self.kind == ColumnKind::Actions
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("kind", &self.kind)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("filter_type", &self.filter_type)
            .field("render", &self.render.is_some())
            .field("actions", &self.actions)
            .finish()
    }
}

/// An ordered set of columns with unique keys.
#[derive(Debug, Clone, Default)]
pub struct ColumnSet {
    columns: Vec<Column>,
}

impl ColumnSet {
    /// Validate and wrap `columns`.
    ///
    /// Fails on the first duplicated key.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.key.as_str()) {
                return Err(TableError::duplicate_column(&column.key));
            }
        }
        Ok(Self { columns })
    }

    /// Look up a column by key.
    pub fn get(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Iterate columns in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    /// Columns that take part in search and filters.
    pub fn filterable(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.filterable)
    }

    /// Columns that hold data (everything but `actions`).
    pub fn data_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.is_actions())
    }

    /// The first `actions` column, if any.
    pub fn actions_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_actions())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> IntoIterator for &'a ColumnSet {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_rejected() {
        let err = ColumnSet::new(vec![
            Column::new("name", "Nombre"),
            Column::new("price", "Precio"),
            Column::new("name", "Otra"),
        ])
        .unwrap_err();
        assert_eq!(err, TableError::duplicate_column("name"));
    }

    #[test]
    fn test_actions_column_never_sorts_or_filters() {
        let col = Column::actions("actions", "Acciones", vec![])
            .sortable(true)
            .filterable(true);
        assert!(!col.sortable);
        assert!(!col.filterable);
    }

    #[test]
    fn test_defaults() {
        let col = Column::new("name", "Nombre");
        assert!(col.sortable);
        assert!(col.filterable);
        assert_eq!(col.kind, ColumnKind::Text);
        assert_eq!(col.filter_type, FilterType::Text);
    }
}
