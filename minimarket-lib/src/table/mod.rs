//! Tabular data engine.
//!
//! [`DataTable`] holds a row collection and its column descriptors and
//! derives a filtered → sorted → paginated [`TableView`] on demand. It knows
//! nothing about rendering; a front-end draws the view and feeds user input
//! back through the mutation methods.
//!
//! # Example
//!
//! ```
//! use minimarket_lib::table::{Column, DataTable, Row};
//!
//! let mut table = DataTable::new(vec![
//!     Column::new("name", "Producto"),
//!     Column::new("price", "Precio").currency(),
//! ])
//! .unwrap();
//!
//! table.set_data(vec![
//!     Row::new().set("id", 1).set("name", "Coke").set("price", 5),
//!     Row::new().set("id", 2).set("name", "Bread").set("price", 2),
//! ]);
//! table.set_sort("price");
//!
//! let view = table.derive_view();
//! assert_eq!(view.rows[0].row.get("name").unwrap().to_string(), "Bread");
//! ```

mod column;
mod csv;
mod events;
mod options;
mod row;
mod selection;
mod state;
mod value;
mod view;

pub use column::{
    ActionHandler, BadgeClass, CellRenderer, Column, ColumnKind, ColumnSet, FilterOption, FilterType,
    RowAction,
};
pub use csv::{escape_field, export_file_name};
pub use events::TableEvent;
pub use options::TableOptions;
pub use row::{ID_FIELD, Row, RowId};
pub use selection::{Selection, SelectionMode};
pub use state::{DataTable, SortDirection, SortState, ViewState};
pub use value::Value;
pub use view::{Cell, PageRequest, TableView, ViewRow};
