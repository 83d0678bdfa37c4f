//! TableError for column set construction

/// Error raised while configuring a [`DataTable`](crate::table::DataTable).
///
/// Runtime operations on the table never fail; only a malformed column set
/// is rejected, and only at construction time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Two columns share the same key.
    #[error("Duplicate column key '{key}'")]
    DuplicateColumn { key: String },
}

impl TableError {
    /// Creates a new duplicate column error.
    pub fn duplicate_column(key: impl Into<String>) -> Self {
        Self::DuplicateColumn { key: key.into() }
    }
}
