//! Row type and stable row identifiers

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use super::value::Value;

/// Name of the field holding a row's explicit identifier.
pub const ID_FIELD: &str = "id";

/// One record of a tabular data set.
///
/// A row maps field names to [`Value`]s. Nested rows are reached with dotted
/// paths through [`Row::get_path`].
///
/// # Example
///
/// ```
/// use minimarket_lib::table::{Row, Value};
///
/// let row = Row::new()
///     .set("id", 1)
///     .set("name", "Coke")
///     .set("supplier", Row::new().set("name", "Lindley"));
///
/// assert_eq!(row.get_path("supplier.name"), Some(&Value::from("Lindley")));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "serde_json::Map<String, serde_json::Value>")]
pub struct Row {
    fields: BTreeMap<String, Value>,
}

impl Row {
    /// Creates a new empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Resolve a dotted path (`"supplier.name"`) through nested records.
    ///
    /// Returns `None` as soon as a segment is missing or is not a record.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;
        for segment in segments {
            current = current.as_record()?.get(segment)?;
        }
        Some(current)
    }

    /// Returns `true` if the row contains the given top-level field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Copy every field of `patch` into this row, overwriting existing ones.
    pub fn merge(&mut self, patch: &Row) {
        for (key, value) in &patch.fields {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    /// The explicit identifier, if present and not null.
    pub fn explicit_id(&self) -> Option<&Value> {
        self.fields.get(ID_FIELD).filter(|v| !v.is_null())
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Row {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            fields: map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
        }
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Stable identifier of a row.
///
/// Rows carrying an `id` field are identified by its stringified value;
/// rows without one fall back to their position in the data set. The two
/// forms never compare equal, so `{"id": "3"}` and the fourth id-less row
/// stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowId {
    /// Explicit `id` field value.
    Key(String),
    /// Positional index in the data set.
    Index(usize),
}

impl RowId {
    /// Identify `row`, which sits at `index` in its data set.
    pub fn resolve(row: &Row, index: usize) -> Self {
        match row.explicit_id() {
            Some(value) => RowId::Key(value.to_string()),
            None => RowId::Index(index),
        }
    }

    /// Parse the [`Display`](fmt::Display) form back: `#3` is a positional
    /// id, anything else a key.
    pub fn parse(s: &str) -> Self {
        match s.strip_prefix('#').and_then(|n| n.parse().ok()) {
            Some(index) => RowId::Index(index),
            None => RowId::Key(s.to_string()),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Key(key) => f.write_str(key),
            RowId::Index(index) => write!(f, "#{}", index),
        }
    }
}

impl From<&str> for RowId {
    fn from(key: &str) -> Self {
        RowId::Key(key.to_string())
    }
}

impl From<String> for RowId {
    fn from(key: String) -> Self {
        RowId::Key(key)
    }
}

impl From<i64> for RowId {
    fn from(key: i64) -> Self {
        RowId::Key(key.to_string())
    }
}
