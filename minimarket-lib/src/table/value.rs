//! Value enum for dynamic row fields

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::row::Row;

/// A dynamic value held in a [`Row`] field.
///
/// # Type Mapping
///
/// | JSON | Rust Variant |
/// |------|--------------|
/// | null | `Null` |
/// | true/false | `Bool` |
/// | integer | `Int` |
/// | fractional number | `Float` |
/// | string | `Text` |
/// | array | `List` |
/// | object | `Record` |
///
/// `Date` and `DateTime` are never produced from JSON directly; text that
/// looks like a date is still parsed on demand by [`Value::as_datetime`].
///
/// # Example
///
/// ```
/// use minimarket_lib::table::Value;
///
/// let name = Value::from("Inca Kola");
/// let stock = Value::from(24);
/// let price = Value::from(3.5);
/// let empty = Value::Null;
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Null / missing value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time without timezone.
    DateTime(NaiveDateTime),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Nested record, reached through dotted paths.
    Record(Box<Row>),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    /// Borrow the text, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value. Text is parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Date-time view of the value.
    ///
    /// Dates map to midnight. Text is accepted as RFC 3339, ISO 8601 with or
    /// without a `T` separator, or a bare `YYYY-MM-DD` date.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => d.and_hms_opt(0, 0, 0),
            Value::DateTime(dt) => Some(*dt),
            Value::Text(s) => parse_datetime(s.trim()),
            _ => None,
        }
    }

    /// The nested record, if this is one.
    pub fn as_record(&self) -> Option<&Row> {
        match self {
            Value::Record(row) => Some(row),
            _ => None,
        }
    }

    /// Values with no defined ordering: null, NaN and empty text.
    fn is_undefined(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => f.is_nan(),
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Float(f) if f.is_nan() => 0,
            Value::Text(s) if s.is_empty() => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Date(_) | Value::DateTime(_) => 3,
            Value::Text(_) => 4,
            Value::List(_) => 5,
            Value::Record(_) => 6,
        }
    }

    /// Total ordering used for sorting.
    ///
    /// Undefined values (null, NaN, empty text) are equal to each other and
    /// less than every defined value. Numbers compare exactly, dates
    /// chronologically, text by code point. Values of different kinds order
    /// by kind (bool < number < date < text < list < record); nested records
    /// all compare equal.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self.is_undefined(), other.is_undefined()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }

        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Int(a), Value::Float(b)) => compare_int_float(*a, *b),
            (Value::Float(a), Value::Int(b)) => compare_int_float(*b, *a).reverse(),
            (Value::Date(_) | Value::DateTime(_), Value::Date(_) | Value::DateTime(_)) => {
                self.as_datetime().cmp(&other.as_datetime())
            }
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.compare(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Record(_), Value::Record(_)) => Ordering::Equal,
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Exact ordering of an integer against a non-NaN float, without rounding
/// the integer through `f64`.
fn compare_int_float(i: i64, f: f64) -> Ordering {
    // 2^63 is exactly representable; every float at or past it is out of range.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => whole.partial_cmp(&f).unwrap_or(Ordering::Equal),
        ord => ord,
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Raw stringification used for search, filters and plain cells.
///
/// Null prints as an empty string; lists are comma-joined.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Record(row) => {
                f.write_str("{")?;
                for (i, (key, value)) in row.fields().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<Row> for Value {
    fn from(v: Row) -> Self {
        Value::Record(Box::new(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Record(Box::new(Row::from(obj))),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(5.0).to_string(), "5");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(
            Value::from(vec![Value::from(1), Value::from("a")]).to_string(),
            "1,a"
        );
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(Value::from(date).to_string(), "2024-02-29");
    }

    #[test]
    fn test_compare_undefined_is_least() {
        assert_eq!(Value::Null.compare(&Value::Null), Ordering::Equal);
        assert_eq!(Value::Null.compare(&Value::from(-100)), Ordering::Less);
        assert_eq!(Value::from("a").compare(&Value::Null), Ordering::Greater);
        assert_eq!(Value::from(f64::NAN).compare(&Value::Null), Ordering::Equal);
    }

    #[test]
    fn test_compare_numbers_across_int_and_float() {
        assert_eq!(Value::from(2).compare(&Value::from(2.5)), Ordering::Less);
        assert_eq!(Value::from(3.0).compare(&Value::from(3)), Ordering::Equal);
    }

    #[test]
    fn test_empty_text_is_undefined() {
        assert_eq!(Value::from("").compare(&Value::Null), Ordering::Equal);
        assert_eq!(Value::from("").compare(&Value::from(false)), Ordering::Less);
        assert_eq!(Value::from("a").compare(&Value::from("")), Ordering::Greater);
    }

    #[test]
    fn test_compare_int_float_exactly_beyond_f64_precision() {
        let big = 1_i64 << 53;
        let low = Value::from(big);
        let mid = Value::from(big as f64);
        let high = Value::from(big + 1);

        assert_eq!(low.compare(&mid), Ordering::Equal);
        assert_eq!(high.compare(&mid), Ordering::Greater);
        assert_eq!(mid.compare(&high), Ordering::Less);
        assert_eq!(high.compare(&low), Ordering::Greater);

        assert_eq!(Value::from(-3).compare(&Value::from(-2.5)), Ordering::Less);
        assert_eq!(Value::from(-2).compare(&Value::from(-2.5)), Ordering::Greater);
        assert_eq!(Value::from(i64::MAX).compare(&Value::from(1e19)), Ordering::Less);
        assert_eq!(Value::from(i64::MIN).compare(&Value::from(-1e19)), Ordering::Greater);
    }

    #[test]
    fn test_compare_dates() {
        let d = Value::from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let dt = Value::from(
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        );
        assert_eq!(d.compare(&dt), Ordering::Less);
    }

    #[test]
    fn test_compare_mixed_kinds_by_rank() {
        assert_eq!(Value::from(10).compare(&Value::from("1")), Ordering::Less);
        assert_eq!(Value::from(true).compare(&Value::from(0)), Ordering::Less);
    }

    #[test]
    fn test_as_datetime_parses_text() {
        let v = Value::from("2024-05-01T10:30:00Z");
        assert_eq!(
            v.as_datetime(),
            NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(10, 30, 0)
        );
        assert!(Value::from("tomorrow").as_datetime().is_none());
    }

    #[test]
    fn test_from_json() {
        let json: serde_json::Value = serde_json::json!({"a": 1, "b": 1.5, "c": [true]});
        let value = Value::from(json);
        let row = value.as_record().unwrap();
        assert_eq!(row.get("a"), Some(&Value::Int(1)));
        assert_eq!(row.get("b"), Some(&Value::Float(1.5)));
        assert_eq!(row.get("c"), Some(&Value::List(vec![Value::Bool(true)])));
    }
}
