use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::CellError;

/// A single scalar datum of a row.
///
/// `Null` is its own tag and never stands in for a zero, an empty string or
/// `false`. Values are immutable once built; converters only read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    /// Instant plus the offset it was observed at.
    Timestamp(DateTime<FixedOffset>),
    Null,
}

/// Tag of a [`CellValue`] without its payload. Used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Integer,
    Float,
    Text,
    Boolean,
    Timestamp,
    Null,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellKind::Integer => "integer",
            CellKind::Float => "float",
            CellKind::Text => "text",
            CellKind::Boolean => "boolean",
            CellKind::Timestamp => "timestamp",
            CellKind::Null => "null",
        };
        f.write_str(name)
    }
}

impl CellValue {
    pub fn kind(&self) -> CellKind {
        match self {
            CellValue::Integer(_) => CellKind::Integer,
            CellValue::Float(_) => CellKind::Float,
            CellValue::Text(_) => CellKind::Text,
            CellValue::Boolean(_) => CellKind::Boolean,
            CellValue::Timestamp(_) => CellKind::Timestamp,
            CellValue::Null => CellKind::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    // Typed accessors. Each one fails with `TypeMismatch` on any other tag,
    // including `Null`; nothing is coerced.

    pub fn as_integer(&self) -> Result<i64, CellError> {
        match self {
            CellValue::Integer(v) => Ok(*v),
            other => Err(CellError::mismatch(CellKind::Integer, other.kind())),
        }
    }

    pub fn as_float(&self) -> Result<f64, CellError> {
        match self {
            CellValue::Float(v) => Ok(*v),
            other => Err(CellError::mismatch(CellKind::Float, other.kind())),
        }
    }

    pub fn as_text(&self) -> Result<&str, CellError> {
        match self {
            CellValue::Text(v) => Ok(v),
            other => Err(CellError::mismatch(CellKind::Text, other.kind())),
        }
    }

    pub fn as_boolean(&self) -> Result<bool, CellError> {
        match self {
            CellValue::Boolean(v) => Ok(*v),
            other => Err(CellError::mismatch(CellKind::Boolean, other.kind())),
        }
    }

    pub fn as_timestamp(&self) -> Result<DateTime<FixedOffset>, CellError> {
        match self {
            CellValue::Timestamp(v) => Ok(*v),
            other => Err(CellError::mismatch(CellKind::Timestamp, other.kind())),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(v) => write!(f, "{v}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(v) => write!(f, "{v:?}"),
            CellValue::Boolean(v) => write!(f, "{v}"),
            CellValue::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            CellValue::Null => f.write_str("NULL"),
        }
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Integer(i64::from(v))
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Boolean(v)
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<DateTime<FixedOffset>> for CellValue {
    fn from(v: DateTime<FixedOffset>) -> Self {
        CellValue::Timestamp(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Null, Into::into)
    }
}

/// Positional array of cells. `Row.0[i]` belongs to field `i` of whatever
/// entity it is mapped onto.
///
/// Values only, no names or types: all metadata lives in the
/// [`EntityDescriptor`](crate::mapping::EntityDescriptor). Length is whatever
/// the producer emitted; alignment is the caller's responsibility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(pub Vec<CellValue>);

impl Row {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.0.get(index)
    }

    pub fn push(&mut self, cell: impl Into<CellValue>) {
        self.0.push(cell.into());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CellValue> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<CellValue> {
        self.0
    }
}

impl From<Vec<CellValue>> for Row {
    fn from(cells: Vec<CellValue>) -> Self {
        Self(cells)
    }
}

impl FromIterator<CellValue> for Row {
    fn from_iter<I: IntoIterator<Item = CellValue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Row {
    type Item = CellValue;
    type IntoIter = std::vec::IntoIter<CellValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a CellValue;
    type IntoIter = std::slice::Iter<'a, CellValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Builds a [`Row`] from expressions convertible into [`CellValue`].
///
/// ```
/// use rowmap::{row, CellValue};
///
/// let r = row![7_i64, "Ann", CellValue::Null];
/// assert_eq!(r.len(), 3);
/// ```
#[macro_export]
macro_rules! row {
    () => {
        $crate::value::Row::new()
    };
    ($($cell:expr),+ $(,)?) => {
        $crate::value::Row(vec![$($crate::value::CellValue::from($cell)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_not_a_zero_value() {
        assert_ne!(CellValue::Null, CellValue::Integer(0));
        assert_ne!(CellValue::Null, CellValue::Text(String::new()));
        assert_ne!(CellValue::Null, CellValue::Boolean(false));
        assert!(CellValue::Null.is_null());
        assert!(!CellValue::Integer(0).is_null());
    }

    #[test]
    fn accessors_reject_other_tags() {
        let err = CellValue::Text("7".into()).as_integer().unwrap_err();
        assert_eq!(err, CellError::mismatch(CellKind::Integer, CellKind::Text));

        let err = CellValue::Null.as_text().unwrap_err();
        assert_eq!(err, CellError::mismatch(CellKind::Text, CellKind::Null));

        assert_eq!(CellValue::Float(1.5).as_float().unwrap(), 1.5);
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(CellValue::from(None::<i64>), CellValue::Null);
        assert_eq!(CellValue::from(Some("x")), CellValue::Text("x".into()));
    }

    #[test]
    fn row_macro_builds_positional_cells() {
        let r = crate::row![1_i64, "two", 3.0, true, CellValue::Null];
        assert_eq!(
            r.0,
            vec![
                CellValue::Integer(1),
                CellValue::Text("two".into()),
                CellValue::Float(3.0),
                CellValue::Boolean(true),
                CellValue::Null,
            ]
        );
        assert!(crate::row![].is_empty());
    }

    #[test]
    fn row_serializes_as_plain_array() {
        let r = crate::row![1_i64, CellValue::Null];
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"[{"Integer":1},"Null"]"#);
        let back: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn display_quotes_text_and_spells_null() {
        assert_eq!(CellValue::Text("Ann".into()).to_string(), "\"Ann\"");
        assert_eq!(CellValue::Null.to_string(), "NULL");
        assert_eq!(CellKind::Timestamp.to_string(), "timestamp");
    }
}
