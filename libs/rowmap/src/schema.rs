use std::fmt;

use chrono::{DateTime, FixedOffset};

use crate::error::CellError;
use crate::value::{CellKind, CellValue};

/// Declared semantic type of an entity field.
///
/// Closed set: dispatch to a built-in converter is keyed on this tag, not
/// on runtime inspection of the value. Anything outside the set is recorded
/// as `Unsupported` with the Rust type name, so it can be reported later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticType {
    Integer32,
    Integer64,
    Float,
    Text,
    Boolean,
    Timestamp,
    Optional(Box<SemanticType>),
    Unsupported(&'static str),
}

impl SemanticType {
    /// `true` when a built-in converter exists for this type.
    pub fn is_builtin(&self) -> bool {
        match self {
            SemanticType::Optional(inner) => inner.is_builtin(),
            SemanticType::Unsupported(_) => false,
            _ => true,
        }
    }

    /// Cell tag produced on encode (and expected on decode) for a present value.
    pub fn cell_kind(&self) -> Option<CellKind> {
        match self {
            SemanticType::Integer32 | SemanticType::Integer64 => Some(CellKind::Integer),
            SemanticType::Float => Some(CellKind::Float),
            SemanticType::Text => Some(CellKind::Text),
            SemanticType::Boolean => Some(CellKind::Boolean),
            SemanticType::Timestamp => Some(CellKind::Timestamp),
            SemanticType::Optional(inner) => inner.cell_kind(),
            SemanticType::Unsupported(_) => None,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Integer32 => f.write_str("i32"),
            SemanticType::Integer64 => f.write_str("i64"),
            SemanticType::Float => f.write_str("f64"),
            SemanticType::Text => f.write_str("String"),
            SemanticType::Boolean => f.write_str("bool"),
            SemanticType::Timestamp => f.write_str("DateTime<FixedOffset>"),
            SemanticType::Optional(inner) => write!(f, "Option<{inner}>"),
            SemanticType::Unsupported(name) => f.write_str(name),
        }
    }
}

/// A field type with a built-in converter.
///
/// Decoding never coerces: a cell whose tag differs from the one this type
/// expects is a `TypeMismatch`. `Option<T>` is the only impl that accepts
/// `Null`.
pub trait FieldValue: Sized {
    fn semantic_type() -> SemanticType;
    fn from_cell(cell: &CellValue) -> Result<Self, CellError>;
    fn to_cell(&self) -> CellValue;
}

impl FieldValue for i64 {
    fn semantic_type() -> SemanticType {
        SemanticType::Integer64
    }

    fn from_cell(cell: &CellValue) -> Result<Self, CellError> {
        cell.as_integer()
    }

    fn to_cell(&self) -> CellValue {
        CellValue::Integer(*self)
    }
}

impl FieldValue for i32 {
    fn semantic_type() -> SemanticType {
        SemanticType::Integer32
    }

    /// Narrows the 64-bit cell; values outside `i32` fail instead of wrapping.
    fn from_cell(cell: &CellValue) -> Result<Self, CellError> {
        let value = cell.as_integer()?;
        i32::try_from(value).map_err(|_| CellError::OutOfRange {
            value,
            target: "i32",
        })
    }

    fn to_cell(&self) -> CellValue {
        CellValue::Integer(i64::from(*self))
    }
}

impl FieldValue for f64 {
    fn semantic_type() -> SemanticType {
        SemanticType::Float
    }

    fn from_cell(cell: &CellValue) -> Result<Self, CellError> {
        cell.as_float()
    }

    fn to_cell(&self) -> CellValue {
        CellValue::Float(*self)
    }
}

impl FieldValue for String {
    fn semantic_type() -> SemanticType {
        SemanticType::Text
    }

    fn from_cell(cell: &CellValue) -> Result<Self, CellError> {
        cell.as_text().map(str::to_owned)
    }

    fn to_cell(&self) -> CellValue {
        CellValue::Text(self.clone())
    }
}

impl FieldValue for bool {
    fn semantic_type() -> SemanticType {
        SemanticType::Boolean
    }

    fn from_cell(cell: &CellValue) -> Result<Self, CellError> {
        cell.as_boolean()
    }

    fn to_cell(&self) -> CellValue {
        CellValue::Boolean(*self)
    }
}

impl FieldValue for DateTime<FixedOffset> {
    fn semantic_type() -> SemanticType {
        SemanticType::Timestamp
    }

    fn from_cell(cell: &CellValue) -> Result<Self, CellError> {
        cell.as_timestamp()
    }

    fn to_cell(&self) -> CellValue {
        CellValue::Timestamp(*self)
    }
}

/// Built-in types that never hold `Null` themselves, and so can be wrapped in
/// `Option`. `Option<Option<T>>` is not a [`FieldValue`]: `Some(None)` has no
/// cell of its own.
pub trait ScalarValue: FieldValue {}

impl ScalarValue for i32 {}
impl ScalarValue for i64 {}
impl ScalarValue for f64 {}
impl ScalarValue for String {}
impl ScalarValue for bool {}
impl ScalarValue for DateTime<FixedOffset> {}

impl<T: ScalarValue> FieldValue for Option<T> {
    fn semantic_type() -> SemanticType {
        SemanticType::Optional(Box::new(T::semantic_type()))
    }

    fn from_cell(cell: &CellValue) -> Result<Self, CellError> {
        match cell {
            CellValue::Null => Ok(None),
            present => T::from_cell(present).map(Some),
        }
    }

    fn to_cell(&self) -> CellValue {
        match self {
            Some(v) => v.to_cell(),
            None => CellValue::Null,
        }
    }
}
