use crate::mapping::Direction;
use crate::value::CellKind;

/// Cell-level conversion failure.
///
/// Returned by built-in converters and by user overrides. It carries no
/// field information; the engine attaches field name and index when it
/// lifts the error into a [`MapError`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CellError {
    #[error("expected {expected} cell, got {actual}")]
    TypeMismatch { expected: CellKind, actual: CellKind },

    #[error("value {value} out of range for {target}")]
    OutOfRange { value: i64, target: &'static str },

    #[error("{0}")]
    Custom(String),
}

impl CellError {
    pub fn mismatch(expected: CellKind, actual: CellKind) -> Self {
        Self::TypeMismatch { expected, actual }
    }

    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Coarse classification of [`MapError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedType,
    TypeMismatch,
    Conversion,
    Cardinality,
    Registration,
}

/// Mapper error — returned by every decode/encode operation.
///
/// Raised synchronously at the offending field. There is no retry and no
/// rollback: a decode that fails at field `i` leaves fields `0..i` written.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("field '{field}': no built-in converter or override for type '{type_name}'")]
    UnsupportedType {
        field: &'static str,
        type_name: String,
    },

    #[error("field '{field}' (index {index}): expected {expected} cell, got {actual}")]
    TypeMismatch {
        field: &'static str,
        index: usize,
        expected: CellKind,
        actual: CellKind,
    },

    #[error("field '{field}' (index {index}): value {value} out of range for {target}")]
    OutOfRange {
        field: &'static str,
        index: usize,
        value: i64,
        target: &'static str,
    },

    #[error("field '{field}' (index {index}): {message}")]
    Conversion {
        field: &'static str,
        index: usize,
        message: String,
    },

    #[error("field '{field}' (index {index}): row has only {len} cells")]
    MissingCell {
        field: &'static str,
        index: usize,
        len: usize,
    },

    #[error("row has {len} cells, entity maps {expected}")]
    TrailingCells { expected: usize, len: usize },

    #[error("cardinality mismatch: {rows} rows for {entities} entities")]
    Cardinality { rows: usize, entities: usize },

    #[error("field '{field}': more than one {direction} override")]
    ConflictingOverride {
        field: &'static str,
        direction: Direction,
    },
}

impl MapError {
    /// Attach field position to a cell-level failure.
    pub fn at_field(field: &'static str, index: usize, err: CellError) -> Self {
        match err {
            CellError::TypeMismatch { expected, actual } => Self::TypeMismatch {
                field,
                index,
                expected,
                actual,
            },
            CellError::OutOfRange { value, target } => Self::OutOfRange {
                field,
                index,
                value,
                target,
            },
            CellError::Custom(message) => Self::Conversion {
                field,
                index,
                message,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MapError::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            MapError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            MapError::OutOfRange { .. } | MapError::Conversion { .. } => ErrorKind::Conversion,
            MapError::MissingCell { .. }
            | MapError::TrailingCells { .. }
            | MapError::Cardinality { .. } => ErrorKind::Cardinality,
            MapError::ConflictingOverride { .. } => ErrorKind::Registration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_errors_gain_field_context() {
        let err = MapError::at_field(
            "score",
            2,
            CellError::mismatch(CellKind::Float, CellKind::Text),
        );
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(
            err.to_string(),
            "field 'score' (index 2): expected float cell, got text"
        );

        let err = MapError::at_field("tags", 0, CellError::custom("bad separator"));
        assert_eq!(err.kind(), ErrorKind::Conversion);
        assert_eq!(err.to_string(), "field 'tags' (index 0): bad separator");
    }

    #[test]
    fn unsupported_type_names_the_type() {
        let err = MapError::UnsupportedType {
            field: "blob",
            type_name: "alloc::vec::Vec<u8>".into(),
        };
        assert!(err.to_string().contains("alloc::vec::Vec<u8>"));
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    }
}
