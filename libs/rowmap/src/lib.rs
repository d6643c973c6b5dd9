//! Bidirectional mapping between positional rows of typed cells and
//! statically-typed entities.
//!
//! `Row.0[i]` belongs to the entity's `i`-th declared field. Each field
//! resolves, once per type, to a conversion per direction: a named override
//! function, an override closure, or the built-in converter for its declared
//! type, in that order.
//!
//! A field carries at most one override per direction:
//! ```
//! use rowmap::{CellError, CellValue, Entity};
//!
//! fn parse(cell: &CellValue) -> Result<i64, CellError> {
//!     cell.as_integer()
//! }
//!
//! #[derive(Default, Entity)]
//! struct Once {
//!     #[row(decode_with = "parse", encode_expr = "|v: &i64| CellValue::Integer(*v)")]
//!     n: i64,
//! }
//! ```
//!
//! Two in the same direction are rejected at compile time:
//! ```compile_fail
//! use rowmap::{CellError, CellValue, Entity};
//!
//! fn parse(cell: &CellValue) -> Result<i64, CellError> {
//!     cell.as_integer()
//! }
//!
//! #[derive(Default, Entity)]
//! struct Twice {
//!     #[row(decode_with = "parse", decode_expr = "|c: &CellValue| c.as_integer()")]
//!     n: i64,
//! }
//! ```

pub mod config;
pub mod converter;
#[doc(hidden)]
pub mod dispatch;
pub mod error;
pub mod mapping;
pub mod registry;
pub mod schema;
pub mod value;

mod decode;
mod encode;
mod mapper;

pub use rowmap_derive::Entity;

pub use config::{CardinalityPolicy, MapperConfig, TrailingCells};
pub use converter::StrategyKind;
pub use error::{CellError, ErrorKind, MapError};
pub use mapper::{
    decode_all_into, decode_all_new, decode_into, decode_new, encode_all_to_rows, encode_to_row,
    RowMapper,
};
pub use mapping::{Direction, Entity, EntityDescriptor, Field, FieldDescriptor};
pub use registry::descriptor;
pub use schema::{FieldValue, ScalarValue, SemanticType};
pub use value::{CellKind, CellValue, Row};
