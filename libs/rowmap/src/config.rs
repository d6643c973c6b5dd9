use serde::{Deserialize, Serialize};

/// What batch decode does when row count and entity count differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardinalityPolicy {
    /// Pair by index up to the shorter side; the rest is ignored.
    #[default]
    Truncate,
    /// Fail with `Cardinality` before any entity is touched.
    Strict,
}

/// What decode does with cells past the last mapped field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingCells {
    #[default]
    Ignore,
    Reject,
}

/// Mapper configuration.
///
/// Every field has a default, so an empty document yields the lenient
/// behaviour: truncating batches, ignored trailing cells.
///
/// ```
/// use rowmap::config::{CardinalityPolicy, MapperConfig};
///
/// let cfg: MapperConfig = serde_json::from_str(r#"{ "cardinality": "strict" }"#).unwrap();
/// assert_eq!(cfg.cardinality, CardinalityPolicy::Strict);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub cardinality: CardinalityPolicy,
    pub trailing_cells: TrailingCells,
}

impl MapperConfig {
    /// Both checks enabled.
    pub fn strict() -> Self {
        Self {
            cardinality: CardinalityPolicy::Strict,
            trailing_cells: TrailingCells::Reject,
        }
    }
}
