use crate::config::{CardinalityPolicy, MapperConfig};
use crate::decode::decode_row;
use crate::encode::encode_entity;
use crate::error::MapError;
use crate::mapping::Entity;
use crate::registry;
use crate::value::Row;

/// Row ↔ entity mapper.
///
/// Stateless apart from its [`MapperConfig`]; descriptors come from the
/// process-wide cache. Every operation is synchronous and does no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowMapper {
    config: MapperConfig,
}

impl RowMapper {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Decode `row` into an existing `entity`, in place.
    ///
    /// Not atomic: on error, fields before the failing one are already
    /// overwritten. Decode into a scratch value and swap on success if that
    /// matters.
    pub fn decode_into<E: Entity>(&self, row: &Row, entity: &mut E) -> Result<(), MapError> {
        let desc = registry::descriptor::<E>()?;
        decode_row(&desc, &self.config, row, entity)
    }

    /// Decode `row` into a freshly defaulted `E`.
    pub fn decode_new<E: Entity + Default>(&self, row: &Row) -> Result<E, MapError> {
        let mut entity = E::default();
        self.decode_into(row, &mut entity)?;
        Ok(entity)
    }

    /// Decode `rows[i]` into `entities[i]`.
    ///
    /// With [`CardinalityPolicy::Truncate`] only the first
    /// `min(rows.len(), entities.len())` pairs are decoded. With
    /// [`CardinalityPolicy::Strict`] a length difference fails before any
    /// entity is touched. A failing pair stops the batch; earlier pairs keep
    /// their new values.
    pub fn decode_all_into<E: Entity>(
        &self,
        rows: &[Row],
        entities: &mut [E],
    ) -> Result<(), MapError> {
        let desc = registry::descriptor::<E>()?;
        if rows.len() != entities.len() {
            match self.config.cardinality {
                CardinalityPolicy::Strict => {
                    return Err(MapError::Cardinality {
                        rows: rows.len(),
                        entities: entities.len(),
                    });
                }
                CardinalityPolicy::Truncate => {
                    tracing::warn!(
                        entity = desc.entity_name(),
                        rows = rows.len(),
                        entities = entities.len(),
                        "batch length mismatch, truncating"
                    );
                }
            }
        }

        for (row, entity) in rows.iter().zip(entities.iter_mut()) {
            decode_row(&desc, &self.config, row, entity)?;
        }
        Ok(())
    }

    /// Decode every row into a new `E`. All or nothing: the first failing
    /// row aborts the batch and no entities are returned.
    pub fn decode_all_new<E: Entity + Default>(&self, rows: &[Row]) -> Result<Vec<E>, MapError> {
        let desc = registry::descriptor::<E>()?;
        rows.iter()
            .map(|row| -> Result<E, MapError> {
                let mut entity = E::default();
                decode_row(&desc, &self.config, row, &mut entity)?;
                Ok(entity)
            })
            .collect()
    }

    /// Decode every row into a new `E`, one result per row. A failing row
    /// does not affect the others.
    pub fn decode_all_new_isolated<E: Entity + Default>(
        &self,
        rows: &[Row],
    ) -> Vec<Result<E, MapError>> {
        let desc = match registry::descriptor::<E>() {
            Ok(desc) => desc,
            Err(e) => return rows.iter().map(|_| Err(e.clone())).collect(),
        };
        rows.iter()
            .map(|row| -> Result<E, MapError> {
                let mut entity = E::default();
                decode_row(&desc, &self.config, row, &mut entity)?;
                Ok(entity)
            })
            .collect()
    }

    /// Encode `entity` into a row. Read-only fields are omitted unless
    /// `force_all` is set.
    pub fn encode_to_row<E: Entity>(&self, entity: &E, force_all: bool) -> Result<Row, MapError> {
        let desc = registry::descriptor::<E>()?;
        encode_entity(&desc, entity, force_all)
    }

    /// One row per entity, same order.
    pub fn encode_all_to_rows<E: Entity>(
        &self,
        entities: &[E],
        force_all: bool,
    ) -> Result<Vec<Row>, MapError> {
        let desc = registry::descriptor::<E>()?;
        entities
            .iter()
            .map(|entity| encode_entity(&desc, entity, force_all))
            .collect()
    }
}

// Shorthands over the default (lenient) mapper.

pub fn decode_into<E: Entity>(row: &Row, entity: &mut E) -> Result<(), MapError> {
    RowMapper::default().decode_into(row, entity)
}

pub fn decode_new<E: Entity + Default>(row: &Row) -> Result<E, MapError> {
    RowMapper::default().decode_new(row)
}

pub fn decode_all_into<E: Entity>(rows: &[Row], entities: &mut [E]) -> Result<(), MapError> {
    RowMapper::default().decode_all_into(rows, entities)
}

pub fn decode_all_new<E: Entity + Default>(rows: &[Row]) -> Result<Vec<E>, MapError> {
    RowMapper::default().decode_all_new(rows)
}

pub fn encode_to_row<E: Entity>(entity: &E, force_all: bool) -> Result<Row, MapError> {
    RowMapper::default().encode_to_row(entity, force_all)
}

pub fn encode_all_to_rows<E: Entity>(entities: &[E], force_all: bool) -> Result<Vec<Row>, MapError> {
    RowMapper::default().encode_all_to_rows(entities, force_all)
}
