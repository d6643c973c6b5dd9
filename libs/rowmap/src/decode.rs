use crate::config::{MapperConfig, TrailingCells};
use crate::error::MapError;
use crate::mapping::EntityDescriptor;
use crate::value::Row;

/// Writes `row` into `entity`, field by field, left to right.
///
/// Checks that run before any field is written:
/// - every field has a decode strategy (`UnsupportedType` otherwise);
/// - the row has a cell for every field (`MissingCell`);
/// - no trailing cells, when the config rejects them.
///
/// After that, a cell that fails to convert stops the decode with fields
/// before it already assigned. No rollback.
pub(crate) fn decode_row<E>(
    desc: &EntityDescriptor<E>,
    config: &MapperConfig,
    row: &Row,
    entity: &mut E,
) -> Result<(), MapError> {
    for field in desc.fields() {
        field.decode_strategy()?;
    }

    if let Some(field) = desc.fields().get(row.len()) {
        return Err(MapError::MissingCell {
            field: field.name(),
            index: row.len(),
            len: row.len(),
        });
    }
    if row.len() > desc.len() && config.trailing_cells == TrailingCells::Reject {
        return Err(MapError::TrailingCells {
            expected: desc.len(),
            len: row.len(),
        });
    }

    for (index, (field, cell)) in desc.fields().iter().zip(row.iter()).enumerate() {
        let strategy = field.decode_strategy()?;
        tracing::trace!(
            entity = desc.entity_name(),
            field = field.name(),
            index,
            strategy = ?strategy.kind(),
            cell = %cell,
            "decode field"
        );
        (strategy.hook())(&mut *entity, cell)
            .map_err(|e| MapError::at_field(field.name(), index, e))?;
    }
    Ok(())
}
