use crate::error::MapError;
use crate::mapping::EntityDescriptor;
use crate::value::Row;

/// Builds a row from `entity` in declaration order.
///
/// Read-only fields are left out unless `force_all` is set, so the row can be
/// shorter than the field list. Strategies of all emitted fields are resolved
/// before any cell is produced.
pub(crate) fn encode_entity<E>(
    desc: &EntityDescriptor<E>,
    entity: &E,
    force_all: bool,
) -> Result<Row, MapError> {
    let strategies = desc
        .emitted(force_all)
        .map(|field| field.encode_strategy().map(|s| (field, s)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut row = Row::with_capacity(strategies.len());
    for (field, strategy) in strategies {
        let cell = (strategy.hook())(entity);
        tracing::trace!(
            entity = desc.entity_name(),
            field = field.name(),
            strategy = ?strategy.kind(),
            cell = %cell,
            "encode field"
        );
        row.0.push(cell);
    }
    Ok(row)
}
