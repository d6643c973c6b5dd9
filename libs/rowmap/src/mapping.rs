use std::fmt;
use std::sync::Arc;

use crate::converter::{
    self, Assign, Candidates, DecodeFn, DecodeHook, EncodeFn, EncodeHook, Extract, Strategy,
    StrategyKind,
};
use crate::error::{CellError, MapError};
use crate::schema::{FieldValue, SemanticType};
use crate::value::CellValue;

/// Conversion direction, used when reporting override conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Decode,
    Encode,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Decode => f.write_str("decode"),
            Direction::Encode => f.write_str("encode"),
        }
    }
}

/// A statically-typed record that can be mapped to and from a [`Row`](crate::Row).
///
/// Usually implemented with `#[derive(Entity)]`. A manual impl builds the
/// descriptor with [`EntityDescriptor::builder`]:
///
/// ```
/// use rowmap::{Entity, EntityDescriptor, Field, MapError};
///
/// #[derive(Default)]
/// struct Tag {
///     id: i64,
///     label: String,
/// }
///
/// impl Entity for Tag {
///     fn describe() -> Result<EntityDescriptor<Self>, MapError> {
///         EntityDescriptor::builder("Tag")
///             .field(Field::<Self, i64>::new("id", |t| &t.id, |t| &mut t.id).read_only())
///             .field(Field::<Self, String>::new("label", |t| &t.label, |t| &mut t.label))
///             .build()
///     }
/// }
///
/// let tag = Tag { id: 1, label: "new".into() };
/// let row = rowmap::encode_to_row(&tag, false).unwrap();
/// assert_eq!(row.len(), 1);
/// ```
pub trait Entity: Sized + 'static {
    /// Field list in declaration order. Called at most a handful of times per
    /// process; the result is cached by [`descriptor`](crate::registry::descriptor).
    fn describe() -> Result<EntityDescriptor<Self>, MapError>;
}

/// Registration of one field of entity `E` with value type `T`.
///
/// Built-in types start from [`Field::new`], which installs the built-in
/// converter. Any other type starts from [`Field::custom`] and needs an
/// override for each direction it is used in.
pub struct Field<E, T> {
    name: &'static str,
    get: fn(&E) -> &T,
    get_mut: fn(&mut E) -> &mut T,
    semantic: SemanticType,
    read_only: bool,
    decode: Candidates<DecodeHook<T>>,
    encode: Candidates<EncodeHook<T>>,
    conflict: Option<Direction>,
}

impl<E: 'static, T: FieldValue + 'static> Field<E, T> {
    pub fn new(name: &'static str, get: fn(&E) -> &T, get_mut: fn(&mut E) -> &mut T) -> Self {
        let mut field = Self::custom(name, get, get_mut);
        field.semantic = T::semantic_type();
        let decode: DecodeHook<T> = Arc::new(T::from_cell);
        let encode: EncodeHook<T> = Arc::new(T::to_cell);
        field.decode.builtin = Some(decode);
        field.encode.builtin = Some(encode);
        field
    }
}

impl<E: 'static, T: 'static> Field<E, T> {
    pub fn custom(name: &'static str, get: fn(&E) -> &T, get_mut: fn(&mut E) -> &mut T) -> Self {
        Self {
            name,
            get,
            get_mut,
            semantic: SemanticType::Unsupported(std::any::type_name::<T>()),
            read_only: false,
            decode: Candidates::default(),
            encode: Candidates::default(),
            conflict: None,
        }
    }

    /// Exclude from encoded rows unless encoding is forced.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn decode_with(mut self, f: DecodeFn<T>) -> Self {
        self.note_decode_override();
        let hook: DecodeHook<T> = Arc::new(f);
        self.decode.function = Some(hook);
        self
    }

    pub fn decode_expr(
        mut self,
        f: impl Fn(&CellValue) -> Result<T, CellError> + Send + Sync + 'static,
    ) -> Self {
        self.note_decode_override();
        let hook: DecodeHook<T> = Arc::new(f);
        self.decode.expression = Some(hook);
        self
    }

    pub fn encode_with(mut self, f: EncodeFn<T>) -> Self {
        self.note_encode_override();
        let hook: EncodeHook<T> = Arc::new(f);
        self.encode.function = Some(hook);
        self
    }

    pub fn encode_expr(mut self, f: impl Fn(&T) -> CellValue + Send + Sync + 'static) -> Self {
        self.note_encode_override();
        let hook: EncodeHook<T> = Arc::new(f);
        self.encode.expression = Some(hook);
        self
    }

    fn note_decode_override(&mut self) {
        if self.decode.has_override() {
            self.conflict.get_or_insert(Direction::Decode);
        }
    }

    fn note_encode_override(&mut self) {
        if self.encode.has_override() {
            self.conflict.get_or_insert(Direction::Encode);
        }
    }
}

/// Resolved metadata for one entity field.
pub struct FieldDescriptor<E> {
    name: &'static str,
    semantic: SemanticType,
    read_only: bool,
    decode: Option<Strategy<Assign<E>>>,
    encode: Option<Strategy<Extract<E>>>,
}

impl<E> FieldDescriptor<E> {
    /// Diagnostic name. Never used for matching cells.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn semantic_type(&self) -> &SemanticType {
        &self.semantic
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn decode_kind(&self) -> Option<StrategyKind> {
        self.decode.as_ref().map(Strategy::kind)
    }

    pub fn encode_kind(&self) -> Option<StrategyKind> {
        self.encode.as_ref().map(Strategy::kind)
    }

    pub(crate) fn decode_strategy(&self) -> Result<&Strategy<Assign<E>>, MapError> {
        self.decode.as_ref().ok_or_else(|| self.unsupported())
    }

    pub(crate) fn encode_strategy(&self) -> Result<&Strategy<Extract<E>>, MapError> {
        self.encode.as_ref().ok_or_else(|| self.unsupported())
    }

    fn unsupported(&self) -> MapError {
        MapError::UnsupportedType {
            field: self.name,
            type_name: self.semantic.to_string(),
        }
    }
}

impl<E> fmt::Debug for FieldDescriptor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("semantic", &self.semantic)
            .field("read_only", &self.read_only)
            .field("decode", &self.decode_kind())
            .field("encode", &self.encode_kind())
            .finish()
    }
}

/// Per-type field list, in declaration order.
///
/// `fields[i]` consumes `Row.0[i]` on decode. Immutable once built.
pub struct EntityDescriptor<E> {
    entity: &'static str,
    fields: Vec<FieldDescriptor<E>>,
}

impl<E: 'static> EntityDescriptor<E> {
    pub fn builder(entity: &'static str) -> DescriptorBuilder<E> {
        DescriptorBuilder {
            entity,
            fields: Vec::new(),
            error: None,
        }
    }
}

impl<E> EntityDescriptor<E> {
    pub fn entity_name(&self) -> &'static str {
        self.entity
    }

    pub fn fields(&self) -> &[FieldDescriptor<E>] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names aligned with the cells `encode_to_row` emits.
    pub fn columns(&self, force_all: bool) -> Vec<&'static str> {
        self.emitted(force_all).map(FieldDescriptor::name).collect()
    }

    /// Fields that take part in encoding. Read-only ones are dropped unless forced.
    pub(crate) fn emitted(&self, force_all: bool) -> impl Iterator<Item = &FieldDescriptor<E>> {
        self.fields
            .iter()
            .filter(move |field| force_all || !field.read_only)
    }
}

impl<E> fmt::Debug for EntityDescriptor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("entity", &self.entity)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Collects field registrations and resolves each one's strategies.
pub struct DescriptorBuilder<E> {
    entity: &'static str,
    fields: Vec<FieldDescriptor<E>>,
    error: Option<MapError>,
}

impl<E: 'static> DescriptorBuilder<E> {
    pub fn field<T: 'static>(mut self, field: Field<E, T>) -> Self {
        if let Some(direction) = field.conflict {
            self.error.get_or_insert(MapError::ConflictingOverride {
                field: field.name,
                direction,
            });
        }

        let Field {
            name,
            get,
            get_mut,
            semantic,
            read_only,
            decode,
            encode,
            ..
        } = field;
        let decode = decode.map(|hook| converter::assign(get_mut, hook)).resolve();
        let encode = encode.map(|hook| converter::extract(get, hook)).resolve();

        tracing::trace!(
            entity = self.entity,
            field = name,
            index = self.fields.len(),
            semantic = %semantic,
            decode = ?decode.as_ref().map(Strategy::kind),
            encode = ?encode.as_ref().map(Strategy::kind),
            "field resolved"
        );

        self.fields.push(FieldDescriptor {
            name,
            semantic,
            read_only,
            decode,
            encode,
        });
        self
    }

    pub fn build(self) -> Result<EntityDescriptor<E>, MapError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(EntityDescriptor {
            entity: self.entity,
            fields: self.fields,
        })
    }
}
