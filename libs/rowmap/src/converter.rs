use std::sync::Arc;

use crate::error::CellError;
use crate::value::CellValue;

/// Named decode override: a plain function from cell to field value.
pub type DecodeFn<T> = fn(&CellValue) -> Result<T, CellError>;

/// Named encode override: a plain function from field value to cell.
pub type EncodeFn<T> = fn(&T) -> CellValue;

/// Any decode conversion for a field of type `T` (function, closure or built-in).
pub type DecodeHook<T> = Arc<dyn Fn(&CellValue) -> Result<T, CellError> + Send + Sync>;

/// Any encode conversion for a field of type `T`.
pub type EncodeHook<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;

/// Decode hook with the field accessor folded in: reads one cell, writes one field.
pub(crate) type Assign<E> = Arc<dyn Fn(&mut E, &CellValue) -> Result<(), CellError> + Send + Sync>;

/// Encode hook with the field accessor folded in: reads one field, yields one cell.
pub(crate) type Extract<E> = Arc<dyn Fn(&E) -> CellValue + Send + Sync>;

/// Which kind of conversion a field resolved to, for one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// User-supplied named function.
    Function,
    /// User-supplied closure.
    Expression,
    /// Built-in converter for the declared semantic type.
    BuiltIn,
}

/// Resolved conversion for one field and one direction.
pub struct Strategy<H> {
    kind: StrategyKind,
    hook: H,
}

impl<H> Strategy<H> {
    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub(crate) fn hook(&self) -> &H {
        &self.hook
    }
}

/// Conversions a field offers for one direction, before resolution.
pub(crate) struct Candidates<H> {
    pub function: Option<H>,
    pub expression: Option<H>,
    pub builtin: Option<H>,
}

impl<H> Default for Candidates<H> {
    fn default() -> Self {
        Self {
            function: None,
            expression: None,
            builtin: None,
        }
    }
}

impl<H> Candidates<H> {
    pub fn has_override(&self) -> bool {
        self.function.is_some() || self.expression.is_some()
    }

    pub fn map<K>(self, f: impl Fn(H) -> K) -> Candidates<K> {
        Candidates {
            function: self.function.map(&f),
            expression: self.expression.map(&f),
            builtin: self.builtin.map(&f),
        }
    }

    /// Fixed precedence: function, then expression, then built-in.
    /// `None` means the field's type is unsupported in this direction.
    pub fn resolve(self) -> Option<Strategy<H>> {
        let Candidates {
            function,
            expression,
            builtin,
        } = self;
        function
            .map(|hook| Strategy {
                kind: StrategyKind::Function,
                hook,
            })
            .or_else(|| {
                expression.map(|hook| Strategy {
                    kind: StrategyKind::Expression,
                    hook,
                })
            })
            .or_else(|| {
                builtin.map(|hook| Strategy {
                    kind: StrategyKind::BuiltIn,
                    hook,
                })
            })
    }
}

pub(crate) fn assign<E: 'static, T: 'static>(
    get_mut: fn(&mut E) -> &mut T,
    hook: DecodeHook<T>,
) -> Assign<E> {
    Arc::new(move |entity: &mut E, cell: &CellValue| {
        *get_mut(entity) = hook(cell)?;
        Ok(())
    })
}

pub(crate) fn extract<E: 'static, T: 'static>(get: fn(&E) -> &T, hook: EncodeHook<T>) -> Extract<E> {
    Arc::new(move |entity: &E| hook(get(entity)))
}
