//! Constructor selection for `#[derive(Entity)]`.
//!
//! The derive cannot see through type aliases, so it asks the type system
//! instead: `(&Select::<E, T>::new()).build_field(..)` resolves to
//! [`ViaBuiltin`] when `T: FieldValue` and falls back to [`ViaCustom`] one
//! autoref step later otherwise. Both traits must be in scope at the call site.

use std::marker::PhantomData;

use crate::mapping::Field;
use crate::schema::FieldValue;

pub struct Select<E, T>(PhantomData<fn() -> (E, T)>);

impl<E, T> Select<E, T> {
    pub fn new() -> Self {
        Select(PhantomData)
    }
}

impl<E, T> Default for Select<E, T> {
    fn default() -> Self {
        Self::new()
    }
}

pub trait ViaBuiltin<E, T> {
    fn build_field(
        &self,
        name: &'static str,
        get: fn(&E) -> &T,
        get_mut: fn(&mut E) -> &mut T,
    ) -> Field<E, T>;
}

impl<E: 'static, T: FieldValue + 'static> ViaBuiltin<E, T> for Select<E, T> {
    fn build_field(
        &self,
        name: &'static str,
        get: fn(&E) -> &T,
        get_mut: fn(&mut E) -> &mut T,
    ) -> Field<E, T> {
        Field::new(name, get, get_mut)
    }
}

pub trait ViaCustom<E, T> {
    fn build_field(
        &self,
        name: &'static str,
        get: fn(&E) -> &T,
        get_mut: fn(&mut E) -> &mut T,
    ) -> Field<E, T>;
}

impl<E: 'static, T: 'static> ViaCustom<E, T> for &Select<E, T> {
    fn build_field(
        &self,
        name: &'static str,
        get: fn(&E) -> &T,
        get_mut: fn(&mut E) -> &mut T,
    ) -> Field<E, T> {
        Field::custom(name, get, get_mut)
    }
}
