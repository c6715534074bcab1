//! Runtime shape access for values whose type cannot be named.

use std::any::Any;

use crate::mirror::TypeShape;

/// A value that can describe its own memory layout and hand out its fields.
///
/// # Safety
///
/// Implementors must guarantee that [`Reflect::shape`] describes the concrete
/// type of `self` exactly (name, size, field names, offsets and kinds), that
/// [`Reflect::field`] returns the field at the same position in that shape,
/// and that [`Reflect::as_ptr`] returns the address of `self`. Layout
/// adapters read through `as_ptr` once the shape has been verified, so a
/// lying implementation is undefined behavior.
pub unsafe trait Reflect {
    /// Shape of the concrete type.
    fn shape(&self) -> &'static TypeShape;

    /// Field at `index` in declaration order.
    fn field(&self, index: usize) -> Option<&dyn Any>;

    /// Address of the value.
    fn as_ptr(&self) -> *const ();
}
