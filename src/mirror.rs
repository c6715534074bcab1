//! Structural shape descriptions and the compatibility check between them.
//!
//! A [`TypeShape`] describes the memory layout of a record type: its name,
//! size and the ordered list of fields with their offsets and kinds. Two
//! shapes are compatible when a value of one may be read through the other.
//! Shapes are built once, usually as statics using `std::mem::offset_of!`.

use thiserror::Error;

/// Scalar kinds. Scalars match on kind alone, not on the declared type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Bool,
    U8,
    U16,
    U32,
    U64,
    Usize,
    I8,
    I16,
    I32,
    I64,
    Isize,
    F32,
    F64,
    String,
}

/// Kind of a field, recursively described for composite kinds.
#[derive(Debug, Clone, Copy)]
pub enum ShapeKind {
    /// Nested record.
    Record(&'static TypeShape),
    /// Fixed-size array with its length.
    Array(usize, &'static ShapeKind),
    /// Associative map (key, value).
    Map(&'static ShapeKind, &'static ShapeKind),
    /// Channel of elements.
    Channel(&'static ShapeKind),
    /// Thin pointer-like reference (`Box`, `Arc`, raw pointer, optional
    /// pointer). Only its pointee is compared, so every variant must be one
    /// pointer wide.
    Pointer(&'static ShapeKind),
    /// Sequence with the memory layout of a `Vec` (pointer, capacity, length).
    /// Boxed or borrowed slices are not `Slice` kinds.
    Slice(&'static ShapeKind),
    /// Trait object or error value, identified by its path.
    Interface(&'static str),
    /// Plain scalar value.
    Scalar(Primitive),
}

impl ShapeKind {
    /// The record behind this kind, looking through one pointer-like level.
    pub fn record(&self) -> Option<&'static TypeShape> {
        match self {
            ShapeKind::Record(shape) => Some(*shape),
            ShapeKind::Pointer(ShapeKind::Record(shape)) => Some(*shape),
            _ => None,
        }
    }
}

/// A single field inside a [`TypeShape`].
#[derive(Debug, Clone, Copy)]
pub struct FieldShape {
    pub name: &'static str,
    pub offset: usize,
    pub kind: ShapeKind,
}

/// Shape of a record type.
#[derive(Debug)]
pub struct TypeShape {
    /// Declared type name.
    pub name: &'static str,
    /// Size in bytes.
    pub size: usize,
    /// Fields in declaration order.
    pub fields: &'static [FieldShape],
}

impl TypeShape {
    /// Find a field and its index by name.
    pub fn field(&self, name: &str) -> Option<(usize, &FieldShape)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }
}

/// The first rule two shapes failed to satisfy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    #[error("type {found} does not match {expected}")]
    Name {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{type_name} has size {found}, expected {expected}")]
    Size {
        type_name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{type_name} has {found} fields, expected {expected}")]
    FieldCount {
        type_name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{type_name} field #{index} is named {found}, expected {expected}")]
    FieldName {
        type_name: &'static str,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{type_name}.{field} is at offset {found}, expected {expected}")]
    Offset {
        type_name: &'static str,
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{type_name}.{field} has a different kind")]
    Kind {
        type_name: &'static str,
        field: &'static str,
    },

    #[error("{type_name} has no field {field}")]
    MissingField {
        type_name: &'static str,
        field: &'static str,
    },
}

/// Check whether a value shaped like `found` can be read as `expected`.
///
/// Names, sizes, field names, offsets and kinds must all match. Container
/// kinds are looked through without consuming `max_struct_recursion`; nested
/// records are compared in full while the budget lasts and by name after.
/// Interfaces must be identical.
pub fn check_compatible(
    found: &TypeShape,
    expected: &TypeShape,
    max_struct_recursion: usize,
) -> Result<(), Mismatch> {
    if found.name != expected.name {
        return Err(Mismatch::Name {
            expected: expected.name,
            found: found.name,
        });
    }
    if found.size != expected.size {
        return Err(Mismatch::Size {
            type_name: expected.name,
            expected: expected.size,
            found: found.size,
        });
    }
    if found.fields.len() != expected.fields.len() {
        return Err(Mismatch::FieldCount {
            type_name: expected.name,
            expected: expected.fields.len(),
            found: found.fields.len(),
        });
    }
    for (index, (f, e)) in found.fields.iter().zip(expected.fields).enumerate() {
        if f.name != e.name {
            return Err(Mismatch::FieldName {
                type_name: expected.name,
                index,
                expected: e.name,
                found: f.name,
            });
        }
        if f.offset != e.offset {
            return Err(Mismatch::Offset {
                type_name: expected.name,
                field: e.name,
                expected: e.offset,
                found: f.offset,
            });
        }
        check_kind(&f.kind, &e.kind, max_struct_recursion, expected.name, e.name)?;
    }
    Ok(())
}

/// Boolean form of [`check_compatible`].
pub fn is_compatible(a: &TypeShape, b: &TypeShape, max_struct_recursion: usize) -> bool {
    check_compatible(a, b, max_struct_recursion).is_ok()
}

fn check_kind(
    found: &ShapeKind,
    expected: &ShapeKind,
    budget: usize,
    owner: &'static str,
    field: &'static str,
) -> Result<(), Mismatch> {
    use ShapeKind::*;

    match (found, expected) {
        (Array(lf, ef), Array(le, ee)) if lf == le => check_kind(ef, ee, budget, owner, field),
        (Channel(ef), Channel(ee)) | (Pointer(ef), Pointer(ee)) | (Slice(ef), Slice(ee)) => {
            check_kind(ef, ee, budget, owner, field)
        }
        (Map(kf, vf), Map(ke, ve)) => {
            check_kind(kf, ke, budget, owner, field)?;
            check_kind(vf, ve, budget, owner, field)
        }
        (Interface(a), Interface(b)) if a == b => Ok(()),
        (Scalar(a), Scalar(b)) if a == b => Ok(()),
        (Record(f), Record(e)) => {
            if budget > 0 {
                check_compatible(f, e, budget - 1)
            } else if f.name == e.name {
                Ok(())
            } else {
                Err(Mismatch::Name {
                    expected: e.name,
                    found: f.name,
                })
            }
        }
        _ => Err(Mismatch::Kind {
            type_name: owner,
            field,
        }),
    }
}
