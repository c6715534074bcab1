//! Oldest driver layout: a single `MysqlRows` record.

use std::mem::{offset_of, size_of};

use crate::column::{ColumnDescriptor, FieldFlags, FieldType};
use crate::mirror::{FieldShape, Primitive, ShapeKind, TypeShape};
use crate::reflect::Reflect;

use super::{LayoutAdapter, LayoutVersion, MYSQL_CONN_RECORD};

#[repr(C)]
struct MysqlField {
    name: String,
    field_type: u8,
    flags: u16,
}

#[allow(dead_code)]
#[repr(C)]
struct MysqlRows {
    mc: *const (),
    binary: bool,
    columns: Vec<MysqlField>,
    eof: bool,
}

static FIELD_SHAPE: TypeShape = TypeShape {
    name: "MysqlField",
    size: size_of::<MysqlField>(),
    fields: &[
        FieldShape {
            name: "name",
            offset: offset_of!(MysqlField, name),
            kind: ShapeKind::Scalar(Primitive::String),
        },
        FieldShape {
            name: "field_type",
            offset: offset_of!(MysqlField, field_type),
            kind: ShapeKind::Scalar(Primitive::U8),
        },
        FieldShape {
            name: "flags",
            offset: offset_of!(MysqlField, flags),
            kind: ShapeKind::Scalar(Primitive::U16),
        },
    ],
};

static FIELD_RECORD: ShapeKind = ShapeKind::Record(&FIELD_SHAPE);

static MYSQL_ROWS_SHAPE: TypeShape = TypeShape {
    name: "MysqlRows",
    size: size_of::<MysqlRows>(),
    fields: &[
        FieldShape {
            name: "mc",
            offset: offset_of!(MysqlRows, mc),
            kind: ShapeKind::Pointer(&MYSQL_CONN_RECORD),
        },
        FieldShape {
            name: "binary",
            offset: offset_of!(MysqlRows, binary),
            kind: ShapeKind::Scalar(Primitive::Bool),
        },
        FieldShape {
            name: "columns",
            offset: offset_of!(MysqlRows, columns),
            kind: ShapeKind::Slice(&FIELD_RECORD),
        },
        FieldShape {
            name: "eof",
            offset: offset_of!(MysqlRows, eof),
            kind: ShapeKind::Scalar(Primitive::Bool),
        },
    ],
};

static ROOTS: [&TypeShape; 1] = [&MYSQL_ROWS_SHAPE];

pub(crate) struct FlatLayout;

impl FlatLayout {
    /// # Safety
    ///
    /// `handle` must have been verified against `ROOTS`.
    unsafe fn rows<'a>(&self, handle: &'a dyn Reflect) -> &'a MysqlRows {
        unsafe { &*(handle.as_ptr() as *const MysqlRows) }
    }
}

impl LayoutAdapter for FlatLayout {
    fn version(&self) -> LayoutVersion {
        LayoutVersion::Flat
    }

    fn roots(&self) -> &'static [&'static TypeShape] {
        &ROOTS
    }

    fn path(&self) -> &'static [&'static str] {
        &["columns"]
    }

    unsafe fn columns(&self, handle: &dyn Reflect) -> Vec<ColumnDescriptor> {
        let rows = unsafe { self.rows(handle) };
        rows.columns
            .iter()
            .map(|field| ColumnDescriptor {
                name: field.name.clone(),
                table_name: None,
                field_type: FieldType::from_code(field.field_type),
                flags: FieldFlags::from_bits(field.flags),
                decimals: None,
            })
            .collect()
    }

    unsafe fn is_binary(&self, handle: &dyn Reflect) -> bool {
        unsafe { self.rows(handle) }.binary
    }
}
