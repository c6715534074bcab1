//! Driver layout with `MysqlRows` embedded in the protocol row types.

use std::mem::{offset_of, size_of};

use crate::column::{ColumnDescriptor, FieldFlags, FieldType};
use crate::mirror::{FieldShape, Primitive, ShapeKind, TypeShape};
use crate::reflect::Reflect;

use super::{LayoutAdapter, LayoutVersion, MYSQL_CONN_RECORD};

#[repr(C)]
struct MysqlField {
    name: String,
    flags: u16,
    field_type: u8,
    decimals: u8,
}

#[allow(dead_code)]
#[repr(C)]
struct MysqlRows {
    mc: *const (),
    columns: Vec<MysqlField>,
}

#[repr(C)]
struct ProtocolRows {
    mysql_rows: MysqlRows,
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
            name: "flags",
            offset: offset_of!(MysqlField, flags),
            kind: ShapeKind::Scalar(Primitive::U16),
        },
        FieldShape {
            name: "field_type",
            offset: offset_of!(MysqlField, field_type),
            kind: ShapeKind::Scalar(Primitive::U8),
        },
        FieldShape {
            name: "decimals",
            offset: offset_of!(MysqlField, decimals),
            kind: ShapeKind::Scalar(Primitive::U8),
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
            name: "columns",
            offset: offset_of!(MysqlRows, columns),
            kind: ShapeKind::Slice(&FIELD_RECORD),
        },
    ],
};

static PROTOCOL_ROWS_FIELDS: [FieldShape; 1] = [FieldShape {
    name: "mysql_rows",
    offset: offset_of!(ProtocolRows, mysql_rows),
    kind: ShapeKind::Record(&MYSQL_ROWS_SHAPE),
}];

static TEXT_ROWS_SHAPE: TypeShape = TypeShape {
    name: "TextRows",
    size: size_of::<ProtocolRows>(),
    fields: &PROTOCOL_ROWS_FIELDS,
};

static BINARY_ROWS_SHAPE: TypeShape = TypeShape {
    name: "BinaryRows",
    size: size_of::<ProtocolRows>(),
    fields: &PROTOCOL_ROWS_FIELDS,
};

static ROOTS: [&TypeShape; 2] = [&TEXT_ROWS_SHAPE, &BINARY_ROWS_SHAPE];

pub(crate) struct EmbeddedLayout;

impl LayoutAdapter for EmbeddedLayout {
    fn version(&self) -> LayoutVersion {
        LayoutVersion::Embedded
    }

    fn roots(&self) -> &'static [&'static TypeShape] {
        &ROOTS
    }

    fn path(&self) -> &'static [&'static str] {
        &["mysql_rows", "columns"]
    }

    unsafe fn columns(&self, handle: &dyn Reflect) -> Vec<ColumnDescriptor> {
        // SAFETY: the caller verified the handle against ROOTS.
        let rows = unsafe { &*(handle.as_ptr() as *const ProtocolRows) };
        rows.mysql_rows
            .columns
            .iter()
            .map(|field| ColumnDescriptor {
                name: field.name.clone(),
                table_name: None,
                field_type: FieldType::from_code(field.field_type),
                flags: FieldFlags::from_bits(field.flags),
                decimals: Some(field.decimals),
            })
            .collect()
    }

    unsafe fn is_binary(&self, handle: &dyn Reflect) -> bool {
        handle.shape().name == BINARY_ROWS_SHAPE.name
    }
}
