//! Current driver layout: columns inside a result set record.

use std::mem::{offset_of, size_of};

use crate::column::{ColumnDescriptor, FieldFlags, FieldType};
use crate::mirror::{FieldShape, Primitive, ShapeKind, TypeShape};
use crate::reflect::Reflect;

use super::{LayoutAdapter, LayoutVersion, MYSQL_CONN_RECORD};

#[repr(C)]
struct MysqlField {
    table_name: String,
    name: String,
    flags: u16,
    field_type: u8,
    decimals: u8,
}

impl MysqlField {
    fn descriptor(&self) -> ColumnDescriptor {
        ColumnDescriptor {
            name: self.name.clone(),
            table_name: (!self.table_name.is_empty()).then(|| self.table_name.clone()),
            field_type: FieldType::from_code(self.field_type),
            flags: FieldFlags::from_bits(self.flags),
            decimals: Some(self.decimals),
        }
    }
}

#[allow(dead_code)]
#[repr(C)]
struct ResultSet {
    columns: Vec<MysqlField>,
    done: bool,
}

#[allow(dead_code)]
#[repr(C)]
struct MysqlRows {
    mc: *const (),
    rs: ResultSet,
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
            name: "table_name",
            offset: offset_of!(MysqlField, table_name),
            kind: ShapeKind::Scalar(Primitive::String),
        },
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

static RESULT_SET_SHAPE: TypeShape = TypeShape {
    name: "ResultSet",
    size: size_of::<ResultSet>(),
    fields: &[
        FieldShape {
            name: "columns",
            offset: offset_of!(ResultSet, columns),
            kind: ShapeKind::Slice(&FIELD_RECORD),
        },
        FieldShape {
            name: "done",
            offset: offset_of!(ResultSet, done),
            kind: ShapeKind::Scalar(Primitive::Bool),
        },
    ],
};

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
            name: "rs",
            offset: offset_of!(MysqlRows, rs),
            kind: ShapeKind::Record(&RESULT_SET_SHAPE),
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

pub(crate) struct ResultSetLayout;

impl LayoutAdapter for ResultSetLayout {
    fn version(&self) -> LayoutVersion {
        LayoutVersion::ResultSet
    }

    fn roots(&self) -> &'static [&'static TypeShape] {
        &ROOTS
    }

    fn path(&self) -> &'static [&'static str] {
        &["mysql_rows", "rs", "columns"]
    }

    unsafe fn columns(&self, handle: &dyn Reflect) -> Vec<ColumnDescriptor> {
        // SAFETY: the caller verified the handle against ROOTS.
        let rows = unsafe { &*(handle.as_ptr() as *const ProtocolRows) };
        rows.mysql_rows
            .rs
            .columns
            .iter()
            .map(MysqlField::descriptor)
            .collect()
    }

    unsafe fn is_binary(&self, handle: &dyn Reflect) -> bool {
        handle.shape().name == BINARY_ROWS_SHAPE.name
    }
}
