//! Row iterators of the MySQL driver.
//!
//! The column definitions live inside the iterator and are not reachable
//! through [`DriverRows`]; only their names are. The types here are
//! `#[repr(C)]` and describe themselves through [`Reflect`].

use std::any::Any;
use std::mem::{offset_of, size_of};

use crate::column::ColumnDescriptor;
use crate::cursor::DriverRows;
use crate::error::{Error, Result};
use crate::mirror::{FieldShape, Primitive, ShapeKind, TypeShape};
use crate::reflect::Reflect;

use super::value::Value;

/// Column definition as received from the server.
// Only the name is read here; the rest is reached through the layout adapters.
#[allow(dead_code)]
#[repr(C)]
pub(crate) struct MysqlField {
    table_name: String,
    name: String,
    flags: u16,
    field_type: u8,
    decimals: u8,
}

impl From<ColumnDescriptor> for MysqlField {
    fn from(desc: ColumnDescriptor) -> Self {
        Self {
            table_name: desc.table_name.unwrap_or_default(),
            name: desc.name,
            flags: desc.flags.bits(),
            field_type: desc.field_type.code(),
            decimals: desc.decimals.unwrap_or(0),
        }
    }
}

#[repr(C)]
struct ResultSet {
    columns: Vec<MysqlField>,
    done: bool,
}

/// Connection state the rows read from; holds the pending row packets.
struct MysqlConn {
    pending: Vec<Vec<Value>>,
    position: usize,
}

#[repr(C)]
struct MysqlRows {
    mc: Option<Box<MysqlConn>>,
    rs: ResultSet,
}

impl MysqlRows {
    fn new(columns: Vec<ColumnDescriptor>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            mc: Some(Box::new(MysqlConn {
                pending: rows,
                position: 0,
            })),
            rs: ResultSet {
                columns: columns.into_iter().map(MysqlField::from).collect(),
                done: false,
            },
        }
    }

    fn column_names(&self) -> Vec<String> {
        self.rs.columns.iter().map(|c| c.name.clone()).collect()
    }

    fn read_row(&mut self, dest: &mut [Value], text: bool) -> Result<bool> {
        if dest.len() != self.rs.columns.len() {
            return Err(Error::driver(format!(
                "expected {} destination slots, got {}",
                self.rs.columns.len(),
                dest.len()
            )));
        }
        if self.rs.done {
            return Ok(false);
        }
        let mc = self
            .mc
            .as_mut()
            .ok_or_else(|| Error::driver("invalid connection"))?;
        let Some(row) = mc.pending.get(mc.position) else {
            self.rs.done = true;
            return Ok(false);
        };
        for (slot, value) in dest.iter_mut().zip(row) {
            *slot = if text {
                value.to_text_protocol()
            } else {
                value.clone()
            };
        }
        mc.position += 1;
        Ok(true)
    }

    fn close(&mut self) {
        self.rs.done = true;
        self.mc = None;
    }
}

static MYSQL_FIELD_SHAPE: TypeShape = TypeShape {
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

static MYSQL_FIELD_RECORD: ShapeKind = ShapeKind::Record(&MYSQL_FIELD_SHAPE);

static RESULT_SET_SHAPE: TypeShape = TypeShape {
    name: "ResultSet",
    size: size_of::<ResultSet>(),
    fields: &[
        FieldShape {
            name: "columns",
            offset: offset_of!(ResultSet, columns),
            kind: ShapeKind::Slice(&MYSQL_FIELD_RECORD),
        },
        FieldShape {
            name: "done",
            offset: offset_of!(ResultSet, done),
            kind: ShapeKind::Scalar(Primitive::Bool),
        },
    ],
};

static VALUE_KIND: ShapeKind = ShapeKind::Interface("mysql_internals_rs::Value");
static VALUE_ROW_KIND: ShapeKind = ShapeKind::Slice(&VALUE_KIND);

static MYSQL_CONN_SHAPE: TypeShape = TypeShape {
    name: "MysqlConn",
    size: size_of::<MysqlConn>(),
    fields: &[
        FieldShape {
            name: "pending",
            offset: offset_of!(MysqlConn, pending),
            kind: ShapeKind::Slice(&VALUE_ROW_KIND),
        },
        FieldShape {
            name: "position",
            offset: offset_of!(MysqlConn, position),
            kind: ShapeKind::Scalar(Primitive::Usize),
        },
    ],
};

static MYSQL_CONN_RECORD: ShapeKind = ShapeKind::Record(&MYSQL_CONN_SHAPE);

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

/// Rows read with the text protocol (plain queries without arguments).
#[repr(C)]
pub(crate) struct TextRows {
    mysql_rows: MysqlRows,
}

/// Rows read with the binary protocol (prepared statements).
#[repr(C)]
pub(crate) struct BinaryRows {
    mysql_rows: MysqlRows,
}

macro_rules! protocol_rows {
    ($rows:ident, $shape:ident, $name:literal, $text:literal) => {
        static $shape: TypeShape = TypeShape {
            name: $name,
            size: size_of::<$rows>(),
            fields: &[FieldShape {
                name: "mysql_rows",
                offset: offset_of!($rows, mysql_rows),
                kind: ShapeKind::Record(&MYSQL_ROWS_SHAPE),
            }],
        };

        impl $rows {
            pub(crate) fn new(columns: Vec<ColumnDescriptor>, rows: Vec<Vec<Value>>) -> Self {
                Self {
                    mysql_rows: MysqlRows::new(columns, rows),
                }
            }
        }

        impl DriverRows for $rows {
            fn columns(&self) -> Vec<String> {
                self.mysql_rows.column_names()
            }

            fn next(&mut self, dest: &mut [Value]) -> Result<bool> {
                self.mysql_rows.read_row(dest, $text)
            }

            fn close(&mut self) -> Result<()> {
                self.mysql_rows.close();
                Ok(())
            }

            fn as_reflect(&self) -> Option<&dyn Reflect> {
                Some(self)
            }
        }

        // SAFETY: the shape is derived from the type with offset_of!/size_of,
        // nested shapes likewise, and `field` follows its order.
        unsafe impl Reflect for $rows {
            fn shape(&self) -> &'static TypeShape {
                &$shape
            }

            fn field(&self, index: usize) -> Option<&dyn Any> {
                match index {
                    0 => Some(&self.mysql_rows as &dyn Any),
                    _ => None,
                }
            }

            fn as_ptr(&self) -> *const () {
                self as *const Self as *const ()
            }
        }
    };
}

protocol_rows!(TextRows, TEXT_ROWS_SHAPE, "TextRows", true);
protocol_rows!(BinaryRows, BINARY_ROWS_SHAPE, "BinaryRows", false);

/// Result without columns, e.g. of an UPDATE run through a query call.
pub(crate) struct EmptyRows;

static EMPTY_ROWS_SHAPE: TypeShape = TypeShape {
    name: "EmptyRows",
    size: 0,
    fields: &[],
};

impl DriverRows for EmptyRows {
    fn columns(&self) -> Vec<String> {
        Vec::new()
    }

    fn next(&mut self, _dest: &mut [Value]) -> Result<bool> {
        Ok(false)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn as_reflect(&self) -> Option<&dyn Reflect> {
        Some(self)
    }
}

// SAFETY: zero-sized, no fields.
unsafe impl Reflect for EmptyRows {
    fn shape(&self) -> &'static TypeShape {
        &EMPTY_ROWS_SHAPE
    }

    fn field(&self, _index: usize) -> Option<&dyn Any> {
        None
    }

    fn as_ptr(&self) -> *const () {
        self as *const Self as *const ()
    }
}
