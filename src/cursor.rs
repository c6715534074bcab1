//! Result cursors as handed out by the database layer.
//!
//! [`DriverRows`] is the capability set a driver's row iterator provides:
//! column names, reading the next row into a buffer, and closing. [`Rows`]
//! (many rows) and [`Row`] (a single row or its error) wrap such an iterator
//! and only expose column names; the driver's own column metadata stays
//! hidden inside the iterator.

use std::any::Any;
use std::mem::{offset_of, size_of};

use crate::driver::Value;
use crate::error::{Error, Result};
use crate::mirror::{FieldShape, Primitive, ShapeKind, TypeShape};
use crate::reflect::Reflect;

pub(crate) const ERROR_INTERFACE: &str = "mysql_internals_rs::Error";
pub(crate) const DRIVER_ROWS_INTERFACE: &str = "mysql_internals_rs::DriverRows";

/// Row iterator implemented by a driver.
pub trait DriverRows {
    /// Column names of the result.
    fn columns(&self) -> Vec<String>;

    /// Read the next row into `dest`, which holds one slot per column.
    ///
    /// Returns `Ok(false)` when the rows are exhausted.
    fn next(&mut self, dest: &mut [Value]) -> Result<bool>;

    /// Release the iterator. Column names stay available.
    fn close(&mut self) -> Result<()>;

    /// Runtime shape of the iterator, if the driver exposes one.
    fn as_reflect(&self) -> Option<&dyn Reflect> {
        None
    }
}

/// Result of a query returning any number of rows.
pub struct Rows {
    rowsi: Option<Box<dyn DriverRows>>,
    closed: bool,
}

pub(crate) static ROWS_SHAPE: TypeShape = TypeShape {
    name: "Rows",
    size: size_of::<Rows>(),
    fields: &[
        FieldShape {
            name: "rowsi",
            offset: offset_of!(Rows, rowsi),
            kind: ShapeKind::Interface(DRIVER_ROWS_INTERFACE),
        },
        FieldShape {
            name: "closed",
            offset: offset_of!(Rows, closed),
            kind: ShapeKind::Scalar(Primitive::Bool),
        },
    ],
};

impl Rows {
    /// Wrap a driver's row iterator.
    pub fn new(rowsi: Box<dyn DriverRows>) -> Self {
        Self {
            rowsi: Some(rowsi),
            closed: false,
        }
    }

    /// Column names of the result.
    pub fn columns(&self) -> Result<Vec<String>> {
        match &self.rowsi {
            Some(rowsi) if !self.closed => Ok(rowsi.columns()),
            _ => Err(Error::driver("rows are closed")),
        }
    }

    /// Fetch the next row.
    ///
    /// Returns `Ok(None)` when exhausted; the rows are closed at that point.
    pub fn next(&mut self) -> Result<Option<Vec<Value>>> {
        if self.closed {
            return Ok(None);
        }
        let Some(rowsi) = self.rowsi.as_mut() else {
            return Ok(None);
        };
        let mut dest = vec![Value::Null; rowsi.columns().len()];
        if rowsi.next(&mut dest)? {
            Ok(Some(dest))
        } else {
            self.close()?;
            Ok(None)
        }
    }

    /// Fetch all remaining rows and close.
    pub fn fetch_all(&mut self) -> Result<Vec<Vec<Value>>> {
        let mut all_rows = Vec::new();
        while let Some(row) = self.next()? {
            all_rows.push(row);
        }
        Ok(all_rows)
    }

    /// Close the rows. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.rowsi.as_mut() {
            Some(rowsi) => rowsi.close(),
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

// SAFETY: ROWS_SHAPE is derived from `Rows` with offset_of!/size_of and
// `field` follows its order.
unsafe impl Reflect for Rows {
    fn shape(&self) -> &'static TypeShape {
        &ROWS_SHAPE
    }

    fn field(&self, index: usize) -> Option<&dyn Any> {
        match index {
            0 => Some(&self.rowsi as &dyn Any),
            1 => Some(&self.closed as &dyn Any),
            _ => None,
        }
    }

    fn as_ptr(&self) -> *const () {
        self as *const Self as *const ()
    }
}

/// Result of a query expected to return at most one row.
///
/// Holds either the rows or the error the query produced.
#[derive(Default)]
pub struct Row {
    err: Option<Error>,
    rows: Option<Box<Rows>>,
}

static ROWS_RECORD: ShapeKind = ShapeKind::Record(&ROWS_SHAPE);

pub(crate) static ROW_SHAPE: TypeShape = TypeShape {
    name: "Row",
    size: size_of::<Row>(),
    fields: &[
        FieldShape {
            name: "err",
            offset: offset_of!(Row, err),
            kind: ShapeKind::Interface(ERROR_INTERFACE),
        },
        FieldShape {
            name: "rows",
            offset: offset_of!(Row, rows),
            kind: ShapeKind::Pointer(&ROWS_RECORD),
        },
    ],
};

impl Row {
    /// A row backed by query results.
    pub fn from_rows(rows: Rows) -> Self {
        Self {
            err: None,
            rows: Some(Box::new(rows)),
        }
    }

    /// A row carrying the error of a failed query.
    pub fn from_error(err: Error) -> Self {
        Self {
            err: Some(err),
            rows: None,
        }
    }

    /// Read the single row and close the underlying rows.
    pub fn scan(self) -> Result<Vec<Value>> {
        if let Some(err) = self.err {
            return Err(err);
        }
        let Some(mut rows) = self.rows else {
            return Err(Error::RowStateInconsistent);
        };
        let row = rows.next()?;
        rows.close()?;
        row.ok_or_else(|| Error::driver("no rows in result set"))
    }
}

// SAFETY: ROW_SHAPE is derived from `Row` with offset_of!/size_of and
// `field` follows its order.
unsafe impl Reflect for Row {
    fn shape(&self) -> &'static TypeShape {
        &ROW_SHAPE
    }

    fn field(&self, index: usize) -> Option<&dyn Any> {
        match index {
            0 => Some(&self.err as &dyn Any),
            1 => Some(&self.rows as &dyn Any),
            _ => None,
        }
    }

    fn as_ptr(&self) -> *const () {
        self as *const Self as *const ()
    }
}
