//! In-memory MySQL driver.
//!
//! Produces [`Rows`] the way a MySQL driver does after a query has been
//! read: plain queries give text protocol rows, prepared statements give
//! binary protocol rows and statements without a result set give empty
//! rows. The column definitions are kept inside the driver's iterator.

mod rows;
mod value;

pub use value::Value;

pub(crate) use rows::{BinaryRows, EmptyRows, TextRows};

use crate::column::ColumnDescriptor;
use crate::cursor::Rows;

/// Rows of a plain query, read with the text protocol.
pub fn text_rows(columns: Vec<ColumnDescriptor>, rows: Vec<Vec<Value>>) -> Rows {
    Rows::new(Box::new(TextRows::new(columns, rows)))
}

/// Rows of a prepared statement, read with the binary protocol.
pub fn binary_rows(columns: Vec<ColumnDescriptor>, rows: Vec<Vec<Value>>) -> Rows {
    Rows::new(Box::new(BinaryRows::new(columns, rows)))
}

/// Rows of a statement that returns no result set.
pub fn empty_rows() -> Rows {
    Rows::new(Box::new(EmptyRows))
}
