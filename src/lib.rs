//! Column metadata for MySQL query results
//!
//! A MySQL result only reports its column names. The driver knows much
//! more about each column (type, flags, decimals, source table) but keeps
//! it in private iterator types. This crate reaches those column
//! definitions: the iterator is unwrapped from [`Row`]/[`Rows`] through
//! their runtime shape, its layout is verified once per process against
//! mirrors of the known driver versions, and only then are the definitions
//! copied out.
//!
//! # Example
//!
//! ```
//! use mysql_internals_rs::{driver, ColumnDescriptor, DeclParams, FieldFlags, FieldType, Result};
//!
//! fn main() -> Result<()> {
//!     let rows = driver::text_rows(
//!         vec![
//!             ColumnDescriptor::new("id", FieldType::LONGLONG)
//!                 .with_flags(FieldFlags::NOT_NULL | FieldFlags::PRIMARY_KEY),
//!             ColumnDescriptor::new("name", FieldType::VAR_STRING),
//!         ],
//!         vec![],
//!     );
//!
//!     let columns = mysql_internals_rs::columns(Some(&rows))?;
//!     assert!(columns[0].is_primary_key());
//!     assert_eq!(columns[0].mysql_declaration(&DeclParams::None)?, "BIGINT NOT NULL");
//!     assert_eq!(columns[1].mysql_declaration(&DeclParams::Length(64))?, "VARCHAR(64)");
//!     Ok(())
//! }
//! ```

pub mod column;
pub mod config;
pub mod cursor;
pub mod driver;
pub mod error;
pub mod inspect;
pub mod layout;
pub mod mirror;
pub mod reflect;

// Re-export main types
pub use column::{
    Column, ColumnDescriptor, ColumnInfo, DeclParams, FieldFlags, FieldType, NativeType,
    ParamCategory,
};
pub use config::{InspectConfig, LayoutSelection};
pub use cursor::{DriverRows, Row, Rows};
pub use driver::Value;
pub use error::{Error, ParameterError, Result};
pub use inspect::{column_info, columns, inspect, is_binary, Inspector};
pub use layout::{LayoutVersion, Verdict, VerdictCache};
pub use mirror::{
    check_compatible, is_compatible, FieldShape, Mismatch, Primitive, ShapeKind, TypeShape,
};
pub use reflect::Reflect;
