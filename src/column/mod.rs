//! Column metadata for query results.
//!
//! [`ColumnDescriptor`] is the raw per-column record copied out of the
//! driver. [`Column`] is the user-facing view deriving type names,
//! declarations and native types from it.
//!
//! The flag based methods (key membership, NOT NULL, ...) report what MySQL
//! sends. MySQL can report false schema metadata, so these are hints rather
//! than guarantees.

mod declaration;
mod field_type;
mod flags;
mod native;

pub use declaration::{declare, DeclParams, ParamCategory};
pub use field_type::FieldType;
pub use flags::FieldFlags;
pub use native::{nullable_type, plain_type, NativeType};

use crate::error::Result;

/// Raw column descriptor as reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Source table, if the driver reports it.
    pub table_name: Option<String>,
    /// MySQL type code.
    pub field_type: FieldType,
    /// Column definition flags.
    pub flags: FieldFlags,
    /// Decimal places, if the driver reports them.
    pub decimals: Option<u8>,
}

impl ColumnDescriptor {
    /// Create a descriptor with no flags.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            table_name: None,
            field_type,
            flags: FieldFlags::empty(),
            decimals: None,
        }
    }

    /// Set the flags.
    pub fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the decimal places.
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = Some(decimals);
        self
    }

    /// Set the source table.
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }
}

/// A column of a MySQL result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    descriptor: ColumnDescriptor,
}

impl Column {
    /// Create a column from its descriptor.
    pub fn new(descriptor: ColumnDescriptor) -> Self {
        Self { descriptor }
    }

    /// The underlying descriptor.
    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    /// Column name, matching the names the result reports.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Source table, if known.
    pub fn table_name(&self) -> Option<&str> {
        self.descriptor.table_name.as_deref()
    }

    pub fn field_type(&self) -> FieldType {
        self.descriptor.field_type
    }

    /// SQL type name without parameters and modifiers.
    pub fn mysql_type(&self) -> &'static str {
        self.descriptor.field_type.canonical_name()
    }

    pub fn is_number(&self) -> bool {
        self.descriptor.field_type.is_number()
    }

    pub fn is_integer(&self) -> bool {
        self.descriptor.field_type.is_integer()
    }

    pub fn is_floating_point(&self) -> bool {
        self.descriptor.field_type.is_floating_point()
    }

    pub fn is_decimal(&self) -> bool {
        self.descriptor.field_type.is_decimal()
    }

    pub fn is_text(&self) -> bool {
        self.descriptor.field_type.is_text()
    }

    pub fn is_blob(&self) -> bool {
        self.descriptor.field_type.is_blob()
    }

    pub fn is_time(&self) -> bool {
        self.descriptor.field_type.is_temporal()
    }

    /// Marked as part of the primary key.
    pub fn is_primary_key(&self) -> bool {
        self.descriptor.flags.contains(FieldFlags::PRIMARY_KEY)
    }

    /// Marked as part of a unique key.
    pub fn is_unique_key(&self) -> bool {
        self.descriptor.flags.contains(FieldFlags::UNIQUE_KEY)
    }

    /// Marked as part of a non-unique key.
    pub fn is_multiple_key(&self) -> bool {
        self.descriptor.flags.contains(FieldFlags::MULTIPLE_KEY)
    }

    /// Marked NOT NULL.
    pub fn is_not_null(&self) -> bool {
        self.descriptor.flags.contains(FieldFlags::NOT_NULL)
    }

    /// Marked UNSIGNED.
    pub fn is_unsigned(&self) -> bool {
        self.descriptor.flags.contains(FieldFlags::UNSIGNED)
    }

    /// Marked ZEROFILL.
    pub fn is_zerofill(&self) -> bool {
        self.descriptor.flags.contains(FieldFlags::ZERO_FILL)
    }

    /// Marked BINARY.
    pub fn is_binary(&self) -> bool {
        self.descriptor.flags.contains(FieldFlags::BINARY)
    }

    /// Marked AUTO_INCREMENT.
    pub fn is_auto_increment(&self) -> bool {
        self.descriptor.flags.contains(FieldFlags::AUTO_INCREMENT)
    }

    /// Decimal places, if the driver reports them.
    pub fn decimals(&self) -> Option<u8> {
        self.descriptor.decimals
    }

    /// Parameters the type accepts in [`Column::mysql_declaration`].
    pub fn mysql_parameters(&self) -> ParamCategory {
        ParamCategory::for_type(self.descriptor.field_type)
    }

    /// Type declaration usable in a CREATE TABLE statement.
    ///
    /// # Example
    ///
    /// ```
    /// use mysql_internals_rs::{Column, ColumnDescriptor, DeclParams, FieldFlags, FieldType};
    ///
    /// let col = Column::new(
    ///     ColumnDescriptor::new("name", FieldType::VAR_STRING).with_flags(FieldFlags::NOT_NULL),
    /// );
    /// assert_eq!(col.mysql_declaration(&DeclParams::Length(2)).unwrap(), "VARCHAR(2) NOT NULL");
    /// ```
    pub fn mysql_declaration(&self, params: &DeclParams) -> Result<String> {
        declare(&self.descriptor, params)
    }

    /// Smallest native type for non-NULL values.
    pub fn native_type(&self) -> Result<NativeType> {
        plain_type(&self.descriptor)
    }

    /// Native type including NULL, see [`nullable_type`].
    pub fn nullable_native_type(&self, force_nullable: bool) -> Result<NativeType> {
        nullable_type(&self.descriptor, force_nullable)
    }
}

impl From<ColumnDescriptor> for Column {
    fn from(descriptor: ColumnDescriptor) -> Self {
        Self::new(descriptor)
    }
}

/// Columns of one result.
#[derive(Debug, Clone, Default)]
pub struct ColumnInfo {
    /// Column definitions.
    pub columns: Vec<Column>,
}

impl ColumnInfo {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get column by index.
    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Find column index by name (case-insensitive, like MySQL).
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name().eq_ignore_ascii_case(name))
    }
}
