//! MySQL column type codes and their classification.
//!
//! The codes are the ones sent in the column definition packet. Every
//! classification is total over the `u8` domain; unknown codes belong to no
//! group and have no name.

use std::fmt;

/// MySQL column type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldType(u8);

impl FieldType {
    pub const DECIMAL: FieldType = FieldType(0x00);
    pub const TINY: FieldType = FieldType(0x01);
    pub const SHORT: FieldType = FieldType(0x02);
    pub const LONG: FieldType = FieldType(0x03);
    pub const FLOAT: FieldType = FieldType(0x04);
    pub const DOUBLE: FieldType = FieldType(0x05);
    pub const NULL: FieldType = FieldType(0x06);
    pub const TIMESTAMP: FieldType = FieldType(0x07);
    pub const LONGLONG: FieldType = FieldType(0x08);
    pub const INT24: FieldType = FieldType(0x09);
    pub const DATE: FieldType = FieldType(0x0a);
    pub const TIME: FieldType = FieldType(0x0b);
    pub const DATETIME: FieldType = FieldType(0x0c);
    pub const YEAR: FieldType = FieldType(0x0d);
    pub const NEWDATE: FieldType = FieldType(0x0e);
    pub const VARCHAR: FieldType = FieldType(0x0f);
    pub const BIT: FieldType = FieldType(0x10);
    pub const JSON: FieldType = FieldType(0xf5);
    pub const NEWDECIMAL: FieldType = FieldType(0xf6);
    pub const ENUM: FieldType = FieldType(0xf7);
    pub const SET: FieldType = FieldType(0xf8);
    pub const TINY_BLOB: FieldType = FieldType(0xf9);
    pub const MEDIUM_BLOB: FieldType = FieldType(0xfa);
    pub const LONG_BLOB: FieldType = FieldType(0xfb);
    pub const BLOB: FieldType = FieldType(0xfc);
    pub const VAR_STRING: FieldType = FieldType(0xfd);
    pub const STRING: FieldType = FieldType(0xfe);
    pub const GEOMETRY: FieldType = FieldType(0xff);

    /// Wrap a raw type code.
    pub const fn from_code(code: u8) -> Self {
        FieldType(code)
    }

    /// The raw type code.
    pub const fn code(self) -> u8 {
        self.0
    }

    /// TINYINT, SMALLINT, MEDIUMINT, INT or BIGINT.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::TINY | Self::SHORT | Self::INT24 | Self::LONG | Self::LONGLONG
        )
    }

    /// FLOAT or DOUBLE.
    pub fn is_floating_point(self) -> bool {
        matches!(self, Self::FLOAT | Self::DOUBLE)
    }

    /// DECIMAL, old or new.
    pub fn is_decimal(self) -> bool {
        matches!(self, Self::DECIMAL | Self::NEWDECIMAL)
    }

    /// Integer, floating point or decimal.
    pub fn is_number(self) -> bool {
        self.is_integer() || self.is_floating_point() || self.is_decimal()
    }

    /// CHAR or VARCHAR.
    pub fn is_text(self) -> bool {
        matches!(self, Self::VARCHAR | Self::VAR_STRING | Self::STRING)
    }

    /// Any of the BLOB types. MySQL also reports TEXT columns this way.
    pub fn is_blob(self) -> bool {
        matches!(
            self,
            Self::TINY_BLOB | Self::MEDIUM_BLOB | Self::BLOB | Self::LONG_BLOB
        )
    }

    /// Date, time and year types.
    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            Self::YEAR | Self::DATE | Self::NEWDATE | Self::TIME | Self::TIMESTAMP | Self::DATETIME
        )
    }

    /// SQL type name without parameters or modifiers.
    ///
    /// Empty for the NULL type and for unknown codes.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Self::TINY => "TINYINT",
            Self::SHORT => "SMALLINT",
            Self::INT24 => "MEDIUMINT",
            Self::LONG => "INT",
            Self::LONGLONG => "BIGINT",
            Self::FLOAT => "FLOAT",
            Self::DOUBLE => "DOUBLE",
            Self::DECIMAL | Self::NEWDECIMAL => "DECIMAL",
            Self::YEAR => "YEAR",
            Self::DATE | Self::NEWDATE => "DATE",
            Self::TIME => "TIME",
            Self::TIMESTAMP => "TIMESTAMP",
            Self::DATETIME => "DATETIME",
            Self::BIT => "BIT",
            Self::VARCHAR | Self::VAR_STRING => "VARCHAR",
            Self::STRING => "CHAR",
            Self::ENUM => "ENUM",
            Self::SET => "SET",
            Self::TINY_BLOB => "TINYBLOB",
            Self::MEDIUM_BLOB => "MEDIUMBLOB",
            Self::BLOB => "BLOB",
            Self::LONG_BLOB => "LONGBLOB",
            Self::GEOMETRY => "GEOMETRY",
            Self::JSON => "JSON",
            _ => "",
        }
    }
}

impl From<u8> for FieldType {
    fn from(code: u8) -> Self {
        FieldType(code)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (*self, self.canonical_name()) {
            (Self::NULL, _) => write!(f, "NULL"),
            (_, "") => write!(f, "UNKNOWN({:#04x})", self.0),
            (_, name) => write!(f, "{}", name),
        }
    }
}
