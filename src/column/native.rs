//! Mapping of column types to native Rust value types.

use std::any::{type_name, TypeId};

use chrono::NaiveDateTime;
use num_bigint::BigInt;

use crate::error::{Error, Result};

use super::{ColumnDescriptor, FieldFlags, FieldType};

/// Native value type able to hold a column's values.
///
/// Conversions may still fail for individual values, e.g. the MySQL zero
/// date "0000-00-00" has no `NaiveDateTime` representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    /// Arbitrary precision integer holding the decimal's unscaled digits.
    Decimal,
    /// Date, time or timestamp.
    DateTime,
    /// BIT(n) as one bool per bit.
    Bits,
    String,
    Bytes,
    NullableI64,
    NullableF64,
    NullableString,
    NullableDateTime,
}

impl NativeType {
    /// Whether the type can represent SQL NULL.
    pub fn is_nullable(self) -> bool {
        matches!(
            self,
            NativeType::NullableI64
                | NativeType::NullableF64
                | NativeType::NullableString
                | NativeType::NullableDateTime
                | NativeType::Bytes
        )
    }

    /// Name of the Rust type.
    pub fn type_name(self) -> &'static str {
        self.rust_type().0
    }

    /// `TypeId` of the Rust type.
    pub fn type_id(self) -> TypeId {
        self.rust_type().1
    }

    fn rust_type(self) -> (&'static str, TypeId) {
        fn of<T: 'static>() -> (&'static str, TypeId) {
            (type_name::<T>(), TypeId::of::<T>())
        }

        match self {
            NativeType::U8 => of::<u8>(),
            NativeType::U16 => of::<u16>(),
            NativeType::U32 => of::<u32>(),
            NativeType::U64 => of::<u64>(),
            NativeType::I8 => of::<i8>(),
            NativeType::I16 => of::<i16>(),
            NativeType::I32 => of::<i32>(),
            NativeType::I64 => of::<i64>(),
            NativeType::F32 => of::<f32>(),
            NativeType::F64 => of::<f64>(),
            NativeType::Decimal => of::<BigInt>(),
            NativeType::String => of::<String>(),
            NativeType::DateTime => of::<NaiveDateTime>(),
            NativeType::Bits => of::<Vec<bool>>(),
            NativeType::Bytes => of::<Vec<u8>>(),
            NativeType::NullableI64 => of::<Option<i64>>(),
            NativeType::NullableF64 => of::<Option<f64>>(),
            NativeType::NullableString => of::<Option<String>>(),
            NativeType::NullableDateTime => of::<Option<NaiveDateTime>>(),
        }
    }
}

/// Smallest native type able to hold every non-NULL value of the column.
pub fn plain_type(column: &ColumnDescriptor) -> Result<NativeType> {
    let field_type = column.field_type;
    if column.flags.contains(FieldFlags::UNSIGNED) {
        match field_type {
            FieldType::TINY => return Ok(NativeType::U8),
            FieldType::SHORT => return Ok(NativeType::U16),
            FieldType::INT24 | FieldType::LONG => return Ok(NativeType::U32),
            FieldType::LONGLONG => return Ok(NativeType::U64),
            // unsigned non-integer types fall through
            _ => {}
        }
    }
    match field_type {
        FieldType::TINY => Ok(NativeType::I8),
        FieldType::SHORT => Ok(NativeType::I16),
        FieldType::INT24 | FieldType::LONG => Ok(NativeType::I32),
        FieldType::LONGLONG => Ok(NativeType::I64),
        FieldType::FLOAT => Ok(NativeType::F32),
        FieldType::DOUBLE => Ok(NativeType::F64),
        FieldType::BIT => Ok(NativeType::Bits),
        FieldType::JSON => Ok(NativeType::String),
        t if t.is_decimal() => Ok(NativeType::Decimal),
        t if t.is_temporal() => Ok(NativeType::DateTime),
        t if t.is_text() => Ok(NativeType::String),
        t if t.is_blob() => Ok(NativeType::Bytes),
        _ => Err(Error::NoNativeMapping { field_type }),
    }
}

/// Native type able to hold the column's values including NULL.
///
/// With `force_nullable` the NOT NULL flag is ignored. Columns flagged NOT
/// NULL otherwise get their [`plain_type`]. Decimal columns have no nullable
/// mapping.
pub fn nullable_type(column: &ColumnDescriptor, force_nullable: bool) -> Result<NativeType> {
    let field_type = column.field_type;
    if force_nullable || !column.flags.contains(FieldFlags::NOT_NULL) {
        return match field_type {
            t if t.is_integer() => Ok(NativeType::NullableI64),
            t if t.is_floating_point() => Ok(NativeType::NullableF64),
            FieldType::JSON => Ok(NativeType::NullableString),
            t if t.is_text() => Ok(NativeType::NullableString),
            t if t.is_temporal() => Ok(NativeType::NullableDateTime),
            // an empty byte vector stands in for NULL
            t if t.is_blob() => Ok(NativeType::Bytes),
            _ => Err(Error::NoNativeMapping { field_type }),
        };
    }
    plain_type(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(field_type: FieldType, flags: FieldFlags) -> ColumnDescriptor {
        ColumnDescriptor::new("c", field_type).with_flags(flags)
    }

    #[test]
    fn test_integer_signedness() {
        let signed = col(FieldType::LONG, FieldFlags::empty());
        let unsigned = col(FieldType::LONG, FieldFlags::UNSIGNED);
        assert_eq!(plain_type(&signed).unwrap(), NativeType::I32);
        assert_eq!(plain_type(&unsigned).unwrap(), NativeType::U32);
        assert_eq!(
            plain_type(&col(FieldType::INT24, FieldFlags::UNSIGNED)).unwrap(),
            NativeType::U32
        );
        assert_eq!(
            plain_type(&col(FieldType::LONGLONG, FieldFlags::empty())).unwrap(),
            NativeType::I64
        );
        assert_eq!(plain_type(&unsigned).unwrap().type_id(), TypeId::of::<u32>());
    }

    #[test]
    fn test_unsigned_non_integer_falls_through() {
        let c = col(FieldType::DOUBLE, FieldFlags::UNSIGNED);
        assert_eq!(plain_type(&c).unwrap(), NativeType::F64);
        let c = col(FieldType::NEWDECIMAL, FieldFlags::UNSIGNED);
        assert_eq!(plain_type(&c).unwrap(), NativeType::Decimal);
    }

    #[test]
    fn test_plain_types() {
        let cases = [
            (FieldType::FLOAT, NativeType::F32),
            (FieldType::DECIMAL, NativeType::Decimal),
            (FieldType::YEAR, NativeType::DateTime),
            (FieldType::TIMESTAMP, NativeType::DateTime),
            (FieldType::BIT, NativeType::Bits),
            (FieldType::STRING, NativeType::String),
            (FieldType::LONG_BLOB, NativeType::Bytes),
        ];
        for (field_type, expected) in cases {
            assert_eq!(
                plain_type(&col(field_type, FieldFlags::empty())).unwrap(),
                expected,
                "{}",
                field_type
            );
        }
        assert_eq!(
            NativeType::DateTime.type_id(),
            TypeId::of::<NaiveDateTime>()
        );
        assert_eq!(NativeType::Decimal.type_id(), TypeId::of::<BigInt>());
        assert_ne!(NativeType::Decimal.type_id(), TypeId::of::<String>());
    }

    #[test]
    fn test_no_plain_mapping() {
        for field_type in [
            FieldType::ENUM,
            FieldType::SET,
            FieldType::GEOMETRY,
            FieldType::NULL,
        ] {
            assert_eq!(
                plain_type(&col(field_type, FieldFlags::empty())),
                Err(Error::NoNativeMapping { field_type })
            );
        }
    }

    #[test]
    fn test_nullable_types() {
        let c = col(FieldType::TINY, FieldFlags::UNSIGNED);
        assert_eq!(nullable_type(&c, false).unwrap(), NativeType::NullableI64);
        let c = col(FieldType::VARCHAR, FieldFlags::empty());
        assert_eq!(nullable_type(&c, false).unwrap(), NativeType::NullableString);
        let c = col(FieldType::DATE, FieldFlags::empty());
        assert_eq!(
            nullable_type(&c, false).unwrap(),
            NativeType::NullableDateTime
        );
        let c = col(FieldType::BLOB, FieldFlags::empty());
        assert_eq!(nullable_type(&c, false).unwrap(), NativeType::Bytes);
        let c = col(FieldType::JSON, FieldFlags::empty());
        assert_eq!(nullable_type(&c, false).unwrap(), NativeType::NullableString);
        let c = col(FieldType::JSON, FieldFlags::NOT_NULL);
        assert_eq!(nullable_type(&c, false).unwrap(), NativeType::String);
        let c = col(FieldType::NEWDECIMAL, FieldFlags::empty());
        assert!(matches!(
            nullable_type(&c, false),
            Err(Error::NoNativeMapping { .. })
        ));
    }

    #[test]
    fn test_not_null_uses_plain_type() {
        let c = col(FieldType::SHORT, FieldFlags::NOT_NULL);
        assert_eq!(nullable_type(&c, false).unwrap(), NativeType::I16);
        assert_eq!(nullable_type(&c, true).unwrap(), NativeType::NullableI64);
        let c = col(FieldType::NEWDECIMAL, FieldFlags::NOT_NULL);
        assert_eq!(nullable_type(&c, false).unwrap(), NativeType::Decimal);
        assert!(nullable_type(&c, true).is_err());
    }

    #[test]
    fn test_nullability() {
        assert!(NativeType::NullableString.is_nullable());
        assert!(NativeType::Bytes.is_nullable());
        assert!(!NativeType::I64.is_nullable());
        assert_eq!(
            NativeType::NullableF64.type_name(),
            std::any::type_name::<Option<f64>>()
        );
    }
}
