//! Type declarations for CREATE TABLE statements.
//!
//! A declaration is the canonical type name, an optional parenthesized
//! parameter list and the attributes BINARY, UNSIGNED, ZEROFILL and NOT NULL,
//! always in that order. Column names, character sets, collations, defaults,
//! keys and AUTO_INCREMENT are not part of it.
//! See <http://dev.mysql.com/doc/refman/5.6/en/create-table.html>.

use crate::error::{ParameterError, Result};

use super::{ColumnDescriptor, FieldFlags, FieldType};

/// Parameters a type accepts in its declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamCategory {
    /// Unknown type, no declaration possible.
    Unknown,
    /// No parameters: temporal types, BLOBs, GEOMETRY, JSON.
    None,
    /// Nothing or a length: BIT, the integer types, CHAR.
    OptionalLength,
    /// A length: VARCHAR.
    MandatoryLength,
    /// Nothing or length and decimals: FLOAT, DOUBLE.
    OptionalPrecision,
    /// Nothing, a length, or length and decimals: DECIMAL.
    OptionalLengthAndDecimals,
    /// One or more values: ENUM, SET.
    EnumeratedValues,
}

impl ParamCategory {
    /// The category for a type code.
    pub fn for_type(field_type: FieldType) -> Self {
        match field_type {
            FieldType::BIT | FieldType::STRING => ParamCategory::OptionalLength,
            t if t.is_integer() => ParamCategory::OptionalLength,
            t if t.is_decimal() => ParamCategory::OptionalLengthAndDecimals,
            t if t.is_floating_point() => ParamCategory::OptionalPrecision,
            FieldType::VARCHAR | FieldType::VAR_STRING => ParamCategory::MandatoryLength,
            FieldType::ENUM | FieldType::SET => ParamCategory::EnumeratedValues,
            FieldType::GEOMETRY | FieldType::JSON => ParamCategory::None,
            t if t.is_temporal() || t.is_blob() => ParamCategory::None,
            _ => ParamCategory::Unknown,
        }
    }

    fn error(self) -> ParameterError {
        match self {
            ParamCategory::Unknown => ParameterError::UnknownType,
            ParamCategory::None => ParameterError::ExpectedNone,
            ParamCategory::OptionalLength => ParameterError::ExpectedOptionalLength,
            ParamCategory::MandatoryLength => ParameterError::ExpectedLength,
            ParamCategory::OptionalPrecision => ParameterError::ExpectedOptionalPrecision,
            ParamCategory::OptionalLengthAndDecimals => {
                ParameterError::ExpectedOptionalLengthAndDecimals
            }
            ParamCategory::EnumeratedValues => ParameterError::ExpectedValues,
        }
    }

    /// Render the parenthesized parameter list, empty if there is none.
    ///
    /// `decimals` is the count reported by the column, used when a DECIMAL is
    /// declared with a length only.
    fn render(
        self,
        params: &DeclParams,
        decimals: Option<u8>,
    ) -> std::result::Result<String, ParameterError> {
        use ParamCategory as C;

        match (self, params) {
            (C::Unknown, _) => Err(ParameterError::UnknownType),
            (
                C::None | C::OptionalLength | C::OptionalPrecision | C::OptionalLengthAndDecimals,
                DeclParams::None,
            ) => Ok(String::new()),
            (C::OptionalLength | C::MandatoryLength, DeclParams::Length(length)) if *length > 0 => {
                Ok(format!("({})", length))
            }
            (C::OptionalLengthAndDecimals, DeclParams::Length(length)) if *length > 0 => {
                match decimals {
                    Some(d) if d > 0 && i64::from(d) <= *length => {
                        Ok(format!("({},{})", length, d))
                    }
                    _ => Ok(format!("({})", length)),
                }
            }
            (
                C::OptionalPrecision | C::OptionalLengthAndDecimals,
                DeclParams::LengthAndDecimals(length, decimals),
            ) if *length > 0 && *decimals >= 0 => Ok(format!("({},{})", length, decimals)),
            (C::EnumeratedValues, DeclParams::Values(values)) if !values.is_empty() => {
                let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
                Ok(format!("({})", quoted.join(",")))
            }
            _ => Err(self.error()),
        }
    }
}

/// Parameters for a type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeclParams {
    #[default]
    None,
    /// Display width or maximum length; must be positive.
    Length(i64),
    /// Precision and scale; length must be positive, decimals non-negative.
    LengthAndDecimals(i64, i64),
    /// Permitted values of an ENUM or SET.
    Values(Vec<String>),
}

/// Build the type declaration for a column.
pub fn declare(column: &ColumnDescriptor, params: &DeclParams) -> Result<String> {
    const BINARY: &str = " BINARY";
    const UNSIGNED: &str = " UNSIGNED";
    const ZEROFILL: &str = " ZEROFILL";
    const NOT_NULL: &str = " NOT NULL";

    let field_type = column.field_type;
    if field_type == FieldType::NULL {
        return Err(ParameterError::NoDeclarationForNullType.into());
    }
    let fragment = ParamCategory::for_type(field_type).render(params, column.decimals)?;

    let flags = column.flags;
    let mut decl = String::from(field_type.canonical_name());
    decl.push_str(&fragment);
    if field_type.is_text() && flags.contains(FieldFlags::BINARY) {
        decl.push_str(BINARY);
    }
    if field_type.is_number() {
        if flags.contains(FieldFlags::UNSIGNED) {
            decl.push_str(UNSIGNED);
        }
        if flags.contains(FieldFlags::ZERO_FILL) {
            decl.push_str(ZEROFILL);
        }
    }
    if flags.contains(FieldFlags::NOT_NULL) {
        decl.push_str(NOT_NULL);
    }
    Ok(decl)
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn field(field_type: FieldType, flags: FieldFlags) -> ColumnDescriptor {
        ColumnDescriptor::new("c", field_type).with_flags(flags)
    }

    fn param_err(result: Result<String>) -> ParameterError {
        match result {
            Err(Error::Parameter(e)) => e,
            other => panic!("expected parameter error, got {:?}", other),
        }
    }

    #[test]
    fn test_varchar_not_null() {
        let col = field(FieldType::VAR_STRING, FieldFlags::NOT_NULL);
        assert_eq!(
            declare(&col, &DeclParams::Length(2)).unwrap(),
            "VARCHAR(2) NOT NULL"
        );
        assert_eq!(
            param_err(declare(&col, &DeclParams::None)),
            ParameterError::ExpectedLength
        );
        assert_eq!(
            param_err(declare(&col, &DeclParams::Length(0))),
            ParameterError::ExpectedLength
        );
    }

    #[test]
    fn test_decimal_params() {
        let col = field(FieldType::NEWDECIMAL, FieldFlags::empty());
        assert_eq!(declare(&col, &DeclParams::None).unwrap(), "DECIMAL");
        assert_eq!(declare(&col, &DeclParams::Length(5)).unwrap(), "DECIMAL(5)");
        assert_eq!(
            declare(&col, &DeclParams::LengthAndDecimals(10, 2)).unwrap(),
            "DECIMAL(10,2)"
        );
        assert_eq!(
            param_err(declare(&col, &DeclParams::LengthAndDecimals(5, -1))),
            ParameterError::ExpectedOptionalLengthAndDecimals
        );
        assert_eq!(
            param_err(declare(&col, &DeclParams::Values(vec!["x".into()]))),
            ParameterError::ExpectedOptionalLengthAndDecimals
        );
    }

    #[test]
    fn test_decimal_uses_reported_decimals() {
        let col = field(FieldType::NEWDECIMAL, FieldFlags::empty()).with_decimals(2);
        assert_eq!(
            declare(&col, &DeclParams::Length(8)).unwrap(),
            "DECIMAL(8,2)"
        );
        assert_eq!(
            declare(&col, &DeclParams::LengthAndDecimals(8, 4)).unwrap(),
            "DECIMAL(8,4)"
        );
    }

    #[test]
    fn test_float_needs_both_or_nothing() {
        let col = field(FieldType::DOUBLE, FieldFlags::empty());
        assert_eq!(declare(&col, &DeclParams::None).unwrap(), "DOUBLE");
        assert_eq!(
            declare(&col, &DeclParams::LengthAndDecimals(7, 3)).unwrap(),
            "DOUBLE(7,3)"
        );
        assert_eq!(
            param_err(declare(&col, &DeclParams::Length(7))),
            ParameterError::ExpectedOptionalPrecision
        );
    }

    #[test]
    fn test_suffix_order() {
        let col = field(
            FieldType::LONG,
            FieldFlags::NOT_NULL | FieldFlags::ZERO_FILL | FieldFlags::UNSIGNED,
        );
        assert_eq!(
            declare(&col, &DeclParams::Length(10)).unwrap(),
            "INT(10) UNSIGNED ZEROFILL NOT NULL"
        );

        let col = field(FieldType::STRING, FieldFlags::BINARY | FieldFlags::NOT_NULL);
        assert_eq!(
            declare(&col, &DeclParams::Length(4)).unwrap(),
            "CHAR(4) BINARY NOT NULL"
        );
    }

    #[test]
    fn test_modifiers_only_where_they_apply() {
        // BINARY is ignored on numbers, UNSIGNED on strings
        let col = field(FieldType::TINY, FieldFlags::BINARY);
        assert_eq!(declare(&col, &DeclParams::None).unwrap(), "TINYINT");
        let col = field(FieldType::VARCHAR, FieldFlags::UNSIGNED);
        assert_eq!(declare(&col, &DeclParams::Length(3)).unwrap(), "VARCHAR(3)");
        let col = field(FieldType::BLOB, FieldFlags::BINARY | FieldFlags::NOT_NULL);
        assert_eq!(declare(&col, &DeclParams::None).unwrap(), "BLOB NOT NULL");
    }

    #[test]
    fn test_no_params_types() {
        let col = field(FieldType::DATETIME, FieldFlags::empty());
        assert_eq!(declare(&col, &DeclParams::None).unwrap(), "DATETIME");
        assert_eq!(
            param_err(declare(&col, &DeclParams::Length(6))),
            ParameterError::ExpectedNone
        );
    }

    #[test]
    fn test_enum_values() {
        let col = field(FieldType::ENUM, FieldFlags::NOT_NULL);
        let values = DeclParams::Values(vec!["a".into(), "it's".into()]);
        assert_eq!(
            declare(&col, &values).unwrap(),
            "ENUM('a','it''s') NOT NULL"
        );
        assert_eq!(
            param_err(declare(&col, &DeclParams::Values(vec![]))),
            ParameterError::ExpectedValues
        );
        assert_eq!(
            param_err(declare(&col, &DeclParams::None)),
            ParameterError::ExpectedValues
        );
    }

    #[test]
    fn test_null_and_unknown_types() {
        let col = field(FieldType::NULL, FieldFlags::empty());
        assert_eq!(
            param_err(declare(&col, &DeclParams::None)),
            ParameterError::NoDeclarationForNullType
        );
        let col = field(FieldType::from_code(0x42), FieldFlags::empty());
        assert_eq!(
            param_err(declare(&col, &DeclParams::None)),
            ParameterError::UnknownType
        );
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            ParamCategory::for_type(FieldType::BIT),
            ParamCategory::OptionalLength
        );
        assert_eq!(
            ParamCategory::for_type(FieldType::LONGLONG),
            ParamCategory::OptionalLength
        );
        assert_eq!(
            ParamCategory::for_type(FieldType::SET),
            ParamCategory::EnumeratedValues
        );
        assert_eq!(
            ParamCategory::for_type(FieldType::MEDIUM_BLOB),
            ParamCategory::None
        );
        assert_eq!(
            ParamCategory::for_type(FieldType::NULL),
            ParamCategory::Unknown
        );
    }
}
