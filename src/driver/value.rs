//! MySQL value types for query results.

use bytes::Bytes;
use chrono::NaiveDateTime;
use std::fmt;

/// A single column value as produced by the driver.
///
/// Rows read with the text protocol carry every non-NULL value as
/// [`Value::Bytes`]; the binary protocol keeps the typed variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value.
    Null,
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// FLOAT or DOUBLE.
    Float(f64),
    /// Character data.
    Text(String),
    /// Raw bytes (BLOBs, text protocol values).
    Bytes(Bytes),
    /// DATE, DATETIME or TIMESTAMP.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get the value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Try to get the value as raw bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::Text(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Try to convert to i64. Text protocol values are parsed.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::UInt(u) => i64::try_from(*u).ok(),
            _ => self.as_str().and_then(|s| s.parse().ok()),
        }
    }

    /// Try to get the value as a NaiveDateTime.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// The value as the text protocol transmits it.
    pub(crate) fn to_text_protocol(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Bytes(b) => Value::Bytes(b.clone()),
            other => Value::Bytes(Bytes::from(other.to_string())),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(i) => write!(f, "{}", i),
            Value::UInt(u) => write!(f, "{}", u),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_value_null() {
        let val = Value::Null;
        assert!(val.is_null());
        assert_eq!(val.as_str(), None);
        assert_eq!(val.to_text_protocol(), Value::Null);
        assert_eq!(format!("{}", val), "NULL");
    }

    #[test]
    fn test_text_protocol() {
        assert_eq!(
            Value::Int(-42).to_text_protocol(),
            Value::Bytes(Bytes::from_static(b"-42"))
        );
        assert_eq!(Value::Int(-42).to_text_protocol().to_i64(), Some(-42));

        let dt = NaiveDate::from_ymd_opt(2013, 5, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        let text = Value::from(dt).to_text_protocol();
        assert_eq!(text.as_str(), Some("2013-05-01 12:30:00"));
        assert_eq!(Value::from(dt).as_datetime(), Some(dt));
    }

    #[test]
    fn test_value_accessors() {
        let val = Value::from("hi");
        assert_eq!(val.as_str(), Some("hi"));
        assert_eq!(val.as_bytes(), Some(&b"hi"[..]));
        assert_eq!(val.to_i64(), None);
        assert_eq!(Value::UInt(u64::MAX).to_i64(), None);
    }
}
