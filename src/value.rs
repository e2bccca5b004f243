//! Field values and semantic type identifiers.
//!
//! [`TypeKey`] names the semantic type of a column and is the key converters
//! are registered under. [`Value`] is the decoded, typed content of one field.

use crate::record::Record;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Semantic type identifier used to look up converters.
///
/// Serialized in `snake_case`, so declarative schemas write `"integer"`,
/// `"date"` or `{"enum": "Color"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKey {
    /// Plain text, the universal fallback.
    Text,
    /// 32-bit style integer column.
    Integer,
    /// 64-bit style integer column.
    Long,
    /// IEEE-754 double.
    Double,
    /// Boolean flag.
    Boolean,
    /// Arbitrary-precision decimal.
    Decimal,
    /// Calendar date without time zone.
    Date,
    /// UUID in canonical text form.
    Uuid,
    /// Delimited list of strings.
    List,
    /// Enumeration identified by its type name.
    Enum(String),
    /// Nested record identified by its schema name.
    Nested(String),
    /// Any other user-defined type.
    Custom(String),
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Integer => write!(f, "integer"),
            Self::Long => write!(f, "long"),
            Self::Double => write!(f, "double"),
            Self::Boolean => write!(f, "boolean"),
            Self::Decimal => write!(f, "decimal"),
            Self::Date => write!(f, "date"),
            Self::Uuid => write!(f, "uuid"),
            Self::List => write!(f, "list"),
            Self::Enum(name) => write!(f, "enum {name}"),
            Self::Nested(name) => write!(f, "nested {name}"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// A decoded field value.
///
/// `Null` is the result of decoding an empty column (except for list
/// columns, which decode to an empty [`Value::List`]).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Text.
    Text(String),
    /// Integer (both `Integer` and `Long` columns).
    Integer(i64),
    /// Double.
    Double(f64),
    /// Boolean.
    Boolean(bool),
    /// Arbitrary-precision decimal.
    Decimal(BigDecimal),
    /// Calendar date.
    Date(NaiveDate),
    /// UUID.
    Uuid(Uuid),
    /// Canonical enumeration member name.
    Enum(String),
    /// List of strings.
    List(Vec<String>),
    /// Nested record.
    Record(Record),
}

impl Value {
    /// Returns true for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the value kind, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "text",
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::Boolean(_) => "boolean",
            Value::Decimal(_) => "decimal",
            Value::Date(_) => "date",
            Value::Uuid(_) => "uuid",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    /// Borrow the text of a `Text` or `Enum` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if any.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_key_serde_names() {
        let json = serde_json::to_string(&TypeKey::Integer).unwrap();
        assert_eq!(json, "\"integer\"");
        let key: TypeKey = serde_json::from_str(r#"{"enum":"Color"}"#).unwrap();
        assert_eq!(key, TypeKey::Enum("Color".to_string()));
    }

    #[test]
    fn test_option_into_value() {
        let none: Option<i64> = None;
        assert!(Value::from(none).is_null());
        assert_eq!(Value::from(Some(7_i64)), Value::Integer(7));
    }
}
