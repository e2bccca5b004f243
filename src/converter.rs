//! Bidirectional text converters.
//!
//! A [`Converter`] turns the (already trimmed) text of one column into a
//! [`Value`] and back. Converters are stateless once constructed and are
//! shared across threads behind `Arc<dyn Converter>`.
//!
//! # Built-in converters
//!
//! | Converter | Handles | Parse | Format |
//! |---|---|---|---|
//! | [`TextConverter`] | `Text` | identity | identity |
//! | [`IntegerConverter`] | `Integer`, `Long` | base-10 | decimal |
//! | [`DoubleConverter`] | `Double` | IEEE-754 | decimal |
//! | [`BooleanConverter`] | `Boolean` | `true`/`1` (any case) | `true`/`false` |
//! | [`DecimalConverter`] | `Decimal` | arbitrary precision | scale preserved |
//! | [`DateConverter`] | `Date` | pattern (default `%Y-%m-%d`) | same pattern |
//! | [`UuidConverter`] | `Uuid` | canonical UUID | canonical UUID |
//! | [`EnumConverter`] | `Enum(name)` | case-insensitive member | declared member |
//! | [`DelimitedListConverter`] | `List` | split on delimiter | join |
//! | [`NestedConverter`] | `Nested(name)` | decode nested schema | encode nested schema |
//!
//! Empty text parses to [`Value::Null`] for every converter except the list
//! converter (empty list) and the text converter (empty text). The record
//! codec never hands empty text to a converter; it asks for
//! [`Converter::empty_value`] instead.

use crate::codec::RecordCodec;
use crate::error::{ConversionError, FixcolError};
use crate::registry::ConverterRegistry;
use crate::schema::RecordSchema;
use crate::value::{TypeKey, Value};
use bigdecimal::BigDecimal;
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use std::fmt::{self, Write as _};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Default date pattern (ISO `yyyy-MM-dd`).
pub const DEFAULT_DATE_PATTERN: &str = "%Y-%m-%d";

/// Default list delimiter.
pub const DEFAULT_LIST_DELIMITER: &str = ",";

/// A bidirectional converter between column text and a typed [`Value`].
pub trait Converter: Send + Sync + fmt::Debug {
    /// Parse column text into a value.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] when the text is malformed for this type.
    fn parse(&self, text: &str) -> Result<Value, ConversionError>;

    /// Format a value as column text. [`Value::Null`] formats as `""`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] when the value has the wrong kind.
    fn format(&self, value: &Value) -> Result<String, ConversionError>;

    /// The type this converter is registered under by default.
    fn handled_type(&self) -> TypeKey;

    /// Whether this converter can serve a requested type.
    fn can_handle(&self, key: &TypeKey) -> bool {
        *key == self.handled_type()
    }

    /// Human-readable converter name.
    fn name(&self) -> String {
        format!("{}Converter", self.handled_type())
    }

    /// Value produced for an empty column.
    fn empty_value(&self) -> Value {
        Value::Null
    }
}

fn wrong_kind(expected: &str, value: &Value) -> ConversionError {
    ConversionError::new(
        format!("{value:?}"),
        format!("expected {expected} value, found {}", value.kind()),
    )
}

/// Render a date, reporting patterns a calendar date cannot satisfy.
fn format_date(date: &NaiveDate, pattern: &str) -> Result<String, ConversionError> {
    let mut text = String::new();
    write!(text, "{}", date.format(pattern)).map_err(|_| {
        ConversionError::new(
            date.to_string(),
            format!("date pattern {pattern:?} cannot render a calendar date"),
        )
    })?;
    Ok(text)
}

/// Pass-through text converter; the registry's universal fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextConverter;

impl Converter for TextConverter {
    fn parse(&self, text: &str) -> Result<Value, ConversionError> {
        Ok(Value::Text(text.to_string()))
    }

    /// Renders any scalar value, so columns that fell back to text still
    /// encode whatever the record carries.
    fn format(&self, value: &Value) -> Result<String, ConversionError> {
        Ok(match value {
            Value::Null => String::new(),
            Value::Text(s) | Value::Enum(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Double(d) => d.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::Date(d) => format_date(d, DEFAULT_DATE_PATTERN)?,
            Value::Uuid(u) => u.to_string(),
            Value::List(items) => items.join(DEFAULT_LIST_DELIMITER),
            Value::Record(_) => return Err(wrong_kind("text", value)),
        })
    }

    fn handled_type(&self) -> TypeKey {
        TypeKey::Text
    }

    fn name(&self) -> String {
        "StringConverter".to_string()
    }
}

/// Base-10 integer converter for `Integer` and `Long` columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerConverter;

impl Converter for IntegerConverter {
    fn parse(&self, text: &str) -> Result<Value, ConversionError> {
        if text.is_empty() {
            return Ok(Value::Null);
        }
        text.parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| ConversionError::new(text, e))
    }

    fn format(&self, value: &Value) -> Result<String, ConversionError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Integer(i) => Ok(i.to_string()),
            other => Err(wrong_kind("integer", other)),
        }
    }

    fn handled_type(&self) -> TypeKey {
        TypeKey::Integer
    }

    fn can_handle(&self, key: &TypeKey) -> bool {
        matches!(key, TypeKey::Integer | TypeKey::Long)
    }
}

/// IEEE-754 double converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleConverter;

impl Converter for DoubleConverter {
    fn parse(&self, text: &str) -> Result<Value, ConversionError> {
        if text.is_empty() {
            return Ok(Value::Null);
        }
        text.parse::<f64>()
            .map(Value::Double)
            .map_err(|e| ConversionError::new(text, e))
    }

    fn format(&self, value: &Value) -> Result<String, ConversionError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Double(d) => Ok(d.to_string()),
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(i) => Ok((*i as f64).to_string()),
            other => Err(wrong_kind("double", other)),
        }
    }

    fn handled_type(&self) -> TypeKey {
        TypeKey::Double
    }
}

/// Boolean converter: `"true"` or `"1"` (any case) is true, anything else false.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

impl Converter for BooleanConverter {
    fn parse(&self, text: &str) -> Result<Value, ConversionError> {
        if text.is_empty() {
            return Ok(Value::Null);
        }
        Ok(Value::Boolean(text.eq_ignore_ascii_case("true") || text == "1"))
    }

    fn format(&self, value: &Value) -> Result<String, ConversionError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Boolean(b) => Ok(b.to_string()),
            other => Err(wrong_kind("boolean", other)),
        }
    }

    fn handled_type(&self) -> TypeKey {
        TypeKey::Boolean
    }
}

/// Arbitrary-precision decimal converter; scale is preserved on format.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalConverter;

impl Converter for DecimalConverter {
    fn parse(&self, text: &str) -> Result<Value, ConversionError> {
        if text.is_empty() {
            return Ok(Value::Null);
        }
        BigDecimal::from_str(text)
            .map(Value::Decimal)
            .map_err(|e| ConversionError::new(text, e))
    }

    fn format(&self, value: &Value) -> Result<String, ConversionError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Decimal(d) => Ok(d.to_string()),
            Value::Integer(i) => Ok(i.to_string()),
            other => Err(wrong_kind("decimal", other)),
        }
    }

    fn handled_type(&self) -> TypeKey {
        TypeKey::Decimal
    }
}

/// Calendar date converter using a `chrono` strftime pattern.
#[derive(Debug, Clone)]
pub struct DateConverter {
    pattern: String,
}

impl Default for DateConverter {
    fn default() -> Self {
        DateConverter {
            pattern: DEFAULT_DATE_PATTERN.to_string(),
        }
    }
}

impl DateConverter {
    /// Create a converter for a custom pattern such as `%Y%m%d`.
    ///
    /// The pattern is not checked; a pattern that cannot render a date makes
    /// [`format`](Converter::format) fail. Use
    /// [`try_with_pattern`](Self::try_with_pattern) for untrusted patterns.
    #[must_use]
    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        DateConverter {
            pattern: pattern.into(),
        }
    }

    /// Create a converter after checking that `pattern` can both parse and
    /// render a calendar date.
    ///
    /// # Errors
    ///
    /// Returns [`FixcolError::InvalidPattern`] for unknown specifiers and for
    /// specifiers a date cannot render, such as `%H`.
    pub fn try_with_pattern(pattern: impl Into<String>) -> Result<Self, FixcolError> {
        let pattern = pattern.into();
        let invalid = |reason: &str| FixcolError::InvalidPattern {
            pattern: pattern.clone(),
            reason: reason.to_string(),
        };

        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(invalid("unknown format specifier"));
        }
        if format_date(&NaiveDate::default(), &pattern).is_err() {
            return Err(invalid("pattern needs more than a calendar date"));
        }
        Ok(DateConverter { pattern })
    }

    /// The pattern used for parse and format.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Converter for DateConverter {
    fn parse(&self, text: &str) -> Result<Value, ConversionError> {
        if text.is_empty() {
            return Ok(Value::Null);
        }
        NaiveDate::parse_from_str(text, &self.pattern)
            .map(Value::Date)
            .map_err(|e| ConversionError::new(text, e))
    }

    fn format(&self, value: &Value) -> Result<String, ConversionError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Date(d) => format_date(d, &self.pattern),
            other => Err(wrong_kind("date", other)),
        }
    }

    fn handled_type(&self) -> TypeKey {
        TypeKey::Date
    }
}

/// Canonical UUID text converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidConverter;

impl Converter for UuidConverter {
    fn parse(&self, text: &str) -> Result<Value, ConversionError> {
        if text.is_empty() {
            return Ok(Value::Null);
        }
        Uuid::parse_str(text)
            .map(Value::Uuid)
            .map_err(|e| ConversionError::new(text, e))
    }

    fn format(&self, value: &Value) -> Result<String, ConversionError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Uuid(u) => Ok(u.hyphenated().to_string()),
            other => Err(wrong_kind("uuid", other)),
        }
    }

    fn handled_type(&self) -> TypeKey {
        TypeKey::Uuid
    }
}

/// Enumeration converter matching member names case-insensitively.
///
/// # Examples
///
/// ```
/// use fixcol::converter::{Converter, EnumConverter};
/// use fixcol::Value;
///
/// let colors = EnumConverter::new("Color", ["Red", "Green"]);
/// assert_eq!(colors.parse("RED").unwrap(), Value::Enum("Red".to_string()));
/// assert!(colors.parse("blue").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct EnumConverter {
    type_name: String,
    members: Vec<String>,
}

impl EnumConverter {
    /// Create a converter for the named enumeration and its declared members.
    pub fn new<I, S>(type_name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EnumConverter {
            type_name: type_name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Declared member names.
    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    fn canonical(&self, name: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }
}

impl Converter for EnumConverter {
    fn parse(&self, text: &str) -> Result<Value, ConversionError> {
        if text.is_empty() {
            return Ok(Value::Null);
        }
        self.canonical(text)
            .map(|m| Value::Enum(m.to_string()))
            .ok_or_else(|| {
                ConversionError::new(text, format!("no member of {} matches", self.type_name))
            })
    }

    fn format(&self, value: &Value) -> Result<String, ConversionError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Enum(s) | Value::Text(s) => {
                self.canonical(s).map(str::to_string).ok_or_else(|| {
                    ConversionError::new(s.as_str(), format!("not a member of {}", self.type_name))
                })
            },
            other => Err(wrong_kind("enum", other)),
        }
    }

    fn handled_type(&self) -> TypeKey {
        TypeKey::Enum(self.type_name.clone())
    }
}

/// Delimited list converter; empty text is an empty list, never null.
#[derive(Debug, Clone)]
pub struct DelimitedListConverter {
    delimiter: String,
}

impl Default for DelimitedListConverter {
    fn default() -> Self {
        DelimitedListConverter {
            delimiter: DEFAULT_LIST_DELIMITER.to_string(),
        }
    }
}

impl DelimitedListConverter {
    /// Create a converter splitting on a custom delimiter.
    #[must_use]
    pub fn with_delimiter(delimiter: impl Into<String>) -> Self {
        DelimitedListConverter {
            delimiter: delimiter.into(),
        }
    }

    /// The delimiter used to split and join.
    #[must_use]
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }
}

impl Converter for DelimitedListConverter {
    fn parse(&self, text: &str) -> Result<Value, ConversionError> {
        if text.is_empty() {
            return Ok(Value::List(Vec::new()));
        }
        if self.delimiter.is_empty() {
            return Ok(Value::List(vec![text.to_string()]));
        }
        let mut items: Vec<String> = text.split(self.delimiter.as_str()).map(str::to_string).collect();
        // Trailing empty items are dropped
        while items.last().is_some_and(String::is_empty) {
            items.pop();
        }
        Ok(Value::List(items))
    }

    fn format(&self, value: &Value) -> Result<String, ConversionError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::List(items) => Ok(items.join(&self.delimiter)),
            other => Err(wrong_kind("list", other)),
        }
    }

    fn handled_type(&self) -> TypeKey {
        TypeKey::List
    }

    fn empty_value(&self) -> Value {
        Value::List(Vec::new())
    }
}

/// Converter that maps a column onto a nested record schema.
///
/// The column text is decoded as a line of the nested schema (positions are
/// relative to the start of the column), and encoding renders the nested
/// record back into a line. Nested columns are usually declared with
/// `trim(false)` so leading spaces keep the nested offsets intact.
#[derive(Debug, Clone)]
pub struct NestedConverter {
    codec: RecordCodec,
}

impl NestedConverter {
    /// Create a converter for a nested schema resolved against `registry`.
    #[must_use]
    pub fn new(schema: impl Into<Arc<RecordSchema>>, registry: Arc<ConverterRegistry>) -> Self {
        NestedConverter {
            codec: RecordCodec::new(schema, registry),
        }
    }

    /// The nested schema.
    #[must_use]
    pub fn schema(&self) -> &RecordSchema {
        self.codec.schema()
    }
}

impl Converter for NestedConverter {
    fn parse(&self, text: &str) -> Result<Value, ConversionError> {
        if text.is_empty() {
            return Ok(Value::Null);
        }
        self.codec
            .decode(text)
            .map(Value::Record)
            .map_err(|e| ConversionError::new(text, e))
    }

    fn format(&self, value: &Value) -> Result<String, ConversionError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Record(record) => self
                .codec
                .encode(record)
                .map_err(|e| ConversionError::new(format!("{record:?}"), e)),
            other => Err(wrong_kind("record", other)),
        }
    }

    fn handled_type(&self) -> TypeKey {
        TypeKey::Nested(self.codec.schema().name().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnSpec;

    #[test]
    fn test_integer_parse_and_format() {
        let c = IntegerConverter;
        assert_eq!(c.parse("-42").unwrap(), Value::Integer(-42));
        assert!(c.parse("4x2").is_err());
        assert_eq!(c.format(&Value::Integer(7)).unwrap(), "7");
        assert!(c.can_handle(&TypeKey::Long));
        assert!(!c.can_handle(&TypeKey::Double));
    }

    #[test]
    fn test_boolean_rules() {
        let c = BooleanConverter;
        assert_eq!(c.parse("TRUE").unwrap(), Value::Boolean(true));
        assert_eq!(c.parse("1").unwrap(), Value::Boolean(true));
        assert_eq!(c.parse("yes").unwrap(), Value::Boolean(false));
        assert_eq!(c.format(&Value::Boolean(false)).unwrap(), "false");
    }

    #[test]
    fn test_decimal_preserves_scale() {
        let c = DecimalConverter;
        let v = c.parse("0012.50").unwrap();
        assert_eq!(c.format(&v).unwrap(), "12.50");
        assert!(c.parse("12.5.0").is_err());
    }

    #[test]
    fn test_date_custom_pattern() {
        let c = DateConverter::with_pattern("%Y%m%d");
        let v = c.parse("20240229").unwrap();
        assert_eq!(v, Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert_eq!(c.format(&v).unwrap(), "20240229");
        assert!(c.parse("20230229").is_err());
    }

    #[test]
    fn test_date_pattern_with_time_fails_without_panic() {
        let c = DateConverter::with_pattern("%Y%m%d%H");
        let v = c.parse("2024013112").unwrap();
        let err = c.format(&v).unwrap_err();
        assert!(err.cause.contains("%Y%m%d%H"));
        assert!(DateConverter::with_pattern("%Q").format(&v).is_err());
    }

    #[test]
    fn test_try_with_pattern_rejects_unusable_patterns() {
        for pattern in ["%Q", "%Y-%m-%d %H"] {
            let err = DateConverter::try_with_pattern(pattern).unwrap_err();
            assert!(matches!(err, FixcolError::InvalidPattern { .. }), "{pattern}");
        }
        let c = DateConverter::try_with_pattern("%d.%m.%Y").unwrap();
        assert_eq!(c.pattern(), "%d.%m.%Y");
    }

    #[test]
    fn test_uuid_canonical() {
        let c = UuidConverter;
        let text = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let v = c.parse(text).unwrap();
        assert_eq!(c.format(&v).unwrap(), text);
        assert!(c.parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_enum_case_insensitive() {
        let c = EnumConverter::new("Color", ["Red", "Green"]);
        for text in ["red", "RED", "Red"] {
            assert_eq!(c.parse(text).unwrap(), Value::Enum("Red".to_string()));
        }
        assert_eq!(c.format(&Value::Enum("green".to_string())).unwrap(), "Green");
        assert_eq!(c.handled_type(), TypeKey::Enum("Color".to_string()));
    }

    #[test]
    fn test_list_split_and_join() {
        let c = DelimitedListConverter::with_delimiter("|");
        assert_eq!(
            c.parse("a|b|c").unwrap(),
            Value::List(vec!["a".into(), "b".into(), "c".into()])
        );
        assert_eq!(c.parse("").unwrap(), Value::List(vec![]));
        assert_eq!(c.empty_value(), Value::List(vec![]));
        assert_eq!(c.format(&Value::List(vec!["x".into(), "y".into()])).unwrap(), "x|y");
    }

    #[test]
    fn test_text_formats_scalars() {
        let c = TextConverter;
        assert_eq!(c.format(&Value::Integer(5)).unwrap(), "5");
        assert_eq!(c.parse("").unwrap(), Value::Text(String::new()));
    }

    #[test]
    fn test_nested_converter_recurses() {
        let inner = RecordSchema::builder("Address")
            .column(ColumnSpec::new("zip", TypeKey::Integer).position(0).length(5))
            .column(ColumnSpec::new("city", TypeKey::Text).position(5).length(6))
            .build()
            .unwrap();
        let c = NestedConverter::new(inner, Arc::new(ConverterRegistry::new()));
        let v = c.parse("12345Berlin").unwrap();
        let Value::Record(record) = &v else {
            panic!("expected nested record");
        };
        assert_eq!(record.get("zip"), Some(&Value::Integer(12345)));
        assert_eq!(c.format(&v).unwrap(), "12345Berlin");
        assert_eq!(c.handled_type(), TypeKey::Nested("Address".to_string()));
    }
}
