//! Typed records.
//!
//! [`LineEntity`] connects a plain Rust struct to a [`RecordSchema`] without
//! runtime reflection: the [`line_entity!`](crate::line_entity) macro
//! generates the schema and the conversions from column annotations, and
//! [`FieldValue`] converts each field type to and from a [`Value`].
//!
//! Non-`Option` fields receive `Default::default()` when their column is
//! empty; declare a field as `Option<T>` to observe absence.

use crate::codec::RecordCodec;
use crate::converter::Converter;
use crate::error::{FixcolError, Result};
use crate::record::Record;
use crate::registry::ConverterRegistry;
use crate::schema::RecordSchema;
use crate::value::{TypeKey, Value};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// A Rust type that can be stored in one column.
pub trait FieldValue: Sized {
    /// Semantic type used for registry lookup.
    fn type_key() -> TypeKey;

    /// Converter bound to the type itself, overriding registry lookup.
    fn converter() -> Option<Arc<dyn Converter>> {
        None
    }

    /// Convert the field into a value.
    fn to_value(&self) -> Value;

    /// Convert a decoded value into the field.
    ///
    /// # Errors
    ///
    /// Returns [`FixcolError::TypeMismatch`] when the value has another kind.
    fn from_value(field: &str, value: Value) -> Result<Self>;
}

/// Build a [`FixcolError::TypeMismatch`] for a field.
pub fn type_mismatch(field: &str, expected: &str, found: &Value) -> FixcolError {
    FixcolError::TypeMismatch {
        field: field.to_string(),
        expected: expected.to_string(),
        found: found.kind().to_string(),
    }
}

macro_rules! scalar_field_value {
    ($ty:ty, $key:expr, $variant:ident) => {
        impl FieldValue for $ty {
            fn type_key() -> TypeKey {
                $key
            }

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }

            fn from_value(field: &str, value: Value) -> Result<Self> {
                match value {
                    Value::Null => Ok(<$ty>::default()),
                    Value::$variant(v) => Ok(v),
                    other => Err(type_mismatch(field, stringify!($variant), &other)),
                }
            }
        }
    };
}

scalar_field_value!(i64, TypeKey::Long, Integer);
scalar_field_value!(bool, TypeKey::Boolean, Boolean);
scalar_field_value!(BigDecimal, TypeKey::Decimal, Decimal);
scalar_field_value!(NaiveDate, TypeKey::Date, Date);
scalar_field_value!(Uuid, TypeKey::Uuid, Uuid);
scalar_field_value!(Vec<String>, TypeKey::List, List);

impl FieldValue for String {
    fn type_key() -> TypeKey {
        TypeKey::Text
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Text(s) | Value::Enum(s) => Ok(s),
            other => Err(type_mismatch(field, "text", &other)),
        }
    }
}

impl FieldValue for i32 {
    fn type_key() -> TypeKey {
        TypeKey::Integer
    }

    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(0),
            Value::Integer(i) => i32::try_from(i).map_err(|_| FixcolError::TypeMismatch {
                field: field.to_string(),
                expected: "32-bit integer".to_string(),
                found: i.to_string(),
            }),
            other => Err(type_mismatch(field, "integer", &other)),
        }
    }
}

impl FieldValue for f64 {
    fn type_key() -> TypeKey {
        TypeKey::Double
    }

    fn to_value(&self) -> Value {
        Value::Double(*self)
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(0.0),
            Value::Double(d) => Ok(d),
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(i) => Ok(i as f64),
            other => Err(type_mismatch(field, "double", &other)),
        }
    }
}

/// Nested records; pair the column with a
/// [`NestedConverter`](crate::converter::NestedConverter).
impl FieldValue for Record {
    fn type_key() -> TypeKey {
        TypeKey::Nested("record".to_string())
    }

    fn to_value(&self) -> Value {
        Value::Record(self.clone())
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Record::new()),
            Value::Record(r) => Ok(r),
            other => Err(type_mismatch(field, "record", &other)),
        }
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn type_key() -> TypeKey {
        T::type_key()
    }

    fn converter() -> Option<Arc<dyn Converter>> {
        T::converter()
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, FieldValue::to_value)
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(field, value).map(Some)
        }
    }
}

/// A struct mapped to one fixed-width line.
///
/// Usually implemented with [`line_entity!`](crate::line_entity).
pub trait LineEntity: Sized {
    /// The record schema for this type.
    ///
    /// # Errors
    ///
    /// Returns [`FixcolError::InvalidSchema`] when the declared columns are
    /// inconsistent.
    fn schema() -> Result<RecordSchema>;

    /// Build the entity from a decoded record.
    ///
    /// # Errors
    ///
    /// Returns an error when a field is missing or has the wrong kind.
    fn from_record(record: Record) -> Result<Self>;

    /// Convert the entity into a record for encoding.
    fn to_record(&self) -> Record;
}

/// Typed line mapper for one [`LineEntity`] type.
#[derive(Debug, Clone)]
pub struct EntityMapper<T> {
    codec: RecordCodec,
    _entity: PhantomData<fn() -> T>,
}

impl<T: LineEntity> EntityMapper<T> {
    /// Create a mapper using the built-in converters.
    ///
    /// # Errors
    ///
    /// Returns an error when the entity's schema is invalid.
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(ConverterRegistry::new()))
    }

    /// Create a mapper resolving converters from `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error when the entity's schema is invalid.
    pub fn with_registry(registry: Arc<ConverterRegistry>) -> Result<Self> {
        Ok(EntityMapper {
            codec: RecordCodec::new(T::schema()?, registry),
            _entity: PhantomData,
        })
    }

    /// The underlying codec
    #[must_use]
    pub fn codec(&self) -> &RecordCodec {
        &self.codec
    }

    /// Decode one line into an entity.
    ///
    /// # Errors
    ///
    /// Returns a mapping error for malformed lines.
    pub fn to_object(&self, line: &str) -> Result<T> {
        T::from_record(self.codec.decode(line)?)
    }

    /// Encode one entity into a line.
    ///
    /// # Errors
    ///
    /// Returns a mapping error when a field cannot be formatted.
    pub fn to_line(&self, entity: &T) -> Result<String> {
        self.codec.encode(&entity.to_record())
    }

    /// Decode lines in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first failure.
    pub fn to_objects<S: AsRef<str>>(&self, lines: &[S]) -> Result<Vec<T>> {
        lines.iter().map(|line| self.to_object(line.as_ref())).collect()
    }

    /// Encode entities in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first failure.
    pub fn to_lines(&self, entities: &[T]) -> Result<Vec<String>> {
        entities.iter().map(|entity| self.to_line(entity)).collect()
    }
}
