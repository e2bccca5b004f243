//! Macros for declaring typed line entities.
//!
//! [`line_entity!`](crate::line_entity) declares a struct together with its
//! column layout and implements [`LineEntity`](crate::LineEntity) for it.
//! [`line_enum!`](crate::line_enum) declares a fieldless enum usable as a
//! column type.

/// Declare a struct mapped to one fixed-width line.
///
/// Every field carries a `#[column(...)]` attribute whose keys are
/// [`ColumnSpec`](crate::ColumnSpec) builder methods (`position`, `length`,
/// `trim`, `default_value`, `converter`). The column name is the field
/// name and its type key comes from the field's
/// [`FieldValue`](crate::FieldValue) implementation. An optional
/// `[separator = "..."]` after the struct name sets the whole-file line
/// separator.
///
/// # Example
///
/// ```
/// use fixcol::{line_entity, EntityMapper};
///
/// line_entity! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Payment [separator = "\r\n"] {
///         #[column(position = 0, length = 8)]
///         pub account: String,
///         #[column(position = 8, length = 6)]
///         pub cents: i64,
///         #[column(position = 14, length = 3, default_value = "EUR")]
///         pub currency: Option<String>,
///     }
/// }
///
/// let mapper = EntityMapper::<Payment>::new()?;
/// let payment = mapper.to_object("ACC-0001000250")?;
/// assert_eq!(payment.cents, 250);
/// assert_eq!(payment.currency.as_deref(), Some("EUR"));
/// assert_eq!(mapper.to_line(&payment)?, "ACC-0001250   EUR");
/// # Ok::<(), fixcol::FixcolError>(())
/// ```
#[macro_export]
macro_rules! line_entity {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $([separator = $sep:expr])? {
            $(
                $(#[doc = $doc:expr])*
                #[column($($key:ident = $val:expr),* $(,)?)]
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[doc = $doc])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::LineEntity for $name {
            fn schema() -> $crate::Result<$crate::RecordSchema> {
                $crate::RecordSchema::builder(stringify!($name))
                    $(.line_separator($sep))?
                    $(
                        .column({
                            let column = $crate::ColumnSpec::new(
                                stringify!($field),
                                <$fty as $crate::FieldValue>::type_key(),
                            );
                            let column = match <$fty as $crate::FieldValue>::converter() {
                                Some(converter) => column.converter(converter),
                                None => column,
                            };
                            column $(.$key($val))*
                        })
                    )*
                    .build()
            }

            #[allow(unused_mut, unused_variables)]
            fn from_record(mut record: $crate::Record) -> $crate::Result<Self> {
                Ok($name {
                    $(
                        $field: {
                            let value = record.take(stringify!($field)).ok_or_else(|| {
                                $crate::FixcolError::MissingField {
                                    entity: stringify!($name).to_string(),
                                    field: stringify!($field).to_string(),
                                }
                            })?;
                            <$fty as $crate::FieldValue>::from_value(stringify!($field), value)?
                        },
                    )*
                })
            }

            fn to_record(&self) -> $crate::Record {
                $crate::Record::builder()
                    $(.field(stringify!($field), $crate::FieldValue::to_value(&self.$field)))*
                    .build()
            }
        }
    };
}

/// Declare a fieldless enum usable as a column type.
///
/// The enum derives `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq` and `Hash`.
/// Column text matches member names case-insensitively and always encodes
/// as the declared name. An empty column is an error for a plain enum
/// field; declare the field as `Option<_>` to allow it.
///
/// # Example
///
/// ```
/// use fixcol::line_enum;
///
/// line_enum! {
///     pub enum Status { Active, Closed }
/// }
///
/// assert_eq!(Status::from_name("closed"), Some(Status::Closed));
/// assert_eq!(Status::Active.name(), "Active");
/// assert_eq!(Status::MEMBERS, &["Active", "Closed"]);
/// ```
#[macro_export]
macro_rules! line_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[doc = $doc:expr])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[doc = $doc])*
                $variant,
            )*
        }

        impl $name {
            /// Declared member names, in declaration order.
            pub const MEMBERS: &'static [&'static str] = &[$(stringify!($variant)),*];

            /// Declared name of this member.
            #[must_use]
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant),)*
                }
            }

            /// Member whose name matches `name`, ignoring ASCII case.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                $(
                    if name.eq_ignore_ascii_case(stringify!($variant)) {
                        return Some($name::$variant);
                    }
                )*
                None
            }

            /// Converter for columns of this enum.
            #[must_use]
            pub fn enum_converter() -> $crate::converter::EnumConverter {
                $crate::converter::EnumConverter::new(
                    stringify!($name),
                    Self::MEMBERS.iter().copied(),
                )
            }
        }

        impl $crate::FieldValue for $name {
            fn type_key() -> $crate::TypeKey {
                $crate::TypeKey::Enum(stringify!($name).to_string())
            }

            fn converter() -> Option<::std::sync::Arc<dyn $crate::Converter>> {
                Some(::std::sync::Arc::new(Self::enum_converter()))
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Enum(self.name().to_string())
            }

            fn from_value(field: &str, value: $crate::Value) -> $crate::Result<Self> {
                match value {
                    $crate::Value::Enum(text) | $crate::Value::Text(text) => {
                        Self::from_name(&text).ok_or_else(|| $crate::FixcolError::TypeMismatch {
                            field: field.to_string(),
                            expected: stringify!($name).to_string(),
                            found: text,
                        })
                    },
                    other => Err($crate::entity::type_mismatch(field, stringify!($name), &other)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{EntityMapper, FieldValue, FixcolError, LineEntity, Record, TypeKey, Value};

    line_enum! {
        enum Level { Low, High }
    }

    line_entity! {
        #[derive(Debug, PartialEq)]
        struct Reading {
            #[column(position = 0, length = 5)]
            sensor: String,
            #[column(position = 5, length = 4)]
            level: Level,
            #[column(position = 9, length = 3)]
            count: Option<i32>,
        }
    }

    #[test]
    fn test_line_entity_schema() {
        let schema = Reading::schema().unwrap();
        assert_eq!(schema.name(), "Reading");
        assert_eq!(schema.columns().len(), 3);
        assert_eq!(schema.column("count").unwrap().type_key(), &TypeKey::Integer);
        assert!(schema.column("level").unwrap().converter_override().is_some());
        assert_eq!(schema.total_length(), 12);
    }

    #[test]
    fn test_line_entity_roundtrip() {
        let mapper = EntityMapper::<Reading>::new().unwrap();
        let reading = mapper.to_object("T-100high").unwrap();
        assert_eq!(
            reading,
            Reading {
                sensor: "T-100".to_string(),
                level: Level::High,
                count: None,
            }
        );
        assert_eq!(mapper.to_line(&reading).unwrap(), "T-100High   ");
    }

    #[test]
    fn test_missing_field_reported() {
        let record = Record::builder().field("sensor", "X").build();
        let err = Reading::from_record(record).unwrap_err();
        assert!(matches!(err, FixcolError::MissingField { ref field, .. } if field == "level"));
    }

    #[test]
    fn test_enum_null_is_mismatch() {
        assert!(Level::from_value("level", Value::Null).is_err());
        assert_eq!(Level::from_value("level", Value::Text("LOW".into())).unwrap(), Level::Low);
    }
}
