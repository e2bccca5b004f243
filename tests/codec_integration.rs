//! Integration tests for single-line decoding and encoding

mod common;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use fixcol::converter::{Converter, DateConverter, EnumConverter};
use fixcol::parallel::decode_all_parallel;
use fixcol::{
    ColumnSpec, ConversionError, ConverterRegistry, FixcolError, Record, RecordCodec,
    RecordSchema, TypeKey, Value,
};
use proptest::prelude::*;
use std::str::FromStr;
use std::sync::Arc;

fn detail_codec() -> RecordCodec {
    RecordCodec::new(common::detail_schema(), Arc::new(ConverterRegistry::new()))
}

#[test]
fn test_decode_detail_line() {
    let record = detail_codec().decode("A ACC-0001     1250EUR").unwrap();
    assert_eq!(record["kind"], Value::Text("A".to_string()));
    assert_eq!(record["account"], Value::Text("ACC-0001".to_string()));
    assert_eq!(record["amount"], Value::Integer(1250));
    assert_eq!(record["currency"], Value::Text("EUR".to_string()));
    let names: Vec<&str> = record.names().collect();
    assert_eq!(names, vec!["kind", "account", "amount", "currency"]);
}

#[test]
fn test_default_value_fills_blank_column() {
    let record = detail_codec().decode("B ACC-0002      -75   ").unwrap();
    assert_eq!(record["amount"], Value::Integer(-75));
    assert_eq!(record["currency"], Value::Text("EUR".to_string()));
}

#[test]
fn test_encode_left_justifies_numbers() {
    let codec = detail_codec();
    let record = codec.decode("A ACC-0001     1250EUR").unwrap();
    assert_eq!(codec.encode(&record).unwrap(), "A ACC-00011250     EUR");
}

#[test]
fn test_header_date_with_custom_pattern() {
    let codec = RecordCodec::new(common::header_schema(), Arc::new(ConverterRegistry::new()));
    let record = codec.decode("HDR20240131ACME      ").unwrap();
    assert_eq!(
        record["created"],
        Value::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
    );
    assert_eq!(codec.encode(&record).unwrap(), "HDR20240131ACME      ");
}

#[test]
fn test_all_builtin_types() {
    let schema = RecordSchema::builder("Everything")
        .column(ColumnSpec::new("flag", TypeKey::Boolean).position(0).length(5))
        .column(ColumnSpec::new("ratio", TypeKey::Double).position(5).length(6))
        .column(ColumnSpec::new("price", TypeKey::Decimal).position(11).length(8))
        .column(ColumnSpec::new("id", TypeKey::Uuid).position(19).length(36))
        .column(ColumnSpec::new("tags", TypeKey::List).position(55).length(10))
        .build()
        .unwrap();
    let codec = RecordCodec::new(schema, Arc::new(ConverterRegistry::new()));

    let line = "TRUE 0.25  19.90   67e55044-10b1-426f-9247-bb680e5fe0c8red,blue  ";
    let record = codec.decode(line).unwrap();
    assert_eq!(record["flag"], Value::Boolean(true));
    assert_eq!(record["ratio"], Value::Double(0.25));
    assert_eq!(record["price"], Value::Decimal(BigDecimal::from_str("19.90").unwrap()));
    assert!(matches!(record["id"], Value::Uuid(_)));
    assert_eq!(record["tags"], Value::List(vec!["red".to_string(), "blue".to_string()]));

    let encoded = codec.encode(&record).unwrap();
    assert_eq!(encoded.chars().count(), 65);
    assert!(encoded.starts_with("true 0.25  19.90   67e55044-10b1-426f-9247-bb680e5fe0c8"));
}

#[test]
fn test_blank_line_decodes_to_empty_convention() {
    let schema = RecordSchema::builder("Blank")
        .column(ColumnSpec::new("n", TypeKey::Integer).position(0).length(3))
        .column(ColumnSpec::new("s", TypeKey::Text).position(3).length(3))
        .column(ColumnSpec::new("l", TypeKey::List).position(6).length(3))
        .build()
        .unwrap();
    let record = RecordCodec::new(schema, Arc::new(ConverterRegistry::new()))
        .decode("")
        .unwrap();
    assert!(record.is_null("n"));
    assert!(record.is_null("s"));
    assert_eq!(record["l"], Value::List(vec![]));
}

#[test]
fn test_registered_enum_converter_resolves_by_type() {
    let mut registry = ConverterRegistry::new();
    registry.register(EnumConverter::new("Kind", ["Credit", "Debit"]));
    let schema = RecordSchema::builder("Entry")
        .column(
            ColumnSpec::new("kind", TypeKey::Enum("Kind".to_string()))
                .position(0)
                .length(6),
        )
        .build()
        .unwrap();
    let codec = RecordCodec::new(schema, registry.into_shared());

    assert_eq!(codec.decode("DEBIT ").unwrap()["kind"], Value::Enum("Debit".to_string()));
    let err = codec.decode("REFUND").unwrap_err();
    assert!(matches!(err, FixcolError::Mapping { ref source, .. } if source.field == "kind"));
}

#[test]
fn test_custom_converter_override() {
    #[derive(Debug)]
    struct Cents;

    impl Converter for Cents {
        fn parse(&self, text: &str) -> Result<Value, ConversionError> {
            let cents: i64 = text.parse().map_err(|e| ConversionError::new(text, e))?;
            Ok(Value::Decimal(BigDecimal::new(cents.into(), 2)))
        }

        fn format(&self, value: &Value) -> Result<String, ConversionError> {
            match value {
                Value::Decimal(d) => Ok((d.clone() * BigDecimal::from(100)).with_scale(0).to_string()),
                other => Err(ConversionError::new(format!("{other:?}"), "expected decimal")),
            }
        }

        fn handled_type(&self) -> TypeKey {
            TypeKey::Custom("cents".to_string())
        }
    }

    let schema = RecordSchema::builder("Money")
        .column(
            ColumnSpec::new("amount", TypeKey::Decimal)
                .position(0)
                .length(6)
                .converter(Arc::new(Cents)),
        )
        .build()
        .unwrap();
    let codec = RecordCodec::new(schema, Arc::new(ConverterRegistry::new()));
    let record = codec.decode("1999").unwrap();
    assert_eq!(record["amount"], Value::Decimal(BigDecimal::from_str("19.99").unwrap()));
    assert_eq!(codec.encode(&record).unwrap(), "1999  ");
}

#[test]
fn test_encode_missing_fields_as_spaces() {
    let codec = detail_codec();
    let record = Record::builder().field("account", "X").build();
    assert_eq!(codec.encode(&record).unwrap(), "  X                   ");
}

#[test]
fn test_encode_wrong_kind_fails() {
    let codec = detail_codec();
    let record = Record::builder().field("amount", "lots").build();
    let err = codec.encode(&record).unwrap_err();
    match err {
        FixcolError::Mapping { source, .. } => assert_eq!(source.field, "amount"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_date_pattern_without_date_rendering_fails_encode() {
    let schema = RecordSchema::builder("Stamp")
        .column(
            ColumnSpec::new("at", TypeKey::Date)
                .position(0)
                .length(10)
                .converter(Arc::new(DateConverter::with_pattern("%Y%m%d%H"))),
        )
        .build()
        .unwrap();
    let codec = RecordCodec::new(schema, Arc::new(ConverterRegistry::new()));
    let record = codec.decode("2024013112").unwrap();
    let err = codec.encode(&record).unwrap_err();
    assert!(matches!(err, FixcolError::Mapping { ref source, .. } if source.field == "at"));
}

#[test]
fn test_parallel_decode_of_text() {
    let codec = detail_codec();
    let lines: Vec<String> = (0..300)
        .map(|i| format!("A ACC-{i:04}{i:>9}USD"))
        .collect();
    let records = decode_all_parallel(&codec, &lines).unwrap();
    assert_eq!(records.len(), 300);
    assert_eq!(records[299]["amount"], Value::Integer(299));
}

proptest! {
    #[test]
    fn prop_text_roundtrip_for_fitting_values(
        code in "[A-Z0-9]{1,4}",
        name in "[a-z]{1,10}",
    ) {
        let schema = RecordSchema::builder("Pair")
            .column(ColumnSpec::new("code", TypeKey::Text).position(0).length(4))
            .column(ColumnSpec::new("name", TypeKey::Text).position(6).length(10))
            .build()
            .unwrap();
        let codec = RecordCodec::new(schema, Arc::new(ConverterRegistry::new()));
        let record = Record::builder().field("code", code.as_str()).field("name", name.as_str()).build();

        let line = codec.encode(&record).unwrap();
        prop_assert_eq!(line.chars().count(), 16);
        prop_assert_eq!(codec.decode(&line).unwrap(), record);
    }

    #[test]
    fn prop_encoded_width_is_total_length(amount in any::<i32>(), account in "[ -~]{0,12}") {
        let codec = detail_codec();
        let record = Record::builder()
            .field("account", account.as_str())
            .field("amount", i64::from(amount))
            .build();
        prop_assert_eq!(codec.encode(&record).unwrap().chars().count(), 22);
    }
}
