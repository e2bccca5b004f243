//! Common test fixtures shared across the integration test suite.

#![allow(dead_code)]

use fixcol::{ColumnSpec, Layout, RecordSchema, TypeKey};
use std::sync::Arc;

/// Header line: `HDR` tag, file date (yyyyMMdd) and sender.
///
/// `HDR20240131ACME      `
pub fn header_schema() -> Arc<RecordSchema> {
    Arc::new(
        RecordSchema::builder("Header")
            .column(ColumnSpec::new("tag", TypeKey::Text).position(0).length(3))
            .column(
                ColumnSpec::new("created", TypeKey::Date)
                    .position(3)
                    .length(8)
                    .converter(Arc::new(fixcol::converter::DateConverter::with_pattern("%Y%m%d"))),
            )
            .column(ColumnSpec::new("sender", TypeKey::Text).position(11).length(10))
            .build()
            .expect("header schema"),
    )
}

/// Detail line: record type, account, amount in cents and currency.
///
/// `A ACC-0001     1250EUR`
pub fn detail_schema() -> Arc<RecordSchema> {
    Arc::new(
        RecordSchema::builder("Detail")
            .column(ColumnSpec::new("kind", TypeKey::Text).position(0).length(1))
            .column(ColumnSpec::new("account", TypeKey::Text).position(2).length(8))
            .column(ColumnSpec::new("amount", TypeKey::Long).position(10).length(9))
            .column(
                ColumnSpec::new("currency", TypeKey::Text)
                    .position(19)
                    .length(3)
                    .default_value("EUR"),
            )
            .build()
            .expect("detail schema"),
    )
}

/// Trailer line: `TRL` tag and record count.
pub fn trailer_schema() -> Arc<RecordSchema> {
    Arc::new(
        RecordSchema::builder("Trailer")
            .column(ColumnSpec::new("tag", TypeKey::Text).position(0).length(3))
            .column(ColumnSpec::new("count", TypeKey::Integer).position(3).length(6))
            .build()
            .expect("trailer schema"),
    )
}

/// Header on line 1, details as a wildcard, trailer on the last line.
pub fn statement_layout() -> Layout {
    Layout::builder()
        .line("header", 1, header_schema())
        .wildcard("details", detail_schema())
        .line("trailer", -1, trailer_schema())
        .build()
        .expect("statement layout")
}

/// A well-formed statement file with two detail lines.
pub fn statement_lines() -> Vec<String> {
    vec![
        "HDR20240131ACME      ".to_string(),
        "A ACC-0001     1250EUR".to_string(),
        "B ACC-0002      -75   ".to_string(),
        "TRL     2".to_string(),
    ]
}
