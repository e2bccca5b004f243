//! Decoding lines into records and encoding records into lines.
//!
//! [`RecordCodec`] binds a [`RecordSchema`] to a [`ConverterRegistry`],
//! resolving every column's converter once up front.
//!
//! Decoding a line shorter than the schema is not an error: missing columns
//! extract as empty text and follow the empty-value convention. Encoding
//! left-justifies each value into exactly its column width, truncating or
//! space-padding as needed; gaps between columns are space-filled.
//!
//! # Examples
//!
//! ```
//! use fixcol::{ColumnSpec, ConverterRegistry, RecordCodec, RecordSchema, TypeKey, Value};
//! use std::sync::Arc;
//!
//! let schema = RecordSchema::builder("Item")
//!     .column(ColumnSpec::new("sku", TypeKey::Text).position(0).length(6))
//!     .column(ColumnSpec::new("qty", TypeKey::Integer).position(6).length(4))
//!     .build()?;
//! let codec = RecordCodec::new(schema, Arc::new(ConverterRegistry::new()));
//!
//! let record = codec.decode("AB-001  12")?;
//! assert_eq!(record.get("qty"), Some(&Value::Integer(12)));
//! assert_eq!(codec.encode(&record)?, "AB-00112  ");
//! # Ok::<(), fixcol::FixcolError>(())
//! ```

use crate::converter::Converter;
use crate::error::{FixcolError, Result};
use crate::lines::{join_lines, split_lines};
use crate::record::Record;
use crate::registry::ConverterRegistry;
use crate::schema::{ColumnSpec, RecordSchema};
use std::sync::Arc;

/// Schema-bound line codec.
#[derive(Debug, Clone)]
pub struct RecordCodec {
    schema: Arc<RecordSchema>,
    converters: Vec<Arc<dyn Converter>>,
}

impl RecordCodec {
    /// Bind a schema to a registry. Column overrides win over registry lookup.
    #[must_use]
    pub fn new(schema: impl Into<Arc<RecordSchema>>, registry: Arc<ConverterRegistry>) -> Self {
        let schema = schema.into();
        let converters = schema
            .columns()
            .iter()
            .map(|column| {
                column
                    .converter_override()
                    .map_or_else(|| registry.resolve(column.type_key()), Arc::clone)
            })
            .collect();
        RecordCodec { schema, converters }
    }

    /// The bound schema
    #[must_use]
    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Shared handle to the bound schema
    #[must_use]
    pub fn shared_schema(&self) -> Arc<RecordSchema> {
        Arc::clone(&self.schema)
    }

    fn columns(&self) -> impl Iterator<Item = (&ColumnSpec, &Arc<dyn Converter>)> {
        self.schema.columns().iter().zip(self.converters.iter())
    }

    /// Decode one line.
    ///
    /// # Errors
    ///
    /// Returns [`FixcolError::Mapping`] carrying the line when any column
    /// fails to parse. No partial record is returned.
    pub fn decode(&self, line: &str) -> Result<Record> {
        let ascii = line.is_ascii();
        let mut record = Record::new();

        for (column, converter) in self.columns() {
            let mut text = extract(line, ascii, column.start(), column.width());
            if column.trims() {
                text = text.trim();
            }
            if text.is_empty() && !column.default_text().is_empty() {
                text = column.default_text();
            }

            let value = if text.is_empty() {
                converter.empty_value()
            } else {
                converter
                    .parse(text)
                    .map_err(|e| FixcolError::mapping(line, e.for_field(column.name())))?
            };
            record.set(column.name(), value);
        }

        Ok(record)
    }

    /// Encode one record.
    ///
    /// Fields missing from the record encode like nulls: as spaces.
    ///
    /// # Errors
    ///
    /// Returns [`FixcolError::Mapping`] carrying the rendered record when any
    /// field fails to format.
    pub fn encode(&self, record: &Record) -> Result<String> {
        let mut line = String::with_capacity(self.schema.total_length());
        let mut written = 0;

        for (column, converter) in self.columns() {
            if written < column.start() {
                pad(&mut line, column.start() - written);
                written = column.start();
            }

            let value = &record[column.name()];
            let text = if value.is_null() {
                String::new()
            } else {
                converter.format(value).map_err(|e| {
                    FixcolError::mapping(format!("{record:?}"), e.for_field(column.name()))
                })?
            };

            push_fixed(&mut line, &text, column.width());
            written += column.width();
        }

        Ok(line)
    }

    /// Decode lines in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first line's [`FixcolError::Mapping`] failure.
    pub fn decode_all<S: AsRef<str>>(&self, lines: &[S]) -> Result<Vec<Record>> {
        lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                self.decode(line.as_ref()).map_err(|e| {
                    log::warn!("Decoding {} failed at line {}", self.schema.name(), index + 1);
                    e
                })
            })
            .collect()
    }

    /// Encode records in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first record's [`FixcolError::Mapping`] failure.
    pub fn encode_all(&self, records: &[Record]) -> Result<Vec<String>> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                self.encode(record).map_err(|e| {
                    log::warn!("Encoding {} failed at record {}", self.schema.name(), index + 1);
                    e
                })
            })
            .collect()
    }

    /// Decode every line independently, one result per line.
    ///
    /// Unlike [`decode_all`](Self::decode_all) this never short-circuits, so
    /// callers can report every bad line at once.
    pub fn decode_each<S: AsRef<str>>(&self, lines: &[S]) -> Vec<Result<Record>> {
        lines.iter().map(|line| self.decode(line.as_ref())).collect()
    }

    /// Split text on universal newlines and decode every line.
    ///
    /// # Errors
    ///
    /// Returns the first line failure.
    pub fn decode_text(&self, text: &str) -> Result<Vec<Record>> {
        self.decode_all(&split_lines(text))
    }

    /// Encode records and join them with the schema's line separator.
    ///
    /// # Errors
    ///
    /// Returns the first record failure.
    pub fn encode_text(&self, records: &[Record]) -> Result<String> {
        let lines = self.encode_all(records)?;
        Ok(join_lines(&lines, self.schema.line_separator()))
    }
}

/// Character range `[position, position + length)` of `line`, clipped to its end.
fn extract(line: &str, ascii: bool, position: usize, length: usize) -> &str {
    if ascii {
        if position >= line.len() {
            return "";
        }
        let end = (position + length).min(line.len());
        return &line[position..end];
    }

    let mut offsets = line
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(line.len()));
    let Some(start) = offsets.nth(position) else {
        return "";
    };
    let end = offsets.nth(length - 1).unwrap_or(line.len());
    &line[start..end]
}

fn pad(line: &mut String, count: usize) {
    line.extend(std::iter::repeat(' ').take(count));
}

/// Left-justify `text` into exactly `width` characters.
fn push_fixed(line: &mut String, text: &str, width: usize) {
    let mut used = 0;
    for ch in text.chars().take(width) {
        line.push(ch);
        used += 1;
    }
    pad(line, width - used);
}
