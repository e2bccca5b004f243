//! Column and record schemas.
//!
//! A [`RecordSchema`] is the ordered list of [`ColumnSpec`]s describing one
//! record type. Each column covers the half-open character range
//! `[position, position + length)` of a line. Columns are always kept in
//! ascending position order regardless of declaration order; overlapping or
//! gapped columns are permitted.
//!
//! Schemas are built once and reused for many decode/encode calls.
//!
//! # Examples
//!
//! ```
//! use fixcol::{ColumnSpec, RecordSchema, TypeKey};
//!
//! let schema = RecordSchema::builder("Customer")
//!     .column(ColumnSpec::new("name", TypeKey::Text).position(5).length(20))
//!     .column(ColumnSpec::new("id", TypeKey::Integer).position(0).length(5))
//!     .build()?;
//!
//! let names: Vec<&str> = schema.columns().iter().map(|c| c.name()).collect();
//! assert_eq!(names, vec!["id", "name"]);
//! assert_eq!(schema.total_length(), 25);
//! # Ok::<(), fixcol::FixcolError>(())
//! ```

use crate::converter::Converter;
use crate::error::{FixcolError, Result};
use crate::value::TypeKey;
use std::collections::HashSet;
use std::sync::Arc;

/// Default separator between lines of a whole file.
pub const DEFAULT_LINE_SEPARATOR: &str = "\n";

/// One fixed-width column.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    name: String,
    type_key: TypeKey,
    position: usize,
    length: usize,
    trim: bool,
    default_value: String,
    converter: Option<Arc<dyn Converter>>,
}

impl ColumnSpec {
    /// Create a column of the given semantic type.
    ///
    /// Position defaults to 0, length to 0 (must be set), trimming is on and
    /// there is no default value.
    pub fn new(name: impl Into<String>, type_key: TypeKey) -> Self {
        ColumnSpec {
            name: name.into(),
            type_key,
            position: 0,
            length: 0,
            trim: true,
            default_value: String::new(),
            converter: None,
        }
    }

    /// Set the zero-based starting character position.
    #[must_use]
    pub fn position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    /// Set the column width in characters.
    #[must_use]
    pub fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Whether surrounding whitespace is stripped before conversion.
    #[must_use]
    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Text substituted when the extracted value is empty.
    #[must_use]
    pub fn default_value(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = default_value.into();
        self
    }

    /// Use this converter instead of resolving one from the registry.
    #[must_use]
    pub fn converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Column name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Semantic type
    #[must_use]
    pub fn type_key(&self) -> &TypeKey {
        &self.type_key
    }

    /// Zero-based start position
    #[must_use]
    pub fn start(&self) -> usize {
        self.position
    }

    /// Width in characters
    #[must_use]
    pub fn width(&self) -> usize {
        self.length
    }

    /// Exclusive end position
    #[must_use]
    pub fn end(&self) -> usize {
        self.position + self.length
    }

    /// Whether values are trimmed
    #[must_use]
    pub fn trims(&self) -> bool {
        self.trim
    }

    /// Default value text (empty when none)
    #[must_use]
    pub fn default_text(&self) -> &str {
        &self.default_value
    }

    /// Explicit converter override, if any
    #[must_use]
    pub fn converter_override(&self) -> Option<&Arc<dyn Converter>> {
        self.converter.as_ref()
    }
}

/// Immutable, position-ordered description of one record type.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    name: String,
    columns: Vec<ColumnSpec>,
    line_separator: String,
}

impl RecordSchema {
    /// Start building a schema.
    pub fn builder(name: impl Into<String>) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            name: name.into(),
            columns: Vec::new(),
            line_separator: DEFAULT_LINE_SEPARATOR.to_string(),
        }
    }

    /// Schema (record type) name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in ascending position order
    #[must_use]
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Look up a column by name
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Separator used when joining or splitting whole files
    #[must_use]
    pub fn line_separator(&self) -> &str {
        &self.line_separator
    }

    /// Width of a fully padded line: the furthest column end.
    #[must_use]
    pub fn total_length(&self) -> usize {
        self.columns.iter().map(ColumnSpec::end).max().unwrap_or(0)
    }
}

/// Builder for [`RecordSchema`]
#[derive(Debug)]
pub struct RecordSchemaBuilder {
    name: String,
    columns: Vec<ColumnSpec>,
    line_separator: String,
}

impl RecordSchemaBuilder {
    /// Add a column
    #[must_use]
    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    /// Set the whole-file line separator
    #[must_use]
    pub fn line_separator(mut self, separator: impl Into<String>) -> Self {
        self.line_separator = separator.into();
        self
    }

    /// Validate and build the schema.
    ///
    /// # Errors
    ///
    /// Returns [`FixcolError::InvalidSchema`] when a column has zero length
    /// or an end position that overflows, when a column name is repeated, or
    /// when the line separator is empty.
    pub fn build(mut self) -> Result<RecordSchema> {
        let invalid = |reason: String| FixcolError::InvalidSchema {
            schema: self.name.clone(),
            reason,
        };

        if self.line_separator.is_empty() {
            return Err(invalid("line separator must not be empty".to_string()));
        }

        {
            let mut seen = HashSet::new();
            for column in &self.columns {
                if column.length == 0 {
                    return Err(invalid(format!(
                        "column '{}' must have a length greater than 0",
                        column.name
                    )));
                }
                if column.position.checked_add(column.length).is_none() {
                    return Err(invalid(format!(
                        "column '{}' ends beyond the largest representable position",
                        column.name
                    )));
                }
                if !seen.insert(column.name.as_str()) {
                    return Err(invalid(format!("duplicate column '{}'", column.name)));
                }
            }
        }

        // Stable: columns sharing a position keep declaration order
        self.columns.sort_by_key(|c| c.position);

        Ok(RecordSchema {
            name: self.name,
            columns: self.columns,
            line_separator: self.line_separator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_sorted_by_position() {
        let schema = RecordSchema::builder("Row")
            .column(ColumnSpec::new("c", TypeKey::Text).position(10).length(2))
            .column(ColumnSpec::new("a", TypeKey::Text).position(0).length(4))
            .column(ColumnSpec::new("b", TypeKey::Text).position(4).length(6))
            .build()
            .unwrap();
        let positions: Vec<usize> = schema.columns().iter().map(ColumnSpec::start).collect();
        assert_eq!(positions, vec![0, 4, 10]);
        assert_eq!(schema.total_length(), 12);
        assert_eq!(schema.line_separator(), "\n");
    }

    #[test]
    fn test_zero_length_rejected() {
        let err = RecordSchema::builder("Row")
            .column(ColumnSpec::new("a", TypeKey::Text).position(0))
            .build()
            .unwrap_err();
        assert!(matches!(err, FixcolError::InvalidSchema { .. }));
    }

    #[test]
    fn test_overflowing_column_end_rejected() {
        let err = RecordSchema::builder("Row")
            .column(ColumnSpec::new("far", TypeKey::Text).position(usize::MAX).length(2))
            .build()
            .unwrap_err();
        assert!(matches!(err, FixcolError::InvalidSchema { .. }));
        assert!(err.to_string().contains("'far'"));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = RecordSchema::builder("Row")
            .column(ColumnSpec::new("a", TypeKey::Text).position(0).length(1))
            .column(ColumnSpec::new("a", TypeKey::Text).position(1).length(1))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate column 'a'"));
    }

    #[test]
    fn test_empty_schema_has_zero_width() {
        let schema = RecordSchema::builder("Empty").build().unwrap();
        assert_eq!(schema.total_length(), 0);
        assert!(schema.column("x").is_none());
    }
}
