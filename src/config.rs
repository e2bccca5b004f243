//! Codec configuration and declarative schema definitions.
//!
//! [`CodecConfig`] carries the converter settings that vary between
//! deployments. [`RecordSchemaDef`] and [`LayoutDef`] describe schemas and
//! layouts as JSON documents and build them into [`RecordSchema`] and
//! [`Layout`] values.
//!
//! # Example
//!
//! ```
//! use fixcol::config::{CodecConfig, LayoutDef};
//!
//! let def = LayoutDef::from_json(r#"{
//!     "schemas": [
//!         {"name": "Header", "columns": [
//!             {"name": "tag", "position": 0, "length": 3},
//!             {"name": "date", "type": "date", "position": 3, "length": 8,
//!              "date_pattern": "%Y%m%d"}
//!         ]},
//!         {"name": "Detail", "columns": [
//!             {"name": "status", "type": {"enum": "Status"}, "position": 0, "length": 6,
//!              "members": ["Open", "Closed"]}
//!         ]}
//!     ],
//!     "segments": [
//!         {"id": "header", "kind": "single", "position": 1, "schema": "Header"},
//!         {"id": "details", "kind": "wildcard", "schema": "Detail"}
//!     ]
//! }"#)?;
//!
//! let mapper = def.build_mapper(&CodecConfig::default())?;
//! let result = mapper.map_text("HDR20240131\nopen\nCLOSED\n")?;
//! assert_eq!(result.list("details").len(), 2);
//! # Ok::<(), fixcol::FixcolError>(())
//! ```

use crate::converter::{
    DateConverter, DelimitedListConverter, EnumConverter, NestedConverter, DEFAULT_DATE_PATTERN,
    DEFAULT_LIST_DELIMITER,
};
use crate::error::{FixcolError, Result};
use crate::file_mapper::FileMapper;
use crate::layout::{Layout, Segment, SegmentKind};
use crate::registry::ConverterRegistry;
use crate::schema::{ColumnSpec, RecordSchema, DEFAULT_LINE_SEPARATOR};
use crate::value::TypeKey;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn default_date_pattern() -> String {
    DEFAULT_DATE_PATTERN.to_string()
}

fn default_list_delimiter() -> String {
    DEFAULT_LIST_DELIMITER.to_string()
}

fn default_line_separator() -> String {
    DEFAULT_LINE_SEPARATOR.to_string()
}

fn default_type() -> TypeKey {
    TypeKey::Text
}

fn default_trim() -> bool {
    true
}

/// Converter settings shared by every schema built from one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// chrono strftime pattern for date columns
    pub date_pattern: String,
    /// Delimiter for list columns
    pub list_delimiter: String,
    /// Separator used when a schema or layout does not name one
    pub line_separator: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            date_pattern: default_date_pattern(),
            list_delimiter: default_list_delimiter(),
            line_separator: default_line_separator(),
        }
    }
}

impl CodecConfig {
    /// Parse a configuration document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`FixcolError::Config`] for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Built-in converters honouring this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FixcolError::InvalidPattern`] when `date_pattern` cannot
    /// render a calendar date.
    pub fn registry(&self) -> Result<ConverterRegistry> {
        let mut registry =
            ConverterRegistry::new().with_list_delimiter(self.list_delimiter.clone());
        registry.register(DateConverter::try_with_pattern(self.date_pattern.clone())?);
        Ok(registry)
    }
}

/// Declarative definition of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Semantic type, text when omitted
    #[serde(rename = "type", default = "default_type")]
    pub type_key: TypeKey,
    /// Zero-based start position
    #[serde(default)]
    pub position: usize,
    /// Width in characters
    pub length: usize,
    /// Whether values are trimmed
    #[serde(default = "default_trim")]
    pub trim: bool,
    /// Text substituted for an empty column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Members of an inline enum column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
    /// Date pattern for this column only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_pattern: Option<String>,
    /// List delimiter for this column only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

impl ColumnDef {
    fn build(
        &self,
        schema: &str,
        registry: &Arc<ConverterRegistry>,
        known: &IndexMap<String, Arc<RecordSchema>>,
    ) -> Result<ColumnSpec> {
        let mut column = ColumnSpec::new(self.name.clone(), self.type_key.clone())
            .position(self.position)
            .length(self.length)
            .trim(self.trim);
        if let Some(default_value) = &self.default_value {
            column = column.default_value(default_value.clone());
        }

        let invalid = |reason: String| FixcolError::InvalidSchema {
            schema: schema.to_string(),
            reason,
        };

        match (&self.type_key, &self.members) {
            (TypeKey::Enum(name), Some(members)) => {
                column = column.converter(Arc::new(EnumConverter::new(name.clone(), members.clone())));
            },
            (_, Some(_)) => {
                return Err(invalid(format!("column '{}' lists members but is not an enum", self.name)));
            },
            (TypeKey::Nested(name), None) => {
                let nested = known.get(name).ok_or_else(|| {
                    invalid(format!("column '{}' refers to unknown schema '{name}'", self.name))
                })?;
                column = column.converter(Arc::new(NestedConverter::new(
                    Arc::clone(nested),
                    Arc::clone(registry),
                )));
            },
            _ => {},
        }

        if let Some(pattern) = &self.date_pattern {
            if self.type_key != TypeKey::Date {
                return Err(invalid(format!("column '{}' sets a date pattern but is not a date", self.name)));
            }
            column = column.converter(Arc::new(DateConverter::try_with_pattern(pattern.clone())?));
        }
        if let Some(delimiter) = &self.delimiter {
            if self.type_key != TypeKey::List {
                return Err(invalid(format!("column '{}' sets a delimiter but is not a list", self.name)));
            }
            column = column.converter(Arc::new(DelimitedListConverter::with_delimiter(delimiter.clone())));
        }

        Ok(column)
    }
}

/// Declarative definition of a record schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSchemaDef {
    /// Schema name
    pub name: String,
    /// Whole-file separator; the configuration's when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_separator: Option<String>,
    /// Column definitions, in any order
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}

impl RecordSchemaDef {
    /// Parse a schema definition.
    ///
    /// # Errors
    ///
    /// Returns [`FixcolError::Config`] for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the schema. Nested columns are not resolvable here; declare
    /// them inside a [`LayoutDef`].
    ///
    /// # Errors
    ///
    /// Returns [`FixcolError::InvalidSchema`] for inconsistent columns and
    /// [`FixcolError::InvalidPattern`] for unusable date patterns.
    pub fn build(&self, config: &CodecConfig) -> Result<RecordSchema> {
        self.build_in(config, &config.registry()?.into_shared(), &IndexMap::new())
    }

    fn build_in(
        &self,
        config: &CodecConfig,
        registry: &Arc<ConverterRegistry>,
        known: &IndexMap<String, Arc<RecordSchema>>,
    ) -> Result<RecordSchema> {
        let mut builder = RecordSchema::builder(self.name.clone()).line_separator(
            self.line_separator
                .clone()
                .unwrap_or_else(|| config.line_separator.clone()),
        );
        for column in &self.columns {
            builder = builder.column(column.build(&self.name, registry, known)?);
        }
        builder.build()
    }
}

/// Declarative definition of one layout segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentDef {
    /// Segment id
    pub id: String,
    /// Placement, tagged by `kind`
    #[serde(flatten)]
    pub kind: SegmentKind,
    /// Name of a schema declared in the same [`LayoutDef`]
    pub schema: String,
}

/// Declarative definition of a whole-file layout and its schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDef {
    /// Schemas, in dependency order (nested schemas first)
    #[serde(default)]
    pub schemas: Vec<RecordSchemaDef>,
    /// Segments, in file order
    pub segments: Vec<SegmentDef>,
    /// Whole-file separator; the configuration's when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_separator: Option<String>,
}

impl LayoutDef {
    /// Parse a layout definition.
    ///
    /// # Errors
    ///
    /// Returns [`FixcolError::Config`] for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the layout.
    ///
    /// # Errors
    ///
    /// Returns [`FixcolError::InvalidSchema`] for bad schemas or unknown
    /// schema references and [`FixcolError::Layout`] for bad segments.
    pub fn build_layout(&self, config: &CodecConfig) -> Result<Layout> {
        self.build_with(config, &config.registry()?.into_shared())
    }

    /// Build the layout and a mapper sharing the configured converters.
    ///
    /// # Errors
    ///
    /// See [`build_layout`](Self::build_layout).
    pub fn build_mapper(&self, config: &CodecConfig) -> Result<FileMapper> {
        let registry = config.registry()?.into_shared();
        let layout = self.build_with(config, &registry)?;
        Ok(FileMapper::with_registry(layout, registry))
    }

    fn build_with(&self, config: &CodecConfig, registry: &Arc<ConverterRegistry>) -> Result<Layout> {
        let mut schemas: IndexMap<String, Arc<RecordSchema>> = IndexMap::new();
        for def in &self.schemas {
            let schema = def.build_in(config, registry, &schemas)?;
            if schemas.insert(def.name.clone(), Arc::new(schema)).is_some() {
                return Err(FixcolError::InvalidSchema {
                    schema: def.name.clone(),
                    reason: "schema declared twice".to_string(),
                });
            }
        }

        let mut builder = Layout::builder().line_separator(
            self.line_separator
                .clone()
                .unwrap_or_else(|| config.line_separator.clone()),
        );
        for def in &self.segments {
            let schema = schemas.get(&def.schema).ok_or_else(|| FixcolError::InvalidSchema {
                schema: def.schema.clone(),
                reason: format!("segment '{}' refers to an undeclared schema", def.id),
            })?;
            builder = builder.segment(Segment::new(def.id.clone(), def.kind, Arc::clone(schema)));
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use chrono::NaiveDate;

    #[test]
    fn test_codec_config_defaults_and_overrides() {
        let config = CodecConfig::from_json(r#"{"list_delimiter": ";"}"#).unwrap();
        assert_eq!(config.date_pattern, "%Y-%m-%d");
        assert_eq!(config.list_delimiter, ";");
        assert_eq!(config.line_separator, "\n");

        let registry = config.registry().unwrap();
        assert_eq!(
            registry.resolve(&TypeKey::List).parse("a;b").unwrap(),
            Value::List(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_schema_def_builds_sorted_schema() {
        let def = RecordSchemaDef::from_json(
            r#"{"name": "Row", "columns": [
                {"name": "when", "type": "date", "position": 4, "length": 8, "date_pattern": "%d%m%Y"},
                {"name": "id", "type": "integer", "position": 0, "length": 4}
            ]}"#,
        )
        .unwrap();
        let schema = def.build(&CodecConfig::default()).unwrap();
        assert_eq!(schema.columns()[0].name(), "id");
        let date = schema.column("when").unwrap().converter_override().unwrap();
        assert_eq!(
            date.parse("31012024").unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
        );
    }

    #[test]
    fn test_members_on_non_enum_rejected() {
        let def = RecordSchemaDef::from_json(
            r#"{"name": "Row", "columns": [
                {"name": "c", "position": 0, "length": 1, "members": ["A"]}
            ]}"#,
        )
        .unwrap();
        assert!(matches!(
            def.build(&CodecConfig::default()),
            Err(FixcolError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn test_overrides_require_matching_type() {
        for column in [
            r#"{"name": "t", "type": "text", "length": 5, "date_pattern": "%Y"}"#,
            r#"{"name": "t", "type": "integer", "length": 5, "delimiter": ";"}"#,
        ] {
            let def =
                RecordSchemaDef::from_json(&format!(r#"{{"name": "Row", "columns": [{column}]}}"#))
                    .unwrap();
            let err = def.build(&CodecConfig::default()).unwrap_err();
            assert!(matches!(err, FixcolError::InvalidSchema { .. }), "{column}");
        }
    }

    #[test]
    fn test_unusable_date_patterns_rejected() {
        let config = CodecConfig::from_json(r#"{"date_pattern": "%Y-%m-%d %H"}"#).unwrap();
        assert!(matches!(config.registry(), Err(FixcolError::InvalidPattern { .. })));
        assert!(matches!(
            RecordSchemaDef::from_json(r#"{"name": "Row", "columns": []}"#)
                .unwrap()
                .build(&config),
            Err(FixcolError::InvalidPattern { .. })
        ));

        let def = RecordSchemaDef::from_json(
            r#"{"name": "Row", "columns": [{"name": "d", "type": "date", "length": 8, "date_pattern": "%Q"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            def.build(&CodecConfig::default()),
            Err(FixcolError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        assert!(matches!(LayoutDef::from_json("{"), Err(FixcolError::Config(_))));
    }

    #[test]
    fn test_unknown_schema_reference() {
        let def = LayoutDef::from_json(
            r#"{"segments": [{"id": "h", "kind": "single", "position": 1, "schema": "Nope"}]}"#,
        )
        .unwrap();
        let err = def.build_layout(&CodecConfig::default()).unwrap_err();
        assert!(err.to_string().contains("undeclared schema"));
    }

    #[test]
    fn test_nested_column_uses_earlier_schema() {
        let def = LayoutDef::from_json(
            r#"{
                "schemas": [
                    {"name": "Point", "columns": [
                        {"name": "x", "type": "integer", "position": 0, "length": 2},
                        {"name": "y", "type": "integer", "position": 2, "length": 2}
                    ]},
                    {"name": "Shape", "columns": [
                        {"name": "label", "position": 0, "length": 3},
                        {"name": "origin", "type": {"nested": "Point"}, "position": 3, "length": 4, "trim": false}
                    ]}
                ],
                "segments": [{"id": "shapes", "kind": "range", "start": 1, "end": -1, "schema": "Shape"}]
            }"#,
        )
        .unwrap();
        let mapper = def.build_mapper(&CodecConfig::default()).unwrap();
        let result = mapper.map_lines(&["SQR 1 2"]).unwrap();
        let origin = match &result.list("shapes")[0]["origin"] {
            Value::Record(r) => r.clone(),
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(origin["y"], Value::Integer(2));
    }
}
