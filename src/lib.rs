#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! ## Modules
//!
//! - [`schema`] - Column and record schemas
//! - [`converter`] - Bidirectional text converters and the [`Converter`] trait
//! - [`registry`] - Converter lookup by semantic type
//! - [`codec`] - Line ↔ record decoding and encoding
//! - [`record`] / [`value`] - Dynamic decoded records
//! - [`entity`] / [`macros`] - Typed records via [`line_entity!`] and [`line_enum!`]
//! - [`layout`] - Whole-file segments and line resolution
//! - [`file_mapper`] / [`result`] - Mapping whole files through a layout
//! - [`config`] - Codec configuration and JSON schema definitions
//! - [`parallel`] - Rayon-backed batch decoding and encoding
//! - [`lines`] - Universal newline splitting
//! - [`error`] - Error types and result type

pub mod codec;
pub mod config;
pub mod converter;
pub mod entity;
pub mod error;
pub mod file_mapper;
pub mod layout;
pub mod lines;
pub mod macros;
pub mod parallel;
pub mod record;
pub mod registry;
pub mod result;
pub mod schema;
pub mod value;

pub use codec::RecordCodec;
pub use config::CodecConfig;
pub use converter::Converter;
pub use entity::{EntityMapper, FieldValue, LineEntity};
pub use error::{ConversionError, FixcolError, LayoutError, ResolutionError, Result};
pub use file_mapper::FileMapper;
pub use layout::{Layout, LayoutBuilder, ResolvedRange, Segment, SegmentKind};
pub use record::{Record, RecordBuilder};
pub use registry::ConverterRegistry;
pub use result::{MappingResult, SegmentOutput};
pub use schema::{ColumnSpec, RecordSchema};
pub use value::{TypeKey, Value};
