//! Error types for fixed-width mapping operations.
//!
//! Failures fall into four kinds so a caller can tell "my layout is wrong"
//! apart from "my data is wrong":
//!
//! - [`ConversionError`] - one field's text could not be parsed (or its value
//!   could not be formatted).
//! - [`FixcolError::Mapping`] - a whole line (or record) failed; wraps the
//!   conversion error together with the offending line.
//! - [`LayoutError`] - a layout is structurally invalid, independent of data.
//! - [`ResolutionError`] - a layout could not be resolved against a concrete
//!   line count.
//!
//! [`FixcolError`] is the crate-level error and [`Result`] the convenience alias.

use thiserror::Error;

/// A single field value could not be converted.
///
/// Converters do not know which column they serve, so they report an empty
/// `field`; the record codec fills it in with [`ConversionError::for_field`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot convert field '{field}' from {raw:?}: {cause}")]
pub struct ConversionError {
    /// Name of the column being converted.
    pub field: String,
    /// Raw text (on parse) or rendered value (on format) that failed.
    pub raw: String,
    /// Human-readable cause from the underlying parser.
    pub cause: String,
}

impl ConversionError {
    /// Create a conversion error for raw text with an unknown field name.
    pub fn new(raw: impl Into<String>, cause: impl ToString) -> Self {
        ConversionError {
            field: String::new(),
            raw: raw.into(),
            cause: cause.to_string(),
        }
    }

    /// Attach the column name this error belongs to.
    #[must_use]
    pub fn for_field(mut self, field: &str) -> Self {
        self.field = field.to_string();
        self
    }
}

/// Structural problems of a layout, detected when the layout is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A segment was declared with an empty or blank id.
    #[error("segment id must not be empty")]
    EmptySegmentId,

    /// Two segments share the same id.
    #[error("duplicate segment id '{0}'")]
    DuplicateSegmentId(String),

    /// More than one wildcard segment was declared.
    #[error("only one wildcard segment is supported per layout ('{first}' and '{second}')")]
    MultipleWildcards {
        /// Id of the first wildcard.
        first: String,
        /// Id of the rejected wildcard.
        second: String,
    },

    /// A line position of zero was declared; positions are 1-based or negative.
    #[error("segment '{0}' declares line position 0; positions are 1-based or negative")]
    ZeroPosition(String),
}

/// A layout could not be resolved against a specific file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The layout has no segments at all.
    #[error("layout must contain at least one segment")]
    EmptyLayout,

    /// A resolved position falls outside `[1, total_lines]`.
    #[error("segment '{segment}' position {position} is out of bounds for {total_lines} lines")]
    OutOfBounds {
        /// Segment id.
        segment: String,
        /// Declared (raw) position that failed to resolve.
        position: i64,
        /// Line count resolved against.
        total_lines: usize,
    },

    /// The resolved end line precedes the resolved start line.
    #[error("invalid range for segment '{segment}': end {end} before start {start}")]
    EndBeforeStart {
        /// Segment id.
        segment: String,
        /// Resolved start line.
        start: usize,
        /// Resolved end line.
        end: usize,
    },

    /// A segment starts at or before the end of the previous segment.
    #[error("layout segments overlap or are out of order near '{segment}' (starts at {start}, previous end {previous_end})")]
    Overlap {
        /// Segment id.
        segment: String,
        /// Resolved start line of the offending segment.
        start: usize,
        /// End line of everything resolved before it.
        previous_end: usize,
    },
}

/// Error type for all fixed-width mapping operations.
#[derive(Error, Debug)]
pub enum FixcolError {
    /// A field conversion failed outside of a whole-line operation.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Decoding or encoding an entire line failed.
    #[error("failed to map line {line:?}: {source}")]
    Mapping {
        /// The offending line (decode) or rendered record (encode).
        line: String,
        /// Underlying field failure.
        #[source]
        source: ConversionError,
    },

    /// A typed entity required a field the record does not carry.
    #[error("record '{entity}' is missing field '{field}'")]
    MissingField {
        /// Entity type name.
        entity: String,
        /// Missing field name.
        field: String,
    },

    /// A field value had a different type than the target field.
    #[error("field '{field}' expected {expected}, found {found}")]
    TypeMismatch {
        /// Field name.
        field: String,
        /// Expected value kind.
        expected: String,
        /// Actual value kind.
        found: String,
    },

    /// A record schema was declared inconsistently.
    #[error("invalid schema '{schema}': {reason}")]
    InvalidSchema {
        /// Schema name.
        schema: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A date pattern cannot parse and render calendar dates.
    #[error("invalid date pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The layout is structurally invalid.
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),

    /// The layout could not be resolved against the given lines.
    #[error("cannot resolve layout: {0}")]
    Resolution(#[from] ResolutionError),

    /// A declarative schema or configuration document could not be read.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl FixcolError {
    /// Wrap a field failure with the line it occurred on.
    pub(crate) fn mapping(line: impl Into<String>, source: ConversionError) -> Self {
        FixcolError::Mapping {
            line: line.into(),
            source,
        }
    }

    /// Returns true when the error is about the layout rather than the data.
    #[must_use]
    pub fn is_layout_error(&self) -> bool {
        matches!(self, FixcolError::Layout(_) | FixcolError::Resolution(_))
    }
}

/// Convenience type alias for [`std::result::Result`] with [`FixcolError`].
pub type Result<T> = std::result::Result<T, FixcolError>;
