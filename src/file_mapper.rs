//! Mapping whole files through a [`Layout`].
//!
//! [`FileMapper`] resolves the layout against the file's line count and
//! decodes every resolved range with its segment's schema. Single-line
//! segments yield one record, ranges and the wildcard yield a list (possibly
//! empty). Any resolution or decode failure aborts the whole mapping.
//!
//! # Examples
//!
//! ```
//! use fixcol::{ColumnSpec, FileMapper, Layout, RecordSchema, TypeKey};
//! use std::sync::Arc;
//!
//! let tag = Arc::new(
//!     RecordSchema::builder("Tag")
//!         .column(ColumnSpec::new("tag", TypeKey::Text).position(0).length(3))
//!         .build()?,
//! );
//! let layout = Layout::builder()
//!     .line("header", 1, Arc::clone(&tag))
//!     .wildcard("details", Arc::clone(&tag))
//!     .line("trailer", -1, tag)
//!     .build()?;
//!
//! let mapper = FileMapper::new(layout);
//! let result = mapper.map_text("HDR\nA01\nA02\nTRL\n")?;
//! assert_eq!(result.list("details").len(), 2);
//! assert_eq!(mapper.unmap_text(&result)?, "HDR\nA01\nA02\nTRL");
//! # Ok::<(), fixcol::FixcolError>(())
//! ```

use crate::codec::RecordCodec;
use crate::error::Result;
use crate::layout::Layout;
use crate::lines::{join_lines, split_lines};
use crate::registry::ConverterRegistry;
use crate::result::{MappingResult, SegmentOutput};
use indexmap::IndexMap;
use std::sync::Arc;

/// Decodes and encodes whole files according to a [`Layout`].
#[derive(Debug, Clone)]
pub struct FileMapper {
    layout: Layout,
    codecs: Vec<RecordCodec>,
}

impl FileMapper {
    /// Create a mapper using the built-in converters.
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self::with_registry(layout, Arc::new(ConverterRegistry::new()))
    }

    /// Create a mapper resolving converters from `registry`.
    #[must_use]
    pub fn with_registry(layout: Layout, registry: Arc<ConverterRegistry>) -> Self {
        let codecs = layout
            .segments()
            .iter()
            .map(|segment| RecordCodec::new(Arc::clone(segment.schema()), Arc::clone(&registry)))
            .collect();
        FileMapper { layout, codecs }
    }

    /// The layout this mapper applies
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Map the lines of one file.
    ///
    /// # Errors
    ///
    /// Returns [`FixcolError::Resolution`](crate::FixcolError::Resolution)
    /// when the layout does not fit the line count, or the first
    /// [`FixcolError::Mapping`](crate::FixcolError::Mapping) failure.
    pub fn map_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<MappingResult> {
        let ranges = self.layout.resolve(lines.len())?;
        let mut entries = IndexMap::with_capacity(ranges.len());

        for ((segment, codec), range) in self.layout.segments().iter().zip(&self.codecs).zip(ranges) {
            let output = if segment.is_list() {
                let slice = if range.is_empty() {
                    &lines[..0]
                } else {
                    &lines[range.start_line - 1..range.end_line]
                };
                SegmentOutput::List(codec.decode_all(slice)?)
            } else {
                SegmentOutput::Single(codec.decode(lines[range.start_line - 1].as_ref())?)
            };
            log::debug!(
                "Mapped segment '{}' from lines {}..={}",
                segment.id(),
                range.start_line,
                range.end_line
            );
            entries.insert(segment.id().to_string(), output);
        }

        Ok(MappingResult::new(entries))
    }

    /// Split text on universal newlines and map it.
    ///
    /// # Errors
    ///
    /// See [`map_lines`](Self::map_lines).
    pub fn map_text(&self, text: &str) -> Result<MappingResult> {
        self.map_lines(&split_lines(text))
    }

    /// Encode a mapping result back into lines, in declaration order.
    ///
    /// Single segments missing from `result` are skipped; list segments
    /// contribute one line per record.
    ///
    /// # Errors
    ///
    /// Returns the first encoding failure.
    pub fn unmap(&self, result: &MappingResult) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for (segment, codec) in self.layout.segments().iter().zip(&self.codecs) {
            if segment.is_list() {
                lines.extend(codec.encode_all(result.list(segment.id()))?);
            } else if let Some(record) = result.single(segment.id()) {
                lines.push(codec.encode(record)?);
            }
        }
        Ok(lines)
    }

    /// Encode a mapping result and join the lines with the layout separator.
    ///
    /// # Errors
    ///
    /// Returns the first encoding failure.
    pub fn unmap_text(&self, result: &MappingResult) -> Result<String> {
        Ok(join_lines(&self.unmap(result)?, self.layout.line_separator()))
    }
}
