//! Whole-file layouts and segment resolution.
//!
//! A [`Layout`] is the ordered list of named [`Segment`]s a file is made of:
//! single lines, fixed line ranges, and at most one wildcard section whose
//! extent is inferred from its neighbours. Positions are 1-based; a negative
//! position `-k` addresses the k-th line from the end (`-1` is the last line).
//!
//! [`Layout::resolve`] turns a layout plus a concrete line count into
//! absolute, non-overlapping [`ResolvedRange`]s in one left-to-right pass:
//!
//! 1. every non-wildcard position is resolved against the line count;
//! 2. segments are walked in declaration order; a wildcard starts right after
//!    the previous segment and ends right before the next non-wildcard
//!    segment (or at the last line);
//! 3. any non-wildcard segment that does not start after everything before it
//!    is rejected as overlapping or out of order.
//!
//! # Examples
//!
//! ```
//! use fixcol::{ColumnSpec, Layout, RecordSchema, TypeKey};
//! use std::sync::Arc;
//!
//! let line = Arc::new(
//!     RecordSchema::builder("Line")
//!         .column(ColumnSpec::new("text", TypeKey::Text).position(0).length(80))
//!         .build()?,
//! );
//!
//! let layout = Layout::builder()
//!     .line("header", 1, Arc::clone(&line))
//!     .wildcard("body", Arc::clone(&line))
//!     .line("trailer", -1, line)
//!     .build()?;
//!
//! let ranges = layout.resolve(4)?;
//! assert_eq!((ranges[1].start_line, ranges[1].end_line), (2, 3));
//! assert_eq!((ranges[2].start_line, ranges[2].end_line), (4, 4));
//! # Ok::<(), fixcol::FixcolError>(())
//! ```

use crate::error::{LayoutError, ResolutionError};
use crate::schema::{RecordSchema, DEFAULT_LINE_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Placement of a segment within a file.
///
/// Serialized with a `kind` tag: `{"kind": "range", "start": 2, "end": -2}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentKind {
    /// Exactly one line, mapped to one record.
    Single {
        /// 1-based or negative (end-relative) line position.
        position: i64,
    },
    /// A fixed, inclusive line range mapped to a list of records.
    Range {
        /// First line, 1-based or negative.
        start: i64,
        /// Last line, 1-based or negative.
        end: i64,
    },
    /// Every line between the neighbouring segments, mapped to a list.
    Wildcard,
}

/// A named, positioned part of a file layout.
#[derive(Debug, Clone)]
pub struct Segment {
    id: String,
    kind: SegmentKind,
    schema: Arc<RecordSchema>,
}

impl Segment {
    /// Create a segment.
    pub fn new(id: impl Into<String>, kind: SegmentKind, schema: impl Into<Arc<RecordSchema>>) -> Self {
        Segment {
            id: id.into(),
            kind,
            schema: schema.into(),
        }
    }

    /// Segment id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Segment placement
    #[must_use]
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Schema every line of this segment is decoded with
    #[must_use]
    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Declared start position (`None` for wildcards)
    #[must_use]
    pub fn start_position(&self) -> Option<i64> {
        match self.kind {
            SegmentKind::Single { position } => Some(position),
            SegmentKind::Range { start, .. } => Some(start),
            SegmentKind::Wildcard => None,
        }
    }

    /// Declared end position (`None` for wildcards)
    #[must_use]
    pub fn end_position(&self) -> Option<i64> {
        match self.kind {
            SegmentKind::Single { position } => Some(position),
            SegmentKind::Range { end, .. } => Some(end),
            SegmentKind::Wildcard => None,
        }
    }

    /// True when the segment produces a list rather than a single record
    #[must_use]
    pub fn is_list(&self) -> bool {
        !matches!(self.kind, SegmentKind::Single { .. })
    }

    /// True for the wildcard segment
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self.kind, SegmentKind::Wildcard)
    }
}

/// Absolute, inclusive line range of one segment for a concrete file.
///
/// A wildcard bounded tightly by its neighbours may come out empty
/// (`start_line > end_line`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRange {
    /// Segment id
    pub segment_id: String,
    /// First line, 1-based, inclusive
    pub start_line: usize,
    /// Last line, 1-based, inclusive
    pub end_line: usize,
}

impl ResolvedRange {
    /// Number of lines covered
    #[must_use]
    pub fn len(&self) -> usize {
        (self.end_line + 1).saturating_sub(self.start_line)
    }

    /// True when the range covers no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered, validated list of segments describing a whole file.
#[derive(Debug, Clone)]
pub struct Layout {
    segments: Vec<Segment>,
    line_separator: String,
}

impl Layout {
    /// Start building a layout.
    #[must_use]
    pub fn builder() -> LayoutBuilder {
        LayoutBuilder {
            segments: Vec::new(),
            line_separator: DEFAULT_LINE_SEPARATOR.to_string(),
        }
    }

    /// Validate a list of segments into a layout.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] for blank or duplicate ids, zero positions,
    /// or more than one wildcard.
    pub fn new(segments: Vec<Segment>) -> Result<Self, LayoutError> {
        validate(&segments)?;
        Ok(Layout {
            segments,
            line_separator: DEFAULT_LINE_SEPARATOR.to_string(),
        })
    }

    /// Segments in declaration order
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Look up a segment by id
    #[must_use]
    pub fn segment(&self, id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// True when the layout declares a wildcard segment
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(Segment::is_wildcard)
    }

    /// Separator used when writing the layout back out as text
    #[must_use]
    pub fn line_separator(&self) -> &str {
        &self.line_separator
    }

    /// Resolve every segment against a concrete line count.
    ///
    /// Ranges come back in declaration order.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolutionError`] for an empty layout, out-of-bounds
    /// positions, end-before-start ranges, and overlapping or out-of-order
    /// segments.
    pub fn resolve(&self, total_lines: usize) -> Result<Vec<ResolvedRange>, ResolutionError> {
        if self.segments.is_empty() {
            return Err(ResolutionError::EmptyLayout);
        }

        // Fixed positions first, so footers are known before wildcard bounds
        let bounds = self
            .segments
            .iter()
            .map(|segment| match (segment.start_position(), segment.end_position()) {
                (Some(start), Some(end)) => {
                    let start = resolve_position(&segment.id, start, total_lines)?;
                    let end = resolve_position(&segment.id, end, total_lines)?;
                    if end < start {
                        return Err(ResolutionError::EndBeforeStart {
                            segment: segment.id.clone(),
                            start,
                            end,
                        });
                    }
                    Ok(Some((start, end)))
                },
                _ => Ok(None),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut ranges = Vec::with_capacity(self.segments.len());
        let mut previous_end = 0;

        for (index, segment) in self.segments.iter().enumerate() {
            let (start, end) = match bounds[index] {
                None => {
                    let start = previous_end + 1;
                    let end = bounds[index + 1..]
                        .iter()
                        .flatten()
                        .next()
                        .map_or(total_lines, |(next_start, _)| next_start - 1);
                    // An empty wildcard must not pull the boundary backwards
                    previous_end = previous_end.max(end);
                    (start, end)
                },
                Some((start, end)) => {
                    if start <= previous_end {
                        return Err(ResolutionError::Overlap {
                            segment: segment.id.clone(),
                            start,
                            previous_end,
                        });
                    }
                    previous_end = end;
                    (start, end)
                },
            };

            log::debug!("Segment '{}' resolved to lines {start}..={end}", segment.id);
            ranges.push(ResolvedRange {
                segment_id: segment.id.clone(),
                start_line: start,
                end_line: end,
            });
        }

        Ok(ranges)
    }
}

/// Resolve a raw 1-based or end-relative position against a line count.
///
/// Position 0 is rejected when the layout is built.
fn resolve_position(segment: &str, raw: i64, total_lines: usize) -> Result<usize, ResolutionError> {
    let out_of_bounds = || ResolutionError::OutOfBounds {
        segment: segment.to_string(),
        position: raw,
        total_lines,
    };

    let resolved = if raw > 0 {
        usize::try_from(raw).map_err(|_| out_of_bounds())?
    } else {
        let from_end = usize::try_from(raw.unsigned_abs()).map_err(|_| out_of_bounds())?;
        if from_end > total_lines {
            return Err(out_of_bounds());
        }
        total_lines - from_end + 1
    };

    if resolved > total_lines {
        return Err(out_of_bounds());
    }
    Ok(resolved)
}

fn validate(segments: &[Segment]) -> Result<(), LayoutError> {
    let mut ids = HashSet::new();
    let mut wildcard: Option<&str> = None;

    for segment in segments {
        if segment.id.trim().is_empty() {
            return Err(LayoutError::EmptySegmentId);
        }
        if !ids.insert(segment.id.as_str()) {
            return Err(LayoutError::DuplicateSegmentId(segment.id.clone()));
        }
        if segment.start_position() == Some(0) || segment.end_position() == Some(0) {
            return Err(LayoutError::ZeroPosition(segment.id.clone()));
        }
        if segment.is_wildcard() {
            if let Some(first) = wildcard {
                return Err(LayoutError::MultipleWildcards {
                    first: first.to_string(),
                    second: segment.id.clone(),
                });
            }
            wildcard = Some(segment.id.as_str());
        }
    }

    Ok(())
}

/// Builder for [`Layout`]
#[derive(Debug)]
pub struct LayoutBuilder {
    segments: Vec<Segment>,
    line_separator: String,
}

impl LayoutBuilder {
    /// Add a single-line segment
    #[must_use]
    pub fn line(self, id: impl Into<String>, position: i64, schema: impl Into<Arc<RecordSchema>>) -> Self {
        self.segment(Segment::new(id, SegmentKind::Single { position }, schema))
    }

    /// Add a fixed inclusive range of lines
    #[must_use]
    pub fn range(
        self,
        id: impl Into<String>,
        start: i64,
        end: i64,
        schema: impl Into<Arc<RecordSchema>>,
    ) -> Self {
        self.segment(Segment::new(id, SegmentKind::Range { start, end }, schema))
    }

    /// Add the wildcard section
    #[must_use]
    pub fn wildcard(self, id: impl Into<String>, schema: impl Into<Arc<RecordSchema>>) -> Self {
        self.segment(Segment::new(id, SegmentKind::Wildcard, schema))
    }

    /// Add a prepared segment
    #[must_use]
    pub fn segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Separator used when writing the layout back out as text
    #[must_use]
    pub fn line_separator(mut self, separator: impl Into<String>) -> Self {
        self.line_separator = separator.into();
        self
    }

    /// Validate and build the layout.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] for blank or duplicate ids, zero positions,
    /// or more than one wildcard.
    pub fn build(self) -> Result<Layout, LayoutError> {
        validate(&self.segments)?;
        Ok(Layout {
            segments: self.segments,
            line_separator: self.line_separator,
        })
    }
}
