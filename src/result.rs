//! Named results of mapping a whole file.

use crate::entity::LineEntity;
use crate::error::Result;
use crate::record::Record;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Output of one resolved segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentOutput {
    /// A single-line segment
    Single(Record),
    /// A range or wildcard segment
    List(Vec<Record>),
}

/// Records produced by a [`FileMapper`](crate::FileMapper), keyed by segment id.
///
/// Ids iterate in layout declaration order. The result is immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingResult {
    entries: IndexMap<String, SegmentOutput>,
}

impl MappingResult {
    pub(crate) fn new(entries: IndexMap<String, SegmentOutput>) -> Self {
        MappingResult { entries }
    }

    /// The single record mapped for `id`, if `id` is a single-line segment.
    #[must_use]
    pub fn single(&self, id: &str) -> Option<&Record> {
        match self.entries.get(id) {
            Some(SegmentOutput::Single(record)) => Some(record),
            _ => None,
        }
    }

    /// The records mapped for `id`; empty when `id` is not a list segment.
    #[must_use]
    pub fn list(&self, id: &str) -> &[Record] {
        match self.entries.get(id) {
            Some(SegmentOutput::List(records)) => records,
            _ => &[],
        }
    }

    /// The single record for `id` converted into a typed entity.
    ///
    /// # Errors
    ///
    /// Returns an error when the record does not fit `T`.
    pub fn get_single<T: LineEntity>(&self, id: &str) -> Result<Option<T>> {
        self.single(id).cloned().map(T::from_record).transpose()
    }

    /// The list for `id` converted into typed entities (empty when absent).
    ///
    /// # Errors
    ///
    /// Returns the first record that does not fit `T`.
    pub fn get_list<T: LineEntity>(&self, id: &str) -> Result<Vec<T>> {
        self.list(id).iter().cloned().map(T::from_record).collect()
    }

    /// Raw output of a segment
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SegmentOutput> {
        self.entries.get(id)
    }

    /// True when any single or list entry exists for `id`
    #[must_use]
    pub fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// All segment ids, in declaration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of segments mapped
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was mapped
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(id, output)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SegmentOutput)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
