//! Request and response shapes of one enumeration round-trip.

use jiff::Timestamp;

use crate::path::DELIMITER;
use crate::types::ContinuationToken;

/// Parameters of a single enumeration round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRequest {
    /// Key prefix restriction; `None` enumerates the whole container.
    pub prefix: Option<String>,
    /// Grouping delimiter; `None` selects flat enumeration.
    pub delimiter: Option<char>,
    /// Backend marker to resume from, passed through verbatim.
    pub marker: Option<ContinuationToken>,
    /// Maximum number of records the backend should return.
    pub max_results: u32,
}

impl SegmentRequest {
    /// Creates a grouped request under `prefix`.
    pub fn grouped(
        prefix: impl Into<String>,
        marker: Option<ContinuationToken>,
        max_results: u32,
    ) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: (!prefix.is_empty()).then_some(prefix),
            delimiter: Some(DELIMITER),
            marker,
            max_results,
        }
    }

    /// Creates a flat request over the whole container.
    pub fn flat(marker: Option<ContinuationToken>, max_results: u32) -> Self {
        Self {
            prefix: None,
            delimiter: None,
            marker,
            max_results,
        }
    }

    /// Returns `true` when the request asks for delimiter grouping.
    #[must_use]
    pub fn is_grouped(&self) -> bool {
        self.delimiter.is_some()
    }
}

/// Blob metadata reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobProperties {
    /// Full object key relative to the container root.
    pub name: String,
    /// Size in bytes, when reported.
    pub content_length: Option<u64>,
    /// Last modification time, when reported.
    pub last_modified: Option<Timestamp>,
}

impl BlobProperties {
    /// Creates blob metadata with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_length: None,
            last_modified: None,
        }
    }

    /// Sets the content length.
    pub fn with_content_length(mut self, content_length: u64) -> Self {
        self.content_length = Some(content_length);
        self
    }

    /// Sets the last modification time.
    pub fn with_last_modified(mut self, last_modified: Timestamp) -> Self {
        self.last_modified = Some(last_modified);
        self
    }
}

/// One record of a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobRecord {
    /// Group marker: a delimiter-terminated common prefix.
    Prefix(String),
    /// Leaf record: a blob.
    Blob(BlobProperties),
}

impl BlobRecord {
    /// Returns the full key or prefix of this record.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Prefix(prefix) => prefix,
            Self::Blob(blob) => &blob.name,
        }
    }
}

/// One page of enumeration results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    /// Records in backend enumeration order.
    pub records: Vec<BlobRecord>,
    /// Marker of the following segment; `None` when exhausted.
    pub next_marker: Option<ContinuationToken>,
}

impl Segment {
    /// Creates a segment from records and the next marker.
    pub fn new(records: Vec<BlobRecord>, next_marker: Option<ContinuationToken>) -> Self {
        Self {
            records,
            next_marker,
        }
    }
}
