//! Paged enumeration primitive implemented by storage backends.
//!
//! The engine asks a [`BlobEnumerator`] for one [`Segment`] at a time and
//! threads the backend's marker through untouched. Transport, authentication
//! and retry policy all live behind this trait.

mod memory;
mod segment;

use async_trait::async_trait;

pub use self::memory::InMemoryEnumerator;
pub use self::segment::{BlobProperties, BlobRecord, Segment, SegmentRequest};
use crate::error::Result;
use crate::path::ContainerUrl;

/// Cursor-resumable enumeration over the contents of a blob container.
///
/// Two modes are supported through [`SegmentRequest`]:
/// - grouped: with a delimiter, yielding group markers for virtual
///   subdirectories and leaf records for blobs directly under the prefix;
/// - flat: without a delimiter, yielding every blob regardless of nesting.
///
/// Implementations report every failure as an upstream error and must not
/// require shared mutable state between calls.
#[async_trait]
pub trait BlobEnumerator: Send + Sync {
    /// Fetches exactly one segment of the enumeration.
    async fn list_segment(
        &self,
        container: &ContainerUrl,
        request: &SegmentRequest,
    ) -> Result<Segment>;
}
