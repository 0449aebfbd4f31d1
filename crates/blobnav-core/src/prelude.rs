//! Convenience re-exports.

pub use crate::backend::{
    BlobEnumerator, BlobProperties, BlobRecord, InMemoryEnumerator, Segment, SegmentRequest,
};
pub use crate::engine::{DEFAULT_PAGE_SIZE, ListingEngine};
pub use crate::path::ContainerUrl;
pub use crate::types::{Breadcrumb, ContinuationToken, Entry, ListingPage};
pub use crate::{Error, ErrorKind, Result};
