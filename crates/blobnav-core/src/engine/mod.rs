//! Directory listing and search over a [`BlobEnumerator`].
//!
//! Both operations are stateless: every call resolves its own container URL,
//! drives the backend strictly sequentially and builds a fresh
//! [`ListingPage`]. The engine can be cloned and shared freely between
//! concurrent callers.
//!
//! [`ListingPage`]: crate::types::ListingPage

mod directory;
mod search;
mod search_cursor;

use std::fmt;
use std::sync::Arc;

use crate::TRACING_TARGET_ENGINE;
use crate::backend::{BlobEnumerator, Segment, SegmentRequest};
use crate::error::{Error, Result};
use crate::path::ContainerUrl;

/// Page size used when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 5000;

/// Records requested per backend round-trip while searching.
pub const SEARCH_BATCH_SIZE: u32 = 500;

/// Pagination and search engine over a paged blob enumeration backend.
#[derive(Clone)]
pub struct ListingEngine {
    backend: Arc<dyn BlobEnumerator>,
}

impl ListingEngine {
    /// Creates an engine driving the given backend.
    pub fn new(backend: impl BlobEnumerator + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Creates an engine from a shared backend.
    pub fn from_arc(backend: Arc<dyn BlobEnumerator>) -> Self {
        Self { backend }
    }

    /// Fetches one segment, logging the round-trip.
    async fn fetch(&self, container: &ContainerUrl, request: &SegmentRequest) -> Result<Segment> {
        tracing::trace!(
            target: TRACING_TARGET_ENGINE,
            container = %container,
            prefix = ?request.prefix,
            grouped = request.is_grouped(),
            has_marker = request.marker.is_some(),
            max_results = request.max_results,
            "Requesting segment"
        );

        self.backend
            .list_segment(container, request)
            .await
            .inspect_err(|err| {
                tracing::error!(
                    target: TRACING_TARGET_ENGINE,
                    container = %container,
                    error = %err,
                    "Backend enumeration failed"
                );
            })
    }
}

impl fmt::Debug for ListingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListingEngine").finish_non_exhaustive()
    }
}

/// Rejects page sizes outside `1..=MAX_PAGE_SIZE`.
fn validate_page_size(page_size: u32) -> Result<()> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(Error::invalid_input(format!(
            "page size {page_size} is out of range (1..={MAX_PAGE_SIZE})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn page_size_bounds() {
        assert!(validate_page_size(1).is_ok());
        assert!(validate_page_size(DEFAULT_PAGE_SIZE).is_ok());
        assert!(validate_page_size(MAX_PAGE_SIZE).is_ok());

        for page_size in [0, MAX_PAGE_SIZE + 1] {
            let err = validate_page_size(page_size).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
    }
}
