//! In-memory [`BlobEnumerator`] with deterministic ordering.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{BlobEnumerator, BlobProperties, BlobRecord, Segment, SegmentRequest};
use crate::TRACING_TARGET_BACKEND;
use crate::error::{Error, Result};
use crate::path::ContainerUrl;
use crate::types::ContinuationToken;

/// Prefix of markers issued by this backend.
const MARKER_PREFIX: &str = "mem!";

/// Container contents held in memory, enumerated in key order.
///
/// Markers are issued by this backend and name the first record of the next
/// segment. The container URL passed to [`list_segment`] is ignored; one
/// instance models one container.
///
/// [`list_segment`]: BlobEnumerator::list_segment
#[derive(Debug, Default)]
pub struct InMemoryEnumerator {
    blobs: BTreeMap<String, BlobProperties>,
    max_page_size: Option<u32>,
    state: Mutex<EnumeratorState>,
}

#[derive(Debug, Default)]
struct EnumeratorState {
    requests: Vec<SegmentRequest>,
    fail_after: Option<(usize, String)>,
}

impl InMemoryEnumerator {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a container holding the given keys with no metadata.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        keys.into_iter()
            .fold(Self::new(), |store, key| store.with_blob(BlobProperties::new(key)))
    }

    /// Adds a blob.
    pub fn with_blob(mut self, blob: BlobProperties) -> Self {
        self.blobs.insert(blob.name.clone(), blob);
        self
    }

    /// Caps every segment at `max_page_size` records regardless of the
    /// requested size, the way a service-side limit would.
    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = Some(max_page_size.max(1));
        self
    }

    /// Fails every request after `successes` segments have been served.
    pub fn fail_after(mut self, successes: usize, message: impl Into<String>) -> Self {
        self.state.get_mut().fail_after = Some((successes, message.into()));
        self
    }

    /// Returns every request served so far, in order.
    pub async fn requests(&self) -> Vec<SegmentRequest> {
        self.state.lock().await.requests.clone()
    }

    /// Returns all records the request would enumerate, each with the key a
    /// marker resumes from.
    fn records(&self, request: &SegmentRequest) -> Vec<(String, BlobRecord)> {
        let prefix = request.prefix.as_deref().unwrap_or_default();
        let mut records: Vec<(String, BlobRecord)> = Vec::new();

        for (key, blob) in self.blobs.range(prefix.to_owned()..) {
            let Some(rest) = key.strip_prefix(prefix) else {
                break;
            };

            let group = request
                .delimiter
                .and_then(|delimiter| rest.find(delimiter).map(|idx| idx + delimiter.len_utf8()))
                .map(|end| format!("{prefix}{}", &rest[..end]));

            match group {
                Some(group) => {
                    let seen = matches!(
                        records.last(),
                        Some((_, BlobRecord::Prefix(last))) if *last == group
                    );
                    if !seen {
                        records.push((key.clone(), BlobRecord::Prefix(group)));
                    }
                }
                None => records.push((key.clone(), BlobRecord::Blob(blob.clone()))),
            }
        }

        records
    }
}

#[async_trait]
impl BlobEnumerator for InMemoryEnumerator {
    async fn list_segment(
        &self,
        _container: &ContainerUrl,
        request: &SegmentRequest,
    ) -> Result<Segment> {
        let mut state = self.state.lock().await;
        if let Some((successes, message)) = &state.fail_after
            && state.requests.len() >= *successes
        {
            return Err(Error::upstream(message.clone()));
        }
        state.requests.push(request.clone());
        drop(state);

        let start_key = match &request.marker {
            Some(marker) => Some(
                marker
                    .as_str()
                    .strip_prefix(MARKER_PREFIX)
                    .ok_or_else(|| Error::upstream("OutOfRangeInput: the marker is not valid"))?
                    .to_owned(),
            ),
            None => None,
        };

        let limit = self
            .max_page_size
            .map_or(request.max_results, |cap| cap.min(request.max_results))
            .max(1) as usize;

        let mut remaining = self
            .records(request)
            .into_iter()
            .skip_while(|(key, _)| start_key.as_ref().is_some_and(|start| key < start));

        let records: Vec<BlobRecord> = remaining
            .by_ref()
            .take(limit)
            .map(|(_, record)| record)
            .collect();
        let next_marker = remaining
            .next()
            .map(|(key, _)| ContinuationToken::new(format!("{MARKER_PREFIX}{key}")));

        tracing::trace!(
            target: TRACING_TARGET_BACKEND,
            prefix = ?request.prefix,
            grouped = request.is_grouped(),
            records = records.len(),
            has_next = next_marker.is_some(),
            "Served in-memory segment"
        );

        Ok(Segment::new(records, next_marker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn container() -> ContainerUrl {
        ContainerUrl::resolve("https://acct.blob.core.windows.net/c?sig=x").unwrap()
    }

    #[tokio::test]
    async fn grouped_listing_collapses_subdirectories() {
        let store = InMemoryEnumerator::from_keys(["a/b/c.txt", "a/b/d/e.txt", "a/b/d/f.txt", "z"]);
        let segment = store
            .list_segment(&container(), &SegmentRequest::grouped("a/b/", None, 50))
            .await
            .unwrap();

        assert_eq!(
            segment.records,
            vec![
                BlobRecord::Blob(BlobProperties::new("a/b/c.txt")),
                BlobRecord::Prefix("a/b/d/".to_owned()),
            ]
        );
        assert!(segment.next_marker.is_none());
    }

    #[tokio::test]
    async fn flat_listing_pages_with_markers() {
        let store = InMemoryEnumerator::from_keys(["a", "b/c", "d/e/f"]);
        let first = store
            .list_segment(&container(), &SegmentRequest::flat(None, 2))
            .await
            .unwrap();
        assert_eq!(first.records.len(), 2);
        let marker = first.next_marker.expect("more records remain");

        let second = store
            .list_segment(&container(), &SegmentRequest::flat(Some(marker), 2))
            .await
            .unwrap();
        assert_eq!(second.records, vec![BlobRecord::Blob(BlobProperties::new("d/e/f"))]);
        assert!(second.next_marker.is_none());
        assert_eq!(store.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn max_page_size_caps_requests() {
        let store = InMemoryEnumerator::from_keys(["a", "b", "c"]).with_max_page_size(1);
        let segment = store
            .list_segment(&container(), &SegmentRequest::flat(None, 500))
            .await
            .unwrap();
        assert_eq!(segment.records.len(), 1);
        assert!(segment.next_marker.is_some());
    }

    #[tokio::test]
    async fn foreign_marker_is_upstream_failure() {
        let store = InMemoryEnumerator::from_keys(["a"]);
        let request = SegmentRequest::flat(Some(ContinuationToken::new("bogus")), 10);
        let err = store.list_segment(&container(), &request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
    }

    #[tokio::test]
    async fn fail_after_injects_upstream_failure() {
        let store = InMemoryEnumerator::from_keys(["a", "b"]).fail_after(1, "ServerBusy");
        let request = SegmentRequest::flat(None, 1);
        store.list_segment(&container(), &request).await.unwrap();
        let err = store.list_segment(&container(), &request).await.unwrap_err();
        assert_eq!(err.message(), "ServerBusy");
    }
}
