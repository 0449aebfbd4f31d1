//! Directory-style listing of one virtual path.

use super::search_cursor::SearchCursor;
use super::{ListingEngine, validate_page_size};
use crate::TRACING_TARGET_ENGINE;
use crate::backend::{BlobRecord, SegmentRequest};
use crate::error::{Error, Result};
use crate::path::{ContainerUrl, DELIMITER, navigation_url, normalize_prefix};
use crate::types::{Breadcrumb, ContinuationToken, Entry, ListingPage};

impl ListingEngine {
    /// Lists the virtual directory `virtual_path`, one backend page per call.
    ///
    /// Group markers become directory entries whose URL navigates back into
    /// this listing; blobs become file entries with a direct object URL.
    /// Entries keep the backend's order. The returned continuation token is
    /// the backend's marker for the next page, passed through verbatim, and
    /// is absent once the listing is exhausted.
    ///
    /// # Errors
    ///
    /// - [`InvalidInput`] for a malformed container URL or page size, or a
    ///   continuation token that was issued by a search.
    /// - [`UpstreamFailure`] if the backend call fails.
    ///
    /// [`InvalidInput`]: crate::ErrorKind::InvalidInput
    /// [`UpstreamFailure`]: crate::ErrorKind::UpstreamFailure
    #[tracing::instrument(
        name = "engine.list_directory",
        skip(self, container_url, cursor),
        fields(has_cursor = cursor.is_some())
    )]
    pub async fn list_directory(
        &self,
        container_url: &str,
        virtual_path: Option<&str>,
        cursor: Option<&ContinuationToken>,
        page_size: u32,
    ) -> Result<ListingPage> {
        let container = ContainerUrl::resolve(container_url)?;
        validate_page_size(page_size)?;
        if cursor.is_some_and(SearchCursor::is_search_token) {
            return Err(Error::invalid_input(
                "continuation token belongs to a search, not a directory listing",
            ));
        }
        let prefix = normalize_prefix(virtual_path);

        let request = SegmentRequest::grouped(prefix.clone(), cursor.cloned(), page_size);
        let segment = self.fetch(&container, &request).await?;

        let items: Vec<Entry> = segment
            .records
            .into_iter()
            .map(|record| match record {
                BlobRecord::Prefix(marker) => {
                    let name = marker
                        .strip_prefix(prefix.as_str())
                        .unwrap_or(&marker)
                        .trim_end_matches(DELIMITER)
                        .to_owned();
                    let url = navigation_url(&marker);
                    Entry::directory(name, marker, url)
                }
                BlobRecord::Blob(blob) => {
                    let name = blob
                        .name
                        .strip_prefix(prefix.as_str())
                        .unwrap_or(&blob.name)
                        .to_owned();
                    let url = container.object_url(&blob.name);
                    Entry::file(name, blob.name, url, blob.content_length, blob.last_modified)
                }
            })
            .collect();

        tracing::debug!(
            target: TRACING_TARGET_ENGINE,
            container = %container,
            prefix = %prefix,
            items = items.len(),
            has_next = segment.next_marker.is_some(),
            "Directory listed"
        );

        Ok(ListingPage {
            items,
            continuation_token: segment.next_marker,
            breadcrumbs: Breadcrumb::trail(&prefix),
        })
    }
}
