//! Flat, case-insensitive substring search across the whole container.

use super::search_cursor::SearchCursor;
use super::{ListingEngine, SEARCH_BATCH_SIZE, validate_page_size};
use crate::TRACING_TARGET_ENGINE;
use crate::backend::{BlobRecord, SegmentRequest};
use crate::error::{Error, Result};
use crate::path::{ContainerUrl, DELIMITER};
use crate::types::{Breadcrumb, ContinuationToken, Entry, ListingPage};

impl ListingEngine {
    /// Searches every object key in the container for `search_term`.
    ///
    /// Backend pages of [`SEARCH_BATCH_SIZE`] records are scanned one after
    /// another, starting where `cursor` left off, until `page_size` matches
    /// are collected or the container is exhausted. Matching is a
    /// case-insensitive substring test on the full key.
    ///
    /// The returned token resumes right after the last record scanned, even
    /// when that record sits in the middle of a backend page, so a chain of
    /// calls yields every match exactly once. Breadcrumbs are always the root.
    ///
    /// # Errors
    ///
    /// - [`InvalidInput`] for a malformed container URL, blank search term,
    ///   bad page size or a token that is not a search cursor.
    /// - [`UpstreamFailure`] if any backend call fails; no partial page is
    ///   returned.
    ///
    /// [`InvalidInput`]: crate::ErrorKind::InvalidInput
    /// [`UpstreamFailure`]: crate::ErrorKind::UpstreamFailure
    #[tracing::instrument(
        name = "engine.search",
        skip(self, container_url, cursor),
        fields(has_cursor = cursor.is_some())
    )]
    pub async fn search(
        &self,
        container_url: &str,
        search_term: &str,
        cursor: Option<&ContinuationToken>,
        page_size: u32,
    ) -> Result<ListingPage> {
        let container = ContainerUrl::resolve(container_url)?;
        if search_term.trim().is_empty() {
            return Err(Error::invalid_input("search term is required"));
        }
        validate_page_size(page_size)?;

        let resume = cursor.map(SearchCursor::decode).transpose()?.unwrap_or_default();
        let needle = fold_case(search_term);
        let limit = page_size as usize;

        let mut marker = resume.marker;
        let mut offset = resume.offset;
        let mut items: Vec<Entry> = Vec::new();
        let mut pages = 0usize;
        let mut scanned_total = 0usize;

        let next = loop {
            let request = SegmentRequest::flat(marker.clone(), SEARCH_BATCH_SIZE);
            let segment = self.fetch(&container, &request).await?;
            pages += 1;

            let total = segment.records.len();
            let mut scanned = offset.min(total);
            for record in &segment.records[scanned..] {
                scanned += 1;
                let BlobRecord::Blob(blob) = record else {
                    continue;
                };
                if !fold_case(&blob.name).contains(&needle) {
                    continue;
                }

                let name = blob.name.rsplit(DELIMITER).next().unwrap_or(&blob.name);
                items.push(Entry::file(
                    name,
                    blob.name.clone(),
                    container.object_url(&blob.name),
                    blob.content_length,
                    blob.last_modified,
                ));
                if items.len() >= limit {
                    break;
                }
            }
            scanned_total += scanned - offset.min(total);
            offset = 0;

            let full = items.len() >= limit;
            if full && scanned < total {
                break Some(SearchCursor::within(marker, scanned));
            }
            match segment.next_marker {
                Some(next_marker) if full => break Some(SearchCursor::at(next_marker)),
                Some(next_marker) => marker = Some(next_marker),
                None => break None,
            }
        };

        let continuation_token = next.map(|cursor| cursor.encode()).transpose()?;

        tracing::debug!(
            target: TRACING_TARGET_ENGINE,
            container = %container,
            pages,
            scanned = scanned_total,
            matches = items.len(),
            has_next = continuation_token.is_some(),
            "Search page assembled"
        );

        Ok(ListingPage {
            items,
            continuation_token,
            breadcrumbs: vec![Breadcrumb::root()],
        })
    }
}

/// Lowercases one character at a time, ignoring surrounding context.
///
/// Unlike [`str::to_lowercase`], a word-final `Σ` folds to `σ` like any
/// other, so a key containing the term verbatim always matches.
fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use crate::ErrorKind;
    use crate::backend::InMemoryEnumerator;
    use crate::engine::{ListingEngine, SEARCH_BATCH_SIZE};
    use crate::types::{Breadcrumb, ContinuationToken, ListingPage};

    const CONTAINER: &str = "https://acct.blob.core.windows.net/docs?sig=s";

    async fn search_all(engine: &ListingEngine, term: &str, page_size: u32) -> Vec<ListingPage> {
        let mut pages = Vec::new();
        let mut cursor: Option<ContinuationToken> = None;
        loop {
            let page = engine
                .search(CONTAINER, term, cursor.as_ref(), page_size)
                .await
                .unwrap();
            assert!(page.len() <= page_size as usize);
            cursor = page.continuation_token.clone();
            pages.push(page);
            if cursor.is_none() {
                return pages;
            }
        }
    }

    #[tokio::test]
    async fn resumes_inside_a_backend_page() {
        let engine = ListingEngine::new(InMemoryEnumerator::from_keys(["x/foo1", "y/foo2", "z/foo3"]));

        let first = engine.search(CONTAINER, "foo", None, 2).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first.items[0].path, "x/foo1");
        assert_eq!(first.items[1].path, "y/foo2");
        let token = first.continuation_token.expect("third match remains");

        let second = engine.search(CONTAINER, "foo", Some(&token), 2).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second.items[0].name, "foo3");
        assert_eq!(second.items[0].path, "z/foo3");
        assert!(second.continuation_token.is_none());
    }

    #[tokio::test]
    async fn matches_case_insensitively_on_full_key() {
        let engine = ListingEngine::new(InMemoryEnumerator::from_keys([
            "Reports/Q1.PDF",
            "reports/q2.pdf",
            "archive/REPORTS.zip",
            "images/cat.png",
        ]));

        let page = engine.search(CONTAINER, "rEpOrTs", None, 50).await.unwrap();
        let paths: BTreeSet<_> = page.items.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            BTreeSet::from(["Reports/Q1.PDF", "reports/q2.pdf", "archive/REPORTS.zip"])
        );
        assert!(page.items.iter().all(|e| !e.is_directory));
        assert_eq!(page.breadcrumbs, vec![Breadcrumb::root()]);
        assert!(page.continuation_token.is_none());
    }

    #[tokio::test]
    async fn word_final_sigma_matches_either_case() {
        let engine = ListingEngine::new(InMemoryEnumerator::from_keys(["docs/ΟΔΟΣ", "docs/other"]));

        for term in ["Σ", "σ", "οδοσ", "ΟΔΟΣ"] {
            let page = engine.search(CONTAINER, term, None, 10).await.unwrap();
            let paths: Vec<_> = page.items.iter().map(|e| e.path.as_str()).collect();
            assert_eq!(paths, ["docs/ΟΔΟΣ"], "term: {term:?}");
        }
    }

    #[test]
    fn fold_case_is_context_free() {
        assert_eq!(super::fold_case("ΟΔΟΣ"), "οδοσ");
        assert_eq!(super::fold_case("Σ"), "σ");
        assert_eq!(super::fold_case("Report.PDF"), "report.pdf");
    }

    #[tokio::test]
    async fn entries_use_last_segment_and_escaped_url() {
        let engine = ListingEngine::new(InMemoryEnumerator::from_keys(["deep/er/my file.txt"]));
        let page = engine.search(CONTAINER, "file", None, 10).await.unwrap();

        assert_eq!(page.items[0].name, "my file.txt");
        assert_eq!(
            page.items[0].url,
            "https://acct.blob.core.windows.net/docs/deep/er/my%20file.txt?sig=s"
        );
    }

    #[tokio::test]
    async fn scans_across_backend_pages() {
        let keys: Vec<String> = (0..40).map(|i| format!("dir{}/item-{i:02}", i % 3)).collect();
        let backend = Arc::new(InMemoryEnumerator::from_keys(keys.clone()).with_max_page_size(4));
        let engine = ListingEngine::from_arc(backend.clone());

        let page = engine.search(CONTAINER, "dir1/", None, 5).await.unwrap();
        assert_eq!(page.len(), 5);
        assert!(page.continuation_token.is_some());

        let requests = backend.requests().await;
        assert!(requests.len() > 1);
        assert!(requests.iter().all(|r| !r.is_grouped() && r.prefix.is_none()));
        assert!(requests.iter().all(|r| r.max_results == SEARCH_BATCH_SIZE));
    }

    #[tokio::test]
    async fn cursor_chain_yields_every_match_exactly_once() {
        let keys: Vec<String> = (0..57)
            .map(|i| {
                if i % 4 == 0 {
                    format!("logs/{i:03}-Match.txt")
                } else {
                    format!("data/{i:03}.bin")
                }
            })
            .collect();
        let expected: Vec<String> = keys.iter().filter(|k| k.contains("Match")).cloned().collect();

        for max_page_size in [1, 3, 7, 500] {
            for page_size in [1, 2, 5, 50] {
                let backend = InMemoryEnumerator::from_keys(keys.clone())
                    .with_max_page_size(max_page_size);
                let engine = ListingEngine::new(backend);

                let pages = search_all(&engine, "match", page_size).await;
                let mut found: Vec<String> = pages
                    .iter()
                    .flat_map(|p| p.items.iter().map(|e| e.path.clone()))
                    .collect();
                found.sort();
                assert_eq!(
                    found, expected,
                    "max_page_size={max_page_size} page_size={page_size}"
                );
            }
        }
    }

    #[tokio::test]
    async fn no_matches_exhausts_container() {
        let backend = Arc::new(InMemoryEnumerator::from_keys(["a", "b", "c"]).with_max_page_size(1));
        let engine = ListingEngine::from_arc(backend.clone());

        let page = engine.search(CONTAINER, "zzz", None, 10).await.unwrap();
        assert!(page.is_empty());
        assert!(page.continuation_token.is_none());
        assert_eq!(backend.requests().await.len(), 3);
    }

    #[tokio::test]
    async fn full_page_at_segment_end_resumes_at_next_segment() {
        let backend = Arc::new(
            InMemoryEnumerator::from_keys(["k1", "k2", "k3", "k4"]).with_max_page_size(2),
        );
        let engine = ListingEngine::from_arc(backend.clone());

        let first = engine.search(CONTAINER, "k", None, 2).await.unwrap();
        assert_eq!(first.len(), 2);
        let token = first.continuation_token.expect("second segment remains");

        let second = engine.search(CONTAINER, "k", Some(&token), 2).await.unwrap();
        let names: Vec<_> = second.items.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["k3", "k4"]);
        assert!(second.continuation_token.is_none());

        let requests = backend.requests().await;
        assert_eq!(requests.len(), 2);
        assert!(requests[1].marker.is_some());
    }

    #[tokio::test]
    async fn rejects_blank_term_and_foreign_cursor() {
        let backend = Arc::new(InMemoryEnumerator::from_keys(["a"]));
        let engine = ListingEngine::from_arc(backend.clone());

        for term in ["", "   "] {
            let err = engine.search(CONTAINER, term, None, 10).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }

        let foreign = ContinuationToken::new("not-a-search-cursor!");
        let err = engine
            .search(CONTAINER, "a", Some(&foreign), 10)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = engine.search("nope", "a", None, 10).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        assert!(backend.requests().await.is_empty());
    }

    #[tokio::test]
    async fn backend_failure_mid_scan_returns_no_partial_page() {
        let backend = InMemoryEnumerator::from_keys(["m1", "x", "m2"])
            .with_max_page_size(1)
            .fail_after(2, "ServerBusy: the server is busy");
        let engine = ListingEngine::new(backend);

        let err = engine.search(CONTAINER, "m", None, 10).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
        assert!(err.message().contains("ServerBusy"));
    }
}
