//! Request bodies and query strings.

use blobnav_core::engine::DEFAULT_PAGE_SIZE;
use blobnav_core::types::ContinuationToken;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/blob/setsas`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSasRequest {
    /// Container URL including its shared-access signature query.
    pub sas_url: String,
}

/// Query string of `GET /api/blob/list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Virtual directory to list; ignored when searching.
    pub path: Option<String>,
    /// Token returned by the previous page.
    pub continuation_token: Option<String>,
    /// Maximum number of entries to return.
    pub page_size: Option<u32>,
    /// Substring to search for across the whole container.
    pub search: Option<String>,
}

impl ListQuery {
    /// Returns the search term when one was given and is not blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|term| !term.trim().is_empty())
    }

    /// Returns the continuation token, treating an empty value as absent.
    pub fn cursor(&self) -> Option<ContinuationToken> {
        self.continuation_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .map(ContinuationToken::from)
    }

    /// Returns the requested page size or the default.
    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let query = ListQuery::default();
        assert_eq!(query.page_size(), 50);
        assert!(query.cursor().is_none());
        assert!(query.search_term().is_none());
    }

    #[test]
    fn blank_values_are_absent() {
        let query = ListQuery {
            continuation_token: Some(String::new()),
            search: Some("   ".into()),
            ..Default::default()
        };
        assert!(query.cursor().is_none());
        assert!(query.search_term().is_none());
    }

    #[test]
    fn search_term_is_not_trimmed() {
        let query = ListQuery {
            search: Some(" report ".into()),
            ..Default::default()
        };
        assert_eq!(query.search_term(), Some(" report "));
    }
}
