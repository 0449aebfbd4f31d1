//! Result of one listing or search call.

use serde::{Deserialize, Serialize};

use super::{Breadcrumb, ContinuationToken, Entry};

/// Entries, resume cursor and breadcrumbs produced by a single call.
///
/// Entries keep the order in which the backend yielded them; directories and
/// files may be interleaved and no additional sort is applied. An absent
/// `continuation_token` signals the end of enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    /// Listed entries in backend enumeration order.
    pub items: Vec<Entry>,
    /// Cursor to pass back for the next page, if any.
    pub continuation_token: Option<ContinuationToken>,
    /// Navigation trail from the container root.
    pub breadcrumbs: Vec<Breadcrumb>,
}

impl ListingPage {
    /// Returns `true` when no further page can be requested.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.continuation_token.is_none()
    }

    /// Returns the number of entries in this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when this page holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
