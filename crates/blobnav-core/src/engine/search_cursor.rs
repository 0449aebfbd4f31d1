//! Resume position of a search.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::ContinuationToken;

/// Leading tag that marks a token as a search cursor.
///
/// Backend markers never start with it: Azure markers begin with a digit and
/// in-memory markers with `mem!`.
const SEARCH_TAG: &str = "s~";

/// Where a follow-up search resumes scanning.
///
/// `marker` is the backend marker of the segment to fetch, stored verbatim
/// (`None` is the start of the container). `offset` counts the records of that
/// segment that were already scanned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SearchCursor {
    #[serde(rename = "m", default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<ContinuationToken>,
    #[serde(rename = "o", default)]
    pub offset: usize,
}

impl SearchCursor {
    /// Cursor that resumes inside the segment fetched with `marker`.
    pub fn within(marker: Option<ContinuationToken>, offset: usize) -> Self {
        Self { marker, offset }
    }

    /// Cursor that resumes at the start of the segment behind `marker`.
    pub fn at(marker: ContinuationToken) -> Self {
        Self {
            marker: Some(marker),
            offset: 0,
        }
    }

    /// Encodes the cursor as an opaque token.
    pub fn encode(&self) -> Result<ContinuationToken> {
        let json = serde_json::to_vec(self).map_err(|err| {
            Error::invalid_input("search cursor could not be encoded").with_source(err)
        })?;
        Ok(ContinuationToken::new(format!(
            "{SEARCH_TAG}{}",
            URL_SAFE_NO_PAD.encode(json)
        )))
    }

    /// Returns `true` if `token` was issued by a search.
    pub fn is_search_token(token: &ContinuationToken) -> bool {
        token.as_str().starts_with(SEARCH_TAG)
    }

    /// Decodes a token previously produced by [`encode`](Self::encode).
    pub fn decode(token: &ContinuationToken) -> Result<Self> {
        let encoded = token
            .as_str()
            .strip_prefix(SEARCH_TAG)
            .ok_or_else(|| Error::invalid_input("continuation token is not a search cursor"))?;
        let json = URL_SAFE_NO_PAD.decode(encoded).map_err(|err| {
            Error::invalid_input("continuation token is not a search cursor").with_source(err)
        })?;
        serde_json::from_slice(&json).map_err(|err| {
            Error::invalid_input("continuation token is not a search cursor").with_source(err)
        })
    }
}
