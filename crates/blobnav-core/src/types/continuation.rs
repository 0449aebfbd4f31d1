//! Opaque continuation token.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Opaque continuation token handed out with a page of results.
///
/// Callers pass it back unchanged to resume enumeration. Directory listings
/// carry the storage backend's own marker verbatim; nothing in this crate
/// interprets the backend marker's contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    /// Wraps a raw token string.
    #[inline]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token string.
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContinuationToken {
    fn from(token: &str) -> Self {
        Self(token.to_owned())
    }
}
