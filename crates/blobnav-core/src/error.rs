//! Error types for path resolution, listing and search.
//!
//! Every failure is categorized by an [`ErrorKind`] so that callers (the HTTP
//! layer in particular) can map it without inspecting messages. Input and
//! authentication problems are detected before any backend round-trip;
//! upstream failures keep the backend's message and source error.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Type alias for boxed errors that are Send + Sync.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for browsing operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error kind enumeration for categorizing browsing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or malformed container URL, empty search term, bad cursor.
    InvalidInput,
    /// No credential is available for the operation.
    AuthenticationMissing,
    /// The storage backend call failed or returned malformed paging data.
    UpstreamFailure,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::AuthenticationMissing => "authentication_missing",
            Self::UpstreamFailure => "upstream_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Browsing error with structured information.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    #[inline]
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error to this error.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creates a new invalid input error.
    #[inline]
    pub fn invalid_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    /// Creates a new authentication missing error.
    #[inline]
    pub fn authentication_missing(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::AuthenticationMissing, message)
    }

    /// Creates a new upstream failure carrying the backend's message.
    #[inline]
    pub fn upstream(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::UpstreamFailure, message)
    }

    /// Returns `true` if the error originated at the storage backend.
    #[must_use]
    #[inline]
    pub fn is_upstream(&self) -> bool {
        self.kind == ErrorKind::UpstreamFailure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_creation() {
        let error = Error::invalid_input("search term is required");
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert_eq!(error.message(), "search term is required");
        assert!(!error.is_upstream());
    }

    #[test]
    fn error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let error = Error::upstream("connection reset").with_source(source);

        assert!(StdError::source(&error).is_some());
        assert!(error.is_upstream());
    }

    #[test]
    fn display_includes_kind_and_message() {
        let error = Error::upstream("AuthenticationFailed: signature expired");
        let display = error.to_string();
        assert!(display.starts_with("upstream_failure"));
        assert!(display.contains("signature expired"));
    }

    #[test]
    fn error_kind_as_str() {
        assert_eq!(ErrorKind::InvalidInput.as_str(), "invalid_input");
        assert_eq!(
            ErrorKind::AuthenticationMissing.as_str(),
            "authentication_missing"
        );
        assert_eq!(ErrorKind::UpstreamFailure.as_str(), "upstream_failure");
    }
}
