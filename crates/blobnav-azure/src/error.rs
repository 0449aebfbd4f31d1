//! Error types for the Azure Blob client.

use std::fmt;

use thiserror::Error;

/// Result type alias for Azure Blob client operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error response returned by the storage service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// HTTP status code.
    pub status: u16,
    /// Value of the `x-ms-error-code` header (or the body's `<Code>`).
    pub code: Option<String>,
    /// First line of the body's `<Message>`.
    pub message: Option<String>,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code} (HTTP {})", self.status)?,
            None => write!(f, "HTTP {}", self.status)?,
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

/// Error type for Azure Blob client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure. The request URL is stripped before wrapping.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Non-success response from the storage service.
    #[error("{0}")]
    Service(ServiceError),
    /// Malformed XML in the response body.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    /// A listing field that could not be interpreted.
    #[error("invalid {field} in listing: {value:?}")]
    InvalidField {
        /// Element name.
        field: &'static str,
        /// Raw element text.
        value: String,
    },
    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns the HTTP status of a service error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service(service) => Some(service.status),
            Self::Reqwest(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}

impl From<Error> for blobnav_core::Error {
    fn from(err: Error) -> Self {
        let message = match &err {
            Error::Reqwest(e) if e.is_timeout() => "storage request timed out".to_owned(),
            Error::Reqwest(e) if e.is_connect() => "could not connect to storage service".to_owned(),
            Error::Service(service) => service.to_string(),
            other => other.to_string(),
        };
        blobnav_core::Error::upstream(message).with_source(err)
    }
}
