//! Virtual path and container URL resolution.
//!
//! A container is addressed by a URL whose query string carries the
//! shared-access signature. The query is split off once and reattached,
//! unmodified, to every object URL handed back to callers.

use std::fmt;

use url::Url;
use url::form_urlencoded;

use crate::error::{Error, Result};

/// Virtual directory delimiter.
pub const DELIMITER: char = '/';

/// Container URL split into its base and its credential query.
#[derive(Clone, PartialEq, Eq)]
pub struct ContainerUrl {
    base_url: String,
    credential_query: String,
}

impl ContainerUrl {
    /// Splits a credential-bearing container URL at the first `?`.
    ///
    /// Everything before the `?` is the base container URL; everything from
    /// the `?` onward (inclusive) is kept verbatim as the credential query.
    /// Without a `?` the credential query is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`] if the input is blank or is not an
    /// absolute URL with a host.
    ///
    /// [`ErrorKind::InvalidInput`]: crate::ErrorKind::InvalidInput
    pub fn resolve(container_url: &str) -> Result<Self> {
        let container_url = container_url.trim();
        if container_url.is_empty() {
            return Err(Error::invalid_input("container URL is required"));
        }

        let parsed = Url::parse(container_url).map_err(|err| {
            Error::invalid_input(format!("container URL is not a valid URL: {err}"))
                .with_source(err)
        })?;
        if !parsed.has_host() {
            return Err(Error::invalid_input("container URL has no host"));
        }

        let (base_url, credential_query) = match container_url.find('?') {
            Some(idx) => container_url.split_at(idx),
            None => (container_url, ""),
        };

        Ok(Self {
            base_url: base_url.to_owned(),
            credential_query: credential_query.to_owned(),
        })
    }

    /// Returns the container URL without its query string.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the credential query, including its leading `?` (or empty).
    #[must_use]
    pub fn credential_query(&self) -> &str {
        &self.credential_query
    }

    /// Returns the credential query parameters without the leading `?`.
    #[must_use]
    pub fn credential_params(&self) -> &str {
        self.credential_query.trim_start_matches('?')
    }

    /// Returns `true` if a credential query is present.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        !self.credential_params().is_empty()
    }

    /// Returns the credential-bearing container URL.
    #[must_use]
    pub fn listing_url(&self) -> String {
        format!("{}{}", self.base_url, self.credential_query)
    }

    /// Builds the direct URL of an object in this container.
    #[must_use]
    pub fn object_url(&self, object_key: &str) -> String {
        build_object_url(&self.base_url, &self.credential_query, object_key)
    }
}

impl fmt::Debug for ContainerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerUrl")
            .field("base_url", &self.base_url)
            .field("has_credential", &self.has_credential())
            .finish()
    }
}

impl fmt::Display for ContainerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url)
    }
}

/// Normalizes a virtual path into a listing prefix.
///
/// An empty or absent path is the container root (empty prefix). Otherwise
/// leading delimiters are stripped and the result ends with exactly one
/// delimiter.
#[must_use]
pub fn normalize_prefix(virtual_path: Option<&str>) -> String {
    let trimmed = virtual_path
        .unwrap_or_default()
        .trim_start_matches(DELIMITER)
        .trim_end_matches(DELIMITER);

    if trimmed.is_empty() {
        return String::new();
    }

    let mut prefix = String::with_capacity(trimmed.len() + 1);
    prefix.push_str(trimmed);
    prefix.push(DELIMITER);
    prefix
}

/// Builds a fully qualified object URL.
///
/// Each delimiter-separated segment of `object_key` is percent-escaped on its
/// own so that reserved characters inside a segment survive, and the
/// credential query is appended unescaped.
#[must_use]
pub fn build_object_url(base_url: &str, credential_query: &str, object_key: &str) -> String {
    let escaped = object_key
        .split(DELIMITER)
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");

    format!(
        "{}/{}{}",
        base_url.trim_end_matches(DELIMITER),
        escaped,
        credential_query
    )
}

/// Returns the internal navigation URL that lists `virtual_path`.
#[must_use]
pub fn navigation_url(virtual_path: &str) -> String {
    if virtual_path.is_empty() {
        return "/".to_owned();
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("path", virtual_path)
        .finish();
    format!("/?{query}")
}
