//! Configuration for the Azure Blob client.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Storage service REST version sent in `x-ms-version`.
pub const DEFAULT_API_VERSION: &str = "2021-08-06";

/// Default timeout for a single List Blobs request, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`AzureBlobClient`].
///
/// [`AzureBlobClient`]: crate::AzureBlobClient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct AzureClientConfig {
    /// REST API version sent with every request.
    #[cfg_attr(
        feature = "config",
        arg(long = "azure-api-version", env = "AZURE_API_VERSION", default_value = DEFAULT_API_VERSION)
    )]
    pub api_version: String,

    /// Timeout in seconds for a single storage request.
    #[cfg_attr(
        feature = "config",
        arg(long = "upstream-timeout", env = "UPSTREAM_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)
    )]
    pub timeout: u64,

    /// User-Agent header sent with every request.
    #[cfg_attr(feature = "config", arg(skip = default_user_agent()))]
    pub user_agent: String,
}

impl Default for AzureClientConfig {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_owned(),
            timeout: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("blobnav/{}", env!("CARGO_PKG_VERSION"))
}

impl AzureClientConfig {
    /// Sets the REST API version.
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Sets the request timeout in seconds.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = secs;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the request timeout as a Duration.
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.timeout == 0 {
            return Err(Error::Config("timeout cannot be zero".into()));
        }
        if self.api_version.trim().is_empty() {
            return Err(Error::Config("api_version cannot be empty".into()));
        }
        if self.user_agent.is_empty() {
            return Err(Error::Config("user_agent cannot be empty".into()));
        }
        Ok(())
    }
}
