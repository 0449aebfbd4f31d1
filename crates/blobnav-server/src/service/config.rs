use std::time::Duration;

use blobnav_azure::AzureClientConfig;
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default values for configuration options.
mod defaults {
    /// Default idle session lifetime in seconds.
    pub const SESSION_TTL_SECS: u64 = 20 * 60;
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Idle lifetime of a credential session in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long = "session-ttl", env = "SESSION_TTL", default_value_t = defaults::SESSION_TTL_SECS)
    )]
    pub session_ttl: u64,

    /// Container SAS URL used when the caller has not set one.
    #[cfg_attr(
        feature = "config",
        arg(long = "container-sas-url", env = "CONTAINER_SAS_URL", hide_env_values = true)
    )]
    pub container_sas_url: Option<String>,

    /// Storage client settings.
    #[cfg_attr(feature = "config", command(flatten))]
    pub azure: AzureClientConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            session_ttl: defaults::SESSION_TTL_SECS,
            container_sas_url: None,
            azure: AzureClientConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Returns the session idle lifetime as a Duration.
    #[inline]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl)
    }

    /// Returns the configured default SAS URL, ignoring blank values.
    pub fn container_sas_url(&self) -> Option<&str> {
        self.container_sas_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Sets the default container SAS URL.
    pub fn with_container_sas_url(mut self, sas_url: impl Into<String>) -> Self {
        self.container_sas_url = Some(sas_url.into());
        self
    }
}
