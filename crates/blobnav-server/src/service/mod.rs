//! Application state and dependency injection.

mod config;
mod session;

use blobnav_azure::AzureBlobClient;
use blobnav_core::engine::ListingEngine;

pub use crate::service::config::ServiceConfig;
pub use crate::service::session::{DEFAULT_SESSION_TTL, SessionStore};
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone, Debug)]
pub struct ServiceState {
    engine: ListingEngine,
    sessions: SessionStore,
}

impl ServiceState {
    /// Assembles state from an engine and a session store.
    pub fn new(engine: ListingEngine, sessions: SessionStore) -> Self {
        Self { engine, sessions }
    }

    /// Initializes application state from configuration.
    ///
    /// Creates the Azure Blob client and the session store.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let client = AzureBlobClient::new(config.azure.clone())?;

        let mut sessions = SessionStore::new(config.session_ttl());
        if let Some(sas_url) = config.container_sas_url() {
            sessions = sessions.with_fallback(sas_url);
        }

        Ok(Self::new(ListingEngine::new(client), sessions))
    }

    /// Returns the listing engine.
    pub fn engine(&self) -> &ListingEngine {
        &self.engine
    }

    /// Returns the session store.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(engine: ListingEngine);
impl_di!(sessions: SessionStore);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_with_fallback() {
        let config = ServiceConfig::default().with_container_sas_url("https://h/c?sig=x");
        let state = ServiceState::from_config(&config).unwrap();
        assert!(state.sessions().has_fallback());
        assert_eq!(state.sessions().ttl(), DEFAULT_SESSION_TTL);
    }

    #[test]
    fn from_config_rejects_invalid_client_config() {
        let mut config = ServiceConfig::default();
        config.azure.timeout = 0;
        let err = ServiceState::from_config(&config).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Config);
    }
}
