//! Server-side credential sessions.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::{self, Instant, MissedTickBehavior};
use uuid::Uuid;

/// Tracing target for session operations.
const TRACING_TARGET: &str = "blobnav_server::service::session";

/// Default idle lifetime of a session: 20 minutes.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(20 * 60);

struct SessionEntry {
    sas_url: String,
    touched: Instant,
}

/// In-process store mapping session ids to container SAS URLs.
///
/// Sessions expire after `ttl` without use; every successful lookup renews
/// the idle timer. An optional fallback SAS URL is returned for callers
/// without a live session. Cloning shares the underlying map.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    fallback: Option<Arc<str>>,
    ttl: Duration,
}

impl SessionStore {
    /// Creates an empty store with the given idle lifetime.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            fallback: None,
            ttl,
        }
    }

    /// Sets the SAS URL used when a caller has no session.
    pub fn with_fallback(mut self, sas_url: impl Into<Arc<str>>) -> Self {
        self.fallback = Some(sas_url.into());
        self
    }

    /// Returns the idle lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns `true` if a fallback SAS URL is configured.
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Stores `sas_url` under `session`, or under a fresh id when `session`
    /// is absent or unknown. Returns the id the URL was stored under.
    pub async fn store(&self, session: Option<Uuid>, sas_url: String) -> Uuid {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.evict_expired(&mut sessions, now);

        let id = session
            .filter(|id| sessions.contains_key(id))
            .unwrap_or_else(Uuid::new_v4);
        sessions.insert(
            id,
            SessionEntry {
                sas_url,
                touched: now,
            },
        );

        tracing::debug!(
            target: TRACING_TARGET,
            session_id = %id,
            active = sessions.len(),
            "Stored container credential"
        );

        id
    }

    /// Returns the SAS URL of a live session, renewing its idle timer.
    pub async fn get(&self, session: &Uuid) -> Option<String> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let entry = sessions.get_mut(session)?;
        if now.duration_since(entry.touched) < self.ttl {
            entry.touched = now;
            return Some(entry.sas_url.clone());
        }

        sessions.remove(session);
        tracing::debug!(
            target: TRACING_TARGET,
            session_id = %session,
            "Session expired"
        );
        None
    }

    /// Returns the credential for a request: the session's SAS URL when the
    /// session is live, otherwise the fallback.
    pub async fn credential(&self, session: Option<&Uuid>) -> Option<String> {
        if let Some(session) = session
            && let Some(sas_url) = self.get(session).await
        {
            return Some(sas_url);
        }
        self.fallback.as_deref().map(str::to_owned)
    }

    /// Removes a session. Returns `true` if it existed.
    pub async fn remove(&self, session: &Uuid) -> bool {
        self.sessions.write().await.remove(session).is_some()
    }

    /// Drops every expired session. Returns the number removed.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.evict_expired(&mut sessions, Instant::now())
    }

    /// Purges expired sessions every `period`, forever.
    ///
    /// The first sweep runs one `period` after the call. Spawn once at
    /// startup; the loop holds a clone of the store.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub async fn purge_periodically(self, period: Duration) {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let purged = self.purge_expired().await;
            if purged > 0 {
                let remaining = self.len().await;
                tracing::debug!(
                    target: TRACING_TARGET,
                    purged,
                    remaining,
                    "purged expired sessions"
                );
            }
        }
    }

    /// Returns the number of stored sessions, including expired ones not yet
    /// purged.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn evict_expired(&self, sessions: &mut HashMap<Uuid, SessionEntry>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.touched) < self.ttl);
        before - sessions.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("ttl", &self.ttl)
            .field("has_fallback", &self.has_fallback())
            .finish_non_exhaustive()
    }
}
