//! Session cookie and credential extraction.

use std::fmt;

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use crate::handler::Error;
use crate::service::SessionStore;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "blobnav_session";

/// Session id read from the [`SESSION_COOKIE`] cookie.
///
/// Extracted optionally: a missing or unparsable cookie yields `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Reads the session id from a cookie jar.
    pub fn from_jar(jar: &CookieJar) -> Option<Self> {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| cookie.value().parse().ok())
            .map(Self)
    }

    /// Builds the cookie that carries this session id.
    pub fn cookie(self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, self.0.to_string()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .build()
    }

    /// Builds the cookie that clears the session id.
    pub fn removal_cookie() -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE).path("/").build()
    }
}

impl<S> OptionalFromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Option<Self>, Self::Rejection> {
        Ok(Self::from_jar(&CookieJar::from_headers(&parts.headers)))
    }
}

/// Container SAS URL the caller is authorized to browse.
///
/// Resolved from the caller's session, or from the configured fallback.
/// Rejects with `401 authentication_missing` when neither exists.
#[derive(Clone)]
pub struct Credential(pub String);

impl Credential {
    /// Returns the SAS URL.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(..)")
    }
}

impl<S> FromRequestParts<S> for Credential
where
    SessionStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionStore::from_ref(state);
        let session = SessionId::from_jar(&CookieJar::from_headers(&parts.headers));

        sessions
            .credential(session.as_ref().map(|id| &id.0))
            .await
            .map(Credential)
            .ok_or_else(|| {
                blobnav_core::Error::authentication_missing(
                    "no container SAS URL is set; call /api/blob/setsas first",
                )
                .into()
            })
    }
}
