//! Request extractors with API-shaped rejections.
//!
//! - [`Json`] and [`Query`] wrap the axum extractors and reject with the
//!   HTTP [`Error`] instead of plain-text bodies.
//! - [`SessionId`] reads the session cookie; [`Credential`] resolves the
//!   caller's container SAS URL through the [`SessionStore`].
//!
//! [`Error`]: crate::handler::Error
//! [`SessionStore`]: crate::service::SessionStore

mod credential;
mod json;
mod query;

pub use crate::extract::credential::{Credential, SESSION_COOKIE, SessionId};
pub use crate::extract::json::Json;
pub use crate::extract::query::Query;
