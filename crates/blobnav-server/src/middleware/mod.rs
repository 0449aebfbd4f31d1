//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Recovery: handler panics, request timeouts and tower service errors
//!   become API-shaped error responses.
//! - Observability: request ids, per-request spans with cookies redacted,
//!   and a completion log line with timing.
//!
//! ```rust,no_run
//! use blobnav_server::handler::routes;
//! use blobnav_server::middleware::{RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt};
//!
//! let app = routes()
//!     .with_recovery(&RecoveryConfig::default())
//!     .with_observability();
//! ```

mod observability;
mod recovery;

pub use observability::{RouterObservabilityExt, log_request};
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
