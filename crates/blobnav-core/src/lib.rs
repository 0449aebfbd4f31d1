#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod backend;
pub mod engine;
mod error;
pub mod path;
pub mod types;

#[doc(hidden)]
pub mod prelude;

pub use crate::error::{BoxedError, Error, ErrorKind, Result};

/// Tracing target for listing and search operations.
pub const TRACING_TARGET_ENGINE: &str = "blobnav_core::engine";

/// Tracing target for backend enumeration.
pub const TRACING_TARGET_BACKEND: &str = "blobnav_core::backend";
