#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod client;
mod config;
mod error;
mod parse;

pub use crate::client::AzureBlobClient;
pub use crate::config::{AzureClientConfig, DEFAULT_API_VERSION, DEFAULT_TIMEOUT_SECS};
pub use crate::error::{Error, Result, ServiceError};

/// Tracing target for Azure Blob client operations.
pub const TRACING_TARGET: &str = "blobnav_azure::client";
