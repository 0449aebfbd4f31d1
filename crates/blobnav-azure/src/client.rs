//! List Blobs client.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use blobnav_core::backend::{BlobEnumerator, Segment, SegmentRequest};
use blobnav_core::path::ContainerUrl;
use reqwest::Client;

use crate::TRACING_TARGET;
use crate::config::AzureClientConfig;
use crate::error::{Error, Result, ServiceError};
use crate::parse::{parse_enumeration, parse_error_body};

/// Header carrying the REST API version.
const API_VERSION_HEADER: &str = "x-ms-version";

/// Header carrying the service's error code.
const ERROR_CODE_HEADER: &str = "x-ms-error-code";

/// Inner client that holds the HTTP client and configuration.
struct AzureBlobClientInner {
    http: Client,
    config: AzureClientConfig,
}

/// Azure Blob Storage client implementing [`BlobEnumerator`].
///
/// Cloning is cheap; clones share one connection pool.
///
/// # Examples
///
/// ```rust,ignore
/// use blobnav_azure::{AzureBlobClient, AzureClientConfig};
/// use blobnav_core::engine::ListingEngine;
///
/// let client = AzureBlobClient::new(AzureClientConfig::default())?;
/// let engine = ListingEngine::new(client);
/// let page = engine.list_directory(sas_url, Some("photos/"), None, 50).await?;
/// ```
#[derive(Clone)]
pub struct AzureBlobClient {
    inner: Arc<AzureBlobClientInner>,
}

impl std::fmt::Debug for AzureBlobClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureBlobClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl AzureBlobClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: AzureClientConfig) -> Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET,
            timeout_secs = config.timeout,
            api_version = %config.api_version,
            "Creating Azure Blob client"
        );

        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build()?;

        let inner = AzureBlobClientInner { http, config };
        let client = Self {
            inner: Arc::new(inner),
        };

        tracing::info!(
            target: TRACING_TARGET,
            "Azure Blob client created successfully"
        );

        Ok(client)
    }

    /// Creates a new client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(AzureClientConfig::default())
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &AzureClientConfig {
        &self.inner.config
    }

    async fn fetch_segment(
        &self,
        container: &ContainerUrl,
        request: &SegmentRequest,
    ) -> Result<Segment> {
        let started_at = Instant::now();
        let url = list_blobs_url(container, request);

        tracing::debug!(
            target: TRACING_TARGET,
            container = %container,
            prefix = ?request.prefix,
            grouped = request.is_grouped(),
            has_marker = request.marker.is_some(),
            max_results = request.max_results,
            "Listing blobs"
        );

        let response = self
            .inner
            .http
            .get(url)
            .header(API_VERSION_HEADER, &self.inner.config.api_version)
            .send()
            .await
            .map_err(|err| Error::Reqwest(err.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let header_code = response
                .headers()
                .get(ERROR_CODE_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let body = response.text().await.unwrap_or_default();
            let (body_code, message) = parse_error_body(&body);

            let error = ServiceError {
                status: status.as_u16(),
                code: header_code.or(body_code),
                message,
            };

            tracing::warn!(
                target: TRACING_TARGET,
                container = %container,
                status = error.status,
                code = ?error.code,
                elapsed_ms = started_at.elapsed().as_millis(),
                "Storage service rejected List Blobs"
            );

            return Err(Error::Service(error));
        }

        let body = response
            .text()
            .await
            .map_err(|err| Error::Reqwest(err.without_url()))?;
        let segment = parse_enumeration(&body)?;

        tracing::debug!(
            target: TRACING_TARGET,
            container = %container,
            records = segment.records.len(),
            has_next = segment.next_marker.is_some(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "Listed blobs"
        );

        Ok(segment)
    }
}

#[async_trait]
impl BlobEnumerator for AzureBlobClient {
    async fn list_segment(
        &self,
        container: &ContainerUrl,
        request: &SegmentRequest,
    ) -> blobnav_core::Result<Segment> {
        Ok(self.fetch_segment(container, request).await?)
    }
}

/// Builds the List Blobs request URL for one segment.
///
/// The container's credential parameters are appended verbatim after the
/// operation parameters.
fn list_blobs_url(container: &ContainerUrl, request: &SegmentRequest) -> String {
    let mut url = format!(
        "{}?restype=container&comp=list",
        container.base_url().trim_end_matches('/')
    );

    if let Some(prefix) = &request.prefix {
        url.push_str("&prefix=");
        url.push_str(&urlencoding::encode(prefix));
    }
    if let Some(delimiter) = request.delimiter {
        url.push_str("&delimiter=");
        url.push_str(&urlencoding::encode(delimiter.encode_utf8(&mut [0; 4])));
    }
    if let Some(marker) = &request.marker {
        url.push_str("&marker=");
        url.push_str(&urlencoding::encode(marker.as_str()));
    }
    url.push_str(&format!("&maxresults={}", request.max_results));

    if container.has_credential() {
        url.push('&');
        url.push_str(container.credential_params());
    }

    url
}
