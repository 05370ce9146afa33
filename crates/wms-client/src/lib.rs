//! Asynchronous WMS GetCapabilities reader.
//!
//! Translates a [`ServerLocator`] into best-effort layer metadata with one
//! HTTP GET per lookup. Every operation is total: network failures, malformed
//! XML, and missing layers are logged and mapped to the documented empty
//! value — they never surface as errors to the caller.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use wms_common::{display_title, LatLngBounds, LayerDescriptor, ServerLocator, StyleEntry};
use wms_protocol::capabilities::{self, ParsedLayer};

/// Errors internal to a capabilities lookup. Mapped to empty values at the
/// public operation boundary.
#[derive(Debug, Error)]
pub enum CapabilitiesError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned HTTP {0}")]
    Status(StatusCode),

    #[error(transparent)]
    Parse(#[from] capabilities::CapabilitiesParseError),
}

/// WMS GetCapabilities client.
///
/// Holds a pooled HTTP client; lookups are otherwise stateless and results
/// are never cached — a later lookup simply supersedes an earlier one.
#[derive(Debug, Clone)]
pub struct CapabilitiesClient {
    http: Client,
}

impl CapabilitiesClient {
    /// Create a client with default timeouts.
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { http })
    }

    /// Wrap an existing HTTP client.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// Human-readable title for the layer.
    ///
    /// When the layer is present but carries no `<Title>`, falls back to the
    /// layer name with underscores replaced by spaces and each word
    /// capitalized. `None` when the layer is absent or the fetch or parse
    /// fails; callers provide their own fallback in that case.
    pub async fn layer_title(&self, locator: &ServerLocator) -> Option<String> {
        let layer = self.fetch_layer(locator).await?;
        Some(
            layer
                .title
                .unwrap_or_else(|| display_title(&locator.layer_name)),
        )
    }

    /// Styles advertised for the layer, in document order.
    ///
    /// Empty when the layer is not found, declares no styles, or the lookup
    /// fails. Never errors.
    pub async fn layer_styles(&self, locator: &ServerLocator) -> Vec<StyleEntry> {
        match self.fetch_layer(locator).await {
            Some(layer) => layer.styles,
            None => Vec::new(),
        }
    }

    /// Geographic bounds of the layer in degrees, via the capabilities
    /// bounding-box fallback chain.
    pub async fn layer_bounds(&self, locator: &ServerLocator) -> Option<LatLngBounds> {
        let layer = self.fetch_layer(locator).await?;
        capabilities::resolve_bounds(&layer)
    }

    /// Fetch the full descriptor in a single capabilities request.
    pub async fn describe_layer(&self, locator: &ServerLocator) -> LayerDescriptor {
        match self.fetch_layer(locator).await {
            Some(layer) => {
                let bounds = capabilities::resolve_bounds(&layer);
                LayerDescriptor {
                    title: Some(
                        layer
                            .title
                            .unwrap_or_else(|| display_title(&locator.layer_name)),
                    ),
                    styles: layer.styles,
                    bounds,
                }
            }
            None => LayerDescriptor::default(),
        }
    }

    async fn fetch_layer(&self, locator: &ServerLocator) -> Option<ParsedLayer> {
        match self.try_fetch_layer(locator).await {
            Ok(Some(layer)) => Some(layer),
            Ok(None) => {
                warn!(
                    layer = %locator.qualified_name(),
                    "layer not present in capabilities document"
                );
                None
            }
            Err(e) => {
                warn!(
                    error = %e,
                    layer = %locator.qualified_name(),
                    "capabilities lookup failed"
                );
                None
            }
        }
    }

    async fn try_fetch_layer(
        &self,
        locator: &ServerLocator,
    ) -> Result<Option<ParsedLayer>, CapabilitiesError> {
        let url = locator.capabilities_url();
        debug!(url = %url, "fetching capabilities");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CapabilitiesError::Status(status));
        }

        let xml = response.text().await?;
        Ok(capabilities::parse_layer(&xml, &locator.qualified_name())?)
    }
}
