//! Identification of a single layer on a single server.

use serde::{Deserialize, Serialize};

/// Identifies one layer in one workspace on one GeoServer instance.
///
/// Immutable per request; callers supply a fresh value for every lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerLocator {
    /// Server base URL, e.g. "https://example.org/geoserver".
    pub base_url: String,

    /// Workspace containing the layer.
    pub workspace: String,

    /// Layer name within the workspace.
    pub layer_name: String,
}

impl ServerLocator {
    /// Create a locator. A trailing slash on the base URL is dropped so the
    /// endpoint paths below concatenate cleanly.
    pub fn new(
        base_url: impl Into<String>,
        workspace: impl Into<String>,
        layer_name: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            workspace: workspace.into(),
            layer_name: layer_name.into(),
        }
    }

    /// Fully qualified layer name: "workspace:layer".
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.workspace, self.layer_name)
    }

    /// WMS endpoint for this server.
    pub fn wms_endpoint(&self) -> String {
        format!("{}/wms", self.base_url)
    }

    /// GetCapabilities request URL.
    pub fn capabilities_url(&self) -> String {
        format!(
            "{}/wms?SERVICE=WMS&VERSION=1.3.0&REQUEST=GetCapabilities",
            self.base_url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name() {
        let locator = ServerLocator::new("https://example.org/geoserver", "senegal", "carbon");
        assert_eq!(locator.qualified_name(), "senegal:carbon");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let locator = ServerLocator::new("https://example.org/geoserver/", "topp", "states");
        assert_eq!(locator.wms_endpoint(), "https://example.org/geoserver/wms");
    }

    #[test]
    fn test_capabilities_url() {
        let locator = ServerLocator::new("http://localhost:8080/geoserver", "topp", "states");
        assert_eq!(
            locator.capabilities_url(),
            "http://localhost:8080/geoserver/wms?SERVICE=WMS&VERSION=1.3.0&REQUEST=GetCapabilities"
        );
    }
}
