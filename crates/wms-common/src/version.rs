//! WMS protocol version selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// WMS protocol versions the viewer speaks.
///
/// The version decides the name of the coordinate-system query parameter:
/// 1.3.0 calls it `CRS`, 1.1.0 calls it `SRS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WmsVersion {
    /// WMS 1.1.0 (SRS parameter)
    V1_1_0,
    /// WMS 1.3.0 (CRS parameter)
    V1_3_0,
}

impl WmsVersion {
    /// Pick the protocol version for a configured coordinate system.
    ///
    /// Standard "EPSG:" identifiers select 1.3.0; anything else (including
    /// malformed identifiers) falls into the 1.1.0 branch. Chosen once per
    /// configuration and held fixed for the layer's lifetime.
    pub fn for_crs(crs: &str) -> Self {
        if crs.starts_with("EPSG:") {
            WmsVersion::V1_3_0
        } else {
            WmsVersion::V1_1_0
        }
    }

    /// The VERSION query parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            WmsVersion::V1_1_0 => "1.1.0",
            WmsVersion::V1_3_0 => "1.3.0",
        }
    }

    /// Name of the coordinate-system query parameter for this version.
    pub fn crs_param_name(&self) -> &'static str {
        match self {
            WmsVersion::V1_1_0 => "SRS",
            WmsVersion::V1_3_0 => "CRS",
        }
    }
}

impl fmt::Display for WmsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
