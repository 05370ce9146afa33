//! Layer metadata extracted from a capabilities document.

use serde::{Deserialize, Serialize};

use crate::LatLngBounds;

/// A named style advertised for a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleEntry {
    /// Style name, used in GetMap/GetLegendGraphic requests.
    pub name: String,

    /// Human-readable title. Falls back to the name when the server
    /// declares none.
    pub title: String,
}

/// Best-effort metadata for one layer.
///
/// Every field has a documented fallback; the descriptor is recomputed on
/// each lookup and never cached.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerDescriptor {
    /// Layer title, when the layer was found in the capabilities document.
    pub title: Option<String>,

    /// Advertised styles in document order. Empty when the layer is missing
    /// or declares none.
    pub styles: Vec<StyleEntry>,

    /// Geographic bounds in degrees, when any bounding box could be resolved.
    pub bounds: Option<LatLngBounds>,
}

/// Human-readable fallback title for a layer missing its `<Title>`:
/// underscores become spaces and each word's first letter is capitalized.
pub fn display_title(layer_name: &str) -> String {
    layer_name
        .split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
