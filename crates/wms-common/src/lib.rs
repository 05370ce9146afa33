//! Common types shared across the GeoServer layer viewer crates.

pub mod bbox;
pub mod layer;
pub mod locator;
pub mod version;

pub use bbox::{BoundingBox, LatLngBounds};
pub use layer::{display_title, LayerDescriptor, StyleEntry};
pub use locator::ServerLocator;
pub use version::WmsVersion;
