//! OGC WMS protocol plumbing for the layer viewer.
//!
//! Pure functions over text, no I/O:
//! - GetCapabilities XML parsing (layer title, styles, bounding boxes)
//! - GetMap tile URL construction and rewriting
//! - GetLegendGraphic URL formatting

pub mod capabilities;
pub mod getmap;
pub mod legend;

pub use capabilities::{
    parse_layer, resolve_bounds, CapabilitiesParseError, CrsBoundingBox, ParsedLayer,
};
pub use getmap::{getmap_url, rewrite_tile_url, tile_bounds, TileParams};
pub use legend::legend_url;
