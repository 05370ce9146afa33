//! GetMap tile request construction and rewriting.
//!
//! A generic WMS tile layer produces a templated GetMap URL per tile; the
//! rewrite step forces the configured coordinate system and style onto that
//! URL, replacing whatever the template carried. The rewrite runs once per
//! visible tile, so it stays a single pass over the query string with one
//! output allocation.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use wms_common::{BoundingBox, WmsVersion};

/// Characters left unescaped in query component values, matching
/// `encodeURIComponent`: alphanumerics plus `- _ . ! ~ * ' ( )`.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a query parameter value.
pub(crate) fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, QUERY_COMPONENT).to_string()
}

/// Display configuration for one WMS tile layer.
#[derive(Debug, Clone)]
pub struct TileParams {
    /// Fully qualified layer name, "workspace:layer".
    pub layer: String,

    /// Configured coordinate system identifier, e.g. "EPSG:3857".
    pub crs: String,

    /// Style name; blank or absent means the server default.
    pub style: Option<String>,

    /// Image format for GetMap requests.
    pub format: String,

    /// Request transparent tiles.
    pub transparent: bool,

    /// Protocol version, derived from the CRS prefix.
    pub version: WmsVersion,
}

impl TileParams {
    /// Build tile parameters, deriving the protocol version from the CRS.
    pub fn new(layer: impl Into<String>, crs: impl Into<String>, style: Option<String>) -> Self {
        let crs = crs.into();
        let version = WmsVersion::for_crs(&crs);
        Self {
            layer: layer.into(),
            crs,
            style,
            format: "image/png".to_string(),
            transparent: true,
            version,
        }
    }

    /// The configured style, trimmed, when non-blank.
    pub fn effective_style(&self) -> Option<&str> {
        self.style
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Force the configured coordinate system and style onto a templated tile URL.
///
/// Ensures exactly one occurrence of the version-appropriate CRS/SRS
/// parameter and, when a non-blank style is configured, exactly one `STYLES`
/// parameter. Existing occurrences are replaced in place (name match is
/// case-insensitive), so applying the rewrite twice yields the same URL as
/// applying it once.
pub fn rewrite_tile_url(url: &str, params: &TileParams) -> String {
    let rewritten = set_query_param(
        url,
        params.version.crs_param_name(),
        &encode_component(&params.crs),
    );
    match params.effective_style() {
        Some(style) => set_query_param(&rewritten, "STYLES", &encode_component(style)),
        None => rewritten,
    }
}

/// Build the templated GetMap URL for one tile, mirroring the default
/// parameter set a generic WMS tile layer sends. The bounding box is passed
/// through in the axis order of the request CRS.
pub fn getmap_url(
    endpoint: &str,
    params: &TileParams,
    bbox: &BoundingBox,
    width: u32,
    height: u32,
) -> String {
    format!(
        "{}?SERVICE=WMS&REQUEST=GetMap&VERSION={}&FORMAT={}&TRANSPARENT={}&LAYERS={}&STYLES={}&WIDTH={}&HEIGHT={}&{}={}&BBOX={}",
        endpoint,
        params.version.as_str(),
        encode_component(&params.format),
        params.transparent,
        encode_component(&params.layer),
        encode_component(params.effective_style().unwrap_or("")),
        width,
        height,
        params.version.crs_param_name(),
        encode_component(&params.crs),
        bbox.to_wms_string(),
    )
}

/// Web Mercator (EPSG:3857) bounds of an XYZ tile.
pub fn tile_bounds(z: u32, x: u32, y: u32) -> BoundingBox {
    let max_extent = 20_037_508.342_789_244_f64;
    let tiles = (1u64 << z) as f64;
    let span = 2.0 * max_extent / tiles;
    let min_x = -max_extent + x as f64 * span;
    let max_y = max_extent - y as f64 * span;
    BoundingBox::new(min_x, max_y - span, min_x + span, max_y)
}

/// Ensure `url` carries exactly one `name=value` query parameter.
///
/// The first existing occurrence (name matched case-insensitively) is
/// replaced keeping its position, further occurrences are dropped, and the
/// parameter is appended when absent. `encoded_value` must already be
/// percent-encoded.
fn set_query_param(url: &str, name: &str, encoded_value: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        let mut out = String::with_capacity(url.len() + name.len() + encoded_value.len() + 2);
        out.push_str(url);
        out.push('?');
        out.push_str(name);
        out.push('=');
        out.push_str(encoded_value);
        return out;
    };

    let mut out = String::with_capacity(url.len() + name.len() + encoded_value.len() + 2);
    out.push_str(base);
    out.push('?');

    let query_start = out.len();
    let mut replaced = false;
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let key = pair.split_once('=').map(|(k, _)| k).unwrap_or(pair);
        if key.eq_ignore_ascii_case(name) {
            if replaced {
                continue;
            }
            push_pair(&mut out, query_start, name, encoded_value);
            replaced = true;
        } else {
            if out.len() > query_start {
                out.push('&');
            }
            out.push_str(pair);
        }
    }

    if !replaced {
        push_pair(&mut out, query_start, name, encoded_value);
    }

    out
}

fn push_pair(out: &mut String, query_start: usize, name: &str, encoded_value: &str) {
    if out.len() > query_start {
        out.push('&');
    }
    out.push_str(name);
    out.push('=');
    out.push_str(encoded_value);
}
