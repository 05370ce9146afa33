//! GetLegendGraphic URL formatting.

use wms_common::ServerLocator;

use crate::getmap::encode_component;

/// Legend rendering options sent to GeoServer.
const LEGEND_OPTIONS: &str =
    "fontName:Arial;fontSize:12;fontColor:0x000000;bgColor:0xFFFFFF;dpi:90";

/// Build the GetLegendGraphic request URL for a layer.
///
/// Fixed format: WMS 1.3.0, PNG output, the fully qualified layer name, an
/// optional `STYLE` parameter (only when non-blank), and the fixed legend
/// rendering options. Pure string formatting; no request is issued here.
pub fn legend_url(locator: &ServerLocator, style: Option<&str>) -> String {
    let mut url = format!(
        "{}?SERVICE=WMS&VERSION=1.3.0&REQUEST=GetLegendGraphic&FORMAT=image/png&LAYER={}",
        locator.wms_endpoint(),
        encode_component(&locator.qualified_name()),
    );
    if let Some(style) = style.map(str::trim).filter(|s| !s.is_empty()) {
        url.push_str("&STYLE=");
        url.push_str(&encode_component(style));
    }
    url.push_str("&LEGEND_OPTIONS=");
    url.push_str(LEGEND_OPTIONS);
    url
}
