//! GetCapabilities XML parsing.
//!
//! Locates one `<Layer>` by its qualified name and extracts the metadata the
//! viewer needs — title, styles, and bounding boxes — in a single pass over
//! the document. Missing elements become absent values, never errors; only
//! malformed XML is reported as an error.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use wms_common::{BoundingBox, LatLngBounds, StyleEntry};

/// Malformed capabilities XML.
#[derive(Debug, Error)]
#[error("malformed capabilities XML at byte {position}: {source}")]
pub struct CapabilitiesParseError {
    position: usize,
    #[source]
    source: quick_xml::Error,
}

/// Everything extracted from the target `<Layer>` element.
///
/// Bounding boxes keep their declared CRS so the fallback chain in
/// [`resolve_bounds`] can pick among them.
#[derive(Debug, Clone, Default)]
pub struct ParsedLayer {
    /// Trimmed `<Title>` text, when present and non-empty.
    pub title: Option<String>,

    /// `<Style>` children in document order. Styles without a `<Name>` are
    /// skipped; a missing `<Title>` falls back to the name.
    pub styles: Vec<StyleEntry>,

    /// `<EX_GeographicBoundingBox>`, already in degrees.
    pub geographic_bounds: Option<LatLngBounds>,

    /// `<BoundingBox>` elements that parsed to four finite numbers.
    pub bounding_boxes: Vec<CrsBoundingBox>,
}

/// A `<BoundingBox>` element together with its declared CRS (or SRS).
#[derive(Debug, Clone)]
pub struct CrsBoundingBox {
    /// Value of the CRS attribute, falling back to SRS, else empty.
    pub crs: String,
    pub bbox: BoundingBox,
}

/// Which leaf element's text is currently being collected.
enum Capture {
    CandidateName,
    LayerTitle,
    StyleName,
    StyleTitle,
    GeoWest,
    GeoEast,
    GeoSouth,
    GeoNorth,
}

#[derive(Default)]
struct StyleBuilder {
    name: Option<String>,
    title: Option<String>,
}

#[derive(Default)]
struct GeoBoundsBuilder {
    west: Option<f64>,
    east: Option<f64>,
    south: Option<f64>,
    north: Option<f64>,
}

/// Find the layer whose direct `<Name>` equals `qualified_name` (exact,
/// case-sensitive, first match wins) and extract its metadata.
///
/// Returns `Ok(None)` when no layer in the document matches. Metadata of
/// nested child layers is not attributed to the target.
pub fn parse_layer(
    xml: &str,
    qualified_name: &str,
) -> Result<Option<ParsedLayer>, CapabilitiesParseError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    // Stack of open element local names; parent lookups drive the captures.
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut in_target = false;
    let mut nested_layers = 0u32;

    let mut layer = ParsedLayer::default();
    let mut capture: Option<Capture> = None;
    let mut text = String::new();
    let mut style: Option<StyleBuilder> = None;
    let mut geo: Option<GeoBoundsBuilder> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| xml_error(&reader, e))?;
        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                let parent = path.last().map(|p| p.as_slice());
                let parent_is_layer = parent == Some(b"Layer".as_slice());
                let parent_is_style = parent == Some(b"Style".as_slice());

                if name == b"Layer" {
                    if in_target {
                        nested_layers += 1;
                    }
                } else if in_target && nested_layers == 0 {
                    match name.as_slice() {
                        b"Title" if parent_is_layer => {
                            capture = begin(&mut text, Capture::LayerTitle);
                        }
                        b"Style" => style = Some(StyleBuilder::default()),
                        b"Name" if parent_is_style => {
                            capture = begin(&mut text, Capture::StyleName);
                        }
                        b"Title" if parent_is_style => {
                            capture = begin(&mut text, Capture::StyleTitle);
                        }
                        b"EX_GeographicBoundingBox" if layer.geographic_bounds.is_none() => {
                            geo = Some(GeoBoundsBuilder::default());
                        }
                        b"westBoundLongitude" if geo.is_some() => {
                            capture = begin(&mut text, Capture::GeoWest);
                        }
                        b"eastBoundLongitude" if geo.is_some() => {
                            capture = begin(&mut text, Capture::GeoEast);
                        }
                        b"southBoundLatitude" if geo.is_some() => {
                            capture = begin(&mut text, Capture::GeoSouth);
                        }
                        b"northBoundLatitude" if geo.is_some() => {
                            capture = begin(&mut text, Capture::GeoNorth);
                        }
                        b"BoundingBox" => {
                            if let Some(bbox) = bounding_box_from(&e) {
                                layer.bounding_boxes.push(bbox);
                            }
                        }
                        _ => {}
                    }
                } else if !in_target && name == b"Name" && parent_is_layer {
                    capture = begin(&mut text, Capture::CandidateName);
                }

                path.push(name);
            }
            Event::Empty(e) => {
                if in_target && nested_layers == 0 && e.local_name().as_ref() == b"BoundingBox" {
                    if let Some(bbox) = bounding_box_from(&e) {
                        layer.bounding_boxes.push(bbox);
                    }
                }
            }
            Event::Text(t) => {
                if capture.is_some() {
                    let chunk = t
                        .unescape()
                        .map_err(|e| xml_error(&reader, e.into()))?;
                    text.push_str(&chunk);
                }
            }
            Event::End(e) => {
                path.pop();
                let name = e.local_name();

                match name.as_ref() {
                    b"Layer" => {
                        if in_target {
                            if nested_layers == 0 {
                                return Ok(Some(layer));
                            }
                            nested_layers -= 1;
                        }
                    }
                    b"Name" => match capture.take() {
                        Some(Capture::CandidateName) => {
                            if text.trim() == qualified_name {
                                in_target = true;
                            }
                        }
                        Some(Capture::StyleName) => {
                            if let Some(s) = style.as_mut() {
                                s.name = non_empty(&text);
                            }
                        }
                        _ => {}
                    },
                    b"Title" => match capture.take() {
                        Some(Capture::LayerTitle) => layer.title = non_empty(&text),
                        Some(Capture::StyleTitle) => {
                            if let Some(s) = style.as_mut() {
                                s.title = non_empty(&text);
                            }
                        }
                        _ => {}
                    },
                    b"Style" => {
                        if let Some(s) = style.take() {
                            if let Some(name) = s.name {
                                let title = s.title.unwrap_or_else(|| name.clone());
                                layer.styles.push(StyleEntry { name, title });
                            }
                        }
                    }
                    b"EX_GeographicBoundingBox" => {
                        if let Some(g) = geo.take() {
                            if let (Some(west), Some(east), Some(south), Some(north)) =
                                (g.west, g.east, g.south, g.north)
                            {
                                if layer.geographic_bounds.is_none() {
                                    layer.geographic_bounds =
                                        Some(LatLngBounds::new(south, west, north, east));
                                }
                            }
                        }
                    }
                    b"westBoundLongitude" | b"eastBoundLongitude" | b"southBoundLatitude"
                    | b"northBoundLatitude" => {
                        if let Some(g) = geo.as_mut() {
                            let value = parse_finite(&text);
                            match capture.take() {
                                Some(Capture::GeoWest) => g.west = value,
                                Some(Capture::GeoEast) => g.east = value,
                                Some(Capture::GeoSouth) => g.south = value,
                                Some(Capture::GeoNorth) => g.north = value,
                                _ => {}
                            }
                        }
                    }
                    _ => {
                        capture = None;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(None)
}

/// Apply the bounds fallback chain to a parsed layer, first success wins:
/// the geographic bounding box, then the first box declaring an EPSG:4326
/// CRS (y = latitude, x = longitude), then the first box of any CRS
/// (converted from meters when it declares EPSG:3857, otherwise its raw
/// values are taken as degrees).
pub fn resolve_bounds(layer: &ParsedLayer) -> Option<LatLngBounds> {
    if let Some(bounds) = layer.geographic_bounds {
        return Some(bounds);
    }

    if let Some(b) = layer.bounding_boxes.iter().find(|b| b.crs.contains("4326")) {
        return Some(b.bbox.to_lat_lng());
    }

    let first = layer.bounding_boxes.first()?;
    if first.crs.contains("3857") {
        Some(first.bbox.mercator_to_lat_lng())
    } else {
        Some(first.bbox.to_lat_lng())
    }
}

fn begin(text: &mut String, capture: Capture) -> Option<Capture> {
    text.clear();
    Some(capture)
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Read a `<BoundingBox>` element's attributes. The CRS attribute wins over
/// SRS when both are present; boxes that do not parse to four finite numbers
/// are dropped so the fallback chain moves on.
fn bounding_box_from(e: &BytesStart) -> Option<CrsBoundingBox> {
    let mut crs_attr = None;
    let mut srs_attr = None;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (None, None, None, None);

    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.as_ref() {
            b"CRS" => crs_attr = Some(value),
            b"SRS" => srs_attr = Some(value),
            b"minx" => min_x = parse_finite(&value),
            b"miny" => min_y = parse_finite(&value),
            b"maxx" => max_x = parse_finite(&value),
            b"maxy" => max_y = parse_finite(&value),
            _ => {}
        }
    }

    Some(CrsBoundingBox {
        crs: crs_attr.or(srs_attr).unwrap_or_default(),
        bbox: BoundingBox::new(min_x?, min_y?, max_x?, max_y?),
    })
}

fn xml_error(reader: &Reader<&[u8]>, source: quick_xml::Error) -> CapabilitiesParseError {
    CapabilitiesParseError {
        position: reader.buffer_position(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPABILITIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WMS_Capabilities version="1.3.0">
  <Capability>
    <Layer>
      <Title>GeoServer Web Map Service</Title>
      <Layer queryable="1">
        <Name>senegal:carbon_pred</Name>
        <Title>Carbon Prediction</Title>
        <EX_GeographicBoundingBox>
          <westBoundLongitude>-17.5</westBoundLongitude>
          <eastBoundLongitude>-11.3</eastBoundLongitude>
          <southBoundLatitude>12.3</southBoundLatitude>
          <northBoundLatitude>16.7</northBoundLatitude>
        </EX_GeographicBoundingBox>
        <BoundingBox CRS="CRS:84" minx="-17.5" miny="12.3" maxx="-11.3" maxy="16.7"/>
        <BoundingBox CRS="EPSG:4326" minx="-17.5" miny="12.3" maxx="-11.3" maxy="16.7"/>
        <Style>
          <Name>raster</Name>
          <Title>Default Raster</Title>
        </Style>
        <Style>
          <Name>carbon_ramp</Name>
        </Style>
      </Layer>
      <Layer queryable="1">
        <Name>topp:states</Name>
        <Title>USA Population</Title>
      </Layer>
    </Layer>
  </Capability>
</WMS_Capabilities>"#;

    #[test]
    fn test_finds_layer_by_qualified_name() {
        let layer = parse_layer(CAPABILITIES, "senegal:carbon_pred")
            .unwrap()
            .unwrap();
        assert_eq!(layer.title.as_deref(), Some("Carbon Prediction"));
    }

    #[test]
    fn test_absent_layer_is_none() {
        let layer = parse_layer(CAPABILITIES, "senegal:missing").unwrap();
        assert!(layer.is_none());
    }

    #[test]
    fn test_styles_in_document_order_with_title_fallback() {
        let layer = parse_layer(CAPABILITIES, "senegal:carbon_pred")
            .unwrap()
            .unwrap();
        assert_eq!(layer.styles.len(), 2);
        assert_eq!(layer.styles[0].name, "raster");
        assert_eq!(layer.styles[0].title, "Default Raster");
        assert_eq!(layer.styles[1].name, "carbon_ramp");
        assert_eq!(layer.styles[1].title, "carbon_ramp");
    }

    #[test]
    fn test_nameless_style_skipped() {
        let xml = r#"<Layer>
            <Name>ws:layer</Name>
            <Style><Title>No name here</Title></Style>
            <Style><Name>good</Name></Style>
        </Layer>"#;
        let layer = parse_layer(xml, "ws:layer").unwrap().unwrap();
        assert_eq!(layer.styles.len(), 1);
        assert_eq!(layer.styles[0].name, "good");
    }

    #[test]
    fn test_geographic_bounds_win_over_bounding_boxes() {
        let layer = parse_layer(CAPABILITIES, "senegal:carbon_pred")
            .unwrap()
            .unwrap();
        let bounds = resolve_bounds(&layer).unwrap();
        assert_eq!(bounds.west, -17.5);
        assert_eq!(bounds.east, -11.3);
        assert_eq!(bounds.south, 12.3);
        assert_eq!(bounds.north, 16.7);
    }

    #[test]
    fn test_4326_box_axis_order() {
        // No geographic box: the EPSG:4326 BoundingBox is used, with
        // x = longitude and y = latitude in the attribute values.
        let xml = r#"<Layer>
            <Name>ws:layer</Name>
            <BoundingBox CRS="EPSG:26913" minx="500000" miny="4000000" maxx="600000" maxy="4100000"/>
            <BoundingBox CRS="EPSG:4326" minx="-17.5" miny="12.3" maxx="-11.3" maxy="16.7"/>
        </Layer>"#;
        let layer = parse_layer(xml, "ws:layer").unwrap().unwrap();
        let bounds = resolve_bounds(&layer).unwrap();
        assert_eq!(bounds.west, -17.5);
        assert_eq!(bounds.south, 12.3);
        assert_eq!(bounds.east, -11.3);
        assert_eq!(bounds.north, 16.7);
    }

    #[test]
    fn test_mercator_box_converted_to_degrees() {
        let xml = r#"<Layer>
            <Name>ws:layer</Name>
            <BoundingBox CRS="EPSG:3857" minx="0" miny="0" maxx="20037508.34" maxy="20037508.34"/>
        </Layer>"#;
        let layer = parse_layer(xml, "ws:layer").unwrap().unwrap();
        let bounds = resolve_bounds(&layer).unwrap();
        assert!((bounds.west - 0.0).abs() < 1e-9);
        assert!((bounds.south - 0.0).abs() < 1e-9);
        assert!((bounds.east - 180.0).abs() < 1e-6);
        assert!((bounds.north - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_crs_box_used_as_degrees() {
        let xml = r#"<Layer>
            <Name>ws:layer</Name>
            <BoundingBox SRS="EPSG:2154" minx="-5.1" miny="41.3" maxx="9.6" maxy="51.1"/>
        </Layer>"#;
        let layer = parse_layer(xml, "ws:layer").unwrap().unwrap();
        let bounds = resolve_bounds(&layer).unwrap();
        assert_eq!(bounds.west, -5.1);
        assert_eq!(bounds.south, 41.3);
    }

    #[test]
    fn test_non_numeric_box_dropped() {
        let xml = r#"<Layer>
            <Name>ws:layer</Name>
            <BoundingBox CRS="EPSG:4326" minx="bogus" miny="12.3" maxx="-11.3" maxy="16.7"/>
        </Layer>"#;
        let layer = parse_layer(xml, "ws:layer").unwrap().unwrap();
        assert!(layer.bounding_boxes.is_empty());
        assert!(resolve_bounds(&layer).is_none());
    }

    #[test]
    fn test_incomplete_geographic_box_ignored() {
        let xml = r#"<Layer>
            <Name>ws:layer</Name>
            <EX_GeographicBoundingBox>
              <westBoundLongitude>-17.5</westBoundLongitude>
              <eastBoundLongitude>not-a-number</eastBoundLongitude>
              <southBoundLatitude>12.3</southBoundLatitude>
              <northBoundLatitude>16.7</northBoundLatitude>
            </EX_GeographicBoundingBox>
            <BoundingBox CRS="EPSG:4326" minx="-17.5" miny="12.3" maxx="-11.3" maxy="16.7"/>
        </Layer>"#;
        let layer = parse_layer(xml, "ws:layer").unwrap().unwrap();
        assert!(layer.geographic_bounds.is_none());
        // Falls through to the 4326 box.
        let bounds = resolve_bounds(&layer).unwrap();
        assert_eq!(bounds.west, -17.5);
    }

    #[test]
    fn test_nested_child_layer_not_attributed_to_parent() {
        let xml = r#"<Layer>
            <Name>ws:parent</Name>
            <Title>Parent</Title>
            <Layer>
              <Name>ws:child</Name>
              <Title>Child</Title>
              <Style><Name>child_style</Name></Style>
            </Layer>
        </Layer>"#;
        let layer = parse_layer(xml, "ws:parent").unwrap().unwrap();
        assert_eq!(layer.title.as_deref(), Some("Parent"));
        assert!(layer.styles.is_empty());

        let child = parse_layer(xml, "ws:child").unwrap().unwrap();
        assert_eq!(child.title.as_deref(), Some("Child"));
        assert_eq!(child.styles.len(), 1);
    }

    #[test]
    fn test_layer_without_title() {
        let xml = "<Layer><Name>ws:untitled</Name></Layer>";
        let layer = parse_layer(xml, "ws:untitled").unwrap().unwrap();
        assert!(layer.title.is_none());
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let result = parse_layer("<Layer><Name>ws:x</Title></Layer>", "ws:x");
        assert!(result.is_err());
    }

    #[test]
    fn test_escaped_title_text() {
        let xml = "<Layer><Name>ws:amp</Name><Title>Rivers &amp; Lakes</Title></Layer>";
        let layer = parse_layer(xml, "ws:amp").unwrap().unwrap();
        assert_eq!(layer.title.as_deref(), Some("Rivers & Lakes"));
    }
}
