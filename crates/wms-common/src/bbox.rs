//! Bounding box types and coordinate conversions.

use serde::{Deserialize, Serialize};

/// Half the extent of the Web Mercator projection plane, in meters.
///
/// GeoServer advertises EPSG:3857 layer extents against this value; the
/// degree conversion below uses it as the 180° mark.
pub const WEB_MERCATOR_HALF_EXTENT: f64 = 20_037_508.34;

/// A raw bounding box in the units of its declaring CRS.
///
/// For geographic CRS (EPSG:4326), coordinates are in degrees.
/// For projected CRS (EPSG:3857, etc.), coordinates are in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True when all four corners are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }

    /// Format as the WMS BBOX query value: "minx,miny,maxx,maxy".
    pub fn to_wms_string(&self) -> String {
        format!("{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Interpret the box as degrees with y = latitude, x = longitude.
    pub fn to_lat_lng(&self) -> LatLngBounds {
        LatLngBounds {
            south: self.min_y,
            west: self.min_x,
            north: self.max_y,
            east: self.max_x,
        }
    }

    /// Convert a Web Mercator (EPSG:3857) box to degrees.
    ///
    /// Linear scaling against the projection half-extent: the full extent
    /// maps onto ±180° longitude and ±90° latitude, so converted bounds
    /// always stay inside the valid geographic range.
    pub fn mercator_to_lat_lng(&self) -> LatLngBounds {
        let to_lng = |meters: f64| meters / WEB_MERCATOR_HALF_EXTENT * 180.0;
        let to_lat = |meters: f64| meters / WEB_MERCATOR_HALF_EXTENT * 90.0;
        LatLngBounds {
            south: to_lat(self.min_y),
            west: to_lng(self.min_x),
            north: to_lat(self.max_y),
            east: to_lng(self.max_x),
        }
    }
}

/// Geographic bounds in degrees: south/west/north/east.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl LatLngBounds {
    /// Create bounds from corner latitudes and longitudes.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// True when all four bounds are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.south.is_finite()
            && self.west.is_finite()
            && self.north.is_finite()
            && self.east.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wms_string() {
        let bbox = BoundingBox::new(-125.0, 24.0, -66.0, 50.0);
        assert_eq!(bbox.to_wms_string(), "-125,24,-66,50");
    }

    #[test]
    fn test_to_lat_lng_axis_order() {
        let bbox = BoundingBox::new(-17.5, 12.3, -11.3, 16.7);
        let bounds = bbox.to_lat_lng();
        assert_eq!(bounds.west, -17.5);
        assert_eq!(bounds.south, 12.3);
        assert_eq!(bounds.east, -11.3);
        assert_eq!(bounds.north, 16.7);
    }

    #[test]
    fn test_mercator_conversion() {
        let bbox = BoundingBox::new(0.0, 0.0, WEB_MERCATOR_HALF_EXTENT, WEB_MERCATOR_HALF_EXTENT);
        let bounds = bbox.mercator_to_lat_lng();
        assert!((bounds.west - 0.0).abs() < 1e-9);
        assert!((bounds.south - 0.0).abs() < 1e-9);
        assert!((bounds.east - 180.0).abs() < 1e-9);
        assert!((bounds.north - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_is_finite() {
        assert!(BoundingBox::new(0.0, 0.0, 1.0, 1.0).is_finite());
        assert!(!BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0).is_finite());
        assert!(!BoundingBox::new(0.0, f64::INFINITY, 1.0, 1.0).is_finite());
    }
}
