use crate::geometry::Coord;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

// Raw data from an Overpass API `out geom;` response.

/// A single position as delivered by Overpass.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RawLatLon {
    pub lat: f64,
    pub lon: f64,
}

impl RawLatLon {
    /// GeoJSON axis order.
    pub fn lonlat(&self) -> Coord {
        [self.lon, self.lat]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMember {
    pub r#type: String,
    #[serde(default)]
    pub r#ref: u64,
    #[serde(default)]
    pub role: String,
    /// Present for way members when the query used `out geom`.
    pub geometry: Option<Vec<RawLatLon>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawElement {
    pub r#type: String,
    pub id: u64,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    /// Way geometry; nodes and relations leave this empty.
    pub geometry: Option<Vec<RawLatLon>>,
    #[serde(default)]
    pub members: Vec<RawMember>,
    // Node position; kept only so node elements deserialize cleanly.
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl RawElement {
    /// The way's coordinate chain in `[lon, lat]` order, if any.
    pub fn coords(&self) -> Option<Vec<Coord>> {
        self.geometry
            .as_ref()
            .map(|points| points.iter().map(RawLatLon::lonlat).collect())
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

#[derive(Debug, Deserialize)]
pub struct OsmData {
    pub elements: Vec<RawElement>,
}

/// Deserializes a raw Overpass JSON document into elements.
pub fn parse_raw_osm_data(json_data: Value) -> Result<OsmData, serde_json::Error> {
    serde_json::from_value(json_data)
}
