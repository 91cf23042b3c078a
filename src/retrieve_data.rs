use crate::args::QueryBBox;
use crate::osm_parser::OsmData;
use rand::seq::SliceRandom;
use reqwest::blocking::{Client, ClientBuilder};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

// Fetching raw elements is an application-layer concern; the core pipeline
// only ever sees the already-resolved element array.

/// Public Overpass API mirrors, picked at random to spread load.
const API_SERVERS: [&str; 3] = [
    "https://overpass-api.de/api/interpreter",
    "https://lz4.overpass-api.de/api/interpreter",
    "https://z.overpass-api.de/api/interpreter",
];

/// Generates the default Overpass QL query for a bounding box: every tagged
/// way and every route/multipolygon relation, with inline geometry.
pub fn build_query(bbox: QueryBBox, timeout: Duration) -> String {
    format!(
        r#"[out:json][timeout:{}][bbox:{},{},{},{}];
(
  way[~"."~"."];
  relation["type"="multipolygon"];
  relation["type"="route"];
);
out geom;"#,
        timeout.as_secs(),
        bbox.min_lat,
        bbox.min_lng,
        bbox.max_lat,
        bbox.max_lng,
    )
}

/// Downloads and deserializes an Overpass response for `query`.
pub fn fetch_data_from_overpass(
    query: &str,
    timeout: Duration,
) -> Result<OsmData, Box<dyn std::error::Error>> {
    let url = API_SERVERS
        .choose(&mut rand::thread_rng())
        .expect("server list is non-empty");

    let client: Client = ClientBuilder::new().timeout(timeout).build()?;
    let response = client.post(*url).form(&[("data", query)]).send()?;

    if !response.status().is_success() {
        return Err(format!("Overpass returned status {}", response.status()).into());
    }

    let data: OsmData = response.json()?;
    Ok(data)
}

/// Loads a pre-downloaded Overpass JSON response from disk.
pub fn fetch_data_from_file(path: &str) -> Result<OsmData, Box<dyn std::error::Error>> {
    let file: File = File::open(path)?;
    let reader: BufReader<File> = BufReader::new(file);
    let mut deserializer = serde_json::Deserializer::from_reader(reader);
    let data: OsmData = OsmData::deserialize(&mut deserializer)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_build_query_embeds_bbox_and_timeout() {
        let bbox = QueryBBox::new(54.627053, 9.927928, 54.634902, 9.937563).unwrap();
        let query = build_query(bbox, Duration::from_secs(90));
        assert!(query.contains("[timeout:90]"));
        assert!(query.contains("[bbox:54.627053,9.927928,54.634902,9.937563]"));
        assert!(query.contains("out geom;"));
    }

    #[test]
    fn test_fetch_data_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"elements": [{{"type": "way", "id": 1,
                "geometry": [{{"lat": 1.0, "lon": 2.0}}, {{"lat": 3.0, "lon": 4.0}}]}}]}}"#
        )
        .unwrap();

        let data = fetch_data_from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(data.elements.len(), 1);
        assert_eq!(data.elements[0].id, 1);
    }

    #[test]
    fn test_fetch_data_from_missing_file() {
        assert!(fetch_data_from_file("/nonexistent/osm.json").is_err());
    }
}
