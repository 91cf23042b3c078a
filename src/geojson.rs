use crate::element_pipeline::ParseOutcome;
use crate::geometry::NormalizedGeometry;
use serde_json::{json, Map, Value};

/// Converts a pipeline outcome into a GeoJSON FeatureCollection.
///
/// OSM tags (including the reserved-prefix bookkeeping keys) become feature
/// properties; geometry identity and provenance ride along as foreign
/// members on each feature.
pub fn to_feature_collection(outcome: &ParseOutcome) -> Value {
    let features: Vec<Value> = outcome.geometries.iter().map(to_feature).collect();
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

fn to_feature(geometry: &NormalizedGeometry) -> Value {
    let mut properties = Map::new();
    for (key, value) in &geometry.tags {
        properties.insert(key.clone(), Value::String(value.clone()));
    }

    let mut feature = Map::new();
    feature.insert("type".to_string(), Value::String("Feature".to_string()));
    feature.insert("id".to_string(), json!(geometry.id));
    feature.insert("source_kind".to_string(), json!(geometry.source_kind));
    if let Some(way_ids) = &geometry.source_way_ids {
        feature.insert("source_way_ids".to_string(), json!(way_ids));
    }
    feature.insert("bbox".to_string(), json!([
        geometry.bounds.min_lon,
        geometry.bounds.min_lat,
        geometry.bounds.max_lon,
        geometry.bounds.max_lat,
    ]));
    feature.insert("properties".to_string(), Value::Object(properties));
    feature.insert("geometry".to_string(), json!(geometry.geometry));

    Value::Object(feature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element_pipeline::{parse_elements, ParseOptions};
    use crate::osm_parser::parse_raw_osm_data;
    use serde_json::json;

    #[test]
    fn test_feature_collection_shape() {
        let data = parse_raw_osm_data(json!({
            "elements": [{
                "type": "way", "id": 42, "tags": {"building": "yes", "name": "Kirche"},
                "geometry": [
                    {"lat": 0.0, "lon": 0.0}, {"lat": 0.0, "lon": 1.0},
                    {"lat": 1.0, "lon": 1.0}, {"lat": 0.0, "lon": 0.0}
                ]
            }]
        }))
        .unwrap();
        let outcome = parse_elements(&data.elements, &ParseOptions::default()).unwrap();

        let collection = to_feature_collection(&outcome);
        assert_eq!(collection["type"], "FeatureCollection");

        let feature = &collection["features"][0];
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["id"], 42);
        assert_eq!(feature["source_kind"], "way");
        assert_eq!(feature["properties"]["name"], "Kirche");
        assert_eq!(feature["geometry"]["type"], "Polygon");
        assert_eq!(feature["bbox"][2], 1.0);
    }
}
