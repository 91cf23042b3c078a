use std::collections::HashMap;

// Tag heuristics deciding whether a closed way is a filled region or a
// linear feature that merely loops (e.g. a circular path). Mirrors the
// conventions used by iD and other OSM renderers.

/// Presence of any of these keys marks an area outright.
const AREA_TAG_KEYS: [&str; 9] = [
    "building",
    "landuse",
    "amenity",
    "shop",
    "building:part",
    "boundary",
    "historic",
    "place",
    "area:highway",
];

/// Highway values that are areas despite `highway` normally being linear.
const AREA_HIGHWAY_VALUES: [&str; 3] = ["rest_area", "services", "platform"];

/// Leisure features that are point/line-like; every other leisure is an area.
const NON_AREA_LEISURE_VALUES: [&str; 3] = ["picnic_table", "slipway", "firepit"];

/// Natural features that form filled regions.
const AREA_NATURAL_VALUES: [&str; 18] = [
    "water",
    "wood",
    "scrub",
    "land",
    "grassland",
    "heath",
    "rock",
    "bare_rock",
    "sand",
    "beach",
    "scree",
    "glacier",
    "shingle",
    "fell",
    "reef",
    "stone",
    "mud",
    "landslide",
];

/// Decides whether a closed way with these tags represents a filled area.
///
/// Pure and total: rules are applied in order, first match wins, and an
/// explicit `area=yes`/`area=no` overrides every heuristic. Untagged ways
/// are treated as linear.
pub fn is_area(tags: &HashMap<String, String>) -> bool {
    match tags.get("area").map(String::as_str) {
        Some("yes") => return true,
        Some("no") => return false,
        _ => {}
    }

    if AREA_TAG_KEYS.iter().any(|key| tags.contains_key(*key)) {
        return true;
    }

    if let Some(highway) = tags.get("highway") {
        if AREA_HIGHWAY_VALUES.contains(&highway.as_str()) {
            return true;
        }
    }

    if tags.get("railway").map(String::as_str) == Some("platform") {
        return true;
    }

    if tags.get("aeroway").map(String::as_str) == Some("aerodrome") {
        return true;
    }

    if let Some(leisure) = tags.get("leisure") {
        if !NON_AREA_LEISURE_VALUES.contains(&leisure.as_str()) {
            return true;
        }
    }

    if let Some(natural) = tags.get("natural") {
        if AREA_NATURAL_VALUES.contains(&natural.as_str()) {
            return true;
        }
    }

    false
}
