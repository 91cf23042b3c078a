use crate::bounds::Bounds;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A single position as `[lon, lat]`, matching GeoJSON axis order.
pub type Coord = [f64; 2];

/// Reserved prefix for bookkeeping tags attached to merged components.
/// Renderers can filter on this prefix to separate them from genuine OSM tags.
pub const INTERNAL_TAG_PREFIX: &str = "__meta:";

/// Number of source ways merged into a component.
pub const WAY_COUNT_TAG: &str = "__meta:way_count";

/// Comma-joined source way IDs of a component.
pub const WAY_IDS_TAG: &str = "__meta:way_ids";

/// Returns whether a coordinate chain forms a closed ring.
///
/// A chain is closed iff it has at least three positions and its first and
/// last coordinates are exactly equal. No tolerance is applied; OSM data that
/// shares node IDs produces bit-identical coordinates.
pub fn is_closed(chain: &[Coord]) -> bool {
    chain.len() >= 3 && chain.first() == chain.last()
}

/// Identifier of a normalized geometry: either the original OSM element ID or
/// a string synthesized from the sorted IDs of merged member ways.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum GeometryId {
    Element(u64),
    Synthetic(String),
}

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryId::Element(id) => write!(f, "{id}"),
            GeometryId::Synthetic(id) => write!(f, "{id}"),
        }
    }
}

/// Which kind of raw element a normalized geometry was derived from.
/// `Component` means "synthesized from multiple merged ways".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Way,
    Relation,
    Component,
}

/// GeoJSON-shaped geometry. Serializes directly to a GeoJSON geometry object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    LineString(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    Polygon(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
}

impl Geometry {
    /// Iterates over every position in the geometry, regardless of nesting.
    pub fn coords(&self) -> Box<dyn Iterator<Item = &Coord> + '_> {
        match self {
            Geometry::LineString(line) => Box::new(line.iter()),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                Box::new(lines.iter().flatten())
            }
            Geometry::MultiPolygon(polygons) => Box::new(polygons.iter().flatten().flatten()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }
}

/// A renderable geometry produced by the pipeline.
///
/// Immutable after construction. `bounds` is always derived from
/// `geometry` at construction time and never mutated independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedGeometry {
    pub id: GeometryId,
    pub source_kind: SourceKind,
    /// Contributing way IDs, present only for merged components.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_way_ids: Option<Vec<u64>>,
    pub tags: HashMap<String, String>,
    pub geometry: Geometry,
    pub bounds: Bounds,
}

impl NormalizedGeometry {
    pub fn new(
        id: GeometryId,
        source_kind: SourceKind,
        source_way_ids: Option<Vec<u64>>,
        tags: HashMap<String, String>,
        geometry: Geometry,
    ) -> Result<Self, String> {
        let bounds = Bounds::from_coords(geometry.coords())?;
        Ok(Self {
            id,
            source_kind,
            source_way_ids,
            tags,
            geometry,
            bounds,
        })
    }
}

/// Which OSM element type a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsmType {
    Node,
    Way,
    Relation,
}

/// A non-fatal problem encountered while normalizing elements.
///
/// `osm_type`/`osm_id` are set when the warning is attributable to a single
/// element, so a UI can render a clickable reference; batch-level warnings
/// leave them empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub osm_type: Option<OsmType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub osm_id: Option<u64>,
}

impl Warning {
    /// Warning attributable to a single OSM element.
    pub fn element(message: impl Into<String>, osm_type: OsmType, osm_id: u64) -> Self {
        Self {
            message: message.into(),
            osm_type: Some(osm_type),
            osm_id: Some(osm_id),
        }
    }

    /// Batch-level warning with no single responsible element.
    pub fn batch(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            osm_type: None,
            osm_id: None,
        }
    }
}
