use crate::geometry::{Coord, Geometry, GeometryId, NormalizedGeometry, OsmType, SourceKind, Warning};
use crate::osm_parser::{RawElement, RawLatLon, RawMember};
use crate::ring_merger::merge_into_rings;
use log::debug;

/// Routes with more than this many way members get a performance warning.
const ROUTE_MEMBER_WARN_LIMIT: usize = 100;

fn member_coords(member: &RawMember) -> Option<Vec<Coord>> {
    member
        .geometry
        .as_ref()
        .map(|points| points.iter().map(RawLatLon::lonlat).collect())
}

/// Interprets a `type=multipolygon` relation as a filled region with holes.
///
/// Outer and inner member rings are merged independently. Failure to close
/// the outer boundary rejects the relation with a warning; inner rings are
/// best-effort and silently dropped when they fail to merge (favoring
/// permissive rendering over strictness for broken OSM data).
pub fn parse_multipolygon(
    relation: &RawElement,
    warnings: &mut Vec<Warning>,
) -> Option<NormalizedGeometry> {
    let mut outer_chains: Vec<Vec<Coord>> = Vec::new();
    let mut inner_chains: Vec<Vec<Coord>> = Vec::new();

    for member in &relation.members {
        if member.r#type != "way" {
            continue;
        }
        let Some(coords) = member_coords(member) else {
            continue;
        };
        // Bbox clipping can leave a present-but-empty geometry array
        if coords.is_empty() {
            continue;
        }
        match member.role.as_str() {
            "outer" => outer_chains.push(coords),
            "inner" => inner_chains.push(coords),
            _ => {}
        }
    }

    if outer_chains.is_empty() && inner_chains.is_empty() {
        warnings.push(Warning::element(
            format!("Multipolygon relation {} has no members with geometry", relation.id),
            OsmType::Relation,
            relation.id,
        ));
        return None;
    }

    if outer_chains.is_empty() {
        warnings.push(Warning::element(
            format!("Multipolygon relation {} has no outer ways", relation.id),
            OsmType::Relation,
            relation.id,
        ));
        return None;
    }

    let outer_rings = merge_into_rings(outer_chains);
    if outer_rings.is_empty() {
        warnings.push(Warning::element(
            format!(
                "Multipolygon relation {}: outer ways do not form closed rings",
                relation.id
            ),
            OsmType::Relation,
            relation.id,
        ));
        return None;
    }

    let had_inners = !inner_chains.is_empty();
    let inner_rings = merge_into_rings(inner_chains);
    if had_inners && inner_rings.is_empty() {
        // Holes are best-effort, never fatal
        debug!(
            "multipolygon relation {}: dropping unmergeable inner rings",
            relation.id
        );
    }

    // Every outer ring gets all inner rings as holes. With multiple outer
    // rings this over-assigns holes (no containment matching is done);
    // known-lossy and kept as-is.
    let polygons: Vec<Vec<Vec<Coord>>> = outer_rings
        .into_iter()
        .map(|outer| {
            let mut polygon = vec![outer];
            polygon.extend(inner_rings.iter().cloned());
            polygon
        })
        .collect();

    NormalizedGeometry::new(
        GeometryId::Element(relation.id),
        SourceKind::Relation,
        None,
        relation.tags.clone(),
        Geometry::MultiPolygon(polygons),
    )
    .map_err(|e| {
        warnings.push(Warning::element(
            format!("Multipolygon relation {}: {e}", relation.id),
            OsmType::Relation,
            relation.id,
        ));
    })
    .ok()
}

/// Interprets a `type=route` relation as an ordered multi-line.
///
/// Member order is significant and trusted: chains are emitted exactly as
/// given, with no reconnection. A best-effort continuity check surfaces
/// gaps as a warning but never blocks the route.
pub fn parse_route(
    relation: &RawElement,
    warnings: &mut Vec<Warning>,
) -> Option<NormalizedGeometry> {
    let way_member_count = relation
        .members
        .iter()
        .filter(|member| member.r#type == "way")
        .count();
    let chains: Vec<Vec<Coord>> = relation
        .members
        .iter()
        .filter(|member| member.r#type == "way")
        .filter_map(member_coords)
        .filter(|coords| !coords.is_empty())
        .collect();

    if chains.is_empty() {
        warnings.push(Warning::element(
            format!("Route relation {} has no way members with geometry", relation.id),
            OsmType::Relation,
            relation.id,
        ));
        return None;
    }

    // Counted before the geometry filter; bare members still cost a lookup
    // downstream and the warning reflects the relation as mapped.
    if way_member_count > ROUTE_MEMBER_WARN_LIMIT {
        warnings.push(Warning::element(
            format!(
                "Route relation {} has {way_member_count} way members; rendering may be slow",
                relation.id
            ),
            OsmType::Relation,
            relation.id,
        ));
    }

    let gaps = count_gaps(&chains);
    if gaps > 0 {
        warnings.push(Warning::element(
            format!(
                "Route relation {} has {gaps} gap(s) between consecutive way members",
                relation.id
            ),
            OsmType::Relation,
            relation.id,
        ));
    }

    NormalizedGeometry::new(
        GeometryId::Element(relation.id),
        SourceKind::Relation,
        None,
        relation.tags.clone(),
        Geometry::MultiLineString(chains),
    )
    .map_err(|e| {
        warnings.push(Warning::element(
            format!("Route relation {}: {e}", relation.id),
            OsmType::Relation,
            relation.id,
        ));
    })
    .ok()
}

/// Counts consecutive member pairs whose endpoints do not touch. Each
/// chain's end should meet the next chain's start or end.
fn count_gaps(chains: &[Vec<Coord>]) -> usize {
    chains
        .windows(2)
        .filter(|pair| {
            let tail = pair[0].last();
            let next_first = pair[1].first();
            let next_last = pair[1].last();
            tail != next_first && tail != next_last
        })
        .count()
}
