use crate::area_classifier::is_area;
use crate::coalesce::complexity::ComplexityError;
use crate::coalesce::{coalesce_open_ways, CoalesceError, OpenWay};
use crate::geometry::{
    is_closed, Geometry, GeometryId, NormalizedGeometry, OsmType, SourceKind, Warning,
};
use crate::osm_parser::RawElement;
use crate::relation_parser::{parse_multipolygon, parse_route};
use itertools::Itertools;
use log::debug;
use std::collections::BTreeMap;

/// Options for a pipeline invocation.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Partition open ways by this tag's value before coalescing. Grouped
    /// mode skips the complexity guard: choosing a grouping tag is the
    /// user's explicit admission that they expect dense connectivity.
    pub group_by_tag: Option<String>,
}

/// Result of a pipeline invocation: renderable geometries plus every
/// recoverable problem encountered along the way.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub geometries: Vec<NormalizedGeometry>,
    pub warnings: Vec<Warning>,
}

/// Normalizes raw Overpass elements into renderable geometries.
///
/// Per-element problems are always recovered locally and surfaced in
/// `warnings`; the only condition that aborts the whole call is the
/// network-density guard ([`ComplexityError`]).
pub fn parse_elements(
    elements: &[RawElement],
    options: &ParseOptions,
) -> Result<ParseOutcome, ComplexityError> {
    let mut outcome = ParseOutcome::default();
    let mut open_ways: Vec<OpenWay> = Vec::new();

    for element in elements {
        match element.r#type.as_str() {
            "node" => {
                outcome.warnings.push(Warning::element(
                    format!("Node {} skipped: nodes carry no renderable shape", element.id),
                    OsmType::Node,
                    element.id,
                ));
            }
            "way" => classify_way(element, &mut outcome, &mut open_ways),
            "relation" => classify_relation(element, &mut outcome),
            other => {
                outcome.warnings.push(Warning::batch(format!(
                    "Unknown element type \"{other}\" (id {}) skipped",
                    element.id
                )));
            }
        }
    }

    debug!(
        "classified {} elements: {} direct geometries, {} open ways",
        elements.len(),
        outcome.geometries.len(),
        open_ways.len()
    );

    match &options.group_by_tag {
        Some(tag) => {
            // Deterministic group order; ways without the tag share the
            // empty-string group.
            let mut groups: BTreeMap<String, Vec<OpenWay>> = BTreeMap::new();
            for way in open_ways {
                let key = way.tags.get(tag).cloned().unwrap_or_default();
                groups.entry(key).or_default().push(way);
            }
            for group in groups.into_values() {
                coalesce_into(&group, false, &mut outcome)?;
            }
        }
        None => coalesce_into(&open_ways, true, &mut outcome)?,
    }

    Ok(outcome)
}

/// Classifies a single way: dropped (no geometry), standalone area polygon,
/// or deferred into the open-ways batch.
fn classify_way(element: &RawElement, outcome: &mut ParseOutcome, open_ways: &mut Vec<OpenWay>) {
    let coords = element.coords().unwrap_or_default();
    if coords.is_empty() {
        outcome.warnings.push(Warning::element(
            format!("Way {} has no geometry", element.id),
            OsmType::Way,
            element.id,
        ));
        return;
    }

    if is_closed(&coords) && is_area(&element.tags) {
        // Closed area ways stay standalone polygons; they never enter the
        // merge pipeline.
        match NormalizedGeometry::new(
            GeometryId::Element(element.id),
            SourceKind::Way,
            None,
            element.tags.clone(),
            Geometry::Polygon(vec![coords]),
        ) {
            Ok(polygon) => outcome.geometries.push(polygon),
            Err(e) => outcome.warnings.push(Warning::element(
                format!("Way {}: {e}", element.id),
                OsmType::Way,
                element.id,
            )),
        }
        return;
    }

    open_ways.push(OpenWay {
        id: element.id,
        tags: element.tags.clone(),
        coords,
    });
}

fn classify_relation(element: &RawElement, outcome: &mut ParseOutcome) {
    match element.tag("type") {
        Some("route") => {
            if let Some(route) = parse_route(element, &mut outcome.warnings) {
                outcome.geometries.push(route);
            }
        }
        Some("multipolygon") => {
            if let Some(multipolygon) = parse_multipolygon(element, &mut outcome.warnings) {
                outcome.geometries.push(multipolygon);
            }
        }
        other => {
            outcome.warnings.push(Warning::element(
                format!(
                    "Relation {} skipped: unsupported type {}",
                    element.id,
                    other.map_or_else(|| "<missing>".to_string(), |t| format!("\"{t}\""))
                ),
                OsmType::Relation,
                element.id,
            ));
        }
    }
}

/// Runs one coalescing batch, degrading to unmerged per-way line strings on
/// any failure other than the complexity guard.
fn coalesce_into(
    ways: &[OpenWay],
    enforce_complexity: bool,
    outcome: &mut ParseOutcome,
) -> Result<(), ComplexityError> {
    match coalesce_open_ways(ways, enforce_complexity) {
        Ok(geometries) => {
            outcome.geometries.extend(geometries);
            Ok(())
        }
        Err(CoalesceError::TooComplex(err)) => Err(err),
        Err(CoalesceError::Failed(reason)) => {
            outcome.warnings.push(Warning::batch(format!(
                "Failed to coalesce {} way(s) ({}): {reason}; emitting them unmerged",
                ways.len(),
                ways.iter().map(|w| w.id).join(", ")
            )));

            for way in ways {
                match NormalizedGeometry::new(
                    GeometryId::Element(way.id),
                    SourceKind::Way,
                    None,
                    way.tags.clone(),
                    Geometry::LineString(way.coords.clone()),
                ) {
                    Ok(line) => outcome.geometries.push(line),
                    Err(e) => outcome.warnings.push(Warning::element(
                        format!("Way {}: {e}", way.id),
                        OsmType::Way,
                        way.id,
                    )),
                }
            }
            Ok(())
        }
    }
}
