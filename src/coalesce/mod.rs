pub mod complexity;
pub mod components;
pub mod endpoint_graph;
pub mod path_order;

use crate::geometry::{
    Geometry, GeometryId, NormalizedGeometry, SourceKind, WAY_COUNT_TAG, WAY_IDS_TAG,
};
use complexity::{check_complexity, ComplexityError};
use components::find_components;
use endpoint_graph::EndpointGraph;
use fnv::FnvHashMap;
use itertools::Itertools;
use log::debug;
use path_order::order_component;
use std::collections::HashMap;

/// A way deferred into the coalescing batch: open, or closed but not
/// area-tagged. Closed area ways never reach this module.
#[derive(Debug, Clone)]
pub struct OpenWay {
    pub id: u64,
    pub tags: HashMap<String, String>,
    pub coords: Vec<crate::geometry::Coord>,
}

/// Why a coalescing run could not produce merged components.
#[derive(Debug)]
pub enum CoalesceError {
    /// The input tripped the network-density guard. Fatal to the whole
    /// pipeline call; never degraded to a warning.
    TooComplex(ComplexityError),
    /// Anything else. The pipeline degrades to per-way line strings.
    Failed(String),
}

impl From<ComplexityError> for CoalesceError {
    fn from(err: ComplexityError) -> Self {
        CoalesceError::TooComplex(err)
    }
}

/// Merges a batch of open ways into component geometries.
///
/// Builds the endpoint graph, optionally runs the complexity guard (grouped
/// mode turns it off: choosing a grouping tag is the user's admission that
/// they expect dense connectivity), finds connected components and
/// linearizes each into chains.
pub fn coalesce_open_ways(
    ways: &[OpenWay],
    enforce_complexity: bool,
) -> Result<Vec<NormalizedGeometry>, CoalesceError> {
    if ways.is_empty() {
        return Ok(Vec::new());
    }

    let graph = EndpointGraph::build(ways);
    if enforce_complexity {
        check_complexity(&graph, ways.len())?;
    }

    let lookup: FnvHashMap<u64, &OpenWay> = ways.iter().map(|w| (w.id, w)).collect();
    let components = find_components(ways, &graph);
    debug!(
        "coalesced {} ways into {} components",
        ways.len(),
        components.len()
    );

    let mut geometries = Vec::with_capacity(components.len());
    for component in components {
        let chains = order_component(&component, &lookup, &graph);
        geometries.push(assemble_component(&component, &lookup, chains)?);
    }

    Ok(geometries)
}

/// Builds the final geometry for one component.
///
/// Single-way components stay standalone line strings under their original
/// way identity; merged components get a synthetic ID derived from sorted
/// member way IDs and aggregated tags.
fn assemble_component(
    component: &[u64],
    lookup: &FnvHashMap<u64, &OpenWay>,
    mut chains: Vec<Vec<crate::geometry::Coord>>,
) -> Result<NormalizedGeometry, CoalesceError> {
    if component.len() == 1 {
        let way = lookup
            .get(&component[0])
            .ok_or_else(|| CoalesceError::Failed(format!("Way {} missing from batch", component[0])))?;
        return NormalizedGeometry::new(
            GeometryId::Element(way.id),
            SourceKind::Way,
            None,
            way.tags.clone(),
            Geometry::LineString(way.coords.clone()),
        )
        .map_err(CoalesceError::Failed);
    }

    let geometry = if chains.len() == 1 {
        Geometry::LineString(chains.remove(0))
    } else {
        Geometry::MultiLineString(chains)
    };

    NormalizedGeometry::new(
        synthetic_id(component),
        SourceKind::Component,
        Some(component.to_vec()),
        aggregate_tags(component, lookup),
        geometry,
    )
    .map_err(CoalesceError::Failed)
}

/// Deterministic ID for a merged component: a pure function of the member
/// way IDs (sorted, de-duplicated), so repeated runs on identical input
/// produce identical IDs.
fn synthetic_id(component: &[u64]) -> GeometryId {
    let sorted: Vec<u64> = component.iter().copied().sorted_unstable().dedup().collect();
    GeometryId::Synthetic(format!("component-{}", sorted.iter().join("-")))
}

/// Tags for a merged component: taken from the first member carrying a
/// `name` tag (or the first member outright), plus reserved-prefix
/// bookkeeping keys recording provenance.
fn aggregate_tags(
    component: &[u64],
    lookup: &FnvHashMap<u64, &OpenWay>,
) -> HashMap<String, String> {
    let members: Vec<&&OpenWay> = component.iter().filter_map(|id| lookup.get(id)).collect();

    let mut tags = members
        .iter()
        .find(|way| way.tags.contains_key("name"))
        .or(members.first())
        .map(|way| way.tags.clone())
        .unwrap_or_default();

    tags.insert(WAY_COUNT_TAG.to_string(), component.len().to_string());
    tags.insert(WAY_IDS_TAG.to_string(), component.iter().join(","));
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::INTERNAL_TAG_PREFIX;

    fn way(id: u64, coords: Vec<[f64; 2]>) -> OpenWay {
        OpenWay {
            id,
            tags: HashMap::new(),
            coords,
        }
    }

    fn tagged_way(id: u64, coords: Vec<[f64; 2]>, pairs: &[(&str, &str)]) -> OpenWay {
        OpenWay {
            id,
            tags: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            coords,
        }
    }

    #[test]
    fn test_empty_batch() {
        assert!(coalesce_open_ways(&[], true).unwrap().is_empty());
    }

    #[test]
    fn test_two_connected_ways_merge_to_linestring() {
        let ways = vec![
            way(1, vec![[0.0, 0.0], [1.0, 1.0]]),
            way(2, vec![[1.0, 1.0], [2.0, 2.0]]),
        ];
        let geometries = coalesce_open_ways(&ways, true).unwrap();
        assert_eq!(geometries.len(), 1);

        let merged = &geometries[0];
        assert_eq!(merged.source_kind, SourceKind::Component);
        assert_eq!(merged.id, GeometryId::Synthetic("component-1-2".to_string()));
        assert_eq!(merged.source_way_ids, Some(vec![1, 2]));
        assert_eq!(
            merged.geometry,
            Geometry::LineString(vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]])
        );
    }

    #[test]
    fn test_single_way_component_keeps_way_identity() {
        let ways = vec![tagged_way(
            9,
            vec![[0.0, 0.0], [1.0, 0.0]],
            &[("highway", "path")],
        )];
        let geometries = coalesce_open_ways(&ways, true).unwrap();
        let single = &geometries[0];
        assert_eq!(single.id, GeometryId::Element(9));
        assert_eq!(single.source_kind, SourceKind::Way);
        assert!(single.source_way_ids.is_none());
        assert!(!single.tags.keys().any(|k| k.starts_with(INTERNAL_TAG_PREFIX)));
    }

    #[test]
    fn test_branching_component_becomes_multilinestring() {
        let ways = vec![
            way(1, vec![[0.0, 0.0], [1.0, 1.0]]),
            way(2, vec![[2.0, 0.0], [1.0, 1.0]]),
            way(3, vec![[1.0, 1.0], [1.0, 3.0]]),
        ];
        let geometries = coalesce_open_ways(&ways, true).unwrap();
        assert_eq!(geometries.len(), 1);
        match &geometries[0].geometry {
            Geometry::MultiLineString(chains) => assert_eq!(chains.len(), 3),
            other => panic!("expected MultiLineString, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_synthetic_id_sorted_regardless_of_traversal_order() {
        let ways = vec![
            way(30, vec![[1.0, 1.0], [2.0, 2.0]]),
            way(4, vec![[0.0, 0.0], [1.0, 1.0]]),
        ];
        let geometries = coalesce_open_ways(&ways, true).unwrap();
        assert_eq!(
            geometries[0].id,
            GeometryId::Synthetic("component-4-30".to_string())
        );
    }

    #[test]
    fn test_component_tags_prefer_named_member() {
        let ways = vec![
            way(1, vec![[0.0, 0.0], [1.0, 1.0]]),
            tagged_way(
                2,
                vec![[1.0, 1.0], [2.0, 2.0]],
                &[("name", "Mühlenstrom"), ("waterway", "stream")],
            ),
        ];
        let geometries = coalesce_open_ways(&ways, true).unwrap();
        let tags = &geometries[0].tags;
        assert_eq!(tags.get("name").map(String::as_str), Some("Mühlenstrom"));
        assert_eq!(tags.get(WAY_COUNT_TAG).map(String::as_str), Some("2"));
        assert_eq!(tags.get(WAY_IDS_TAG).map(String::as_str), Some("1,2"));
    }

    #[test]
    fn test_complexity_guard_can_be_bypassed() {
        // 1000+ ways with a degree-4 hub: fatal with the guard, fine without
        let mut ways: Vec<OpenWay> = (0..1000)
            .map(|i| {
                let x = 10.0 + i as f64;
                way(100 + i, vec![[x, 0.0], [x, 1.0]])
            })
            .collect();
        for arm in 0..4 {
            ways.push(way(arm, vec![[arm as f64, 5.0], [0.0, 0.0]]));
        }

        assert!(matches!(
            coalesce_open_ways(&ways, true),
            Err(CoalesceError::TooComplex(_))
        ));
        assert!(coalesce_open_ways(&ways, false).is_ok());
    }
}
