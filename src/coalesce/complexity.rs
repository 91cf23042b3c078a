use super::endpoint_graph::EndpointGraph;
use crate::geometry::Coord;
use serde::Serialize;
use std::error::Error;
use std::fmt;

/// Below this many ways, no complexity check runs at all; small inputs are
/// always allowed regardless of topology.
pub const WAY_COUNT_THRESHOLD: usize = 1000;

/// Maximum way-endpoints allowed at a single coordinate before the input is
/// treated as a network rather than isolated features.
pub const MAX_NODE_CONNECTIONS: usize = 3;

/// How many of the worst offenders to report in the error details.
const TOP_NODES_REPORTED: usize = 5;

/// One over-connected coordinate in the diagnostic report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexNode {
    pub coords: Coord,
    pub connection_count: usize,
    pub way_ids: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexityDetails {
    pub complex_node_count: usize,
    pub threshold: usize,
    pub top_complex_nodes: Vec<ComplexNode>,
    pub suggestion: String,
}

/// Fatal diagnostic raised when the input looks like a dense network (e.g.
/// a full road grid) rather than isolated features.
///
/// This is the pipeline's only hard stop: rendering a street grid as merged
/// "components" is combinatorially expensive and visually meaningless, so
/// the safe course is to refuse and ask for a narrower query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexityError {
    #[serde(rename = "type")]
    pub kind: ComplexityErrorKind,
    pub message: String,
    pub details: ComplexityDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComplexityErrorKind {
    #[serde(rename = "NETWORK_TOO_COMPLEX")]
    NetworkTooComplex,
}

impl fmt::Display for ComplexityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ComplexityError {}

/// Scans the endpoint graph for over-connected coordinates.
///
/// Skips entirely when `way_count` is below [`WAY_COUNT_THRESHOLD`]. Above
/// it, any coordinate touched by more than [`MAX_NODE_CONNECTIONS`] ways
/// aborts processing with a structured diagnostic.
pub fn check_complexity(graph: &EndpointGraph, way_count: usize) -> Result<(), ComplexityError> {
    if way_count < WAY_COUNT_THRESHOLD {
        return Ok(());
    }

    let mut complex_nodes: Vec<ComplexNode> = graph
        .iter_nodes()
        .filter(|(_, node)| node.endpoints.len() > MAX_NODE_CONNECTIONS)
        .map(|(_, node)| ComplexNode {
            coords: node.coord,
            connection_count: node.endpoints.len(),
            way_ids: node.endpoints.iter().map(|e| e.way_id).collect(),
        })
        .collect();

    if complex_nodes.is_empty() {
        return Ok(());
    }

    // Worst offenders first; tie-break on coordinates for determinism since
    // the underlying map has no iteration order.
    complex_nodes.sort_by(|a, b| {
        b.connection_count
            .cmp(&a.connection_count)
            .then_with(|| a.coords.partial_cmp(&b.coords).unwrap_or(std::cmp::Ordering::Equal))
    });

    let complex_node_count = complex_nodes.len();
    complex_nodes.truncate(TOP_NODES_REPORTED);

    Err(ComplexityError {
        kind: ComplexityErrorKind::NetworkTooComplex,
        message: format!(
            "Input looks like a dense network: {complex_node_count} node(s) are \
             shared by more than {MAX_NODE_CONNECTIONS} ways"
        ),
        details: ComplexityDetails {
            complex_node_count,
            threshold: MAX_NODE_CONNECTIONS,
            top_complex_nodes: complex_nodes,
            suggestion: "Narrow the query area or filter to specific features; \
                         road networks cannot be rendered as isolated components"
                .to_string(),
        },
    })
}
