use super::OpenWay;
use crate::geometry::Coord;
use fnv::FnvHashMap;

/// Decimal digits used when deriving a coordinate key. Seven fractional
/// digits is native OSM precision (~1cm), so distinct nodes never collide.
const COORD_KEY_PRECISION: usize = 7;

/// Stable string key for a coordinate, `"{lon},{lat}"` rounded to
/// [`COORD_KEY_PRECISION`] digits.
pub fn coord_key(coord: &Coord) -> String {
    format!(
        "{:.prec$},{:.prec$}",
        coord[0],
        coord[1],
        prec = COORD_KEY_PRECISION
    )
}

/// Which end of a way an endpoint entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointPosition {
    Start,
    End,
}

/// One way-endpoint touching a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub way_id: u64,
    pub position: EndpointPosition,
}

/// All way-endpoints meeting at one coordinate.
#[derive(Debug, Clone)]
pub struct EndpointNode {
    pub coord: Coord,
    pub endpoints: Vec<Endpoint>,
}

/// Index from endpoint coordinates to the ways touching them.
///
/// Coordinates are never linked to each other directly; adjacency between
/// ways is always resolved through this shared map, which keeps the way data
/// itself free of cyclic references. Backbone for complexity detection,
/// component discovery and path ordering.
#[derive(Debug, Default)]
pub struct EndpointGraph {
    nodes: FnvHashMap<String, EndpointNode>,
}

impl EndpointGraph {
    pub fn build(ways: &[OpenWay]) -> Self {
        let mut nodes: FnvHashMap<String, EndpointNode> = FnvHashMap::default();

        let mut insert = |coord: Coord, endpoint: Endpoint| {
            nodes
                .entry(coord_key(&coord))
                .or_insert_with(|| EndpointNode {
                    coord,
                    endpoints: Vec::new(),
                })
                .endpoints
                .push(endpoint);
        };

        for way in ways {
            let Some(&first) = way.coords.first() else {
                continue;
            };
            let &last = way.coords.last().expect("non-empty after first()");

            insert(
                first,
                Endpoint {
                    way_id: way.id,
                    position: EndpointPosition::Start,
                },
            );

            // A closed way's coincident start/end contributes a single entry,
            // otherwise it would read as a self-loop.
            if coord_key(&last) != coord_key(&first) {
                insert(
                    last,
                    Endpoint {
                        way_id: way.id,
                        position: EndpointPosition::End,
                    },
                );
            }
        }

        Self { nodes }
    }

    /// Endpoints registered at a coordinate key; empty if none.
    pub fn endpoints_at(&self, key: &str) -> &[Endpoint] {
        self.nodes
            .get(key)
            .map(|node| node.endpoints.as_slice())
            .unwrap_or(&[])
    }

    /// Number of way-endpoints meeting at a coordinate key.
    pub fn degree(&self, key: &str) -> usize {
        self.endpoints_at(key).len()
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = (&String, &EndpointNode)> {
        self.nodes.iter()
    }
}
