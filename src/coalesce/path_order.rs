use super::components::endpoint_keys;
use super::endpoint_graph::{coord_key, EndpointGraph};
use super::OpenWay;
use crate::geometry::Coord;
use fnv::{FnvHashMap, FnvHashSet};

/// Linearizes a connected component into one or more ordered chains.
///
/// Simple chains and closed loops merge into a single chain. Components
/// with more than two terminal nodes, or with any endpoint of degree
/// exactly three (a branch point), are too ambiguous to linearize; each
/// member way is returned as its own chain instead.
pub fn order_component(
    way_ids: &[u64],
    ways: &FnvHashMap<u64, &OpenWay>,
    graph: &EndpointGraph,
) -> Vec<Vec<Coord>> {
    // Single-way components pass through untouched; no orientation guess.
    if way_ids.len() == 1 {
        return ways
            .get(&way_ids[0])
            .map(|way| vec![way.coords.clone()])
            .unwrap_or_default();
    }

    let members: Vec<&OpenWay> = way_ids
        .iter()
        .filter_map(|id| ways.get(id).copied())
        .filter(|way| !way.coords.is_empty())
        .collect();
    if members.is_empty() {
        return Vec::new();
    }

    // Degree of every endpoint coordinate in this component.
    let mut degrees: FnvHashMap<String, usize> = FnvHashMap::default();
    for way in &members {
        for key in endpoint_keys(way) {
            let degree = graph.degree(&key);
            degrees.insert(key, degree);
        }
    }

    let terminals: Vec<&String> = degrees
        .iter()
        .filter(|(_, &degree)| degree == 1)
        .map(|(key, _)| key)
        .collect();
    let has_branch = degrees.values().any(|&degree| degree == 3);

    if terminals.len() > 2 || has_branch {
        // Branching structure: no merge attempted, one chain per way.
        return members.iter().map(|way| way.coords.clone()).collect();
    }

    // Start from a way touching a terminal, oriented so the terminal comes
    // first. A closed loop has no terminal; start anywhere, as-is.
    let mut used: FnvHashSet<u64> = FnvHashSet::default();
    let mut chain: Vec<Coord> = Vec::new();

    for way in &members {
        let first_key = coord_key(&way.coords[0]);
        let last_key = coord_key(&way.coords[way.coords.len() - 1]);
        if terminals.iter().any(|t| **t == first_key) {
            chain = way.coords.clone();
            used.insert(way.id);
            break;
        }
        if terminals.iter().any(|t| **t == last_key) {
            // Fresh reversed copy; never reorient the shared input in place
            chain = way.coords.iter().rev().copied().collect();
            used.insert(way.id);
            break;
        }
    }
    if chain.is_empty() {
        chain = members[0].coords.clone();
        used.insert(members[0].id);
    }

    // Greedy forward walk: keep appending whichever unused way touches the
    // current tail. Stops silently when nothing connects; any unreachable
    // remainder is dropped (accepted lossy behavior).
    loop {
        let tail_key = coord_key(chain.last().expect("chain never empty"));

        let next = members.iter().find_map(|way| {
            if used.contains(&way.id) || way.coords.is_empty() {
                return None;
            }
            if coord_key(&way.coords[0]) == tail_key {
                Some((way.id, way.coords.clone()))
            } else if coord_key(&way.coords[way.coords.len() - 1]) == tail_key {
                Some((way.id, way.coords.iter().rev().copied().collect()))
            } else {
                None
            }
        });

        match next {
            Some((id, coords)) => {
                used.insert(id);
                chain.extend(coords.into_iter().skip(1));
            }
            None => break,
        }
    }

    vec![chain]
}
