use super::endpoint_graph::{coord_key, EndpointGraph};
use super::OpenWay;
use fnv::{FnvHashMap, FnvHashSet};
use std::collections::VecDeque;

/// Groups ways into connected components by traversing shared endpoints.
///
/// Breadth-first: ways are seeded in input order, so components come back in
/// the order their first member appears, and the result is a partition of
/// the input (every way in exactly one component).
pub fn find_components(ways: &[OpenWay], graph: &EndpointGraph) -> Vec<Vec<u64>> {
    let way_lookup: FnvHashMap<u64, &OpenWay> = ways.iter().map(|w| (w.id, w)).collect();
    let mut visited: FnvHashSet<u64> = FnvHashSet::default();
    let mut components: Vec<Vec<u64>> = Vec::new();

    for seed in ways {
        if visited.contains(&seed.id) {
            continue;
        }

        let mut component: Vec<u64> = Vec::new();
        let mut frontier: VecDeque<u64> = VecDeque::new();
        frontier.push_back(seed.id);
        visited.insert(seed.id);

        while let Some(way_id) = frontier.pop_front() {
            component.push(way_id);

            let Some(way) = way_lookup.get(&way_id) else {
                continue;
            };

            for key in endpoint_keys(way) {
                for endpoint in graph.endpoints_at(&key) {
                    if visited.insert(endpoint.way_id) {
                        frontier.push_back(endpoint.way_id);
                    }
                }
            }
        }

        components.push(component);
    }

    components
}

/// The one or two endpoint keys of a way (one when closed or single-point).
pub(super) fn endpoint_keys(way: &OpenWay) -> Vec<String> {
    let Some(first) = way.coords.first() else {
        return Vec::new();
    };
    let last = way.coords.last().expect("non-empty after first()");

    let first_key = coord_key(first);
    let last_key = coord_key(last);
    if first_key == last_key {
        vec![first_key]
    } else {
        vec![first_key, last_key]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn way(id: u64, coords: Vec<[f64; 2]>) -> OpenWay {
        OpenWay {
            id,
            tags: HashMap::new(),
            coords,
        }
    }

    #[test]
    fn test_chained_ways_form_one_component() {
        let ways = vec![
            way(1, vec![[0.0, 0.0], [1.0, 1.0]]),
            way(2, vec![[1.0, 1.0], [2.0, 2.0]]),
            way(3, vec![[2.0, 2.0], [3.0, 3.0]]),
        ];
        let graph = EndpointGraph::build(&ways);
        let components = find_components(&ways, &graph);
        assert_eq!(components, vec![vec![1, 2, 3]]);
    }

    #[test]
    fn test_disjoint_ways_form_separate_components() {
        let ways = vec![
            way(1, vec![[0.0, 0.0], [1.0, 1.0]]),
            way(2, vec![[5.0, 5.0], [6.0, 6.0]]),
        ];
        let graph = EndpointGraph::build(&ways);
        let components = find_components(&ways, &graph);
        assert_eq!(components, vec![vec![1], vec![2]]);
    }

    #[test]
    fn test_components_partition_the_input() {
        // Two clusters plus an isolated way, interleaved in input order
        let ways = vec![
            way(1, vec![[0.0, 0.0], [1.0, 0.0]]),
            way(2, vec![[10.0, 0.0], [11.0, 0.0]]),
            way(3, vec![[1.0, 0.0], [2.0, 0.0]]),
            way(4, vec![[50.0, 0.0], [51.0, 0.0]]),
            way(5, vec![[11.0, 0.0], [12.0, 0.0]]),
        ];
        let graph = EndpointGraph::build(&ways);
        let components = find_components(&ways, &graph);

        // Ordered by first appearance of the seed way
        assert_eq!(components.len(), 3);
        assert_eq!(components[0][0], 1);
        assert_eq!(components[1][0], 2);
        assert_eq!(components[2], vec![4]);

        let mut all: Vec<u64> = components.into_iter().flatten().collect();
        all.sort_unstable();
        assert_eq!(all, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_ways_joined_mid_chain_are_not_connected() {
        // Way 2 starts at an interior vertex of way 1, not at an endpoint;
        // only endpoints define connectivity.
        let ways = vec![
            way(1, vec![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]),
            way(2, vec![[1.0, 0.0], [1.0, 5.0]]),
        ];
        let graph = EndpointGraph::build(&ways);
        let components = find_components(&ways, &graph);
        assert_eq!(components.len(), 2);
    }
}
