use crate::geometry::{is_closed, Coord};

// Stitches open way segments into closed rings for multipolygon assembly.
// Matching is by exact coordinate equality only; Overpass emits identical
// coordinates for a shared node, so no proximity tolerance is needed.

/// Glues coordinate chains end-to-end at exactly matching endpoints until
/// every chain is consumed into one or more closed rings.
///
/// All-or-nothing: if at any point the current accumulator is neither closed
/// nor extendable, the topology is undeterminable and an empty vector is
/// returned so the caller can reject the whole set.
pub fn merge_into_rings(chains: Vec<Vec<Coord>>) -> Vec<Vec<Coord>> {
    let mut remaining = chains;
    let mut rings: Vec<Vec<Coord>> = Vec::new();

    while let Some(mut ring) = remaining.pop() {
        // Empty chains carry no topology; never let one become the
        // accumulator or the whole set would be rejected.
        if ring.is_empty() {
            continue;
        }
        while !is_closed(&ring) {
            match find_connecting(&ring, &remaining) {
                Some(index) => {
                    let chain = remaining.swap_remove(index);
                    splice(&mut ring, chain);
                }
                None => return Vec::new(),
            }
        }
        rings.push(ring);
    }

    rings
}

/// Finds a chain whose start or end exactly equals the accumulator's
/// current start or end.
fn find_connecting(ring: &[Coord], candidates: &[Vec<Coord>]) -> Option<usize> {
    let ring_first = *ring.first()?;
    let ring_last = *ring.last()?;

    candidates.iter().position(|chain| {
        let (Some(&first), Some(&last)) = (chain.first(), chain.last()) else {
            return false;
        };
        first == ring_last || last == ring_last || first == ring_first || last == ring_first
    })
}

/// Splices `chain` onto `ring` in whichever of the four orientations
/// connects, dropping the duplicated shared vertex.
fn splice(ring: &mut Vec<Coord>, chain: Vec<Coord>) {
    let ring_first = ring[0];
    let ring_last = ring[ring.len() - 1];
    let chain_first = chain[0];
    let chain_last = chain[chain.len() - 1];

    if chain_first == ring_last {
        // Append forward
        ring.extend(chain.into_iter().skip(1));
    } else if chain_last == ring_last {
        // Append reversed
        ring.extend(chain.into_iter().rev().skip(1));
    } else if chain_last == ring_first {
        // Prepend forward
        let mut joined = chain;
        joined.extend(ring.iter().skip(1).copied());
        *ring = joined;
    } else {
        // Prepend reversed
        debug_assert_eq!(chain_first, ring_first);
        let mut joined: Vec<Coord> = chain.into_iter().rev().collect();
        joined.extend(ring.iter().skip(1).copied());
        *ring = joined;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(merge_into_rings(vec![]).is_empty());
    }

    #[test]
    fn test_single_closed_chain_is_trivially_accepted() {
        let square = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]];
        let rings = merge_into_rings(vec![square.clone()]);
        assert_eq!(rings, vec![square]);
    }

    #[test]
    fn test_single_open_chain_fails() {
        let open = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
        assert!(merge_into_rings(vec![open]).is_empty());
    }

    #[test]
    fn test_two_halves_form_one_ring() {
        let upper = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
        let lower = vec![[1.0, 1.0], [0.0, 1.0], [0.0, 0.0]];
        let rings = merge_into_rings(vec![upper, lower]);
        assert_eq!(rings.len(), 1);
        let ring = &rings[0];
        assert!(is_closed(ring));
        // Shared vertices are de-duplicated: 3 + 3 - 1 shared = 5
        assert_eq!(ring.len(), 5);
    }

    #[test]
    fn test_reversed_segment_is_reoriented() {
        // Second chain runs the "wrong way": its end touches the first's end
        let a = vec![[0.0, 0.0], [1.0, 0.0]];
        let b = vec![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0]];
        let rings = merge_into_rings(vec![a, b]);
        assert_eq!(rings.len(), 1);
        assert!(is_closed(&rings[0]));
        assert_eq!(rings[0].len(), 4);
    }

    #[test]
    fn test_four_segments_one_ring() {
        let rings = merge_into_rings(vec![
            vec![[0.0, 0.0], [1.0, 0.0]],
            vec![[1.0, 0.0], [1.0, 1.0]],
            vec![[1.0, 1.0], [0.0, 1.0]],
            vec![[0.0, 1.0], [0.0, 0.0]],
        ]);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 5);
    }

    #[test]
    fn test_two_separate_rings() {
        let rings = merge_into_rings(vec![
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
            vec![[1.0, 1.0], [0.0, 0.0]],
            vec![[5.0, 5.0], [6.0, 5.0], [6.0, 6.0]],
            vec![[6.0, 6.0], [5.0, 5.0]],
        ]);
        assert_eq!(rings.len(), 2);
        assert!(rings.iter().all(|ring| is_closed(ring)));
    }

    #[test]
    fn test_gap_rejects_whole_set() {
        // Two chains that never touch
        let rings = merge_into_rings(vec![
            vec![[0.0, 0.0], [1.0, 0.0]],
            vec![[5.0, 5.0], [6.0, 6.0]],
        ]);
        assert!(rings.is_empty());
    }

    #[test]
    fn test_empty_chains_are_ignored() {
        // An empty chain must neither panic the candidate scan nor poison
        // an otherwise closable set.
        let rings = merge_into_rings(vec![
            vec![],
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
            vec![],
            vec![[1.0, 1.0], [0.0, 1.0], [0.0, 0.0]],
        ]);
        assert_eq!(rings.len(), 1);
        assert!(is_closed(&rings[0]));

        assert!(merge_into_rings(vec![vec![]]).is_empty());
    }

    #[test]
    fn test_near_miss_endpoints_do_not_connect() {
        // Coordinates differ in the last decimal; exact equality required
        let rings = merge_into_rings(vec![
            vec![[0.0, 0.0], [1.0, 0.0]],
            vec![[1.0000001, 0.0], [0.0, 1.0], [0.0, 0.0]],
        ]);
        assert!(rings.is_empty());
    }
}
