//! Instance connection topology.

use glam::DVec3;

/// Greedy nearest-neighbor pairing over instance positions.
///
/// Instances are visited in placement order and linked to their nearest
/// not-yet-connected neighbor; distance ties keep the earlier-placed
/// candidate, so the topology is deterministic.
pub fn connect_nearest(positions: &[DVec3]) -> Vec<(usize, usize)> {
    let mut connected = vec![false; positions.len()];
    let mut links = Vec::new();
    for i in 0..positions.len() {
        if connected[i] {
            continue;
        }
        let mut nearest: Option<(usize, f64)> = None;
        for (j, position) in positions.iter().enumerate() {
            if j == i || connected[j] {
                continue;
            }
            let distance = positions[i].distance_squared(*position);
            if nearest.is_none_or(|(_, best)| distance < best) {
                nearest = Some((j, distance));
            }
        }
        if let Some((j, _)) = nearest {
            connected[i] = true;
            connected[j] = true;
            links.push((i, j));
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_instances_make_one_link() {
        let links = connect_nearest(&[DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0)]);
        assert_eq!(links, vec![(0, 1)]);
    }

    #[test]
    fn test_pairs_form_in_placement_order() {
        let positions = [
            DVec3::ZERO,
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(100.0, 0.0, 0.0),
            DVec3::new(101.0, 0.0, 0.0),
        ];
        let links = connect_nearest(&positions);
        assert_eq!(links, vec![(0, 1), (2, 3)]);
    }

    #[test]
    fn test_odd_instance_stays_unlinked() {
        let positions = [
            DVec3::ZERO,
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(50.0, 0.0, 0.0),
        ];
        let links = connect_nearest(&positions);
        assert_eq!(links.len(), 1, "Third instance has no unconnected partner");
    }

    #[test]
    fn test_distance_ties_keep_earlier_candidate() {
        let positions = [
            DVec3::ZERO,
            DVec3::new(5.0, 0.0, 0.0),
            DVec3::new(-5.0, 0.0, 0.0),
        ];
        let links = connect_nearest(&positions);
        assert_eq!(links[0], (0, 1), "Equal distances resolve to placement order");
    }
}
