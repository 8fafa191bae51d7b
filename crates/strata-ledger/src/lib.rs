//! The persistent deformation ledger.
//!
//! Structures and connecting paths deform terrain across chunk boundaries,
//! including chunks that do not exist yet. The ledger records those pending
//! changes keyed by chunk coordinate so every (re)build of an affected chunk
//! can merge them in: density deltas accumulate additively, road overrides
//! keep the strongest weight. Entries never expire during a session; the
//! ledger is only cleared on a full reseed.

use dashmap::{DashMap, DashSet};
use glam::DVec3;
use rustc_hash::FxHashMap;
use strata_coords::{ChunkCoord, ChunkExtents};

/// A road-layer override produced by structure placement or path carving.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoadOverride {
    /// Road weight in `[0, 1]`; merges take the maximum.
    pub weight: f32,
    /// Road surface start height, carried from whichever entry won the
    /// max-weight merge.
    pub start_height: f32,
}

/// A world-space axis-aligned volume around a placed structure instance.
///
/// Used both to carve density/road changes and to suppress scatter-object
/// placement inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InfluenceBound {
    pub min: DVec3,
    pub max: DVec3,
}

impl InfluenceBound {
    /// A bound centered on `center` with half-extents `half`.
    pub fn centered(center: DVec3, half: DVec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Whether `point` lies inside the volume (inclusive).
    pub fn contains(&self, point: DVec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Every chunk coordinate whose footprint the volume overlaps, diagonal
    /// neighbors included when the volume straddles a corner.
    pub fn overlapped_chunks(&self, extents: ChunkExtents) -> Vec<ChunkCoord> {
        let lo = ChunkCoord::from_world(self.min.x, self.min.z, extents);
        let hi = ChunkCoord::from_world(self.max.x, self.max.z, extents);
        let mut chunks = Vec::with_capacity(
            ((hi.x - lo.x + 1) * (hi.z - lo.z + 1)).max(0) as usize,
        );
        for cz in lo.z..=hi.z {
            for cx in lo.x..=hi.x {
                chunks.push(ChunkCoord::new(cx, cz));
            }
        }
        chunks
    }
}

/// The durable cross-chunk record of density and road changes.
///
/// Shared between structure generation (writer) and the density generator
/// (reader). Chunk builds are serialized one per tick, so per-entry merges
/// never race; `DashMap` keeps the map safely shareable behind an `Arc`
/// without a separate lock.
#[derive(Default)]
pub struct DeformationLedger {
    /// Density deltas per chunk, keyed by local voxel index. Additive merge.
    density_deltas: DashMap<ChunkCoord, FxHashMap<usize, f32>>,
    /// Road overrides per chunk, keyed by local column index. Max-weight merge.
    road_overrides: DashMap<ChunkCoord, FxHashMap<usize, RoadOverride>>,
    /// Influence bounds of placed structure instances, per overlapped chunk.
    influence_bounds: DashMap<ChunkCoord, Vec<InfluenceBound>>,
    /// Coordinates already evaluated for structure placement this session.
    checked_coords: DashSet<ChunkCoord>,
}

impl DeformationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates a density delta at `(coord, voxel_index)`.
    pub fn add_density_delta(&self, coord: ChunkCoord, voxel_index: usize, delta: f32) {
        *self
            .density_deltas
            .entry(coord)
            .or_default()
            .entry(voxel_index)
            .or_insert(0.0) += delta;
    }

    /// Merges a road override at `(coord, column_index)`: the stronger weight
    /// wins and brings its start height with it.
    pub fn apply_road_override(
        &self,
        coord: ChunkCoord,
        column_index: usize,
        weight: f32,
        start_height: f32,
    ) {
        let mut columns = self.road_overrides.entry(coord).or_default();
        columns
            .entry(column_index)
            .and_modify(|existing| {
                if weight > existing.weight {
                    existing.weight = weight;
                    existing.start_height = start_height;
                }
            })
            .or_insert(RoadOverride {
                weight,
                start_height,
            });
    }

    /// Visits every pending density delta for `coord`.
    pub fn for_each_density_delta(&self, coord: ChunkCoord, mut visit: impl FnMut(usize, f32)) {
        if let Some(deltas) = self.density_deltas.get(&coord) {
            for (&voxel_index, &delta) in deltas.iter() {
                visit(voxel_index, delta);
            }
        }
    }

    /// Visits every road override for `coord`.
    pub fn for_each_road_override(
        &self,
        coord: ChunkCoord,
        mut visit: impl FnMut(usize, RoadOverride),
    ) {
        if let Some(columns) = self.road_overrides.get(&coord) {
            for (&column_index, &entry) in columns.iter() {
                visit(column_index, entry);
            }
        }
    }

    /// Records a structure instance's influence volume under every chunk it
    /// overlaps.
    pub fn add_influence_bound(&self, bound: InfluenceBound, extents: ChunkExtents) {
        for coord in bound.overlapped_chunks(extents) {
            self.influence_bounds.entry(coord).or_default().push(bound);
        }
    }

    /// The influence bounds overlapping `coord`, if any.
    pub fn influence_bounds(&self, coord: ChunkCoord) -> Vec<InfluenceBound> {
        self.influence_bounds
            .get(&coord)
            .map(|bounds| bounds.clone())
            .unwrap_or_default()
    }

    /// Whether any recorded influence bound contains `point`.
    pub fn point_in_influence(&self, coord: ChunkCoord, point: DVec3) -> bool {
        self.influence_bounds
            .get(&coord)
            .is_some_and(|bounds| bounds.iter().any(|b| b.contains(point)))
    }

    /// Marks `coord` as structure-checked. Returns `true` the first time a
    /// coordinate is marked; later calls return `false` so each coordinate is
    /// evaluated at most once per session.
    pub fn mark_structure_checked(&self, coord: ChunkCoord) -> bool {
        self.checked_coords.insert(coord)
    }

    /// Number of pending density-delta entries for `coord`.
    pub fn density_delta_count(&self, coord: ChunkCoord) -> usize {
        self.density_deltas.get(&coord).map_or(0, |m| m.len())
    }

    /// Number of road-override entries for `coord`.
    pub fn road_override_count(&self, coord: ChunkCoord) -> usize {
        self.road_overrides.get(&coord).map_or(0, |m| m.len())
    }

    /// Drops every entry and every structure-check memo. Only valid during a
    /// full world reseed, after all live chunks are disposed.
    pub fn clear(&self) {
        self.density_deltas.clear();
        self.road_overrides.clear();
        self.influence_bounds.clear();
        self.checked_coords.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_deltas_accumulate() {
        let ledger = DeformationLedger::new();
        let coord = ChunkCoord::new(2, -1);
        ledger.add_density_delta(coord, 7, 0.5);
        ledger.add_density_delta(coord, 7, 0.25);
        ledger.add_density_delta(coord, 9, -1.0);

        let mut collected = Vec::new();
        ledger.for_each_density_delta(coord, |i, d| collected.push((i, d)));
        collected.sort_by_key(|&(i, _)| i);
        assert_eq!(
            collected,
            vec![(7, 0.75), (9, -1.0)],
            "Deltas at the same voxel must sum"
        );
    }

    #[test]
    fn test_road_override_keeps_strongest_weight() {
        let ledger = DeformationLedger::new();
        let coord = ChunkCoord::new(0, 0);
        ledger.apply_road_override(coord, 3, 0.4, 10.0);
        ledger.apply_road_override(coord, 3, 0.9, 22.0);
        ledger.apply_road_override(coord, 3, 0.6, 5.0);

        let mut seen = None;
        ledger.for_each_road_override(coord, |i, entry| {
            assert_eq!(i, 3);
            seen = Some(entry);
        });
        let entry = seen.expect("override should exist");
        assert_eq!(entry.weight, 0.9, "Max weight wins");
        assert_eq!(
            entry.start_height, 22.0,
            "Height follows the winning weight"
        );
    }

    #[test]
    fn test_influence_bound_spans_diagonal_neighbors() {
        let extents = ChunkExtents::default();
        // Straddles the corner shared by chunks (-1,-1), (0,-1), (-1,0), (0,0).
        let bound = InfluenceBound::centered(DVec3::new(0.0, 20.0, 0.0), DVec3::splat(4.0));
        let chunks = bound.overlapped_chunks(extents);
        assert_eq!(chunks.len(), 4, "Corner volume overlaps 4 chunks: {chunks:?}");
        for expected in [
            ChunkCoord::new(-1, -1),
            ChunkCoord::new(0, -1),
            ChunkCoord::new(-1, 0),
            ChunkCoord::new(0, 0),
        ] {
            assert!(chunks.contains(&expected), "Missing {expected:?}");
        }
    }

    #[test]
    fn test_entries_survive_for_unrelated_chunks() {
        let extents = ChunkExtents::default();
        let ledger = DeformationLedger::new();
        let bound = InfluenceBound::centered(DVec3::new(33.0, 10.0, 0.0), DVec3::splat(6.0));
        ledger.add_influence_bound(bound, extents);

        // Chunk (1,0) was never generated; its bounds are still recorded.
        let bounds = ledger.influence_bounds(ChunkCoord::new(1, 0));
        assert_eq!(bounds.len(), 1, "Ledger entries persist per chunk");
        assert!(ledger.point_in_influence(ChunkCoord::new(1, 0), DVec3::new(34.0, 10.0, 1.0)));
        assert!(!ledger.point_in_influence(ChunkCoord::new(1, 0), DVec3::new(50.0, 10.0, 1.0)));
    }

    #[test]
    fn test_structure_check_memoized() {
        let ledger = DeformationLedger::new();
        let coord = ChunkCoord::new(8, 8);
        assert!(ledger.mark_structure_checked(coord), "First check runs");
        assert!(!ledger.mark_structure_checked(coord), "Repeat check skips");
    }

    #[test]
    fn test_clear_resets_everything() {
        let ledger = DeformationLedger::new();
        let coord = ChunkCoord::new(1, 1);
        ledger.add_density_delta(coord, 0, 1.0);
        ledger.apply_road_override(coord, 0, 0.5, 8.0);
        ledger.mark_structure_checked(coord);
        ledger.clear();
        assert_eq!(ledger.density_delta_count(coord), 0);
        assert_eq!(ledger.road_override_count(coord), 0);
        assert!(
            ledger.mark_structure_checked(coord),
            "Reseed forgets structure checks"
        );
    }
}
