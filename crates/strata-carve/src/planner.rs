//! Structure eligibility, placement, and ledger carving.

use std::sync::Arc;

use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strata_biome::{BiomeCatalog, BiomeId, StructureTypeId};
use strata_coords::{ChunkCoord, ChunkExtents};
use strata_ledger::{DeformationLedger, InfluenceBound};
use strata_noise::derive_stream_seed;
use tracing::debug;

use crate::connect::connect_nearest;
use crate::settings::{ConnectionMode, StructurePrefabDef, StructureSettings};

/// Terrain queries the planner needs, borrowed from the field generator so
/// this crate stays decoupled from it.
pub struct TerrainProbe<'a> {
    pub surface_level: &'a dyn Fn(f64, f64) -> f32,
    pub biome_at: &'a dyn Fn(f64, f64) -> BiomeId,
    pub road_weight_at: &'a dyn Fn(f64, f64) -> f32,
}

/// One placed prefab instance.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedStructure {
    pub prefab: StructureTypeId,
    pub position: DVec3,
}

/// Deterministic per-coordinate RNG stream for structure decisions.
fn coordinate_seed(world_seed: u64, coord: ChunkCoord) -> u64 {
    let packed = ((coord.x as u32 as u64) << 32) | coord.z as u32 as u64;
    derive_stream_seed(world_seed, packed)
}

/// The chunks owning the integer column `(ix, iz)`, with their local column
/// index. Border columns belong to up to four chunks; ledger writers stamp
/// all of them so regenerated neighbors stay seamless.
pub fn column_owners(ix: i64, iz: i64, extents: ChunkExtents) -> Vec<(ChunkCoord, usize)> {
    let sx = extents.size_x as i64;
    let sz = extents.size_z as i64;
    let (cx, lx) = (ix.div_euclid(sx), ix.rem_euclid(sx));
    let (cz, lz) = (iz.div_euclid(sz), iz.rem_euclid(sz));

    let mut xs = vec![(cx, lx)];
    if lx == 0 {
        xs.push((cx - 1, sx));
    }
    let mut zs = vec![(cz, lz)];
    if lz == 0 {
        zs.push((cz - 1, sz));
    }

    let mut owners = Vec::with_capacity(xs.len() * zs.len());
    for &(cx, lx) in &xs {
        for &(cz, lz) in &zs {
            owners.push((
                ChunkCoord::new(cx as i32, cz as i32),
                extents.column_index(lx as usize, lz as usize),
            ));
        }
    }
    owners
}

/// Decides structure placement per check coordinate and writes the resulting
/// deformations into the shared ledger.
pub struct StructurePlanner {
    world_seed: u64,
    extents: ChunkExtents,
    settings: StructureSettings,
    catalog: BiomeCatalog,
    ledger: Arc<DeformationLedger>,
}

impl StructurePlanner {
    pub fn new(
        world_seed: u64,
        extents: ChunkExtents,
        settings: StructureSettings,
        catalog: BiomeCatalog,
        ledger: Arc<DeformationLedger>,
    ) -> Self {
        Self {
            world_seed,
            extents,
            settings,
            catalog,
            ledger,
        }
    }

    pub fn settings(&self) -> &StructureSettings {
        &self.settings
    }

    /// Evaluates one coordinate for structure placement.
    ///
    /// Runs at most once per coordinate per session (memoized through the
    /// ledger); off-stride and repeat coordinates return `None` immediately.
    /// A successful check places 1..N prefab instances, carves their
    /// influence volumes into the ledger, and connects them per the
    /// configured mode.
    pub fn check_coordinate(
        &self,
        coord: ChunkCoord,
        probe: &TerrainProbe<'_>,
    ) -> Option<Vec<PlacedStructure>> {
        let stride = self.settings.check_stride.max(1);
        if coord.x.rem_euclid(stride) != 0 || coord.z.rem_euclid(stride) != 0 {
            return None;
        }
        if !self.ledger.mark_structure_checked(coord) {
            return None;
        }
        if self.settings.prefabs.is_empty() {
            return None;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(coordinate_seed(self.world_seed, coord));
        if rng.random::<f32>() >= self.settings.spawn_chance {
            return None;
        }

        let center = coord.world_center(self.extents);
        let biome = (probe.biome_at)(center.x, center.z);
        let allowed: Vec<&StructurePrefabDef> = self
            .settings
            .prefabs
            .iter()
            .filter(|prefab| self.catalog.allows_structure(biome, prefab.id))
            .collect();
        if allowed.is_empty() {
            return None;
        }
        if let Some(min_road) = self.settings.min_road_weight
            && (probe.road_weight_at)(center.x, center.z) < min_road
        {
            return None;
        }
        if let Some((lo, hi)) = self.settings.elevation_window {
            let surface = (probe.surface_level)(center.x, center.z);
            if surface < lo || surface > hi {
                return None;
            }
        }

        let (min_n, max_n) = self.settings.instances;
        let count = rng.random_range(min_n..=max_n.max(min_n)) as usize;
        let mut placed: Vec<PlacedStructure> = Vec::with_capacity(count);
        for _ in 0..count {
            let prefab = allowed[rng.random_range(0..allowed.len())];
            let mut position = self.jitter(center, &mut rng);
            // Retry with fresh jitter on spacing violations; the last try
            // sticks regardless (soft-fail, never blocks generation).
            for _ in 1..self.settings.max_attempts.max(1) {
                if self.spacing_ok(&placed, position) {
                    break;
                }
                position = self.jitter(center, &mut rng);
            }
            let height = prefab.fixed_height.unwrap_or_else(|| {
                (probe.surface_level)(position.x, position.z)
                    .clamp(prefab.height_window.0, prefab.height_window.1)
            });
            let position = DVec3::new(position.x, height as f64, position.z);
            self.carve_instance(prefab, position);
            placed.push(PlacedStructure {
                prefab: prefab.id,
                position,
            });
        }

        if self.settings.connection == ConnectionMode::Nearest {
            let positions: Vec<DVec3> = placed.iter().map(|p| p.position).collect();
            for (a, b) in connect_nearest(&positions) {
                self.carve_path(positions[a], positions[b]);
            }
        }

        debug!(
            chunk_x = coord.x,
            chunk_z = coord.z,
            instances = placed.len(),
            "structure placed"
        );
        Some(placed)
    }

    fn jitter(&self, center: DVec3, rng: &mut ChaCha8Rng) -> DVec3 {
        let r = self.settings.placement_radius.max(0.0);
        DVec3::new(
            center.x + rng.random_range(-r..=r),
            0.0,
            center.z + rng.random_range(-r..=r),
        )
    }

    fn spacing_ok(&self, placed: &[PlacedStructure], candidate: DVec3) -> bool {
        let min_sq = self.settings.min_instance_distance * self.settings.min_instance_distance;
        placed.iter().all(|p| {
            let dx = p.position.x - candidate.x;
            let dz = p.position.z - candidate.z;
            dx * dx + dz * dz >= min_sq
        })
    }

    /// Stamps one instance's influence volume: the bound itself, falloff-
    /// weighted density deltas, and a road patch under the footprint, keyed
    /// into every chunk the volume overlaps.
    fn carve_instance(&self, prefab: &StructurePrefabDef, position: DVec3) {
        let bound = InfluenceBound::centered(position, prefab.influence_half);
        self.ledger.add_influence_bound(bound, self.extents);

        let extents = self.extents;
        for coord in bound.overlapped_chunks(extents) {
            let min = coord.world_min(extents);
            let lx_lo = ((bound.min.x - min.x).ceil().max(0.0)) as usize;
            let lx_hi = ((bound.max.x - min.x).floor() as i64).min(extents.size_x as i64);
            let lz_lo = ((bound.min.z - min.y).ceil().max(0.0)) as usize;
            let lz_hi = ((bound.max.z - min.y).floor() as i64).min(extents.size_z as i64);
            let ly_lo = (bound.min.y.ceil().max(0.0)) as usize;
            let ly_hi = (bound.max.y.floor() as i64).min(extents.size_y as i64);
            if lx_hi < lx_lo as i64 || lz_hi < lz_lo as i64 || ly_hi < ly_lo as i64 {
                continue;
            }

            for lz in lz_lo..=lz_hi as usize {
                for lx in lx_lo..=lx_hi as usize {
                    let wx = min.x + lx as f64;
                    let wz = min.y + lz as f64;
                    let fx = ((wx - position.x).abs() / prefab.influence_half.x).min(1.0);
                    let fz = ((wz - position.z).abs() / prefab.influence_half.z).min(1.0);

                    for ly in ly_lo..=ly_hi as usize {
                        let fy = ((ly as f64 - position.y).abs() / prefab.influence_half.y).min(1.0);
                        let falloff = (1.0 - fx.max(fz).max(fy)).max(0.0) as f32;
                        if falloff <= 0.0 {
                            continue;
                        }
                        self.ledger.add_density_delta(
                            coord,
                            extents.voxel_index(lx, ly, lz),
                            prefab.density_delta * falloff,
                        );
                    }

                    let road_falloff = (1.0 - fx.max(fz)).max(0.0) as f32;
                    if prefab.road_weight > 0.0 && road_falloff > 0.0 {
                        self.ledger.apply_road_override(
                            coord,
                            extents.column_index(lx, lz),
                            prefab.road_weight * road_falloff,
                            position.y as f32,
                        );
                    }
                }
            }
        }
    }

    /// Carves a thin road corridor along the straight line between two
    /// instances, height interpolated along the path.
    fn carve_path(&self, from: DVec3, to: DVec3) {
        let cfg = &self.settings.path;
        let radius = cfg.radius.max(0);
        let steps = (to - from).length().ceil().max(1.0) as usize;
        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            let p = from.lerp(to, t);
            let (ix, iz) = (p.x.round() as i64, p.z.round() as i64);
            for dz in -radius..=radius {
                for dx in -radius..=radius {
                    let distance = libm::sqrt((dx * dx + dz * dz) as f64);
                    if distance > radius as f64 {
                        continue;
                    }
                    let weight = cfg.road_weight
                        * cfg
                            .falloff
                            .sample((distance / radius.max(1) as f64) as f32);
                    for (chunk, column) in column_owners(ix + dx, iz + dz, self.extents) {
                        self.ledger
                            .apply_road_override(chunk, column, weight, p.y as f32);
                    }
                }
            }
        }
    }
}
