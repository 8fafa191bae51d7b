//! The chunk scheduler and world facade.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::{DVec2, DVec3};
use rustc_hash::FxHashMap;
use strata_biome::{BiomeCatalog, BiomeId, BiomeWeights, ObjectTypeId};
use strata_carve::{StructurePlanner, StructureSettings, TerrainProbe};
use strata_coords::{ChunkCoord, ChunkExtents};
use strata_field::{DensityGenerator, FieldSettings, FieldStage};
use strata_ledger::DeformationLedger;
use strata_mesh::ChunkMesh;
use strata_scatter::{combine_instances, place_objects, ScatterSettings};
use tracing::{debug, info};

use crate::chunk::{Chunk, ChunkState};
use crate::error::WorldError;
use crate::events::StageSink;
use crate::pool::PoolManager;
use crate::settings::{SchedulerSettings, Viewpoint};

/// Cumulative scheduler counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenerationStats {
    pub chunks_built: u64,
    pub chunks_despawned: u64,
    pub structures_placed: u64,
    pub colliders_baked: u64,
    pub last_build: Option<Duration>,
    pub total_build: Duration,
}

/// Owns every live chunk and drives generation one chunk per tick.
///
/// Each tick: despawn chunks outside the retention radius, sweep structure
/// eligibility around the viewpoint, build the single highest-priority
/// missing coordinate, toggle scatter visibility by cull distance, and flush
/// the collider batch queue. Chunk builds run their stage kernels in strict
/// pipeline order; the shared deformation ledger is the only state touched
/// by more than one phase, and builds are serialized, so no locking beyond
/// the per-stage joins is needed.
pub struct World {
    seed: u64,
    extents: ChunkExtents,
    scheduler: SchedulerSettings,
    field_settings: FieldSettings,
    structure_settings: StructureSettings,
    scatter: ScatterSettings,
    catalog: BiomeCatalog,
    generator: DensityGenerator,
    planner: Option<StructurePlanner>,
    ledger: Arc<DeformationLedger>,
    chunks: FxHashMap<ChunkCoord, Chunk>,
    templates: FxHashMap<ObjectTypeId, ChunkMesh>,
    collider_queue: Vec<ChunkCoord>,
    pools: PoolManager,
    stats: GenerationStats,
    last_viewpoint: Viewpoint,
}

fn chunk_distance(a: ChunkCoord, b: ChunkCoord) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dz = (a.z - b.z) as f64;
    (dx * dx + dz * dz).sqrt()
}

fn horizontal_distance(center: DVec3, point: DVec3) -> f64 {
    let dx = center.x - point.x;
    let dz = center.z - point.z;
    (dx * dx + dz * dz).sqrt()
}

impl World {
    pub fn new(
        seed: u64,
        extents: ChunkExtents,
        field_settings: FieldSettings,
        structure_settings: StructureSettings,
        scatter: ScatterSettings,
        scheduler: SchedulerSettings,
        catalog: BiomeCatalog,
    ) -> Result<Self, WorldError> {
        if catalog.is_empty() {
            return Err(WorldError::EmptyCatalog);
        }
        let ledger = Arc::new(DeformationLedger::new());
        let generator = DensityGenerator::new(
            seed,
            extents,
            field_settings.clone(),
            catalog.clone(),
            Arc::clone(&ledger),
        );
        let planner = field_settings.structures_enabled.then(|| {
            StructurePlanner::new(
                seed,
                extents,
                structure_settings.clone(),
                catalog.clone(),
                Arc::clone(&ledger),
            )
        });
        info!(seed, structures = planner.is_some(), "world created");
        Ok(Self {
            seed,
            extents,
            scheduler,
            field_settings,
            structure_settings,
            scatter,
            catalog,
            generator,
            planner,
            ledger,
            chunks: FxHashMap::default(),
            templates: FxHashMap::default(),
            collider_queue: Vec::new(),
            pools: PoolManager::new(),
            stats: GenerationStats::default(),
            last_viewpoint: Viewpoint::default(),
        })
    }

    /// Registers the source mesh for a combinable object type.
    pub fn register_template(&mut self, id: ObjectTypeId, mesh: ChunkMesh) {
        self.templates.insert(id, mesh);
    }

    /// Advances the world by one tick.
    pub fn tick(&mut self, viewpoint: Viewpoint, sink: &mut dyn StageSink) {
        self.last_viewpoint = viewpoint;
        let center =
            ChunkCoord::from_world(viewpoint.position.x, viewpoint.position.z, self.extents);

        self.despawn_out_of_range(center, sink);
        self.run_structure_sweep(center);
        if let Some(next) = self.next_build_coord(center, viewpoint) {
            self.build_chunk(next, viewpoint, sink);
        }
        self.update_culling(viewpoint);
        self.flush_colliders();
    }

    fn despawn_out_of_range(&mut self, center: ChunkCoord, sink: &mut dyn StageSink) {
        let limit = self.scheduler.chunk_radius as f64 + 0.5;
        let stale: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .copied()
            .filter(|coord| chunk_distance(*coord, center) > limit)
            .collect();
        for coord in stale {
            self.despawn_chunk(coord, sink);
        }
    }

    fn despawn_chunk(&mut self, coord: ChunkCoord, sink: &mut dyn StageSink) {
        let Some(mut chunk) = self.chunks.remove(&coord) else {
            return;
        };
        chunk.state = ChunkState::Despawning;
        for &id in &chunk.visible_types {
            self.pools.release(id, chunk.instance_count(id));
        }
        self.collider_queue.retain(|queued| *queued != coord);
        chunk.state = ChunkState::Disposed;
        self.stats.chunks_despawned += 1;
        sink.chunk_despawned(coord);
        debug!(chunk_x = coord.x, chunk_z = coord.z, "chunk despawned");
    }

    /// Runs the structure eligibility kernel over the check window. Placed
    /// structures write into the ledger; chunks generated afterwards pick
    /// the deformations up during their density merge.
    fn run_structure_sweep(&mut self, center: ChunkCoord) {
        let Some(planner) = self.planner.as_ref() else {
            return;
        };
        let generator = &self.generator;
        let surface = |x: f64, z: f64| generator.surface_level(x, z);
        let biome = |x: f64, z: f64| generator.strongest_biome(x, z);
        let road = |x: f64, z: f64| generator.road_sample(x, z).0;
        let probe = TerrainProbe {
            surface_level: &surface,
            biome_at: &biome,
            road_weight_at: &road,
        };

        let radius = self.scheduler.structure_check_radius;
        let mut placed_total = 0u64;
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                if let Some(placed) = planner.check_coordinate(center.offset(dx, dz), &probe) {
                    placed_total += placed.len() as u64;
                }
            }
        }
        self.stats.structures_placed += placed_total;
    }

    /// Picks the missing coordinate with the lowest priority value:
    /// chunk-space distance, minus the flat bonus for view-aligned
    /// candidates. Ties break toward the smaller coordinate so the choice
    /// is deterministic.
    fn next_build_coord(&self, center: ChunkCoord, viewpoint: Viewpoint) -> Option<ChunkCoord> {
        let radius = self.scheduler.chunk_radius;
        let limit = radius as f64 + 0.5;
        let forward = DVec2::new(viewpoint.forward.x, viewpoint.forward.z);
        let forward = (forward.length_squared() > 1e-12).then(|| forward.normalize());
        let cos_limit = (self.scheduler.max_view_angle_degrees as f64).to_radians().cos();

        let mut best: Option<(f64, ChunkCoord)> = None;
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                let coord = center.offset(dx, dz);
                if self.chunks.contains_key(&coord) {
                    continue;
                }
                let distance = ((dx * dx + dz * dz) as f64).sqrt();
                if distance > limit {
                    continue;
                }
                let mut priority = distance;
                if let Some(forward) = forward {
                    let aligned = distance < 1e-9
                        || DVec2::new(dx as f64, dz as f64).normalize().dot(forward) >= cos_limit;
                    if aligned {
                        priority -= self.scheduler.view_bonus as f64;
                    }
                }
                let better = match best {
                    None => true,
                    Some((p, c)) => {
                        priority < p - 1e-12
                            || ((priority - p).abs() <= 1e-12 && (coord.x, coord.z) < (c.x, c.z))
                    }
                };
                if better {
                    best = Some((priority, coord));
                }
            }
        }
        best.map(|(_, coord)| coord)
    }

    fn build_chunk(&mut self, coord: ChunkCoord, viewpoint: Viewpoint, sink: &mut dyn StageSink) {
        let started = Instant::now();
        let generator = &self.generator;
        let fields = generator.generate_with(coord, &mut |stage| match stage {
            FieldStage::TextureNoise {
                temperature,
                moisture,
                biomes,
            } => sink.texture_noise_calculated(coord, temperature, moisture, biomes),
            FieldStage::ObjectNoise { vegetation, rock } => {
                sink.object_noise_calculated(coord, vegetation, rock)
            }
            FieldStage::ElevationNoise {
                surface,
                floor_weight,
            } => sink.elevation_noise_calculated(coord, surface, floor_weight),
            FieldStage::RidgedNoise { passes } => sink.ridged_noise_calculated(coord, passes),
            FieldStage::TerrainNoise { density } => sink.terrain_noise_calculated(coord, density),
            FieldStage::Roads {
                weight,
                start_height,
            } => sink.roads_calculated(coord, weight, start_height),
        });

        let mesh = strata_mesh::extract(&fields.density, self.extents, generator.iso_threshold());
        sink.mesh_calculated(coord, &mesh);

        let bounds = self.ledger.influence_bounds(coord);
        let batches = place_objects(
            self.seed,
            &fields,
            &mesh,
            generator.catalog(),
            &bounds,
            &self.scatter,
        );
        sink.object_transforms_calculated(coord, &batches);

        let mut chunk = Chunk::new(coord, fields, mesh);
        for def in &self.scatter.objects {
            if def.combine
                && let Some(transforms) = batches.get(&def.id)
                && let Some(template) = self.templates.get(&def.id)
            {
                chunk.combined.insert(def.id, combine_instances(template, transforms));
            }
        }
        chunk.batches = batches;

        let distance = horizontal_distance(coord.world_center(self.extents), viewpoint.position);
        if distance <= self.scheduler.collider_min_distance as f64 {
            chunk.collider_baked = true;
            self.stats.colliders_baked += 1;
        } else {
            self.collider_queue.push(coord);
        }

        chunk.state = ChunkState::Live;
        self.chunks.insert(coord, chunk);
        let elapsed = started.elapsed();
        self.stats.chunks_built += 1;
        self.stats.last_build = Some(elapsed);
        self.stats.total_build += elapsed;
        sink.chunk_generated(coord);
        debug!(
            chunk_x = coord.x,
            chunk_z = coord.z,
            ms = elapsed.as_secs_f64() * 1e3,
            "chunk generated"
        );
    }

    /// Toggles scatter instances spawned/despawned per object type by cull
    /// distance. Combined types follow chunk lifetime instead.
    fn update_culling(&mut self, viewpoint: Viewpoint) {
        let defs: FxHashMap<ObjectTypeId, (f32, bool)> = self
            .scatter
            .objects
            .iter()
            .map(|def| (def.id, (def.cull_distance, def.combine)))
            .collect();

        let mut transitions: Vec<(ObjectTypeId, usize, bool)> = Vec::new();
        for chunk in self.chunks.values_mut() {
            if chunk.state != ChunkState::Live {
                continue;
            }
            let distance =
                horizontal_distance(chunk.coord.world_center(self.extents), viewpoint.position);
            for (&id, transforms) in &chunk.batches {
                let Some(&(cull, combine)) = defs.get(&id) else {
                    continue;
                };
                if combine {
                    continue;
                }
                let visible = distance <= cull as f64;
                if visible && chunk.visible_types.insert(id) {
                    transitions.push((id, transforms.len(), true));
                } else if !visible && chunk.visible_types.remove(&id) {
                    transitions.push((id, transforms.len(), false));
                }
            }
        }
        for (id, count, spawned) in transitions {
            if spawned {
                self.pools.spawn(id, count);
            } else {
                self.pools.release(id, count);
            }
        }
    }

    /// Bakes queued colliders once the batch threshold is reached.
    fn flush_colliders(&mut self) {
        if self.collider_queue.is_empty()
            || self.collider_queue.len() < self.scheduler.collider_batch_size
        {
            return;
        }
        let batch = std::mem::take(&mut self.collider_queue);
        let size = batch.len();
        for coord in batch {
            if let Some(chunk) = self.chunks.get_mut(&coord)
                && !chunk.collider_baked
            {
                chunk.collider_baked = true;
                self.stats.colliders_baked += 1;
            }
        }
        debug!(size, "collider batch baked");
    }

    /// Disposes and rebuilds one chunk. `immediate` rebuilds inside this
    /// call; otherwise the scheduler re-queues it for a later tick.
    pub fn respawn_chunk(
        &mut self,
        coord: ChunkCoord,
        immediate: bool,
        sink: &mut dyn StageSink,
    ) -> Result<(), WorldError> {
        if !self.chunks.contains_key(&coord) {
            return Err(WorldError::ChunkNotLive(coord));
        }
        self.despawn_chunk(coord, sink);
        if immediate {
            let viewpoint = self.last_viewpoint;
            self.build_chunk(coord, viewpoint, sink);
        }
        Ok(())
    }

    /// Disposes every live chunk, wipes the deformation ledger, and restarts
    /// generation under a new seed.
    pub fn reseed(&mut self, seed: u64, sink: &mut dyn StageSink) {
        let coords: Vec<ChunkCoord> = self.chunks.keys().copied().collect();
        for coord in coords {
            self.despawn_chunk(coord, sink);
        }
        self.ledger.clear();
        self.pools.clear();
        self.collider_queue.clear();
        self.seed = seed;
        self.generator = DensityGenerator::new(
            seed,
            self.extents,
            self.field_settings.clone(),
            self.catalog.clone(),
            Arc::clone(&self.ledger),
        );
        self.planner = self.field_settings.structures_enabled.then(|| {
            StructurePlanner::new(
                seed,
                self.extents,
                self.structure_settings.clone(),
                self.catalog.clone(),
                Arc::clone(&self.ledger),
            )
        });
        info!(seed, "world reseeded");
    }

    // Point queries, all in world coordinates.

    pub fn surface_level(&self, wx: f64, wz: f64) -> f32 {
        self.generator.surface_level(wx, wz)
    }

    pub fn biome_weights(&self, wx: f64, wz: f64) -> BiomeWeights {
        self.generator.weights_at(wx, wz)
    }

    pub fn strongest_biome(&self, wx: f64, wz: f64) -> BiomeId {
        self.generator.strongest_biome(wx, wz)
    }

    pub fn elevation_sample(&self, wx: f64, wz: f64) -> f32 {
        self.generator.elevation_sample(wx, wz)
    }

    pub fn vegetation_sample(&self, wx: f64, wz: f64) -> f32 {
        self.generator.vegetation_sample(wx, wz)
    }

    pub fn rock_sample(&self, wx: f64, wz: f64) -> f32 {
        self.generator.rock_sample(wx, wz)
    }

    /// `(road weight, road start height)` at a world position.
    pub fn road_sample(&self, wx: f64, wz: f64) -> (f32, f32) {
        self.generator.road_sample(wx, wz)
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn chunk_at(&self, wx: f64, wz: f64) -> Option<&Chunk> {
        self.chunks.get(&ChunkCoord::from_world(wx, wz, self.extents))
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn extents(&self) -> ChunkExtents {
        self.extents
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    pub fn pools(&self) -> &PoolManager {
        &self.pools
    }

    pub fn ledger(&self) -> &Arc<DeformationLedger> {
        &self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use strata_biome::{BiomeDefinition, StructureTypeId};
    use strata_carve::StructurePrefabDef;

    fn small_extents() -> ChunkExtents {
        ChunkExtents {
            size_x: 8,
            size_y: 16,
            size_z: 8,
        }
    }

    fn fast_field_settings() -> FieldSettings {
        FieldSettings {
            horizontal_sample_rate: 2,
            vertical_sample_rate: 2,
            weight_grid_resolution: 8,
            ridged_passes: Vec::new(),
            roads: None,
            structures_enabled: false,
            ..FieldSettings::default()
        }
    }

    fn small_world(scheduler: SchedulerSettings) -> World {
        World::new(
            7,
            small_extents(),
            fast_field_settings(),
            StructureSettings::default(),
            ScatterSettings::default(),
            scheduler,
            BiomeCatalog::new(vec![BiomeDefinition::fallback()]),
        )
        .expect("world construction")
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<&'static str>,
    }

    impl StageSink for RecordingSink {
        fn texture_noise_calculated(
            &mut self,
            _: ChunkCoord,
            _: &[f32],
            _: &[f32],
            _: &[BiomeId],
        ) {
            self.events.push("texture");
        }
        fn object_noise_calculated(&mut self, _: ChunkCoord, _: &[f32], _: &[f32]) {
            self.events.push("object");
        }
        fn terrain_noise_calculated(&mut self, _: ChunkCoord, _: &[f32]) {
            self.events.push("terrain");
        }
        fn mesh_calculated(&mut self, _: ChunkCoord, _: &ChunkMesh) {
            self.events.push("mesh");
        }
        fn object_transforms_calculated(&mut self, _: ChunkCoord, _: &strata_scatter::ScatterBatches) {
            self.events.push("transforms");
        }
        fn chunk_generated(&mut self, _: ChunkCoord) {
            self.events.push("generated");
        }
        fn chunk_despawned(&mut self, _: ChunkCoord) {
            self.events.push("despawned");
        }
    }

    #[test]
    fn test_one_chunk_built_per_tick_starting_at_center() {
        let mut world = small_world(SchedulerSettings::default());
        let viewpoint = Viewpoint::default();
        world.tick(viewpoint, &mut NullSink);
        assert_eq!(world.chunk_count(), 1);
        let center = world.chunk(ChunkCoord::new(0, 0));
        assert!(center.is_some(), "The viewpoint's own chunk must build first");
        assert_eq!(
            center.unwrap().state,
            ChunkState::Live,
            "A finished build must leave the chunk live"
        );
        world.tick(viewpoint, &mut NullSink);
        world.tick(viewpoint, &mut NullSink);
        assert_eq!(world.chunk_count(), 3, "Exactly one build per tick");
    }

    #[test]
    fn test_view_aligned_candidate_builds_before_others() {
        let mut world = small_world(SchedulerSettings {
            view_bonus: 3.0,
            ..SchedulerSettings::default()
        });
        let viewpoint = Viewpoint {
            position: DVec3::ZERO,
            forward: DVec3::X,
        };
        world.tick(viewpoint, &mut NullSink);
        world.tick(viewpoint, &mut NullSink);
        assert!(
            world.chunk(ChunkCoord::new(1, 0)).is_some(),
            "The forward-aligned neighbor must outrank closer-ranked side chunks"
        );
    }

    #[test]
    fn test_stage_events_fire_in_pipeline_order() {
        let mut world = small_world(SchedulerSettings::default());
        let mut sink = RecordingSink::default();
        world.tick(Viewpoint::default(), &mut sink);
        let position = |name| {
            sink.events
                .iter()
                .position(|e| *e == name)
                .unwrap_or_else(|| panic!("missing event {name}, got {:?}", sink.events))
        };
        assert!(position("texture") < position("terrain"));
        assert!(position("terrain") < position("mesh"));
        assert!(position("mesh") < position("transforms"));
        assert!(position("transforms") < position("generated"));
    }

    #[test]
    fn test_chunks_outside_retention_radius_despawn() {
        let mut world = small_world(SchedulerSettings {
            chunk_radius: 1,
            ..SchedulerSettings::default()
        });
        let near = Viewpoint::default();
        for _ in 0..5 {
            world.tick(near, &mut NullSink);
        }
        assert!(world.chunk_count() >= 5);

        let mut sink = RecordingSink::default();
        let far = Viewpoint {
            position: DVec3::new(10_000.0, 0.0, 0.0),
            forward: DVec3::Z,
        };
        world.tick(far, &mut sink);
        assert!(
            world.chunk(ChunkCoord::new(0, 0)).is_none(),
            "Out-of-range chunks must be disposed"
        );
        assert!(
            sink.events.iter().filter(|e| **e == "despawned").count() >= 5,
            "Each disposal must fire the despawn event"
        );
    }

    #[test]
    fn test_respawn_requires_live_chunk() {
        let mut world = small_world(SchedulerSettings::default());
        let missing = ChunkCoord::new(40, 40);
        assert!(matches!(
            world.respawn_chunk(missing, true, &mut NullSink),
            Err(WorldError::ChunkNotLive(_))
        ));
    }

    #[test]
    fn test_immediate_respawn_rebuilds_in_place() {
        let mut world = small_world(SchedulerSettings::default());
        world.tick(Viewpoint::default(), &mut NullSink);
        let coord = ChunkCoord::new(0, 0);
        world
            .respawn_chunk(coord, true, &mut NullSink)
            .expect("respawn of a live chunk");
        assert!(world.chunk(coord).is_some());
        assert_eq!(world.stats().chunks_built, 2);
        assert_eq!(world.stats().chunks_despawned, 1);
    }

    #[test]
    fn test_reseed_disposes_everything_and_clears_ledger() {
        let mut world = small_world(SchedulerSettings::default());
        for _ in 0..3 {
            world.tick(Viewpoint::default(), &mut NullSink);
        }
        world
            .ledger()
            .add_density_delta(ChunkCoord::new(0, 0), 0, 1.0);
        world.reseed(99, &mut NullSink);
        assert_eq!(world.chunk_count(), 0);
        assert_eq!(world.seed(), 99);
        assert_eq!(
            world.ledger().density_delta_count(ChunkCoord::new(0, 0)),
            0,
            "Reseeding must wipe persisted deformations"
        );
    }

    #[test]
    fn test_nearby_collider_bakes_immediately() {
        let mut world = small_world(SchedulerSettings {
            collider_min_distance: 1000.0,
            ..SchedulerSettings::default()
        });
        world.tick(Viewpoint::default(), &mut NullSink);
        let chunk = world.chunk(ChunkCoord::new(0, 0)).unwrap();
        assert!(chunk.collider_baked, "Chunks inside the minimum distance skip the batch queue");
        assert_eq!(world.stats().colliders_baked, 1);
    }

    #[test]
    fn test_distant_colliders_wait_for_batch() {
        let mut world = small_world(SchedulerSettings {
            collider_min_distance: 0.0,
            collider_batch_size: 3,
            ..SchedulerSettings::default()
        });
        let viewpoint = Viewpoint::default();
        world.tick(viewpoint, &mut NullSink);
        world.tick(viewpoint, &mut NullSink);
        assert_eq!(world.stats().colliders_baked, 0, "Below the batch threshold nothing bakes");
        world.tick(viewpoint, &mut NullSink);
        assert_eq!(world.stats().colliders_baked, 3, "Reaching the threshold bakes the batch");
    }

    #[test]
    fn test_structure_sweep_places_into_ledger() {
        let mut biome = BiomeDefinition::fallback();
        biome.structures = vec![StructureTypeId(1)];
        let mut world = World::new(
            7,
            small_extents(),
            FieldSettings {
                structures_enabled: true,
                ..fast_field_settings()
            },
            StructureSettings {
                check_stride: 1,
                spawn_chance: 1.0,
                prefabs: vec![StructurePrefabDef::minimal(StructureTypeId(1), "outpost")],
                ..StructureSettings::default()
            },
            ScatterSettings::default(),
            SchedulerSettings {
                structure_check_radius: 1,
                ..SchedulerSettings::default()
            },
            BiomeCatalog::new(vec![biome]),
        )
        .unwrap();
        world.tick(Viewpoint::default(), &mut NullSink);
        assert!(
            world.stats().structures_placed > 0,
            "An always-spawning structure must place during the sweep"
        );
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        let result = World::new(
            1,
            small_extents(),
            fast_field_settings(),
            StructureSettings::default(),
            ScatterSettings::default(),
            SchedulerSettings::default(),
            BiomeCatalog::new(Vec::new()),
        );
        assert!(matches!(result, Err(WorldError::EmptyCatalog)));
    }
}
