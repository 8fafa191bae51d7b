//! Headless demo driver for the terrain generator.
//!
//! Loads (or creates) `worldgen.ron`, builds a world, and runs the
//! scheduler for a number of ticks while the viewpoint travels forward,
//! printing generation statistics at the end.
//!
//! Run with `cargo run -p strata-demo -- [config_dir] [ticks]`.

use std::path::PathBuf;

use glam::DVec3;
use strata_biome::ObjectTypeId;
use strata_config::WorldGenConfig;
use strata_coords::ChunkCoord;
use strata_log::init_logging;
use strata_mesh::{ChunkMesh, MeshVertex};
use strata_world::{StageSink, Viewpoint, World};
use tracing::{error, info};

/// Counts stage events per kind.
#[derive(Default)]
struct CountingSink {
    generated: usize,
    meshes: usize,
    transform_batches: usize,
    despawned: usize,
}

impl StageSink for CountingSink {
    fn mesh_calculated(&mut self, _: ChunkCoord, _: &ChunkMesh) {
        self.meshes += 1;
    }

    fn object_transforms_calculated(
        &mut self,
        _: ChunkCoord,
        batches: &strata_scatter::ScatterBatches,
    ) {
        self.transform_batches += batches.len();
    }

    fn chunk_generated(&mut self, _: ChunkCoord) {
        self.generated += 1;
    }

    fn chunk_despawned(&mut self, _: ChunkCoord) {
        self.despawned += 1;
    }
}

/// Unit quad used as the combine template for combinable object types.
fn quad_template() -> ChunkMesh {
    let v = |x: f32, z: f32| MeshVertex {
        position: [x, 0.0, z],
        normal: [0.0, 1.0, 0.0],
        uv: [x, z],
    };
    ChunkMesh {
        vertices: vec![v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0), v(0.0, 1.0)],
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

fn main() {
    let mut args = std::env::args().skip(1);
    let config_dir = args.next().map_or_else(|| PathBuf::from("config"), PathBuf::from);
    let ticks: u32 = args.next().and_then(|t| t.parse().ok()).unwrap_or(120);

    let config = match WorldGenConfig::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("could not load config: {err}");
            std::process::exit(1);
        }
    };
    init_logging(None, cfg!(debug_assertions), Some(&config));

    let seed = config.effective_seed();
    info!(seed, ticks, "starting terrain demo");

    let mut world = match World::new(
        seed,
        config.extents,
        config.field.clone(),
        config.structures.clone(),
        config.scatter.clone(),
        config.scheduler.clone(),
        config.catalog(),
    ) {
        Ok(world) => world,
        Err(err) => {
            error!("could not create world: {err}");
            std::process::exit(1);
        }
    };
    let combinable: Vec<ObjectTypeId> = config
        .scatter
        .objects
        .iter()
        .filter(|def| def.combine)
        .map(|def| def.id)
        .collect();
    for id in combinable {
        world.register_template(id, quad_template());
    }

    // Travel forward at a steady pace so retention and despawn kick in.
    let forward = DVec3::X;
    let speed = config.extents.size_x as f64 * 0.25;
    let mut sink = CountingSink::default();
    for tick in 0..ticks {
        let viewpoint = Viewpoint {
            position: DVec3::new(tick as f64 * speed, 0.0, 0.0),
            forward,
        };
        world.tick(viewpoint, &mut sink);
    }

    let stats = world.stats();
    let position = DVec3::new(ticks as f64 * speed, 0.0, 0.0);
    info!(
        chunks_built = stats.chunks_built,
        chunks_despawned = stats.chunks_despawned,
        structures_placed = stats.structures_placed,
        colliders_baked = stats.colliders_baked,
        live_chunks = world.chunk_count(),
        live_instances = world.pools().live_total(),
        "run complete"
    );
    info!(
        generated = sink.generated,
        meshes = sink.meshes,
        transform_batches = sink.transform_batches,
        despawned = sink.despawned,
        "stage events observed"
    );
    if let Some(last) = stats.last_build {
        let avg_ms = if stats.chunks_built > 0 {
            stats.total_build.as_secs_f64() * 1e3 / stats.chunks_built as f64
        } else {
            0.0
        };
        info!(
            last_ms = last.as_secs_f64() * 1e3,
            avg_ms,
            "chunk build timings"
        );
    }
    info!(
        surface = world.surface_level(position.x, position.z),
        biome = world.strongest_biome(position.x, position.z).0,
        road_weight = world.road_sample(position.x, position.z).0,
        "samples at final position"
    );
}
