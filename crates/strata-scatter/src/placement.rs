//! Per-vertex scatter placement kernel.

use glam::{DVec3, Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use strata_biome::{BiomeCatalog, ObjectTypeId};
use strata_coords::ChunkCoord;
use strata_field::ChunkFields;
use strata_ledger::InfluenceBound;
use strata_mesh::{ChunkMesh, MeshVertex};
use strata_noise::derive_stream_seed;
use tracing::trace;

use crate::settings::{ObjectTypeDef, OffsetSpace, ScaleRange, ScatterSettings};

/// One placed instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterTransform {
    /// World position.
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

/// Transform batches for one chunk, keyed by object type.
pub type ScatterBatches = FxHashMap<ObjectTypeId, Vec<ScatterTransform>>;

/// Deterministic per-(vertex, object) RNG stream. Independent of generation
/// order and of every other object type's stream.
fn vertex_seed(world_seed: u64, coord: ChunkCoord, vertex: usize, object: ObjectTypeId) -> u64 {
    let chunk = ((coord.x as u32 as u64) << 32) | coord.z as u32 as u64;
    derive_stream_seed(
        derive_stream_seed(world_seed, chunk),
        ((vertex as u64) << 32) | object.0 as u64,
    )
}

/// Classifies every mesh vertex in parallel and emits instance transforms
/// for each object type the vertex qualifies for.
///
/// A vertex qualifies for an object type when the type is registered to the
/// column's dominant biome, the vertex passes the height, steepness,
/// vegetation, and rock windows, is not on a road (road weight above the
/// threshold rejects unless the vertex height falls outside the road's
/// vertical band), and lies outside every structure influence bound. Each
/// qualifying vertex then rolls the type's spawn chance on its own RNG
/// stream.
pub fn place_objects(
    world_seed: u64,
    fields: &ChunkFields,
    mesh: &ChunkMesh,
    catalog: &BiomeCatalog,
    influence: &[InfluenceBound],
    settings: &ScatterSettings,
) -> ScatterBatches {
    let mut batches = ScatterBatches::default();
    if settings.objects.is_empty() || mesh.vertices.is_empty() {
        return batches;
    }

    let per_vertex: Vec<Vec<(ObjectTypeId, ScatterTransform)>> = mesh
        .vertices
        .par_iter()
        .enumerate()
        .map(|(index, vertex)| place_at_vertex(world_seed, fields, catalog, influence, settings, index, vertex))
        .collect();

    for emitted in per_vertex {
        for (id, transform) in emitted {
            batches.entry(id).or_default().push(transform);
        }
    }
    trace!(
        chunk_x = fields.coord.x,
        chunk_z = fields.coord.z,
        types = batches.len(),
        instances = batches.values().map(Vec::len).sum::<usize>(),
        "scatter placement done"
    );
    batches
}

fn place_at_vertex(
    world_seed: u64,
    fields: &ChunkFields,
    catalog: &BiomeCatalog,
    influence: &[InfluenceBound],
    settings: &ScatterSettings,
    index: usize,
    vertex: &MeshVertex,
) -> Vec<(ObjectTypeId, ScatterTransform)> {
    let extents = fields.extents;
    let local = Vec3::from(vertex.position);
    let min = fields.coord.world_min(extents);
    let world = Vec3::new(min.x as f32 + local.x, local.y, min.y as f32 + local.z);
    let normal = Vec3::from(vertex.normal);
    let steepness = (1.0 - normal.dot(Vec3::Y)).clamp(0.0, 1.0);

    let cx = (local.x.round().max(0.0) as usize).min(extents.size_x as usize);
    let cz = (local.z.round().max(0.0) as usize).min(extents.size_z as usize);
    let column = extents.column_index(cx, cz);
    let vegetation = fields.vegetation[column];
    let rock = fields.rock[column];
    let (road_weight, road_start) = fields.road_at(cx, cz);
    let biome = fields.biome_at(cx, cz);
    let Some(biome_def) = catalog.get(biome) else {
        return Vec::new();
    };

    let on_road = road_weight > settings.road_weight_threshold
        && (world.y - road_start).abs() <= settings.road_band_height;
    let in_structure = influence
        .iter()
        .any(|bound| bound.contains(DVec3::new(world.x as f64, world.y as f64, world.z as f64)));

    let mut emitted = Vec::new();
    for def in &settings.objects {
        if !biome_def.objects.contains(&def.id) {
            continue;
        }
        if !passes_gates(def, world.y, steepness, vegetation, rock) || on_road || in_structure {
            continue;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(vertex_seed(world_seed, fields.coord, index, def.id));
        if rng.random::<f32>() >= def.spawn_chance {
            continue;
        }
        emitted.push((def.id, build_transform(def, world, normal, &mut rng)));
    }
    emitted
}

fn passes_gates(def: &ObjectTypeDef, height: f32, steepness: f32, vegetation: f32, rock: f32) -> bool {
    let within = |value: f32, (lo, hi): (f32, f32)| value >= lo && value <= hi;
    within(height, def.height_range)
        && within(steepness, def.steepness_range)
        && within(vegetation, def.vegetation_range)
        && within(rock, def.rock_range)
}

fn build_transform(
    def: &ObjectTypeDef,
    world: Vec3,
    normal: Vec3,
    rng: &mut ChaCha8Rng,
) -> ScatterTransform {
    let up_to_normal = normal.try_normalize().unwrap_or(Vec3::Y);
    let offset_dir = match def.offset_space {
        OffsetSpace::Up => Vec3::Y,
        OffsetSpace::Normal => up_to_normal,
    };
    let tilt = Quat::IDENTITY.slerp(
        Quat::from_rotation_arc(Vec3::Y, up_to_normal),
        def.slope_alignment.clamp(0.0, 1.0),
    );
    let yaw = Quat::from_rotation_y(rng.random_range(0.0..std::f32::consts::TAU));
    let scale = match def.scale {
        ScaleRange::None => Vec3::ONE,
        ScaleRange::Uniform { min, max } => Vec3::splat(rng.random_range(min..=max)),
        ScaleRange::PerAxis { x, y, z } => Vec3::new(
            rng.random_range(x.0..=x.1),
            rng.random_range(y.0..=y.1),
            rng.random_range(z.0..=z.1),
        ),
    };
    ScatterTransform {
        position: world + offset_dir * def.height_offset,
        rotation: tilt * yaw,
        scale,
    }
}
