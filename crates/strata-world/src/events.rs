//! Per-stage notification hooks for downstream consumers.

use strata_biome::BiomeId;
use strata_coords::ChunkCoord;
use strata_mesh::ChunkMesh;
use strata_scatter::ScatterBatches;

/// Receives pipeline stage results as they complete, synchronously on the
/// driving thread. Rendering and physics layers implement the methods they
/// care about; every method defaults to a no-op.
#[allow(unused_variables)]
pub trait StageSink {
    fn texture_noise_calculated(
        &mut self,
        coord: ChunkCoord,
        temperature: &[f32],
        moisture: &[f32],
        biomes: &[BiomeId],
    ) {
    }

    fn object_noise_calculated(&mut self, coord: ChunkCoord, vegetation: &[f32], rock: &[f32]) {}

    fn elevation_noise_calculated(
        &mut self,
        coord: ChunkCoord,
        surface: &[f32],
        floor_weight: &[f32],
    ) {
    }

    fn ridged_noise_calculated(&mut self, coord: ChunkCoord, passes: &[Vec<f32>]) {}

    fn terrain_noise_calculated(&mut self, coord: ChunkCoord, density: &[f32]) {}

    fn roads_calculated(&mut self, coord: ChunkCoord, weight: &[f32], start_height: &[f32]) {}

    fn mesh_calculated(&mut self, coord: ChunkCoord, mesh: &ChunkMesh) {}

    fn object_transforms_calculated(&mut self, coord: ChunkCoord, batches: &ScatterBatches) {}

    fn chunk_generated(&mut self, coord: ChunkCoord) {}

    fn chunk_despawned(&mut self, coord: ChunkCoord) {}
}

/// Sink that drops every event.
pub struct NullSink;

impl StageSink for NullSink {}
