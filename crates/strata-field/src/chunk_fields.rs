//! Per-chunk field buffers produced by the density generator.

use strata_biome::BiomeId;
use strata_coords::{ChunkCoord, ChunkExtents};

/// All scalar fields of one chunk.
///
/// The density buffer is column-major with y contiguous
/// (`index = y + samples_y * column`), so per-column kernels hand out
/// contiguous slices. 2D buffers are indexed by
/// [`ChunkExtents::column_index`].
#[derive(Clone, Debug)]
pub struct ChunkFields {
    pub coord: ChunkCoord,
    pub extents: ChunkExtents,
    /// 3D scalar density, `sample_count` entries.
    pub density: Vec<f32>,
    /// Dominant biome per column.
    pub biome_ids: Vec<BiomeId>,
    pub temperature: Vec<f32>,
    pub moisture: Vec<f32>,
    pub vegetation: Vec<f32>,
    pub rock: Vec<f32>,
    /// Blended elevation surface height per column (0 when elevation shaping
    /// is disabled).
    pub surface_height: Vec<f32>,
    pub road_weight: Vec<f32>,
    pub road_start_height: Vec<f32>,
}

impl ChunkFields {
    pub fn new(coord: ChunkCoord, extents: ChunkExtents) -> Self {
        let columns = extents.column_count();
        Self {
            coord,
            extents,
            density: vec![0.0; extents.sample_count()],
            biome_ids: vec![BiomeId(0); columns],
            temperature: vec![0.0; columns],
            moisture: vec![0.0; columns],
            vegetation: vec![0.0; columns],
            rock: vec![0.0; columns],
            surface_height: vec![0.0; columns],
            road_weight: vec![0.0; columns],
            road_start_height: vec![0.0; columns],
        }
    }

    /// Density at local sample coordinates.
    pub fn density_at(&self, x: usize, y: usize, z: usize) -> f32 {
        self.density[self.extents.voxel_index(x, y, z)]
    }

    /// Dominant biome of the column containing `(x, z)`.
    pub fn biome_at(&self, x: usize, z: usize) -> BiomeId {
        self.biome_ids[self.extents.column_index(x, z)]
    }

    /// Road weight and start height of the column containing `(x, z)`.
    pub fn road_at(&self, x: usize, z: usize) -> (f32, f32) {
        let column = self.extents.column_index(x, z);
        (self.road_weight[column], self.road_start_height[column])
    }
}
