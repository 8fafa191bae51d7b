//! Chunk addressing, chunk extents, and voxel/column index mapping.
//!
//! Chunks are addressed by integer `(x, z)` grid coordinates. Each chunk
//! samples `size + 1` points per axis so that adjacent chunks share their
//! border samples exactly — the seam guarantee of the whole pipeline rests
//! on this convention.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Identifies a chunk's position on the world grid.
///
/// One chunk exists per coordinate at most; the scheduler enforces 1:1
/// addressing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// Chunk-grid X coordinate.
    pub x: i32,
    /// Chunk-grid Z coordinate.
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Returns the coordinate offset by `(dx, dz)`.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// The chunk containing the given world-space XZ position.
    pub fn from_world(world_x: f64, world_z: f64, extents: ChunkExtents) -> Self {
        Self {
            x: (world_x / extents.size_x as f64).floor() as i32,
            z: (world_z / extents.size_z as f64).floor() as i32,
        }
    }

    /// World-space position of this chunk's minimum corner (XZ plane).
    pub fn world_min(self, extents: ChunkExtents) -> DVec2 {
        DVec2::new(
            self.x as f64 * extents.size_x as f64,
            self.z as f64 * extents.size_z as f64,
        )
    }

    /// World-space position of this chunk's center at ground level.
    pub fn world_center(self, extents: ChunkExtents) -> DVec3 {
        let min = self.world_min(extents);
        DVec3::new(
            min.x + extents.size_x as f64 * 0.5,
            0.0,
            min.y + extents.size_z as f64 * 0.5,
        )
    }

    /// Squared euclidean distance between chunk centers, in world units.
    pub fn distance_sq(self, other: ChunkCoord, extents: ChunkExtents) -> f64 {
        let a = self.world_center(extents);
        let b = other.world_center(extents);
        (a - b).length_squared()
    }
}

/// Per-axis voxel cell counts for a chunk.
///
/// A chunk spans `size_x × size_y × size_z` cells; the sampled field has one
/// extra sample per axis (`samples_* = size_* + 1`) so borders are shared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkExtents {
    /// Cell count along X.
    pub size_x: u32,
    /// Cell count along Y (vertical).
    pub size_y: u32,
    /// Cell count along Z.
    pub size_z: u32,
}

impl Default for ChunkExtents {
    fn default() -> Self {
        Self {
            size_x: 32,
            size_y: 64,
            size_z: 32,
        }
    }
}

impl ChunkExtents {
    /// Number of samples along X (`size_x + 1`).
    #[inline]
    pub fn samples_x(self) -> usize {
        self.size_x as usize + 1
    }

    /// Number of samples along Y (`size_y + 1`).
    #[inline]
    pub fn samples_y(self) -> usize {
        self.size_y as usize + 1
    }

    /// Number of samples along Z (`size_z + 1`).
    #[inline]
    pub fn samples_z(self) -> usize {
        self.size_z as usize + 1
    }

    /// Total number of field samples in a chunk.
    #[inline]
    pub fn sample_count(self) -> usize {
        self.samples_x() * self.samples_y() * self.samples_z()
    }

    /// Number of 2D columns (XZ samples) in a chunk.
    #[inline]
    pub fn column_count(self) -> usize {
        self.samples_x() * self.samples_z()
    }

    /// Linear index of sample `(x, y, z)`.
    ///
    /// Column-major along Y: a full vertical column is contiguous, which
    /// lets the per-column kernels hand out disjoint slices.
    #[inline]
    pub fn voxel_index(self, x: usize, y: usize, z: usize) -> usize {
        y + self.samples_y() * (x + self.samples_x() * z)
    }

    /// Linear index of column `(x, z)`.
    #[inline]
    pub fn column_index(self, x: usize, z: usize) -> usize {
        x + self.samples_x() * z
    }

    /// Inverse of [`column_index`](Self::column_index).
    #[inline]
    pub fn column_coords(self, column: usize) -> (usize, usize) {
        (column % self.samples_x(), column / self.samples_x())
    }
}

/// Maps a world-space position to the chunk that owns it plus the local
/// sample coordinates inside that chunk.
///
/// Positions on a shared border map to the chunk on the positive side;
/// callers that need to touch every overlapping chunk (ledger writers)
/// enumerate neighbors explicitly.
pub fn world_to_chunk_local(
    world_x: f64,
    world_y: f64,
    world_z: f64,
    extents: ChunkExtents,
) -> (ChunkCoord, usize, usize, usize) {
    let coord = ChunkCoord::from_world(world_x, world_z, extents);
    let min = coord.world_min(extents);
    let lx = (world_x - min.x).round() as usize;
    let ly = world_y.round().clamp(0.0, extents.size_y as f64) as usize;
    let lz = (world_z - min.y).round() as usize;
    (
        coord,
        lx.min(extents.size_x as usize),
        ly,
        lz.min(extents.size_z as usize),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_world_handles_negative_positions() {
        let extents = ChunkExtents::default();
        assert_eq!(
            ChunkCoord::from_world(-0.5, -0.5, extents),
            ChunkCoord::new(-1, -1),
            "Positions just below zero belong to chunk (-1, -1)"
        );
        assert_eq!(
            ChunkCoord::from_world(0.0, 0.0, extents),
            ChunkCoord::new(0, 0)
        );
        assert_eq!(
            ChunkCoord::from_world(31.9, 63.9, extents),
            ChunkCoord::new(0, 1),
            "Chunk size is 32 along Z as well; 63.9 is in chunk z=1"
        );
    }

    #[test]
    fn test_voxel_index_is_bijective() {
        let extents = ChunkExtents {
            size_x: 4,
            size_y: 8,
            size_z: 4,
        };
        let mut seen = vec![false; extents.sample_count()];
        for z in 0..extents.samples_z() {
            for x in 0..extents.samples_x() {
                for y in 0..extents.samples_y() {
                    let idx = extents.voxel_index(x, y, z);
                    assert!(!seen[idx], "Duplicate index {idx} at ({x}, {y}, {z})");
                    seen[idx] = true;
                }
            }
        }
        assert!(seen.iter().all(|&s| s), "Index mapping must cover the grid");
    }

    #[test]
    fn test_columns_are_contiguous_in_y() {
        let extents = ChunkExtents {
            size_x: 4,
            size_y: 8,
            size_z: 4,
        };
        let base = extents.voxel_index(2, 0, 3);
        for y in 0..extents.samples_y() {
            assert_eq!(
                extents.voxel_index(2, y, 3),
                base + y,
                "Column samples must be adjacent in memory"
            );
        }
    }

    #[test]
    fn test_column_coords_round_trip() {
        let extents = ChunkExtents::default();
        for col in 0..extents.column_count() {
            let (x, z) = extents.column_coords(col);
            assert_eq!(extents.column_index(x, z), col);
        }
    }

    #[test]
    fn test_world_min_matches_coordinate_grid() {
        let extents = ChunkExtents::default();
        let min = ChunkCoord::new(-2, 3).world_min(extents);
        assert_eq!(min.x, -64.0);
        assert_eq!(min.y, 96.0);
    }

    #[test]
    fn test_world_to_chunk_local_border_convention() {
        let extents = ChunkExtents::default();
        let (coord, lx, _, lz) = world_to_chunk_local(32.0, 0.0, 0.0, extents);
        assert_eq!(coord, ChunkCoord::new(1, 0), "Border sample maps to +X chunk");
        assert_eq!((lx, lz), (0, 0));
    }
}
