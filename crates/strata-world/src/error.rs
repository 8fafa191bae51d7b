//! World error types.

use strata_coords::ChunkCoord;

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The biome catalog has no entries; generation needs at least one.
    #[error("biome catalog is empty")]
    EmptyCatalog,

    /// The requested chunk is not live.
    #[error("chunk ({}, {}) is not live", .0.x, .0.z)]
    ChunkNotLive(ChunkCoord),
}
