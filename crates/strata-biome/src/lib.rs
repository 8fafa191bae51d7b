//! Biome definitions and the precomputed biome weight field.
//!
//! Biomes are immutable after world initialization; ids index into the
//! catalog and stay stable for a session.

mod definition;
mod weight_grid;

pub use definition::{
    BiomeBounds, BiomeCatalog, BiomeDefinition, BiomeId, ElevationShaping, ObjectTypeId,
    StructureTypeId, VoronoiShaping,
};
pub use weight_grid::{BiomeWeightGrid, BiomeWeights};
