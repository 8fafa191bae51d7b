//! Chunk density field generation.
//!
//! Turns (world seed, chunk coordinate, configuration) plus the shared
//! deformation ledger into the per-chunk scalar fields the mesher and
//! object placement consume.

mod chunk_fields;
mod generator;
mod settings;
mod sparse;

pub use chunk_fields::ChunkFields;
pub use generator::{DensityGenerator, FieldStage, hash_density_field};
pub use settings::{FieldSettings, RidgedPass, RoadPass, RoadSettings};
