//! Surface scatter object placement.
//!
//! Classifies the vertices of a finished chunk mesh (height, steepness,
//! biome noise channels, road proximity, structure influence) and emits
//! instance transforms per registered object type, each vertex rolling its
//! own deterministic RNG stream. Types marked combinable are merged into one
//! static mesh per chunk instead of spawning pooled instances.

mod combine;
mod placement;
mod settings;

pub use combine::combine_instances;
pub use placement::{place_objects, ScatterBatches, ScatterTransform};
pub use settings::{ObjectTypeDef, OffsetSpace, ScaleRange, ScatterSettings};
