//! Chunk scheduling and the world facade.
//!
//! Ties the generation crates together: each tick the [`World`] despawns
//! chunks that left the retention radius, sweeps structure eligibility,
//! builds the single highest-priority missing chunk through the full
//! pipeline (fields, mesh, scatter, collider), and reports each stage to a
//! [`StageSink`]. Point queries (surface level, biome/road samples) are
//! served straight from the generator, independent of chunk state.

mod chunk;
mod error;
mod events;
mod pool;
mod settings;
mod world;

pub use chunk::{Chunk, ChunkState};
pub use error::WorldError;
pub use events::{NullSink, StageSink};
pub use pool::{PoolManager, PoolStats};
pub use settings::{SchedulerSettings, Viewpoint};
pub use world::{GenerationStats, World};
