//! Configuration for the terrain generator.
//!
//! Aggregates every subsystem's settings into one RON file that persists to
//! disk, with forward/backward compatible serialization via per-section
//! `#[serde(default)]`.

mod config;
mod error;

pub use config::{WorldGenConfig, WorldSection};
pub use error::ConfigError;
