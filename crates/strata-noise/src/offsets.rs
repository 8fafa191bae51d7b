//! Per-octave pseudo-random offset derivation from the world seed.
//!
//! Each noise channel (temperature, moisture, terrain, elevation, ...) owns
//! a `seed_salt`; combining it with the world seed yields an independent,
//! deterministic offset table so channels decorrelate without extra noise
//! sources.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::{DVec2, DVec3};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Offsets are drawn from this symmetric range; large enough that octaves
/// land in unrelated regions of the gradient-noise domain.
const OFFSET_RANGE: f64 = 100_000.0;

/// Derive an independent u64 stream seed from the world seed and a salt.
///
/// Uses SipHash (std's `DefaultHasher`) so nearby salts produce unrelated
/// streams.
pub fn derive_stream_seed(world_seed: u64, salt: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    salt.hash(&mut hasher);
    hasher.finish()
}

/// Per-octave 2D sample offsets for a noise channel.
///
/// The returned table is a pure function of `(world_seed, salt, octaves)`.
pub fn octave_offsets_2d(world_seed: u64, salt: u64, octaves: u32) -> Vec<DVec2> {
    let mut rng = ChaCha8Rng::seed_from_u64(derive_stream_seed(world_seed, salt));
    (0..octaves)
        .map(|_| {
            DVec2::new(
                rng.random_range(-OFFSET_RANGE..OFFSET_RANGE),
                rng.random_range(-OFFSET_RANGE..OFFSET_RANGE),
            )
        })
        .collect()
}

/// Per-octave 3D sample offsets for a noise channel.
pub fn octave_offsets_3d(world_seed: u64, salt: u64, octaves: u32) -> Vec<DVec3> {
    let mut rng = ChaCha8Rng::seed_from_u64(derive_stream_seed(world_seed, salt));
    (0..octaves)
        .map(|_| {
            DVec3::new(
                rng.random_range(-OFFSET_RANGE..OFFSET_RANGE),
                rng.random_range(-OFFSET_RANGE..OFFSET_RANGE),
                rng.random_range(-OFFSET_RANGE..OFFSET_RANGE),
            )
        })
        .collect()
}
