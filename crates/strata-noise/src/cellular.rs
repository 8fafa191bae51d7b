//! Cellular (Voronoi) noise with an F2−F1 distance metric.
//!
//! Each cell of an integer lattice owns one deterministic feature point;
//! the metric is the difference between the second-closest and closest
//! feature distances, which is zero on cell boundaries and peaks at cell
//! centers — the characteristic ridged-cell look used for canyons and
//! caves. The octave sum is modulated by a second, independent sample of
//! the same metric at a coarser frequency so canyon strength varies
//! organically across the world.

use serde::{Deserialize, Serialize};

use crate::fractal::geometric_amplitude;
use crate::offsets::derive_stream_seed;

/// Parameters for a cellular noise channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellularParams {
    /// Number of octaves of the F2−F1 metric to composite.
    pub octaves: u32,
    /// Frequency of the first octave (cells per world unit).
    pub frequency: f64,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
    /// Amplitude multiplier per octave.
    pub persistence: f64,
    /// Frequency of the self-modulation sample. Much lower than
    /// `frequency`, so the modulation varies over whole regions.
    pub application_frequency: f64,
    /// Overall strength multiplier applied by the density composer.
    /// Positive strength carves; negative mounds.
    pub strength: f64,
    /// Salt combined with the world seed.
    pub seed_salt: u64,
}

impl Default for CellularParams {
    fn default() -> Self {
        Self {
            octaves: 2,
            frequency: 0.02,
            lacunarity: 2.0,
            persistence: 0.5,
            application_frequency: 0.002,
            strength: 1.0,
            seed_salt: 0,
        }
    }
}

/// Samples self-modulated cellular noise in 3D.
pub struct CellularSampler {
    params: CellularParams,
    stream_seed: u64,
    modulation_seed: u64,
    max_amplitude: f64,
}

impl CellularSampler {
    /// Builds a sampler for one cellular channel.
    pub fn new(world_seed: u64, params: CellularParams) -> Self {
        let stream_seed = derive_stream_seed(world_seed, params.seed_salt);
        let modulation_seed = derive_stream_seed(world_seed, params.seed_salt.wrapping_add(0x9E37));
        let max_amplitude = geometric_amplitude(params.octaves, params.persistence);
        Self {
            params,
            stream_seed,
            modulation_seed,
            max_amplitude,
        }
    }

    /// Samples the modulated cell metric at a 3D world coordinate.
    ///
    /// Result in `[0, 1]`: octave-summed F2−F1, normalized, multiplied by
    /// an independent coarse F2−F1 sample of the same metric.
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        if self.params.octaves == 0 || self.max_amplitude == 0.0 {
            return 0.0;
        }
        let mut total = 0.0;
        let mut frequency = self.params.frequency;
        let mut amplitude = 1.0;
        for octave in 0..self.params.octaves {
            let seed = self.stream_seed.wrapping_add(octave as u64);
            total += f2_minus_f1(x * frequency, y * frequency, z * frequency, seed) * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }
        let base = (total / self.max_amplitude).clamp(0.0, 1.0);

        let f = self.params.application_frequency;
        let modulation = f2_minus_f1(x * f, y * f, z * f, self.modulation_seed).clamp(0.0, 1.0);
        base * modulation
    }

    /// Configured strength multiplier (sign carries carve/mound direction).
    pub fn strength(&self) -> f64 {
        self.params.strength
    }

    /// Returns the parameters this sampler was built with.
    pub fn params(&self) -> &CellularParams {
        &self.params
    }
}

/// F2−F1 cell distance metric at a lattice-space point.
///
/// Scans the 3×3×3 cell neighborhood; each cell's feature point is a pure
/// hash of `(cell, seed)`. The result is in `[0, ~1]` for unit cells.
fn f2_minus_f1(x: f64, y: f64, z: f64, seed: u64) -> f64 {
    let cx = x.floor() as i64;
    let cy = y.floor() as i64;
    let cz = z.floor() as i64;

    let mut closest = f64::INFINITY;
    let mut second = f64::INFINITY;
    for dz in -1..=1 {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (fx, fy, fz) = feature_point(cx + dx, cy + dy, cz + dz, seed);
                let ddx = fx - x;
                let ddy = fy - y;
                let ddz = fz - z;
                let dist = libm::sqrt(ddx * ddx + ddy * ddy + ddz * ddz);
                if dist < closest {
                    second = closest;
                    closest = dist;
                } else if dist < second {
                    second = dist;
                }
            }
        }
    }
    (second - closest).max(0.0)
}

/// Deterministic feature point inside cell `(cx, cy, cz)`.
fn feature_point(cx: i64, cy: i64, cz: i64, seed: u64) -> (f64, f64, f64) {
    let h = cell_hash(cx, cy, cz, seed);
    // Three independent 16-bit lanes mapped to [0, 1).
    let fx = (h & 0xFFFF) as f64 / 65536.0;
    let fy = ((h >> 16) & 0xFFFF) as f64 / 65536.0;
    let fz = ((h >> 32) & 0xFFFF) as f64 / 65536.0;
    (cx as f64 + fx, cy as f64 + fy, cz as f64 + fz)
}

/// Integer mix of a lattice cell and seed (splitmix-style finalizer).
fn cell_hash(cx: i64, cy: i64, cz: i64, seed: u64) -> u64 {
    let mut h = seed
        ^ (cx as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (cy as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ (cz as u64).wrapping_mul(0x1656_67B1_9E37_79F9);
    h ^= h >> 30;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 27;
    h = h.wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}
