//! Multi-octave fractal gradient noise normalized to `[0, 1]`.

use glam::{DVec2, DVec3};
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::offsets::{derive_stream_seed, octave_offsets_2d, octave_offsets_3d};

/// Parameters for a fractal noise channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalParams {
    /// Number of octaves to composite. Typical range: 3–6.
    pub octaves: u32,
    /// Frequency of the first octave.
    pub frequency: f64,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
    /// Amplitude multiplier per octave.
    pub persistence: f64,
    /// Added after normalization to `[0, 1]`; the result is re-clamped.
    pub bias: f64,
    /// Salt combined with the world seed so channels decorrelate.
    pub seed_salt: u64,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            octaves: 4,
            frequency: 0.01,
            lacunarity: 2.0,
            persistence: 0.5,
            bias: 0.0,
            seed_salt: 0,
        }
    }
}

/// Samples biome/terrain fractal noise in 2D or 3D.
///
/// Each octave's input coordinate is shifted by a per-octave offset derived
/// once from `(world_seed, seed_salt)`; the weighted sum is normalized by
/// the geometric amplitude total, remapped to `[0, 1]`, biased, and clamped.
pub struct FractalSampler {
    perlin: Perlin,
    offsets_2d: Vec<DVec2>,
    offsets_3d: Vec<DVec3>,
    params: FractalParams,
    max_amplitude: f64,
}

impl FractalSampler {
    /// Builds a sampler for one noise channel.
    pub fn new(world_seed: u64, params: FractalParams) -> Self {
        let stream = derive_stream_seed(world_seed, params.seed_salt);
        let perlin = Perlin::new(stream as u32);
        let offsets_2d = octave_offsets_2d(world_seed, params.seed_salt, params.octaves);
        let offsets_3d = octave_offsets_3d(world_seed, params.seed_salt.wrapping_add(1), params.octaves);
        let max_amplitude = geometric_amplitude(params.octaves, params.persistence);
        Self {
            perlin,
            offsets_2d,
            offsets_3d,
            params,
            max_amplitude,
        }
    }

    /// Samples at a 2D world coordinate; result in `[0, 1]`.
    pub fn sample_2d(&self, x: f64, z: f64) -> f64 {
        if self.params.octaves == 0 || self.max_amplitude == 0.0 {
            // Fallback constant: mid-range plus bias.
            return (0.5 + self.params.bias).clamp(0.0, 1.0);
        }
        let mut total = 0.0;
        let mut frequency = self.params.frequency;
        let mut amplitude = 1.0;
        for off in &self.offsets_2d {
            let nx = (x + off.x) * frequency;
            let nz = (z + off.y) * frequency;
            total += self.perlin.get([nx, nz]) * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }
        self.normalize(total)
    }

    /// Samples at a 3D world coordinate; result in `[0, 1]`.
    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        if self.params.octaves == 0 || self.max_amplitude == 0.0 {
            return (0.5 + self.params.bias).clamp(0.0, 1.0);
        }
        let mut total = 0.0;
        let mut frequency = self.params.frequency;
        let mut amplitude = 1.0;
        for off in &self.offsets_3d {
            let nx = (x + off.x) * frequency;
            let ny = (y + off.y) * frequency;
            let nz = (z + off.z) * frequency;
            total += self.perlin.get([nx, ny, nz]) * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }
        self.normalize(total)
    }

    /// Returns the parameters this sampler was built with.
    pub fn params(&self) -> &FractalParams {
        &self.params
    }

    fn normalize(&self, total: f64) -> f64 {
        let value = total / self.max_amplitude;
        (value * 0.5 + 0.5 + self.params.bias).clamp(0.0, 1.0)
    }
}

/// Geometric sum of octave amplitudes (first amplitude 1).
pub(crate) fn geometric_amplitude(octaves: u32, persistence: f64) -> f64 {
    let mut sum = 0.0;
    let mut amp = 1.0;
    for _ in 0..octaves {
        sum += amp;
        amp *= persistence;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_bit_identical_for_same_seed_and_coord() {
        let a = FractalSampler::new(42, FractalParams::default());
        let b = FractalSampler::new(42, FractalParams::default());
        for i in 0..200 {
            let (x, z) = (i as f64 * 3.7, i as f64 * -1.3);
            assert_eq!(
                a.sample_2d(x, z).to_bits(),
                b.sample_2d(x, z).to_bits(),
                "Fractal sample must be bit-identical at ({x}, {z})"
            );
        }
    }

    #[test]
    fn test_output_stays_in_unit_range() {
        let sampler = FractalSampler::new(7, FractalParams::default());
        for i in 0..1000 {
            let v = sampler.sample_3d(i as f64 * 0.9, i as f64 * 0.3, i as f64 * -2.1);
            assert!((0.0..=1.0).contains(&v), "Sample {v} escaped [0, 1]");
        }
    }

    #[test]
    fn test_bias_shifts_output() {
        let flat = FractalSampler::new(1, FractalParams {
            octaves: 0,
            ..Default::default()
        });
        assert!((flat.sample_2d(10.0, 20.0) - 0.5).abs() < EPSILON);

        let biased = FractalSampler::new(1, FractalParams {
            octaves: 0,
            bias: 0.25,
            ..Default::default()
        });
        assert!((biased.sample_2d(10.0, 20.0) - 0.75).abs() < EPSILON);
    }

    #[test]
    fn test_bias_clamps_at_bounds() {
        let sampler = FractalSampler::new(3, FractalParams {
            bias: 10.0,
            ..Default::default()
        });
        assert_eq!(sampler.sample_2d(1.0, 2.0), 1.0);
    }

    #[test]
    fn test_different_salts_give_different_fields() {
        let a = FractalSampler::new(42, FractalParams {
            seed_salt: 1,
            ..Default::default()
        });
        let b = FractalSampler::new(42, FractalParams {
            seed_salt: 2,
            ..Default::default()
        });
        let any_diff = (0..50).any(|i| {
            let (x, z) = (i as f64 * 11.0, i as f64 * 5.0);
            (a.sample_2d(x, z) - b.sample_2d(x, z)).abs() > EPSILON
        });
        assert!(any_diff, "Salted channels must not coincide");
    }

    #[test]
    fn test_geometric_amplitude() {
        assert!((geometric_amplitude(4, 0.5) - 1.875).abs() < EPSILON);
        assert_eq!(geometric_amplitude(0, 0.5), 0.0);
    }
}
