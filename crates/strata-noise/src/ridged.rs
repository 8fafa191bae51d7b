//! Ridged fractal noise: each octave contributes `1 - |noise|`, producing
//! sharp crease lines used for rivers, canyons, ravines, and roads.

use glam::DVec2;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::curve::Curve;
use crate::fractal::geometric_amplitude;
use crate::offsets::{derive_stream_seed, octave_offsets_2d};

/// Parameters for a ridged noise channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RidgedParams {
    /// Number of octaves to composite.
    pub octaves: u32,
    /// Frequency of the first octave.
    pub frequency: f64,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
    /// Amplitude multiplier per octave.
    pub persistence: f64,
    /// Exponent applied to the normalized ridge value; values above 1
    /// narrow the ridge lines.
    pub power: f64,
    /// Salt combined with the world seed.
    pub seed_salt: u64,
}

impl Default for RidgedParams {
    fn default() -> Self {
        Self {
            octaves: 3,
            frequency: 0.005,
            lacunarity: 2.0,
            persistence: 0.5,
            power: 2.0,
            seed_salt: 0,
        }
    }
}

/// How a ridged pass is applied to the density field: the vertical window
/// it carves and the falloff of its strength with height distance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RidgedApply {
    /// World height at the center of the carving window.
    pub apply_height: f32,
    /// Half-extent of the carving window; zero disables the pass.
    pub height_range: f32,
    /// Strength falloff over normalized height distance `[0, 1]`.
    pub falloff: Curve,
}

impl Default for RidgedApply {
    fn default() -> Self {
        Self {
            apply_height: 20.0,
            height_range: 12.0,
            falloff: Curve::linear(1.0, 0.0),
        }
    }
}

impl RidgedApply {
    /// Strength multiplier at world height `wy`; zero outside the window.
    pub fn strength_at(&self, wy: f32) -> f32 {
        if self.height_range <= 0.0 {
            return 0.0;
        }
        let dist = (wy - self.apply_height).abs();
        if dist > self.height_range {
            return 0.0;
        }
        self.falloff.sample(dist / self.height_range)
    }
}

/// Samples ridged noise over the 2D footprint of a chunk.
pub struct RidgedSampler {
    perlin: Perlin,
    offsets: Vec<DVec2>,
    params: RidgedParams,
    max_amplitude: f64,
}

impl RidgedSampler {
    /// Builds a sampler for one ridged channel.
    pub fn new(world_seed: u64, params: RidgedParams) -> Self {
        let stream = derive_stream_seed(world_seed, params.seed_salt);
        let perlin = Perlin::new(stream as u32);
        let offsets = octave_offsets_2d(world_seed, params.seed_salt, params.octaves);
        let max_amplitude = geometric_amplitude(params.octaves, params.persistence);
        Self {
            perlin,
            offsets,
            params,
            max_amplitude,
        }
    }

    /// Samples the ridge value at a 2D world coordinate; result in `[0, 1]`.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        if self.params.octaves == 0 || self.max_amplitude == 0.0 {
            return 0.0;
        }
        let mut total = 0.0;
        let mut frequency = self.params.frequency;
        let mut amplitude = 1.0;
        for off in &self.offsets {
            let nx = (x + off.x) * frequency;
            let nz = (z + off.y) * frequency;
            let layer = 1.0 - self.perlin.get([nx, nz]).abs();
            total += layer * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }
        let normalized = (total / self.max_amplitude).clamp(0.0, 1.0);
        normalized.powf(self.params.power).clamp(0.0, 1.0)
    }

    /// Returns the parameters this sampler was built with.
    pub fn params(&self) -> &RidgedParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ridge_value_in_unit_range() {
        let sampler = RidgedSampler::new(42, RidgedParams::default());
        for i in 0..1000 {
            let v = sampler.sample(i as f64 * 1.7, i as f64 * -0.9);
            assert!((0.0..=1.0).contains(&v), "Ridge value {v} escaped [0, 1]");
        }
    }

    #[test]
    fn test_deterministic_across_instances() {
        let a = RidgedSampler::new(9, RidgedParams::default());
        let b = RidgedSampler::new(9, RidgedParams::default());
        for i in 0..100 {
            let (x, z) = (i as f64 * 13.0, i as f64 * 7.0);
            assert_eq!(a.sample(x, z).to_bits(), b.sample(x, z).to_bits());
        }
    }

    #[test]
    fn test_power_narrows_ridges() {
        let soft = RidgedSampler::new(5, RidgedParams {
            power: 1.0,
            ..Default::default()
        });
        let sharp = RidgedSampler::new(5, RidgedParams {
            power: 4.0,
            ..Default::default()
        });
        let mut soft_sum = 0.0;
        let mut sharp_sum = 0.0;
        for i in 0..500 {
            let (x, z) = (i as f64 * 3.1, i as f64 * 1.9);
            soft_sum += soft.sample(x, z);
            sharp_sum += sharp.sample(x, z);
        }
        assert!(
            sharp_sum < soft_sum,
            "Higher power should reduce mean ridge coverage: {sharp_sum} vs {soft_sum}"
        );
    }

    #[test]
    fn test_apply_window_gates_strength() {
        let apply = RidgedApply {
            apply_height: 20.0,
            height_range: 10.0,
            falloff: Curve::linear(1.0, 0.0),
        };
        assert_eq!(apply.strength_at(40.0), 0.0, "Outside the window");
        assert!((apply.strength_at(20.0) - 1.0).abs() < 1e-6, "Full at center");
        assert!((apply.strength_at(25.0) - 0.5).abs() < 1e-6, "Half at half range");
    }

    #[test]
    fn test_zero_height_range_disables_pass() {
        let apply = RidgedApply {
            height_range: 0.0,
            ..Default::default()
        };
        assert_eq!(apply.strength_at(20.0), 0.0);
    }
}
