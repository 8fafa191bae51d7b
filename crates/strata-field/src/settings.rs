//! Configuration for the density field pipeline.

use serde::{Deserialize, Serialize};
use strata_noise::{Curve, FractalParams, RidgedApply, RidgedParams};

/// One ridged carving pass (rivers, canyons, ravines) with its vertical
/// application window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RidgedPass {
    pub noise: RidgedParams,
    pub apply: RidgedApply,
}

/// One road noise pass. Per-column road weight is the average of all pass
/// samples mixed by their normalized `weight`s.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadPass {
    pub noise: RidgedParams,
    /// Mixing weight of this pass; passes with larger weights dominate the
    /// blended road weight.
    pub weight: f32,
}

/// Road layer configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadSettings {
    pub passes: Vec<RoadPass>,
    /// Half-height of the deformation window around the road surface.
    pub road_height: f32,
    /// Falloff over normalized distance from the road surface (0 at the
    /// surface, 1 at the window edge).
    pub falloff: Curve,
    /// Deformation strength applied per voxel inside the window.
    pub strength: f32,
    /// Road surfaces are clamped into `[min_height, max_height]`.
    pub min_height: f32,
    pub max_height: f32,
    /// Start height used when no biome provides elevation shaping.
    pub default_start_height: f32,
    /// Columns below this blended weight carry no road.
    pub weight_threshold: f32,
}

impl Default for RoadSettings {
    fn default() -> Self {
        Self {
            passes: vec![RoadPass {
                noise: RidgedParams {
                    power: 6.0,
                    ..RidgedParams::default()
                },
                weight: 1.0,
            }],
            road_height: 3.0,
            falloff: Curve::linear(1.0, 0.0),
            strength: 2.0,
            min_height: 4.0,
            max_height: 48.0,
            default_start_height: 12.0,
            weight_threshold: 0.05,
        }
    }
}

/// Configuration for [`crate::DensityGenerator`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    /// Voxels with density at or above this threshold are solid.
    pub iso_threshold: f32,
    /// Coarse stride of full 3D terrain-noise evaluation along x/z; skipped
    /// voxels are filled by trilinear interpolation.
    pub horizontal_sample_rate: usize,
    /// Coarse stride along y.
    pub vertical_sample_rate: usize,
    /// Temperature channel feeding the biome weight grid.
    pub temperature: FractalParams,
    /// Moisture channel feeding the biome weight grid.
    pub moisture: FractalParams,
    /// Resolution of the precomputed biome weight grid.
    pub weight_grid_resolution: usize,
    /// Blend width of biome bound edges in (temperature, moisture) space.
    pub biome_blend: f32,
    /// Global ridged carving passes.
    pub ridged_passes: Vec<RidgedPass>,
    /// Road layer; `None` disables roads entirely.
    pub roads: Option<RoadSettings>,
    /// Whether structure deformation (ledger density deltas) is merged.
    pub structures_enabled: bool,
    /// Multiplier applied to ledger density deltas when merging.
    pub ledger_density_multiplier: f32,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            iso_threshold: 0.5,
            horizontal_sample_rate: 4,
            vertical_sample_rate: 4,
            temperature: FractalParams {
                frequency: 0.001,
                octaves: 3,
                seed_salt: 11,
                ..FractalParams::default()
            },
            moisture: FractalParams {
                frequency: 0.001,
                octaves: 3,
                seed_salt: 13,
                ..FractalParams::default()
            },
            weight_grid_resolution: 64,
            biome_blend: 0.05,
            ridged_passes: Vec::new(),
            roads: None,
            structures_enabled: true,
            ledger_density_multiplier: 1.0,
        }
    }
}
