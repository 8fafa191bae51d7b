//! Structure placement and path connection configuration.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use strata_biome::StructureTypeId;
use strata_noise::Curve;

/// How placed instances of one structure are linked by carved paths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionMode {
    /// No connecting paths.
    #[default]
    None,
    /// Greedily link each unconnected instance to its nearest not-yet-
    /// connected neighbor.
    Nearest,
}

/// One placeable structure prefab.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructurePrefabDef {
    pub id: StructureTypeId,
    pub name: String,
    /// Half extents of the influence volume carved around each instance.
    pub influence_half: DVec3,
    /// Density delta at the influence center, falling off to zero at the
    /// boundary. Positive mounds terrain up, negative flattens it away.
    pub density_delta: f32,
    /// Road weight stamped under the instance footprint.
    pub road_weight: f32,
    /// Fixed placement height; `None` samples the terrain surface instead.
    pub fixed_height: Option<f32>,
    /// Surface-sampled heights are clamped into this window.
    pub height_window: (f32, f32),
}

impl StructurePrefabDef {
    pub fn minimal(id: StructureTypeId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            influence_half: DVec3::new(6.0, 5.0, 6.0),
            density_delta: 1.0,
            road_weight: 0.8,
            fixed_height: None,
            height_window: (4.0, 48.0),
        }
    }
}

/// Corridor carved between connected instances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Neighborhood radius (in columns) stamped around each path sample.
    pub radius: i64,
    /// Road weight at the corridor center.
    pub road_weight: f32,
    /// Weight falloff over normalized distance from the corridor center.
    pub falloff: Curve,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            radius: 2,
            road_weight: 0.9,
            falloff: Curve::linear(1.0, 0.2),
        }
    }
}

/// Configuration for structure eligibility, placement, and connection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureSettings {
    /// Only every `check_stride`-th chunk coordinate per axis is eligible.
    pub check_stride: i32,
    /// Probability that an eligible coordinate hosts a structure.
    pub spawn_chance: f32,
    pub prefabs: Vec<StructurePrefabDef>,
    /// Inclusive range of prefab instances spawned per structure.
    pub instances: (u32, u32),
    /// Instances scatter within this radius of the structure origin.
    pub placement_radius: f64,
    /// Minimum spacing between instances of the same structure.
    pub min_instance_distance: f64,
    /// Jittered retries before an instance keeps its last-tried position.
    pub max_attempts: u32,
    pub connection: ConnectionMode,
    /// Minimum road weight at the origin, when set.
    pub min_road_weight: Option<f32>,
    /// Allowed surface-height window at the origin, when set.
    pub elevation_window: Option<(f32, f32)>,
    pub path: PathSettings,
}

impl Default for StructureSettings {
    fn default() -> Self {
        Self {
            check_stride: 4,
            spawn_chance: 0.3,
            prefabs: Vec::new(),
            instances: (1, 3),
            placement_radius: 14.0,
            min_instance_distance: 6.0,
            max_attempts: 8,
            connection: ConnectionMode::Nearest,
            min_road_weight: None,
            elevation_window: None,
            path: PathSettings::default(),
        }
    }
}
