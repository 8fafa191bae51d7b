//! Scatter object type definitions.

use serde::{Deserialize, Serialize};
use strata_biome::ObjectTypeId;

/// Direction the placement height offset is applied along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OffsetSpace {
    #[default]
    Up,
    /// Along the surface normal at the vertex.
    Normal,
}

/// Scale randomization applied per instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ScaleRange {
    #[default]
    None,
    Uniform {
        min: f32,
        max: f32,
    },
    PerAxis {
        x: (f32, f32),
        y: (f32, f32),
        z: (f32, f32),
    },
}

/// One scatter object type. Which biomes emit it is decided by the biome
/// catalog's per-biome object lists, not here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectTypeDef {
    pub id: ObjectTypeId,
    pub name: String,
    /// Per-vertex emission probability in `[0, 1]`. 0 never emits, 1 emits
    /// at every vertex that passes the range and exclusion gates.
    pub spawn_chance: f32,
    /// Accepted world-height window.
    pub height_range: (f32, f32),
    /// Accepted steepness window, steepness being `1 - dot(normal, up)`.
    pub steepness_range: (f32, f32),
    pub vegetation_range: (f32, f32),
    pub rock_range: (f32, f32),
    /// Offset applied along [`OffsetSpace`] after placement.
    pub height_offset: f32,
    pub offset_space: OffsetSpace,
    /// 0 keeps instances world-up aligned, 1 fully aligns them to the
    /// surface normal; values between blend.
    pub slope_alignment: f32,
    pub scale: ScaleRange,
    /// Combined types are merged into one static mesh per chunk instead of
    /// spawning pooled instances.
    pub combine: bool,
    /// Instances toggle despawned when the chunk is farther than this from
    /// the viewpoint.
    pub cull_distance: f32,
}

impl ObjectTypeDef {
    /// A permissive definition accepting every vertex; range gates wide
    /// open, no offset, no scale jitter.
    pub fn permissive(id: ObjectTypeId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            spawn_chance: 1.0,
            height_range: (f32::NEG_INFINITY, f32::INFINITY),
            steepness_range: (0.0, 1.0),
            vegetation_range: (f32::NEG_INFINITY, f32::INFINITY),
            rock_range: (f32::NEG_INFINITY, f32::INFINITY),
            height_offset: 0.0,
            offset_space: OffsetSpace::Up,
            slope_alignment: 0.0,
            scale: ScaleRange::None,
            combine: false,
            cull_distance: 160.0,
        }
    }
}

/// Global placement configuration shared by every object type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterSettings {
    pub objects: Vec<ObjectTypeDef>,
    /// Vertices with more road weight than this are rejected, unless their
    /// height falls outside the road's vertical band.
    pub road_weight_threshold: f32,
    /// Half height of the road's vertical band around its start height.
    pub road_band_height: f32,
}

impl Default for ScatterSettings {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            road_weight_threshold: 0.5,
            road_band_height: 3.0,
        }
    }
}
