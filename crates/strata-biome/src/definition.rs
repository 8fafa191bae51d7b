//! Biome catalog data: bounds in (temperature, moisture) space, noise
//! parameter sets, shaping curves, and object/structure catalogs.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strata_noise::{CellularParams, Curve, FractalParams};

/// Stable index of a biome in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BiomeId(pub u16);

/// Identifier for a scatter-object archetype (tree, boulder, grass tuft...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectTypeId(pub u32);

/// Identifier for a structure prefab.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructureTypeId(pub u32);

/// One rectangle of a biome's claim in (temperature, moisture) space.
///
/// Both axes live in `[0, 1]`; a biome may own several rectangles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeBounds {
    /// Inclusive temperature range.
    pub temperature: (f32, f32),
    /// Inclusive moisture range.
    pub moisture: (f32, f32),
}

impl BiomeBounds {
    /// The full `[0, 1] × [0, 1]` rectangle.
    pub fn full() -> Self {
        Self {
            temperature: (0.0, 1.0),
            moisture: (0.0, 1.0),
        }
    }

    /// Membership weight of `(t, m)` in this rectangle, blended over
    /// `blend` world units of each edge: the min of the four inverse-lerp
    /// edge falloffs, clamped to `[0, 1]`.
    pub fn weight(&self, t: f32, m: f32, blend: f32) -> f32 {
        if blend <= 0.0 {
            let inside = t >= self.temperature.0
                && t <= self.temperature.1
                && m >= self.moisture.0
                && m <= self.moisture.1;
            return if inside { 1.0 } else { 0.0 };
        }
        let left = inverse_lerp(self.temperature.0 - blend, self.temperature.0 + blend, t);
        let right = inverse_lerp(self.temperature.1 + blend, self.temperature.1 - blend, t);
        let bottom = inverse_lerp(self.moisture.0 - blend, self.moisture.0 + blend, m);
        let top = inverse_lerp(self.moisture.1 + blend, self.moisture.1 - blend, m);
        left.min(right).min(bottom).min(top).clamp(0.0, 1.0)
    }
}

fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    ((v - a) / (b - a)).clamp(0.0, 1.0)
}

/// Elevation shaping for a biome: a 2D noise channel passed through the
/// biome's height and floor-weight curves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevationShaping {
    /// The elevation noise channel.
    pub noise: FractalParams,
    /// Maps normalized elevation noise to a surface height in world units.
    pub height_curve: Curve,
    /// Maps normalized elevation noise to the floor weight (steepness of
    /// the solid/air falloff around the surface).
    pub floor_curve: Curve,
}

impl Default for ElevationShaping {
    fn default() -> Self {
        Self {
            noise: FractalParams::default(),
            height_curve: Curve::new([(0.0, 8.0), (1.0, 40.0)]),
            floor_curve: Curve::constant(1.0),
        }
    }
}

/// Voronoi canyon/cave shaping for a biome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoronoiShaping {
    /// The cellular noise channel.
    pub noise: CellularParams,
    /// Maps normalized local steepness to a carve-strength multiplier;
    /// bucketed into a lookup table before per-voxel use.
    pub steepness_curve: Curve,
}

impl Default for VoronoiShaping {
    fn default() -> Self {
        Self {
            noise: CellularParams::default(),
            steepness_curve: Curve::linear(0.2, 1.0),
        }
    }
}

/// A biome's complete definition. Immutable after world initialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeDefinition {
    /// Human-readable name.
    pub name: String,
    /// Claimed rectangles in (temperature, moisture) space.
    pub bounds: Vec<BiomeBounds>,
    /// 3D terrain noise channel.
    pub terrain: FractalParams,
    /// Optional elevation shaping (surface height + floor weight).
    pub elevation: Option<ElevationShaping>,
    /// Optional vegetation noise channel (consumed by object placement).
    pub vegetation: Option<FractalParams>,
    /// Optional rock noise channel (consumed by object placement).
    pub rock: Option<FractalParams>,
    /// Optional Voronoi canyon/cave shaping.
    pub voronoi: Option<VoronoiShaping>,
    /// Scatter-object types that may spawn in this biome.
    pub objects: Vec<ObjectTypeId>,
    /// Structure prefabs that may be placed in this biome.
    pub structures: Vec<StructureTypeId>,
}

impl BiomeDefinition {
    /// A minimal biome covering the whole (temperature, moisture) square.
    ///
    /// Fabricated at initialization when the configured catalog is empty,
    /// so generation always has total coverage.
    pub fn fallback() -> Self {
        Self {
            name: "fallback".to_string(),
            bounds: vec![BiomeBounds::full()],
            terrain: FractalParams::default(),
            elevation: Some(ElevationShaping::default()),
            vegetation: None,
            rock: None,
            voronoi: None,
            objects: Vec::new(),
            structures: Vec::new(),
        }
    }
}

/// The immutable, ordered biome catalog.
#[derive(Clone, Debug)]
pub struct BiomeCatalog {
    biomes: Vec<BiomeDefinition>,
    by_structure: HashMap<StructureTypeId, Vec<BiomeId>>,
}

impl BiomeCatalog {
    /// Builds a catalog from definitions; order fixes the `BiomeId`s.
    pub fn new(biomes: Vec<BiomeDefinition>) -> Self {
        let mut by_structure: HashMap<StructureTypeId, Vec<BiomeId>> = HashMap::new();
        for (idx, biome) in biomes.iter().enumerate() {
            for &structure in &biome.structures {
                by_structure
                    .entry(structure)
                    .or_default()
                    .push(BiomeId(idx as u16));
            }
        }
        Self {
            biomes,
            by_structure,
        }
    }

    /// Number of biomes in the catalog.
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// True if the catalog holds no biomes.
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }

    /// The biome with the given id.
    pub fn get(&self, id: BiomeId) -> Option<&BiomeDefinition> {
        self.biomes.get(id.0 as usize)
    }

    /// Iterates `(id, definition)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (BiomeId, &BiomeDefinition)> {
        self.biomes
            .iter()
            .enumerate()
            .map(|(i, b)| (BiomeId(i as u16), b))
    }

    /// True if `biome` lists `structure` in its structure catalog.
    pub fn allows_structure(&self, biome: BiomeId, structure: StructureTypeId) -> bool {
        self.by_structure
            .get(&structure)
            .is_some_and(|ids| ids.contains(&biome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_weight_full_inside_zero_outside() {
        let bounds = BiomeBounds {
            temperature: (0.2, 0.8),
            moisture: (0.3, 0.7),
        };
        assert_eq!(bounds.weight(0.5, 0.5, 0.05), 1.0, "Center is fully inside");
        assert_eq!(bounds.weight(0.0, 0.5, 0.05), 0.0, "Far outside is zero");
        let edge = bounds.weight(0.2, 0.5, 0.05);
        assert!(
            edge > 0.0 && edge < 1.0,
            "On-edge weight should be mid-blend, got {edge}"
        );
    }

    #[test]
    fn test_full_bounds_cover_everything() {
        let bounds = BiomeBounds::full();
        for i in 0..=10 {
            for j in 0..=10 {
                let (t, m) = (i as f32 / 10.0, j as f32 / 10.0);
                assert!(
                    bounds.weight(t, m, 0.0) > 0.0,
                    "Full bounds must cover ({t}, {m})"
                );
            }
        }
    }

    #[test]
    fn test_catalog_structure_lookup() {
        let mut plains = BiomeDefinition::fallback();
        plains.structures = vec![StructureTypeId(3)];
        let desert = BiomeDefinition::fallback();
        let catalog = BiomeCatalog::new(vec![plains, desert]);

        assert!(catalog.allows_structure(BiomeId(0), StructureTypeId(3)));
        assert!(!catalog.allows_structure(BiomeId(1), StructureTypeId(3)));
        assert!(!catalog.allows_structure(BiomeId(0), StructureTypeId(9)));
    }

    #[test]
    fn test_fallback_biome_has_total_coverage() {
        let biome = BiomeDefinition::fallback();
        assert_eq!(biome.bounds.len(), 1);
        assert_eq!(biome.bounds[0], BiomeBounds::full());
        assert!(biome.elevation.is_some());
    }
}
