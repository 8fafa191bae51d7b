//! Precomputed (temperature, moisture) → per-biome weight lookup grid.
//!
//! Built once from the biome bounds with edge blending; read-only after
//! construction. Per-chunk sampling bilinearly interpolates the four
//! surrounding cells.

use crate::definition::{BiomeCatalog, BiomeId};

/// A per-location biome weight vector. Weights sum to 1.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeWeights {
    weights: Vec<f32>,
}

impl BiomeWeights {
    /// Weight of the given biome (0 for out-of-range ids).
    pub fn get(&self, id: BiomeId) -> f32 {
        self.weights.get(id.0 as usize).copied().unwrap_or(0.0)
    }

    /// All weights in biome-id order.
    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }

    /// The biome with the largest weight; ties break toward the lower id.
    pub fn dominant(&self) -> BiomeId {
        let mut best = 0;
        let mut best_weight = f32::MIN;
        for (i, &w) in self.weights.iter().enumerate() {
            if w > best_weight {
                best = i;
                best_weight = w;
            }
        }
        BiomeId(best as u16)
    }

    /// Iterates `(id, weight)` pairs with non-negligible weight.
    pub fn iter_active(&self) -> impl Iterator<Item = (BiomeId, f32)> + '_ {
        self.weights
            .iter()
            .enumerate()
            .filter(|&(_, &w)| w > 1e-4)
            .map(|(i, &w)| (BiomeId(i as u16), w))
    }
}

/// The G×G biome weight lookup grid.
pub struct BiomeWeightGrid {
    resolution: usize,
    biome_count: usize,
    /// `resolution * resolution * biome_count`, cell-major.
    weights: Vec<f32>,
}

impl BiomeWeightGrid {
    /// Builds the grid from the catalog's bounds.
    ///
    /// Per cell, per biome: the maximum over that biome's rectangles of the
    /// blended edge-falloff weight; then normalized so each cell sums to 1.
    /// If every biome weighs exactly 0 at a cell, biome 0 takes full weight
    /// so coverage is total.
    pub fn build(catalog: &BiomeCatalog, resolution: usize, blend: f32) -> Self {
        let resolution = resolution.max(2);
        let biome_count = catalog.len();
        let mut weights = vec![0.0f32; resolution * resolution * biome_count];

        for cell_m in 0..resolution {
            for cell_t in 0..resolution {
                let t = cell_t as f32 / (resolution - 1) as f32;
                let m = cell_m as f32 / (resolution - 1) as f32;
                let base = (cell_m * resolution + cell_t) * biome_count;

                let mut total = 0.0;
                for (id, biome) in catalog.iter() {
                    let w = biome
                        .bounds
                        .iter()
                        .map(|b| b.weight(t, m, blend))
                        .fold(0.0f32, f32::max);
                    weights[base + id.0 as usize] = w;
                    total += w;
                }

                if total > 0.0 {
                    for w in &mut weights[base..base + biome_count] {
                        *w /= total;
                    }
                } else if biome_count > 0 {
                    // Coverage fallback.
                    weights[base] = 1.0;
                }
            }
        }

        Self {
            resolution,
            biome_count,
            weights,
        }
    }

    /// Grid resolution (cells per axis).
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Number of biomes per cell.
    pub fn biome_count(&self) -> usize {
        self.biome_count
    }

    /// Bilinearly samples the weight vector at `(temperature, moisture)`,
    /// both in `[0, 1]`.
    pub fn sample(&self, temperature: f32, moisture: f32) -> BiomeWeights {
        let max = (self.resolution - 1) as f32;
        let ft = (temperature.clamp(0.0, 1.0) * max).clamp(0.0, max);
        let fm = (moisture.clamp(0.0, 1.0) * max).clamp(0.0, max);

        let t0 = ft.floor() as usize;
        let m0 = fm.floor() as usize;
        let t1 = (t0 + 1).min(self.resolution - 1);
        let m1 = (m0 + 1).min(self.resolution - 1);
        let at = ft - t0 as f32;
        let am = fm - m0 as f32;

        let mut weights = vec![0.0f32; self.biome_count];
        for (cell_t, cell_m, factor) in [
            (t0, m0, (1.0 - at) * (1.0 - am)),
            (t1, m0, at * (1.0 - am)),
            (t0, m1, (1.0 - at) * am),
            (t1, m1, at * am),
        ] {
            let base = (cell_m * self.resolution + cell_t) * self.biome_count;
            for (i, w) in weights.iter_mut().enumerate() {
                *w += self.weights[base + i] * factor;
            }
        }
        BiomeWeights { weights }
    }

    /// The raw weight vector of one grid cell (tests and debug overlays).
    pub fn cell(&self, cell_t: usize, cell_m: usize) -> &[f32] {
        let base = (cell_m * self.resolution + cell_t) * self.biome_count;
        &self.weights[base..base + self.biome_count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{BiomeBounds, BiomeDefinition};

    fn biome_with_bounds(name: &str, bounds: BiomeBounds) -> BiomeDefinition {
        BiomeDefinition {
            name: name.to_string(),
            bounds: vec![bounds],
            ..BiomeDefinition::fallback()
        }
    }

    fn two_biome_catalog() -> BiomeCatalog {
        BiomeCatalog::new(vec![
            biome_with_bounds(
                "cold",
                BiomeBounds {
                    temperature: (0.0, 0.5),
                    moisture: (0.0, 1.0),
                },
            ),
            biome_with_bounds(
                "hot",
                BiomeBounds {
                    temperature: (0.5, 1.0),
                    moisture: (0.0, 1.0),
                },
            ),
        ])
    }

    #[test]
    fn test_every_cell_sums_to_one() {
        let grid = BiomeWeightGrid::build(&two_biome_catalog(), 32, 0.05);
        for m in 0..32 {
            for t in 0..32 {
                let sum: f32 = grid.cell(t, m).iter().sum();
                assert!(
                    (sum - 1.0).abs() < 1e-5,
                    "Cell ({t}, {m}) weights sum to {sum}, expected 1"
                );
            }
        }
    }

    #[test]
    fn test_dominant_biome_matches_bounds() {
        let grid = BiomeWeightGrid::build(&two_biome_catalog(), 64, 0.02);
        assert_eq!(grid.sample(0.1, 0.5).dominant(), BiomeId(0), "Cold side");
        assert_eq!(grid.sample(0.9, 0.5).dominant(), BiomeId(1), "Hot side");
    }

    #[test]
    fn test_blend_band_mixes_biomes() {
        let grid = BiomeWeightGrid::build(&two_biome_catalog(), 64, 0.1);
        let mid = grid.sample(0.5, 0.5);
        let w0 = mid.get(BiomeId(0));
        let w1 = mid.get(BiomeId(1));
        assert!(
            w0 > 0.2 && w1 > 0.2,
            "Boundary sample should mix both biomes: {w0} / {w1}"
        );
    }

    #[test]
    fn test_iter_active_skips_negligible_weights() {
        let grid = BiomeWeightGrid::build(&two_biome_catalog(), 64, 0.1);
        let cold = grid.sample(0.1, 0.5);
        let active: Vec<(BiomeId, f32)> = cold.iter_active().collect();
        assert_eq!(
            active.len(),
            1,
            "Deep inside one biome only it should be active: {active:?}"
        );
        assert_eq!(active[0].0, BiomeId(0));

        let mid = grid.sample(0.5, 0.5);
        assert_eq!(
            mid.iter_active().count(),
            2,
            "Both biomes carry weight in the blend band"
        );
    }

    #[test]
    fn test_zero_coverage_falls_back_to_biome_zero() {
        // Biomes that claim only a corner leave the rest uncovered.
        let catalog = BiomeCatalog::new(vec![biome_with_bounds(
            "corner",
            BiomeBounds {
                temperature: (0.0, 0.1),
                moisture: (0.0, 0.1),
            },
        )]);
        let grid = BiomeWeightGrid::build(&catalog, 16, 0.0);
        let far = grid.sample(0.9, 0.9);
        assert_eq!(
            far.get(BiomeId(0)),
            1.0,
            "Uncovered cells must assign full weight to biome 0"
        );
    }

    #[test]
    fn test_bilinear_sampling_is_continuous() {
        let grid = BiomeWeightGrid::build(&two_biome_catalog(), 32, 0.05);
        let mut prev = grid.sample(0.0, 0.5).get(BiomeId(0));
        for i in 1..=200 {
            let t = i as f32 / 200.0;
            let cur = grid.sample(t, 0.5).get(BiomeId(0));
            assert!(
                (cur - prev).abs() < 0.08,
                "Weight jump at t={t}: {prev} -> {cur}"
            );
            prev = cur;
        }
    }

    #[test]
    fn test_multiple_rectangles_take_max() {
        let biome = BiomeDefinition {
            bounds: vec![
                BiomeBounds {
                    temperature: (0.0, 0.2),
                    moisture: (0.0, 1.0),
                },
                BiomeBounds {
                    temperature: (0.8, 1.0),
                    moisture: (0.0, 1.0),
                },
            ],
            ..BiomeDefinition::fallback()
        };
        let other = biome_with_bounds("mid", BiomeBounds {
            temperature: (0.2, 0.8),
            moisture: (0.0, 1.0),
        });
        let catalog = BiomeCatalog::new(vec![biome, other]);
        let grid = BiomeWeightGrid::build(&catalog, 64, 0.01);
        assert_eq!(grid.sample(0.1, 0.5).dominant(), BiomeId(0));
        assert_eq!(grid.sample(0.9, 0.5).dominant(), BiomeId(0));
        assert_eq!(grid.sample(0.5, 0.5).dominant(), BiomeId(1));
    }
}
