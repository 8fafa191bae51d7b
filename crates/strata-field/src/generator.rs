//! The chunk density field generator.
//!
//! Composes biome-weighted terrain noise, elevation shaping, ridged carving,
//! Voronoi canyon carving, road deformation, and pending ledger changes into
//! one scalar field per chunk. Every stage is a data-parallel kernel over
//! columns with a join before the next stage reads its output; stages for
//! disabled features are skipped outright.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use rayon::prelude::*;
use strata_biome::{BiomeCatalog, BiomeId, BiomeWeightGrid, BiomeWeights};
use strata_coords::{ChunkCoord, ChunkExtents, world_to_chunk_local};
use strata_ledger::DeformationLedger;
use strata_noise::{
    CellularSampler, Curve, FractalParams, FractalSampler, RidgedApply, RidgedSampler,
    sample_lookup,
};
use tracing::debug;

use crate::chunk_fields::ChunkFields;
use crate::settings::{FieldSettings, RoadSettings};
use crate::sparse::{AxisMap, lerp_exact};

/// Directional terms (elevation, ridged) are clamped to this magnitude;
/// voxels already saturated skip the noise lookups entirely.
const SATURATION: f32 = 2.0;

const STEEPNESS_LUT_BUCKETS: usize = 64;

/// Join-point notifications emitted while a chunk's fields are generated.
///
/// Fired synchronously on the building thread after each kernel's join, in
/// pipeline order. Buffers are borrowed from the build in progress.
pub enum FieldStage<'a> {
    TextureNoise {
        temperature: &'a [f32],
        moisture: &'a [f32],
        biomes: &'a [BiomeId],
    },
    ObjectNoise {
        vegetation: &'a [f32],
        rock: &'a [f32],
    },
    ElevationNoise {
        surface: &'a [f32],
        floor_weight: &'a [f32],
    },
    RidgedNoise {
        passes: &'a [Vec<f32>],
    },
    TerrainNoise {
        density: &'a [f32],
    },
    Roads {
        weight: &'a [f32],
        start_height: &'a [f32],
    },
}

struct ElevationChannel {
    sampler: FractalSampler,
    height_curve: Curve,
    floor_curve: Curve,
}

struct VoronoiChannel {
    sampler: CellularSampler,
    steepness_lut: Vec<f32>,
    strength: f32,
}

/// Per-biome noise channels, constructed once per generator.
struct BiomeChannels {
    terrain: FractalSampler,
    elevation: Option<ElevationChannel>,
    vegetation: Option<FractalSampler>,
    rock: Option<FractalSampler>,
    voronoi: Option<VoronoiChannel>,
}

/// Elevation surface/floor-weight sheet, optionally one cell wider than the
/// chunk footprint so steepness can be taken by central differences.
struct ElevationSheet {
    halo: isize,
    width: usize,
    surface: Vec<f32>,
    floor: Vec<f32>,
}

impl ElevationSheet {
    fn surface_at(&self, x: isize, z: isize) -> f32 {
        self.surface[((z + self.halo) as usize) * self.width + (x + self.halo) as usize]
    }

    fn floor_at(&self, x: isize, z: isize) -> f32 {
        self.floor[((z + self.halo) as usize) * self.width + (x + self.halo) as usize]
    }

    /// Local slope magnitude from 4-neighbor central differences, clamped to
    /// `[0, 1]`. Requires a halo of 1.
    fn steepness(&self, x: usize, z: usize) -> f32 {
        let (x, z) = (x as isize, z as isize);
        let dx = (self.surface_at(x + 1, z) - self.surface_at(x - 1, z)).abs() * 0.5;
        let dz = (self.surface_at(x, z + 1) - self.surface_at(x, z - 1)).abs() * 0.5;
        ((dx + dz) * 0.5).clamp(0.0, 1.0)
    }
}

/// Coarse 3D terrain-noise lattice plus the per-axis interpolation maps.
struct TerrainLattice {
    ax: AxisMap,
    ay: AxisMap,
    az: AxisMap,
    values: Vec<f32>,
}

impl TerrainLattice {
    fn value(&self, xi: usize, yi: usize, zi: usize) -> f32 {
        self.values[yi + self.ay.len() * (xi + self.ax.len() * zi)]
    }

    /// Trilinear fill between the 8 surrounding lattice samples; returns the
    /// shared value directly when all 8 agree.
    fn interpolate(&self, x: usize, y: usize, z: usize) -> f32 {
        let (xi, tx) = (self.ax.seg[x], self.ax.t[x]);
        let (yi, ty) = (self.ay.seg[y], self.ay.t[y]);
        let (zi, tz) = (self.az.seg[z], self.az.t[z]);
        let xj = (xi + 1).min(self.ax.len() - 1);
        let yj = (yi + 1).min(self.ay.len() - 1);
        let zj = (zi + 1).min(self.az.len() - 1);

        let c000 = self.value(xi, yi, zi);
        let c100 = self.value(xj, yi, zi);
        let c010 = self.value(xi, yj, zi);
        let c110 = self.value(xj, yj, zi);
        let c001 = self.value(xi, yi, zj);
        let c101 = self.value(xj, yi, zj);
        let c011 = self.value(xi, yj, zj);
        let c111 = self.value(xj, yj, zj);

        if c000 == c100
            && c000 == c010
            && c000 == c110
            && c000 == c001
            && c000 == c101
            && c000 == c011
            && c000 == c111
        {
            return c000;
        }

        let y00 = lerp_exact(c000, c010, ty);
        let y10 = lerp_exact(c100, c110, ty);
        let y01 = lerp_exact(c001, c011, ty);
        let y11 = lerp_exact(c101, c111, ty);
        let x0 = lerp_exact(y00, y10, tx);
        let x1 = lerp_exact(y01, y11, tx);
        lerp_exact(x0, x1, tz)
    }
}

/// Generates chunk density fields and answers point-sample queries.
///
/// Pure function of (world seed, settings, catalog) plus whatever the shared
/// deformation ledger holds at build time; regenerating a chunk with the
/// same ledger contents reproduces the field bit for bit.
pub struct DensityGenerator {
    extents: ChunkExtents,
    settings: FieldSettings,
    catalog: BiomeCatalog,
    weight_grid: BiomeWeightGrid,
    temperature: FractalSampler,
    moisture: FractalSampler,
    biomes: Vec<BiomeChannels>,
    ridged: Vec<(RidgedSampler, RidgedApply)>,
    road_passes: Vec<(RidgedSampler, f32)>,
    ledger: Arc<DeformationLedger>,
    has_elevation: bool,
    has_voronoi: bool,
}

/// Decorrelates the same parameter set used by different biomes/channels.
fn channel_salt(params: &FractalParams, biome: usize, channel: u64) -> FractalParams {
    let mut p = params.clone();
    p.seed_salt = p
        .seed_salt
        .wrapping_add(((biome as u64 + 1) << 16) ^ channel);
    p
}

impl DensityGenerator {
    pub fn new(
        world_seed: u64,
        extents: ChunkExtents,
        settings: FieldSettings,
        catalog: BiomeCatalog,
        ledger: Arc<DeformationLedger>,
    ) -> Self {
        let weight_grid = BiomeWeightGrid::build(
            &catalog,
            settings.weight_grid_resolution,
            settings.biome_blend,
        );
        let temperature = FractalSampler::new(world_seed, settings.temperature.clone());
        let moisture = FractalSampler::new(world_seed, settings.moisture.clone());

        let biomes: Vec<BiomeChannels> = catalog
            .iter()
            .map(|(id, def)| {
                let b = id.0 as usize;
                BiomeChannels {
                    terrain: FractalSampler::new(world_seed, channel_salt(&def.terrain, b, 1)),
                    elevation: def.elevation.as_ref().map(|e| ElevationChannel {
                        sampler: FractalSampler::new(world_seed, channel_salt(&e.noise, b, 2)),
                        height_curve: e.height_curve.clone(),
                        floor_curve: e.floor_curve.clone(),
                    }),
                    vegetation: def
                        .vegetation
                        .as_ref()
                        .map(|p| FractalSampler::new(world_seed, channel_salt(p, b, 3))),
                    rock: def
                        .rock
                        .as_ref()
                        .map(|p| FractalSampler::new(world_seed, channel_salt(p, b, 4))),
                    voronoi: def.voronoi.as_ref().map(|v| {
                        let sampler = CellularSampler::new(world_seed, v.noise.clone());
                        let strength = sampler.strength() as f32;
                        VoronoiChannel {
                            sampler,
                            steepness_lut: v.steepness_curve.to_lookup(STEEPNESS_LUT_BUCKETS),
                            strength,
                        }
                    }),
                }
            })
            .collect();

        let ridged = settings
            .ridged_passes
            .iter()
            .map(|pass| {
                (
                    RidgedSampler::new(world_seed, pass.noise.clone()),
                    pass.apply.clone(),
                )
            })
            .collect();
        let road_passes = settings
            .roads
            .as_ref()
            .map(|roads| {
                roads
                    .passes
                    .iter()
                    .map(|pass| (RidgedSampler::new(world_seed, pass.noise.clone()), pass.weight))
                    .collect()
            })
            .unwrap_or_default();

        let has_elevation = biomes.iter().any(|b| b.elevation.is_some());
        let has_voronoi = biomes.iter().any(|b| b.voronoi.is_some());

        Self {
            extents,
            settings,
            catalog,
            weight_grid,
            temperature,
            moisture,
            biomes,
            ridged,
            road_passes,
            ledger,
            has_elevation,
            has_voronoi,
        }
    }

    pub fn extents(&self) -> ChunkExtents {
        self.extents
    }

    pub fn settings(&self) -> &FieldSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &BiomeCatalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &Arc<DeformationLedger> {
        &self.ledger
    }

    pub fn iso_threshold(&self) -> f32 {
        self.settings.iso_threshold
    }

    /// Biome weight vector at a world position.
    pub fn weights_at(&self, wx: f64, wz: f64) -> BiomeWeights {
        let t = self.temperature.sample_2d(wx, wz) as f32;
        let m = self.moisture.sample_2d(wx, wz) as f32;
        self.weight_grid.sample(t, m)
    }

    /// Highest-weighted biome at a world position.
    pub fn strongest_biome(&self, wx: f64, wz: f64) -> BiomeId {
        self.weights_at(wx, wz).dominant()
    }

    /// Blended elevation surface height at a world position; 0 when no biome
    /// at that position carries elevation shaping.
    pub fn surface_level(&self, wx: f64, wz: f64) -> f32 {
        let weights = self.weights_at(wx, wz);
        self.elevation_terms(&weights, wx, wz)
            .map_or(0.0, |(surface, _, _)| surface)
    }

    /// Raw blended elevation noise in `[0, 1]` at a world position.
    pub fn elevation_sample(&self, wx: f64, wz: f64) -> f32 {
        let weights = self.weights_at(wx, wz);
        self.elevation_terms(&weights, wx, wz)
            .map_or(0.0, |(_, _, raw)| raw)
    }

    pub fn vegetation_sample(&self, wx: f64, wz: f64) -> f32 {
        let weights = self.weights_at(wx, wz);
        self.object_noise(&weights, wx, wz).0
    }

    pub fn rock_sample(&self, wx: f64, wz: f64) -> f32 {
        let weights = self.weights_at(wx, wz);
        self.object_noise(&weights, wx, wz).1
    }

    /// Road (weight, start height) at a world position, ledger overrides
    /// included. Mirrors the chunk buffers: with roads disabled the noise
    /// term is zero, but structure-carved overrides still apply; `(0, 0)`
    /// only when roads and structures are both off.
    pub fn road_sample(&self, wx: f64, wz: f64) -> (f32, f32) {
        let (mut weight, mut start) = match &self.settings.roads {
            Some(cfg) => {
                let weight = self.road_noise(wx, wz);
                let start = self
                    .elevation_terms(&self.weights_at(wx, wz), wx, wz)
                    .map_or(cfg.default_start_height, |(surface, _, _)| surface)
                    .clamp(cfg.min_height, cfg.max_height);
                (weight, start)
            }
            None if self.settings.structures_enabled => (0.0, 0.0),
            None => return (0.0, 0.0),
        };
        let (coord, lx, _, lz) = world_to_chunk_local(wx, 0.0, wz, self.extents);
        let column = self.extents.column_index(lx, lz);
        self.ledger.for_each_road_override(coord, |c, entry| {
            if c == column && entry.weight > weight {
                weight = entry.weight;
                start = entry.start_height;
            }
        });
        (weight, start)
    }

    /// Generates the full field set for one chunk.
    pub fn generate(&self, coord: ChunkCoord) -> ChunkFields {
        self.generate_with(coord, &mut |_| {})
    }

    /// Generates the full field set, notifying `on_stage` after each kernel
    /// join in pipeline order.
    pub fn generate_with(
        &self,
        coord: ChunkCoord,
        on_stage: &mut dyn FnMut(FieldStage<'_>),
    ) -> ChunkFields {
        let extents = self.extents;
        let columns = extents.column_count();
        let sy = extents.samples_y();
        let origin = coord.world_min(extents);
        let mut fields = ChunkFields::new(coord, extents);

        // 1. Temperature/moisture noise and biome weights per column.
        let column_samples: Vec<(f32, f32, BiomeWeights)> = (0..columns)
            .into_par_iter()
            .map(|c| {
                let (wx, wz) = self.column_world(origin, c);
                let t = self.temperature.sample_2d(wx, wz) as f32;
                let m = self.moisture.sample_2d(wx, wz) as f32;
                let weights = self.weight_grid.sample(t, m);
                (t, m, weights)
            })
            .collect();
        let mut weights = Vec::with_capacity(columns);
        for (c, (t, m, w)) in column_samples.into_iter().enumerate() {
            fields.temperature[c] = t;
            fields.moisture[c] = m;
            fields.biome_ids[c] = w.dominant();
            weights.push(w);
        }
        on_stage(FieldStage::TextureNoise {
            temperature: &fields.temperature,
            moisture: &fields.moisture,
            biomes: &fields.biome_ids,
        });

        // 2. Vegetation/rock channels (consumed by object placement).
        let object_samples: Vec<(f32, f32)> = (0..columns)
            .into_par_iter()
            .map(|c| {
                let (wx, wz) = self.column_world(origin, c);
                self.object_noise(&weights[c], wx, wz)
            })
            .collect();
        for (c, (veg, rock)) in object_samples.into_iter().enumerate() {
            fields.vegetation[c] = veg;
            fields.rock[c] = rock;
        }
        on_stage(FieldStage::ObjectNoise {
            vegetation: &fields.vegetation,
            rock: &fields.rock,
        });

        // 3. Elevation surface/floor sheet, with a halo when Voronoi needs
        //    steepness.
        let sheet = self.has_elevation.then(|| {
            let halo: isize = if self.has_voronoi { 1 } else { 0 };
            let width = extents.samples_x() + 2 * halo as usize;
            let depth = extents.samples_z() + 2 * halo as usize;
            let cells: Vec<(f32, f32)> = (0..width * depth)
                .into_par_iter()
                .map(|i| {
                    let gx = (i % width) as isize - halo;
                    let gz = (i / width) as isize - halo;
                    let wx = origin.x + gx as f64;
                    let wz = origin.y + gz as f64;
                    let inside = gx >= 0
                        && (gx as usize) < extents.samples_x()
                        && gz >= 0
                        && (gz as usize) < extents.samples_z();
                    let owned;
                    let w = if inside {
                        &weights[extents.column_index(gx as usize, gz as usize)]
                    } else {
                        owned = self.weights_at(wx, wz);
                        &owned
                    };
                    let (surface, floor, _) =
                        self.elevation_terms(w, wx, wz).unwrap_or((0.0, 0.0, 0.0));
                    (surface, floor)
                })
                .collect();
            let (surface, floor): (Vec<f32>, Vec<f32>) = cells.into_iter().unzip();
            ElevationSheet {
                halo,
                width,
                surface,
                floor,
            }
        });
        let mut floor_weight = vec![0.0f32; if sheet.is_some() { columns } else { 0 }];
        if let Some(sheet) = &sheet {
            for c in 0..columns {
                let (x, z) = extents.column_coords(c);
                fields.surface_height[c] = sheet.surface_at(x as isize, z as isize);
                floor_weight[c] = sheet.floor_at(x as isize, z as isize);
            }
            on_stage(FieldStage::ElevationNoise {
                surface: &fields.surface_height,
                floor_weight: &floor_weight,
            });
        }

        // 4. Ridged carving passes over the footprint.
        let ridged_values: Vec<Vec<f32>> = self
            .ridged
            .iter()
            .map(|(sampler, _)| {
                (0..columns)
                    .into_par_iter()
                    .map(|c| {
                        let (wx, wz) = self.column_world(origin, c);
                        sampler.sample(wx, wz) as f32
                    })
                    .collect()
            })
            .collect();
        if !ridged_values.is_empty() {
            on_stage(FieldStage::RidgedNoise {
                passes: &ridged_values,
            });
        }

        // 5. Steepness-bucketed Voronoi multipliers per biome.
        let steep_mults: Vec<Vec<f32>> = self
            .biomes
            .iter()
            .map(|biome| {
                let Some(vor) = &biome.voronoi else {
                    return Vec::new();
                };
                (0..columns)
                    .map(|c| {
                        let (x, z) = extents.column_coords(c);
                        let steep = sheet.as_ref().map_or(0.0, |s| s.steepness(x, z));
                        sample_lookup(&vor.steepness_lut, steep)
                    })
                    .collect()
            })
            .collect();

        // 6. Sparse 3D terrain noise on the coarse lattice.
        let lattice = self.build_lattice(origin, &weights);

        // 7. Compose the density field per column.
        let top = sy - 1;
        fields
            .density
            .par_chunks_mut(sy)
            .enumerate()
            .for_each(|(c, column)| {
                let (x, z) = extents.column_coords(c);
                let (wx, wz) = self.column_world(origin, c);
                let surface = sheet
                    .as_ref()
                    .map(|s| (s.surface_at(x as isize, z as isize), s.floor_at(x as isize, z as isize)));

                column[0] = 1.0;
                column[top] = -1.0;
                for y in 1..top {
                    let wy = y as f32;
                    let mut acc = 0.0f32;
                    if let Some((surface, floor)) = surface {
                        acc -= ((wy - surface) * floor).clamp(-SATURATION, SATURATION);
                    }
                    for (pass, values) in ridged_values.iter().enumerate() {
                        let strength = self.ridged[pass].1.strength_at(wy);
                        if strength > 0.0 {
                            acc -= values[c] * strength;
                        }
                    }
                    if acc.abs() < SATURATION {
                        acc += lattice.interpolate(x, y, z);
                        if self.has_voronoi {
                            acc -= self.voronoi_term(c, &weights[c], &steep_mults, wx, wy as f64, wz);
                        }
                    }
                    column[y] = acc;
                }
            });
        on_stage(FieldStage::TerrainNoise {
            density: &fields.density,
        });

        // 8/9. Roads, ledger road overrides, road deformation, structure
        //      density deltas.
        let roads_enabled = self.settings.roads.is_some();
        if roads_enabled || self.settings.structures_enabled {
            if let Some(cfg) = &self.settings.roads {
                let road_samples: Vec<(f32, f32)> = (0..columns)
                    .into_par_iter()
                    .map(|c| {
                        let (wx, wz) = self.column_world(origin, c);
                        let weight = self.road_noise(wx, wz);
                        let start = if sheet.is_some() {
                            fields.surface_height[c]
                        } else {
                            cfg.default_start_height
                        }
                        .clamp(cfg.min_height, cfg.max_height);
                        (weight, start)
                    })
                    .collect();
                for (c, (weight, start)) in road_samples.into_iter().enumerate() {
                    fields.road_weight[c] = weight;
                    fields.road_start_height[c] = start;
                }
            }

            let road_weight = &mut fields.road_weight;
            let road_start = &mut fields.road_start_height;
            self.ledger.for_each_road_override(coord, |column, entry| {
                if let Some(w) = road_weight.get_mut(column)
                    && entry.weight > *w
                {
                    *w = entry.weight;
                    road_start[column] = entry.start_height;
                }
            });

            if let Some(cfg) = &self.settings.roads {
                deform_roads(cfg, extents, &fields.road_weight, &fields.road_start_height, &mut fields.density);
                on_stage(FieldStage::Roads {
                    weight: &fields.road_weight,
                    start_height: &fields.road_start_height,
                });
            }
        }

        if self.settings.structures_enabled {
            let multiplier = self.settings.ledger_density_multiplier;
            let density = &mut fields.density;
            self.ledger.for_each_density_delta(coord, |index, delta| {
                if let Some(value) = density.get_mut(index) {
                    *value += delta * multiplier;
                }
            });
        }

        // The hard floor/ceiling rows survive every merge.
        for c in 0..columns {
            fields.density[c * sy] = 1.0;
            fields.density[c * sy + top] = -1.0;
        }

        debug!(
            chunk_x = coord.x,
            chunk_z = coord.z,
            lattice_points = lattice.values.len(),
            "chunk fields generated"
        );
        fields
    }

    fn column_world(&self, origin: glam::DVec2, column: usize) -> (f64, f64) {
        let (x, z) = self.extents.column_coords(column);
        (origin.x + x as f64, origin.y + z as f64)
    }

    /// Weighted (vegetation, rock) noise for one location.
    fn object_noise(&self, weights: &BiomeWeights, wx: f64, wz: f64) -> (f32, f32) {
        let mut vegetation = 0.0;
        let mut rock = 0.0;
        for (id, weight) in weights.iter_active() {
            let channels = &self.biomes[id.0 as usize];
            if let Some(sampler) = &channels.vegetation {
                vegetation += weight * sampler.sample_2d(wx, wz) as f32;
            }
            if let Some(sampler) = &channels.rock {
                rock += weight * sampler.sample_2d(wx, wz) as f32;
            }
        }
        (vegetation, rock)
    }

    /// Weighted (surface height, floor weight, raw elevation) for one
    /// location; `None` when no biome with weight here shapes elevation.
    fn elevation_terms(&self, weights: &BiomeWeights, wx: f64, wz: f64) -> Option<(f32, f32, f32)> {
        let mut surface = 0.0;
        let mut floor = 0.0;
        let mut raw = 0.0;
        let mut total = 0.0;
        for (id, weight) in weights.iter_active() {
            if let Some(elevation) = &self.biomes[id.0 as usize].elevation {
                let sample = elevation.sampler.sample_2d(wx, wz) as f32;
                surface += weight * elevation.height_curve.sample(sample);
                floor += weight * elevation.floor_curve.sample(sample);
                raw += weight * sample;
                total += weight;
            }
        }
        if total <= 0.0 {
            return None;
        }
        // Renormalize so borders with elevation-less biomes keep their height.
        Some((surface / total, floor / total, raw / total))
    }

    /// Blended road weight from all passes, mixed by normalized pass weights.
    fn road_noise(&self, wx: f64, wz: f64) -> f32 {
        let mut total = 0.0f32;
        let mut weighted = 0.0f32;
        for (sampler, weight) in &self.road_passes {
            weighted += sampler.sample(wx, wz) as f32 * weight;
            total += weight;
        }
        if total <= 0.0 {
            return 0.0;
        }
        weighted / total
    }

    fn voronoi_term(
        &self,
        column: usize,
        weights: &BiomeWeights,
        steep_mults: &[Vec<f32>],
        wx: f64,
        wy: f64,
        wz: f64,
    ) -> f32 {
        let mut total = 0.0;
        for (id, weight) in weights.iter_active() {
            let b = id.0 as usize;
            if let Some(vor) = &self.biomes[b].voronoi {
                let mult = steep_mults[b][column];
                if mult == 0.0 {
                    continue;
                }
                total += weight * mult * vor.sampler.sample(wx, wy, wz) as f32 * vor.strength;
            }
        }
        total
    }

    fn build_lattice(&self, origin: glam::DVec2, weights: &[BiomeWeights]) -> TerrainLattice {
        let extents = self.extents;
        let ax = AxisMap::build(extents.samples_x(), self.settings.horizontal_sample_rate);
        let ay = AxisMap::build(extents.samples_y(), self.settings.vertical_sample_rate);
        let az = AxisMap::build(extents.samples_z(), self.settings.horizontal_sample_rate);

        let (px, py) = (ax.len(), ay.len());
        let mut values = vec![0.0f32; px * py * az.len()];
        values
            .par_chunks_mut(py)
            .enumerate()
            .for_each(|(ci, coarse_column)| {
                let xi = ci % px;
                let zi = ci / px;
                let x = ax.points[xi];
                let z = az.points[zi];
                let column = extents.column_index(x, z);
                let wx = origin.x + x as f64;
                let wz = origin.y + z as f64;
                for (yi, value) in coarse_column.iter_mut().enumerate() {
                    let wy = ay.points[yi] as f64;
                    *value = self.terrain_noise(&weights[column], wx, wy, wz);
                }
            });

        TerrainLattice { ax, ay, az, values }
    }

    /// Biome-weighted 3D terrain noise in `[0, 1]`.
    fn terrain_noise(&self, weights: &BiomeWeights, wx: f64, wy: f64, wz: f64) -> f32 {
        let mut total = 0.0;
        for (id, weight) in weights.iter_active() {
            total += weight * self.biomes[id.0 as usize].terrain.sample_3d(wx, wy, wz) as f32;
        }
        total
    }
}

/// Fills below the road surface and carves above it, gated by weight, a
/// height falloff, and the deformable window. Boundary rows are untouched.
fn deform_roads(
    cfg: &RoadSettings,
    extents: ChunkExtents,
    road_weight: &[f32],
    road_start: &[f32],
    density: &mut [f32],
) {
    if cfg.road_height <= 0.0 {
        return;
    }
    let sy = extents.samples_y();
    let top = sy - 1;
    density
        .par_chunks_mut(sy)
        .enumerate()
        .for_each(|(c, column)| {
            let weight = road_weight[c];
            if weight <= cfg.weight_threshold {
                return;
            }
            let start = road_start[c];
            let lo = (start - cfg.road_height).floor().max(1.0) as usize;
            let hi = ((start + cfg.road_height).ceil() as isize).min(top as isize - 1);
            if hi < lo as isize {
                return;
            }
            for y in lo..=hi as usize {
                let dist = y as f32 - start;
                let falloff = cfg
                    .falloff
                    .sample((dist.abs() / cfg.road_height).clamp(0.0, 1.0));
                let deform = cfg.strength * weight * falloff;
                if dist <= 0.0 {
                    column[y] += deform;
                } else {
                    column[y] -= deform;
                }
            }
        });
}

/// Content hash of a density buffer, for the determinism stress harness.
pub fn hash_density_field(density: &[f32]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for value in density {
        value.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_biome::BiomeDefinition;

    fn small_extents() -> ChunkExtents {
        ChunkExtents {
            size_x: 8,
            size_y: 16,
            size_z: 8,
        }
    }

    fn small_settings() -> FieldSettings {
        FieldSettings {
            horizontal_sample_rate: 2,
            vertical_sample_rate: 2,
            ..FieldSettings::default()
        }
    }

    fn generator(
        seed: u64,
        settings: FieldSettings,
        biome: BiomeDefinition,
        ledger: Arc<DeformationLedger>,
    ) -> DensityGenerator {
        DensityGenerator::new(
            seed,
            small_extents(),
            settings,
            BiomeCatalog::new(vec![biome]),
            ledger,
        )
    }

    #[test]
    fn test_regeneration_is_bit_identical() {
        let generator = generator(
            42,
            small_settings(),
            BiomeDefinition::fallback(),
            Arc::new(DeformationLedger::new()),
        );
        let coord = ChunkCoord::new(3, -2);
        let a = generator.generate(coord);
        let b = generator.generate(coord);
        assert_eq!(
            hash_density_field(&a.density),
            hash_density_field(&b.density),
            "Density must be a pure function of (seed, coord, config)"
        );
        assert_eq!(a.biome_ids, b.biome_ids);
        assert_eq!(a.road_weight, b.road_weight);
    }

    #[test]
    fn test_adjacent_chunks_share_border_samples() {
        let generator = generator(
            7,
            small_settings(),
            BiomeDefinition::fallback(),
            Arc::new(DeformationLedger::new()),
        );
        let a = generator.generate(ChunkCoord::new(0, 0));
        let b = generator.generate(ChunkCoord::new(1, 0));
        let extents = small_extents();
        let border = extents.samples_x() - 1;
        for z in 0..extents.samples_z() {
            for y in 0..extents.samples_y() {
                let da = a.density_at(border, y, z);
                let db = b.density_at(0, y, z);
                assert_eq!(
                    da.to_bits(),
                    db.to_bits(),
                    "Seam mismatch at y={y} z={z}: {da} vs {db}"
                );
            }
        }
    }

    #[test]
    fn test_hard_floor_and_ceiling_rows() {
        let generator = generator(
            99,
            small_settings(),
            BiomeDefinition::fallback(),
            Arc::new(DeformationLedger::new()),
        );
        let fields = generator.generate(ChunkCoord::new(-4, 11));
        let extents = small_extents();
        let top = extents.samples_y() - 1;
        for z in 0..extents.samples_z() {
            for x in 0..extents.samples_x() {
                assert_eq!(fields.density_at(x, 0, z), 1.0, "Bottom row is solid");
                assert_eq!(fields.density_at(x, top, z), -1.0, "Top row is air");
            }
        }
    }

    #[test]
    fn test_pure_floor_scenario() {
        // Single full-coverage biome, no elevation, roads or structures:
        // nothing but terrain noise in [0, 1] may reach the field, and the
        // bottom row must stay exactly 1.
        let mut biome = BiomeDefinition::fallback();
        biome.elevation = None;
        let settings = FieldSettings {
            roads: None,
            structures_enabled: false,
            ..small_settings()
        };
        let generator = generator(1, settings, biome, Arc::new(DeformationLedger::new()));
        let fields = generator.generate(ChunkCoord::new(0, 0));
        let extents = small_extents();
        let top = extents.samples_y() - 1;
        for z in 0..extents.samples_z() {
            for x in 0..extents.samples_x() {
                assert_eq!(
                    fields.density_at(x, 0, z),
                    1.0,
                    "Floor density contaminated at ({x}, 0, {z})"
                );
                for y in 1..top {
                    let d = fields.density_at(x, y, z);
                    assert!(
                        (0.0..=1.0).contains(&d),
                        "Interior density {d} at ({x}, {y}, {z}) outside noise range"
                    );
                }
            }
        }
    }

    #[test]
    fn test_ledger_density_delta_is_merged() {
        let ledger = Arc::new(DeformationLedger::new());
        let generator = generator(
            5,
            small_settings(),
            BiomeDefinition::fallback(),
            Arc::clone(&ledger),
        );
        let coord = ChunkCoord::new(2, 2);
        let extents = small_extents();
        let index = extents.voxel_index(4, 7, 4);

        let before = generator.generate(coord).density[index];
        ledger.add_density_delta(coord, index, 1.5);
        let after = generator.generate(coord).density[index];
        assert!(
            (after - before - 1.5).abs() < 1e-6,
            "Delta not merged: {before} -> {after}"
        );
    }

    #[test]
    fn test_road_override_deforms_density() {
        let ledger = Arc::new(DeformationLedger::new());
        let settings = FieldSettings {
            roads: Some(RoadSettings {
                passes: Vec::new(),
                road_height: 3.0,
                strength: 2.0,
                min_height: 2.0,
                max_height: 14.0,
                default_start_height: 8.0,
                weight_threshold: 0.05,
                ..RoadSettings::default()
            }),
            ..small_settings()
        };
        let mut biome = BiomeDefinition::fallback();
        biome.elevation = None;
        let generator = generator(9, settings, biome, Arc::clone(&ledger));
        let coord = ChunkCoord::new(0, 0);
        let extents = small_extents();
        let column = extents.column_index(4, 4);

        let before = generator.generate(coord);
        ledger.apply_road_override(coord, column, 1.0, 8.0);
        let after = generator.generate(coord);

        assert_eq!(after.road_at(4, 4).0, 1.0, "Override weight reaches the buffer");
        let below = extents.voxel_index(4, 7, 4);
        let above = extents.voxel_index(4, 10, 4);
        assert!(
            after.density[below] > before.density[below],
            "Road fills below its surface"
        );
        assert!(
            after.density[above] < before.density[above],
            "Road carves above its surface"
        );
    }

    #[test]
    fn test_point_samplers_match_chunk_buffers() {
        let generator = generator(
            21,
            small_settings(),
            BiomeDefinition::fallback(),
            Arc::new(DeformationLedger::new()),
        );
        let coord = ChunkCoord::new(1, -1);
        let fields = generator.generate(coord);
        let extents = small_extents();
        let origin = coord.world_min(extents);
        let (x, z) = (3usize, 5usize);
        let (wx, wz) = (origin.x + x as f64, origin.y + z as f64);

        assert_eq!(
            generator.strongest_biome(wx, wz),
            fields.biome_at(x, z),
            "Point sampler disagrees with the chunk buffer"
        );
        let column = extents.column_index(x, z);
        let surface = generator.surface_level(wx, wz);
        assert_eq!(
            surface.to_bits(),
            fields.surface_height[column].to_bits(),
            "Surface level mismatch: {surface} vs {}",
            fields.surface_height[column]
        );
    }

    #[test]
    fn test_road_sample_sees_overrides_with_roads_disabled() {
        let ledger = Arc::new(DeformationLedger::new());
        let generator = generator(
            21,
            FieldSettings {
                roads: None,
                structures_enabled: true,
                ..small_settings()
            },
            BiomeDefinition::fallback(),
            Arc::clone(&ledger),
        );
        let coord = ChunkCoord::new(0, 0);
        let extents = small_extents();
        ledger.apply_road_override(coord, extents.column_index(4, 4), 0.9, 8.0);

        let fields = generator.generate(coord);
        assert_eq!(
            fields.road_at(4, 4),
            (0.9, 8.0),
            "Structure overrides merge into the buffers without a road layer"
        );
        assert_eq!(
            generator.road_sample(4.0, 4.0),
            fields.road_at(4, 4),
            "Point sampler must agree with the chunk buffer"
        );
        assert_eq!(
            generator.road_sample(1.0, 1.0),
            (0.0, 0.0),
            "Columns without an override stay at zero"
        );
    }
}
