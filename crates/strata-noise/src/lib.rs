//! Reusable noise kernels: fractal gradient noise, ridged noise, and
//! cellular (F2−F1) noise, all seeded by per-octave offset tables derived
//! once from a single world seed.
//!
//! Every sampler in this crate is a pure function of
//! `(seed, coordinate, parameter set)` and is bit-reproducible across runs
//! and threads — regeneration consistency depends on it.

mod cellular;
mod curve;
mod fractal;
mod offsets;
mod ridged;

pub use cellular::{CellularParams, CellularSampler};
pub use curve::{Curve, CurveKey, sample_lookup};
pub use fractal::{FractalParams, FractalSampler};
pub use offsets::{derive_stream_seed, octave_offsets_2d, octave_offsets_3d};
pub use ridged::{RidgedApply, RidgedParams, RidgedSampler};
