//! Piecewise-linear shaping curves.
//!
//! Replaces the original tool's serialized animation-curve assets with plain
//! data: sorted `(t, value)` keys with linear interpolation and clamped ends.

use serde::{Deserialize, Serialize};

/// A single curve key.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    /// Input position.
    pub t: f32,
    /// Output value at `t`.
    pub value: f32,
}

/// A piecewise-linear curve over sorted keys.
///
/// Sampling outside the key range clamps to the first/last value; an empty
/// curve samples as 0.0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    keys: Vec<CurveKey>,
}

impl Curve {
    /// Builds a curve from `(t, value)` pairs, sorting by `t`.
    pub fn new(keys: impl IntoIterator<Item = (f32, f32)>) -> Self {
        let mut keys: Vec<CurveKey> = keys
            .into_iter()
            .map(|(t, value)| CurveKey { t, value })
            .collect();
        keys.sort_by(|a, b| a.t.total_cmp(&b.t));
        Self { keys }
    }

    /// A curve that returns `value` everywhere.
    pub fn constant(value: f32) -> Self {
        Self::new([(0.0, value)])
    }

    /// A linear ramp from `from` at t=0 to `to` at t=1.
    pub fn linear(from: f32, to: f32) -> Self {
        Self::new([(0.0, from), (1.0, to)])
    }

    /// Samples the curve at `t` with linear interpolation.
    pub fn sample(&self, t: f32) -> f32 {
        let Some(first) = self.keys.first() else {
            return 0.0;
        };
        if t <= first.t {
            return first.value;
        }
        let last = self.keys[self.keys.len() - 1];
        if t >= last.t {
            return last.value;
        }
        // Keys are sorted; find the surrounding pair.
        let hi = self
            .keys
            .iter()
            .position(|k| k.t >= t)
            .unwrap_or(self.keys.len() - 1);
        let a = self.keys[hi - 1];
        let b = self.keys[hi];
        let span = b.t - a.t;
        if span <= f32::EPSILON {
            return b.value;
        }
        let alpha = (t - a.t) / span;
        a.value + (b.value - a.value) * alpha
    }

    /// Precomputes `buckets` evenly-spaced samples over `[0, 1]`.
    ///
    /// Used where per-voxel curve evaluation is too hot (the Voronoi
    /// steepness lookup).
    pub fn to_lookup(&self, buckets: usize) -> Vec<f32> {
        let n = buckets.max(2);
        (0..n)
            .map(|i| self.sample(i as f32 / (n - 1) as f32))
            .collect()
    }

    /// Returns the sorted keys.
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }
}

impl Default for Curve {
    fn default() -> Self {
        Self::linear(0.0, 1.0)
    }
}

/// Samples a precomputed lookup table produced by [`Curve::to_lookup`].
pub fn sample_lookup(lookup: &[f32], t: f32) -> f32 {
    if lookup.is_empty() {
        return 0.0;
    }
    let idx = (t.clamp(0.0, 1.0) * (lookup.len() - 1) as f32).round() as usize;
    lookup[idx.min(lookup.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_linear_interpolation_between_keys() {
        let curve = Curve::new([(0.0, 0.0), (1.0, 10.0)]);
        assert!((curve.sample(0.5) - 5.0).abs() < EPSILON);
        assert!((curve.sample(0.25) - 2.5).abs() < EPSILON);
    }

    #[test]
    fn test_sampling_clamps_outside_range() {
        let curve = Curve::new([(0.2, 1.0), (0.8, 3.0)]);
        assert!((curve.sample(-5.0) - 1.0).abs() < EPSILON);
        assert!((curve.sample(5.0) - 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_keys_sorted_regardless_of_input_order() {
        let curve = Curve::new([(1.0, 10.0), (0.0, 0.0), (0.5, 2.0)]);
        assert!((curve.sample(0.25) - 1.0).abs() < EPSILON);
        assert!((curve.sample(0.75) - 6.0).abs() < EPSILON);
    }

    #[test]
    fn test_empty_curve_samples_zero() {
        let curve = Curve::new([]);
        assert_eq!(curve.sample(0.5), 0.0);
    }

    #[test]
    fn test_constant_curve() {
        let curve = Curve::constant(4.2);
        for t in [-1.0, 0.0, 0.3, 1.0, 2.0] {
            assert!((curve.sample(t) - 4.2).abs() < EPSILON);
        }
    }

    #[test]
    fn test_lookup_matches_direct_samples_at_bucket_centers() {
        let curve = Curve::new([(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)]);
        let lookup = curve.to_lookup(101);
        for i in 0..101 {
            let t = i as f32 / 100.0;
            let direct = curve.sample(t);
            let bucketed = sample_lookup(&lookup, t);
            assert!(
                (direct - bucketed).abs() < 0.02,
                "Lookup diverges at t={t}: {direct} vs {bucketed}"
            );
        }
    }
}
