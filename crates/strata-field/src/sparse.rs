//! Coarse-lattice bookkeeping for sparse terrain-noise evaluation.
//!
//! Full 3D fractal noise at every voxel is the dominant cost of chunk
//! generation, so it is evaluated only on a strided lattice and skipped
//! voxels are filled by trilinear interpolation.

/// Maps every sample index of one axis onto its enclosing coarse segment.
pub(crate) struct AxisMap {
    /// Sample indices where noise is evaluated exactly. Always contains the
    /// first and last sample of the axis.
    pub points: Vec<usize>,
    /// Lower coarse-point index per sample.
    pub seg: Vec<usize>,
    /// Interpolation fraction per sample, 0 at the lower point, 1 at the
    /// upper.
    pub t: Vec<f32>,
}

impl AxisMap {
    pub fn build(samples: usize, stride: usize) -> Self {
        let stride = stride.max(1);
        let mut points: Vec<usize> = (0..samples).step_by(stride).collect();
        if *points.last().unwrap_or(&0) != samples - 1 {
            points.push(samples - 1);
        }

        let mut seg = vec![0usize; samples];
        let mut t = vec![0.0f32; samples];
        for sample in 0..samples {
            // Lower lattice point; the last sample belongs to the final
            // segment with fraction 1 so borders read lattice values exactly.
            let upper = points.partition_point(|&p| p <= sample);
            let i = upper.saturating_sub(1).min(points.len().saturating_sub(2));
            seg[sample] = i;
            let lo = points[i];
            let hi = points[(i + 1).min(points.len() - 1)];
            t[sample] = if hi > lo {
                (sample - lo) as f32 / (hi - lo) as f32
            } else {
                0.0
            };
        }
        Self { points, seg, t }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Endpoints-exact linear blend: returns `a` at `t == 0` and `b` at
/// `t == 1` bit-for-bit, which the seam guarantee relies on.
#[inline]
pub(crate) fn lerp_exact(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_includes_first_and_last_sample() {
        let axis = AxisMap::build(33, 4);
        assert_eq!(axis.points.first(), Some(&0));
        assert_eq!(axis.points.last(), Some(&32), "Last sample is a lattice point");
    }

    #[test]
    fn test_uneven_tail_segment() {
        // 0, 5, 10 then a short tail to 12.
        let axis = AxisMap::build(13, 5);
        assert_eq!(axis.points, vec![0, 5, 10, 12]);
        assert_eq!(axis.seg[11], 2);
        assert!((axis.t[11] - 0.5).abs() < 1e-6, "Tail fraction: {}", axis.t[11]);
    }

    #[test]
    fn test_border_samples_read_lattice_exactly() {
        let axis = AxisMap::build(33, 4);
        assert_eq!(axis.t[0], 0.0);
        assert_eq!(axis.t[32], 1.0, "Last sample lands on the upper point");
        let a = 0.123_f32;
        let b = 0.456_f32;
        assert_eq!(lerp_exact(a, b, 0.0), a);
        assert_eq!(lerp_exact(a, b, 1.0), b);
    }

    #[test]
    fn test_stride_one_hits_every_sample() {
        let axis = AxisMap::build(9, 1);
        assert_eq!(axis.len(), 9);
        for s in 0..9 {
            assert!(
                axis.t[s] == 0.0 || axis.t[s] == 1.0,
                "Sample {s} must land on a lattice point, got t={}",
                axis.t[s]
            );
        }
    }

    #[test]
    fn test_stride_larger_than_axis() {
        let axis = AxisMap::build(9, 64);
        assert_eq!(axis.points, vec![0, 8], "Degenerates to the two endpoints");
        assert!((axis.t[4] - 0.5).abs() < 1e-6);
    }
}
