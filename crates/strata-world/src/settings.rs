//! Scheduler configuration and the externally supplied viewpoint.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Viewpoint driving generation priority, supplied by the host each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewpoint {
    pub position: DVec3,
    /// Facing direction; only its horizontal component matters.
    pub forward: DVec3,
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            forward: DVec3::Z,
        }
    }
}

/// Chunk scheduler knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Retention radius in chunks; chunks farther from the viewpoint are
    /// despawned, coordinates within are candidates for generation.
    pub chunk_radius: i32,
    /// Candidates within this angle of the viewpoint's forward direction
    /// receive the flat priority bonus.
    pub max_view_angle_degrees: f32,
    /// Priority bonus (in chunk units of distance) for view-aligned
    /// candidates.
    pub view_bonus: f32,
    /// Colliders accumulate until this many are pending, then bake as one
    /// batch.
    pub collider_batch_size: usize,
    /// Chunks closer than this (world units) bake their collider
    /// immediately instead of queueing.
    pub collider_min_distance: f32,
    /// Radius in chunks of the per-tick structure eligibility sweep.
    pub structure_check_radius: i32,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            chunk_radius: 6,
            max_view_angle_degrees: 40.0,
            view_bonus: 2.0,
            collider_batch_size: 8,
            collider_min_distance: 64.0,
            structure_check_radius: 8,
        }
    }
}
