//! Ballistic preview for the aiming arc
//!
//! Closed-form projectile motion without drag. The gravity passed in must be
//! the world's ([`super::World::gravity`]); the world integrates free flight
//! exactly, so preview and flight agree.

use glam::Vec3;

/// Heights below this count as ground contact
pub const GROUND_EPSILON: f32 = 0.01;

/// Sampling configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryConfig {
    /// Number of points produced (always exactly this many)
    pub samples: usize,
    /// Time between samples (seconds)
    pub step: f32,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            samples: 60,
            step: 0.05,
        }
    }
}

impl From<&crate::Tuning> for TrajectoryConfig {
    fn from(tuning: &crate::Tuning) -> Self {
        Self {
            samples: tuning.trajectory_samples,
            step: tuning.trajectory_step,
        }
    }
}

/// Precomputed preview path
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub points: Vec<Vec3>,
    /// Where the path meets the ground, if it does within the sampled window
    pub landing: Option<Vec3>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Flattened xyz triples for the renderer
    pub fn to_flat(&self) -> Vec<f32> {
        self.points.iter().flat_map(|p| p.to_array()).collect()
    }
}

/// Position at time `t` for launch from `start` with `velocity` under `gravity` (magnitude)
#[inline]
pub fn position_at(start: Vec3, velocity: Vec3, gravity: f32, t: f32) -> Vec3 {
    Vec3::new(
        start.x + velocity.x * t,
        start.y + velocity.y * t - 0.5 * gravity * t * t,
        start.z + velocity.z * t,
    )
}

/// Time at which the path returns to y = 0, if it ever does
pub fn ground_time(start: Vec3, velocity: Vec3, gravity: f32) -> Option<f32> {
    if gravity <= 0.0 {
        if velocity.y < 0.0 {
            return Some(-start.y / velocity.y).filter(|t| *t >= 0.0);
        }
        return None;
    }
    // start.y + vy t - g/2 t² = 0
    let disc = velocity.y * velocity.y + 2.0 * gravity * start.y;
    if disc < 0.0 {
        return None;
    }
    let t = (velocity.y + disc.sqrt()) / gravity;
    (t >= 0.0).then_some(t)
}

/// Sample the flight path. Once a sample would be at or under the ground, it
/// and every remaining sample are clamped to the exact impact point.
pub fn predict(start: Vec3, velocity: Vec3, gravity: f32, config: TrajectoryConfig) -> Trajectory {
    let mut points = Vec::with_capacity(config.samples);
    let mut landing = None;

    for i in 0..config.samples {
        if let Some(hit) = landing {
            points.push(hit);
            continue;
        }
        let t = i as f32 * config.step;
        let p = position_at(start, velocity, gravity, t);
        if i > 0 && p.y <= GROUND_EPSILON {
            let hit = ground_time(start, velocity, gravity)
                .map(|t_hit| {
                    let mut q = position_at(start, velocity, gravity, t_hit);
                    q.y = 0.0;
                    q
                })
                .unwrap_or(Vec3::new(p.x, 0.0, p.z));
            landing = Some(hit);
            points.push(hit);
        } else {
            points.push(p);
        }
    }

    Trajectory { points, landing }
}
