//! In-level score accounting

use serde::{Deserialize, Serialize};

use crate::round1;

/// Running tallies for the current level attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShotTally {
    /// Incremented once per fire action, never decremented
    pub shots_fired: u32,
    pub targets_destroyed: u32,
    pub obstacles_destroyed: u32,
    /// Sum of destroyed buildings' score values
    pub obstacle_score: f32,
}

impl ShotTally {
    pub fn record_shot(&mut self) {
        self.shots_fired += 1;
    }

    pub fn record_target(&mut self) {
        self.targets_destroyed += 1;
    }

    pub fn record_obstacle(&mut self, score_value: f32) {
        self.obstacles_destroyed += 1;
        self.obstacle_score += score_value;
    }

    pub fn score(&self) -> f32 {
        compute_score(self.targets_destroyed, self.obstacle_score, self.shots_fired)
    }
}

/// `((targets + obstacle_score) / shots) * 100`, one decimal; 0 before any shot
pub fn compute_score(targets_destroyed: u32, obstacle_score: f32, shots_used: u32) -> f32 {
    if shots_used == 0 {
        return 0.0;
    }
    round1((targets_destroyed as f32 + obstacle_score) / shots_used as f32 * 100.0)
}
