//! Data-driven game balance
//!
//! Every field defaults to the matching constant in [`crate::consts`], so a
//! tuning file only needs the values it overrides. Gravity is deliberately
//! absent: the world owns it and the trajectory preview reads it from there.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Runtime-tunable balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Damage ===
    /// Building impacts below this force do nothing
    pub damage_threshold: f32,
    /// Building damage per unit of force above the threshold
    pub damage_multiplier: f32,
    /// Projectile-to-target distance that counts as a hit
    pub target_hit_radius: f32,
    /// Damage per target hit
    pub target_hit_damage: f32,

    // === Projectile ===
    pub projectile_ttl: f32,
    pub projectile_mass: f32,
    pub projectile_radius: f32,
    /// Pause after a shot resolves before the next aim / outcome check
    pub settle_delay: f32,

    // === Catapult ===
    pub min_power: f32,
    pub max_power: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
    /// Yaw is clamped to ±max_yaw
    pub max_yaw: f32,
    /// Radians per second while an aim key is held
    pub aim_speed: f32,
    /// Power units per second while a power key is held
    pub power_speed: f32,

    // === Trajectory preview ===
    pub trajectory_samples: usize,
    pub trajectory_step: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            damage_threshold: DAMAGE_THRESHOLD,
            damage_multiplier: DAMAGE_MULTIPLIER,
            target_hit_radius: TARGET_HIT_RADIUS,
            target_hit_damage: TARGET_HIT_DAMAGE,

            projectile_ttl: PROJECTILE_TTL,
            projectile_mass: PROJECTILE_MASS,
            projectile_radius: PROJECTILE_RADIUS,
            settle_delay: SETTLE_DELAY,

            min_power: 5.0,
            max_power: 35.0,
            min_pitch: 0.0,
            max_pitch: 1.4,
            max_yaw: 1.2,
            aim_speed: 1.0,
            power_speed: 12.0,

            trajectory_samples: 60,
            trajectory_step: 0.05,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning file and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would break the simulation
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("damage_multiplier", self.damage_multiplier)?;
        non_negative("damage_threshold", self.damage_threshold)?;
        positive("target_hit_radius", self.target_hit_radius)?;
        positive("target_hit_damage", self.target_hit_damage)?;
        positive("projectile_ttl", self.projectile_ttl)?;
        positive("projectile_mass", self.projectile_mass)?;
        positive("projectile_radius", self.projectile_radius)?;
        non_negative("settle_delay", self.settle_delay)?;
        positive("min_power", self.min_power)?;
        positive("trajectory_step", self.trajectory_step)?;

        if self.max_power < self.min_power {
            return Err(ConfigError::OutOfRange {
                name: "max_power",
                value: self.max_power,
                range: "[min_power, ∞)",
            });
        }
        if self.max_pitch < self.min_pitch {
            return Err(ConfigError::OutOfRange {
                name: "max_pitch",
                value: self.max_pitch,
                range: "[min_pitch, ∞)",
            });
        }
        if self.trajectory_samples < 2 {
            return Err(ConfigError::OutOfRange {
                name: "trajectory_samples",
                value: self.trajectory_samples as f32,
                range: "[2, ∞)",
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            range: "(0, ∞)",
        })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            range: "[0, ∞)",
        })
    }
}
