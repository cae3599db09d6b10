//! The player's catapult: aim, power, ammo, launch kinematics

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::trajectory::{Trajectory, TrajectoryConfig, predict};
use crate::direction_from_angles;
use crate::tuning::Tuning;

/// Distance from the catapult base to the release point
const ARM_LENGTH: f32 = 1.5;
/// Height of the pivot above the base
const PIVOT_HEIGHT: f32 = 1.0;

/// Continuous aim input for one tick (-1..=1 per axis)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AimInput {
    pub yaw: f32,
    pub pitch: f32,
    pub power: f32,
}

/// Catapult state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catapult {
    pub position: Vec3,
    /// Radians around +Y; 0 faces +X
    pub yaw: f32,
    /// Elevation above the horizon (radians)
    pub pitch: f32,
    /// Launch speed (m/s)
    pub power: f32,
    pub ammo: u32,
    min_power: f32,
    max_power: f32,
    min_pitch: f32,
    max_pitch: f32,
    max_yaw: f32,
    aim_speed: f32,
    power_speed: f32,
}

impl Catapult {
    pub fn new(position: Vec3, tuning: &Tuning) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.6,
            power: (tuning.min_power + tuning.max_power) * 0.5,
            ammo: 0,
            min_power: tuning.min_power,
            max_power: tuning.max_power,
            min_pitch: tuning.min_pitch,
            max_pitch: tuning.max_pitch,
            max_yaw: tuning.max_yaw,
            aim_speed: tuning.aim_speed,
            power_speed: tuning.power_speed,
        }
    }

    /// Set aim directly (clamped)
    pub fn aim(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw.clamp(-self.max_yaw, self.max_yaw);
        self.pitch = pitch.clamp(self.min_pitch, self.max_pitch);
    }

    pub fn set_power(&mut self, power: f32) {
        self.power = power.clamp(self.min_power, self.max_power);
    }

    /// Apply held-key input for `dt` seconds
    pub fn adjust(&mut self, input: AimInput, dt: f32) {
        let yaw = self.yaw + input.yaw.clamp(-1.0, 1.0) * self.aim_speed * dt;
        let pitch = self.pitch + input.pitch.clamp(-1.0, 1.0) * self.aim_speed * dt;
        self.aim(yaw, pitch);
        self.set_power(self.power + input.power.clamp(-1.0, 1.0) * self.power_speed * dt);
    }

    pub fn direction(&self) -> Vec3 {
        direction_from_angles(self.yaw, self.pitch)
    }

    /// Where the projectile is released
    pub fn launch_position(&self) -> Vec3 {
        self.position + Vec3::Y * PIVOT_HEIGHT + self.direction() * ARM_LENGTH
    }

    pub fn launch_velocity(&self) -> Vec3 {
        self.direction() * self.power
    }

    pub fn reload(&mut self, ammo: u32) {
        self.ammo = ammo;
    }

    pub fn has_ammo(&self) -> bool {
        self.ammo > 0
    }

    /// Consume one shot; `None` when out of ammo
    pub fn take_shot(&mut self) -> Option<(Vec3, Vec3)> {
        if self.ammo == 0 {
            return None;
        }
        self.ammo -= 1;
        Some((self.launch_position(), self.launch_velocity()))
    }

    /// Preview of the current aim; pass the world's gravity
    pub fn preview(&self, gravity: f32, config: TrajectoryConfig) -> Trajectory {
        predict(self.launch_position(), self.launch_velocity(), gravity, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::GRAVITY;

    #[test]
    fn test_aim_and_power_are_clamped() {
        let tuning = Tuning::default();
        let mut catapult = Catapult::new(Vec3::ZERO, &tuning);
        catapult.aim(10.0, -1.0);
        assert_eq!(catapult.yaw, tuning.max_yaw);
        assert_eq!(catapult.pitch, tuning.min_pitch);
        catapult.set_power(1000.0);
        assert_eq!(catapult.power, tuning.max_power);

        catapult.adjust(
            AimInput {
                power: -1.0,
                ..Default::default()
            },
            100.0,
        );
        assert_eq!(catapult.power, tuning.min_power);
    }

    #[test]
    fn test_ammo() {
        let mut catapult = Catapult::new(Vec3::ZERO, &Tuning::default());
        assert!(catapult.take_shot().is_none());
        catapult.reload(2);
        let (pos, vel) = catapult.take_shot().unwrap();
        assert!(pos.y > 0.0);
        assert!((vel.length() - catapult.power).abs() < 1e-4);
        assert!(catapult.take_shot().is_some());
        assert!(catapult.take_shot().is_none());
        assert_eq!(catapult.ammo, 0);
    }

    #[test]
    fn test_preview_starts_at_release_point() {
        let catapult = Catapult::new(Vec3::new(2.0, 0.0, 1.0), &Tuning::default());
        let traj = catapult.preview(GRAVITY, TrajectoryConfig::default());
        assert_eq!(traj.points[0], catapult.launch_position());
        assert!(traj.landing.unwrap().x > catapult.position.x);
    }
}
