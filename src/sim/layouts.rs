//! Hand-authored level layouts
//!
//! The catapult sits at the origin facing +X; structures stand between
//! x = 18 and x = 36. Positions are ground contact points: `base.y` is the
//! height the piece rests on, not its center.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::building::{Archetype, BuildingCategory, BuildingMaterial};
use super::target::TargetKind;

/// Number of levels with a fixed layout; later levels are generated
pub const AUTHORED_LEVELS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingPlacement {
    pub category: BuildingCategory,
    pub base: Vec3,
    pub yaw: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetPlacement {
    pub kind: TargetKind,
    pub base: Vec3,
}

/// Everything needed to populate one level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelPlan {
    pub ammo: u32,
    pub buildings: Vec<BuildingPlacement>,
    pub targets: Vec<TargetPlacement>,
}

impl LevelPlan {
    fn with_ammo(ammo: u32) -> Self {
        Self {
            ammo,
            ..Default::default()
        }
    }

    fn building(mut self, material: BuildingMaterial, archetype: Archetype, base: [f32; 3], yaw: f32) -> Self {
        self.buildings.push(BuildingPlacement {
            category: BuildingCategory::new(material, archetype),
            base: Vec3::from_array(base),
            yaw,
        });
        self
    }

    fn target(mut self, kind: TargetKind, base: [f32; 3]) -> Self {
        self.targets.push(TargetPlacement {
            kind,
            base: Vec3::from_array(base),
        });
        self
    }
}

use Archetype::*;
use BuildingMaterial::*;

/// Fixed layout for levels 1..=AUTHORED_LEVELS
pub fn authored(index: u32) -> Option<LevelPlan> {
    let plan = match index {
        // Two soldiers behind a wooden screen
        1 => LevelPlan::with_ammo(5)
            .building(Wood, Wall, [20.0, 0.0, 0.0], 0.0)
            .building(Wood, Block, [22.0, 0.0, -2.0], 0.0)
            .building(Wood, Block, [22.0, 0.0, 2.0], 0.0)
            .target(TargetKind::Basic, [24.0, 0.0, -1.0])
            .target(TargetKind::Soldier, [24.0, 0.0, 1.5]),

        // Archer on a platform, plank bridge to a side post
        2 => LevelPlan::with_ammo(5)
            .building(Wood, Platform, [24.0, 0.0, 0.0], 0.0)
            .building(Wood, Block, [21.0, 0.0, -2.0], 0.0)
            .building(Wood, Block, [21.0, 0.0, 2.0], 0.0)
            .building(Wood, Plank, [21.0, 1.0, 0.0], FRAC_PI_2)
            .target(TargetKind::Archer, [24.0, 0.5, 0.0])
            .target(TargetKind::Soldier, [27.0, 0.0, 2.0])
            .target(TargetKind::Basic, [27.0, 0.0, -2.0]),

        // Stone walls with a knight in the yard
        3 => LevelPlan::with_ammo(6)
            .building(Stone, Wall, [22.0, 0.0, 0.0], 0.0)
            .building(Wood, Wall, [30.0, 0.0, 0.0], 0.0)
            .building(Stone, Block, [26.0, 0.0, -3.0], 0.0)
            .building(Stone, Block, [26.0, 1.0, -3.0], 0.0)
            .target(TargetKind::Knight, [26.0, 0.0, 0.0])
            .target(TargetKind::Soldier, [32.0, 0.0, 1.0])
            .target(TargetKind::Archer, [26.0, 2.0, -3.0]),

        // Watchtowers flanking the king
        4 => LevelPlan::with_ammo(6)
            .building(Stone, Tower, [25.0, 0.0, -5.0], 0.0)
            .building(Stone, Tower, [25.0, 0.0, 5.0], 0.0)
            .building(Wood, Wall, [23.0, 0.0, 0.0], 0.0)
            .building(Stone, Platform, [28.0, 0.0, 0.0], 0.0)
            .target(TargetKind::Archer, [25.0, 5.0, -5.0])
            .target(TargetKind::Archer, [25.0, 5.0, 5.0])
            .target(TargetKind::King, [28.0, 0.5, 0.0])
            .target(TargetKind::Knight, [30.0, 0.0, 2.0]),

        // The keep, behind an iron gate
        5 => LevelPlan::with_ammo(7)
            .building(Iron, Wall, [20.0, 0.0, 0.0], 0.0)
            .building(Stone, Castle, [30.0, 0.0, 0.0], 0.0)
            .building(Wood, Tower, [26.0, 0.0, -6.0], 0.0)
            .building(Wood, Tower, [26.0, 0.0, 6.0], 0.0)
            .building(Stone, Wall, [24.0, 0.0, -3.5], FRAC_PI_2)
            .target(TargetKind::King, [30.0, 4.0, 0.0])
            .target(TargetKind::Knight, [34.0, 0.0, 3.0])
            .target(TargetKind::Knight, [34.0, 0.0, -3.0])
            .target(TargetKind::Archer, [26.0, 5.0, -6.0])
            .target(TargetKind::Archer, [26.0, 5.0, 6.0]),

        _ => return None,
    };
    Some(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authored_range() {
        assert!(authored(0).is_none());
        for index in 1..=AUTHORED_LEVELS {
            let plan = authored(index).unwrap();
            assert!(plan.ammo > 0);
            assert!(!plan.targets.is_empty());
            assert!(!plan.buildings.is_empty());
        }
        assert!(authored(AUTHORED_LEVELS + 1).is_none());
    }

    #[test]
    fn test_layouts_stay_in_front_of_catapult() {
        for index in 1..=AUTHORED_LEVELS {
            let plan = authored(index).unwrap();
            let bases = plan
                .buildings
                .iter()
                .map(|b| b.base)
                .chain(plan.targets.iter().map(|t| t.base));
            for base in bases {
                assert!((18.0..=36.0).contains(&base.x), "level {index}: {base}");
                assert!(base.y >= 0.0);
            }
        }
    }
}
