//! Procedural layouts for levels past the authored set
//!
//! Everything is drawn from the level's [`SeededRng`]; same seed, same plan.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

use super::building::{Archetype, BuildingCategory, BuildingMaterial};
use super::layouts::{AUTHORED_LEVELS, BuildingPlacement, LevelPlan, TargetPlacement};
use super::rng::SeededRng;
use super::target::TargetKind;

/// Placement grid: 3 rows of depth × 4 lanes, 5 m apart so the largest
/// footprint (castle, 5×5) never overlaps a neighbor
const ROWS_X: [f32; 3] = [21.0, 26.0, 31.0];
const LANES_Z: [f32; 4] = [-7.5, -2.5, 2.5, 7.5];

const MAX_STRUCTURES: usize = 7;
const MAX_TARGETS: usize = 6;

/// How hard a generated level is (0 for the first generated level)
pub fn difficulty(index: u32) -> u32 {
    index.saturating_sub(AUTHORED_LEVELS + 1)
}

fn pick_archetype(rng: &mut SeededRng, difficulty: u32, castle_used: bool) -> Archetype {
    let mut pool = vec![Archetype::Block, Archetype::Wall, Archetype::Platform];
    if difficulty >= 1 {
        pool.push(Archetype::Tower);
    }
    if difficulty >= 3 && !castle_used {
        pool.push(Archetype::Castle);
    }
    rng.pick(&pool).copied().unwrap_or(Archetype::Block)
}

fn pick_material(rng: &mut SeededRng, difficulty: u32) -> BuildingMaterial {
    let stone_chance = (0.3 + difficulty as f32 * 0.08).min(0.8);
    if rng.chance(stone_chance) {
        BuildingMaterial::Stone
    } else {
        BuildingMaterial::Wood
    }
}

fn pick_target(rng: &mut SeededRng, difficulty: u32) -> TargetKind {
    let roll = rng.next_f32() + difficulty as f32 * 0.05;
    match roll {
        r if r > 1.1 => TargetKind::King,
        r if r > 0.85 => TargetKind::Knight,
        r if r > 0.6 => TargetKind::Archer,
        r if r > 0.3 => TargetKind::Soldier,
        _ => TargetKind::Basic,
    }
}

/// Targets can stand on top of these
fn has_flat_top(archetype: Archetype) -> bool {
    matches!(
        archetype,
        Archetype::Block | Archetype::Platform | Archetype::Tower | Archetype::Castle
    )
}

/// Build the plan for a generated level
pub fn generate(index: u32, rng: &mut SeededRng) -> LevelPlan {
    let difficulty = difficulty(index);
    let structure_count = (3 + difficulty as usize / 2).min(MAX_STRUCTURES);
    let target_count = (2 + difficulty as usize / 3).min(MAX_TARGETS);

    let mut slots: Vec<Vec3> = ROWS_X
        .iter()
        .flat_map(|&x| LANES_Z.iter().map(move |&z| Vec3::new(x, 0.0, z)))
        .collect();
    // Fisher-Yates with the level stream
    for i in (1..slots.len()).rev() {
        let j = rng.int_range(0, i as i32) as usize;
        slots.swap(i, j);
    }

    let mut plan = LevelPlan::default();
    let mut tops: Vec<Vec3> = Vec::new();
    let mut castle_used = false;

    // Optional indestructible screen in front of the first row
    if difficulty >= 2 && rng.chance(0.4) {
        let z = rng.range(-4.0, 4.0);
        plan.buildings.push(BuildingPlacement {
            category: BuildingCategory::new(BuildingMaterial::Iron, Archetype::Wall),
            base: Vec3::new(17.5, 0.0, z),
            yaw: 0.0,
        });
    }

    for _ in 0..structure_count {
        let Some(slot) = slots.pop() else {
            break;
        };
        let archetype = pick_archetype(rng, difficulty, castle_used);
        castle_used |= archetype == Archetype::Castle;
        let category = BuildingCategory::new(pick_material(rng, difficulty), archetype);
        let yaw = if archetype == Archetype::Plank || rng.chance(0.25) {
            FRAC_PI_2
        } else {
            0.0
        };
        plan.buildings.push(BuildingPlacement {
            category,
            base: slot,
            yaw,
        });
        if has_flat_top(archetype) {
            tops.push(slot + Vec3::Y * archetype.size().y);
        }
    }

    for _ in 0..target_count {
        let kind = pick_target(rng, difficulty);
        let base = if !tops.is_empty() && rng.chance(0.5) {
            let i = rng.int_range(0, tops.len() as i32 - 1) as usize;
            tops.swap_remove(i)
        } else if let Some(slot) = slots.pop() {
            slot
        } else if let Some(top) = tops.pop() {
            top
        } else {
            break;
        };
        plan.targets.push(TargetPlacement { kind, base });
    }

    let spare = 3u32.saturating_sub(difficulty / 4).max(1);
    plan.ammo = plan.targets.len() as u32 + spare;
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::level_seed;
    use proptest::prelude::*;

    #[test]
    fn test_first_generated_level() {
        let index = AUTHORED_LEVELS + 1;
        let plan = generate(index, &mut SeededRng::new(level_seed(1, index)));
        assert_eq!(plan.buildings.len(), 3);
        assert_eq!(plan.targets.len(), 2);
        assert_eq!(plan.ammo, 5);
    }

    #[test]
    fn test_difficulty_grows_but_stays_bounded() {
        let plan = generate(200, &mut SeededRng::new(9));
        assert!(plan.buildings.len() <= MAX_STRUCTURES + 1);
        assert!(plan.targets.len() <= MAX_TARGETS);
        assert!(plan.ammo > plan.targets.len() as u32);
    }

    proptest! {
        #[test]
        fn prop_generation_is_deterministic(seed in any::<u64>(), index in 6u32..60) {
            let a = generate(index, &mut SeededRng::new(level_seed(seed, index)));
            let b = generate(index, &mut SeededRng::new(level_seed(seed, index)));
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_every_target_has_a_distinct_spot(seed in any::<u64>(), index in 6u32..60) {
            let plan = generate(index, &mut SeededRng::new(seed));
            let targets = &plan.targets;
            prop_assert!(!targets.is_empty());
            for (i, a) in targets.iter().enumerate() {
                for b in &targets[i + 1..] {
                    prop_assert!(a.base.distance(b.base) > 0.5);
                }
            }
        }
    }
}
