//! Catapult projectiles
//!
//! Lifetime is explicit state checked every tick: a projectile is spent when
//! its time-to-live runs out, it falls below the floor, it comes to rest, or
//! the session removes it.

use glam::{Quat, Vec3};

use super::entity::SimContext;
use super::shape::Shape;
use super::world::{BodyDesc, BodyHandle, MaterialTag};
use crate::consts::FALL_FLOOR_Y;
use crate::scene::{RenderId, RenderNode};

/// Why a projectile stopped being simulated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpentReason {
    Expired,
    Fell,
    Settled,
    Removed,
}

/// Projectile lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileState {
    Flying,
    Spent(SpentReason),
}

/// A fired shot
#[derive(Debug, Clone)]
pub struct Projectile {
    body: Option<BodyHandle>,
    render: Option<RenderId>,
    /// Seconds left before forced removal
    ttl: f32,
    age: f32,
    state: ProjectileState,
    last_position: Vec3,
}

impl Projectile {
    /// Spawn a zero-damping sphere so flight matches the trajectory preview
    pub fn spawn(
        position: Vec3,
        velocity: Vec3,
        radius: f32,
        mass: f32,
        ttl: f32,
        ctx: &mut SimContext<'_>,
    ) -> Self {
        let shape = Shape::sphere(radius);
        let body = ctx.world.add_body(
            BodyDesc::new(shape, mass, MaterialTag::Projectile)
                .at(position)
                .with_velocity(velocity)
                .with_damping(0.0, 0.1),
        );
        let render = ctx
            .scene
            .add(RenderNode::new("projectile", shape, position, Quat::IDENTITY));
        Self {
            body: Some(body),
            render: Some(render),
            ttl,
            age: 0.0,
            state: ProjectileState::Flying,
            last_position: position,
        }
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn state(&self) -> ProjectileState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ProjectileState::Flying
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn ttl(&self) -> f32 {
        self.ttl
    }

    /// Last known position (kept after the body is gone)
    pub fn position(&self) -> Vec3 {
        self.last_position
    }

    /// Advance lifetime and sync visuals. Returns true while still flying.
    pub fn update(&mut self, dt: f32, ctx: &mut SimContext<'_>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.age += dt;
        self.ttl -= dt;

        let body = self.body.and_then(|b| ctx.world.body(b));
        let Some(body) = body else {
            self.despawn(SpentReason::Removed, ctx);
            return false;
        };
        let (position, orientation, sleeping) = (body.position, body.orientation, body.is_sleeping());
        self.last_position = position;
        if let Some(render) = self.render {
            ctx.scene.set_transform(render, position, orientation);
        }

        let reason = if self.ttl <= 0.0 {
            Some(SpentReason::Expired)
        } else if position.y < FALL_FLOOR_Y {
            Some(SpentReason::Fell)
        } else if sleeping {
            Some(SpentReason::Settled)
        } else {
            None
        };
        match reason {
            Some(reason) => {
                self.despawn(reason, ctx);
                false
            }
            None => true,
        }
    }

    /// Release body and renderable. Idempotent.
    pub fn despawn(&mut self, reason: SpentReason, ctx: &mut SimContext<'_>) {
        if let Some(render) = self.render.take() {
            ctx.scene.remove(render);
        }
        if let Some(body) = self.body.take() {
            ctx.world.remove_body(body);
        }
        if self.state == ProjectileState::Flying {
            log::debug!("projectile spent after {:.2}s: {:?}", self.age, reason);
            self.state = ProjectileState::Spent(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PHYSICS_DT;
    use crate::scene::RecordingScene;
    use crate::sim::World;

    #[test]
    fn test_ttl_expiry_releases_resources() {
        let mut world = World::default();
        let mut scene = RecordingScene::new();
        let mut ctx = SimContext::new(&mut world, &mut scene);
        let mut shot = Projectile::spawn(
            Vec3::new(0.0, 50.0, 0.0),
            Vec3::new(5.0, 0.0, 0.0),
            0.4,
            5.0,
            0.5,
            &mut ctx,
        );

        let mut ticks = 0;
        while shot.update(PHYSICS_DT, &mut ctx) {
            ctx.world.step(PHYSICS_DT);
            ticks += 1;
            assert!(ticks < 100);
        }
        assert_eq!(shot.state(), ProjectileState::Spent(SpentReason::Expired));
        assert!(shot.body().is_none());
        assert_eq!(world.body_count(), 0);
        assert_eq!(scene.live_count(), 0);
    }

    #[test]
    fn test_fall_below_floor() {
        let mut world = World::default();
        let mut scene = RecordingScene::new();
        let mut ctx = SimContext::new(&mut world, &mut scene);
        let mut shot = Projectile::spawn(
            Vec3::new(0.0, FALL_FLOOR_Y - 0.5, 0.0),
            Vec3::ZERO,
            0.4,
            5.0,
            10.0,
            &mut ctx,
        );
        assert!(!shot.update(PHYSICS_DT, &mut ctx));
        assert_eq!(shot.state(), ProjectileState::Spent(SpentReason::Fell));
    }

    #[test]
    fn test_forced_removal_is_idempotent() {
        let mut world = World::default();
        let mut scene = RecordingScene::new();
        let mut ctx = SimContext::new(&mut world, &mut scene);
        let mut shot = Projectile::spawn(Vec3::Y, Vec3::X, 0.4, 5.0, 10.0, &mut ctx);
        shot.despawn(SpentReason::Removed, &mut ctx);
        shot.despawn(SpentReason::Expired, &mut ctx);
        assert_eq!(shot.state(), ProjectileState::Spent(SpentReason::Removed));
        assert!(!shot.update(PHYSICS_DT, &mut ctx));
        assert_eq!(scene.removed_count(), 1);
    }
}
