//! Shared destructible-entity machinery
//!
//! Health lives in a two-state machine ([`Vitality`]) with one transition
//! function, so "destroyed" can only be entered once no matter how many
//! call sites (damage, fall-through, explicit destroy) race for it.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::world::{BodyHandle, World};
use crate::consts::FALL_FLOOR_Y;
use crate::scene::{RenderId, SceneSink};

/// Mutable collaborators an entity touches when it changes state
pub struct SimContext<'a> {
    pub world: &'a mut World,
    pub scene: &'a mut dyn SceneSink,
}

impl<'a> SimContext<'a> {
    pub fn new(world: &'a mut World, scene: &'a mut dyn SceneSink) -> Self {
        Self { world, scene }
    }
}

/// Life state of a destructible
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Vitality {
    Alive { health: f32 },
    Destroyed,
}

/// Inputs to the vitality machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LifeEvent {
    Damage(f32),
    Destroy,
}

/// Result of feeding a [`LifeEvent`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Nothing changed (indestructible, already destroyed, zero damage)
    Unchanged,
    Damaged { remaining: f32 },
    /// Alive -> Destroyed, reported exactly once
    Destroyed,
}

/// Health pool with an optional indestructible flag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    max: f32,
    vitality: Vitality,
    indestructible: bool,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            max,
            vitality: Vitality::Alive { health: max },
            indestructible: false,
        }
    }

    /// Infinite health, immune to damage
    pub fn indestructible() -> Self {
        Self {
            max: f32::INFINITY,
            vitality: Vitality::Alive {
                health: f32::INFINITY,
            },
            indestructible: true,
        }
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Current health (0 once destroyed)
    pub fn current(&self) -> f32 {
        match self.vitality {
            Vitality::Alive { health } => health,
            Vitality::Destroyed => 0.0,
        }
    }

    pub fn vitality(&self) -> Vitality {
        self.vitality
    }

    pub fn is_destroyed(&self) -> bool {
        self.vitality == Vitality::Destroyed
    }

    pub fn is_indestructible(&self) -> bool {
        self.indestructible
    }

    /// Health as a fraction of max (1.0 for indestructible)
    pub fn fraction(&self) -> f32 {
        if self.indestructible {
            return 1.0;
        }
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.current() / self.max).clamp(0.0, 1.0)
    }

    /// The single transition function
    pub fn apply(&mut self, event: LifeEvent) -> Transition {
        let Vitality::Alive { health } = self.vitality else {
            return Transition::Unchanged;
        };
        match event {
            LifeEvent::Damage(_) if self.indestructible => Transition::Unchanged,
            LifeEvent::Damage(amount) if !(amount > 0.0) => Transition::Unchanged,
            LifeEvent::Damage(amount) => {
                let remaining = health - amount;
                if remaining <= 0.0 {
                    self.vitality = Vitality::Destroyed;
                    Transition::Destroyed
                } else {
                    self.vitality = Vitality::Alive { health: remaining };
                    Transition::Damaged { remaining }
                }
            }
            LifeEvent::Destroy => {
                self.vitality = Vitality::Destroyed;
                Transition::Destroyed
            }
        }
    }
}

/// Body, renderable and health shared by buildings and targets
#[derive(Debug, Clone)]
pub struct EntityCore {
    pub position: Vec3,
    pub orientation: Quat,
    pub health: Health,
    pub score_value: f32,
    body: Option<BodyHandle>,
    render: Option<RenderId>,
}

impl EntityCore {
    pub fn new(
        position: Vec3,
        orientation: Quat,
        health: Health,
        score_value: f32,
        body: BodyHandle,
        render: RenderId,
    ) -> Self {
        Self {
            position,
            orientation,
            health,
            score_value,
            body: Some(body),
            render: Some(render),
        }
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn render(&self) -> Option<RenderId> {
        self.render
    }

    pub fn is_destroyed(&self) -> bool {
        self.health.is_destroyed()
    }

    /// Apply damage; on the lethal hit resources are released here.
    /// Returns true only for the call that destroyed the entity.
    pub fn take_damage(&mut self, amount: f32, ctx: &mut SimContext<'_>) -> bool {
        match self.health.apply(LifeEvent::Damage(amount)) {
            Transition::Destroyed => {
                self.release(ctx);
                true
            }
            _ => false,
        }
    }

    /// Idempotent destroy; returns true on the first (state-changing) call
    pub fn destroy(&mut self, ctx: &mut SimContext<'_>) -> bool {
        // Resources may outlive a transition that happened without a context
        let changed = self.health.apply(LifeEvent::Destroy) == Transition::Destroyed;
        self.release(ctx);
        changed
    }

    fn release(&mut self, ctx: &mut SimContext<'_>) {
        if let Some(render) = self.render.take() {
            ctx.scene.remove(render);
        }
        if let Some(body) = self.body.take() {
            ctx.world.remove_body(body);
        }
    }

    /// Pull the authoritative transform from physics and push it to the scene.
    /// Returns true if the entity fell out of the world (and was destroyed).
    pub fn sync(&mut self, ctx: &mut SimContext<'_>) -> bool {
        if self.is_destroyed() {
            return false;
        }
        let Some((position, orientation)) = self.body.and_then(|b| ctx.world.transform(b)) else {
            return false;
        };
        self.position = position;
        self.orientation = orientation;
        if let Some(render) = self.render {
            ctx.scene.set_transform(render, position, orientation);
        }
        if position.y < FALL_FLOOR_Y {
            return self.destroy(ctx);
        }
        false
    }
}
