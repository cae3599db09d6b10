//! Collision shapes and their colliders

use glam::Vec3;
use rapier3d::prelude::{nalgebra, ColliderBuilder};
use serde::{Deserialize, Serialize};

/// Half extent of the ground slab along X and Z
const GROUND_HALF_EXTENT: f32 = 500.0;
/// Half thickness of the ground slab; its top face sits at the body position
const GROUND_HALF_THICKNESS: f32 = 1.0;

/// Collision geometry attached to a rigid body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Sphere { radius: f32 },
    /// Box given by half extents along its local axes
    Cuboid { half_extents: Vec3 },
    /// Ground surface through the body position, normal +Y
    Plane,
}

impl Shape {
    pub fn sphere(radius: f32) -> Self {
        Shape::Sphere { radius }
    }

    /// Box from full width/height/depth
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Shape::Cuboid {
            half_extents: Vec3::new(width, height, depth) * 0.5,
        }
    }

    pub fn volume(&self) -> f32 {
        match *self {
            Shape::Sphere { radius } => 4.0 / 3.0 * std::f32::consts::PI * radius.powi(3),
            Shape::Cuboid { half_extents } => 8.0 * half_extents.x * half_extents.y * half_extents.z,
            Shape::Plane => f32::INFINITY,
        }
    }

    /// Lowest point of the shape relative to its center (used for resting placement)
    pub fn bottom_offset(&self) -> f32 {
        match *self {
            Shape::Sphere { radius } => radius,
            Shape::Cuboid { half_extents } => half_extents.y,
            Shape::Plane => 0.0,
        }
    }

    /// Collider geometry. The plane becomes a wide slab hanging below its
    /// body so fast shots cannot tunnel through a zero-thickness surface.
    pub(crate) fn collider(&self) -> ColliderBuilder {
        match *self {
            Shape::Sphere { radius } => ColliderBuilder::ball(radius),
            Shape::Cuboid { half_extents: h } => ColliderBuilder::cuboid(h.x, h.y, h.z),
            Shape::Plane => ColliderBuilder::cuboid(
                GROUND_HALF_EXTENT,
                GROUND_HALF_THICKNESS,
                GROUND_HALF_EXTENT,
            )
            .translation(rapier3d::prelude::vector![0.0, -GROUND_HALF_THICKNESS, 0.0]),
        }
    }
}
