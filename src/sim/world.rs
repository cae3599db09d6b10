//! Rigid-body world
//!
//! A thin layer over a rapier3d pipeline. It keeps the game's view of
//! physics small: bodies tagged with a [`MaterialTag`], an unordered
//! contact-material table, and a list of subscribers told once when a
//! projectile starts touching an object.
//!
//! Handles are rapier's generational handles, so a handle whose body has
//! been removed simply stops resolving (reads return `None`, writes are
//! ignored). Resting contacts survive sleep: a pair that stays in contact
//! while its bodies sleep and wake is still the same contact episode.

use std::cmp::Ordering;
use std::collections::HashMap;

use glam::{Quat, Vec3};
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use super::shape::Shape;
use crate::consts::{MAX_SUBSTEPS, PHYSICS_DT};

/// Material tag used to look up contact properties and classify collisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialTag {
    Ground,
    Object,
    Projectile,
}

impl MaterialTag {
    /// Stored in collider user data
    fn bits(self) -> u128 {
        match self {
            MaterialTag::Ground => 1,
            MaterialTag::Object => 2,
            MaterialTag::Projectile => 3,
        }
    }

    fn from_bits(bits: u128) -> Option<Self> {
        match bits {
            1 => Some(MaterialTag::Ground),
            2 => Some(MaterialTag::Object),
            3 => Some(MaterialTag::Projectile),
            _ => None,
        }
    }
}

/// Friction and restitution for a pair of materials
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactMaterial {
    pub friction: f32,
    pub restitution: f32,
}

impl ContactMaterial {
    /// Coulomb friction and bounce coefficient
    pub const fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
        }
    }
}

/// Contact rules keyed by unordered material pair
#[derive(Debug, Clone)]
pub struct ContactMaterialTable {
    rules: Vec<(MaterialTag, MaterialTag, ContactMaterial)>,
    fallback: ContactMaterial,
}

impl Default for ContactMaterialTable {
    fn default() -> Self {
        use MaterialTag::*;
        let mut table = Self {
            rules: Vec::new(),
            fallback: ContactMaterial::new(0.3, 0.0),
        };
        table.define(Ground, Object, ContactMaterial::new(0.6, 0.1));
        table.define(Ground, Projectile, ContactMaterial::new(0.4, 0.3));
        table.define(Object, Object, ContactMaterial::new(0.5, 0.1));
        table.define(Object, Projectile, ContactMaterial::new(0.3, 0.2));
        table.define(Projectile, Projectile, ContactMaterial::new(0.3, 0.3));
        table
    }
}

impl ContactMaterialTable {
    /// Define (or redefine) the rule for an unordered pair
    pub fn define(&mut self, a: MaterialTag, b: MaterialTag, material: ContactMaterial) {
        if let Some(rule) = self
            .rules
            .iter_mut()
            .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
        {
            rule.2 = material;
        } else {
            self.rules.push((a, b, material));
        }
    }

    /// Rule for a pair in either order, or the fallback material
    pub fn lookup(&self, a: MaterialTag, b: MaterialTag) -> ContactMaterial {
        self.rules
            .iter()
            .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
            .map(|(_, _, m)| *m)
            .unwrap_or(self.fallback)
    }
}

/// Applies the pair table to every solver contact rapier generates
struct MaterialHooks<'a> {
    table: &'a ContactMaterialTable,
}

impl PhysicsHooks for MaterialHooks<'_> {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let tag = |handle| {
            context
                .colliders
                .get(handle)
                .and_then(|c| MaterialTag::from_bits(c.user_data))
        };
        let (Some(a), Some(b)) = (tag(context.collider1), tag(context.collider2)) else {
            return;
        };
        let material = self.table.lookup(a, b);
        for contact in context.solver_contacts.iter_mut() {
            contact.friction = material.friction;
            contact.restitution = material.restitution;
        }
    }
}

/// Stable reference to a body in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

impl BodyHandle {
    /// Arena slot; reused after removal with a new generation
    pub fn index(&self) -> u32 {
        self.0.into_raw_parts().0
    }

    fn raw(&self) -> (u32, u32) {
        self.0.into_raw_parts()
    }
}

impl PartialOrd for BodyHandle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BodyHandle {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw().cmp(&other.raw())
    }
}

/// Construction parameters for a body
#[derive(Debug, Clone, Copy)]
pub struct BodyDesc {
    pub shape: Shape,
    /// 0 means static
    pub mass: f32,
    pub material: MaterialTag,
    pub position: Vec3,
    pub orientation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl BodyDesc {
    /// Body at the origin, at rest, with light damping. Negative mass clamps to static.
    pub fn new(shape: Shape, mass: f32, material: MaterialTag) -> Self {
        Self {
            shape,
            mass: mass.max(0.0),
            material,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            linear_damping: 0.01,
            angular_damping: 0.01,
        }
    }

    /// Center position
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Initial orientation (normalized on insert)
    pub fn rotated(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    /// Initial linear velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Linear and angular damping coefficients
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    fn is_static(&self) -> bool {
        self.mass <= 0.0 || self.shape == Shape::Plane
    }
}

/// What the game remembers about a body beyond rapier's state
#[derive(Debug, Clone, Copy)]
struct BodyMeta {
    shape: Shape,
    material: MaterialTag,
    mass: f32,
}

/// Snapshot of one body, read after the last step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec3,
    pub orientation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub shape: Shape,
    pub material: MaterialTag,
    mass: f32,
    fixed: bool,
    sleeping: bool,
}

impl BodyState {
    /// Mass given at creation (0 for static bodies)
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Fixed in place (zero mass or ground)
    pub fn is_static(&self) -> bool {
        self.fixed
    }

    /// Deactivated by the island manager until something wakes it
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }
}

/// Contact-begin notification between a projectile and an object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// The projectile-tagged side
    pub projectile: BodyHandle,
    /// The object-tagged side
    pub object: BodyHandle,
    /// |v_a - v_b| just before the contact began
    pub relative_speed: f32,
    /// projectile mass × relative speed (damage proxy, not a true force)
    pub impact_force: f32,
}

/// Subscriber invoked synchronously inside [`World::step`]
pub type CollisionCallback = Box<dyn FnMut(&CollisionEvent)>;

/// Identifies a registered collision callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u32);

/// The physics simulation
pub struct World {
    gravity: f32,
    pipeline: PhysicsPipeline,
    integration: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    meta: HashMap<RigidBodyHandle, BodyMeta>,
    materials: ContactMaterialTable,
    callbacks: Vec<(CallbackId, CollisionCallback)>,
    next_callback_id: u32,
    ground: Option<BodyHandle>,
    accumulator: f32,
    substeps_total: u64,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("gravity", &self.gravity)
            .field("bodies", &self.body_count())
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(crate::consts::GRAVITY)
    }
}

impl World {
    /// Create a world with downward gravity of the given magnitude
    pub fn new(gravity: f32) -> Self {
        Self::with_materials(gravity, ContactMaterialTable::default())
    }

    /// Create a world with a custom contact-material table
    pub fn with_materials(gravity: f32, materials: ContactMaterialTable) -> Self {
        let mut integration = IntegrationParameters::default();
        integration.dt = PHYSICS_DT;
        Self {
            gravity: gravity.abs(),
            pipeline: PhysicsPipeline::new(),
            integration,
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            meta: HashMap::new(),
            materials,
            callbacks: Vec::new(),
            next_callback_id: 1,
            ground: None,
            accumulator: 0.0,
            substeps_total: 0,
        }
    }

    /// Gravity magnitude (positive)
    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    /// Gravity as an acceleration vector (pointing down)
    pub fn gravity_vector(&self) -> Vec3 {
        Vec3::new(0.0, -self.gravity, 0.0)
    }

    /// Pair rules in effect for every contact
    pub fn materials(&self) -> &ContactMaterialTable {
        &self.materials
    }

    /// Substeps executed since creation
    pub fn substeps_total(&self) -> u64 {
        self.substeps_total
    }

    // === Bodies ===

    /// Insert a body with one collider. Zero mass (or a plane) makes it static;
    /// projectiles get continuous collision detection and contact events.
    pub fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let fixed = desc.is_static();
        let builder = if fixed {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
                .linvel(to_vector(desc.velocity))
                .angvel(to_vector(desc.angular_velocity))
                .linear_damping(desc.linear_damping.max(0.0))
                .angular_damping(desc.angular_damping.max(0.0))
                .ccd_enabled(desc.material == MaterialTag::Projectile)
        };
        let rotation = desc.orientation.normalize().to_scaled_axis();
        let body = builder
            .translation(to_vector(desc.position))
            .rotation(to_vector(rotation))
            .build();
        let handle = self.bodies.insert(body);

        let own = self.materials.lookup(desc.material, desc.material);
        let mut collider = desc
            .shape
            .collider()
            .friction(own.friction)
            .restitution(own.restitution)
            .user_data(desc.material.bits())
            .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS);
        if !fixed {
            collider = collider.mass(desc.mass);
        }
        if desc.material == MaterialTag::Projectile {
            collider = collider.active_events(ActiveEvents::COLLISION_EVENTS);
        }
        self.colliders
            .insert_with_parent(collider.build(), handle, &mut self.bodies);

        self.meta.insert(
            handle,
            BodyMeta {
                shape: desc.shape,
                material: desc.material,
                mass: if fixed { 0.0 } else { desc.mass },
            },
        );
        BodyHandle(handle)
    }

    /// Remove a body and its collider. Stale or repeated removals return false.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        let removed = self
            .bodies
            .remove(
                handle.0,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some();
        if removed {
            self.meta.remove(&handle.0);
            if self.ground == Some(handle) {
                self.ground = None;
            }
        }
        removed
    }

    /// True while the handle still names a live body
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    /// Snapshot of a live body
    pub fn body(&self, handle: BodyHandle) -> Option<BodyState> {
        let body = self.bodies.get(handle.0)?;
        let meta = self.meta.get(&handle.0)?;
        Some(snapshot(body, meta))
    }

    /// Live bodies, ground included
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Live bodies in arena order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, BodyState)> + '_ {
        self.bodies.iter().filter_map(|(handle, body)| {
            self.meta
                .get(&handle)
                .map(|meta| (BodyHandle(handle), snapshot(body, meta)))
        })
    }

    /// Center of mass position
    pub fn position(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(handle.0).map(|b| to_vec3(b.translation()))
    }

    /// Position and orientation, for syncing renderables
    pub fn transform(&self, handle: BodyHandle) -> Option<(Vec3, Quat)> {
        self.bodies
            .get(handle.0)
            .map(|b| (to_vec3(b.translation()), to_quat(b.rotation())))
    }

    /// Linear velocity
    pub fn velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(handle.0).map(|b| to_vec3(b.linvel()))
    }

    /// Overwrite linear velocity and wake the body. Static bodies ignore it.
    pub fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle.0).filter(|b| b.is_dynamic()) {
            body.set_linvel(to_vector(velocity), true);
        }
    }

    /// Teleport a body and wake it
    pub fn set_position(&mut self, handle: BodyHandle, position: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            body.set_translation(to_vector(position), true);
        }
    }

    /// Apply an impulse at the center of mass. Always wakes a dynamic body,
    /// even for a zero impulse.
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle.0).filter(|b| b.is_dynamic()) {
            body.wake_up(true);
            body.apply_impulse(to_vector(impulse), true);
        }
    }

    /// Install the static ground plane (only one; repeated calls return it)
    pub fn create_ground_body(&mut self) -> BodyHandle {
        if let Some(ground) = self.ground.filter(|g| self.contains(*g)) {
            return ground;
        }
        let handle = self.add_body(BodyDesc::new(Shape::Plane, 0.0, MaterialTag::Ground));
        self.ground = Some(handle);
        handle
    }

    /// The ground body, once created
    pub fn ground(&self) -> Option<BodyHandle> {
        self.ground
    }

    // === Collision subscribers ===

    /// Add a subscriber; subscribers run in registration order
    pub fn register_collision_callback(&mut self, callback: CollisionCallback) -> CallbackId {
        let id = CallbackId(self.next_callback_id);
        self.next_callback_id += 1;
        self.callbacks.push((id, callback));
        id
    }

    /// Drop every subscriber
    pub fn clear_collision_callbacks(&mut self) {
        self.callbacks.clear();
    }

    /// Registered subscribers
    pub fn collision_callback_count(&self) -> usize {
        self.callbacks.len()
    }

    // === Stepping ===

    /// Advance by up to `dt` seconds in fixed substeps (at most [`MAX_SUBSTEPS`]).
    /// Returns the number of substeps taken. Time beyond the cap is dropped.
    pub fn step(&mut self, dt: f32) -> u32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= PHYSICS_DT && substeps < MAX_SUBSTEPS {
            self.substep();
            self.accumulator -= PHYSICS_DT;
            substeps += 1;
        }
        if self.accumulator >= PHYSICS_DT {
            self.accumulator %= PHYSICS_DT;
        }
        substeps
    }

    /// One fixed rapier step, then contact-begin fan-out
    fn substep(&mut self) {
        self.substeps_total += 1;

        // Contact begins are judged on the velocities the bodies arrived with
        let approach: HashMap<RigidBodyHandle, Vec3> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.is_dynamic())
            .map(|(handle, body)| (handle, to_vec3(body.linvel())))
            .collect();

        let (collision_send, collision_recv) = rapier3d::crossbeam::channel::unbounded();
        let (force_send, _force_recv) = rapier3d::crossbeam::channel::unbounded();
        let collector = ChannelEventCollector::new(collision_send, force_send);
        let hooks = MaterialHooks {
            table: &self.materials,
        };
        let gravity = vector![0.0, -self.gravity, 0.0];

        self.pipeline.step(
            &gravity,
            &self.integration,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &hooks,
            &collector,
        );

        let mut events = Vec::new();
        while let Ok(event) = collision_recv.try_recv() {
            if let rapier3d::prelude::CollisionEvent::Started(c1, c2, _) = event {
                events.extend(self.contact_begin(c1, c2, &approach));
            }
        }
        // Channel order is not part of the contract; body order is
        events.sort_by_key(|e| (e.projectile, e.object));

        for event in &events {
            for (_, callback) in self.callbacks.iter_mut() {
                callback(event);
            }
        }
    }

    /// Build the notification for a projectile/object pair; None for any other pair
    fn contact_begin(
        &self,
        c1: ColliderHandle,
        c2: ColliderHandle,
        approach: &HashMap<RigidBodyHandle, Vec3>,
    ) -> Option<CollisionEvent> {
        let a = self.colliders.get(c1)?.parent()?;
        let b = self.colliders.get(c2)?.parent()?;
        let (meta_a, meta_b) = (self.meta.get(&a)?, self.meta.get(&b)?);
        let (projectile, object, projectile_mass) = match (meta_a.material, meta_b.material) {
            (MaterialTag::Projectile, MaterialTag::Object) => (a, b, meta_a.mass),
            (MaterialTag::Object, MaterialTag::Projectile) => (b, a, meta_b.mass),
            _ => return None,
        };
        let velocity = |h| approach.get(&h).copied().unwrap_or(Vec3::ZERO);
        let relative_speed = (velocity(a) - velocity(b)).length();
        Some(CollisionEvent {
            body_a: BodyHandle(a),
            body_b: BodyHandle(b),
            projectile: BodyHandle(projectile),
            object: BodyHandle(object),
            relative_speed,
            impact_force: projectile_mass * relative_speed,
        })
    }
}

fn snapshot(body: &RigidBody, meta: &BodyMeta) -> BodyState {
    BodyState {
        position: to_vec3(body.translation()),
        orientation: to_quat(body.rotation()),
        velocity: to_vec3(body.linvel()),
        angular_velocity: to_vec3(body.angvel()),
        shape: meta.shape,
        material: meta.material,
        mass: meta.mass,
        fixed: body.is_fixed(),
        sleeping: body.is_sleeping(),
    }
}

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn to_quat(r: &Rotation<Real>) -> Quat {
    Quat::from_xyzw(r.i, r.j, r.k, r.w)
}
