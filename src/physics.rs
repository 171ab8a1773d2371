/*
 * Physics Module
 *
 * This module holds a small position-based engine for point masses joined by
 * spring constraints. Bodies are integrated with position Verlet and the
 * constraints are then relaxed a fixed number of times per step.
 *
 * Thread bodies all share a negative collision group, so there is no narrow
 * phase. Collision filters are only consulted when the mouse picks a body.
 *
 * The renderer never touches the world directly; it reads positions through
 * the PositionQuery trait.
 */

use nannou::prelude::*;
use std::time::Duration;

// Default step length of the runner, in milliseconds
pub const BASE_DELTA_MS: f32 = 1000.0 / 60.0;

const GRAVITY_SCALE: f32 = 0.001;
const BODY_DENSITY: f32 = 0.001;
const MIN_LENGTH: f32 = 1e-6;
const CONSTRAINT_ITERATIONS: usize = 2;

/// Opaque reference to a body owned by the [`World`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(usize);

impl BodyHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Opaque reference to a constraint owned by the [`World`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintHandle(usize);

/// Group/category/mask triple deciding which bodies may interact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionFilter {
    pub group: i32,
    pub category: u32,
    pub mask: u32,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            group: 0,
            category: 0x0001,
            mask: u32::MAX,
        }
    }
}

impl CollisionFilter {
    // Shared non-zero groups override category and mask
    pub fn can_collide(&self, other: &CollisionFilter) -> bool {
        if self.group == other.group && self.group != 0 {
            return self.group > 0;
        }

        (self.mask & other.category) != 0 && (other.mask & self.category) != 0
    }
}

// Physical properties used when creating a body
#[derive(Clone, Copy, Debug)]
pub struct BodyOptions {
    pub radius: f32,
    pub friction: f32,
    pub friction_air: f32,
    pub restitution: f32,
    pub collision_filter: CollisionFilter,
}

impl Default for BodyOptions {
    fn default() -> Self {
        Self {
            radius: 5.0,
            friction: 0.1,
            friction_air: 0.01,
            restitution: 0.0,
            collision_filter: CollisionFilter::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Body {
    pub position: Vec2,
    pub position_prev: Vec2,
    pub radius: f32,
    pub friction: f32,
    pub friction_air: f32,
    pub restitution: f32,
    pub collision_filter: CollisionFilter,
    pub inverse_mass: f32,
}

impl Body {
    fn new(position: Vec2, options: &BodyOptions) -> Self {
        let mass = BODY_DENSITY * PI * options.radius * options.radius;

        Self {
            position,
            position_prev: position,
            radius: options.radius,
            friction: options.friction,
            friction_air: options.friction_air,
            restitution: options.restitution,
            collision_filter: options.collision_filter,
            inverse_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.position.distance_squared(point) <= self.radius * self.radius
    }

    // Advance one Verlet step under a constant acceleration
    fn integrate(&mut self, acceleration: Vec2, delta_ms: f32) {
        let air = 1.0 - self.friction_air * (delta_ms / BASE_DELTA_MS);
        let velocity = (self.position - self.position_prev) * air + acceleration * delta_ms * delta_ms;

        self.position_prev = self.position;
        self.position += velocity;
    }
}

/// One end of a constraint: a body, or a fixed point in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Endpoint {
    Body(BodyHandle),
    Point(Vec2),
}

impl Endpoint {
    pub fn body(self) -> Option<BodyHandle> {
        match self {
            Endpoint::Body(handle) => Some(handle),
            Endpoint::Point(_) => None,
        }
    }
}

/// Parameters for [`World::add_constraint`]. A missing length is taken from the
/// distance between the endpoints at creation time.
#[derive(Clone, Copy, Debug)]
pub struct ConstraintOptions {
    pub a: Endpoint,
    pub b: Endpoint,
    pub length: Option<f32>,
    pub stiffness: f32,
    pub damping: f32,
}

impl ConstraintOptions {
    pub fn new(a: Endpoint, b: Endpoint) -> Self {
        Self {
            a,
            b,
            length: None,
            stiffness: 1.0,
            damping: 0.0,
        }
    }

    pub fn length(mut self, length: f32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    pub fn damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Constraint {
    pub a: Endpoint,
    pub b: Endpoint,
    pub length: f32,
    pub stiffness: f32,
    pub damping: f32,
}

// Drags whichever body the cursor grabbed towards the cursor
#[derive(Clone, Debug)]
pub struct MouseConstraint {
    pub position: Vec2,
    pub body: Option<BodyHandle>,
    pub stiffness: f32,
    pub damping: f32,
    pub collision_filter: CollisionFilter,
}

impl Default for MouseConstraint {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            body: None,
            stiffness: 0.05,
            damping: 0.1,
            collision_filter: CollisionFilter::default(),
        }
    }
}

impl MouseConstraint {
    fn as_constraint(&self) -> Option<Constraint> {
        self.body.map(|body| Constraint {
            a: Endpoint::Point(self.position),
            b: Endpoint::Body(body),
            length: 0.0,
            stiffness: self.stiffness,
            damping: self.damping,
        })
    }
}

/// Read-only view of body positions, used by the renderer.
pub trait PositionQuery {
    fn body_position(&self, body: BodyHandle) -> Option<Vec2>;

    /// Positions of both ends of a constraint, only when both ends are bodies.
    fn body_pair(&self, constraint: ConstraintHandle) -> Option<(Vec2, Vec2)>;
}

pub struct World {
    pub gravity: Vec2,
    pub mouse: MouseConstraint,
    bodies: Vec<Body>,
    constraints: Vec<Constraint>,
}

impl World {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            mouse: MouseConstraint::default(),
            bodies: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn add_body(&mut self, position: Vec2, options: &BodyOptions) -> BodyHandle {
        self.bodies.push(Body::new(position, options));
        BodyHandle(self.bodies.len() - 1)
    }

    pub fn add_constraint(&mut self, options: ConstraintOptions) -> ConstraintHandle {
        let length = options.length.unwrap_or_else(|| {
            match (self.endpoint_position(options.a), self.endpoint_position(options.b)) {
                (Some(a), Some(b)) => a.distance(b),
                _ => 0.0,
            }
        });

        self.constraints.push(Constraint {
            a: options.a,
            b: options.b,
            length,
            stiffness: options.stiffness,
            damping: options.damping,
        });
        ConstraintHandle(self.constraints.len() - 1)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle.0)
    }

    pub fn constraint(&self, handle: ConstraintHandle) -> Option<&Constraint> {
        self.constraints.get(handle.0)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    fn endpoint_position(&self, endpoint: Endpoint) -> Option<Vec2> {
        match endpoint {
            Endpoint::Body(handle) => self.body(handle).map(|body| body.position),
            Endpoint::Point(point) => Some(point),
        }
    }

    // Advance the simulation by one step of `delta_ms` milliseconds
    pub fn step(&mut self, delta_ms: f32) {
        let acceleration = self.gravity * GRAVITY_SCALE;
        for body in &mut self.bodies {
            body.integrate(acceleration, delta_ms);
        }

        let mouse = self.mouse.as_constraint();
        for _ in 0..CONSTRAINT_ITERATIONS {
            for constraint in &self.constraints {
                solve_constraint(&mut self.bodies, constraint);
            }
            if let Some(mouse) = &mouse {
                solve_constraint(&mut self.bodies, mouse);
            }
        }
    }

    // First body under `point` that the filter is allowed to touch
    pub fn body_at(&self, point: Vec2, filter: &CollisionFilter) -> Option<BodyHandle> {
        self.bodies
            .iter()
            .position(|body| body.contains(point) && body.collision_filter.can_collide(filter))
            .map(BodyHandle)
    }

    pub fn mouse_moved(&mut self, position: Vec2) {
        self.mouse.position = position;
    }

    // Grab the body under the cursor, if there is one and none is held yet
    pub fn mouse_pressed(&mut self) -> Option<BodyHandle> {
        if self.mouse.body.is_none() {
            self.mouse.body = self.body_at(self.mouse.position, &self.mouse.collision_filter);
        }
        self.mouse.body
    }

    pub fn mouse_released(&mut self) {
        self.mouse.body = None;
    }
}

impl PositionQuery for World {
    fn body_position(&self, body: BodyHandle) -> Option<Vec2> {
        self.body(body).map(|body| body.position)
    }

    fn body_pair(&self, constraint: ConstraintHandle) -> Option<(Vec2, Vec2)> {
        let constraint = self.constraint(constraint)?;
        let a = self.body_position(constraint.a.body()?)?;
        let b = self.body_position(constraint.b.body()?)?;
        Some((a, b))
    }
}

// Move both ends towards the rest length, shared by inverse mass
fn solve_constraint(bodies: &mut [Body], constraint: &Constraint) {
    let position = |bodies: &[Body], endpoint: Endpoint| match endpoint {
        Endpoint::Body(handle) => bodies.get(handle.0).map(|body| body.position),
        Endpoint::Point(point) => Some(point),
    };
    let (Some(point_a), Some(point_b)) = (position(bodies, constraint.a), position(bodies, constraint.b)) else {
        return;
    };

    let inverse_mass = |endpoint: Endpoint| match endpoint {
        Endpoint::Body(handle) => bodies[handle.0].inverse_mass,
        Endpoint::Point(_) => 0.0,
    };
    let inverse_mass_a = inverse_mass(constraint.a);
    let inverse_mass_b = inverse_mass(constraint.b);
    let mass_total = inverse_mass_a + inverse_mass_b;
    if mass_total <= 0.0 {
        return;
    }

    let delta = point_a - point_b;
    let current_length = delta.length().max(MIN_LENGTH);
    let difference = (current_length - constraint.length) / current_length;
    let force = delta * (difference * constraint.stiffness);

    let normal = delta / current_length;
    let normal_velocity = if constraint.damping > 0.0 {
        let velocity = |endpoint: Endpoint| match endpoint {
            Endpoint::Body(handle) => bodies[handle.0].position - bodies[handle.0].position_prev,
            Endpoint::Point(_) => Vec2::ZERO,
        };
        normal.dot(velocity(constraint.b) - velocity(constraint.a))
    } else {
        0.0
    };
    let damping = normal * (constraint.damping * normal_velocity);

    if let Endpoint::Body(handle) = constraint.a {
        let share = inverse_mass_a / mass_total;
        let body = &mut bodies[handle.0];
        body.position -= force * share;
        body.position_prev -= damping * share;
    }

    if let Endpoint::Body(handle) = constraint.b {
        let share = inverse_mass_b / mass_total;
        let body = &mut bodies[handle.0];
        body.position += force * share;
        body.position_prev += damping * share;
    }
}

/// Fixed-step driver for the world.
///
/// Elapsed frame time is accumulated and consumed in whole steps. A frame that
/// would need more than `max_steps_per_frame` steps drops the remainder so a
/// stalled window cannot spiral.
pub struct Runner {
    pub step: Duration,
    pub max_steps_per_frame: usize,
    accumulator: Duration,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(Duration::from_secs_f32(BASE_DELTA_MS / 1000.0))
    }
}

impl Runner {
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            max_steps_per_frame: 8,
            accumulator: Duration::ZERO,
        }
    }

    // Returns the number of steps taken
    pub fn tick(&mut self, world: &mut World, elapsed: Duration) -> usize {
        self.accumulator += elapsed;

        let delta_ms = self.step.as_secs_f32() * 1000.0;
        let mut steps = 0;
        while self.accumulator >= self.step {
            if steps == self.max_steps_per_frame {
                self.accumulator = Duration::ZERO;
                break;
            }
            world.step(delta_ms);
            self.accumulator -= self.step;
            steps += 1;
        }

        steps
    }
}
