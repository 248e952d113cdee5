// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

//! A box world for exercising the controller without a physics engine.
//!
//! Capsule sweeps are approximated by casting the capsule center against boxes grown by the
//! capsule extents. Motion requests are applied instantly and recorded.

use bevy::math::{
    Vec3A,
    bounding::{Aabb3d, RayCast3d},
};
use bevy::prelude::*;
use corsa_model::PhysicsMode;

use super::{
    ParkourController,
    body::{
        Capsule, CharacterMotor, ParkourBody, Probe, ProbeHit, ProbeShape, TraceChannel, facing,
    },
};

/// Minimum vertical component of a walkable surface normal.
const WALKABLE_NORMAL_VERTICAL: f32 = 0.71;
/// How far below the capsule ground still supports walking.
const GROUND_TOLERANCE: f32 = 5.0;

#[derive(Debug, Clone, Copy)]
pub struct Block {
    pub aabb: Aabb3d,
    /// Normal reported for every hit, to fake slopes.
    pub normal: Option<Vec3>,
}

impl Block {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            aabb: Aabb3d {
                min: min.into(),
                max: max.into(),
            },
            normal: None,
        }
    }

    pub fn with_normal(mut self, normal: Vec3) -> Self {
        self.normal = Some(normal.normalize());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Sandbox {
    pub blocks: Vec<Block>,
    pub location: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub motor: CharacterMotor,
    pub capsule: Capsule,
    pub eye_height: f32,
    /// Every `(velocity, override_horizontal, override_vertical)` launch request.
    pub launches: Vec<(Vec3, bool, bool)>,
    /// Every `(impulse, velocity_change)` request.
    pub impulses: Vec<(Vec3, bool)>,
    /// Every `(location, rotation)` correction request.
    pub moves: Vec<(Vec3, Quat)>,
}

impl Sandbox {
    /// A character at `location` looking along `forward` and pushing forward.
    pub fn new(location: Vec3, forward: Vec3) -> Self {
        let rotation = facing(forward).unwrap_or_default();
        Self {
            blocks: Vec::new(),
            location,
            rotation,
            velocity: Vec3::ZERO,
            motor: CharacterMotor {
                last_input: rotation * Vec3::Z,
                ..default()
            },
            capsule: Capsule {
                radius: 35.0,
                half_height: 90.0,
            },
            eye_height: 64.0,
            launches: Vec::new(),
            impulses: Vec::new(),
            moves: Vec::new(),
        }
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn with_physics_mode(mut self, mode: PhysicsMode) -> Self {
        self.motor.physics_mode = mode;
        self
    }

    /// An initialized controller for this character.
    pub fn controller(&self) -> ParkourController {
        let mut controller = ParkourController::default();
        controller.initialize(self);
        controller
    }

    /// Ticks `controller` for `seconds` at 60 Hz.
    pub fn run(&mut self, controller: &mut ParkourController, seconds: f32) {
        let ticks = (seconds * 60.0).round() as usize;
        for _ in 0..ticks {
            controller.tick(self, 1.0 / 60.0);
        }
    }

    fn is_on_ground(&self) -> bool {
        let depth = self.capsule.half_height + GROUND_TOLERANCE;
        let probe = Probe::line(
            self.location,
            self.location - Vec3::Y * depth,
            TraceChannel::Floor,
        );
        self.trace(&probe).is_some_and(|hit| self.is_walkable(&hit))
    }

    /// Notifies `controller` of a physics mode switch, as the physics controller would.
    pub fn switch_physics_mode(&mut self, controller: &mut ParkourController, mode: PhysicsMode) {
        let previous = self.motor.physics_mode;
        self.motor.physics_mode = mode;
        controller.on_physics_mode_changed(self, previous, mode);
    }
}

/// Normal of the face of `aabb` closest to `point`.
fn face_normal(aabb: &Aabb3d, point: Vec3) -> Vec3 {
    let min = Vec3::from(aabb.min);
    let max = Vec3::from(aabb.max);
    [
        ((point.x - min.x).abs(), Vec3::NEG_X),
        ((max.x - point.x).abs(), Vec3::X),
        ((point.y - min.y).abs(), Vec3::NEG_Y),
        ((max.y - point.y).abs(), Vec3::Y),
        ((point.z - min.z).abs(), Vec3::NEG_Z),
        ((max.z - point.z).abs(), Vec3::Z),
    ]
    .into_iter()
    .min_by(|a, b| a.0.total_cmp(&b.0))
    .map_or(Vec3::Y, |(_, normal)| normal)
}

impl ParkourBody for Sandbox {
    fn location(&self) -> Vec3 {
        self.location
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn eye_height(&self) -> f32 {
        self.eye_height
    }

    fn capsule(&self) -> Capsule {
        self.capsule
    }

    fn motor(&self) -> &CharacterMotor {
        &self.motor
    }

    fn motor_mut(&mut self) -> &mut CharacterMotor {
        &mut self.motor
    }

    fn trace(&self, probe: &Probe) -> Option<ProbeHit> {
        let direction = Dir3::new(probe.end - probe.start).ok()?;
        let ray = Ray3d::new(probe.start, direction);
        let cast = RayCast3d::from_ray(ray, probe.length());
        let grow = match probe.shape {
            ProbeShape::Line => Vec3A::ZERO,
            ProbeShape::Capsule {
                radius,
                half_height,
            } => Vec3A::new(radius, half_height.max(radius), radius),
        };

        self.blocks
            .iter()
            .filter_map(|block| {
                let swept = Aabb3d {
                    min: block.aabb.min - grow,
                    max: block.aabb.max + grow,
                };
                let distance = cast.aabb_intersection_at(&swept)?;
                // Probes starting inside a block ignore it.
                if distance <= 0.0 {
                    return None;
                }
                let location = ray.get_point(distance);
                Some(ProbeHit {
                    impact_point: block.aabb.closest_point(location).into(),
                    normal: block
                        .normal
                        .unwrap_or_else(|| face_normal(&swept, location)),
                    distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn is_walkable(&self, hit: &ProbeHit) -> bool {
        hit.normal.y >= WALKABLE_NORMAL_VERTICAL
    }

    fn launch(&mut self, velocity: Vec3, override_horizontal: bool, override_vertical: bool) {
        if override_horizontal {
            self.velocity.x = velocity.x;
            self.velocity.z = velocity.z;
        } else {
            self.velocity.x += velocity.x;
            self.velocity.z += velocity.z;
        }
        if override_vertical {
            self.velocity.y = velocity.y;
        } else {
            self.velocity.y += velocity.y;
        }
        self.launches
            .push((velocity, override_horizontal, override_vertical));
    }

    fn add_impulse(&mut self, impulse: Vec3, velocity_change: bool) {
        self.velocity += impulse;
        self.impulses.push((impulse, velocity_change));
    }

    fn move_to(&mut self, location: Vec3, rotation: Quat, _duration: f32) {
        self.location = location;
        self.rotation = rotation;
        self.moves.push((location, rotation));
    }

    fn set_location(&mut self, location: Vec3) {
        self.location = location;
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn stop_movement(&mut self) {
        self.velocity = Vec3::ZERO;
    }

    fn set_physics_mode(&mut self, mode: PhysicsMode) {
        // Walking without ground below turns into falling straight away.
        self.motor.physics_mode = if mode == PhysicsMode::Walking && !self.is_on_ground() {
            PhysicsMode::Falling
        } else {
            mode
        };
    }
}
