// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

//! The character the parkour controller drives.
//!
//! [`ParkourBody`] is everything the controller needs from the outside world: the character's
//! pose, its movement tunables, world probes and motion primitives. The Rapier backend
//! implements it in [`crate::rapier`]; tests implement it over a box world.
//!
//! Conventions: Y is up, a character faces its local +Z and its right is local -X.

use bevy::prelude::*;
use corsa_model::PhysicsMode;

/// Collision channel a probe is traced against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceChannel {
    /// Anything that blocks sight, used for wall runs.
    Visibility,
    /// Faces that can be climbed.
    Climbable,
    /// Surfaces that can be stood on, used for ledges and ground proximity.
    Ledge,
    /// Floor under a slide.
    Floor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeShape {
    Line,
    /// Vertical capsule swept from start to end.
    Capsule { radius: f32, half_height: f32 },
}

/// A single ray or shape sweep request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    pub start: Vec3,
    pub end: Vec3,
    pub shape: ProbeShape,
    pub channel: TraceChannel,
}

impl Probe {
    pub fn line(start: Vec3, end: Vec3, channel: TraceChannel) -> Self {
        Self {
            start,
            end,
            shape: ProbeShape::Line,
            channel,
        }
    }

    pub fn capsule(
        start: Vec3,
        end: Vec3,
        radius: f32,
        half_height: f32,
        channel: TraceChannel,
    ) -> Self {
        Self {
            start,
            end,
            shape: ProbeShape::Capsule {
                radius,
                half_height,
            },
            channel,
        }
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// A blocking hit returned by a probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    /// Point of contact on the surface.
    pub impact_point: Vec3,
    /// Surface normal at the contact, pointing away from the surface.
    pub normal: Vec3,
    /// Distance travelled by the probe before the impact.
    pub distance: f32,
}

/// Collision capsule of the character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub radius: f32,
    /// Half of the full height, caps included.
    pub half_height: f32,
}

/// Movement tunables of the physics controller the parkour layer reshapes.
#[derive(Component, Reflect, Debug, Clone, PartialEq)]
#[reflect(Component)]
pub struct CharacterMotor {
    pub gravity_scale: f32,
    pub ground_friction: f32,
    pub braking_deceleration: f32,
    pub max_walk_speed: f32,
    pub max_crouch_speed: f32,
    /// Rotate the character from movement input.
    pub orient_rotation_to_movement: bool,
    /// Let the controller yaw drive the character.
    pub use_controller_rotation_yaw: bool,
    /// Normal of the plane movement is constrained to, if any.
    pub plane_constraint: Option<Vec3>,
    pub physics_mode: PhysicsMode,
    pub crouched: bool,
    /// Last movement input in world space.
    pub last_input: Vec3,
}

impl Default for CharacterMotor {
    fn default() -> Self {
        Self {
            gravity_scale: 1.0,
            ground_friction: 8.0,
            braking_deceleration: 2048.0,
            max_walk_speed: 600.0,
            max_crouch_speed: 300.0,
            orient_rotation_to_movement: true,
            use_controller_rotation_yaw: false,
            plane_constraint: None,
            physics_mode: PhysicsMode::Walking,
            crouched: false,
            last_input: Vec3::ZERO,
        }
    }
}

impl CharacterMotor {
    /// Returns a copy with speeds and decelerations multiplied by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            braking_deceleration: self.braking_deceleration * factor,
            max_walk_speed: self.max_walk_speed * factor,
            max_crouch_speed: self.max_crouch_speed * factor,
            ..self.clone()
        }
    }
}

/// A character the parkour controller can sense and move.
pub trait ParkourBody {
    fn location(&self) -> Vec3;

    fn rotation(&self) -> Quat;

    fn velocity(&self) -> Vec3;

    /// Height of the eyes above [`ParkourBody::location`].
    fn eye_height(&self) -> f32;

    fn capsule(&self) -> Capsule;

    fn motor(&self) -> &CharacterMotor;

    fn motor_mut(&mut self) -> &mut CharacterMotor;

    /// Traces a probe against the world, ignoring the character itself.
    fn trace(&self, probe: &Probe) -> Option<ProbeHit>;

    /// Whether the surface hit by a probe can be stood on.
    fn is_walkable(&self, hit: &ProbeHit) -> bool;

    /// Replaces or adds to the velocity, per component group.
    fn launch(&mut self, velocity: Vec3, override_horizontal: bool, override_vertical: bool);

    /// Applies an impulse. With `velocity_change` the mass is ignored.
    fn add_impulse(&mut self, impulse: Vec3, velocity_change: bool);

    /// Starts a smooth, fire-and-forget move to a pose.
    fn move_to(&mut self, location: Vec3, rotation: Quat, duration: f32);

    fn set_location(&mut self, location: Vec3);

    fn set_rotation(&mut self, rotation: Quat);

    /// Zeroes the velocity immediately.
    fn stop_movement(&mut self);

    fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    fn right(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_X
    }

    fn up(&self) -> Vec3 {
        self.rotation() * Vec3::Y
    }

    fn eyes(&self) -> Vec3 {
        self.location() + Vec3::Y * self.eye_height()
    }

    /// How much the last movement input points along the character's facing.
    fn forward_input(&self) -> f32 {
        self.forward().dot(self.motor().last_input)
    }

    fn physics_mode(&self) -> PhysicsMode {
        self.motor().physics_mode
    }

    fn set_physics_mode(&mut self, mode: PhysicsMode) {
        self.motor_mut().physics_mode = mode;
    }

    fn is_falling(&self) -> bool {
        self.physics_mode() == PhysicsMode::Falling
    }

    fn is_walking(&self) -> bool {
        self.physics_mode() == PhysicsMode::Walking
    }

    /// Stops all movement processing until a physics mode is set again.
    fn disable_movement(&mut self) {
        self.set_physics_mode(PhysicsMode::None);
    }

    fn crouch(&mut self) {
        self.motor_mut().crouched = true;
    }

    fn uncrouch(&mut self) {
        self.motor_mut().crouched = false;
    }
}

/// Rotation facing `direction` projected on the horizontal plane.
///
/// Returns `None` for vertical or zero directions.
pub fn facing(direction: Vec3) -> Option<Quat> {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    if flat.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(Quat::from_rotation_y(flat.x.atan2(flat.z)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_points_local_forward_along_direction() {
        for direction in [Vec3::X, Vec3::NEG_Z, Vec3::new(1.0, 0.3, 1.0)] {
            let rotation = facing(direction).unwrap();
            let forward = rotation * Vec3::Z;
            let flat = Vec3::new(direction.x, 0.0, direction.z).normalize();
            assert!(forward.distance(flat) < 1e-5, "{direction:?} -> {forward:?}");
        }
    }

    #[test]
    fn facing_rejects_vertical_directions() {
        assert!(facing(Vec3::Y).is_none());
        assert!(facing(Vec3::ZERO).is_none());
    }

    #[test]
    fn scaled_motor_keeps_friction_and_gravity() {
        let motor = CharacterMotor::default().scaled(0.01);
        assert!((motor.max_walk_speed - 6.0).abs() < 1e-5);
        assert!((motor.braking_deceleration - 20.48).abs() < 1e-4);
        assert_eq!(motor.ground_friction, 8.0);
        assert_eq!(motor.gravity_scale, 1.0);
    }

    #[test]
    fn probe_length_is_segment_length() {
        let probe = Probe::line(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0), TraceChannel::Floor);
        assert_eq!(probe.length(), 5.0);
    }
}
