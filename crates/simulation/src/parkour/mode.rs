// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

//! Parkour state and the movement parameters each mode implies.

use bevy::prelude::*;
use corsa_model::ParkourMode;

use super::body::{CharacterMotor, ParkourBody};

/// Point and normal of a wall found by a probe.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct WallHit {
    pub impact_point: Vec3,
    pub normal: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum WallSide {
    Left,
    Right,
}

impl WallSide {
    pub fn mode(self) -> ParkourMode {
        match self {
            WallSide::Left => ParkourMode::LeftWallRun,
            WallSide::Right => ParkourMode::RightWallRun,
        }
    }

    /// Sign turning `normal × up` into the running direction.
    pub fn sign(self) -> f32 {
        match self {
            WallSide::Left => -1.0,
            WallSide::Right => 1.0,
        }
    }
}

/// A grabbed ledge and where mantling it leads.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Ledge {
    /// Walkable point found on top of the ledge.
    pub floor: Vec3,
    /// Face below the ledge.
    pub wall: WallHit,
    /// Location the character ends up at after mantling.
    pub target: Vec3,
    /// How far the ledge probe travelled before hitting the top.
    pub trace_distance: f32,
    /// Ground was found right below the character when grabbing.
    pub close_to_ground: bool,
}

impl Ledge {
    pub fn is_quick(&self, mantle_height: f32) -> bool {
        self.trace_distance > mantle_height || self.close_to_ground
    }
}

/// Current parkour mode along with the data only that mode uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub enum ParkourState {
    #[default]
    None,
    WallRun {
        side: WallSide,
        wall: WallHit,
    },
    VerticalWallRun {
        wall: WallHit,
    },
    LedgeGrab(Ledge),
    Mantle(Ledge),
    Slide {
        vector: Vec3,
    },
    Crouch,
    Sprint,
}

impl ParkourState {
    pub fn mode(&self) -> ParkourMode {
        match self {
            ParkourState::None => ParkourMode::None,
            ParkourState::WallRun { side, .. } => side.mode(),
            ParkourState::VerticalWallRun { .. } => ParkourMode::VerticalWallRun,
            ParkourState::LedgeGrab(_) => ParkourMode::LedgeGrab,
            ParkourState::Mantle(_) => ParkourMode::Mantle,
            ParkourState::Slide { .. } => ParkourMode::Slide,
            ParkourState::Crouch => ParkourMode::Crouch,
            ParkourState::Sprint => ParkourMode::Sprint,
        }
    }

    /// Wall the character is running on or climbing.
    pub fn wall(&self) -> Option<WallHit> {
        match self {
            ParkourState::WallRun { wall, .. } | ParkourState::VerticalWallRun { wall } => {
                Some(*wall)
            }
            ParkourState::LedgeGrab(ledge) | ParkourState::Mantle(ledge) => Some(ledge.wall),
            _ => None,
        }
    }

    pub fn ledge(&self) -> Option<&Ledge> {
        match self {
            ParkourState::LedgeGrab(ledge) | ParkourState::Mantle(ledge) => Some(ledge),
            _ => None,
        }
    }
}

/// Transitions the abilities are designed to perform.
pub fn is_expected(from: ParkourMode, to: ParkourMode) -> bool {
    use ParkourMode::*;
    match to {
        None => from != None,
        LeftWallRun | RightWallRun => from == None || from.is_wall_running(),
        VerticalWallRun | LedgeGrab => {
            matches!(from, None | VerticalWallRun) || from.is_wall_running()
        }
        Mantle => from == LedgeGrab,
        Slide => matches!(from, None | Crouch),
        Crouch => matches!(from, None | Slide),
        Sprint => from == None,
    }
}

/// Movement parameters captured before any mode reshapes them.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct PhysicsBaseline {
    pub gravity_scale: f32,
    pub ground_friction: f32,
    pub braking_deceleration: f32,
    pub max_walk_speed: f32,
    pub max_crouch_speed: f32,
    pub orient_rotation_to_movement: bool,
    pub use_controller_rotation_yaw: bool,
}

impl PhysicsBaseline {
    pub fn capture(motor: &CharacterMotor) -> Self {
        Self {
            gravity_scale: motor.gravity_scale,
            ground_friction: motor.ground_friction,
            braking_deceleration: motor.braking_deceleration,
            max_walk_speed: motor.max_walk_speed,
            max_crouch_speed: motor.max_crouch_speed,
            orient_rotation_to_movement: motor.orient_rotation_to_movement,
            use_controller_rotation_yaw: motor.use_controller_rotation_yaw,
        }
    }

    fn restore(&self, motor: &mut CharacterMotor) {
        motor.gravity_scale = self.gravity_scale;
        motor.ground_friction = self.ground_friction;
        motor.braking_deceleration = self.braking_deceleration;
        motor.max_walk_speed = self.max_walk_speed;
        motor.max_crouch_speed = self.max_crouch_speed;
        motor.plane_constraint = None;
    }
}

/// Re-derives the movement parameters after a switch from `previous` to `current`.
pub fn reset_movement(
    body: &mut dyn ParkourBody,
    baseline: &PhysicsBaseline,
    previous: ParkourMode,
    current: ParkourMode,
) {
    match current {
        ParkourMode::None | ParkourMode::Crouch => {
            let motor = body.motor_mut();
            baseline.restore(motor);
            motor.orient_rotation_to_movement = true;
            motor.use_controller_rotation_yaw = baseline.use_controller_rotation_yaw;
            body.set_physics_mode(previous.recovery_physics_mode());
        }
        _ => {
            let sprinting = current == ParkourMode::Sprint;
            let motor = body.motor_mut();
            motor.orient_rotation_to_movement = sprinting;
            motor.use_controller_rotation_yaw =
                sprinting && baseline.use_controller_rotation_yaw;
        }
    }
}
