// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

use bevy::{asset::uuid::Uuid, prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Component, Serialize, Deserialize)]
pub struct Player(u128);

impl Default for Player {
    fn default() -> Self {
        // Create a UUID for the player.
        let player_id = Uuid::new_v4().as_u128();
        Player(player_id)
    }
}

/// Static level geometry the parkour probes can interact with.
#[derive(Component, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub half_extents: Vec3,
}

impl Obstacle {
    pub const fn new(kind: ObstacleKind, half_extents: Vec3) -> Self {
        Self { kind, half_extents }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    /// Walkable floor, including ramps.
    Floor,
    /// A face that can be run along and climbed.
    Wall,
    /// A block whose top can be grabbed and mantled.
    Ledge,
}

/// The parkour ability currently driving a character.
///
/// Exactly one mode is active at any time.
#[derive(
    Reflect, Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash,
)]
pub enum ParkourMode {
    #[default]
    None,
    LeftWallRun,
    RightWallRun,
    VerticalWallRun,
    LedgeGrab,
    Mantle,
    Slide,
    Crouch,
    Sprint,
}

impl ParkourMode {
    pub const ALL: [ParkourMode; 9] = [
        ParkourMode::None,
        ParkourMode::LeftWallRun,
        ParkourMode::RightWallRun,
        ParkourMode::VerticalWallRun,
        ParkourMode::LedgeGrab,
        ParkourMode::Mantle,
        ParkourMode::Slide,
        ParkourMode::Crouch,
        ParkourMode::Sprint,
    ];

    pub fn is_wall_running(self) -> bool {
        matches!(self, ParkourMode::LeftWallRun | ParkourMode::RightWallRun)
    }

    /// Modes reached through the vertical wall run chain.
    pub fn is_climbing(self) -> bool {
        matches!(
            self,
            ParkourMode::VerticalWallRun | ParkourMode::LedgeGrab | ParkourMode::Mantle
        )
    }

    /// Modes that only make sense while the character is off the ground.
    pub fn is_aerial(self) -> bool {
        self.is_wall_running() || self.is_climbing()
    }

    /// Physics mode to fall back to when leaving this mode.
    pub fn recovery_physics_mode(self) -> PhysicsMode {
        match self {
            ParkourMode::None
            | ParkourMode::Mantle
            | ParkourMode::Slide
            | ParkourMode::Crouch
            | ParkourMode::Sprint => PhysicsMode::Walking,
            ParkourMode::LeftWallRun
            | ParkourMode::RightWallRun
            | ParkourMode::VerticalWallRun
            | ParkourMode::LedgeGrab => PhysicsMode::Falling,
        }
    }
}

/// Movement mode of the underlying physics controller.
#[derive(
    Reflect, Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash,
)]
pub enum PhysicsMode {
    /// Movement disabled: no gravity, no input.
    None,
    #[default]
    Walking,
    Falling,
}
