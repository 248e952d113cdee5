// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

//! Parkour tunables.
//!
//! Defaults are expressed in centimetre-scale world units. Use
//! [`ParkourConfig::scaled`] to convert them for a world measured in metres.

use std::{fmt, fs, path::Path};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Resource, Reflect, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[reflect(Resource)]
#[serde(default)]
pub struct ParkourConfig {
    /// Lateral launch speed while wall running.
    pub wall_run_speed: f32,
    /// Lateral launch speed while wall running with a queued sprint.
    pub wall_run_sprint_speed: f32,
    /// Gravity scale the wall run converges to.
    pub wall_run_target_gravity: f32,
    /// Interpolation speed of the gravity scale towards its wall run target.
    pub wall_run_gravity_speed: f32,
    pub wall_run_jump_height: f32,
    pub wall_run_jump_off_force: f32,
    /// Walls whose normal has a vertical component outside this bound are not runnable.
    pub wall_run_max_normal_vertical: f32,
    /// Lateral reach of the wall run probes.
    pub wall_run_probe_side: f32,
    /// How far behind the character the wall run probes end.
    pub wall_run_probe_back: f32,

    pub vertical_wall_run_speed: f32,
    /// Horizontal speed pushing the character into the climbed wall.
    pub vertical_wall_run_push: f32,
    /// Maximum duration of a vertical wall run in seconds, `0.0` for unlimited.
    pub vertical_wall_run_time: f32,

    pub ledge_grab_jump_height: f32,
    pub ledge_grab_jump_off_force: f32,
    /// Forward offset of the ledge and wall probes.
    pub ledge_probe_reach: f32,
    /// Height above the eyes where the ledge probe starts.
    pub ledge_probe_rise: f32,
    pub ledge_probe_radius: f32,
    pub ledge_probe_half_height: f32,
    pub wall_probe_radius: f32,
    pub wall_probe_half_height: f32,
    /// Climbable faces must have a normal whose vertical component is at least this.
    pub wall_probe_min_normal_vertical: f32,
    /// Extra distance below the capsule used to detect nearby ground while hanging.
    pub ground_probe_margin: f32,

    /// Height above the feet the ledge probe reaches down to.
    pub mantle_height: f32,
    pub mantle_speed: f32,
    pub quick_mantle_speed: f32,
    pub mantle_turn_speed: f32,
    /// Distance from the mantle target at which the mantle completes.
    pub mantle_finish_distance: f32,

    pub slide_impulse: f32,
    /// Slides only get an impulse when the surface does not rise more than this.
    pub slide_max_rise: f32,
    pub slide_braking_deceleration: f32,
    /// Speed at or below which a slide settles into a crouch.
    pub slide_stop_speed: f32,
    pub slide_probe_depth: f32,

    pub sprint_speed: f32,

    /// Duration of the smooth repositioning against walls and ledges.
    pub correction_duration: f32,
    /// Interval between gate polls in seconds, `0.0` polls on every tick.
    pub update_interval: f32,
}

impl Default for ParkourConfig {
    fn default() -> Self {
        Self {
            wall_run_speed: 850.0,
            wall_run_sprint_speed: 1100.0,
            wall_run_target_gravity: 0.25,
            wall_run_gravity_speed: 10.0,
            wall_run_jump_height: 400.0,
            wall_run_jump_off_force: 300.0,
            wall_run_max_normal_vertical: 0.52,
            wall_run_probe_side: 75.0,
            wall_run_probe_back: 35.0,

            vertical_wall_run_speed: 300.0,
            vertical_wall_run_push: 600.0,
            vertical_wall_run_time: 0.0,

            ledge_grab_jump_height: 400.0,
            ledge_grab_jump_off_force: 300.0,
            ledge_probe_reach: 50.0,
            ledge_probe_rise: 50.0,
            ledge_probe_radius: 20.0,
            ledge_probe_half_height: 10.0,
            wall_probe_radius: 10.0,
            wall_probe_half_height: 5.0,
            wall_probe_min_normal_vertical: -0.1,
            ground_probe_margin: 40.0,

            mantle_height: 44.0,
            mantle_speed: 10.0,
            quick_mantle_speed: 20.0,
            mantle_turn_speed: 7.0,
            mantle_finish_distance: 8.0,

            slide_impulse: 600.0,
            slide_max_rise: 0.02,
            slide_braking_deceleration: 1400.0,
            slide_stop_speed: 35.0,
            slide_probe_depth: 200.0,

            sprint_speed: 1000.0,

            correction_duration: 0.1,
            update_interval: 0.0,
        }
    }
}

impl ParkourConfig {
    /// Returns a copy with every distance, speed and acceleration multiplied by `factor`.
    ///
    /// Ratios, durations, gravity scales and interpolation rates are left untouched.
    pub fn scaled(&self, factor: f32) -> Self {
        let mut config = self.clone();
        for value in [
            &mut config.wall_run_speed,
            &mut config.wall_run_sprint_speed,
            &mut config.wall_run_jump_height,
            &mut config.wall_run_jump_off_force,
            &mut config.wall_run_probe_side,
            &mut config.wall_run_probe_back,
            &mut config.vertical_wall_run_speed,
            &mut config.vertical_wall_run_push,
            &mut config.ledge_grab_jump_height,
            &mut config.ledge_grab_jump_off_force,
            &mut config.ledge_probe_reach,
            &mut config.ledge_probe_rise,
            &mut config.ledge_probe_radius,
            &mut config.ledge_probe_half_height,
            &mut config.wall_probe_radius,
            &mut config.wall_probe_half_height,
            &mut config.ground_probe_margin,
            &mut config.mantle_height,
            &mut config.mantle_finish_distance,
            &mut config.slide_impulse,
            &mut config.slide_braking_deceleration,
            &mut config.slide_stop_speed,
            &mut config.slide_probe_depth,
            &mut config.sprint_speed,
        ] {
            *value *= factor;
        }
        config
    }

    /// Loads a RON file. Fields missing from the file keep their default value.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError {
            file: file.clone(),
            message: format!("IO error: {e}"),
        })?;
        ron::from_str(&contents).map_err(|e| ConfigError {
            file,
            message: format!("Parse error: {e}"),
        })
    }
}

/// Error raised when a parkour configuration file cannot be used.
#[derive(Debug)]
pub struct ConfigError {
    pub file: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to load {}: {}", self.file, self.message)
    }
}

impl std::error::Error for ConfigError {}
