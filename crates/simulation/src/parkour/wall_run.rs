// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

use bevy::prelude::*;
use corsa_model::ParkourMode;

use super::{
    ParkourController,
    body::{ParkourBody, facing},
    gate::Gate,
    mode::{ParkourState, WallHit, WallSide},
    predicates, probe,
    schedule::Task,
};

/// Reopen delay after the wall runs out.
const WALL_LOST_REOPEN_DELAY: f32 = 0.5;
/// Reopen delay after the input or the mode stops allowing a wall run.
const GUARD_FAILED_REOPEN_DELAY: f32 = 1.0;
pub(super) const JUMP_OFF_REOPEN_DELAY: f32 = 0.35;
/// Time after which gravity alone drives the vertical motion of a wall run.
const GRAVITY_ASSIST_DELAY: f32 = 1.0;

impl ParkourController {
    pub(super) fn update_wall_run(&mut self, body: &mut dyn ParkourBody, delta: f32) {
        if !predicates::can_wall_run(body.forward_input(), self.mode()) {
            self.end_wall_run(body, GUARD_FAILED_REOPEN_DELAY);
            return;
        }

        if let Some(wall) = probe::wall_run(body, &self.config, WallSide::Right) {
            self.run_along(body, WallSide::Right, wall, delta);
        } else if self.mode() == ParkourMode::RightWallRun {
            self.end_wall_run(body, WALL_LOST_REOPEN_DELAY);
        } else if let Some(wall) = probe::wall_run(body, &self.config, WallSide::Left) {
            self.run_along(body, WallSide::Left, wall, delta);
        } else {
            self.end_wall_run(body, WALL_LOST_REOPEN_DELAY);
        }
    }

    fn run_along(&mut self, body: &mut dyn ParkourBody, side: WallSide, wall: WallHit, delta: f32) {
        let speed = if self.queued.sprint {
            self.config.wall_run_sprint_speed
        } else {
            self.config.wall_run_speed
        };
        let direction = predicates::wall_run_direction(wall.normal, side);
        let override_vertical = !(self.mode().is_wall_running() && self.wall_run_gravity);
        body.launch(direction * speed, true, override_vertical);

        let state = ParkourState::WallRun { side, wall };
        if self.set_mode(body, state) {
            self.scheduler.schedule_once(Task::EnableWallRunGravity, GRAVITY_ASSIST_DELAY);
            let location = wall.impact_point + wall.normal * body.capsule().radius;
            let rotation = facing(direction).unwrap_or_else(|| body.rotation());
            body.move_to(location, rotation, self.config.correction_duration);
        } else {
            self.refresh_state(state);
        }

        self.apply_wall_run_gravity(body, delta);
    }

    fn apply_wall_run_gravity(&self, body: &mut dyn ParkourBody, delta: f32) {
        let alpha = predicates::interp_alpha(delta, self.config.wall_run_gravity_speed);
        let motor = body.motor_mut();
        motor.gravity_scale += (self.config.wall_run_target_gravity - motor.gravity_scale) * alpha;
    }

    /// Ends an ongoing wall run, letting a new one start after `reopen_delay` seconds.
    pub(super) fn end_wall_run(&mut self, body: &mut dyn ParkourBody, reopen_delay: f32) {
        if !self.mode().is_wall_running() {
            return;
        }
        if self.set_mode(body, ParkourState::None) {
            self.close_gate(Gate::WallRun);
            self.scheduler.schedule_once(Task::OpenWallRunGate, reopen_delay);
        }
    }

    /// Pushes the character away from the wall it runs on.
    pub(super) fn wall_run_jump(&mut self, body: &mut dyn ParkourBody) {
        let ParkourState::WallRun { wall, .. } = self.state else {
            return;
        };
        self.end_wall_run(body, JUMP_OFF_REOPEN_DELAY);

        let away =
            Vec3::new(wall.normal.x, 0.0, wall.normal.z) * self.config.wall_run_jump_off_force;
        body.launch(away + Vec3::Y * self.config.wall_run_jump_height, false, true);
    }
}
