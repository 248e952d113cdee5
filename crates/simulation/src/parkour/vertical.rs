// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

//! Running up walls and grabbing the ledges at their top.

use bevy::prelude::*;

use super::{
    ParkourController,
    body::{ParkourBody, ProbeHit, facing},
    gate::Gate,
    mode::{Ledge, ParkourState, WallHit},
    predicates, probe,
    schedule::Task,
    wall_run::JUMP_OFF_REOPEN_DELAY,
};

/// Reopen delay after a climb runs out of wall or input.
const CHAIN_FAILED_REOPEN_DELAY: f32 = 0.35;
/// Reopen delay after a climb exceeded its maximum duration.
pub(super) const TIME_LIMIT_REOPEN_DELAY: f32 = 2.0;
/// Delay before queued intents are replayed once the chain ends.
const QUEUE_RECHECK_DELAY: f32 = 0.02;
/// Time given to the hang correction before a mantle may start.
const MANTLE_SETTLE_DELAY: f32 = 0.25;

impl ParkourController {
    pub(super) fn update_vertical_wall_run(&mut self, body: &mut dyn ParkourBody) {
        if !predicates::can_vertical_wall_run(body.forward_input(), self.mode(), body.is_falling())
        {
            self.end_vertical_wall_run(body, CHAIN_FAILED_REOPEN_DELAY);
            return;
        }

        let top = probe::ledge(body, &self.config);
        match (top, probe::climbable_face(body, &self.config)) {
            (Some(top), Some(wall)) => self.grab_ledge(body, top, wall),
            (_, Some(wall)) => self.climb(body, wall),
            (_, None) => self.end_vertical_wall_run(body, CHAIN_FAILED_REOPEN_DELAY),
        }
    }

    fn climb(&mut self, body: &mut dyn ParkourBody, wall: WallHit) {
        let state = ParkourState::VerticalWallRun { wall };
        if self.set_mode(body, state) {
            let flush = wall.impact_point + wall.normal * body.capsule().radius;
            let location = Vec3::new(flush.x, body.location().y, flush.z);
            let rotation = facing(-wall.normal).unwrap_or_else(|| body.rotation());
            body.move_to(location, rotation, self.config.correction_duration);
        } else {
            self.refresh_state(state);
        }

        let push = self.config.vertical_wall_run_push;
        body.launch(
            Vec3::new(
                -wall.normal.x * push,
                self.config.vertical_wall_run_speed,
                -wall.normal.z * push,
            ),
            true,
            true,
        );
    }

    fn grab_ledge(&mut self, body: &mut dyn ParkourBody, top: ProbeHit, wall: WallHit) {
        let capsule = body.capsule();
        let ledge = Ledge {
            floor: top.impact_point,
            wall,
            target: top.impact_point + Vec3::Y * capsule.half_height,
            trace_distance: top.distance,
            close_to_ground: probe::close_to_ground(body, &self.config),
        };

        self.close_gate(Gate::VerticalWallRun);
        if self.set_mode(body, ParkourState::LedgeGrab(ledge)) {
            body.disable_movement();
            body.stop_movement();
            body.motor_mut().gravity_scale = 0.0;
        }

        if ledge.is_quick(self.config.mantle_height) {
            self.open_gate(Gate::MantleCheck);
        } else {
            let hang = wall.impact_point + wall.normal * capsule.radius;
            let location = Vec3::new(hang.x, ledge.floor.y - capsule.half_height, hang.z);
            let rotation = facing(-wall.normal).unwrap_or_else(|| body.rotation());
            body.move_to(location, rotation, self.config.correction_duration);
            self.scheduler.schedule_once(Task::OpenMantleCheckGate, MANTLE_SETTLE_DELAY);
        }
    }

    /// Ends a climb, hang or mantle, reopening the chain after `reopen_delay` seconds.
    pub(super) fn end_vertical_wall_run(&mut self, body: &mut dyn ParkourBody, reopen_delay: f32) {
        if !self.mode().is_climbing() {
            return;
        }
        if self.set_mode(body, ParkourState::None) {
            self.close_gate(Gate::VerticalWallRun);
            self.close_gate(Gate::MantleCheck);
            self.scheduler.cancel(Task::OpenMantleCheckGate);
            self.scheduler.schedule_once(Task::OpenVerticalWallRunGate, reopen_delay);
            self.scheduler.schedule_once(Task::CheckQueues, QUEUE_RECHECK_DELAY);
        }
    }

    /// Pushes the character away from the wall it climbs or hangs from.
    pub(super) fn ledge_jump(&mut self, body: &mut dyn ParkourBody) {
        if !self.mode().is_climbing() {
            return;
        }
        let normal = self.state.wall().map_or(Vec3::ZERO, |wall| wall.normal);
        self.end_vertical_wall_run(body, JUMP_OFF_REOPEN_DELAY);

        let away = Vec3::new(normal.x, 0.0, normal.z) * self.config.ledge_grab_jump_off_force;
        body.launch(away + Vec3::Y * self.config.ledge_grab_jump_height, true, true);
    }
}
