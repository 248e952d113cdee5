// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

//! Sprinting and crouching.

use bevy::prelude::*;
use corsa_model::ParkourMode;

use super::{
    ParkourController, body::ParkourBody, gate::Gate, mode::ParkourState, predicates,
    schedule::Task,
};

const SPRINT_REOPEN_DELAY: f32 = 0.1;

impl ParkourController {
    pub(super) fn start_sprint(&mut self, body: &mut dyn ParkourBody) {
        if !predicates::can_sprint(body.is_walking(), self.mode()) {
            debug!("Sprint ignored while {:?}", self.mode());
            return;
        }
        if self.set_mode(body, ParkourState::Sprint) {
            body.motor_mut().max_walk_speed = self.config.sprint_speed;
            self.open_gate(Gate::Sprint);
            self.queued.clear();
        }
    }

    pub(super) fn update_sprint(&mut self, body: &mut dyn ParkourBody) {
        if self.mode() == ParkourMode::Sprint && body.forward_input() <= 0.0 {
            self.end_sprint(body);
        }
    }

    pub(super) fn end_sprint(&mut self, body: &mut dyn ParkourBody) {
        if self.mode() != ParkourMode::Sprint {
            return;
        }
        if self.set_mode(body, ParkourState::None) {
            self.close_gate(Gate::Sprint);
            self.scheduler.schedule_once(Task::OpenSprintGate, SPRINT_REOPEN_DELAY);
        }
    }

    /// Stops sprinting on a jump, remembering to sprint again once grounded.
    pub(super) fn sprint_jump(&mut self, body: &mut dyn ParkourBody) {
        if self.mode() == ParkourMode::Sprint {
            self.end_sprint(body);
            self.queued.sprint = true;
        }
    }

    pub(super) fn toggle_crouch(&mut self, body: &mut dyn ParkourBody) {
        match self.mode() {
            ParkourMode::None => self.start_crouch(body),
            ParkourMode::Crouch => self.end_crouch(body),
            mode => debug!("Crouch toggle ignored while {mode:?}"),
        }
    }

    fn start_crouch(&mut self, body: &mut dyn ParkourBody) {
        if self.mode() == ParkourMode::None {
            body.crouch();
            self.set_mode(body, ParkourState::Crouch);
            self.queued.clear();
        }
    }

    pub(super) fn end_crouch(&mut self, body: &mut dyn ParkourBody) {
        if self.mode() == ParkourMode::Crouch {
            body.uncrouch();
            self.set_mode(body, ParkourState::None);
            self.queued.clear();
        }
    }
}
