// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

//! Player commands and physics notifications driving the parkour state machine.

use bevy::prelude::*;
use corsa_model::{ParkourMode, PhysicsMode};

use super::{ParkourController, body::ParkourBody, predicates};

/// Reopen delay of an aerial ability interrupted by a crouch, a slide or a landing.
const CANCEL_REOPEN_DELAY: f32 = 0.5;

impl ParkourController {
    fn accepts_commands(&self, command: &str) -> bool {
        if !self.is_initialized() {
            debug!("Parkour {command} ignored: controller not initialized");
        }
        self.is_initialized()
    }

    /// On the ground, arms the abilities for the coming jump. Otherwise jumps off whatever
    /// the current ability is holding on to.
    pub fn jump(&mut self, body: &mut dyn ParkourBody) {
        if !self.accepts_commands("jump") {
            return;
        }

        if self.mode() == ParkourMode::None {
            if !body.is_falling() {
                self.open_movement_gates();
            }
            return;
        }

        self.wall_run_jump(body);
        self.ledge_jump(body);
        self.end_slide(body, false);
        self.end_crouch(body);
        self.sprint_jump(body);
    }

    /// Drops off a wall, otherwise slides when running and crouches when not.
    pub fn crouch_slide(&mut self, body: &mut dyn ParkourBody) {
        if !self.accepts_commands("crouch or slide") {
            return;
        }

        if self.cancel_movement(body) {
            debug!("Crouch or slide cancelled the ongoing {:?}", self.previous_mode());
            return;
        }

        if predicates::can_slide(body.forward_input(), self.mode(), self.queued.sprint) {
            if body.is_walking() {
                self.start_slide(body);
            } else {
                self.queued.slide = true;
            }
        } else {
            self.toggle_crouch(body);
        }
    }

    pub fn sprint(&mut self, body: &mut dyn ParkourBody) {
        if !self.accepts_commands("sprint") {
            return;
        }
        self.start_sprint(body);
    }

    /// Called when the character touches the ground after a fall.
    pub fn land(&mut self, body: &mut dyn ParkourBody) {
        if !self.accepts_commands("land") {
            return;
        }
        self.cancel_movement(body);
        self.end_sprint(body);
        self.end_slide(body, false);
        self.close_movement_gates();
    }

    /// Called whenever the physics controller switches movement mode.
    pub fn on_physics_mode_changed(
        &mut self,
        body: &mut dyn ParkourBody,
        previous: PhysicsMode,
        current: PhysicsMode,
    ) {
        if !self.accepts_commands("physics mode change") {
            return;
        }
        self.physics_previous = previous;
        self.physics_current = current;

        match (previous, current) {
            (PhysicsMode::Walking, PhysicsMode::Falling) => {
                self.sprint_jump(body);
                self.end_all(body);
                self.open_movement_gates();
            }
            (PhysicsMode::Falling, PhysicsMode::Walking) => self.check_queues(body),
            _ => (),
        }
    }

    /// Interrupts a wall run, climb, hang or mantle. Returns whether one was ongoing.
    pub fn cancel_movement(&mut self, body: &mut dyn ParkourBody) -> bool {
        let mode = self.mode();
        if mode.is_climbing() {
            self.end_vertical_wall_run(body, CANCEL_REOPEN_DELAY);
            true
        } else if mode.is_wall_running() {
            self.end_wall_run(body, CANCEL_REOPEN_DELAY);
            true
        } else {
            false
        }
    }

    /// Ends every ability without scheduling any gate to reopen.
    fn end_all(&mut self, body: &mut dyn ParkourBody) {
        self.end_wall_run(body, 0.0);
        self.end_vertical_wall_run(body, 0.0);
        self.end_sprint(body);
        self.end_slide(body, false);
    }

    /// Starts at most one queued intent, a slide before a sprint.
    pub(super) fn check_queues(&mut self, body: &mut dyn ParkourBody) {
        if self.queued.slide {
            self.start_slide(body);
        } else if self.queued.sprint {
            self.start_sprint(body);
        }
    }
}
