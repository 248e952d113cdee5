// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

use bevy::prelude::*;
use corsa_model::ParkourMode;

use super::{
    ParkourController, body::ParkourBody, gate::Gate, mode::ParkourState, predicates, probe,
};

impl ParkourController {
    pub(super) fn start_slide(&mut self, body: &mut dyn ParkourBody) {
        if !(predicates::can_slide(body.forward_input(), self.mode(), self.queued.sprint)
            && body.is_walking())
        {
            return;
        }
        self.end_sprint(body);

        let vector = probe::slide_vector(body, &self.config).unwrap_or(Vec3::ZERO);
        if !self.set_mode(body, ParkourState::Slide { vector }) {
            return;
        }
        body.crouch();

        let plane = predicates::slide_plane_normal(body.velocity(), body.up());
        let motor = body.motor_mut();
        motor.ground_friction = 0.0;
        motor.braking_deceleration = self.config.slide_braking_deceleration;
        motor.max_crouch_speed = 0.0;
        motor.plane_constraint = plane;

        if predicates::should_push_slide(vector, self.config.slide_max_rise) {
            body.add_impulse(vector * self.config.slide_impulse, true);
        }
        self.open_gate(Gate::Slide);
        self.queued.clear();
    }

    pub(super) fn update_slide(&mut self, body: &mut dyn ParkourBody) {
        if self.mode() == ParkourMode::Slide
            && body.velocity().length() <= self.config.slide_stop_speed
        {
            self.end_slide(body, true);
        }
    }

    /// Ends a slide into a crouch, or standing up when `crouched` is false.
    pub(super) fn end_slide(&mut self, body: &mut dyn ParkourBody, crouched: bool) {
        if self.mode() != ParkourMode::Slide {
            return;
        }
        let state = if crouched {
            ParkourState::Crouch
        } else {
            ParkourState::None
        };
        if self.set_mode(body, state) {
            self.close_gate(Gate::Slide);
            if !crouched {
                body.uncrouch();
            }
        }
    }
}
