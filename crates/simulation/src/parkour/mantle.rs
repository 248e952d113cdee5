// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

use super::{
    ParkourController,
    body::{ParkourBody, facing},
    gate::Gate,
    mode::ParkourState,
    predicates,
};

/// Reopen delay of the climbing chain after a completed mantle.
const MANTLE_DONE_REOPEN_DELAY: f32 = 0.5;

impl ParkourController {
    /// Starts pulling up once the player pushes towards a grabbed ledge.
    pub(super) fn check_mantle(&mut self, body: &mut dyn ParkourBody) {
        let Some(ledge) = self.state.ledge().copied() else {
            return;
        };
        let quick = ledge.is_quick(self.config.mantle_height);
        if !predicates::can_mantle(body.forward_input(), self.mode(), quick) {
            return;
        }
        if self.set_mode(body, ParkourState::Mantle(ledge)) {
            self.close_gate(Gate::MantleCheck);
            self.open_gate(Gate::Mantle);
        }
    }

    pub(super) fn update_mantle(&mut self, body: &mut dyn ParkourBody, delta: f32) {
        let ParkourState::Mantle(ledge) = self.state else {
            return;
        };

        let location = body.location();
        if let Some(look_at) = facing(ledge.target - location) {
            let alpha = predicates::interp_alpha(delta, self.config.mantle_turn_speed);
            let rotation = body.rotation().slerp(look_at, alpha);
            body.set_rotation(rotation);
        }

        let speed = if ledge.is_quick(self.config.mantle_height) {
            self.config.quick_mantle_speed
        } else {
            self.config.mantle_speed
        };
        let next = location.lerp(ledge.target, predicates::interp_alpha(delta, speed));
        body.set_location(next);

        let remaining = next.distance(ledge.target);
        if predicates::mantle_finished(remaining, self.config.mantle_finish_distance) {
            self.end_vertical_wall_run(body, MANTLE_DONE_REOPEN_DELAY);
        }
    }
}
