// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

use bevy::prelude::*;

/// Enables the per-tick polling of one ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum Gate {
    WallRun,
    VerticalWallRun,
    MantleCheck,
    Mantle,
    Slide,
    Sprint,
}

impl Gate {
    /// Polling order.
    pub const ORDER: [Gate; 6] = [
        Gate::WallRun,
        Gate::VerticalWallRun,
        Gate::MantleCheck,
        Gate::Mantle,
        Gate::Slide,
        Gate::Sprint,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of open gates. Opening or closing twice is harmless.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub struct GateSet(u8);

impl GateSet {
    pub fn is_open(self, gate: Gate) -> bool {
        self.0 & gate.bit() != 0
    }

    /// Returns whether the gate was closed before.
    pub fn open(&mut self, gate: Gate) -> bool {
        let was_closed = !self.is_open(gate);
        self.0 |= gate.bit();
        was_closed
    }

    /// Returns whether the gate was open before.
    pub fn close(&mut self, gate: Gate) -> bool {
        let was_open = self.is_open(gate);
        self.0 &= !gate.bit();
        was_open
    }
}
