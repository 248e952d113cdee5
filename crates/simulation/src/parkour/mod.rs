// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

//! Parkour movement state machine.
//!
//! A [`ParkourController`] decides which ability drives a character and reshapes the
//! character's movement accordingly. Every tick it runs the due deferred tasks, then polls the
//! update routine of each open [`Gate`] in a fixed order. Commands such as
//! [`ParkourController::jump`] open, close and chain those gates.
//!
//! The controller never talks to an engine directly: everything goes through a
//! [`ParkourBody`].

pub mod body;
mod commands;
pub mod gate;
mod mantle;
pub mod mode;
pub mod predicates;
pub mod probe;
pub mod schedule;
mod slide;
mod stance;
mod vertical;
mod wall_run;

#[cfg(test)]
mod sandbox;

use bevy::prelude::*;
use corsa_model::{ParkourMode, PhysicsMode};

pub use body::{CharacterMotor, ParkourBody, facing};
pub use gate::{Gate, GateSet};
pub use mode::{Ledge, ParkourState, PhysicsBaseline, WallHit, WallSide};
pub use schedule::{Scheduler, Task};

use crate::config::ParkourConfig;

/// Requests latched until the condition preventing them clears.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub struct QueuedIntents {
    pub slide: bool,
    pub sprint: bool,
}

impl QueuedIntents {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A parkour mode transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct ModeChange {
    pub previous: ParkourMode,
    pub current: ParkourMode,
}

#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct ParkourController {
    config: ParkourConfig,
    /// Captured on initialization, `None` until then.
    baseline: Option<PhysicsBaseline>,
    state: ParkourState,
    previous: ParkourMode,
    physics_previous: PhysicsMode,
    physics_current: PhysicsMode,
    gates: GateSet,
    scheduler: Scheduler,
    queued: QueuedIntents,
    /// Set once a wall run lasted long enough for gravity to take over vertical motion.
    wall_run_gravity: bool,
    changes: Vec<ModeChange>,
}

impl ParkourController {
    pub fn new(config: ParkourConfig) -> Self {
        Self {
            config,
            ..default()
        }
    }

    /// Binds the controller to a character, capturing its default movement parameters.
    pub fn initialize(&mut self, body: &dyn ParkourBody) {
        self.baseline = Some(PhysicsBaseline::capture(body.motor()));
        self.physics_previous = body.physics_mode();
        self.physics_current = body.physics_mode();
        if self.config.update_interval > 0.0 {
            self.scheduler
                .schedule_repeating(Task::Poll, self.config.update_interval);
        }
        debug!("Parkour controller initialized");
    }

    pub fn is_initialized(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn config(&self) -> &ParkourConfig {
        &self.config
    }

    pub fn state(&self) -> &ParkourState {
        &self.state
    }

    pub fn mode(&self) -> ParkourMode {
        self.state.mode()
    }

    pub fn previous_mode(&self) -> ParkourMode {
        self.previous
    }

    /// Last physics mode transition reported to the controller, as `(previous, current)`.
    pub fn physics_modes(&self) -> (PhysicsMode, PhysicsMode) {
        (self.physics_previous, self.physics_current)
    }

    pub fn gates(&self) -> GateSet {
        self.gates
    }

    pub fn is_gate_open(&self, gate: Gate) -> bool {
        self.gates.is_open(gate)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn queued(&self) -> QueuedIntents {
        self.queued
    }

    pub fn is_wall_run_gravity(&self) -> bool {
        self.wall_run_gravity
    }

    /// Takes the mode transitions that happened since the last call.
    pub fn drain_mode_changes(&mut self) -> impl Iterator<Item = ModeChange> + '_ {
        self.changes.drain(..)
    }

    /// Switches to a new state, reshaping the movement for its mode.
    ///
    /// Returns false, changing nothing, when the mode is already current.
    pub fn set_mode(&mut self, body: &mut dyn ParkourBody, state: ParkourState) -> bool {
        let Some(baseline) = self.baseline else {
            warn!("Parkour mode change to {:?} before initialization", state.mode());
            return false;
        };

        let current = self.state.mode();
        let next = state.mode();
        if next == current {
            debug!("Parkour mode already {current:?}");
            return false;
        }
        if !mode::is_expected(current, next) {
            warn!("Unexpected parkour transition {current:?} -> {next:?}");
        }

        if current.is_wall_running() != next.is_wall_running() {
            // Every wall run holds its height for a while before gravity takes over.
            self.scheduler.cancel(Task::EnableWallRunGravity);
            self.wall_run_gravity = false;
        }

        self.previous = current;
        self.state = state;
        mode::reset_movement(body, &baseline, current, next);
        self.changes.push(ModeChange {
            previous: current,
            current: next,
        });
        debug!("Parkour mode {current:?} -> {next:?}");
        true
    }

    /// Replaces the data of the current state without a transition.
    fn refresh_state(&mut self, state: ParkourState) {
        if state.mode() == self.state.mode() {
            self.state = state;
        }
    }

    pub fn open_gate(&mut self, gate: Gate) {
        let opened = self.gates.open(gate);
        if opened && gate == Gate::VerticalWallRun && self.config.vertical_wall_run_time > 0.0 {
            self.scheduler
                .schedule_once(Task::EndVerticalWallRun, self.config.vertical_wall_run_time);
        }
    }

    pub fn close_gate(&mut self, gate: Gate) {
        self.gates.close(gate);
        if gate == Gate::VerticalWallRun {
            self.gates.close(Gate::Mantle);
        }
    }

    /// Opens the gates of the abilities started from the air or from a run.
    pub fn open_movement_gates(&mut self) {
        for gate in [
            Gate::WallRun,
            Gate::VerticalWallRun,
            Gate::Slide,
            Gate::Sprint,
        ] {
            self.open_gate(gate);
        }
    }

    pub fn close_movement_gates(&mut self) {
        for gate in [
            Gate::WallRun,
            Gate::VerticalWallRun,
            Gate::Slide,
            Gate::Sprint,
        ] {
            self.close_gate(gate);
        }
    }

    /// Advances the controller by `delta` seconds.
    pub fn tick(&mut self, body: &mut dyn ParkourBody, delta: f32) {
        if !self.is_initialized() {
            return;
        }

        for task in self.scheduler.advance(delta) {
            self.run_task(body, task);
        }

        if self.config.update_interval <= 0.0 {
            self.poll(body, delta);
        }
    }

    fn run_task(&mut self, body: &mut dyn ParkourBody, task: Task) {
        match task {
            Task::Poll => self.poll(body, self.config.update_interval),
            Task::OpenWallRunGate => self.open_gate(Gate::WallRun),
            Task::EnableWallRunGravity => {
                self.wall_run_gravity = self.mode().is_wall_running();
            }
            Task::OpenVerticalWallRunGate => self.open_gate(Gate::VerticalWallRun),
            Task::EndVerticalWallRun => {
                if self.mode() == ParkourMode::VerticalWallRun {
                    self.end_vertical_wall_run(body, vertical::TIME_LIMIT_REOPEN_DELAY);
                }
            }
            Task::OpenMantleCheckGate => {
                if self.mode() == ParkourMode::LedgeGrab {
                    self.open_gate(Gate::MantleCheck);
                }
            }
            Task::OpenSprintGate => self.open_gate(Gate::Sprint),
            Task::CheckQueues => self.check_queues(body),
        }
    }

    /// Runs the update routine behind every open gate.
    fn poll(&mut self, body: &mut dyn ParkourBody, delta: f32) {
        for gate in Gate::ORDER {
            if !self.gates.is_open(gate) {
                continue;
            }
            match gate {
                Gate::WallRun => self.update_wall_run(body, delta),
                Gate::VerticalWallRun => self.update_vertical_wall_run(body),
                Gate::MantleCheck => self.check_mantle(body),
                Gate::Mantle => self.update_mantle(body, delta),
                Gate::Slide => self.update_slide(body),
                Gate::Sprint => self.update_sprint(body),
            }
        }
    }
}
