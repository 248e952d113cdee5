// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

//! World queries made on behalf of the abilities.

use bevy::prelude::*;

use super::{
    body::{ParkourBody, Probe, ProbeHit, TraceChannel},
    mode::{WallHit, WallSide},
    predicates,
};
use crate::config::ParkourConfig;

/// Looks for a runnable wall on one side of the character, slightly behind it.
pub fn wall_run(body: &dyn ParkourBody, config: &ParkourConfig, side: WallSide) -> Option<WallHit> {
    let start = body.location();
    let end = start + body.right() * side.sign() * config.wall_run_probe_side
        - body.forward() * config.wall_run_probe_back;
    let hit = body.trace(&Probe::line(start, end, TraceChannel::Visibility))?;
    predicates::is_runnable_wall(hit.normal, config.wall_run_max_normal_vertical, body.is_falling())
        .then_some(WallHit {
            impact_point: hit.impact_point,
            normal: hit.normal,
        })
}

/// Point in front of the character at mantle height above its feet.
fn feet_point(body: &dyn ParkourBody, config: &ParkourConfig) -> Vec3 {
    body.location() + Vec3::Y * (config.mantle_height - body.capsule().half_height)
}

/// Sweeps down in front of the character, from above its eyes to mantle height, for a
/// walkable top.
pub fn ledge(body: &dyn ParkourBody, config: &ParkourConfig) -> Option<ProbeHit> {
    let reach = body.forward() * config.ledge_probe_reach;
    let start = body.eyes() + Vec3::Y * config.ledge_probe_rise + reach;
    let end = feet_point(body, config) + reach;
    let hit = body.trace(&Probe::capsule(
        start,
        end,
        config.ledge_probe_radius,
        config.ledge_probe_half_height,
        TraceChannel::Ledge,
    ))?;
    body.is_walkable(&hit).then_some(hit)
}

/// Sweeps forward at mantle height for a climbable face.
pub fn climbable_face(body: &dyn ParkourBody, config: &ParkourConfig) -> Option<WallHit> {
    let start = feet_point(body, config);
    let end = start + body.forward() * config.ledge_probe_reach;
    let hit = body.trace(&Probe::capsule(
        start,
        end,
        config.wall_probe_radius,
        config.wall_probe_half_height,
        TraceChannel::Climbable,
    ))?;
    predicates::is_climbable_face(hit.normal, config.wall_probe_min_normal_vertical).then_some(
        WallHit {
            impact_point: hit.impact_point,
            normal: hit.normal,
        },
    )
}

/// Whether there is ground just below the character's capsule.
pub fn close_to_ground(body: &dyn ParkourBody, config: &ParkourConfig) -> bool {
    let start = body.location();
    let end = start - body.up() * (body.capsule().half_height + config.ground_probe_margin);
    body.trace(&Probe::line(start, end, TraceChannel::Ledge)).is_some()
}

/// Direction to slide along the floor below the character.
pub fn slide_vector(body: &dyn ParkourBody, config: &ParkourConfig) -> Option<Vec3> {
    let start = body.location();
    let end = start - Vec3::Y * config.slide_probe_depth;
    let hit = body.trace(&Probe::line(start, end, TraceChannel::Floor))?;
    Some(predicates::slide_vector(hit.normal, body.right()))
}
