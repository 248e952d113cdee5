// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

//! [`ParkourBody`] backed by a Rapier rigid body.

use bevy::prelude::*;
use bevy_rapier3d::geometry::Group;
use bevy_rapier3d::parry::shape::Capsule as CapsuleShape;
use bevy_rapier3d::prelude::*;
use corsa_model::ObstacleKind;

use crate::{
    controller::{CharacterShape, PoseCorrection},
    parkour::body::{
        Capsule, CharacterMotor, ParkourBody, Probe, ProbeHit, ProbeShape, TraceChannel,
    },
};

pub const CHARACTER_GROUP: Group = Group::GROUP_1;
pub const FLOOR_GROUP: Group = Group::GROUP_2;
pub const WALL_GROUP: Group = Group::GROUP_3;
pub const LEDGE_GROUP: Group = Group::GROUP_4;

/// Collision groups of a piece of level geometry.
pub fn obstacle_groups(kind: ObstacleKind) -> CollisionGroups {
    let membership = match kind {
        ObstacleKind::Floor => FLOOR_GROUP,
        ObstacleKind::Wall => WALL_GROUP,
        ObstacleKind::Ledge => LEDGE_GROUP,
    };
    CollisionGroups::new(membership, Group::ALL)
}

/// Level geometry a trace channel collides with.
pub fn channel_filter(channel: TraceChannel) -> Group {
    match channel {
        TraceChannel::Climbable => WALL_GROUP | LEDGE_GROUP,
        TraceChannel::Visibility | TraceChannel::Ledge | TraceChannel::Floor => {
            FLOOR_GROUP | WALL_GROUP | LEDGE_GROUP
        }
    }
}

/// A character borrowed from the ECS for the duration of a parkour update.
pub struct RapierBody<'a, 'w> {
    pub entity: Entity,
    pub context: &'a RapierContext<'w>,
    pub shape: &'a CharacterShape,
    pub mass: f32,
    pub transform: &'a mut Transform,
    pub velocity: &'a mut Velocity,
    pub motor: &'a mut CharacterMotor,
    pub correction: &'a mut PoseCorrection,
}

impl RapierBody<'_, '_> {
    fn filter(&self, channel: TraceChannel) -> QueryFilter<'static> {
        QueryFilter::default()
            .exclude_rigid_body(self.entity)
            .exclude_sensors()
            .groups(CollisionGroups::new(Group::ALL, channel_filter(channel)))
    }
}

impl ParkourBody for RapierBody<'_, '_> {
    fn location(&self) -> Vec3 {
        self.transform.translation
    }

    fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    fn velocity(&self) -> Vec3 {
        self.velocity.linvel
    }

    fn eye_height(&self) -> f32 {
        self.shape.eye_height
    }

    fn capsule(&self) -> Capsule {
        Capsule {
            radius: self.shape.radius,
            half_height: self.shape.half_height,
        }
    }

    fn motor(&self) -> &CharacterMotor {
        self.motor
    }

    fn motor_mut(&mut self) -> &mut CharacterMotor {
        self.motor
    }

    fn trace(&self, probe: &Probe) -> Option<ProbeHit> {
        let distance = probe.length();
        let direction = (probe.end - probe.start).try_normalize()?;
        let filter = self.filter(probe.channel);

        match probe.shape {
            ProbeShape::Line => {
                let (_, hit) = self.context.cast_ray_and_get_normal(
                    probe.start,
                    direction,
                    distance,
                    true,
                    filter,
                )?;
                Some(ProbeHit {
                    impact_point: hit.point,
                    normal: hit.normal,
                    distance: hit.time_of_impact,
                })
            }
            ProbeShape::Capsule {
                radius,
                half_height,
            } => {
                let shape = CapsuleShape::new_y((half_height - radius).max(0.0), radius);
                let (_, hit) = self.context.cast_shape(
                    probe.start,
                    Quat::IDENTITY,
                    direction,
                    &shape,
                    ShapeCastOptions {
                        max_time_of_impact: distance,
                        stop_at_penetration: false,
                        ..default()
                    },
                    filter,
                )?;
                // Sweeps starting in penetration carry no contact geometry.
                let details = hit.details?;
                Some(ProbeHit {
                    impact_point: details.witness1,
                    normal: details.normal1,
                    distance: hit.time_of_impact,
                })
            }
        }
    }

    fn is_walkable(&self, hit: &ProbeHit) -> bool {
        hit.normal.angle_between(Vec3::Y).abs() <= self.shape.max_slope_angle
    }

    fn launch(&mut self, velocity: Vec3, override_horizontal: bool, override_vertical: bool) {
        let linvel = &mut self.velocity.linvel;
        if override_horizontal {
            linvel.x = velocity.x;
            linvel.z = velocity.z;
        } else {
            linvel.x += velocity.x;
            linvel.z += velocity.z;
        }
        if override_vertical {
            linvel.y = velocity.y;
        } else {
            linvel.y += velocity.y;
        }
    }

    fn add_impulse(&mut self, impulse: Vec3, velocity_change: bool) {
        if velocity_change || self.mass <= 0.0 {
            self.velocity.linvel += impulse;
        } else {
            self.velocity.linvel += impulse / self.mass;
        }
    }

    fn move_to(&mut self, location: Vec3, rotation: Quat, duration: f32) {
        self.correction.start(
            self.transform.translation,
            self.transform.rotation,
            location,
            rotation,
            duration,
        );
    }

    fn set_location(&mut self, location: Vec3) {
        self.transform.translation = location;
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
    }

    fn stop_movement(&mut self) {
        self.velocity.linvel = Vec3::ZERO;
        self.velocity.angvel = Vec3::ZERO;
    }
}
