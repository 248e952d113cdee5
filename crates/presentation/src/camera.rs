// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

use bevy::{prelude::*, transform::TransformSystems};
use corsa_model::{ParkourMode, Player};
use corsa_simulation::controller::ParkourStatus;

#[derive(Default)]
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup).add_systems(
            PostUpdate,
            follow_player.before(TransformSystems::Propagate),
        );
    }
}

/// Pivot the camera orbits around.
/// The rig follows the first player and leans away from the wall while wall running.
#[derive(Component)]
pub struct CameraRig;

/// Height of the pivot above the player origin.
const PIVOT_HEIGHT: f32 = 1.0;
const FOLLOW_RATE: f32 = 10.0;
const WALL_RUN_ROLL: f32 = 15.0;

pub fn setup(mut commands: Commands) {
    commands
        .spawn((
            CameraRig,
            Transform::from_xyz(0.0, PIVOT_HEIGHT, 0.0),
            InheritedVisibility::default(),
        ))
        .with_children(|pivot| {
            // Camera offset behind the pivot
            pivot.spawn((
                Camera3d::default(),
                Transform::from_xyz(0.0, 2.0, -10.0).looking_at(Vec3::ZERO, Vec3::Y),
            ));
        });
}

/// Roll in radians about the view axis, positive leaning to the right.
fn wall_run_roll(mode: ParkourMode) -> f32 {
    match mode {
        ParkourMode::LeftWallRun => WALL_RUN_ROLL.to_radians(),
        ParkourMode::RightWallRun => -WALL_RUN_ROLL.to_radians(),
        _ => 0.0,
    }
}

/// Where the rig should sit to frame a player.
fn rig_target(player: &Transform, mode: ParkourMode) -> Transform {
    let (yaw, _, _) = player.rotation.to_euler(EulerRot::YXZ);
    Transform::from_translation(player.translation + Vec3::Y * PIVOT_HEIGHT).with_rotation(
        Quat::from_euler(EulerRot::YXZ, yaw, 0.0, wall_run_roll(mode)),
    )
}

fn follow_player(
    time: Res<Time>,
    players: Query<(&Transform, Option<&ParkourStatus>), (With<Player>, Without<CameraRig>)>,
    mut rig: Single<&mut Transform, With<CameraRig>>,
) {
    let Some((player, status)) = players.iter().next() else {
        return;
    };

    let mode = status.map_or(ParkourMode::None, |status| status.mode);
    let target = rig_target(player, mode);
    let factor = 1.0 - (-FOLLOW_RATE * time.delta_secs()).exp();
    rig.translation = rig.translation.lerp(target.translation, factor);
    rig.rotation = rig.rotation.slerp(target.rotation, factor);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_runs_lean_away_from_the_wall() {
        assert!(wall_run_roll(ParkourMode::LeftWallRun) > 0.0);
        assert!(wall_run_roll(ParkourMode::RightWallRun) < 0.0);
        assert_eq!(wall_run_roll(ParkourMode::Sprint), 0.0);
    }

    #[test]
    fn rig_keeps_the_player_yaw_above_its_head() {
        let player = Transform::from_xyz(1.0, 2.0, 3.0).with_rotation(Quat::from_rotation_y(0.5));
        let target = rig_target(&player, ParkourMode::None);
        assert_eq!(target.translation, Vec3::new(1.0, 2.0 + PIVOT_HEIGHT, 3.0));
        assert!(target.rotation.angle_between(player.rotation) < 1e-4);
    }

    #[test]
    fn left_wall_run_tilts_the_view_up_towards_the_right() {
        let target = rig_target(&Transform::IDENTITY, ParkourMode::LeftWallRun);
        let up = target.rotation * Vec3::Y;
        // Right is -X.
        assert!(up.x < 0.0);
    }
}
