// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

pub mod config;
pub mod controller;
pub mod network;
pub mod parkour;
pub mod rapier;

use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, RigidBody, Velocity};
use bevy_replicon::{
    RepliconPlugins,
    prelude::{AppRuleExt, ClientState, Replicated, RepliconChannels},
};
use bevy_replicon_renet::RepliconRenetPlugins;
use corsa_model::{Obstacle, ObstacleKind, Player};

use crate::{
    config::{ConfigError, ParkourConfig},
    controller::{
        CharacterShape, ParkourCharacterBundle, ParkourControllerPlugin, ParkourStatus,
    },
    network::{Cli, NetworkMode},
    parkour::CharacterMotor,
};

/// World units per centimetre: the simulation runs in metres.
pub const WORLD_SCALE: f32 = 0.01;

/// Dimensions of every player character.
pub const PLAYER_SHAPE: CharacterShape = CharacterShape {
    radius: 0.5,
    half_height: 1.5,
    eye_height: 1.1,
    max_slope_angle: std::f32::consts::FRAC_PI_4,
};

#[derive(Default)]
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Cli>()
            .register_type::<ParkourConfig>()
            .add_plugins(RepliconPlugins)
            .add_plugins(RepliconRenetPlugins)
            .add_plugins(ParkourControllerPlugin)
            .add_systems(Startup, setup)
            .add_systems(OnEnter(ClientState::Connecting), display_connection_message)
            .add_systems(OnExit(ClientState::Connected), show_disconnected_message)
            .replicate::<Transform>()
            // Replicate velocity component to stabilize character movement across the network.
            .replicate::<Velocity>()
            .replicate::<ParkourStatus>()
            .replicate::<Player>()
            .replicate::<Obstacle>()
            .add_observer(init_player_physics)
            .add_observer(init_obstacle_collider);
    }
}

fn setup(mut commands: Commands, cli: Res<Cli>, channels: Res<RepliconChannels>) -> Result<()> {
    let config = load_config(&cli)?;
    commands.insert_resource(config.scaled(WORLD_SCALE));

    if network::init(&mut commands, &cli, &channels)? != NetworkMode::Client {
        spawn_server_entities(&mut commands);
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ParkourConfig, ConfigError> {
    let Some(path) = &cli.config else {
        info!("Using default parkour tunables");
        return Ok(ParkourConfig::default());
    };
    let config = ParkourConfig::load(path)?;
    info!("Loaded parkour tunables from {}", path.display());
    Ok(config)
}

/// Level geometry exercising every ability: a floor, a wall to run along, a wall to climb,
/// a high and a low ledge and a ramp to slide on.
fn course() -> Vec<(Transform, Obstacle)> {
    vec![
        (
            Transform::from_xyz(0.0, -0.05, 0.0),
            Obstacle::new(ObstacleKind::Floor, Vec3::new(24.0, 0.05, 24.0)),
        ),
        (
            Transform::from_xyz(-3.0, 3.0, 8.0),
            Obstacle::new(ObstacleKind::Wall, Vec3::new(0.25, 3.0, 8.0)),
        ),
        (
            Transform::from_xyz(6.0, 3.5, 12.0),
            Obstacle::new(ObstacleKind::Wall, Vec3::new(3.0, 3.5, 0.25)),
        ),
        (
            Transform::from_xyz(0.0, 1.2, -6.0),
            Obstacle::new(ObstacleKind::Ledge, Vec3::new(2.0, 1.2, 1.0)),
        ),
        (
            Transform::from_xyz(-6.0, 0.4, -6.0),
            Obstacle::new(ObstacleKind::Ledge, Vec3::new(1.5, 0.4, 1.0)),
        ),
        (
            Transform::from_xyz(8.0, 0.6, -6.0).with_rotation(Quat::from_rotation_x(-0.26)),
            Obstacle::new(ObstacleKind::Floor, Vec3::new(2.0, 0.1, 4.0)),
        ),
    ]
}

fn spawn_server_entities(commands: &mut Commands) {
    commands.spawn((
        Replicated,
        Transform::from_xyz(0.0, PLAYER_SHAPE.half_height + 0.1, 0.0),
        Player::default(),
    ));
    for (transform, obstacle) in course() {
        commands.spawn((Replicated, transform, obstacle));
    }
}

fn display_connection_message() {
    info!("Connecting to server...");
}

fn show_disconnected_message() {
    info!("Disconnected from server");
}

fn init_player_physics(add: On<Add, Player>, mut commands: Commands, config: Res<ParkourConfig>) {
    let motor = CharacterMotor {
        gravity_scale: 2.0,
        ..CharacterMotor::default().scaled(WORLD_SCALE)
    };
    commands
        .entity(add.entity)
        .insert(ParkourCharacterBundle::new(config.clone(), PLAYER_SHAPE, motor));
}

fn init_obstacle_collider(
    add: On<Add, Obstacle>,
    mut commands: Commands,
    obstacles: Query<&Obstacle>,
) {
    let Ok(obstacle) = obstacles.get(add.entity) else {
        return;
    };
    let extents = obstacle.half_extents;
    commands.entity(add.entity).insert((
        RigidBody::Fixed,
        Collider::cuboid(extents.x, extents.y, extents.z),
        rapier::obstacle_groups(obstacle.kind),
    ));
}
