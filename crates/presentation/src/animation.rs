// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

use std::time::Duration;

use bevy::prelude::*;
use corsa_model::ParkourMode;
use corsa_simulation::controller::ParkourStatus;

#[derive(Default)]
pub struct CharacterAnimationPlugin;

impl Plugin for CharacterAnimationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup)
            .add_systems(Update, (play_animation_when_ready, update_animation));
    }
}

/// The animation graph shared by every character, loaded on startup and attached to each
/// animation player once its scene has spawned.
#[derive(Resource)]
pub struct Animations {
    graph_handle: Handle<AnimationGraph>,
    indices: Vec<AnimationNodeIndex>,
}

#[derive(Component)]
struct CurrentAnimation(CharacterAnimation);

/// Clips in the order they are added to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharacterAnimation {
    Idle,
    Walk,
    Run,
    Fall,
}

impl CharacterAnimation {
    fn from_status(status: &ParkourStatus) -> Self {
        match status.mode {
            ParkourMode::Sprint
            | ParkourMode::LeftWallRun
            | ParkourMode::RightWallRun
            | ParkourMode::VerticalWallRun => Self::Run,
            ParkourMode::Mantle => Self::Walk,
            ParkourMode::Crouch if status.is_moving() => Self::Walk,
            ParkourMode::LedgeGrab | ParkourMode::Slide | ParkourMode::Crouch => Self::Idle,
            ParkourMode::None if !status.grounded => Self::Fall,
            ParkourMode::None if status.is_moving() => Self::Walk,
            ParkourMode::None => Self::Idle,
        }
    }
}

fn setup(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
) {
    let character_prefix = "character-large-male";
    let clips = ["idle", "walk", "run", "fall"].map(|clip| {
        asset_server.load(
            GltfAssetLabel::Animation(0).from_asset(format!("{character_prefix}-{clip}.glb")),
        )
    });

    let (graph, indices) = AnimationGraph::from_clips(clips);
    let graph_handle = graphs.add(graph);
    commands.insert_resource(Animations {
        graph_handle,
        indices,
    });
}

fn play_animation_when_ready(
    mut commands: Commands,
    animations: Res<Animations>,
    mut players: Query<(Entity, &mut AnimationPlayer), Added<AnimationPlayer>>,
) {
    for (entity, mut player) in &mut players {
        let mut transitions = AnimationTransitions::new();

        // Transitions own every animation of the player, never start one on the player directly.
        transitions
            .play(
                &mut player,
                animations.indices[CharacterAnimation::Idle as usize],
                Duration::ZERO,
            )
            .repeat();

        commands
            .entity(entity)
            .insert(AnimationGraphHandle(animations.graph_handle.clone()))
            .insert(transitions)
            .insert(CurrentAnimation(CharacterAnimation::Idle));
    }
}

fn update_animation(
    statuses: Query<&ParkourStatus>,
    parents: Query<&ChildOf>,
    mut animation_players: Query<(
        Entity,
        &mut AnimationPlayer,
        &mut AnimationTransitions,
        &mut CurrentAnimation,
    )>,
    animations: Res<Animations>,
) {
    for (entity, mut player, mut transition, mut current_animation) in &mut animation_players {
        let Some(status) = find_status(entity, &parents, &statuses) else {
            continue;
        };

        let next_animation = CharacterAnimation::from_status(&status);
        if current_animation.0 == next_animation {
            continue;
        }

        current_animation.0 = next_animation;
        transition
            .play(
                &mut player,
                animations.indices[next_animation as usize],
                Duration::from_millis(250),
            )
            .repeat();
    }
}

/// Walks up the hierarchy until an entity with a [`ParkourStatus`] is found.
fn find_status(
    mut entity: Entity,
    parents: &Query<&ChildOf>,
    statuses: &Query<&ParkourStatus>,
) -> Option<ParkourStatus> {
    loop {
        if let Ok(status) = statuses.get(entity) {
            return Some(*status);
        }

        let Ok(parent) = parents.get(entity) else {
            return None;
        };
        entity = parent.parent();
    }
}
