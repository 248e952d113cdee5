// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

mod animation;
mod camera;

use std::collections::VecDeque;

use bevy::app::plugin_group;
use bevy::prelude::*;
use bevy_egui::{EguiContext, EguiPlugin, PrimaryEguiContext, egui};
use bevy_inspector_egui::{
    DefaultInspectorConfigPlugin, bevy_egui::EguiPrimaryContextPass,
    bevy_inspector::ui_for_entities,
};
use bevy_rapier3d::prelude::*;
use bevy_replicon::prelude::ClientState;
use corsa_model::{Obstacle, ObstacleKind, ParkourMode, Player};
use corsa_simulation::{
    PLAYER_SHAPE, SimulationPlugin,
    controller::{ParkourModeChanged, ParkourStatus},
};
use egui_dock::{DockArea, DockState, NodeIndex};

plugin_group! {
    #[derive(Debug)]
    pub struct PresentationPluginGroup {
        camera:::CameraPlugin,
        animation:::CharacterAnimationPlugin,
    }
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        .add_plugins(RapierDebugRenderPlugin::default())
        .add_plugins(SimulationPlugin)
        .add_plugins(EguiPlugin::default())
        .add_plugins(DefaultInspectorConfigPlugin)
        .add_plugins(PresentationPluginGroup)
        .init_resource::<UiState>()
        .init_resource::<ModeHistory>()
        .add_systems(Startup, setup)
        .add_systems(Update, record_mode_changes)
        .add_systems(EguiPrimaryContextPass, ui)
        .add_observer(init_player_mesh)
        .add_observer(init_obstacle_mesh)
        .run();
}

const CHARACTER_PATH: &str = "character-large-male.glb";

fn init_player_mesh(add: On<Add, Player>, mut commands: Commands, asset_server: Res<AssetServer>) {
    let scene: Handle<Scene> = asset_server.load(format!("{}#Scene0", CHARACTER_PATH));
    commands.entity(add.entity).with_children(|commands| {
        commands.spawn((
            SceneRoot(scene),
            Transform::from_xyz(0.0, -PLAYER_SHAPE.half_height, 0.0),
        ));
    });
}

fn obstacle_color(kind: ObstacleKind) -> Color {
    match kind {
        ObstacleKind::Floor => Color::WHITE,
        ObstacleKind::Wall => Color::srgb_u8(124, 144, 255),
        ObstacleKind::Ledge => Color::srgb_u8(255, 170, 90),
    }
}

fn init_obstacle_mesh(
    add: On<Add, Obstacle>,
    mut commands: Commands,
    obstacles: Query<&Obstacle>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Ok(obstacle) = obstacles.get(add.entity) else {
        return;
    };
    let size = obstacle.half_extents * 2.0;
    commands.entity(add.entity).insert((
        Mesh3d(meshes.add(Cuboid::new(size.x, size.y, size.z))),
        MeshMaterial3d(materials.add(obstacle_color(obstacle.kind))),
    ));
}

/// Set up lighting for the course
fn setup(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 12.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        PointLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0),
    ));
}

/// Most recent parkour transitions, newest first.
#[derive(Resource, Default)]
struct ModeHistory(VecDeque<(ParkourMode, ParkourMode)>);

const MODE_HISTORY_LEN: usize = 8;

fn record_mode_changes(
    mut changes: MessageReader<ParkourModeChanged>,
    mut history: ResMut<ModeHistory>,
) {
    for change in changes.read() {
        history.0.push_front((change.previous, change.current));
        history.0.truncate(MODE_HISTORY_LEN);
    }
}

fn ui(world: &mut World) {
    let Ok(egui_context) = world
        .query_filtered::<&mut EguiContext, With<PrimaryEguiContext>>()
        .single(world)
    else {
        return;
    };
    let mut egui_context = egui_context.clone();

    world.resource_scope::<UiState, _>(|world, mut ui_state| {
        ui_state.ui(world, egui_context.get_mut())
    });
}

#[derive(Debug, Default)]
enum EguiWindow {
    GameView,
    #[default]
    Panel,
}

#[derive(Resource)]
struct UiState {
    state: DockState<EguiWindow>,
    viewport_rect: egui::Rect,
}

impl Default for UiState {
    fn default() -> Self {
        let mut state = DockState::new(vec![EguiWindow::GameView]);
        let tree = state.main_surface_mut();
        let [_game, _inspector] =
            tree.split_right(NodeIndex::root(), 0.75, vec![EguiWindow::Panel]);
        UiState {
            state,
            viewport_rect: egui::Rect::NOTHING,
        }
    }
}

impl UiState {
    fn ui(&mut self, world: &mut World, egui_ctx: &mut egui::Context) {
        let mut tab_viewer = TabViewer {
            viewport_rect: &mut self.viewport_rect,
            world,
        };

        DockArea::new(&mut self.state).show(egui_ctx, &mut tab_viewer);
    }
}

struct TabViewer<'a> {
    viewport_rect: &'a mut egui::Rect,
    world: &'a mut World,
}

impl TabViewer<'_> {
    fn parkour_ui(&mut self, ui: &mut egui::Ui) {
        if let Some(state) = self.world.get_resource::<State<ClientState>>() {
            ui.label(format!("Network: {:?}", state.get()));
        }

        let mut statuses = self.world.query_filtered::<&ParkourStatus, With<Player>>();
        for status in statuses.iter(self.world) {
            ui.label(format!(
                "Mode: {:?} (was {:?})",
                status.mode, status.previous
            ));
            ui.label(format!(
                "Grounded: {}  Crouched: {}  Speed: {:.2}",
                status.grounded, status.crouched, status.speed
            ));
        }

        if let Some(history) = self.world.get_resource::<ModeHistory>() {
            for (previous, current) in &history.0 {
                ui.small(format!("{previous:?} -> {current:?}"));
            }
        }
    }
}

impl egui_dock::TabViewer for TabViewer<'_> {
    type Tab = EguiWindow;

    fn ui(&mut self, ui: &mut egui::Ui, tab: &mut Self::Tab) {
        match tab {
            EguiWindow::GameView => *self.viewport_rect = ui.clip_rect(),
            EguiWindow::Panel => {
                ui.label("Parkour Demo");
                ui.label("Use W/S to move, Q/E to strafe, A/D to turn.");
                ui.label("Use SPACE to jump, C to crouch or slide, SHIFT to sprint.");
                ui.label("Hold the right mouse button to look around.");
                ui.separator();
                self.parkour_ui(ui);
                ui.separator();
                ui_for_entities(self.world, ui);
            }
        }
    }

    fn title(&mut self, tab: &mut EguiWindow) -> egui::WidgetText {
        match tab {
            EguiWindow::GameView => "Game View".into(),
            EguiWindow::Panel => "Panel".into(),
        }
    }

    fn clear_background(&self, tab: &Self::Tab) -> bool {
        !matches!(tab, EguiWindow::GameView)
    }
}
