// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

use bevy::{ecs::query::QueryData, input::mouse::MouseMotion, prelude::*};
use bevy_rapier3d::geometry::Group;
use bevy_rapier3d::prelude::*;
use bevy_replicon::prelude::*;
use corsa_model::{ParkourMode, PhysicsMode};
use serde::{Deserialize, Serialize};

use crate::{
    config::ParkourConfig,
    parkour::{CharacterMotor, ParkourBody, ParkourController, facing},
    rapier::{CHARACTER_GROUP, RapierBody},
};

pub struct ParkourControllerPlugin;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
enum ParkourControllerSet {
    Input,
    Grounded,
    Parkour,
    Movement,
}

impl Plugin for ParkourControllerPlugin {
    fn build(&self, app: &mut App) {
        // Inputs are produced as client messages: on a connected client they are sent over the
        // network, and on server/single-player they are emitted locally as `FromClient`.
        app.add_client_message::<ParkourAction>(Channel::Ordered)
            .add_message::<ParkourModeChanged>()
            .register_type::<ParkourController>()
            .register_type::<CharacterMotor>()
            .register_type::<ParkourStatus>()
            .configure_sets(
                Update,
                (
                    ParkourControllerSet::Input,
                    ParkourControllerSet::Grounded,
                    ParkourControllerSet::Parkour,
                    ParkourControllerSet::Movement,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (keyboard_input, gamepad_input, mouse_input).in_set(ParkourControllerSet::Input),
            )
            .add_systems(
                Update,
                update_grounded
                    .in_set(ParkourControllerSet::Grounded)
                    .run_if(has_server_authority),
            )
            .add_systems(
                Update,
                drive_parkour
                    .in_set(ParkourControllerSet::Parkour)
                    .run_if(has_server_authority),
            )
            .add_systems(
                Update,
                apply_motor
                    .in_set(ParkourControllerSet::Movement)
                    .run_if(has_server_authority),
            );
    }
}

/// Returns whether this process should run authoritative simulation.
///
/// In Replicon, `ClientState::Disconnected` means "this app is not acting as a network client",
/// which includes dedicated server and single-player. Connected remote clients are in
/// `Connecting`/`Connected`, so they should not simulate parkour locally and must only send input.
fn has_server_authority(client_state: Res<State<ClientState>>) -> bool {
    *client_state == ClientState::Disconnected
}

/// A [`Message`] written for a player input.
#[derive(Message, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum ParkourAction {
    AddMove(Vec3),
    SetMove(Vec3),
    RotateRight(bool),
    RotateLeft(bool),
    SetRotate(f32),
    Jump,
    CrouchSlide,
    Sprint,
}

/// Written on the server whenever a character switches parkour mode.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParkourModeChanged {
    pub entity: Entity,
    pub previous: ParkourMode,
    pub current: ParkourMode,
}

/// Replicated parkour state used by clients for animation and presentation.
#[derive(Component, Reflect, Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct ParkourStatus {
    pub mode: ParkourMode,
    pub previous: ParkourMode,
    pub grounded: bool,
    pub crouched: bool,
    pub speed: f32,
}

impl ParkourStatus {
    pub fn is_moving(self) -> bool {
        self.speed > 0.1
    }
}

/// Movement input of a character, accumulated from [`ParkourAction`]s.
#[derive(Component, Reflect, Debug, Default, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct ParkourInput {
    /// Requested direction relative to the view: +Z forward, +X left.
    direction: Vec3,
    /// View yaw in radians.
    pub yaw: f32,
    rotating_right: bool,
    rotating_left: bool,
    set_rotation: f32,
}

/// Yaw rate in radians per second at full turn input.
const TURN_SPEED: f32 = 4.0;

impl ParkourInput {
    pub fn add_direction(&mut self, direction: Vec3) {
        self.direction = (self.direction + direction).clamp(Vec3::NEG_ONE, Vec3::ONE);
    }

    /// Applies a movement action. Commands are left to the controller.
    pub fn apply(&mut self, action: ParkourAction) {
        match action {
            ParkourAction::AddMove(direction) => self.add_direction(direction),
            ParkourAction::SetMove(direction) => self.direction = direction,
            ParkourAction::RotateRight(rotating) => self.rotating_right = rotating,
            ParkourAction::RotateLeft(rotating) => self.rotating_left = rotating,
            ParkourAction::SetRotate(rotation) => self.set_rotation = rotation,
            ParkourAction::Jump | ParkourAction::CrouchSlide | ParkourAction::Sprint => (),
        }
    }

    /// Turn input in `[-1, 1]`, positive to the left.
    pub fn turning(&self) -> f32 {
        if self.set_rotation != 0.0 {
            return self.set_rotation;
        }
        match (self.rotating_right, self.rotating_left) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    pub fn turn(&mut self, delta: f32) {
        self.yaw += self.turning() * TURN_SPEED * delta;
    }

    /// Movement input in world space.
    pub fn world_direction(&self) -> Vec3 {
        let direction = Vec3::new(self.direction.x, 0.0, self.direction.z).clamp_length_max(1.0);
        Quat::from_rotation_y(self.yaw) * direction
    }
}

/// Collision and sensing dimensions of a character.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct CharacterShape {
    pub radius: f32,
    /// Half of the full height, caps included.
    pub half_height: f32,
    /// Height of the eyes above the center.
    pub eye_height: f32,
    /// Steepest walkable slope in radians.
    pub max_slope_angle: f32,
}

impl CharacterShape {
    pub fn collider(&self) -> Collider {
        Collider::capsule_y((self.half_height - self.radius).max(0.0), self.radius)
    }
}

/// A smooth move to a pose requested by the parkour controller.
#[derive(Component, Reflect, Debug, Default, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct PoseCorrection {
    from: (Vec3, Quat),
    to: (Vec3, Quat),
    duration: f32,
    elapsed: f32,
    active: bool,
}

impl PoseCorrection {
    pub fn start(
        &mut self,
        location: Vec3,
        rotation: Quat,
        target: Vec3,
        target_rotation: Quat,
        duration: f32,
    ) {
        *self = Self {
            from: (location, rotation),
            to: (target, target_rotation),
            duration,
            elapsed: 0.0,
            active: true,
        };
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advances the move, returning the pose to apply if one is ongoing.
    pub fn advance(&mut self, delta: f32) -> Option<(Vec3, Quat)> {
        if !self.active {
            return None;
        }
        self.elapsed += delta;
        let t = if self.duration > 0.0 {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if t >= 1.0 {
            self.active = false;
        }
        Some((
            self.from.0.lerp(self.to.0, t),
            self.from.1.slerp(self.to.1, t),
        ))
    }
}

/// Vertical speed of a physical jump.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct JumpImpulse(pub f32);

/// A bundle that contains the components needed for a parkour character.
#[derive(Bundle)]
pub struct ParkourCharacterBundle {
    controller: ParkourController,
    motor: CharacterMotor,
    shape: CharacterShape,
    collider: Collider,
    body: RigidBody,
    velocity: Velocity,
    locked_axes: LockedAxes,
    gravity_scale: GravityScale,
    collision_groups: CollisionGroups,
    mass: ReadMassProperties,
    correction: PoseCorrection,
    input: ParkourInput,
    status: ParkourStatus,
    jump_impulse: JumpImpulse,
}

impl ParkourCharacterBundle {
    pub fn new(config: ParkourConfig, shape: CharacterShape, motor: CharacterMotor) -> Self {
        Self {
            controller: ParkourController::new(config),
            gravity_scale: GravityScale(motor.gravity_scale),
            motor,
            collider: shape.collider(),
            shape,
            body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            // Rotation is driven by the motor only.
            locked_axes: LockedAxes::ROTATION_LOCKED,
            collision_groups: CollisionGroups::new(CHARACTER_GROUP, Group::ALL),
            mass: ReadMassProperties::default(),
            correction: PoseCorrection::default(),
            input: ParkourInput::default(),
            status: ParkourStatus::default(),
            jump_impulse: JumpImpulse(8.0),
        }
    }
}

/// Sends [`ParkourAction`] messages based on keyboard input.
fn keyboard_input(
    mut action_writer: MessageWriter<ParkourAction>,
    keyboard_input: Res<ButtonInput<KeyCode>>,
) {
    let moves: [(&[KeyCode], Vec3); 4] = [
        (&[KeyCode::KeyW, KeyCode::ArrowUp], Vec3::Z),
        (&[KeyCode::KeyS, KeyCode::ArrowDown], Vec3::NEG_Z),
        (&[KeyCode::KeyQ], Vec3::X),
        (&[KeyCode::KeyE], Vec3::NEG_X),
    ];
    for (keys, direction) in moves {
        if keyboard_input.any_just_pressed(keys.iter().copied()) {
            action_writer.write(ParkourAction::AddMove(direction));
        }
        // Undo the move on release
        if keyboard_input.any_just_released(keys.iter().copied()) {
            action_writer.write(ParkourAction::AddMove(-direction));
        }
    }

    let rotate_left = [KeyCode::KeyA, KeyCode::ArrowLeft];
    if keyboard_input.any_just_pressed(rotate_left) {
        action_writer.write(ParkourAction::RotateLeft(true));
    }
    if keyboard_input.any_just_released(rotate_left) {
        action_writer.write(ParkourAction::RotateLeft(false));
    }
    let rotate_right = [KeyCode::KeyD, KeyCode::ArrowRight];
    if keyboard_input.any_just_pressed(rotate_right) {
        action_writer.write(ParkourAction::RotateRight(true));
    }
    if keyboard_input.any_just_released(rotate_right) {
        action_writer.write(ParkourAction::RotateRight(false));
    }

    if keyboard_input.just_pressed(KeyCode::Space) {
        action_writer.write(ParkourAction::Jump);
    }
    if keyboard_input.any_just_pressed([KeyCode::KeyC, KeyCode::ControlLeft]) {
        action_writer.write(ParkourAction::CrouchSlide);
    }
    if keyboard_input.just_pressed(KeyCode::ShiftLeft) {
        action_writer.write(ParkourAction::Sprint);
    }
}

/// Sends [`ParkourAction`] messages based on gamepad input.
fn gamepad_input(mut action_writer: MessageWriter<ParkourAction>, gamepads: Query<&Gamepad>) {
    for gamepad in gamepads.iter() {
        if let (Some(x), Some(y)) = (
            gamepad.get(GamepadAxis::LeftStickX),
            gamepad.get(GamepadAxis::LeftStickY),
        ) {
            action_writer.write(ParkourAction::SetMove(Vec3::new(-x, 0.0, y)));
        }
        if let Some(x) = gamepad.get(GamepadAxis::RightStickX) {
            action_writer.write(ParkourAction::SetRotate(-x));
        }

        if gamepad.just_pressed(GamepadButton::South) {
            action_writer.write(ParkourAction::Jump);
        }
        if gamepad.just_pressed(GamepadButton::East) {
            action_writer.write(ParkourAction::CrouchSlide);
        }
        if gamepad.just_pressed(GamepadButton::LeftThumb) {
            action_writer.write(ParkourAction::Sprint);
        }
    }
}

fn mouse_input(
    mut action_writer: MessageWriter<ParkourAction>,
    mut mouse_reader: MessageReader<MouseMotion>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
) {
    // Hold RMB to look around
    if mouse_buttons.just_released(MouseButton::Right) {
        action_writer.write(ParkourAction::SetRotate(0.0));
        return;
    }

    if !mouse_buttons.pressed(MouseButton::Right) {
        mouse_reader.clear();
        return;
    }

    let delta: Vec2 = mouse_reader.read().map(|motion| motion.delta).sum();
    let sensitivity = 0.125;
    action_writer.write(ParkourAction::SetRotate(-delta.x * sensitivity));
}

/// Distance below the capsule within which a character stands on the ground.
const GROUND_PROBE_DISTANCE: f32 = 0.15;
/// Characters rising faster than this are never grounded.
const MAX_GROUNDED_RISE: f32 = 1.0;

/// Updates the grounded flag of every parkour character.
fn update_grounded(
    rapier_context: ReadRapierContext,
    mut characters: Query<(
        Entity,
        &Transform,
        &Velocity,
        &CharacterShape,
        &mut ParkourStatus,
    )>,
) {
    let Ok(rapier_context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, velocity, shape, mut status) in &mut characters {
        let origin = transform.translation - Vec3::Y * (shape.half_height - 0.01);
        let filter = QueryFilter::default()
            .exclude_rigid_body(entity)
            .exclude_sensors();

        let grounded = velocity.linvel.y <= MAX_GROUNDED_RISE
            && rapier_context
                .cast_ray_and_get_normal(origin, Vec3::NEG_Y, GROUND_PROBE_DISTANCE, true, filter)
                .is_some_and(|(_, intersection)| {
                    intersection.normal.angle_between(Vec3::Y).abs() <= shape.max_slope_angle
                });

        if status.grounded != grounded {
            status.grounded = grounded;
        }
    }
}

/// Physics mode of a character given its motor mode and ground contact.
///
/// Disabled movement stays disabled until the parkour controller sets a mode again.
pub fn detect_physics_mode(motor: PhysicsMode, grounded: bool) -> PhysicsMode {
    match motor {
        PhysicsMode::None => PhysicsMode::None,
        _ if grounded => PhysicsMode::Walking,
        _ => PhysicsMode::Falling,
    }
}

/// Tells the controller about a physics mode switch, landing first when touching down.
fn sync_physics_mode(controller: &mut ParkourController, body: &mut RapierBody, grounded: bool) {
    let current = detect_physics_mode(body.physics_mode(), grounded);
    body.set_physics_mode(current);

    let (_, reported) = controller.physics_modes();
    if current == reported {
        return;
    }
    if reported == PhysicsMode::Falling && current == PhysicsMode::Walking {
        controller.land(body);
    }
    controller.on_physics_mode_changed(body, reported, current);
}

#[derive(QueryData)]
#[query_data(mutable)]
struct ParkourData {
    entity: Entity,
    shape: &'static CharacterShape,
    mass: &'static ReadMassProperties,
    jump_impulse: &'static JumpImpulse,
    transform: &'static mut Transform,
    velocity: &'static mut Velocity,
    motor: &'static mut CharacterMotor,
    correction: &'static mut PoseCorrection,
    input: &'static mut ParkourInput,
    controller: &'static mut ParkourController,
    status: &'static mut ParkourStatus,
}

/// Feeds client input to the parkour controllers and ticks them.
///
/// This runs only when [`has_server_authority`] is true, so parkour is simulated on server and
/// single-player, while connected clients only send input.
fn drive_parkour(
    time: Res<Time>,
    rapier_context: ReadRapierContext,
    mut action_reader: MessageReader<FromClient<ParkourAction>>,
    mut mode_changes: MessageWriter<ParkourModeChanged>,
    mut characters: Query<ParkourData>,
) {
    let actions: Vec<ParkourAction> = action_reader.read().map(|action| action.message).collect();
    let Ok(context) = rapier_context.single() else {
        return;
    };
    let delta = time.delta_secs();

    for mut data in &mut characters {
        for action in &actions {
            data.input.apply(*action);
        }
        data.input.turn(delta);
        data.motor.last_input = data.input.world_direction();

        let grounded = data.status.grounded;
        let jump_impulse = data.jump_impulse.0;
        let controller = &mut *data.controller;
        let mut body = RapierBody {
            entity: data.entity,
            context: &context,
            shape: data.shape,
            mass: data.mass.get().mass,
            transform: &mut data.transform,
            velocity: &mut data.velocity,
            motor: &mut data.motor,
            correction: &mut data.correction,
        };

        if !controller.is_initialized() {
            controller.initialize(&body);
        }
        sync_physics_mode(controller, &mut body, grounded);

        for action in &actions {
            match action {
                ParkourAction::Jump => {
                    let was_walking = body.is_walking();
                    controller.jump(&mut body);
                    if was_walking && !controller.mode().is_aerial() {
                        body.launch(Vec3::Y * jump_impulse, false, true);
                    }
                }
                ParkourAction::CrouchSlide => controller.crouch_slide(&mut body),
                ParkourAction::Sprint => controller.sprint(&mut body),
                _ => (),
            }
        }

        controller.tick(&mut body, delta);

        for change in controller.drain_mode_changes() {
            mode_changes.write(ParkourModeChanged {
                entity: data.entity,
                previous: change.previous,
                current: change.current,
            });
        }

        let status = ParkourStatus {
            mode: controller.mode(),
            previous: controller.previous_mode(),
            grounded,
            crouched: data.motor.crouched,
            speed: data.velocity.linvel.length(),
        };
        data.status.set_if_neq(status);
    }
}

/// Share of the walking acceleration available in the air.
const AIR_CONTROL: f32 = 0.05;
/// How fast the character turns towards its movement, in radians per second.
const ORIENT_SPEED: f32 = 10.0;

/// Horizontal velocity after one step of walking.
///
/// Below the speed limit input accelerates towards it, scaled by friction. Without input or
/// above the limit the velocity loses friction and braking deceleration.
pub fn walk_velocity(motor: &CharacterMotor, horizontal: Vec3, delta: f32) -> Vec3 {
    let max_speed = if motor.crouched {
        motor.max_crouch_speed
    } else {
        motor.max_walk_speed
    };
    let input = motor.last_input.with_y(0.0).clamp_length_max(1.0);
    let speed = horizontal.length();

    if input != Vec3::ZERO && speed <= max_speed {
        let alpha = (motor.ground_friction * delta).clamp(0.0, 1.0);
        return horizontal + (input * max_speed - horizontal) * alpha;
    }

    let friction = (motor.ground_friction * delta).clamp(0.0, 1.0);
    let slowed = horizontal * (1.0 - friction);
    let floor = if input == Vec3::ZERO { 0.0 } else { max_speed };
    let braked = (slowed.length() - motor.braking_deceleration * delta).max(floor);
    slowed.normalize_or_zero() * braked.min(slowed.length())
}

/// Turns the motor into velocity, gravity and rotation for the rigid body.
fn apply_motor(
    time: Res<Time>,
    mut characters: Query<(
        &mut Transform,
        &mut Velocity,
        &mut GravityScale,
        &CharacterMotor,
        &mut PoseCorrection,
        &ParkourInput,
    )>,
) {
    let delta = time.delta_secs();

    for (mut transform, mut velocity, mut gravity, motor, mut correction, input) in &mut characters
    {
        if let Some((location, rotation)) = correction.advance(delta) {
            transform.translation = location;
            transform.rotation = rotation;
        }

        let horizontal = velocity.linvel.with_y(0.0);
        match motor.physics_mode {
            PhysicsMode::None => {
                velocity.linvel = Vec3::ZERO;
                gravity.0 = 0.0;
            }
            PhysicsMode::Walking => {
                let walked = walk_velocity(motor, horizontal, delta);
                velocity.linvel = walked.with_y(velocity.linvel.y);
                gravity.0 = motor.gravity_scale;
            }
            PhysicsMode::Falling => {
                let target = motor.last_input.with_y(0.0).clamp_length_max(1.0)
                    * motor.max_walk_speed;
                let alpha = (AIR_CONTROL * motor.ground_friction * delta).clamp(0.0, 1.0);
                if target != Vec3::ZERO && horizontal.length() <= motor.max_walk_speed {
                    let steered = horizontal + (target - horizontal) * alpha;
                    velocity.linvel = steered.with_y(velocity.linvel.y);
                }
                gravity.0 = motor.gravity_scale;
            }
        }

        if let Some(normal) = motor.plane_constraint {
            let along = velocity.linvel.dot(normal);
            velocity.linvel -= normal * along;
        }

        if correction.is_active() {
            continue;
        }
        if motor.use_controller_rotation_yaw {
            transform.rotation = Quat::from_rotation_y(input.yaw);
        } else if motor.orient_rotation_to_movement
            && motor.last_input != Vec3::ZERO
            && let Some(target) = facing(velocity.linvel)
        {
            let alpha = (ORIENT_SPEED * delta).clamp(0.0, 1.0);
            transform.rotation = transform.rotation.slerp(target, alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motor() -> CharacterMotor {
        CharacterMotor {
            last_input: Vec3::Z,
            ..default()
        }
    }

    #[test]
    fn walking_accelerates_towards_max_speed() {
        let motor = motor();
        let mut velocity = Vec3::ZERO;
        for _ in 0..120 {
            velocity = walk_velocity(&motor, velocity, 1.0 / 60.0);
        }
        assert!((velocity.z - motor.max_walk_speed).abs() < 1.0);
    }

    #[test]
    fn walking_without_input_brakes_to_a_stop() {
        let motor = CharacterMotor::default();
        let mut velocity = Vec3::new(0.0, 0.0, 600.0);
        for _ in 0..60 {
            velocity = walk_velocity(&motor, velocity, 1.0 / 60.0);
        }
        assert_eq!(velocity, Vec3::ZERO);
    }

    #[test]
    fn frictionless_overspeed_only_brakes() {
        let motor = CharacterMotor {
            ground_friction: 0.0,
            braking_deceleration: 600.0,
            crouched: true,
            ..motor()
        };
        let velocity = walk_velocity(&motor, Vec3::new(0.0, 0.0, 1200.0), 0.5);
        assert!((velocity.z - 900.0).abs() < 1e-3);
        // Never braked below the limit while pushing.
        let velocity = walk_velocity(&motor, Vec3::new(0.0, 0.0, 310.0), 0.5);
        assert!((velocity.z - 300.0).abs() < 1e-3);
    }

    #[test]
    fn disabled_movement_ignores_the_ground() {
        assert_eq!(detect_physics_mode(PhysicsMode::None, true), PhysicsMode::None);
        assert_eq!(
            detect_physics_mode(PhysicsMode::Falling, true),
            PhysicsMode::Walking
        );
        assert_eq!(
            detect_physics_mode(PhysicsMode::Walking, false),
            PhysicsMode::Falling
        );
    }

    #[test]
    fn input_direction_follows_view_yaw() {
        let mut input = ParkourInput::default();
        input.apply(ParkourAction::AddMove(Vec3::Z));
        input.apply(ParkourAction::AddMove(Vec3::Z));
        input.yaw = std::f32::consts::FRAC_PI_2;
        assert!(input.world_direction().distance(Vec3::X) < 1e-5);

        input.apply(ParkourAction::AddMove(Vec3::NEG_Z));
        assert_eq!(input.world_direction().length(), 0.0);
    }

    #[test]
    fn mouse_rotation_overrides_keys() {
        let mut input = ParkourInput::default();
        input.apply(ParkourAction::RotateRight(true));
        assert_eq!(input.turning(), -1.0);
        input.apply(ParkourAction::RotateLeft(true));
        assert_eq!(input.turning(), 0.0);
        input.apply(ParkourAction::SetRotate(0.5));
        assert_eq!(input.turning(), 0.5);
    }

    #[test]
    fn pose_correction_reaches_its_target() {
        let mut correction = PoseCorrection::default();
        assert!(correction.advance(0.1).is_none());

        let target = Quat::from_rotation_y(1.0);
        correction.start(Vec3::ZERO, Quat::IDENTITY, Vec3::X, target, 0.1);
        let (halfway, _) = correction.advance(0.05).unwrap();
        assert!(halfway.distance(Vec3::X * 0.5) < 1e-5);
        let (location, rotation) = correction.advance(0.05).unwrap();
        assert!(location.distance(Vec3::X) < 1e-5);
        assert!(rotation.angle_between(target) < 1e-4);
        assert!(!correction.is_active());
    }
}
