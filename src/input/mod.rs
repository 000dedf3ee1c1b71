//! Input layer — turns hardware input into game actions once per frame.
//!
//! Runs in `PreUpdate` so every gameplay system sees the same snapshot.
//! `jump` and `interact` are edge-triggered (one press, one action), the
//! move axis is level-sensitive.

use bevy::prelude::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<KeyBindings>();
        app.init_resource::<PlayerInput>();
        app.add_systems(PreUpdate, reset_and_read_input);
    }
}

#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub move_left: KeyCode,
    pub move_right: KeyCode,
    pub jump: KeyCode,
    pub interact: KeyCode,
    pub confirm: KeyCode,
    pub restart: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: KeyCode::KeyA,
            move_right: KeyCode::KeyD,
            jump: KeyCode::Space,
            interact: KeyCode::KeyE,
            confirm: KeyCode::Enter,
            restart: KeyCode::KeyR,
        }
    }
}

/// Per-frame input snapshot consumed by the gameplay domains.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    /// -1.0 / 0.0 / +1.0 horizontal axis.
    pub move_axis: f32,
    pub jump: bool,
    pub interact: bool,
    pub confirm: bool,
    pub restart: bool,
    pub any_key: bool,
}

/// The single point where hardware input becomes game actions.
fn reset_and_read_input(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    mut input: ResMut<PlayerInput>,
) {
    *input = PlayerInput::default();

    input.any_key = keys.get_just_pressed().next().is_some();

    let mut axis = 0.0;
    if keys.pressed(bindings.move_left) || keys.pressed(KeyCode::ArrowLeft) {
        axis -= 1.0;
    }
    if keys.pressed(bindings.move_right) || keys.pressed(KeyCode::ArrowRight) {
        axis += 1.0;
    }
    input.move_axis = axis;

    input.jump = keys.just_pressed(bindings.jump) || keys.just_pressed(KeyCode::ArrowUp);
    input.interact = keys.just_pressed(bindings.interact);
    input.confirm = keys.just_pressed(bindings.confirm) || keys.just_pressed(bindings.jump);
    input.restart = keys.just_pressed(bindings.restart);
}
