//! Static stage geometry and ambient decoration.

use bevy::prelude::*;

use crate::physics::{Collider, LayerMask, Solid};
use crate::shared::*;

mod fireflies;

pub use fireflies::spawn_fireflies;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            fireflies::drift_fireflies.run_if(in_state(GameState::Playing)),
        );
    }
}

/// A solid, immovable box the player and loose items collide with.
pub fn spawn_platform(commands: &mut Commands, pos: Vec2, half: Vec2) -> Entity {
    commands
        .spawn((
            Solid,
            Collider::new(half, LayerMask::GROUND),
            Sprite {
                color: Color::srgb(0.25, 0.35, 0.3),
                custom_size: Some(half * 2.0),
                ..default()
            },
            Transform::from_translation(pos.extend(1.0)),
            Visibility::default(),
            LevelEntity,
        ))
        .id()
}
