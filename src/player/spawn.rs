use bevy::prelude::*;

use crate::physics::{Body, Collider, LayerMask};
use crate::shared::*;

/// Spawn the player entity at a level-defined position. Called by the level
/// loader whenever a level is (re)built, so it always starts normal-bodied
/// with an empty carry slot.
pub fn spawn_player(commands: &mut Commands, pos: Vec2) -> Entity {
    let body = PlayerBody::default();
    let half = body.normal_half;
    commands
        .spawn((
            Player,
            CarrySlot::default(),
            Body::default(),
            Collider::new(half, LayerMask::PLAYER),
            body,
            // Placeholder sprite — a blue rectangle the size of the body.
            Sprite {
                color: Color::srgb(0.2, 0.5, 0.8),
                custom_size: Some(half * 2.0),
                ..default()
            },
            // Z = 10 so the player draws above terrain.
            Transform::from_translation(pos.extend(10.0)),
            Visibility::default(),
            LevelEntity,
        ))
        .id()
}
