//! Doors: typed key-deposit gates.
//!
//! The deposit itself happens in the player's interact dispatch (doors get
//! first claim on a press). This module owns spawning and the one-way
//! open transition: when `deposited` reaches `required` the blocking
//! collider is disabled permanently and the visual swaps.

use bevy::prelude::*;

use crate::physics::{Collider, LayerMask, Solid};
use crate::shared::*;

pub struct DoorPlugin;

impl Plugin for DoorPlugin {
    fn build(&self, app: &mut App) {
        // Deposits land in the interact dispatch. The open transition must
        // run after it and before the door poll within the same tick, or
        // the final door of a level would never get to open.
        app.add_systems(
            Update,
            sync_door_state
                .in_set(TickSet::Carry)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

pub fn door_half(kind: KeyKind) -> Vec2 {
    match kind {
        KeyKind::Normal => Vec2::new(0.5, 1.0),
        KeyKind::Small => Vec2::new(0.35, 0.6),
    }
}

fn closed_color(kind: KeyKind) -> Color {
    match kind {
        KeyKind::Normal => Color::srgb(0.55, 0.35, 0.18),
        KeyKind::Small => Color::srgb(0.65, 0.5, 0.3),
    }
}

const OPEN_COLOR: Color = Color::srgba(0.55, 0.35, 0.18, 0.25);

pub fn spawn_door(commands: &mut Commands, kind: KeyKind, required: u32, pos: Vec2) -> Entity {
    let half = door_half(kind);
    commands
        .spawn((
            Door::new(kind, required),
            Solid,
            Collider::new(half, LayerMask::GROUND.union(LayerMask::DOOR)),
            Sprite {
                color: closed_color(kind),
                custom_size: Some(half * 2.0),
                ..default()
            },
            Transform::from_translation(pos.extend(4.0)),
            Visibility::default(),
            LevelEntity,
        ))
        .id()
}

/// One-way open transition, driven by `Changed<Door>` after a deposit.
/// The enabled collider doubles as the "not yet announced" latch so the
/// opened event fires exactly once.
pub fn sync_door_state(
    mut doors: Query<(Entity, &Door, &mut Collider, &mut Sprite), Changed<Door>>,
    mut opened: EventWriter<DoorOpenedEvent>,
) {
    for (entity, door, mut collider, mut sprite) in doors.iter_mut() {
        if door.is_open() && collider.enabled {
            collider.enabled = false;
            sprite.color = OPEN_COLOR;
            opened.send(DoorOpenedEvent { door: entity });
            info!("Door opened ({:?}, {} keys)", door.kind, door.required);
        }
    }
}
