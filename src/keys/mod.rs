//! Key entities: carryable, consumable, breakable.
//!
//! A Normal key hit by a hammer shatters into two Small keys; Small keys are
//! inert to breaking. Dropped keys snap to the nearest ground surface below
//! the holder via a downward ray, with a conservative fallback when no
//! ground is found.

use bevy::prelude::*;
use std::collections::HashSet;

use crate::physics::{raycast_down, solid_boxes, Body, Collider, LayerMask, Solid};
use crate::shared::*;

pub struct KeyPlugin;

impl Plugin for KeyPlugin {
    fn build(&self, app: &mut App) {
        // Pickup/drop events come out of the interact dispatch, so these
        // reactions run in the post-interact bucket of the same tick.
        app.add_systems(
            Update,
            (on_key_picked_up, on_key_dropped, handle_key_break)
                .chain()
                .in_set(TickSet::Carry)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

pub fn key_half(kind: KeyKind) -> Vec2 {
    match kind {
        KeyKind::Normal => Vec2::new(0.25, 0.25),
        KeyKind::Small => Vec2::new(0.15, 0.15),
    }
}

fn key_color(kind: KeyKind) -> Color {
    match kind {
        KeyKind::Normal => Color::srgb(0.9, 0.75, 0.2),
        KeyKind::Small => Color::srgb(0.95, 0.88, 0.55),
    }
}

/// Spawn a key at a world position. Used by the level loader and by
/// Normal-key breakage.
pub fn spawn_key(commands: &mut Commands, kind: KeyKind, blocking: bool, pos: Vec2) -> Entity {
    let half = key_half(kind);
    commands
        .spawn((
            Key { kind, blocking },
            Carryable::default(),
            Collider::new(half, LayerMask::CARRYABLE),
            Body::default(),
            Sprite {
                color: key_color(kind),
                custom_size: Some(half * 2.0),
                ..default()
            },
            Transform::from_translation(pos.extend(5.0)),
            Visibility::default(),
            LevelEntity,
        ))
        .id()
}

/// A picked-up key stops colliding; a blocking key additionally grows the
/// holder's silhouette with an overhead block box.
pub fn on_key_picked_up(
    mut events: EventReader<PickedUpEvent>,
    mut keys: Query<(&Key, &mut Collider, &mut Body)>,
    mut commands: Commands,
) {
    for event in events.read() {
        let Ok((key, mut collider, mut body)) = keys.get_mut(event.item) else {
            continue;
        };
        collider.enabled = false;
        body.velocity = Vec2::ZERO;
        if key.blocking {
            commands.entity(event.holder).insert(KeyBlock {
                half: collider.half,
            });
        }
    }
}

/// A dropped key re-collides and rests on the nearest surface below the
/// holder. No ground within probe range falls back to the holder's own
/// lower bound rather than failing the drop.
pub fn on_key_dropped(
    mut events: EventReader<DroppedEvent>,
    mut keys: Query<(&Key, &mut Collider, &mut Body, &mut Transform), Without<Player>>,
    holders: Query<(&Transform, &PlayerBody), With<Player>>,
    solids: Query<(&Transform, &Collider), (With<Solid>, Without<Key>)>,
    mut commands: Commands,
) {
    for event in events.read() {
        let Ok((key, mut collider, mut body, mut transform)) = keys.get_mut(event.item) else {
            continue;
        };
        collider.enabled = true;
        body.velocity = Vec2::ZERO;
        if key.blocking {
            commands.entity(event.holder).remove::<KeyBlock>();
        }

        let Ok((holder_tf, holder_body)) = holders.get(event.holder) else {
            continue;
        };
        let origin = holder_tf.translation.truncate();
        let ground = solid_boxes(&solids, LayerMask::GROUND);
        let rest_y = match raycast_down(origin, GROUND_PROBE_DISTANCE, ground) {
            Some(top) => top + collider.half.y,
            None => origin.y - holder_body.active_half().y + collider.half.y,
        };
        transform.translation.x = origin.x;
        transform.translation.y = rest_y;
    }
}

/// Break a Normal key: force-drop it if held, spawn two ground-snapped Small
/// keys at fixed lateral offsets, destroy the original. Small keys ignore
/// the event entirely.
pub fn handle_key_break(
    mut events: EventReader<KeyBreakEvent>,
    keys: Query<(&Key, &Transform, &Carryable, &Collider)>,
    mut holders: Query<&mut CarrySlot>,
    solids: Query<(&Transform, &Collider), (With<Solid>, Without<Key>)>,
    mut commands: Commands,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    let mut broken: HashSet<Entity> = HashSet::new();

    for event in events.read() {
        if !broken.insert(event.key) {
            continue; // two hazards reported the same key this frame
        }
        let Ok((key, transform, carryable, _collider)) = keys.get(event.key) else {
            continue; // already destroyed out-of-band
        };
        if key.kind != KeyKind::Normal {
            continue;
        }

        // Force-drop: clear the holder's slot and block box before the
        // entity goes away so no stale reference survives the frame.
        if carryable.held {
            if let Some(holder) = carryable.holder {
                if let Ok(mut slot) = holders.get_mut(holder) {
                    if slot.0 == Some(event.key) {
                        slot.0 = None;
                    }
                }
                if key.blocking {
                    commands.entity(holder).remove::<KeyBlock>();
                }
            }
        }

        let at = transform.translation.truncate();
        let ground = solid_boxes(&solids, LayerMask::GROUND);
        for dx in [-KEY_BREAK_OFFSET, KEY_BREAK_OFFSET] {
            let x = at.x + dx;
            let half = key_half(KeyKind::Small);
            let y = match raycast_down(Vec2::new(x, at.y), GROUND_PROBE_DISTANCE, ground.clone()) {
                Some(top) => top + half.y,
                // Keep the break height when no ground is below.
                None => at.y,
            };
            spawn_key(&mut commands, KeyKind::Small, false, Vec2::new(x, y));
        }

        commands.entity(event.key).despawn();
        sfx.send(PlaySfxEvent {
            sfx_id: "key_break".to_string(),
        });
    }
}
