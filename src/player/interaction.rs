//! Interact dispatch (E key). Doors get first claim on a press; a deposit
//! ends the interaction. Otherwise a carried object is dropped, or — when
//! the slot is empty — the first not-yet-held carryable in reach is picked
//! up. Pickup and drop are mutually exclusive per press.

use bevy::prelude::*;

use crate::input::PlayerInput;
use crate::physics::{circle_aabb_overlap, Collider};
use crate::shared::*;

pub fn player_interact(
    input: Res<PlayerInput>,
    mut commands: Commands,
    mut player_query: Query<(Entity, &Transform, &PlayerBody, &mut CarrySlot), With<Player>>,
    mut doors: Query<(&Transform, &mut Door, &Collider), Without<Player>>,
    keys: Query<&Key>,
    mut carryables: Query<
        (Entity, &Transform, &mut Carryable, &Collider),
        (Without<Player>, Without<Door>),
    >,
    mut picked_up: EventWriter<PickedUpEvent>,
    mut dropped: EventWriter<DroppedEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    if !input.interact {
        return;
    }
    let Ok((player_entity, transform, body, mut slot)) = player_query.get_single_mut() else {
        return;
    };

    let pos = transform.translation.truncate();
    let reach = body.reach();

    // 1. Doors first: any door in reach may consume the carried key.
    for (door_tf, mut door, door_col) in doors.iter_mut() {
        if !door_col.enabled
            || !circle_aabb_overlap(pos, reach, door_col.center(door_tf.translation), door_col.half)
        {
            continue;
        }
        let Some(item) = slot.0 else {
            break; // empty-handed: no door can accept, fall through
        };
        let Ok(key) = keys.get(item) else {
            continue; // carrying a monster, or the key vanished mid-frame
        };
        if door.try_deposit(key.kind) {
            // Consume the key: the entity is destroyed, not dropped.
            if key.blocking {
                commands.entity(player_entity).remove::<KeyBlock>();
            }
            commands.entity(item).despawn();
            slot.0 = None;
            sfx.send(PlaySfxEvent {
                sfx_id: "deposit".to_string(),
            });
            return; // a successful deposit ends the interaction
        }
    }

    // 2. Carrying something: drop it. A stale reference (entity destroyed
    // by another hazard this frame) is discarded silently.
    if let Some(item) = slot.0 {
        if let Ok((_, _, mut carryable, _)) = carryables.get_mut(item) {
            carryable.release();
            dropped.send(DroppedEvent {
                item,
                holder: player_entity,
            });
            sfx.send(PlaySfxEvent {
                sfx_id: "drop".to_string(),
            });
        }
        slot.0 = None;
        return;
    }

    // 3. Empty slot: pick up the first unheld carryable in reach.
    for (entity, item_tf, mut carryable, item_col) in carryables.iter_mut() {
        if !circle_aabb_overlap(pos, reach, item_col.center(item_tf.translation), item_col.half) {
            continue;
        }
        if carryable.pick_up(player_entity) {
            slot.0 = Some(entity);
            picked_up.send(PickedUpEvent {
                item: entity,
                holder: player_entity,
            });
            sfx.send(PlaySfxEvent {
                sfx_id: "pickup".to_string(),
            });
            break;
        }
    }
}
