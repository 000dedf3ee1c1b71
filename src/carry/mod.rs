//! Carry protocol plumbing: while an object is held, its position is
//! recomputed every tick to rest just above the holder's current top bound.
//!
//! Carried entities are never re-parented; the follow relationship is an
//! explicit holder reference recomputed each tick (carried objects survive
//! holder shape changes — a flattened holder lowers the carried object with
//! it).

use bevy::prelude::*;

use crate::physics::Collider;
use crate::shared::*;

pub struct CarryPlugin;

impl Plugin for CarryPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            carried_follow
                .in_set(TickSet::Carry)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Rest a carried object on top of its holder, flatten-aware.
///
/// A holder whose entity vanished mid-frame (broken by a hazard) simply
/// releases the object — an absorbed fault, not an error.
pub fn carried_follow(
    mut carried: Query<(&mut Carryable, &mut Transform, &Collider), Without<Player>>,
    holders: Query<(&Transform, &PlayerBody), With<Player>>,
) {
    for (mut carryable, mut transform, collider) in carried.iter_mut() {
        if !carryable.held {
            continue;
        }
        let Some(holder) = carryable.holder else {
            carryable.release();
            continue;
        };
        let Ok((holder_tf, body)) = holders.get(holder) else {
            carryable.release();
            continue;
        };

        let top = holder_tf.translation.y + body.active_half().y;
        transform.translation.x = holder_tf.translation.x;
        transform.translation.y = top + collider.half.y + CARRY_CLEARANCE;
    }
}
