//! The flatten body-state machine.
//!
//! Normal and flattened are mutually exclusive configurations; the swap is
//! atomic — collider extents, visual scale, and a vertical correction that
//! keeps the feet planted all change in one step. A permanent flatten sets
//! the lock; a level rebuild spawns a fresh player, and
//! `PlayerBody::force_unflatten` is the explicit escape hatch.

use bevy::prelude::*;

use crate::physics::Collider;
use crate::shared::*;

/// Atomically switch body configurations. Idempotent with respect to the
/// current state, and refuses to un-flatten while the lock is set.
/// Returns whether the state actually changed.
pub fn apply_flatten(
    player: &mut PlayerBody,
    transform: &mut Transform,
    collider: &mut Collider,
    flattened: bool,
) -> bool {
    if player.flattened == flattened {
        return false;
    }
    if !flattened && player.flatten_locked {
        return false;
    }

    // Feet stay planted: the centre shifts by half the height delta.
    let height_delta = player.normal_half.y - player.flattened_half.y;

    player.flattened = flattened;
    collider.half = player.active_half();

    if flattened {
        transform.scale = Vec3::new(FLATTEN_WIDTH_FACTOR, FLATTEN_HEIGHT_FACTOR, 1.0);
        transform.translation.y -= height_delta;
    } else {
        transform.scale = Vec3::ONE;
        transform.translation.y += height_delta;
    }
    true
}

pub fn handle_flatten_events(
    mut events: EventReader<FlattenPlayerEvent>,
    mut query: Query<(&mut PlayerBody, &mut Transform, &mut Collider), With<Player>>,
    mut flattened_events: EventWriter<PlayerFlattenedEvent>,
) {
    for event in events.read() {
        let Ok((mut player, mut transform, mut collider)) = query.get_single_mut() else {
            continue;
        };
        let changed = apply_flatten(&mut player, &mut transform, &mut collider, true);
        if event.permanent {
            player.lock_flatten();
        }
        if changed {
            flattened_events.send(PlayerFlattenedEvent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts() -> (PlayerBody, Transform, Collider) {
        let body = PlayerBody::default();
        let collider = Collider::new(body.normal_half, crate::physics::LayerMask::PLAYER);
        (body, Transform::from_xyz(0.0, 0.5, 10.0), collider)
    }

    #[test]
    fn flatten_is_idempotent() {
        let (mut body, mut tf, mut col) = parts();
        assert!(apply_flatten(&mut body, &mut tf, &mut col, true));
        let y = tf.translation.y;
        assert!(!apply_flatten(&mut body, &mut tf, &mut col, true));
        assert_eq!(tf.translation.y, y, "repeat flatten must not sink further");
    }

    #[test]
    fn flatten_keeps_feet_planted() {
        let (mut body, mut tf, mut col) = parts();
        let feet_before = tf.translation.y - body.active_half().y;
        apply_flatten(&mut body, &mut tf, &mut col, true);
        let feet_after = tf.translation.y - body.active_half().y;
        assert!((feet_before - feet_after).abs() < 1e-6);
        assert_eq!(col.half, body.flattened_half);

        apply_flatten(&mut body, &mut tf, &mut col, false);
        let feet_restored = tf.translation.y - body.active_half().y;
        assert!((feet_before - feet_restored).abs() < 1e-6);
        assert_eq!(col.half, body.normal_half);
        assert_eq!(tf.scale, Vec3::ONE);
    }

    #[test]
    fn lock_refuses_unflatten_until_forced() {
        let (mut body, mut tf, mut col) = parts();
        apply_flatten(&mut body, &mut tf, &mut col, true);
        body.lock_flatten();

        assert!(!apply_flatten(&mut body, &mut tf, &mut col, false));
        assert!(body.flattened);

        body.force_unflatten();
        assert!(apply_flatten(&mut body, &mut tf, &mut col, false));
        assert!(!body.flattened);
    }

    #[test]
    fn flattened_jump_is_disabled() {
        let (mut body, mut tf, mut col) = parts();
        apply_flatten(&mut body, &mut tf, &mut col, true);
        assert_eq!(body.active_jump_velocity(), 0.0);
    }
}
