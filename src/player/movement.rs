//! Core player movement — horizontal run, queued jump, ground detection,
//! and the four-edge boundary clamp.
//!
//! Ordering inside the tick matters: grounded is resolved first, then
//! velocity is set, then collision and the boundary clamp run before the
//! final position commit. The clamp uses the *active* collider half-extents
//! because flattening changes them.

use bevy::prelude::*;

use crate::input::PlayerInput;
use crate::physics::{circle_aabb_overlap, move_and_collide, solid_boxes, Body, Collider, LayerMask, Solid};
use crate::shared::*;

pub fn player_movement(
    time: Res<Time>,
    input: Res<PlayerInput>,
    boundary: Res<Boundary>,
    mut query: Query<
        (
            &mut Transform,
            &mut Body,
            &mut PlayerBody,
            &Collider,
            Option<&KeyBlock>,
        ),
        With<Player>,
    >,
    solids: Query<(&Transform, &Collider), (With<Solid>, Without<Player>)>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    let Ok((mut transform, mut body, mut player, collider, key_block)) = query.get_single_mut()
    else {
        return;
    };

    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    let blockers = solid_boxes(&solids, LayerMask::GROUND);
    // The active collider's half-extents, not a fixed value — flattening
    // swaps the collider under us.
    let half = collider.half;

    // Ground check at the foot anchor. The anchor moves with the flatten
    // state because the flattened body is half as tall.
    let foot = transform.translation.truncate() - Vec2::new(0.0, half.y);
    player.grounded = blockers
        .iter()
        .any(|&(c, h)| circle_aabb_overlap(foot, GROUND_CHECK_RADIUS, c, h));

    // Horizontal velocity follows the axis directly; vertical is preserved.
    body.velocity.x = input.move_axis * player.move_speed;
    if input.move_axis != 0.0 {
        player.facing = Facing::from_sign(input.move_axis);
    }

    // Edge-triggered jump, grounded only. A zero jump velocity (flattened)
    // disables jumping outright.
    if input.jump && player.grounded {
        let v = player.active_jump_velocity();
        if v > 0.0 {
            body.velocity.y = v;
            sfx.send(PlaySfxEvent {
                sfx_id: "jump".to_string(),
            });
        }
    }

    body.velocity.y += GRAVITY * dt;

    // Axis-separated collision for the body box, and for the key block box
    // when a blocking key is carried — the combined silhouette must not clip
    // through low platforms.
    let center = transform.translation.truncate();
    let delta = body.velocity * dt;
    let (mut admitted, mut hit_x, mut hit_y) = move_and_collide(center, half, delta, &blockers);

    if let Some(block) = key_block {
        let block_center = center + Vec2::new(0.0, half.y + block.half.y + CARRY_CLEARANCE);
        let (block_admitted, bx, by) = move_and_collide(block_center, block.half, delta, &blockers);
        if block_admitted.x.abs() < admitted.x.abs() {
            admitted.x = block_admitted.x;
        }
        if block_admitted.y.abs() < admitted.y.abs() {
            admitted.y = block_admitted.y;
        }
        hit_x |= bx;
        hit_y |= by;
    }

    transform.translation.x += admitted.x;
    transform.translation.y += admitted.y;

    if hit_x {
        body.velocity.x = 0.0;
    }
    if hit_y {
        if body.velocity.y < 0.0 {
            player.grounded = true;
        }
        body.velocity.y = 0.0;
    }

    // Boundary clamp, re-derived from the active half-extents every tick.
    // Snaps the position if already past an edge and zeroes velocity on the
    // clamped axis.
    let (clamped, zero_x, zero_y) = clamp_to_boundary(
        transform.translation.truncate(),
        half,
        &boundary,
    );
    transform.translation.x = clamped.x;
    transform.translation.y = clamped.y;
    if zero_x {
        body.velocity.x = 0.0;
    }
    if zero_y {
        body.velocity.y = 0.0;
        if clamped.y > boundary.bottom + half.y - f32::EPSILON
            && clamped.y < boundary.bottom + half.y + f32::EPSILON
        {
            player.grounded = true;
        }
    }
}

/// Clamp a body centre into the boundary rectangle. Returns the corrected
/// position and which axes were clamped.
pub fn clamp_to_boundary(pos: Vec2, half: Vec2, boundary: &Boundary) -> (Vec2, bool, bool) {
    let min_x = boundary.left + half.x;
    let max_x = boundary.right - half.x;
    let min_y = boundary.bottom + half.y;
    let max_y = boundary.top - half.y;

    let clamped = Vec2::new(pos.x.clamp(min_x, max_x), pos.y.clamp(min_y, max_y));
    (clamped, clamped.x != pos.x, clamped.y != pos.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary() -> Boundary {
        Boundary {
            left: -10.0,
            right: 10.0,
            bottom: -5.0,
            top: 5.0,
        }
    }

    #[test]
    fn clamp_snaps_position_already_past_an_edge() {
        let half = Vec2::new(0.4, 0.5);
        let (pos, zero_x, _) = clamp_to_boundary(Vec2::new(-11.0, 0.0), half, &boundary());
        assert_eq!(pos.x, -10.0 + 0.4);
        assert!(zero_x);
    }

    #[test]
    fn clamp_uses_supplied_half_extents() {
        // A flattened body (wider, shorter) clamps at different edges than a
        // normal one from the same centre.
        let normal = Vec2::new(0.4, 0.5);
        let flat = Vec2::new(0.52, 0.25);

        let (p_normal, ..) = clamp_to_boundary(Vec2::new(9.7, 0.0), normal, &boundary());
        let (p_flat, ..) = clamp_to_boundary(Vec2::new(9.7, 0.0), flat, &boundary());
        assert_eq!(p_normal.x, 10.0 - 0.4);
        assert_eq!(p_flat.x, 10.0 - 0.52);

        let (p_bottom, _, zero_y) = clamp_to_boundary(Vec2::new(0.0, -4.9), flat, &boundary());
        assert_eq!(p_bottom.y, -5.0 + 0.25);
        assert!(zero_y);
    }

    #[test]
    fn clamp_inside_region_is_identity() {
        let half = Vec2::new(0.4, 0.5);
        let (pos, zero_x, zero_y) = clamp_to_boundary(Vec2::new(1.0, 2.0), half, &boundary());
        assert_eq!(pos, Vec2::new(1.0, 2.0));
        assert!(!zero_x);
        assert!(!zero_y);
    }
}
