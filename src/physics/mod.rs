//! Minimal 2D platformer physics: AABB colliders on a layer mask, gravity
//! bodies, and the shape-overlap / ray-cast queries the gameplay domains
//! lean on (ground checks, pickup scans, drop snapping, monster sight rays).
//!
//! Collision resolution is axis-separated so bodies slide along surfaces,
//! the same approach the player movement uses.

use bevy::prelude::*;

use crate::shared::*;

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            integrate_bodies
                .in_set(TickSet::Movement)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// LAYERS & COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

/// Broad-phase layer bitmask. Ground checks and drop rays filter on GROUND.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const GROUND: LayerMask = LayerMask(1 << 0);
    pub const PLAYER: LayerMask = LayerMask(1 << 1);
    pub const CARRYABLE: LayerMask = LayerMask(1 << 2);
    pub const HAZARD: LayerMask = LayerMask(1 << 3);
    pub const DOOR: LayerMask = LayerMask(1 << 4);

    pub fn contains(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(self, other: LayerMask) -> LayerMask {
        LayerMask(self.0 | other.0)
    }
}

/// Axis-aligned collision box, centred at `transform + offset`.
#[derive(Component, Debug, Clone, Copy)]
pub struct Collider {
    pub half: Vec2,
    pub offset: Vec2,
    pub layer: LayerMask,
    /// Disabled colliders are invisible to every query (open doors).
    pub enabled: bool,
}

impl Collider {
    pub fn new(half: Vec2, layer: LayerMask) -> Self {
        Self {
            half,
            offset: Vec2::ZERO,
            layer,
            enabled: true,
        }
    }

    pub fn center(&self, translation: Vec3) -> Vec2 {
        translation.truncate() + self.offset
    }
}

/// Marker for static blocking geometry (platforms, ground, closed doors).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Solid;

/// Dynamic body integrated by [`integrate_bodies`]. Held carryables are
/// skipped — their position is owned by the carry follow system.
#[derive(Component, Debug, Clone)]
pub struct Body {
    pub velocity: Vec2,
    pub gravity_scale: f32,
    pub grounded: bool,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
            grounded: false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// GEOMETRY QUERIES
// ═══════════════════════════════════════════════════════════════════════

pub fn aabb_overlap(center_a: Vec2, half_a: Vec2, center_b: Vec2, half_b: Vec2) -> bool {
    (center_a.x - center_b.x).abs() < half_a.x + half_b.x
        && (center_a.y - center_b.y).abs() < half_a.y + half_b.y
}

pub fn circle_aabb_overlap(center: Vec2, radius: f32, box_center: Vec2, box_half: Vec2) -> bool {
    let closest = Vec2::new(
        center.x.clamp(box_center.x - box_half.x, box_center.x + box_half.x),
        center.y.clamp(box_center.y - box_half.y, box_center.y + box_half.y),
    );
    center.distance_squared(closest) <= radius * radius
}

/// Cast a ray straight down from `origin` against a set of boxes; returns the
/// highest surface top at or below the origin within `max_dist`.
pub fn raycast_down<I>(origin: Vec2, max_dist: f32, boxes: I) -> Option<f32>
where
    I: IntoIterator<Item = (Vec2, Vec2)>,
{
    let mut best: Option<f32> = None;
    for (center, half) in boxes {
        if origin.x < center.x - half.x || origin.x > center.x + half.x {
            continue;
        }
        let top = center.y + half.y;
        if top > origin.y || origin.y - top > max_dist {
            continue;
        }
        if best.map_or(true, |b| top > b) {
            best = Some(top);
        }
    }
    best
}

/// Horizontal sight ray: does a segment from `origin` in `dir_sign` direction
/// of length `range` cross the given box? Used by monster detection.
pub fn ray_hits_box(origin: Vec2, dir_sign: f32, range: f32, center: Vec2, half: Vec2) -> bool {
    if (origin.y - center.y).abs() > half.y {
        return false;
    }
    let near = (center.x - dir_sign * half.x - origin.x) * dir_sign;
    let far = (center.x + dir_sign * half.x - origin.x) * dir_sign;
    let entry = near.min(far);
    entry >= 0.0 && entry <= range
}

/// Collect `(center, half)` pairs of enabled solids matching a layer mask.
/// Callers pass their own query iteration in — keeps this module free of
/// domain-specific component knowledge.
pub fn solid_boxes<'a>(
    solids: impl IntoIterator<Item = (&'a Transform, &'a Collider)>,
    mask: LayerMask,
) -> Vec<(Vec2, Vec2)> {
    solids
        .into_iter()
        .filter(|(_, c)| c.enabled && c.layer.contains(mask))
        .map(|(t, c)| (c.center(t.translation), c.half))
        .collect()
}

/// Move an AABB by `delta`, axis-separated, against a set of blocking boxes.
/// Returns the admitted delta; a blocked axis also reports contact so the
/// caller can zero velocity (`hit_x`, `hit_y`).
pub fn move_and_collide(
    center: Vec2,
    half: Vec2,
    delta: Vec2,
    blockers: &[(Vec2, Vec2)],
) -> (Vec2, bool, bool) {
    let mut pos = center;
    let mut hit_x = false;
    let mut hit_y = false;

    // X axis
    if delta.x != 0.0 {
        let mut nx = pos.x + delta.x;
        for &(bc, bh) in blockers {
            if (pos.y - bc.y).abs() >= half.y + bh.y {
                continue;
            }
            if delta.x > 0.0 {
                let limit = bc.x - bh.x - half.x;
                if pos.x <= limit && nx > limit {
                    nx = limit;
                    hit_x = true;
                }
            } else {
                let limit = bc.x + bh.x + half.x;
                if pos.x >= limit && nx < limit {
                    nx = limit;
                    hit_x = true;
                }
            }
        }
        pos.x = nx;
    }

    // Y axis
    if delta.y != 0.0 {
        let mut ny = pos.y + delta.y;
        for &(bc, bh) in blockers {
            if (pos.x - bc.x).abs() >= half.x + bh.x {
                continue;
            }
            if delta.y > 0.0 {
                let limit = bc.y - bh.y - half.y;
                if pos.y <= limit && ny > limit {
                    ny = limit;
                    hit_y = true;
                }
            } else {
                let limit = bc.y + bh.y + half.y;
                if pos.y >= limit && ny < limit {
                    ny = limit;
                    hit_y = true;
                }
            }
        }
        pos.y = ny;
    }

    (pos - center, hit_x, hit_y)
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Integrate free bodies (dropped keys, flattened monsters): gravity, then
/// axis-separated collision against ground solids. The player has its own
/// movement system; held carryables are positioned by the carry domain.
pub fn integrate_bodies(
    time: Res<Time>,
    mut bodies: Query<
        (&mut Transform, &mut Body, &Collider, Option<&Carryable>),
        (Without<Player>, Without<Solid>),
    >,
    solids: Query<(&Transform, &Collider), (With<Solid>, Without<Body>)>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    let blockers = solid_boxes(&solids, LayerMask::GROUND);

    for (mut transform, mut body, collider, carryable) in bodies.iter_mut() {
        if carryable.map_or(false, |c| c.held) {
            continue;
        }

        body.velocity.y += GRAVITY * body.gravity_scale * dt;

        let center = collider.center(transform.translation);
        let delta = body.velocity * dt;
        let (admitted, hit_x, hit_y) = move_and_collide(center, collider.half, delta, &blockers);

        transform.translation.x += admitted.x;
        transform.translation.y += admitted.y;

        if hit_x {
            body.velocity.x = 0.0;
        }
        body.grounded = hit_y && body.velocity.y < 0.0;
        if hit_y {
            body.velocity.y = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raycast_down_finds_highest_surface_below() {
        let boxes = vec![
            (Vec2::new(0.0, -2.0), Vec2::new(5.0, 0.5)), // top at -1.5
            (Vec2::new(0.0, -5.0), Vec2::new(5.0, 0.5)), // top at -4.5
        ];
        let hit = raycast_down(Vec2::new(0.0, 1.0), 10.0, boxes);
        assert_eq!(hit, Some(-1.5));
    }

    #[test]
    fn raycast_down_misses_outside_horizontal_extent() {
        let boxes = vec![(Vec2::new(0.0, -2.0), Vec2::new(1.0, 0.5))];
        assert_eq!(raycast_down(Vec2::new(3.0, 0.0), 10.0, boxes), None);
    }

    #[test]
    fn raycast_down_respects_max_distance() {
        let boxes = vec![(Vec2::new(0.0, -20.0), Vec2::new(5.0, 0.5))];
        assert_eq!(raycast_down(Vec2::new(0.0, 0.0), 10.0, boxes), None);
    }

    #[test]
    fn move_and_collide_stops_at_floor() {
        let floor = vec![(Vec2::new(0.0, -1.0), Vec2::new(10.0, 0.5))];
        let (delta, _, hit_y) =
            move_and_collide(Vec2::new(0.0, 0.5), Vec2::new(0.4, 0.5), Vec2::new(0.0, -3.0), &floor);
        assert!(hit_y);
        // Feet land exactly on the floor top (-0.5), centre at 0.0.
        assert!((delta.y - -0.5).abs() < 1e-6);
    }

    #[test]
    fn move_and_collide_slides_along_wall() {
        let wall = vec![(Vec2::new(2.0, 0.0), Vec2::new(0.5, 5.0))];
        let (delta, hit_x, hit_y) =
            move_and_collide(Vec2::new(0.0, 0.0), Vec2::new(0.4, 0.5), Vec2::new(3.0, -0.2), &wall);
        assert!(hit_x);
        assert!(!hit_y);
        assert!((delta.x - 1.1).abs() < 1e-6); // stopped at wall face
        assert!((delta.y - -0.2).abs() < 1e-6); // vertical motion unaffected
    }

    #[test]
    fn sight_ray_hits_box_in_facing_direction_only() {
        let target = (Vec2::new(3.0, 0.0), Vec2::new(0.4, 0.5));
        assert!(ray_hits_box(Vec2::ZERO, 1.0, 4.0, target.0, target.1));
        assert!(!ray_hits_box(Vec2::ZERO, -1.0, 4.0, target.0, target.1));
        assert!(!ray_hits_box(Vec2::ZERO, 1.0, 2.0, target.0, target.1));
        // Vertically offset beyond the box half-height is a miss.
        assert!(!ray_hits_box(Vec2::new(0.0, 2.0), 1.0, 4.0, target.0, target.1));
    }
}
