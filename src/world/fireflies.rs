//! Decorative fireflies. Each one drifts toward a random target inside the
//! stage bounds and picks a fresh target on arrival or when its wander
//! timer runs out, so a swarm never moves in lockstep. Purely cosmetic.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;

/// A target counts as reached within this distance.
const ARRIVE_DISTANCE: f32 = 0.1;
/// Margin kept between a target and the stage edges.
const EDGE_MARGIN: f32 = 0.5;

#[derive(Component, Debug, Clone)]
pub struct Firefly {
    target: Vec2,
    speed: f32,
    retarget_in: f32,
}

fn random_point(boundary: &Boundary, rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        rng.gen_range(boundary.left + EDGE_MARGIN..boundary.right - EDGE_MARGIN),
        rng.gen_range(boundary.bottom + EDGE_MARGIN..boundary.top - EDGE_MARGIN),
    )
}

impl Firefly {
    fn randomized(boundary: &Boundary, rng: &mut impl Rng) -> Self {
        Self {
            target: random_point(boundary, rng),
            speed: rng.gen_range(0.4..1.1),
            retarget_in: rng.gen_range(1.0..3.0),
        }
    }

    /// One wander step: move toward the target, retarget on arrival or when
    /// the timer expires.
    fn step(&mut self, pos: &mut Vec2, dt: f32, boundary: &Boundary, rng: &mut impl Rng) {
        self.retarget_in -= dt;
        let to_target = self.target - *pos;
        if to_target.length() < ARRIVE_DISTANCE || self.retarget_in <= 0.0 {
            self.target = random_point(boundary, rng);
            self.retarget_in = rng.gen_range(1.0..3.0);
            return;
        }
        *pos += to_target.normalize() * (self.speed * dt).min(to_target.length());
    }
}

pub fn spawn_fireflies(commands: &mut Commands, boundary: &Boundary, count: u32) {
    let mut rng = rand::thread_rng();
    for _ in 0..count {
        let start = random_point(boundary, &mut rng);
        commands.spawn((
            Firefly::randomized(boundary, &mut rng),
            Sprite {
                color: Color::srgba(1.0, 0.95, 0.5, 0.8),
                custom_size: Some(Vec2::splat(0.16)),
                ..default()
            },
            Transform::from_translation(start.extend(2.0)),
            Visibility::default(),
            LevelEntity,
        ));
    }
}

pub fn drift_fireflies(
    time: Res<Time>,
    boundary: Res<Boundary>,
    mut fireflies: Query<(&mut Firefly, &mut Transform)>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }
    let mut rng = rand::thread_rng();
    for (mut firefly, mut transform) in fireflies.iter_mut() {
        let mut pos = transform.translation.truncate();
        firefly.step(&mut pos, dt, &boundary, &mut rng);
        transform.translation.x = pos.x;
        transform.translation.y = pos.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bounds() -> Boundary {
        Boundary {
            left: -5.0,
            right: 5.0,
            bottom: 0.0,
            top: 6.0,
        }
    }

    #[test]
    fn wander_stays_inside_the_bounds_and_retargets() {
        let boundary = bounds();
        let mut rng = StdRng::seed_from_u64(7);
        let mut firefly = Firefly::randomized(&boundary, &mut rng);
        let mut pos = firefly.target;
        let first_target = firefly.target;

        let mut retargeted = false;
        for _ in 0..2000 {
            firefly.step(&mut pos, 0.016, &boundary, &mut rng);
            assert!(pos.x >= boundary.left && pos.x <= boundary.right);
            assert!(pos.y >= boundary.bottom && pos.y <= boundary.top);
            retargeted |= firefly.target != first_target;
        }
        assert!(retargeted, "a wander this long must pick a new target");
    }

    #[test]
    fn step_never_overshoots_the_target() {
        let boundary = bounds();
        let mut rng = StdRng::seed_from_u64(11);
        let mut firefly = Firefly::randomized(&boundary, &mut rng);
        firefly.target = Vec2::new(0.0, 1.0);
        firefly.speed = 50.0; // one step would fly far past without the cap
        firefly.retarget_in = 10.0;

        let mut pos = Vec2::new(0.0, 0.9);
        firefly.step(&mut pos, 1.0, &boundary, &mut rng);
        assert_eq!(pos, Vec2::new(0.0, 1.0));
    }
}
