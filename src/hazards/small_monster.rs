//! Small monster: a Patrol / Charge / Return / Flattened / Carried state
//! machine. Hostile contact with the player fails the level; once flattened
//! (by a hammer or a large-monster smash) it satisfies the carry protocol
//! and becomes a portable object.
//!
//! The locomotion machine is a plain struct advanced by `tick`, keeping all
//! timing in elapsed-time fields so tests can drive it with exact steps.

use bevy::prelude::*;

use crate::physics::{aabb_overlap, ray_hits_box, Body, Collider, LayerMask};
use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonsterState {
    Patrol,
    Charge,
    Return,
    Flattened,
    Carried,
}

#[derive(Component, Debug, Clone)]
pub struct SmallMonster {
    pub state: MonsterState,
    pub facing: Facing,
    pub left_x: f32,
    pub right_x: f32,
    pub home: Vec2,
    pub speed: f32,
    pub charge_speed: f32,
    pub charge_distance: f32,
    pub detect_range: f32,
    pub edge_pause: f32,
    pub post_charge_pause: f32,
    moving_right: bool,
    pause_left: f32,
    charge_traveled: f32,
}

/// Positions closer than this snap to the target.
const ARRIVE_EPSILON: f32 = 0.05;

impl SmallMonster {
    pub fn new(home: Vec2, left_x: f32, right_x: f32) -> Self {
        Self {
            state: MonsterState::Patrol,
            facing: Facing::Right,
            left_x,
            right_x,
            home,
            speed: 2.0,
            charge_speed: 5.0,
            charge_distance: 6.0,
            detect_range: 4.0,
            edge_pause: 0.15,
            post_charge_pause: 0.15,
            moving_right: true,
            pause_left: 0.0,
            charge_traveled: 0.0,
        }
    }

    pub fn is_flattened(&self) -> bool {
        matches!(self.state, MonsterState::Flattened | MonsterState::Carried)
    }

    /// Hostile states are the ones whose touch fails the level.
    pub fn hostile(&self) -> bool {
        matches!(
            self.state,
            MonsterState::Patrol | MonsterState::Charge | MonsterState::Return
        )
    }

    /// Externally triggered by hazards. No effect while carried or already
    /// flattened. Returns whether the state changed.
    pub fn flatten(&mut self) -> bool {
        if self.is_flattened() {
            return false;
        }
        self.state = MonsterState::Flattened;
        true
    }

    fn within_patrol_bounds(&self, x: f32) -> bool {
        x >= self.left_x.min(self.right_x) && x <= self.left_x.max(self.right_x)
    }

    /// Advance the locomotion machine one step. `x` is the monster's current
    /// horizontal position and may be snapped on arrival; the return value
    /// is the horizontal velocity for this step.
    pub fn tick(&mut self, x: &mut f32, dt: f32, sees_player: bool) -> f32 {
        match self.state {
            MonsterState::Flattened | MonsterState::Carried => return 0.0,
            _ => {}
        }

        if self.pause_left > 0.0 {
            self.pause_left -= dt;
            return 0.0;
        }

        match self.state {
            MonsterState::Patrol => {
                if sees_player {
                    self.state = MonsterState::Charge;
                    self.charge_traveled = 0.0;
                    return self.facing.sign() * self.charge_speed;
                }

                let target = if self.moving_right { self.right_x } else { self.left_x };
                self.facing = Facing::from_sign(target - *x);

                if (*x - target).abs() < ARRIVE_EPSILON {
                    self.moving_right = !self.moving_right;
                    self.pause_left = self.edge_pause;
                    return 0.0;
                }
                self.facing.sign() * self.speed
            }

            MonsterState::Charge => {
                let vx = self.facing.sign() * self.charge_speed;
                self.charge_traveled += vx.abs() * dt;
                if self.charge_traveled >= self.charge_distance {
                    self.pause_left = self.post_charge_pause;
                    self.state = if self.within_patrol_bounds(*x) {
                        MonsterState::Patrol
                    } else {
                        MonsterState::Return
                    };
                    return 0.0;
                }
                vx
            }

            MonsterState::Return => {
                let dir = self.home.x - *x;
                self.facing = Facing::from_sign(dir);
                if dir.abs() < ARRIVE_EPSILON {
                    *x = self.home.x;
                    // Resume patrol toward whichever edge is farther.
                    self.moving_right = (self.right_x - self.home.x).abs()
                        >= (self.home.x - self.left_x).abs();
                    self.state = MonsterState::Patrol;
                    return 0.0;
                }
                self.facing.sign() * self.speed
            }

            MonsterState::Flattened | MonsterState::Carried => 0.0,
        }
    }
}

pub fn spawn_small_monster(
    commands: &mut Commands,
    pos: Vec2,
    left_x: f32,
    right_x: f32,
) -> Entity {
    if left_x >= right_x {
        warn!("SmallMonster patrol bounds are inverted ({left_x} >= {right_x})");
    }
    let half = Vec2::new(0.35, 0.35);
    commands
        .spawn((
            SmallMonster::new(pos, left_x, right_x),
            Collider::new(half, LayerMask::HAZARD),
            Sprite {
                color: Color::srgb(0.75, 0.25, 0.3),
                custom_size: Some(half * 2.0),
                ..default()
            },
            Transform::from_translation(pos.extend(6.0)),
            Visibility::default(),
            LevelEntity,
        ))
        .id()
}

/// Patrol/charge/return locomotion plus the sight ray. The charge trigger
/// is a short horizontal ray in the facing direction against the player.
pub fn small_monster_ai(
    time: Res<Time>,
    mut monsters: Query<(&mut SmallMonster, &mut Transform, &mut Sprite)>,
    player_query: Query<(&Transform, &Collider), (With<Player>, Without<SmallMonster>)>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }
    let player_box = player_query
        .get_single()
        .ok()
        .map(|(tf, col)| (col.center(tf.translation), col.half));

    for (mut monster, mut transform, mut sprite) in monsters.iter_mut() {
        let sees_player = match (monster.state, player_box) {
            (MonsterState::Patrol, Some((center, half))) => ray_hits_box(
                transform.translation.truncate(),
                monster.facing.sign(),
                monster.detect_range,
                center,
                half,
            ),
            _ => false,
        };

        let mut x = transform.translation.x;
        let vx = monster.tick(&mut x, dt, sees_player);
        transform.translation.x = x + vx * dt;
        sprite.flip_x = monster.facing == Facing::Left;
    }
}

/// Touching a hostile monster is the fail condition.
pub fn monster_touch_player(
    monsters: Query<(&SmallMonster, &Transform, &Collider)>,
    player_query: Query<(&Transform, &Collider), (With<Player>, Without<SmallMonster>)>,
    mut game_over: EventWriter<GameOverEvent>,
) {
    let Ok((player_tf, player_col)) = player_query.get_single() else {
        return;
    };
    let player_center = player_col.center(player_tf.translation);

    for (monster, monster_tf, monster_col) in monsters.iter() {
        if !monster.hostile() {
            continue;
        }
        if aabb_overlap(
            player_center,
            player_col.half,
            monster_col.center(monster_tf.translation),
            monster_col.half,
        ) {
            game_over.send(GameOverEvent {
                cause: FailCause::MonsterTouch,
            });
            return;
        }
    }
}

/// A freshly flattened monster gains the carry capability and a gravity
/// body so it settles on the ground, and squashes visually.
pub fn flattened_gains_carryable(
    mut commands: Commands,
    mut monsters: Query<
        (Entity, &SmallMonster, &mut Transform),
        (Changed<SmallMonster>, Without<Carryable>),
    >,
) {
    for (entity, monster, mut transform) in monsters.iter_mut() {
        if monster.state == MonsterState::Flattened {
            transform.scale = Vec3::new(FLATTEN_WIDTH_FACTOR, FLATTEN_HEIGHT_FACTOR, 1.0);
            commands
                .entity(entity)
                .insert((Carryable::default(), Body::default()));
        }
    }
}

/// Carry protocol hooks: pickup suspends the AI entirely, drop returns the
/// monster to Flattened — it never resumes hostility.
pub fn monster_carry_sync(
    mut picked_up: EventReader<PickedUpEvent>,
    mut dropped: EventReader<DroppedEvent>,
    mut monsters: Query<(&mut SmallMonster, &mut Collider, Option<&mut Body>)>,
) {
    for event in picked_up.read() {
        if let Ok((mut monster, mut collider, body)) = monsters.get_mut(event.item) {
            monster.state = MonsterState::Carried;
            collider.enabled = false;
            if let Some(mut body) = body {
                body.velocity = Vec2::ZERO;
            }
        }
    }
    for event in dropped.read() {
        if let Ok((mut monster, mut collider, body)) = monsters.get_mut(event.item) {
            monster.state = MonsterState::Flattened;
            collider.enabled = true;
            if let Some(mut body) = body {
                body.velocity = Vec2::ZERO;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monster() -> SmallMonster {
        SmallMonster::new(Vec2::new(0.0, 0.0), -3.0, 3.0)
    }

    /// Step the machine at 100 Hz, integrating x like the system does.
    fn run(m: &mut SmallMonster, x: &mut f32, seconds: f32, sees_player: bool) {
        let dt = 0.01;
        let steps = (seconds / dt).round() as usize;
        for _ in 0..steps {
            let vx = m.tick(x, dt, sees_player);
            *x += vx * dt;
        }
    }

    #[test]
    fn patrol_flips_at_edges_after_pause() {
        let mut m = monster();
        let mut x = 0.0;
        run(&mut m, &mut x, 1.6, false); // 3 units at speed 2 → right edge
        assert!(m.state == MonsterState::Patrol);
        assert!((x - 3.0).abs() < 0.1);
        run(&mut m, &mut x, 0.3, false); // edge pause + turnaround start
        assert_eq!(m.facing, Facing::Left);
    }

    #[test]
    fn sighting_triggers_charge_and_then_recovery() {
        let mut m = monster();
        let mut x = 0.0;
        let vx = m.tick(&mut x, 0.01, true);
        assert_eq!(m.state, MonsterState::Charge);
        assert_eq!(vx, m.charge_speed * m.facing.sign());

        // Charge runs its fixed distance, then pauses, then resolves.
        let charge_seconds = m.charge_distance / m.charge_speed + 0.01;
        run(&mut m, &mut x, charge_seconds, false);
        assert_ne!(m.state, MonsterState::Charge);
        // Charged 6 units from x=0 → outside the ±3 patrol zone → Return.
        assert_eq!(m.state, MonsterState::Return);
    }

    #[test]
    fn return_walks_home_snaps_and_resumes_patrol() {
        let mut m = monster();
        let mut x = 5.0;
        m.state = MonsterState::Return;
        run(&mut m, &mut x, 3.0, false);
        assert_eq!(m.state, MonsterState::Patrol);
        assert_eq!(x, 0.0, "arrival snaps exactly to home");
    }

    #[test]
    fn flattened_monster_ignores_player_and_keeps_still() {
        let mut m = monster();
        assert!(m.flatten());
        assert!(!m.flatten(), "flatten is one-way while flattened");
        let mut x = 1.0;
        assert_eq!(m.tick(&mut x, 0.01, true), 0.0);
        assert!(!m.hostile());
        assert!(m.is_flattened());
    }

    #[test]
    fn carried_monster_suspends_ai_and_drop_restores_flattened() {
        let mut m = monster();
        m.flatten();
        m.state = MonsterState::Carried;
        let mut x = 0.0;
        assert_eq!(m.tick(&mut x, 1.0, true), 0.0);

        // Drop: back to Flattened, never hostile again.
        m.state = MonsterState::Flattened;
        assert!(!m.hostile());
    }

    #[test]
    fn flatten_while_carried_is_refused() {
        let mut m = monster();
        m.flatten();
        m.state = MonsterState::Carried;
        assert!(!m.flatten());
        assert_eq!(m.state, MonsterState::Carried);
    }
}
