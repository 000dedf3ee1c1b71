//! Shared components, resources, events, and states for Flatling.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    MainMenu,
    Playing,
    LevelComplete,
    GameOver,
}

/// Ordering buckets for the simulation tick. Collision effects must land in
/// the same frame the level controller polls door state, so Progress runs
/// last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemSet)]
pub enum TickSet {
    Movement,
    Hazards,
    Contact,
    Interact,
    Carry,
    Progress,
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn from_sign(v: f32) -> Self {
        if v < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        }
    }
}

#[derive(Component, Debug, Clone, Default)]
pub struct Player;

/// Player body state: run/jump parameters plus the flatten state machine.
///
/// Normal and flattened are two mutually exclusive body configurations with
/// their own collider extents; swapping is done atomically by the player
/// domain (collider + scale + feet-planted position correction in one step).
#[derive(Component, Debug, Clone)]
pub struct PlayerBody {
    pub move_speed: f32,
    pub jump_velocity: f32,
    /// Zero disables jumping entirely while flattened.
    pub flattened_jump_velocity: f32,
    pub pickup_radius: f32,
    pub grounded: bool,
    pub flattened: bool,
    /// Once set, un-flattening is refused until `force_unflatten`.
    pub flatten_locked: bool,
    pub facing: Facing,
    pub normal_half: Vec2,
    pub flattened_half: Vec2,
}

impl Default for PlayerBody {
    fn default() -> Self {
        let normal_half = Vec2::new(0.4, 0.5);
        Self {
            move_speed: 6.0,
            jump_velocity: 12.0,
            flattened_jump_velocity: 0.0,
            pickup_radius: 1.5,
            grounded: false,
            flattened: false,
            flatten_locked: false,
            facing: Facing::Right,
            normal_half,
            flattened_half: Vec2::new(
                normal_half.x * FLATTEN_WIDTH_FACTOR,
                normal_half.y * FLATTEN_HEIGHT_FACTOR,
            ),
        }
    }
}

impl PlayerBody {
    /// Half-extents of the currently active body configuration. Boundary
    /// clamping must use this, never a fixed value, since flattening changes
    /// the collider size.
    pub fn active_half(&self) -> Vec2 {
        if self.flattened {
            self.flattened_half
        } else {
            self.normal_half
        }
    }

    /// Interact reach shrinks while flattened.
    pub fn reach(&self) -> f32 {
        if self.flattened {
            self.pickup_radius * FLATTEN_REACH_FACTOR
        } else {
            self.pickup_radius
        }
    }

    pub fn active_jump_velocity(&self) -> f32 {
        if self.flattened {
            self.flattened_jump_velocity
        } else {
            self.jump_velocity
        }
    }

    /// Lock the flatten state so only `force_unflatten` can undo it.
    pub fn lock_flatten(&mut self) {
        self.flatten_locked = true;
    }

    pub fn force_unflatten(&mut self) {
        self.flatten_locked = false;
    }
}

/// The player's single carry slot. Exclusivity is enforced by rejecting
/// `pick_up` on anything already held, never by locking.
#[derive(Component, Debug, Clone, Default)]
pub struct CarrySlot(pub Option<Entity>);

/// Movable-region rectangle for the current level. The player is clamped to
/// it each tick using the active collider half-extents.
#[derive(Resource, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Boundary {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Default for Boundary {
    fn default() -> Self {
        Self {
            left: -12.0,
            right: 12.0,
            bottom: -7.0,
            top: 8.0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CARRYABLE PROTOCOL
// ═══════════════════════════════════════════════════════════════════════

/// Capability for anything a player can hold: keys always, small monsters
/// only once flattened (the hazard domain inserts this on flatten).
#[derive(Component, Debug, Clone, Default)]
pub struct Carryable {
    pub held: bool,
    pub holder: Option<Entity>,
}

impl Carryable {
    /// At most one holder at a time; picking up an already-held object is
    /// rejected as a no-op.
    pub fn pick_up(&mut self, holder: Entity) -> bool {
        if self.held {
            return false;
        }
        self.held = true;
        self.holder = Some(holder);
        true
    }

    pub fn release(&mut self) {
        self.held = false;
        self.holder = None;
    }
}

// ═══════════════════════════════════════════════════════════════════════
// KEYS & DOORS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum KeyKind {
    #[default]
    Normal,
    Small,
}

#[derive(Component, Debug, Clone)]
pub struct Key {
    pub kind: KeyKind,
    /// Whether carrying this key adds a blocking collider to the holder so
    /// the combined silhouette is stopped by low platforms.
    pub blocking: bool,
}

/// Auxiliary solid box inserted on a holder while a blocking key is carried.
/// Player movement resolves collisions against it in addition to the body;
/// its vertical offset is derived from the holder's live top bound so it
/// follows flatten swaps.
#[derive(Component, Debug, Clone, Copy)]
pub struct KeyBlock {
    pub half: Vec2,
}

/// A gate that consumes one compatible key per unlock step.
/// `deposited` only ever increases; once open the door stays open.
#[derive(Component, Debug, Clone)]
pub struct Door {
    pub kind: KeyKind,
    pub required: u32,
    pub deposited: u32,
}

impl Door {
    pub fn new(kind: KeyKind, required: u32) -> Self {
        Self {
            kind,
            required,
            deposited: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.deposited >= self.required
    }

    /// One unlock step. Fails without state change when already open or when
    /// the key type does not match exactly (Normal opens Normal, Small opens
    /// Small — no substitution).
    pub fn try_deposit(&mut self, kind: KeyKind) -> bool {
        if self.is_open() || kind != self.kind {
            return false;
        }
        self.deposited += 1;
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════
// LEVEL
// ═══════════════════════════════════════════════════════════════════════

/// Everything spawned for the active level carries this marker so a restart
/// or transition can despawn the whole set.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct LevelEntity;

#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct CurrentLevel(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailCause {
    MonsterTouch,
    Smashed,
    Trap,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone)]
pub struct PickedUpEvent {
    pub item: Entity,
    pub holder: Entity,
}

#[derive(Event, Debug, Clone)]
pub struct DroppedEvent {
    pub item: Entity,
    pub holder: Entity,
}

/// Command: flatten the player (hammer contact). `permanent` sets the
/// flatten lock.
#[derive(Event, Debug, Clone)]
pub struct FlattenPlayerEvent {
    pub permanent: bool,
}

/// Notification fired after the body swap actually happened.
#[derive(Event, Debug, Clone)]
pub struct PlayerFlattenedEvent;

/// Command: break a key entity. Small keys are inert to this.
#[derive(Event, Debug, Clone)]
pub struct KeyBreakEvent {
    pub key: Entity,
}

#[derive(Event, Debug, Clone)]
pub struct DoorOpenedEvent {
    pub door: Entity,
}

#[derive(Event, Debug, Clone)]
pub struct GameOverEvent {
    pub cause: FailCause,
}

#[derive(Event, Debug, Clone)]
pub struct LevelCompleteEvent;

#[derive(Event, Debug, Clone)]
pub struct PlaySfxEvent {
    pub sfx_id: String,
}

#[derive(Event, Debug, Clone)]
pub struct PlayMusicEvent {
    pub track_id: String,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

/// World units per tile; the player is one unit tall when not flattened.
pub const UNIT: f32 = 1.0;
/// Render scale (world unit → screen pixels).
pub const PIXELS_PER_UNIT: f32 = 40.0;
pub const SCREEN_WIDTH: f32 = 960.0;
pub const SCREEN_HEIGHT: f32 = 540.0;

pub const GRAVITY: f32 = -30.0;
pub const GROUND_CHECK_RADIUS: f32 = 0.25;

pub const FLATTEN_WIDTH_FACTOR: f32 = 1.3;
pub const FLATTEN_HEIGHT_FACTOR: f32 = 0.5;
pub const FLATTEN_REACH_FACTOR: f32 = 0.7;

/// Lateral offset of the two Small keys spawned when a Normal key breaks.
pub const KEY_BREAK_OFFSET: f32 = 0.5;
/// Maximum distance a drop/spawn ray probes for ground below.
pub const GROUND_PROBE_DISTANCE: f32 = 10.0;
/// Gap kept between a holder's top bound and a carried object.
pub const CARRY_CLEARANCE: f32 = 0.1;
