//! Level definitions. Stages are RON documents compiled into the binary;
//! they are parsed once at startup into `LevelRegistry` so a malformed file
//! is reported before the menu appears rather than mid-game.

use bevy::prelude::*;
use serde::Deserialize;

use crate::shared::KeyKind;

#[derive(Debug, Clone, Deserialize)]
pub struct LevelDef {
    pub name: String,
    pub bounds: BoundsDef,
    pub player_spawn: (f32, f32),
    #[serde(default)]
    pub platforms: Vec<PlatformDef>,
    #[serde(default)]
    pub keys: Vec<KeyDef>,
    pub doors: Vec<DoorDef>,
    #[serde(default)]
    pub hammers: Vec<HammerDef>,
    #[serde(default)]
    pub small_monsters: Vec<SmallMonsterDef>,
    #[serde(default)]
    pub large_monsters: Vec<LargeMonsterDef>,
    #[serde(default)]
    pub traps: Vec<TrapDef>,
    #[serde(default)]
    pub fireflies: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BoundsDef {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PlatformDef {
    pub pos: (f32, f32),
    pub half: (f32, f32),
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct KeyDef {
    pub kind: KeyKind,
    pub pos: (f32, f32),
    #[serde(default)]
    pub blocking: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DoorDef {
    pub kind: KeyKind,
    pub required: u32,
    pub pos: (f32, f32),
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HammerDef {
    pub top: (f32, f32),
    pub bottom: (f32, f32),
    pub travel_time: f32,
    pub pause_time: f32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SmallMonsterDef {
    pub pos: (f32, f32),
    pub left_x: f32,
    pub right_x: f32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LargeMonsterDef {
    pub pos: (f32, f32),
    pub detect_radius: f32,
    pub smash_offset: f32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TrapDef {
    pub pos: (f32, f32),
    #[serde(default)]
    pub disable_on_hit: bool,
}

#[derive(Resource, Debug, Default)]
pub struct LevelRegistry {
    pub levels: Vec<LevelDef>,
}

impl LevelRegistry {
    pub fn get(&self, index: usize) -> Option<&LevelDef> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

const LEVEL_SOURCES: &[(&str, &str)] = &[
    ("level1", include_str!("../../assets/levels/level1.ron")),
    ("level2", include_str!("../../assets/levels/level2.ron")),
    ("level3", include_str!("../../assets/levels/level3.ron")),
];

/// Parse every embedded stage. A stage that fails to parse is skipped with
/// an error log instead of aborting the whole set.
pub fn load_levels(registry: &mut LevelRegistry) {
    for (id, source) in LEVEL_SOURCES {
        match ron::from_str::<LevelDef>(source) {
            Ok(def) => {
                info!("  Stage '{}' loaded ({})", def.name, id);
                registry.levels.push(def);
            }
            Err(err) => {
                error!("Stage '{id}' failed to parse and was skipped: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_embedded_levels_parse() {
        let mut registry = LevelRegistry::default();
        load_levels(&mut registry);
        assert_eq!(registry.len(), LEVEL_SOURCES.len());
    }

    #[test]
    fn every_level_has_a_door_and_matching_keys() {
        let mut registry = LevelRegistry::default();
        load_levels(&mut registry);
        for def in &registry.levels {
            assert!(!def.doors.is_empty(), "{}: no exit door", def.name);
            for door in &def.doors {
                let available = def
                    .keys
                    .iter()
                    .filter(|k| k.kind == door.kind)
                    .count() as u32
                    // A broken Normal key yields two Small keys.
                    + if door.kind == KeyKind::Small {
                        2 * def.keys.iter().filter(|k| k.kind == KeyKind::Normal).count() as u32
                    } else {
                        0
                    };
                assert!(
                    available >= door.required,
                    "{}: door needs {} {:?} keys, only {} obtainable",
                    def.name,
                    door.required,
                    door.kind,
                    available
                );
            }
        }
    }

    #[test]
    fn spawns_sit_inside_bounds() {
        let mut registry = LevelRegistry::default();
        load_levels(&mut registry);
        for def in &registry.levels {
            let b = def.bounds;
            let inside = |p: (f32, f32)| {
                p.0 >= b.left && p.0 <= b.right && p.1 >= b.bottom && p.1 <= b.top
            };
            assert!(inside(def.player_spawn), "{}: player spawn", def.name);
            for key in &def.keys {
                assert!(inside(key.pos), "{}: key at {:?}", def.name, key.pos);
            }
            for door in &def.doors {
                assert!(inside(door.pos), "{}: door at {:?}", def.name, door.pos);
            }
        }
    }
}
