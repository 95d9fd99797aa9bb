//! Prefab catalog: what a tile / prop / character index in a stage file means.
//!
//! Stage files only store catalog indices. Behaviour that belongs to a prefab
//! (lock flags, obstacle behaviour, number of cosmetic variants) lives here
//! and is filled from `config.toml` (see `config::GameConfig`).

use log::warn;

use super::direction::Direction;

/// First prop index counted as decoration. 0 and 1 are the wall and the win
/// prop used by freshly authored stages.
pub const DECORATIVE_START: i32 = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    pub tiles: Vec<TilePrefab>,
    pub props: Vec<PropPrefab>,
    pub characters: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TilePrefab {
    pub name: String,
    pub variants: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropPrefab {
    pub name: String,
    pub variants: u32,
    pub behavior: PropBehavior,
    pub locks: Locks,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PropBehavior {
    /// Pushable by anything unless locked in that direction.
    #[default]
    Block,
    /// Pushable only by direct same-tick contact from a character.
    Obstacle,
}

/// Per-direction lock flags. A locked direction can never be pushed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Locks {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Catalog lookups resolved for one prop: index after fallback plus the
/// prefab traits the simulation copies into the live item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedProp {
    pub index: i32,
    pub behavior: PropBehavior,
    pub locks: Locks,
}

impl Locks {
    pub const NONE: Locks = Locks { up: false, down: false, left: false, right: false };
    pub const ALL: Locks = Locks { up: true, down: true, left: true, right: true };
    pub const HORIZONTAL: Locks = Locks { up: false, down: false, left: true, right: true };

    pub fn is_locked(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::None => true,
        }
    }

    pub fn lock(&mut self, direction: Direction) {
        match direction {
            Direction::Up => self.up = true,
            Direction::Down => self.down = true,
            Direction::Left => self.left = true,
            Direction::Right => self.right = true,
            Direction::None => {}
        }
    }
}

impl PropPrefab {
    pub fn new(name: &str, variants: u32, behavior: PropBehavior, locks: Locks) -> Self {
        PropPrefab { name: name.into(), variants, behavior, locks }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog {
            tiles: vec![TilePrefab { name: "floor".into(), variants: 2 }],
            props: vec![
                PropPrefab::new("wall", 1, PropBehavior::Block, Locks::ALL),
                PropPrefab::new("television", 1, PropBehavior::Block, Locks::ALL),
                PropPrefab::new("crate", 3, PropBehavior::Block, Locks::NONE),
                PropPrefab::new("armchair", 2, PropBehavior::Obstacle, Locks::NONE),
                PropPrefab::new("bookshelf", 2, PropBehavior::Block, Locks::HORIZONTAL),
                PropPrefab::new("plant", 3, PropBehavior::Block, Locks::NONE),
            ],
            characters: vec!["cat".into(), "dog".into(), "bunny".into(), "frog".into()],
        }
    }
}

impl Catalog {
    /// Tile prefab index, substituting 0 when out of range.
    pub fn resolve_tile(&self, index: i32) -> i32 {
        resolve_index("tile", index, self.tiles.len())
    }

    /// Character prefab index, substituting 0 when out of range.
    pub fn resolve_character(&self, index: i32) -> i32 {
        resolve_index("character", index, self.characters.len())
    }

    /// Prop prefab traits, substituting prefab 0 when out of range and a plain
    /// unlocked block when the catalog has no props at all.
    pub fn resolve_prop(&self, index: i32) -> ResolvedProp {
        let index = resolve_index("prop", index, self.props.len());
        match self.props.get(index as usize) {
            Some(prefab) => ResolvedProp { index, behavior: prefab.behavior, locks: prefab.locks },
            None => ResolvedProp { index, behavior: PropBehavior::Block, locks: Locks::NONE },
        }
    }

    /// Prop indices eligible for randomization.
    pub fn decorative_props(&self) -> std::ops::Range<i32> {
        DECORATIVE_START..(self.props.len() as i32).max(DECORATIVE_START)
    }

    /// Variant count of a prop prefab (at least 1).
    pub fn prop_variants(&self, index: i32) -> u32 {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.props.get(i))
            .map_or(1, |p| p.variants.max(1))
    }
}

fn resolve_index(kind: &str, index: i32, len: usize) -> i32 {
    if index >= 0 && (index as usize) < len {
        return index;
    }
    if len == 0 {
        warn!("{kind} catalog is empty; using built-in {kind} for index {index}");
    } else {
        warn!("{kind} prefab {index} not in catalog; using prefab 0");
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_layout() {
        let catalog = Catalog::default();
        assert_eq!(catalog.props[0].name, "wall");
        assert_eq!(catalog.props[1].name, "television");
        assert_eq!(catalog.props[3].behavior, PropBehavior::Obstacle);
        assert_eq!(catalog.decorative_props(), 2..6);
    }

    #[test]
    fn missing_prefab_falls_back_to_zero() {
        let catalog = Catalog::default();
        assert_eq!(catalog.resolve_tile(7), 0);
        assert_eq!(catalog.resolve_character(-1), 0);
        assert_eq!(catalog.resolve_character(2), 2);
        let wall = catalog.resolve_prop(99);
        assert_eq!(wall.index, 0);
        assert_eq!(wall.locks, Locks::ALL);
    }

    #[test]
    fn empty_catalog_uses_plain_block() {
        let catalog = Catalog { tiles: vec![], props: vec![], characters: vec![] };
        let resolved = catalog.resolve_prop(3);
        assert_eq!(resolved.behavior, PropBehavior::Block);
        assert_eq!(resolved.locks, Locks::NONE);
        assert_eq!(catalog.decorative_props(), 2..2);
        assert_eq!(catalog.prop_variants(0), 1);
    }

    #[test]
    fn locks_by_direction() {
        let shelf = Locks::HORIZONTAL;
        assert!(shelf.is_locked(Direction::Left));
        assert!(shelf.is_locked(Direction::Right));
        assert!(!shelf.is_locked(Direction::Up));
        assert!(Locks::NONE.is_locked(Direction::None));

        let mut locks = Locks::NONE;
        locks.lock(Direction::Down);
        assert!(locks.is_locked(Direction::Down));
        assert!(!locks.is_locked(Direction::Up));
    }
}
