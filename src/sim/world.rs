//! GridWorld: the live state of a loaded stage.
//!
//! ## Occupancy
//!
//! `tiles` maps a tile index to the live `Tile`; each tile holds at most one
//! occupant, and every placed item's `tile_index` names the tile holding it.
//! All occupancy changes go through `set_tile_index()`, which keeps both
//! sides in sync.
//!
//! An item whose `tile_index` has no backing tile (or whose tile holds some
//! other item) is *unplaced*: it exists but is skipped every tick.
//!
//! ## Lifecycle
//!
//!   `load()`        : unload, then build tiles, props and characters,
//!                     acquiring one pool instance per object
//!   `reset_round()` : everything back to its stage position, win latch cleared
//!   `unload()`      : release every pool instance, drop live state

use std::collections::HashMap;

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::catalog::{Catalog, PropBehavior};
use crate::domain::direction::Direction;
use crate::domain::entity::{Character, CharacterState, GridItem, ItemId, ItemKind, Prop, Vec2};
use crate::domain::physics::MotionParams;
use crate::domain::stage::{StageData, UNPLACED};
use crate::domain::tile::Tile;
use crate::domain::topology;

use super::event::GridEvent;
use super::pool::{ObjectPool, PoolHandle, PrefabKey};

/// One player taking part in a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contestant {
    /// Character prefab index.
    pub prefab: i32,
    /// Cosmetic variant of that prefab.
    pub variant: i32,
}

pub struct GridWorld {
    // ── Stage ──
    pub stage: StageData,
    pub tiles: HashMap<i32, Tile>,
    /// World units per cell (positions only, no effect on the rules).
    pub tile_size: f32,

    // ── Items ──
    pub items: Vec<GridItem>,
    /// Item id of each created character, indexed by player slot.
    pub characters: Vec<ItemId>,

    // ── Presentation instances ──
    pub handles: Vec<PoolHandle>,

    // ── Tuning ──
    pub motion: MotionParams,
    pub rng: StdRng,

    // ── Round ──
    /// Slot that claimed the win this round.
    pub win_claimed: Option<usize>,
    /// Pending events, drained by `step`.
    pub events: Vec<GridEvent>,
    pub tick: u64,
}

// ── Construction ──

impl GridWorld {
    pub fn new(motion: MotionParams, rng: StdRng) -> Self {
        GridWorld {
            stage: StageData {
                stage_id: String::new(),
                columns: 0,
                rows: 0,
                tiles: vec![],
                props: vec![],
                players: vec![],
            },
            tiles: HashMap::new(),
            tile_size: 1.0,
            items: vec![],
            characters: vec![],
            handles: vec![],
            motion,
            rng,
            win_claimed: None,
            events: vec![],
            tick: 0,
        }
    }

    /// Deterministic world, used by tests and replays.
    pub fn seeded(motion: MotionParams, seed: u64) -> Self {
        Self::new(motion, StdRng::seed_from_u64(seed))
    }
}

// ── Load / unload ──

impl GridWorld {
    /// Build live state for `stage`. Bad data is logged and skipped, never
    /// fatal: duplicate tiles, props on missing or occupied tiles, unknown
    /// prefabs (replaced by prefab 0) and spawns that cannot be placed.
    pub fn load(
        &mut self,
        stage: StageData,
        catalog: &Catalog,
        roster: &[Contestant],
        pool: &mut dyn ObjectPool,
    ) {
        self.unload(pool);
        info!("loading stage {} ({}x{})", stage.stage_id, stage.columns, stage.rows);

        // Tiles
        for data in &stage.tiles {
            if self.tiles.contains_key(&data.tile_index) {
                error!("stage {}: duplicate tile index {}, skipped", stage.stage_id, data.tile_index);
                continue;
            }
            let prefab = catalog.resolve_tile(data.tile_prefab);
            self.handles.push(pool.acquire(PrefabKey::Tile(prefab)));
            self.tiles.insert(data.tile_index, Tile::new(data.clone()));
        }

        // Props
        for (source, data) in stage.props.iter().enumerate() {
            match self.tiles.get(&data.tile_index) {
                None => {
                    error!("stage {}: no tile {} for prop {source}, skipped", stage.stage_id, data.tile_index);
                    continue;
                }
                Some(tile) if !tile.is_free() => {
                    error!("stage {}: tile {} already occupied, prop {source} skipped", stage.stage_id, data.tile_index);
                    continue;
                }
                Some(_) => {}
            }

            let resolved = catalog.resolve_prop(data.prop_prefab);
            let prop = Prop {
                source,
                prefab: resolved.index,
                facing: data.direction.or_random(&mut self.rng),
                is_win: data.is_win_prop,
                locks: resolved.locks,
            };
            let kind = match resolved.behavior {
                PropBehavior::Block => ItemKind::Prop(prop),
                PropBehavior::Obstacle => ItemKind::Obstacle { prop, armed: None },
            };

            self.handles.push(pool.acquire(PrefabKey::Prop(resolved.index)));
            if data.is_win_prop {
                self.handles.push(pool.acquire(PrefabKey::WinEffect));
            }

            let id = self.items.len();
            self.items.push(GridItem::new(UNPLACED, data.prop_prefab_variant, kind));
            self.set_tile_index(id, data.tile_index, true);
        }

        // Characters
        if roster.len() > stage.players.len() {
            warn!(
                "stage {} has {} spawns for {} players; extra players sit out",
                stage.stage_id,
                stage.players.len(),
                roster.len()
            );
        }
        self.stage = stage;
        for (slot, contestant) in roster.iter().enumerate().take(self.stage.players.len()) {
            let prefab = catalog.resolve_character(contestant.prefab);
            self.handles.push(pool.acquire(PrefabKey::Character(prefab)));

            let id = self.items.len();
            let character = Character::new(slot, prefab);
            self.items.push(GridItem::new(UNPLACED, contestant.variant, ItemKind::Character(character)));
            self.characters.push(id);

            let spawn = self.stage.players[slot].clone();
            self.place_character(id, contestant.variant, spawn.tile_index, spawn.direction);
        }

        self.win_claimed = None;
        self.events.clear();
        self.tick = 0;
    }

    /// Release every pool instance and drop all live state.
    pub fn unload(&mut self, pool: &mut dyn ObjectPool) {
        if self.handles.is_empty() && self.items.is_empty() && self.tiles.is_empty() {
            return;
        }
        for handle in self.handles.drain(..) {
            pool.release(handle);
        }
        self.tiles.clear();
        self.items.clear();
        self.characters.clear();
        self.events.clear();
        self.win_claimed = None;
        info!("unloaded stage {}", self.stage.stage_id);
    }
}

// ── Occupancy queries / mutation ──

impl GridWorld {
    pub fn tile(&self, tile_index: i32) -> Option<&Tile> {
        self.tiles.get(&tile_index)
    }

    /// Linked neighbour of `tile_index` in `direction`, if both tiles exist.
    pub fn adjacent(&self, tile_index: i32, direction: Direction) -> Option<i32> {
        let next = self.tile(tile_index)?.adjacent(direction)?;
        self.tiles.contains_key(&next).then_some(next)
    }

    pub fn occupant(&self, tile_index: i32) -> Option<ItemId> {
        self.tile(tile_index).and_then(|t| t.occupant)
    }

    /// Is the item standing on a real tile that knows about it?
    pub fn is_placed(&self, id: ItemId) -> bool {
        self.items
            .get(id)
            .is_some_and(|item| self.occupant(item.tile_index) == Some(id))
    }

    /// Move an item to `tile_index`, updating both tiles. With `reset`, the
    /// push offset and direction are cleared as well.
    pub fn set_tile_index(&mut self, id: ItemId, tile_index: i32, reset: bool) {
        let Some(old) = self.items.get(id).map(|item| item.tile_index) else { return };
        if let Some(tile) = self.tiles.get_mut(&old) {
            if tile.occupant == Some(id) {
                tile.occupant = None;
            }
        }

        let item = &mut self.items[id];
        item.tile_index = tile_index;
        if reset {
            item.push_offset = Vec2::ZERO;
            item.push_direction = Direction::None;
        }

        if let Some(tile) = self.tiles.get_mut(&tile_index) {
            tile.occupant = Some(id);
        }
    }

    /// Take an item off the grid entirely.
    fn lift(&mut self, id: ItemId) {
        self.set_tile_index(id, UNPLACED, true);
    }
}

// ── Characters ──

impl GridWorld {
    pub fn character(&self, slot: usize) -> Option<&GridItem> {
        self.characters.get(slot).and_then(|&id| self.items.get(id))
    }

    /// Set a character's state, queuing `StateChanged` when it differs.
    pub fn set_state(&mut self, id: ItemId, state: CharacterState) {
        let Some(c) = self.items.get_mut(id).and_then(GridItem::character_mut) else { return };
        if c.state != state {
            c.state = state;
            let slot = c.slot;
            self.events.push(GridEvent::StateChanged { slot, state });
        }
    }

    /// Turn a character. A change of facing stops it and drops it to Idle.
    pub fn set_facing(&mut self, id: ItemId, facing: Direction) {
        let Some(c) = self.items.get_mut(id).and_then(GridItem::character_mut) else { return };
        if c.facing != facing {
            c.velocity = 0.0;
            c.immovable_elapsed = 0.0;
            c.facing = facing;
            self.set_state(id, CharacterState::Idle);
        }
    }

    /// Put a character on its spawn: variant applied, offsets cleared,
    /// immediately stunnable, facing resolved (`None` picks a random
    /// cardinal). A spawn on a missing or occupied tile leaves the
    /// character unplaced.
    pub fn place_character(&mut self, id: ItemId, variant: i32, tile_index: i32, facing: Direction) {
        if !self.items.get(id).is_some_and(GridItem::is_character) {
            return;
        }
        self.items[id].variant = variant;

        let free = self
            .tile(tile_index)
            .is_some_and(|t| t.occupant.is_none() || t.occupant == Some(id));
        if free {
            self.set_tile_index(id, tile_index, true);
        } else {
            if tile_index != UNPLACED {
                warn!("spawn tile {tile_index} is missing or occupied; character {id} left unplaced");
            }
            self.lift(id);
        }

        let window = self.motion.stun_window();
        if let Some(c) = self.items[id].character_mut() {
            c.stun_elapsed = window;
        }

        self.set_facing(id, Direction::None);
        let resolved = facing.or_random(&mut self.rng);
        self.set_facing(id, resolved);
        self.set_state(id, CharacterState::Idle);
    }

    /// Freeze or release every character's controls.
    pub fn set_controls_enabled(&mut self, enabled: bool) {
        for &id in &self.characters {
            if let Some(c) = self.items[id].character_mut() {
                c.can_control = enabled;
            }
        }
    }

    /// Stage spawns that reference an existing tile.
    pub fn placeable_players(&self) -> usize {
        self.stage
            .players
            .iter()
            .filter(|p| p.is_placed() && self.tiles.contains_key(&p.tile_index))
            .count()
    }
}

// ── Round control ──

impl GridWorld {
    /// Props back to their stage tiles (facing kept), characters back to
    /// their spawns facing Down, win latch cleared.
    pub fn reset_round(&mut self) {
        for id in 0..self.items.len() {
            self.lift(id);
        }

        for id in 0..self.items.len() {
            let home = match &mut self.items[id].kind {
                ItemKind::Prop(p) => self.stage.props.get(p.source).map(|d| d.tile_index),
                ItemKind::Obstacle { prop, armed } => {
                    *armed = None;
                    self.stage.props.get(prop.source).map(|d| d.tile_index)
                }
                ItemKind::Character(_) => continue,
            };
            if let Some(home) = home {
                self.set_tile_index(id, home, true);
            }
        }

        for slot in 0..self.characters.len() {
            let id = self.characters[slot];
            let variant = self.items[id].variant;
            let spawn = self.stage.players.get(slot).map_or(UNPLACED, |p| p.tile_index);
            self.place_character(id, variant, spawn, Direction::Down);
            if let Some(c) = self.items[id].character_mut() {
                c.velocity = 0.0;
            }
        }

        self.win_claimed = None;
        info!("round reset on stage {}", self.stage.stage_id);
    }
}

// ── Presentation queries ──

impl GridWorld {
    /// Centered world position `(x, z)` of a cell.
    pub fn tile_position(&self, tile_index: i32) -> Option<(f32, f32)> {
        topology::tile_position(&self.stage, self.tile_size, tile_index)
    }

    /// World position of an item: its tile plus the push offset.
    pub fn item_position(&self, id: ItemId) -> Option<(f32, f32)> {
        let item = self.items.get(id)?;
        let (x, z) = self.tile_position(item.tile_index)?;
        Some((x + item.push_offset.x * self.tile_size, z + item.push_offset.y * self.tile_size))
    }

    pub fn win_prop(&self) -> Option<ItemId> {
        self.items.iter().position(|i| i.prop().is_some_and(|p| p.is_win))
    }

    pub fn prop_count(&self) -> usize {
        self.items.iter().filter(|i| i.prop().is_some()).count()
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
