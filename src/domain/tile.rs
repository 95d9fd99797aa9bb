//! Live tile: the persisted `TileData` plus the single item standing on it.
//! Occupancy is mutated only through `sim::world::GridWorld::set_tile_index`
//! so the occupant always agrees with that item's `tile_index`.

use super::direction::Direction;
use super::entity::ItemId;
use super::stage::TileData;

#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub data: TileData,
    pub occupant: Option<ItemId>,
}

impl Tile {
    pub fn new(data: TileData) -> Self {
        Tile { data, occupant: None }
    }

    pub fn index(&self) -> i32 {
        self.data.tile_index
    }

    /// Linked neighbour index in `direction` (may name a missing tile).
    pub fn adjacent(&self, direction: Direction) -> Option<i32> {
        self.data.neighbor(direction)
    }

    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }
}
