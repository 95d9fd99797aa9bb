//! Stage authoring: pure edits over `StageData`.
//!
//! Every edit leaves the adjacency links consistent by relinking the row and
//! column of the touched cell. Placing anything on a cell first clears what
//! was there, so a cell holds at most one occupant.
//!
//! ## Blank stage layout (5x5, one player)
//!   ```text
//!   W W W W W      W = wall (prop 0)
//!   W P . . W      T = win prop (prop 1) at the center cell
//!   W . T . W      P = spawn of slot 0 at `columns + 1`
//!   W . . . W
//!   W W W W W
//!   ```
//!
//! Further spawns follow along the interior cells row by row, skipping the
//! win prop.

use log::warn;
use rand::Rng;

use crate::domain::catalog::{Catalog, DECORATIVE_START};
use crate::domain::direction::Direction;
use crate::domain::stage::{PlayerData, PropData, StageData, TileData, UNPLACED};
use crate::domain::topology::{has_tile, link_all, recalculate_adjacents, tile_path};
use crate::sim::store::StageStore;

const WALL_PROP: i32 = 0;
const WIN_PROP: i32 = 1;

/// Largest side of a new stage.
pub const MAX_SIDE: i32 = 1024;

// ══════════════════════════════════════════════════════════════
// New stages
// ══════════════════════════════════════════════════════════════

/// Fully tiled stage walled in on its border, with the win prop in the
/// center and up to `player_slots` spawns on the interior cells. Sides are
/// clamped to `1..=MAX_SIDE`.
pub fn blank_stage(id: &str, columns: i32, rows: i32, player_slots: usize) -> StageData {
    let columns = columns.clamp(1, MAX_SIDE);
    let rows = rows.clamp(1, MAX_SIDE);

    let mut tiles = Vec::with_capacity((columns * rows) as usize);
    for index in 0..columns * rows {
        let row = index / columns;
        let mut variant = index % 2;
        // Even widths would stripe; flip odd rows to keep the checkerboard.
        if columns % 2 == 0 && row % 2 == 1 {
            variant = 1 - variant;
        }
        tiles.push(TileData::isolated(index, 0, variant));
    }

    let mut stage = StageData {
        stage_id: id.to_string(),
        columns,
        rows,
        tiles,
        props: vec![],
        players: vec![],
    };
    link_all(&mut stage);

    for index in 0..columns * rows {
        let (column, row) = (index % columns, index / columns);
        if row == 0 || row == rows - 1 || column == 0 || column == columns - 1 {
            stage.props.push(prop_data(index, Direction::Down, WALL_PROP, 0, false));
        }
    }

    let center = (rows / 2) * columns + columns / 2;
    place_prop(&mut stage, center, Direction::Down, WIN_PROP, 0, true);

    stage.players = (1..rows - 1)
        .flat_map(|row| (1..columns - 1).map(move |column| row * columns + column))
        .filter(|&index| index != center)
        .take(player_slots)
        .map(|tile_index| PlayerData { tile_index, direction: Direction::Down })
        .collect();
    if stage.players.len() < player_slots {
        warn!(
            "stage {id}: {columns}x{rows} has room for {} of {player_slots} spawns",
            stage.players.len()
        );
    }

    stage
}

fn prop_data(tile_index: i32, direction: Direction, prefab: i32, variant: i32, is_win: bool) -> PropData {
    PropData {
        tile_index,
        direction,
        prop_prefab: prefab,
        prop_prefab_variant: variant,
        is_win_prop: is_win,
    }
}

// ══════════════════════════════════════════════════════════════
// Tiles
// ══════════════════════════════════════════════════════════════

/// Add a tile on `index` (variant 0) or change the prefab of the tile
/// already there. Returns false when the index is outside the grid.
pub fn paint_tile(stage: &mut StageData, index: i32, prefab: i32) -> bool {
    if !stage.in_range(index) {
        return false;
    }
    match has_tile(stage, index) {
        Some(i) => stage.tiles[i].tile_prefab = prefab,
        None => stage.tiles.push(TileData::isolated(index, prefab, 0)),
    }
    recalculate_adjacents(stage, index)
}

/// Remove the tile on `index` together with anything standing on it.
pub fn erase_tile(stage: &mut StageData, index: i32) -> bool {
    remove_items(stage, index);
    let Some(i) = has_tile(stage, index) else {
        return false;
    };
    stage.tiles.remove(i);
    recalculate_adjacents(stage, index);
    true
}

// ══════════════════════════════════════════════════════════════
// Occupants
// ══════════════════════════════════════════════════════════════

/// First player slot spawning on `index`.
pub fn player_at(stage: &StageData, index: i32) -> Option<usize> {
    if index == UNPLACED {
        return None;
    }
    stage.players.iter().position(|p| p.tile_index == index)
}

/// Position in `stage.props` of the first prop on `index`.
pub fn prop_at(stage: &StageData, index: i32) -> Option<usize> {
    stage.props.iter().position(|p| p.tile_index == index)
}

/// Clear `index`: a player spawning there becomes unplaced, a prop there is
/// removed.
pub fn remove_items(stage: &mut StageData, index: i32) {
    if let Some(slot) = player_at(stage, index) {
        stage.players[slot].tile_index = UNPLACED;
    }
    if let Some(i) = prop_at(stage, index) {
        stage.props.remove(i);
    }
}

/// Move the spawn of `slot` to `index`. Unknown slots change nothing.
pub fn place_player(stage: &mut StageData, index: i32, direction: Direction, slot: usize) -> bool {
    if slot >= stage.players.len() {
        return false;
    }
    remove_items(stage, index);
    stage.players[slot] = PlayerData { tile_index: index, direction };
    true
}

pub fn place_prop(
    stage: &mut StageData,
    index: i32,
    direction: Direction,
    prefab: i32,
    variant: i32,
    is_win: bool,
) {
    remove_items(stage, index);
    stage.props.push(prop_data(index, direction, prefab, variant, is_win));
}

/// Shuffle decoration: every prop from `DECORATIVE_START` on gets a random
/// decorative prefab and a random variant of it. Walls and the win prop
/// are left alone.
pub fn randomize_props<R: Rng>(stage: &mut StageData, catalog: &Catalog, rng: &mut R) {
    let choices = catalog.decorative_props();
    if choices.is_empty() {
        return;
    }
    for prop in stage.props.iter_mut().filter(|p| p.prop_prefab >= DECORATIVE_START) {
        prop.prop_prefab = rng.random_range(choices.clone());
        prop.prop_prefab_variant = rng.random_range(0..catalog.prop_variants(prop.prop_prefab)) as i32;
    }
}

/// A stage id can be used for a new stage when it is non-empty and no
/// file is stored under it yet.
pub fn is_stage_id_available(store: &StageStore, id: &str) -> bool {
    !id.trim().is_empty() && !store.exists(id)
}

/// `(column, row)` label for editor status lines.
pub fn cell_label(stage: &StageData, index: i32) -> String {
    match tile_path(stage, index) {
        Some((column, row)) => format!("{column},{row}"),
        None => "-".to_string(),
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
