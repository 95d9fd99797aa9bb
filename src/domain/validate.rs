//! Stage consistency checks.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! | # | check                                                   |
//! |---|---------------------------------------------------------|
//! | 1 | stage present                                           |
//! | 2 | props present (enforced by the typed model)             |
//! | 3 | every prop in range and not sharing a tile with a player |
//! | 4 | exactly one win prop                                    |
//! | 5 | players present (enforced by the typed model)           |
//! | 6 | every player in range, `-1` allowed as unplaced         |
//!
//! Structural checks follow: positive size, unique tile indices, unique
//! prop / player cells, and every occupant standing on an existing tile.

use std::collections::HashSet;

use thiserror::Error;

use super::stage::{StageData, UNPLACED};
use super::topology::has_tile;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("stage is missing")]
    MissingStage,

    #[error("prop {prop} has tile index {tile_index} outside the grid")]
    PropOutOfRange { prop: usize, tile_index: i32 },

    #[error("prop {prop} and player {player} share tile {tile_index}")]
    PropOnPlayer { prop: usize, player: usize, tile_index: i32 },

    #[error("stage needs exactly one win prop, found {0}")]
    WinPropCount(usize),

    #[error("player {player} has tile index {tile_index} outside the grid")]
    PlayerOutOfRange { player: usize, tile_index: i32 },

    #[error("stage size {columns}x{rows} is not positive or too large")]
    InvalidSize { columns: i32, rows: i32 },

    #[error("tile index {0} appears more than once or lies outside the grid")]
    BadTile(i32),

    #[error("props {first} and {second} share tile {tile_index}")]
    PropsShareTile { first: usize, second: usize, tile_index: i32 },

    #[error("players {first} and {second} share tile {tile_index}")]
    PlayersShareTile { first: usize, second: usize, tile_index: i32 },

    #[error("prop {prop} stands on missing tile {tile_index}")]
    PropWithoutTile { prop: usize, tile_index: i32 },

    #[error("player {player} stands on missing tile {tile_index}")]
    PlayerWithoutTile { player: usize, tile_index: i32 },
}

/// Validate an optional stage (a failed load hands in `None`).
pub fn validate(stage: Option<&StageData>) -> Result<(), ValidationError> {
    match stage {
        Some(stage) => validate_stage(stage),
        None => Err(ValidationError::MissingStage),
    }
}

pub fn validate_stage(stage: &StageData) -> Result<(), ValidationError> {
    // ── Props ──
    for (prop, data) in stage.props.iter().enumerate() {
        if !stage.in_range(data.tile_index) {
            return Err(ValidationError::PropOutOfRange { prop, tile_index: data.tile_index });
        }
        if let Some(player) = stage.players.iter().position(|p| p.tile_index == data.tile_index) {
            return Err(ValidationError::PropOnPlayer { prop, player, tile_index: data.tile_index });
        }
    }

    let wins = stage.props.iter().filter(|p| p.is_win_prop).count();
    if wins != 1 {
        return Err(ValidationError::WinPropCount(wins));
    }

    // ── Players ──
    for (player, data) in stage.players.iter().enumerate() {
        if data.tile_index != UNPLACED && !stage.in_range(data.tile_index) {
            return Err(ValidationError::PlayerOutOfRange { player, tile_index: data.tile_index });
        }
    }

    // ── Structure ──
    if stage.columns <= 0 || stage.rows <= 0 || stage.cell_count().is_none() {
        return Err(ValidationError::InvalidSize { columns: stage.columns, rows: stage.rows });
    }

    let mut seen = HashSet::new();
    for tile in &stage.tiles {
        if !stage.in_range(tile.tile_index) || !seen.insert(tile.tile_index) {
            return Err(ValidationError::BadTile(tile.tile_index));
        }
    }

    for (second, data) in stage.props.iter().enumerate() {
        if let Some(first) = stage.props[..second].iter().position(|p| p.tile_index == data.tile_index) {
            return Err(ValidationError::PropsShareTile { first, second, tile_index: data.tile_index });
        }
        if has_tile(stage, data.tile_index).is_none() {
            return Err(ValidationError::PropWithoutTile { prop: second, tile_index: data.tile_index });
        }
    }

    for (second, data) in stage.players.iter().enumerate() {
        if !data.is_placed() {
            continue;
        }
        if let Some(first) = stage.players[..second].iter().position(|p| p.tile_index == data.tile_index) {
            return Err(ValidationError::PlayersShareTile { first, second, tile_index: data.tile_index });
        }
        if has_tile(stage, data.tile_index).is_none() {
            return Err(ValidationError::PlayerWithoutTile { player: second, tile_index: data.tile_index });
        }
    }

    Ok(())
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
