//! Persisted stage model: plain data, no behaviour.
//!
//! Field names follow the stage file format (`stageID`, `tileIndex`,
//! `isWinProp`, ...). See `sim::store` for where these files live.

use serde::{Deserialize, Serialize};

use super::direction::Direction;

/// Tile index used by player spawns that are removed / not placed.
pub const UNPLACED: i32 = -1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageData {
    #[serde(rename = "stageID")]
    pub stage_id: String,
    pub columns: i32,
    pub rows: i32,
    pub tiles: Vec<TileData>,
    pub props: Vec<PropData>,
    /// Index in this list is the player slot.
    pub players: Vec<PlayerData>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileData {
    pub tile_index: i32,
    pub tile_prefab: i32,
    #[serde(default)]
    pub tile_prefab_variant: i32,
    // Precomputed wrap-around neighbours (see domain::topology).
    pub tile_down: i32,
    pub tile_up: i32,
    pub tile_right: i32,
    pub tile_left: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropData {
    pub tile_index: i32,
    #[serde(default)]
    pub direction: Direction,
    pub prop_prefab: i32,
    #[serde(default)]
    pub prop_prefab_variant: i32,
    #[serde(default)]
    pub is_win_prop: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerData {
    pub tile_index: i32,
    #[serde(default)]
    pub direction: Direction,
}

impl StageData {
    /// Number of addressable cells (`columns * rows`), populated or not.
    /// `None` when the grid is too large to index with an `i32`.
    pub fn cell_count(&self) -> Option<i32> {
        self.columns.max(0).checked_mul(self.rows.max(0))
    }

    /// Is `tile_index` inside `[0, columns * rows)`? Never true on a grid
    /// whose cell count overflows.
    pub fn in_range(&self, tile_index: i32) -> bool {
        tile_index >= 0 && self.cell_count().is_some_and(|count| tile_index < count)
    }
}

impl TileData {
    /// A tile whose neighbours all point at itself. Topology fills in the
    /// real links afterwards.
    pub fn isolated(tile_index: i32, tile_prefab: i32, tile_prefab_variant: i32) -> Self {
        TileData {
            tile_index,
            tile_prefab,
            tile_prefab_variant,
            tile_down: tile_index,
            tile_up: tile_index,
            tile_right: tile_index,
            tile_left: tile_index,
        }
    }

    /// Stored neighbour index in `direction`; `None` for `Direction::None`.
    pub fn neighbor(&self, direction: Direction) -> Option<i32> {
        match direction {
            Direction::Down => Some(self.tile_down),
            Direction::Up => Some(self.tile_up),
            Direction::Left => Some(self.tile_left),
            Direction::Right => Some(self.tile_right),
            Direction::None => None,
        }
    }
}

impl PlayerData {
    pub fn is_placed(&self) -> bool {
        self.tile_index != UNPLACED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "stageID": "den",
        "columns": 2,
        "rows": 1,
        "tiles": [
            { "tileIndex": 0, "tilePrefab": 0, "tilePrefabVariant": 1,
              "tileDown": 0, "tileUp": 0, "tileRight": 1, "tileLeft": 1 },
            { "tileIndex": 1, "tilePrefab": 0, "tilePrefabVariant": 0,
              "tileDown": 1, "tileUp": 1, "tileRight": 0, "tileLeft": 0 }
        ],
        "props": [
            { "tileIndex": 1, "direction": 0, "propPrefab": 1,
              "propPrefabVariant": 0, "isWinProp": true }
        ],
        "players": [ { "tileIndex": 0, "direction": 1 } ]
    }"#;

    #[test]
    fn reads_stage_file_field_names() {
        let stage: StageData = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(stage.stage_id, "den");
        assert_eq!(stage.tiles[0].tile_right, 1);
        assert_eq!(stage.tiles[0].tile_prefab_variant, 1);
        assert!(stage.props[0].is_win_prop);
        assert_eq!(stage.props[0].direction, Direction::None);
        assert_eq!(stage.players[0].direction, Direction::Down);
    }

    #[test]
    fn writes_stage_file_field_names() {
        let stage: StageData = serde_json::from_str(SAMPLE).unwrap();
        let text = serde_json::to_string(&stage).unwrap();
        assert!(text.contains("\"stageID\":\"den\""));
        assert!(text.contains("\"isWinProp\":true"));
        assert!(text.contains("\"tilePrefabVariant\":1"));
    }

    #[test]
    fn missing_props_is_a_parse_error() {
        let text = r#"{ "stageID": "x", "columns": 1, "rows": 1, "tiles": [], "players": [] }"#;
        assert!(serde_json::from_str::<StageData>(text).is_err());
    }

    #[test]
    fn range_and_neighbors() {
        let stage: StageData = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(stage.cell_count(), Some(2));
        assert!(stage.in_range(1));
        assert!(!stage.in_range(2));
        assert!(!stage.in_range(-1));
        assert_eq!(stage.tiles[1].neighbor(Direction::Right), Some(0));
        assert_eq!(stage.tiles[1].neighbor(Direction::None), None);
    }

    #[test]
    fn oversized_grid_has_no_cells_in_range() {
        let mut stage: StageData = serde_json::from_str(SAMPLE).unwrap();
        stage.columns = 100_000;
        stage.rows = 100_000;
        assert_eq!(stage.cell_count(), None);
        assert!(!stage.in_range(0));
        assert!(!stage.in_range(5));
    }
}
