//! Grid topology: index <-> (column, row) mapping, tile lookup, and the
//! wrap-around adjacency graph stored in each `TileData`.
//!
//! ## Adjacency model
//!
//! The grid is a torus with holes. Every populated cell links to the next
//! populated cell along its row (right / left) and along its column
//! (down / up), skipping holes and wrapping at the edges:
//!
//! ```text
//!   row:  [A] [ ] [B] [C] [ ]      A.right = B   B.left  = A
//!                                  B.right = C   C.left  = B
//!                                  C.right = A   A.left  = C   (wrap)
//! ```
//!
//! A lone tile on a row (or column) links to itself on that axis.
//! Editing one tile changes its neighbours' links too, so recalculation
//! always redoes the whole row and the whole column through the edited cell.

use log::error;

use super::stage::StageData;

/// One full line of the grid: a row (horizontal links) or a column
/// (vertical links).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Line {
    Row(i32),
    Column(i32),
}

// ══════════════════════════════════════════════════════════════
// Index / path
// ══════════════════════════════════════════════════════════════

/// Linear tile index of `(column, row)`. Meant for cells inside the grid,
/// where the result is below `cell_count()` and cannot overflow.
#[inline]
pub fn tile_index(stage: &StageData, column: i32, row: i32) -> i32 {
    row * stage.columns + column
}

/// `(column, row)` of a linear tile index, using floor division so
/// negative indices map consistently. `None` when the stage has no width.
pub fn tile_path(stage: &StageData, tile_index: i32) -> Option<(i32, i32)> {
    if stage.columns <= 0 {
        return None;
    }
    let row = tile_index.div_euclid(stage.columns);
    let column = tile_index.rem_euclid(stage.columns);
    Some((column, row))
}

/// Position in `stage.tiles` of the first tile with this index.
/// Linear scan: stages are small and authoring mutates the list freely.
pub fn has_tile(stage: &StageData, tile_index: i32) -> Option<usize> {
    stage.tiles.iter().position(|t| t.tile_index == tile_index)
}

/// Center of a cell in world units `(x, z)`, with the grid centered on the
/// origin and row 0 at the far (+z) edge.
pub fn tile_position(stage: &StageData, tile_size: f32, tile_index: i32) -> Option<(f32, f32)> {
    let (column, row) = tile_path(stage, tile_index)?;
    let width = tile_size * stage.columns as f32;
    let height = tile_size * stage.rows as f32;
    let half = tile_size / 2.0;
    let x = tile_size * column as f32 + half - width / 2.0;
    let z = -tile_size * row as f32 - half + height / 2.0;
    Some((x, z))
}

// ══════════════════════════════════════════════════════════════
// Lines
// ══════════════════════════════════════════════════════════════

fn line_length(stage: &StageData, line: Line) -> i32 {
    match line {
        Line::Row(_) => stage.columns,
        Line::Column(_) => stage.rows,
    }
}

/// Tile index of the `position`-th cell along a line.
fn line_cell(stage: &StageData, line: Line, position: i32) -> i32 {
    match line {
        Line::Row(row) => tile_index(stage, position, row),
        Line::Column(column) => tile_index(stage, column, position),
    }
}

/// Next populated position after `position` along `line`, scanning forward
/// and wrapping. Returns `position` itself when it is the only populated cell,
/// `None` when the line has no tiles at all.
pub fn next_populated(stage: &StageData, line: Line, position: i32) -> Option<i32> {
    let total = line_length(stage, line);
    if total <= 0 {
        return None;
    }
    (1..=total)
        .map(|step| (position + step).rem_euclid(total))
        .find(|&p| has_tile(stage, line_cell(stage, line, p)).is_some())
}

// ══════════════════════════════════════════════════════════════
// Adjacency recalculation
// ══════════════════════════════════════════════════════════════

/// Recompute the links of the row and the column that contain `tile_index`.
/// The tile itself need not exist (erasing a tile relinks its neighbours).
/// Returns false when the index cannot be mapped to a cell.
pub fn recalculate_adjacents(stage: &mut StageData, tile_index: i32) -> bool {
    let Some((column, row)) = tile_path(stage, tile_index) else {
        error!("could not calculate adjacents for tile {tile_index}: stage has no columns");
        return false;
    };
    recalculate_line(stage, Line::Row(row));
    recalculate_line(stage, Line::Column(column));
    true
}

/// Relink one full line. Holes are skipped; every populated cell points
/// forward to the next populated cell and that cell points back.
pub fn recalculate_line(stage: &mut StageData, line: Line) {
    let total = line_length(stage, line);
    if total <= 0 {
        return;
    }

    // Resolve lookups once; relinking never changes tile indices.
    let lookups: Vec<Option<usize>> = (0..total)
        .map(|p| has_tile(stage, line_cell(stage, line, p)))
        .collect();

    for position in 0..total {
        let Some(this_lookup) = lookups[position as usize] else { continue };

        let next = (1..=total)
            .map(|step| (position + step) % total)
            .find(|&p| lookups[p as usize].is_some());
        let Some(next_position) = next else { continue };
        let Some(next_lookup) = lookups[next_position as usize] else { continue };

        let this_index = line_cell(stage, line, position);
        let next_index = line_cell(stage, line, next_position);
        match line {
            Line::Row(_) => {
                stage.tiles[this_lookup].tile_right = next_index;
                stage.tiles[next_lookup].tile_left = this_index;
            }
            Line::Column(_) => {
                stage.tiles[this_lookup].tile_down = next_index;
                stage.tiles[next_lookup].tile_up = this_index;
            }
        }
    }
}

/// Relink every row and every column of the stage.
pub fn link_all(stage: &mut StageData) {
    for row in 0..stage.rows {
        recalculate_line(stage, Line::Row(row));
    }
    for column in 0..stage.columns {
        recalculate_line(stage, Line::Column(column));
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stage::TileData;

    /// Stage from an ASCII mask: '#' = tile, anything else = hole.
    /// Links are left self-pointing until `link_all` runs.
    fn grid(rows: &[&str]) -> StageData {
        let h = rows.len() as i32;
        let w = rows[0].len() as i32;
        let mut tiles = vec![];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    tiles.push(TileData::isolated(y as i32 * w + x as i32, 0, 0));
                }
            }
        }
        StageData {
            stage_id: "test".into(),
            columns: w,
            rows: h,
            tiles,
            props: vec![],
            players: vec![],
        }
    }

    fn tile(stage: &StageData, index: i32) -> &TileData {
        &stage.tiles[has_tile(stage, index).unwrap()]
    }

    // ── Index / path ──

    #[test]
    fn index_and_path_agree() {
        let stage = grid(&["####", "####", "####"]);
        for row in 0..3 {
            for column in 0..4 {
                let idx = tile_index(&stage, column, row);
                assert_eq!(tile_path(&stage, idx), Some((column, row)));
            }
        }
        assert_eq!(tile_index(&stage, 2, 1), 6);
    }

    #[test]
    fn path_without_columns_is_invalid() {
        let mut stage = grid(&["#"]);
        stage.columns = 0;
        assert_eq!(tile_path(&stage, 3), None);
    }

    #[test]
    fn path_floors_negative_indices() {
        let stage = grid(&["###"]);
        assert_eq!(tile_path(&stage, -1), Some((2, -1)));
        // -2147483648 = -715827883 * 3 + 1
        assert_eq!(tile_path(&stage, i32::MIN), Some((1, -715_827_883)));
    }

    #[test]
    fn has_tile_matches_enumeration() {
        let stage = grid(&["#.#", ".##", "#.."]);
        for row in 0..stage.rows {
            for column in 0..stage.columns {
                let idx = tile_index(&stage, column, row);
                let scanned = stage.tiles.iter().position(|t| t.tile_index == idx);
                assert_eq!(has_tile(&stage, idx), scanned);
            }
        }
        assert_eq!(has_tile(&stage, 1), None);
        assert_eq!(has_tile(&stage, 2), Some(1));
    }

    #[test]
    fn has_tile_returns_first_duplicate() {
        let mut stage = grid(&["##"]);
        stage.tiles.push(TileData::isolated(0, 3, 0));
        assert_eq!(has_tile(&stage, 0), Some(0));
    }

    #[test]
    fn tile_position_is_centered() {
        let stage = grid(&["##", "##"]);
        assert_eq!(tile_position(&stage, 1.0, 0), Some((-0.5, 0.5)));
        assert_eq!(tile_position(&stage, 1.0, 3), Some((0.5, -0.5)));
        assert_eq!(tile_position(&stage, 2.0, 1), Some((1.0, 1.0)));
    }

    // ── Adjacency ──

    #[test]
    fn full_grid_wraps_both_axes() {
        let mut stage = grid(&["###", "###"]);
        link_all(&mut stage);
        let t0 = tile(&stage, 0);
        assert_eq!((t0.tile_left, t0.tile_right), (2, 1));
        assert_eq!((t0.tile_up, t0.tile_down), (3, 3));
        let t5 = tile(&stage, 5);
        assert_eq!((t5.tile_left, t5.tile_right), (4, 3));
    }

    #[test]
    fn holes_are_skipped() {
        let mut stage = grid(&["#.#.#"]);
        link_all(&mut stage);
        assert_eq!(tile(&stage, 0).tile_right, 2);
        assert_eq!(tile(&stage, 2).tile_right, 4);
        assert_eq!(tile(&stage, 4).tile_right, 0);
        assert_eq!(tile(&stage, 0).tile_left, 4);
        assert_eq!(tile(&stage, 4).tile_left, 2);
    }

    #[test]
    fn lone_tile_self_loops() {
        let mut stage = grid(&["..#..", "#####"]);
        link_all(&mut stage);
        let t = tile(&stage, 2);
        assert_eq!((t.tile_left, t.tile_right), (2, 2));
        // Column 2 has two tiles: 2 and 7.
        assert_eq!((t.tile_up, t.tile_down), (7, 7));

        let mut single = grid(&["#"]);
        link_all(&mut single);
        let t = tile(&single, 0);
        assert_eq!((t.tile_left, t.tile_right, t.tile_up, t.tile_down), (0, 0, 0, 0));
    }

    #[test]
    fn recalculation_is_idempotent() {
        let mut stage = grid(&["#.##", "##.#", ".###"]);
        link_all(&mut stage);
        recalculate_adjacents(&mut stage, 5);
        let once = stage.clone();
        recalculate_adjacents(&mut stage, 5);
        assert_eq!(stage, once);
        link_all(&mut stage);
        assert_eq!(stage, once);
    }

    #[test]
    fn editing_relinks_neighbours() {
        let mut stage = grid(&["####"]);
        link_all(&mut stage);
        // Remove tile 1: 0 must now link straight to 2.
        let idx = has_tile(&stage, 1).unwrap();
        stage.tiles.remove(idx);
        assert!(recalculate_adjacents(&mut stage, 1));
        assert_eq!(tile(&stage, 0).tile_right, 2);
        assert_eq!(tile(&stage, 2).tile_left, 0);
    }

    #[test]
    fn recalculate_rejects_unmappable_index() {
        let mut stage = grid(&["#"]);
        stage.columns = 0;
        assert!(!recalculate_adjacents(&mut stage, 0));
    }

    #[test]
    fn next_populated_cycles_a_full_row() {
        let n = 6;
        let mut stage = grid(&["######"]);
        link_all(&mut stage);
        for start in 0..n {
            let mut seen = vec![start];
            let mut p = start;
            loop {
                p = next_populated(&stage, Line::Row(0), p).unwrap();
                if p == start {
                    break;
                }
                assert!(!seen.contains(&p));
                seen.push(p);
            }
            assert_eq!(seen.len(), n as usize);
        }
    }

    #[test]
    fn next_populated_on_empty_line() {
        let stage = grid(&["##", ".."]);
        assert_eq!(next_populated(&stage, Line::Row(1), 0), None);
        assert_eq!(next_populated(&stage, Line::Column(0), 0), Some(0));
    }
}
