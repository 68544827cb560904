//! Console board rendering for drivers: terrain with bugs and towers
//! overlaid, every cell padded to the widest element.

use crate::game::TdGame;
use crate::map::Position;
use std::collections::BTreeMap;

pub fn render(game: &TdGame) -> String {
    let map = game.map();

    let mut bug_cells: BTreeMap<Position, Vec<&str>> = BTreeMap::new();
    for bug in game.bugs().values() {
        if let Some(pos) = bug.position {
            bug_cells.entry(pos).or_default().push(&bug.id);
        }
    }
    // One tower per position in the common case; later builds win the cell.
    let mut tower_cells: BTreeMap<Position, &str> = BTreeMap::new();
    for tower in game.towers().values() {
        tower_cells.insert(tower.position, &tower.id);
    }

    let mut grid: Vec<Vec<String>> = Vec::with_capacity(map.height());
    let mut width = 1;
    for (y, row) in map.rows().iter().enumerate() {
        let mut cells = Vec::with_capacity(row.len());
        for (x, cell) in row.iter().enumerate() {
            let pos = Position::new(x as i32, y as i32);
            let elem = if let Some(bugs) = bug_cells.get(&pos) {
                collapse_bug_ids(bugs)
            } else if let Some(tower) = tower_cells.get(&pos) {
                tower.to_string()
            } else {
                cell.code().to_string()
            };
            width = width.max(elem.len());
            cells.push(elem);
        }
        grid.push(cells);
    }

    let rows: Vec<String> = grid
        .iter()
        .map(|cells| {
            let padded: Vec<String> = cells
                .iter()
                .map(|elem| format!("{:<width$}", elem, width = width))
                .collect();
            padded.join("  ").trim_end().to_string()
        })
        .collect();
    rows.join("\n")
}

/// A lone bug shows its id; stacked bugs collapse to `B(1,2)` using the
/// ids' numeric suffixes where present.
fn collapse_bug_ids(ids: &[&str]) -> String {
    if ids.len() == 1 {
        return ids[0].to_string();
    }
    let suffixes: Vec<&str> = ids
        .iter()
        .map(|id| id.strip_prefix('B').unwrap_or(id))
        .collect();
    format!("B({})", suffixes.join(","))
}
