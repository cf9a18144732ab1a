//! Column realignment for multi-line cells.
//!
//! Stream-mode table extraction sometimes merges values that belong to
//! neighbouring columns into one cell, separated by a line break
//! (`"S\nM\nL"`). Every column to the right of such a cell then sits one or
//! more positions too far left. [`realign`] splits those cells back out into
//! new columns inserted immediately to the right, which restores the
//! positional layout the rest of the engine relies on.

use lineitem_grid_models::{Cell, Grid};

/// Splits every column that contains `delimiter` anywhere into as many
/// columns as its longest split, in place.
///
/// - Part 0 of each cell stays in the original column; parts 1.. go into the
///   inserted columns. Rows with fewer parts get `""` there.
/// - Columns without the delimiter are copied unchanged.
/// - Missing cells come out as empty text, and short rows are padded, so the
///   result is always rectangular.
///
/// An empty `delimiter` splits nothing.
#[must_use]
pub fn realign(grid: &Grid, delimiter: &str) -> Grid {
    if delimiter.is_empty() {
        log::warn!("Realign called with an empty delimiter; normalizing only");
    }

    let height = grid.height();
    let width = grid.width();
    let mut rows: Vec<Vec<Cell>> = vec![Vec::with_capacity(width); height];
    let missing = Cell::Missing;

    for column in 0..width {
        let cells: Vec<&Cell> = grid
            .rows()
            .iter()
            .map(|row| row.get(column).unwrap_or(&missing))
            .collect();

        let needs_split = !delimiter.is_empty()
            && cells
                .iter()
                .any(|cell| matches!(cell, Cell::Text(text) if text.contains(delimiter)));

        if !needs_split {
            for (row, cell) in rows.iter_mut().zip(&cells) {
                row.push((*cell).clone().normalized());
            }
            continue;
        }

        let parts: Vec<Vec<&str>> = cells
            .iter()
            .map(|cell| match cell {
                Cell::Missing => Vec::new(),
                Cell::Text(text) => text.split(delimiter).collect(),
            })
            .collect();
        let split_width = parts.iter().map(Vec::len).max().unwrap_or(1);

        for (row, row_parts) in rows.iter_mut().zip(&parts) {
            for index in 0..split_width {
                row.push(Cell::text(row_parts.get(index).copied().unwrap_or("")));
            }
        }
    }

    Grid::new(rows)
}
