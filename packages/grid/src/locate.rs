//! First-match cell lookup.
//!
//! Both lookups scan row-major (every column of row 0, then row 1, ...) and
//! return the first hit. "Not found" is `None`; callers must check before
//! indexing around the returned position.

use lineitem_grid_models::{CellPosition, Grid};
use regex::Regex;

/// Finds the first cell whose text equals `value` exactly.
///
/// Missing cells never match, so searching for `""` only finds cells that
/// hold empty text.
#[must_use]
pub fn find_first_exact(grid: &Grid, value: &str) -> Option<CellPosition> {
    grid.cells()
        .find(|(_, cell)| cell.equals(value))
        .map(|(position, _)| position)
}

/// Finds the first cell whose match text contains a match for `pattern`.
///
/// This is a search, not a full match: anchor the pattern with `^...$` to
/// require the whole cell. Missing cells are matched as
/// [`Cell::MISSING_TOKEN`](lineitem_grid_models::Cell::MISSING_TOKEN), so a
/// pattern such as `a` will hit the `nan` of an empty cell.
#[must_use]
pub fn find_first_pattern(grid: &Grid, pattern: &Regex) -> Option<CellPosition> {
    grid.cells()
        .find(|(_, cell)| pattern.is_match(cell.match_text()))
        .map(|(position, _)| position)
}
