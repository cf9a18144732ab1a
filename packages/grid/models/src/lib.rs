#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Positional text grid model for extracted document tables.
//!
//! Upstream table extraction (PDF stream parsing, spreadsheet sheets) hands
//! us a noisy two-dimensional grid of text: merged cells, blank padding,
//! ragged rows and multi-line content. [`Grid`] keeps that shape as-is and
//! addresses everything by position, because column semantics differ from
//! one page to the next and can only be inferred later.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A single cell of an extracted table.
///
/// Empty text and a missing value are different inputs (a blank cell vs. a
/// cell the extractor never produced) but both read as `""` through
/// [`Cell::as_str`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Cell {
    /// No value at all (`null` in the extractor output).
    #[default]
    Missing,
    /// A text value, possibly empty.
    Text(String),
}

impl Cell {
    /// Rendering of a missing cell when it is matched against a regular
    /// expression. Patterns may rely on it, and scans over raw cells must
    /// treat it as filler.
    pub const MISSING_TOKEN: &'static str = "nan";

    /// Creates a text cell.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns the cell text, with missing cells reading as `""`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Missing => "",
            Self::Text(value) => value,
        }
    }

    /// Returns the string a pattern is matched against: the text itself, or
    /// [`Cell::MISSING_TOKEN`] for missing cells.
    #[must_use]
    pub fn match_text(&self) -> &str {
        match self {
            Self::Missing => Self::MISSING_TOKEN,
            Self::Text(value) => value,
        }
    }

    /// Exact comparison used by anchors and terminators. A missing cell
    /// never equals anything, not even `""`.
    #[must_use]
    pub fn equals(&self, value: &str) -> bool {
        matches!(self, Self::Text(text) if text == value)
    }

    /// Whether the cell reads as `""`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    /// Whether the cell is [`Cell::Missing`].
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Converts missing cells to empty text.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Missing => Self::Text(String::new()),
            text @ Self::Text(_) => text,
        }
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Missing, Self::Text)
    }
}

impl From<Cell> for Option<String> {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Missing => None,
            Cell::Text(value) => Some(value),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zero-based position of a cell inside a [`Grid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellPosition {
    /// Row index (0-based).
    pub row: usize,
    /// Column index (0-based).
    pub column: usize,
}

impl CellPosition {
    /// Creates a new position.
    #[must_use]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Spreadsheet-style reference (`A1`, `D12`, `AA3`) for log messages.
    #[must_use]
    pub fn reference(&self) -> String {
        let mut column = self.column + 1;
        let mut letters = Vec::new();
        while column > 0 {
            column -= 1;
            letters.push(b'A' + u8::try_from(column % 26).unwrap_or(0));
            column /= 26;
        }
        letters.reverse();
        format!("{}{}", String::from_utf8_lossy(&letters), self.row + 1)
    }
}

impl fmt::Display for CellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// An ordered sequence of rows of cells.
///
/// Rows may have different lengths; reading past the end of a row yields
/// nothing rather than panicking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// Creates a grid from rows of cells.
    #[must_use]
    pub const fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Builds a grid of text cells from anything string-like.
    #[must_use]
    pub fn from_strings<R, C, S>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|s| Cell::Text(s.into())).collect())
                .collect(),
        }
    }

    /// All rows in order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Consumes the grid and returns its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<Cell>> {
        self.rows
    }

    /// Returns the row at `index`, if present.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Returns the cell at (`row`, `column`), if present.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    /// Returns the text at (`row`, `column`), or `""` when the position is
    /// out of range or the cell is missing.
    #[must_use]
    pub fn text_at(&self, row: usize, column: usize) -> &str {
        self.get(row, column).map_or("", Cell::as_str)
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Whether the grid has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether every row has the same length.
    #[must_use]
    pub fn is_rectangular(&self) -> bool {
        self.rows
            .first()
            .is_none_or(|first| self.rows.iter().all(|row| row.len() == first.len()))
    }

    /// Appends a row.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Iterates over every cell in row-major order with its position.
    pub fn cells(&self) -> impl Iterator<Item = (CellPosition, &Cell)> {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(column, cell)| (CellPosition::new(row, column), cell))
        })
    }

    /// Returns a copy of the rows in `range` (clamped to the grid).
    #[must_use]
    pub fn slice_rows(&self, range: Range<usize>) -> Self {
        let end = range.end.min(self.rows.len());
        let start = range.start.min(end);
        Self {
            rows: self.rows[start..end].to_vec(),
        }
    }

    /// Truncates or pads (with [`Cell::Missing`]) every row to `width`.
    pub fn fit_to_width(&mut self, width: usize) {
        for row in &mut self.rows {
            row.resize(width, Cell::Missing);
        }
    }

    /// Drops every cell at or beyond column `width`.
    pub fn truncate_width(&mut self, width: usize) {
        for row in &mut self.rows {
            row.truncate(width);
        }
    }

    /// Appends all rows of `other` below this grid.
    pub fn extend(&mut self, other: Self) {
        self.rows.extend(other.rows);
    }
}

impl From<Vec<Vec<Cell>>> for Grid {
    fn from(rows: Vec<Vec<Cell>>) -> Self {
        Self::new(rows)
    }
}

/// A contiguous run of grid rows that belongs to one logical record group.
///
/// Produced by segmentation: the first row is always an anchor row, and the
/// rows keep their original order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    id: usize,
    first_row: usize,
    grid: Grid,
}

impl Segment {
    /// Creates a segment whose first row sat at `first_row` in the source
    /// grid.
    #[must_use]
    pub const fn new(id: usize, first_row: usize, grid: Grid) -> Self {
        Self {
            id,
            first_row,
            grid,
        }
    }

    /// Segment id, increasing in document order (1-based).
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Absolute index of the first row in the grid it was cut from.
    #[must_use]
    pub const fn first_row(&self) -> usize {
        self.first_row
    }

    /// Absolute row range covered by this segment.
    #[must_use]
    pub fn row_range(&self) -> Range<usize> {
        self.first_row..self.first_row + self.grid.height()
    }

    /// The segment rows as a grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Consumes the segment and returns its rows as a grid.
    #[must_use]
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grid.height()
    }

    /// Whether the segment has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }
}
