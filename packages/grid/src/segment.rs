//! Anchor-based segmentation.
//!
//! A document lists its line items as repeating blocks. Each block starts
//! with a row that carries a known anchor value (the style number, the
//! issuing company) in a fixed column, and usually ends with a row that
//! carries a terminator value (`HS Code: ...`, `Total :`) in some column.
//!
//! [`segment`] turns a page grid into those blocks:
//!
//! 1. Rows before the first anchor row are dropped.
//! 2. Every anchor row opens a new segment; other rows join the current one.
//! 3. Each segment is cut just before its first row containing the
//!    terminator in any column. Segments emptied by the cut are dropped.

use lineitem_grid_models::{Cell, Grid, Segment};

use crate::SegmentError;

/// Splits `grid` into anchored, terminator-truncated segments in document
/// order.
///
/// A trailing segment of a single row (the anchor row with nothing after it)
/// is returned as-is; it usually continues on the next page and the caller
/// decides whether to carry it over.
///
/// # Errors
///
/// Returns [`SegmentError::NoAnchorFound`] if no row holds `anchor_value` in
/// `anchor_column`.
pub fn segment(
    grid: Grid,
    anchor_column: usize,
    anchor_value: &str,
    terminator_value: &str,
) -> Result<Vec<Segment>, SegmentError> {
    let is_anchor =
        |row: &[Cell]| row.get(anchor_column).is_some_and(|cell| cell.equals(anchor_value));

    let rows = grid.into_rows();
    let Some(first_anchor) = rows.iter().position(|row| is_anchor(row)) else {
        return Err(SegmentError::NoAnchorFound {
            column: anchor_column,
            value: anchor_value.to_owned(),
        });
    };

    let mut segments = Vec::new();
    let mut current: Option<(usize, usize, Vec<Vec<Cell>>)> = None;
    let mut next_id = 0;

    for (index, row) in rows.into_iter().enumerate().skip(first_anchor) {
        if is_anchor(&row) {
            if let Some((id, start, group)) = current.take() {
                push_truncated(&mut segments, id, start, group, terminator_value);
            }
            next_id += 1;
            current = Some((next_id, index, Vec::new()));
        }
        if let Some((_, _, group)) = current.as_mut() {
            group.push(row);
        }
    }

    if let Some((id, start, group)) = current {
        push_truncated(&mut segments, id, start, group, terminator_value);
    }

    log::trace!(
        "Cut {} segment(s) on anchor '{anchor_value}' (column {anchor_column})",
        segments.len()
    );

    Ok(segments)
}

fn push_truncated(
    segments: &mut Vec<Segment>,
    id: usize,
    start: usize,
    mut rows: Vec<Vec<Cell>>,
    terminator_value: &str,
) {
    if let Some(end) = rows
        .iter()
        .position(|row| row.iter().any(|cell| cell.equals(terminator_value)))
    {
        rows.truncate(end);
    }

    if rows.is_empty() {
        log::trace!("Dropping segment {id}: terminator on its anchor row");
        return;
    }

    segments.push(Segment::new(id, start, Grid::new(rows)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|s| Cell::text(*s)).collect()
    }

    /// Anchor `"ACME Co."` in column 3, terminator `"Total :"` between the
    /// two anchors.
    fn acme_grid() -> Grid {
        Grid::new(vec![
            row(&["Delivery Challan", "", "", ""]),
            row(&["", "", "", "ACME Co."]),
            row(&["Challan No:", "CH-1", "", ""]),
            row(&["123-45", "12", "240", "BD"]),
            row(&["", "Total :", "240", ""]),
            row(&["signature", "", "", ""]),
            row(&["", "", "", "ACME Co."]),
            row(&["Challan No:", "CH-2", "", ""]),
            row(&["678-90", "3", "60", "IN"]),
        ])
    }

    #[test]
    fn acme_scenario_yields_two_segments() {
        let segments = segment(acme_grid(), 3, "ACME Co.", "Total :").unwrap();
        assert_eq!(segments.len(), 2);

        assert_eq!(segments[0].first_row(), 1);
        assert_eq!(segments[0].len(), 3);
        assert_eq!(segments[0].row_range(), 1..4);

        assert_eq!(segments[1].first_row(), 6);
        assert_eq!(segments[1].len(), 3);
        assert_eq!(segments[1].grid().text_at(2, 0), "678-90");
    }

    #[test]
    fn every_segment_starts_with_an_anchor_row() {
        let segments = segment(acme_grid(), 3, "ACME Co.", "Total :").unwrap();
        for seg in &segments {
            assert!(seg.grid().get(0, 3).is_some_and(|c| c.equals("ACME Co.")));
        }
    }

    #[test]
    fn one_segment_per_anchor_occurrence() {
        let mut rows = Vec::new();
        for i in 0..5 {
            rows.push(row(&["STYLE-1", "header"]));
            rows.push(row(&[&format!("data {i}"), "x"]));
        }
        let segments = segment(Grid::new(rows), 0, "STYLE-1", "HS Code: 6109").unwrap();
        assert_eq!(segments.len(), 5);
        let ids: Vec<usize> = segments.iter().map(Segment::id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn no_anchor_is_a_distinct_error() {
        let err = segment(acme_grid(), 0, "ACME Co.", "Total :").unwrap_err();
        assert_eq!(
            err,
            SegmentError::NoAnchorFound {
                column: 0,
                value: "ACME Co.".to_owned()
            }
        );
    }

    #[test]
    fn terminator_on_anchor_row_drops_segment() {
        let grid = Grid::new(vec![
            row(&["A", "Total :"]),
            row(&["x", "y"]),
            row(&["A", ""]),
            row(&["z", "w"]),
        ]);
        let segments = segment(grid, 0, "A", "Total :").unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id(), 2);
        assert_eq!(segments[0].first_row(), 2);
    }

    #[test]
    fn terminator_cuts_at_first_occurrence_only() {
        let grid = Grid::new(vec![
            row(&["A", ""]),
            row(&["1", ""]),
            row(&["", "END"]),
            row(&["2", ""]),
            row(&["", "END"]),
        ]);
        let segments = segment(grid, 0, "A", "END").unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].len(), 2);
    }

    #[test]
    fn trailing_single_row_segment_is_kept() {
        let grid = Grid::new(vec![
            row(&["A", "h"]),
            row(&["1", "2"]),
            row(&["A", "h"]),
        ]);
        let segments = segment(grid, 0, "A", "END").unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].len(), 1);
    }

    #[test]
    fn missing_anchor_cells_do_not_match() {
        let grid = Grid::new(vec![vec![Cell::Missing], row(&[""])]);
        assert!(segment(grid.clone(), 0, "", "END").is_ok());
        assert!(segment(grid, 0, "nan", "END").is_err());
    }

    #[test]
    fn short_rows_never_match_anchor_column() {
        let grid = Grid::new(vec![row(&["x"]), row(&["y", "A"]), row(&["z"])]);
        let segments = segment(grid, 1, "A", "END").unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].len(), 2);
    }
}
