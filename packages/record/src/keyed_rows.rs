//! Keyed-row reconstruction.
//!
//! Used for documents that list one line item per row, identified by a key
//! such as an order number (`123-45`). The first cell matching the key
//! pattern fixes the key column; every row with a matching key in that column
//! becomes one record.

use lineitem_grid::find_first_pattern;
use lineitem_grid_models::{Cell, Segment};
use lineitem_record_models::{
    KeyedLine, KeyedRowHints, LineItem, OutputRecord, Reconstruction, Skip, StaticFields,
};
use regex::Regex;

use crate::ReconstructError;

#[derive(Debug, Clone)]
pub struct KeyedRowReconstructor {
    hints: KeyedRowHints,
    pattern: Regex,
}

impl KeyedRowReconstructor {
    /// # Errors
    ///
    /// * [`ReconstructError::InvalidPattern`] if the key pattern does not
    ///   compile
    /// * [`ReconstructError::InvalidHints`] if no value fields are configured
    pub fn new(hints: KeyedRowHints) -> Result<Self, ReconstructError> {
        let pattern = Regex::new(&hints.key_pattern)?;
        if hints.fields.is_empty() {
            return Err(ReconstructError::InvalidHints(
                "keyed rows need at least one value field".to_owned(),
            ));
        }
        Ok(Self { hints, pattern })
    }

    #[must_use]
    pub const fn hints(&self) -> &KeyedRowHints {
        &self.hints
    }

    fn is_filler(&self, cell: &Cell) -> bool {
        let text = cell.match_text().trim();
        self.hints.filler.iter().any(|filler| filler == text)
    }

    #[must_use]
    pub fn reconstruct(&self, segment: &Segment, static_fields: &StaticFields) -> Reconstruction {
        let grid = segment.grid();
        let mut out = Reconstruction::default();

        let Some(start) = find_first_pattern(grid, &self.pattern) else {
            log::debug!(
                "Segment {}: no key matching '{}'",
                segment.id(),
                self.hints.key_pattern
            );
            out.skipped.push(Skip::NoKeyColumn {
                segment: segment.id(),
                pattern: self.hints.key_pattern.clone(),
            });
            return out;
        };
        let key_column = start.column;

        for (row, cells) in grid.rows().iter().enumerate().skip(start.row) {
            let Some(key) = cells.get(key_column) else {
                continue;
            };
            if !self.pattern.is_match(key.match_text()) {
                continue;
            }
            let key = key.as_str().trim();

            let values: Vec<&str> = cells[key_column + 1..]
                .iter()
                .filter(|cell| !self.is_filler(cell))
                .map(|cell| cell.as_str().trim())
                .take(self.hints.fields.len())
                .collect();

            if values.len() < self.hints.fields.len() {
                out.skipped.push(Skip::IncompleteRow {
                    segment: segment.id(),
                    row,
                    key: key.to_owned(),
                    found: values.len(),
                    expected: self.hints.fields.len(),
                });
                continue;
            }

            let mut line = StaticFields::new();
            line.insert(self.hints.key_field.as_str(), key);
            for (field, value) in self.hints.fields.iter().zip(values) {
                line.insert(field.as_str(), value);
            }

            out.records.push(OutputRecord {
                static_fields: static_fields.clone(),
                item: LineItem::Keyed(KeyedLine { values: line }),
            });
        }

        log::debug!(
            "Segment {}: {} keyed record(s), {} skipped",
            segment.id(),
            out.records.len(),
            out.skipped.len()
        );

        out
    }
}

#[cfg(test)]
mod tests {
    use lineitem_grid_models::Grid;

    use super::*;

    fn hints() -> KeyedRowHints {
        KeyedRowHints {
            key_pattern: r"^\d+-\d+$".to_owned(),
            key_field: "Order No".to_owned(),
            fields: vec!["Carton".to_owned(), "Pcs".to_owned(), "Country".to_owned()],
            filler: vec![String::new(), "nan".to_owned()],
        }
    }

    fn challan() -> Segment {
        Segment::new(
            1,
            1,
            Grid::new(vec![
                vec!["".into(), "".into(), "".into(), "ACME Co.".into()],
                vec!["Challan No:".into(), "CH-1".into(), Cell::Missing, Cell::Missing],
                vec!["Order".into(), "Carton".into(), "Pcs".into(), "Country".into()],
                vec!["123-45".into(), "12".into(), "240".into(), "BD".into()],
                vec!["678-90".into(), Cell::Missing, "3".into(), "".into(), "60".into(), "IN".into()],
                vec!["999-11".into(), "1".into()],
                vec!["note 1-2x".into(), "5".into(), "5".into(), "5".into()],
            ]),
        )
    }

    #[test]
    fn emits_one_record_per_keyed_row() {
        let reconstructor = KeyedRowReconstructor::new(hints()).unwrap();
        let fields: StaticFields = [("Challan No", "CH-1")].into_iter().collect();
        let out = reconstructor.reconstruct(&challan(), &fields);

        let rows: Vec<Vec<(&str, &str)>> = out
            .records
            .iter()
            .map(|record| match &record.item {
                LineItem::Keyed(line) => line.values.iter().collect(),
                LineItem::Size(_) => panic!("unexpected size line"),
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                vec![("Order No", "123-45"), ("Carton", "12"), ("Pcs", "240"), ("Country", "BD")],
                vec![("Order No", "678-90"), ("Carton", "3"), ("Pcs", "60"), ("Country", "IN")],
            ]
        );
        assert_eq!(out.records[0].value("Challan No").as_deref(), Some("CH-1"));
    }

    #[test]
    fn short_rows_are_skipped_and_reported() {
        let reconstructor = KeyedRowReconstructor::new(hints()).unwrap();
        let out = reconstructor.reconstruct(&challan(), &StaticFields::new());
        assert_eq!(
            out.skipped,
            vec![Skip::IncompleteRow {
                segment: 1,
                row: 5,
                key: "999-11".to_owned(),
                found: 1,
                expected: 3,
            }]
        );
    }

    #[test]
    fn no_key_is_a_skip() {
        let reconstructor = KeyedRowReconstructor::new(hints()).unwrap();
        let segment = Segment::new(2, 0, Grid::from_strings([["ACME Co."], ["Total"]]));
        let out = reconstructor.reconstruct(&segment, &StaticFields::new());
        assert!(out.records.is_empty());
        assert!(matches!(&out.skipped[..], [Skip::NoKeyColumn { segment: 2, .. }]));
    }

    #[test]
    fn invalid_pattern_fails_construction() {
        let mut bad = hints();
        bad.key_pattern = "(".to_owned();
        assert!(matches!(
            KeyedRowReconstructor::new(bad),
            Err(ReconstructError::InvalidPattern(_))
        ));
    }
}
