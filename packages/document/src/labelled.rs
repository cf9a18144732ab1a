//! Segment fields read from labelled cells.
//!
//! Spreadsheet documents (delivery challans) repeat their header block for
//! every segment: `Challan No:` followed somewhere to the right by the
//! number, `To:` with the consignee in the row below, and so on. Each field
//! is found by its exact label and then by scanning for the first usable
//! value.

use chrono::NaiveDateTime;
use lineitem_grid::find_first_exact;
use lineitem_grid_models::{Cell, Grid};
use lineitem_record_models::StaticFields;

use crate::DocumentError;
use crate::profile::{LabelledField, ScanDirection};

/// Reads the configured labelled fields from a segment grid.
#[derive(Debug, Clone, Copy)]
pub struct LabelledCellFields<'a> {
    fields: &'a [LabelledField],
}

impl<'a> LabelledCellFields<'a> {
    #[must_use]
    pub const fn new(fields: &'a [LabelledField]) -> Self {
        Self { fields }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Extracts every field from `grid`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::MissingStaticField`] if the label of a
    /// required field does not occur in `grid`.
    pub fn extract(&self, grid: &Grid, page: usize) -> Result<StaticFields, DocumentError> {
        let mut values = StaticFields::new();

        for field in self.fields {
            let Some(position) = find_first_exact(grid, &field.label) else {
                if field.required {
                    return Err(DocumentError::MissingStaticField {
                        field: field.name.clone(),
                        page: page + 1,
                    });
                }
                values.insert(field.name.as_str(), "");
                continue;
            };

            let (row, first_column) = match field.direction {
                ScanDirection::Right => (position.row, position.column + 1),
                ScanDirection::Below => (position.row + 1, position.column),
            };

            let candidates = grid.row(row).unwrap_or_default();
            let value = candidates
                .get(first_column..)
                .unwrap_or_default()
                .iter()
                .find(|cell| accepts(field, cell))
                .map(|cell| finish(field, cell.as_str()));

            if let Some(value) = value {
                values.insert(field.name.as_str(), value);
            } else {
                log::warn!(
                    "No value for '{}' next to label at {} on page {}",
                    field.name,
                    position.reference(),
                    page + 1
                );
                values.insert(field.name.as_str(), "");
            }
        }

        Ok(values)
    }
}

fn accepts(field: &LabelledField, cell: &Cell) -> bool {
    let text = cell.match_text();
    if field.skip.iter().any(|skip| skip == text.trim()) {
        return false;
    }
    field
        .datetime_format
        .as_deref()
        .is_none_or(|format| NaiveDateTime::parse_from_str(text.trim(), format).is_ok())
}

fn finish(field: &LabelledField, raw: &str) -> String {
    let taken = field.take.map_or(raw, |take| take.apply(raw));
    field
        .corrections
        .iter()
        .fold(taken.trim().to_owned(), |value, correction| {
            correction.apply(&value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<LabelledField> {
        toml::from_str::<Wrapper>(
            r#"
            [[fields]]
            name = "Challan No"
            label = "Challan No:"
            corrections = ["ocr_letter_o_to_zero"]

            [[fields]]
            name = "Challan Date"
            label = "Date"
            datetime_format = "%Y-%m-%d %H:%M:%S"
            take = "first_word"

            [[fields]]
            name = "Consignee"
            label = "To:"
            direction = "below"
            take = "first_line"

            [[fields]]
            name = "Delivery Mode"
            label = "Delivery Mode"
            skip = ["", "nan", ":"]
            "#,
        )
        .unwrap()
        .fields
    }

    #[derive(serde::Deserialize)]
    struct Wrapper {
        fields: Vec<LabelledField>,
    }

    fn challan_header() -> Grid {
        Grid::new(vec![
            vec![
                "Challan No:".into(),
                Cell::Missing,
                "".into(),
                "CH-2O24-OO7".into(),
            ],
            vec![
                "Date".into(),
                "31/01/2024".into(),
                "2024-01-31 00:00:00".into(),
            ],
            vec!["To:".into(), "".into()],
            vec![Cell::Missing, "".into(), "H&M Hennes\nStockholm".into()],
            vec!["Delivery Mode".into(), ":".into(), Cell::Missing, "By Road".into()],
        ])
    }

    #[test]
    fn reads_every_challan_field() {
        let fields = fields();
        let values = LabelledCellFields::new(&fields)
            .extract(&challan_header(), 0)
            .unwrap();
        let pairs: Vec<(&str, &str)> = values.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("Challan No", "CH-2024-007"),
                ("Challan Date", "2024-01-31"),
                ("Consignee", "H&M Hennes"),
                ("Delivery Mode", "By Road"),
            ]
        );
    }

    #[test]
    fn missing_required_label_reports_field_and_page() {
        let fields = fields();
        let grid = Grid::from_strings([["Date", "2024-01-31 00:00:00"]]);
        let err = LabelledCellFields::new(&fields).extract(&grid, 2).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::MissingStaticField { ref field, page: 3 } if field == "Challan No"
        ));
    }

    #[test]
    fn optional_label_and_missing_value_read_empty() {
        let mut fields = fields();
        for field in &mut fields {
            field.required = false;
        }
        let grid = Grid::from_strings([vec!["Challan No:", "", "nan"]]);
        let values = LabelledCellFields::new(&fields).extract(&grid, 0).unwrap();
        assert_eq!(values.get("Challan No"), Some(""));
        assert_eq!(values.get("Consignee"), Some(""));
        assert_eq!(values.len(), 4);
    }

    #[test]
    fn emptiness_follows_the_field_list() {
        assert!(LabelledCellFields::new(&[]).is_empty());
        assert!(!LabelledCellFields::new(&fields()).is_empty());
    }
}
