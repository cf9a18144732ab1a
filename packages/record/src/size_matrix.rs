//! Size-matrix reconstruction.
//!
//! A size-matrix segment looks like this once realigned:
//!
//! ```text
//! row 0   anchor (style number)
//! row 1   header: ... S  M  L ... [Prepack Code] [Prepacks] Qty
//! row 2   color code  2  4  6 ...  P1            12         288
//! row 3   color name
//! row 4   color code  ...
//! ```
//!
//! Every (color group, size) pair becomes one record.

use std::ops::Range;

use lineitem_grid::realign;
use lineitem_grid_models::{Grid, Segment};
use lineitem_record_models::{
    ColumnRole, LineItem, OutputRecord, Reconstruction, SizeLine, SizeMatrixHints, Skip,
    StaticFields, VariantHints,
};

use crate::roles::ColumnRoleMap;
use crate::{BarcodeLookup, ReconstructError};

/// Reconstructs size-matrix segments for one document variant.
#[derive(Debug, Clone)]
pub struct SizeMatrixReconstructor {
    hints: SizeMatrixHints,
    variant: VariantHints,
}

impl SizeMatrixReconstructor {
    /// # Errors
    ///
    /// Returns [`ReconstructError::InvalidHints`] if groups would not advance
    /// or would start above the header row.
    pub fn new(hints: SizeMatrixHints, flagged: bool) -> Result<Self, ReconstructError> {
        if hints.group_rows == 0 {
            return Err(ReconstructError::InvalidHints(
                "group_rows must be at least 1".to_owned(),
            ));
        }
        if hints.first_group_row <= hints.header_row {
            return Err(ReconstructError::InvalidHints(format!(
                "first_group_row ({}) must come after header_row ({})",
                hints.first_group_row, hints.header_row
            )));
        }
        let variant = hints.variant(flagged).clone();
        Ok(Self { hints, variant })
    }

    #[must_use]
    pub const fn hints(&self) -> &SizeMatrixHints {
        &self.hints
    }

    /// Reconstructs every item of `segment`.
    ///
    /// Malformed items and records are reported in
    /// [`Reconstruction::skipped`]; barcode misses leave the barcode empty
    /// and are counted.
    #[must_use]
    pub fn reconstruct(
        &self,
        segment: &Segment,
        static_fields: &StaticFields,
        barcodes: &dyn BarcodeLookup,
    ) -> Reconstruction {
        let grid = realign(segment.grid(), &self.hints.delimiter);
        let mut out = Reconstruction::default();

        let roles = match ColumnRoleMap::infer(&grid, segment.id(), &self.hints, &self.variant) {
            Ok(roles) => roles,
            Err(skip) => {
                log::debug!("Skipping segment {}: {skip}", segment.id());
                out.skipped.push(skip);
                return out;
            }
        };

        let item = ItemContext {
            grid: &grid,
            segment: segment.id(),
            roles: &roles,
            hints: &self.hints,
            static_fields,
            barcodes,
        };

        let height = grid.height();
        let code_column = roles.color_code_column();
        let mut row = self.hints.first_group_row;
        while row < height {
            let code = grid.text_at(row, code_column).trim();
            if code.is_empty() {
                log::trace!("Segment {}: no color in row {row}, skipping group", segment.id());
            } else if self.hints.correction(code).is_some() {
                item.emit(row..row + 1, None, &mut out);
                if row + 1 < height {
                    item.emit(row + 1..row + 2, Some(roles.color_name_column()), &mut out);
                }
            } else {
                let end = (row + self.hints.group_rows).min(height);
                item.emit(row..end, Some(roles.color_name_column()), &mut out);
            }
            row += self.hints.group_rows;
        }

        log::debug!(
            "Segment {}: {} record(s), {} skipped, {} barcode miss(es)",
            segment.id(),
            out.records.len(),
            out.skipped.len(),
            out.barcode_misses
        );

        out
    }
}

struct ItemContext<'a> {
    grid: &'a Grid,
    segment: usize,
    roles: &'a ColumnRoleMap,
    hints: &'a SizeMatrixHints,
    static_fields: &'a StaticFields,
    barcodes: &'a dyn BarcodeLookup,
}

impl ItemContext<'_> {
    fn cell(&self, row: usize, column: Option<usize>) -> String {
        column
            .map_or("", |column| self.grid.text_at(row, column))
            .trim()
            .to_owned()
    }

    /// Emits one record per size for the item spanning `rows`. The color name
    /// is read from the last row; `None` reads it from the color code column.
    fn emit(&self, rows: Range<usize>, name_column: Option<usize>, out: &mut Reconstruction) {
        let first = rows.start;
        let last = rows.end - 1;

        let prepacks = match self.roles.column(ColumnRole::Prepacks) {
            None => None,
            Some(column) => {
                let raw = self.cell(first, Some(column));
                let raw = if raw.is_empty() { "0".to_owned() } else { raw };
                match raw.parse::<i64>() {
                    Ok(0) => {
                        out.skipped.push(Skip::ZeroPrepacks {
                            segment: self.segment,
                            row: first,
                        });
                        return;
                    }
                    Ok(n) => Some(n),
                    Err(_) => {
                        log::debug!(
                            "Segment {}: prepacks '{raw}' in row {first} is not a number",
                            self.segment
                        );
                        out.skipped.push(Skip::MalformedPrepacks {
                            segment: self.segment,
                            row: first,
                            value: raw,
                        });
                        return;
                    }
                }
            }
        };

        let code_column = Some(self.roles.color_code_column());
        let code = self.cell(first, code_column);
        let name = self.cell(last, name_column.or(code_column));
        let (color_code, color_key) = match self.hints.correction(&name) {
            Some(correction) => (correction.raw.clone(), correction.display.clone()),
            None => {
                let description = format!("{code} {name}");
                (description.clone(), description)
            }
        };

        let prepack_code = self.cell(first, self.roles.column(ColumnRole::PrepackCode));
        let style_qty = self
            .cell(first, self.roles.column(ColumnRole::Qty))
            .replace('.', "");

        for size in self.roles.sizes() {
            let raw = self.cell(first, size.column);
            let prepack_qty = if raw.is_empty() {
                0
            } else if let Ok(n) = raw.parse::<i64>() {
                n
            } else {
                out.skipped.push(Skip::MalformedPrepackQty {
                    segment: self.segment,
                    row: first,
                    size: size.label.clone(),
                    value: raw,
                });
                continue;
            };

            let barcode = if let Some(barcode) = self.barcodes.lookup(&color_key, &size.label) {
                barcode.to_owned()
            } else {
                log::debug!(
                    "Segment {}: no barcode for color '{color_key}', size '{}'",
                    self.segment,
                    size.label
                );
                out.barcode_misses += 1;
                String::new()
            };

            out.records.push(OutputRecord {
                static_fields: self.static_fields.clone(),
                item: LineItem::Size(SizeLine {
                    prepack_code: prepack_code.clone(),
                    prepacks,
                    color_code: color_code.clone(),
                    size: size.label.clone(),
                    prepack_qty,
                    qty: prepacks.unwrap_or(1).saturating_mul(prepack_qty),
                    style_qty: style_qty.clone(),
                    barcode,
                }),
            });
        }
    }
}
