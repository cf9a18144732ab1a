//! Positional column-role inference for size-matrix segments.

use lineitem_grid_models::Grid;
use lineitem_record_models::{ColumnRole, SizeMatrixHints, Skip, VariantHints};

/// A size label and the column its quantities sit in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeColumn {
    pub label: String,
    /// `None` when the label was overwritten by a role relabel.
    pub column: Option<usize>,
}

/// Role to column mapping for one segment, built once before any group is
/// read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRoleMap {
    labels: Vec<String>,
    color_code: usize,
    color_name: usize,
    sizes: Vec<SizeColumn>,
}

impl ColumnRoleMap {
    /// Infers roles from a realigned segment grid.
    ///
    /// # Errors
    ///
    /// Returns a [`Skip`] when the segment has no data rows, no size labels
    /// or no color code in the first group row.
    pub fn infer(
        grid: &Grid,
        segment: usize,
        hints: &SizeMatrixHints,
        variant: &VariantHints,
    ) -> Result<Self, Skip> {
        if grid.height() <= hints.first_group_row {
            return Err(Skip::NoDataRows {
                segment,
                rows: grid.height(),
            });
        }

        let mut labels = header_labels(grid, hints.header_row);

        let Some(start) = labels.iter().position(|label| !label.is_empty()) else {
            return Err(Skip::NoSizeColumns { segment });
        };
        let run_end = labels[start..]
            .iter()
            .position(String::is_empty)
            .map_or(labels.len(), |offset| start + offset);
        let end = variant
            .size_sentinel
            .as_deref()
            .and_then(|sentinel| labels[start..].iter().position(|label| label == sentinel))
            .map_or(run_end, |offset| start + offset);
        let size_labels = labels[start..end].to_vec();
        if size_labels.is_empty() {
            return Err(Skip::NoSizeColumns { segment });
        }

        let Some(color_code) = first_populated(grid, hints.first_group_row) else {
            return Err(Skip::NoColorCode {
                segment,
                row: hints.first_group_row,
            });
        };
        let color_name = if grid.height() > hints.first_group_row + 1 {
            first_populated(grid, hints.first_group_row + 1).unwrap_or(color_code)
        } else {
            color_code
        };

        if let Some(label) = labels.get_mut(color_code) {
            *label = ColumnRole::ColorCode.to_string();
        }
        let roles = variant.trailing_roles.roles();
        if labels.len() >= roles.len() {
            let offset = labels.len() - roles.len();
            for (label, role) in labels[offset..].iter_mut().zip(roles) {
                *label = role.to_string();
            }
        }

        let sizes = size_labels
            .into_iter()
            .map(|label| {
                let column = labels.iter().position(|l| *l == label);
                SizeColumn { label, column }
            })
            .collect();

        Ok(Self {
            labels,
            color_code,
            color_name,
            sizes,
        })
    }

    /// First column whose final label is `role`.
    #[must_use]
    pub fn column(&self, role: ColumnRole) -> Option<usize> {
        self.labels.iter().position(|label| label == role.as_ref())
    }

    /// Column holding the color code in the first row of each group.
    #[must_use]
    pub const fn color_code_column(&self) -> usize {
        self.color_code
    }

    /// Column holding the color name in the last row of each group.
    #[must_use]
    pub const fn color_name_column(&self) -> usize {
        self.color_name
    }

    #[must_use]
    pub fn sizes(&self) -> &[SizeColumn] {
        &self.sizes
    }

    /// Header labels after role relabeling.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

fn header_labels(grid: &Grid, header_row: usize) -> Vec<String> {
    grid.row(header_row)
        .unwrap_or_default()
        .iter()
        .flat_map(|cell| cell.as_str().trim().split('\n'))
        .map(str::to_owned)
        .collect()
}

fn first_populated(grid: &Grid, row: usize) -> Option<usize> {
    grid.row(row)?.iter().position(|cell| !cell.is_empty())
}

#[cfg(test)]
mod tests {
    use lineitem_record_models::TrailingRoles;

    use super::*;

    fn hints() -> SizeMatrixHints {
        SizeMatrixHints {
            header_row: 1,
            first_group_row: 2,
            group_rows: 2,
            delimiter: "\n".to_owned(),
            plain: VariantHints {
                trailing_roles: TrailingRoles::Qty,
                size_sentinel: None,
            },
            flagged: Some(VariantHints {
                trailing_roles: TrailingRoles::PrepackCodePrepacksQty,
                size_sentinel: Some("ASS".to_owned()),
            }),
            color_corrections: Vec::new(),
        }
    }

    fn plain_grid() -> Grid {
        Grid::from_strings([
            vec!["101", "", "", "", "", "", ""],
            vec!["", "", "S", "M", "L", "", "Qty"],
            vec!["09-111", "", "2", "4", "6", "", "12"],
            vec!["", "Black", "", "", "", "", ""],
        ])
    }

    #[test]
    fn plain_layout_roles() {
        let h = hints();
        let map = ColumnRoleMap::infer(&plain_grid(), 1, &h, &h.plain).unwrap();
        let sizes: Vec<(&str, Option<usize>)> = map
            .sizes()
            .iter()
            .map(|s| (s.label.as_str(), s.column))
            .collect();
        assert_eq!(sizes, vec![("S", Some(2)), ("M", Some(3)), ("L", Some(4))]);
        assert_eq!(map.column(ColumnRole::ColorCode), Some(0));
        assert_eq!(map.column(ColumnRole::Qty), Some(6));
        assert_eq!(map.column(ColumnRole::Prepacks), None);
        assert_eq!(map.color_name_column(), 1);
    }

    #[test]
    fn sentinel_ends_size_list() {
        let grid = Grid::from_strings([
            vec!["101", "", "", "", "", "", "", ""],
            vec!["", "S", "M", "ASS", "", "Code", "Packs", "Qty"],
            vec!["09-111", "1", "2", "", "", "P1", "12", "288"],
        ]);
        let h = hints();
        let variant = h.variant(true);
        let map = ColumnRoleMap::infer(&grid, 1, &h, variant).unwrap();
        let labels: Vec<&str> = map.sizes().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["S", "M"]);
        assert_eq!(map.column(ColumnRole::PrepackCode), Some(5));
        assert_eq!(map.column(ColumnRole::Prepacks), Some(6));
        assert_eq!(map.column(ColumnRole::Qty), Some(7));
        // Only one group row: the name falls back to the code column.
        assert_eq!(map.color_name_column(), map.color_code_column());
    }

    #[test]
    fn sentinel_absent_falls_back_to_empty_label() {
        let h = hints();
        let variant = h.variant(true);
        let map = ColumnRoleMap::infer(&plain_grid(), 1, &h, variant).unwrap();
        assert_eq!(map.sizes().len(), 3);
        // "L" was relabeled to "Prepack Code", so its quantity column is lost.
        assert_eq!(map.sizes()[2].column, None);
    }

    #[test]
    fn header_cells_with_line_breaks_are_flattened() {
        let grid = Grid::new(vec![
            vec![],
            vec!["".into(), " S\nM ".into(), "Qty".into()],
            vec!["C1".into(), "1".into(), "2".into()],
        ]);
        let h = hints();
        let map = ColumnRoleMap::infer(&grid, 1, &h, &h.plain).unwrap();
        assert_eq!(map.labels(), ["Color Code", "S", "M", "Qty"]);
    }

    #[test]
    fn too_few_rows_is_a_skip() {
        let grid = Grid::from_strings([["101"], ["S"]]);
        let h = hints();
        assert_eq!(
            ColumnRoleMap::infer(&grid, 3, &h, &h.plain),
            Err(Skip::NoDataRows { segment: 3, rows: 2 })
        );
    }

    #[test]
    fn blank_header_is_a_skip() {
        let grid = Grid::from_strings([["101", ""], ["", ""], ["x", "1"]]);
        let h = hints();
        assert_eq!(
            ColumnRoleMap::infer(&grid, 1, &h, &h.plain),
            Err(Skip::NoSizeColumns { segment: 1 })
        );
    }
}
