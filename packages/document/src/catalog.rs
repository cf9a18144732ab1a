//! Barcode catalog read from the trailing pages of a purchase order.
//!
//! The catalog is a plain table whose last three columns are color, size and
//! barcode. Its first page carries a header row ending in the header label;
//! continuation pages start at the first row whose last cell is a number.
//! Extraction often adds empty spacer columns on the first page, so only the
//! columns populated in one of the first two data rows are kept there.

use std::collections::HashMap;

use lineitem_grid_models::{Cell, Grid};
use lineitem_record::BarcodeLookup;

/// One (color, size) → barcode entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub color: String,
    pub size: String,
    pub barcode: String,
}

/// Barcodes keyed by catalog color and size. The first entry for a key wins.
#[derive(Debug, Clone, Default)]
pub struct BarcodeCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<(String, String), usize>,
}

impl BarcodeCatalog {
    /// Builds the catalog from the grids of the catalog pages, in page order.
    #[must_use]
    pub fn from_pages(pages: impl IntoIterator<Item = Grid>, header_label: &str) -> Self {
        let mut catalog = Self::default();

        for (page, grid) in pages.into_iter().enumerate() {
            let rows = if page == 0 {
                first_page_rows(&grid, header_label)
            } else {
                continuation_rows(&grid)
            };
            for row in rows {
                catalog.push_row(&row);
            }
        }

        log::debug!("Barcode catalog has {} entries", catalog.len());
        catalog
    }

    fn push_row(&mut self, row: &[&Cell]) {
        let [.., color, size, barcode] = row else {
            return;
        };
        let barcode = barcode.as_str().trim();
        if barcode.is_empty() {
            return;
        }
        let key = (color.as_str().trim().to_owned(), size.as_str().trim().to_owned());
        if self.index.contains_key(&key) {
            return;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(CatalogEntry {
            color: key.0,
            size: key.1,
            barcode: barcode.to_owned(),
        });
    }

    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BarcodeLookup for BarcodeCatalog {
    fn lookup(&self, color: &str, size: &str) -> Option<&str> {
        self.index
            .get(&(color.to_owned(), size.to_owned()))
            .map(|&i| self.entries[i].barcode.as_str())
    }
}

fn first_page_rows<'a>(grid: &'a Grid, header_label: &str) -> Vec<Vec<&'a Cell>> {
    let Some(header) = grid
        .rows()
        .iter()
        .position(|row| row.last().is_some_and(|cell| cell.as_str().trim() == header_label))
    else {
        log::warn!("Catalog header '{header_label}' not found on the first catalog page");
        return Vec::new();
    };

    let data = &grid.rows()[header + 1..];
    let populated = |column: usize| {
        data.iter()
            .take(2)
            .any(|row| row.get(column).is_some_and(|cell| !cell.is_empty()))
    };
    let kept: Vec<usize> = (0..grid.width()).filter(|&column| populated(column)).collect();

    data.iter()
        .map(|row| kept.iter().filter_map(|&column| row.get(column)).collect())
        .collect()
}

fn continuation_rows(grid: &Grid) -> Vec<Vec<&Cell>> {
    let start = grid.rows().iter().position(|row| {
        row.last().is_some_and(|cell| cell.as_str().trim().parse::<u64>().is_ok())
    });

    start.map_or_else(Vec::new, |start| {
        grid.rows()[start..]
            .iter()
            .map(|row| row.iter().collect())
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_page() -> Grid {
        Grid::new(vec![
            vec!["Catalog".into()],
            vec![
                "Colour Code".into(),
                "Colour Description".into(),
                "".into(),
                "Size".into(),
                "Barcode".into(),
            ],
            vec![
                "09-111".into(),
                "09-111 Black".into(),
                Cell::Missing,
                "S".into(),
                "7310001".into(),
            ],
            vec![
                "09-111".into(),
                "09-111 Black".into(),
                "".into(),
                "M".into(),
                "7310002".into(),
            ],
            vec![
                "".into(),
                "Grey Mélange".into(),
                "".into(),
                "S".into(),
                "7310003".into(),
            ],
        ])
    }

    fn second_page() -> Grid {
        Grid::from_strings([
            vec!["Colour Code", "Colour Description", "Size", "Barcode"],
            vec!["12-222", "12-222 Navy", "L", "7310004"],
            vec!["09-111", "09-111 Black", "S", "9999999"],
            vec!["", "", "", ""],
        ])
    }

    #[test]
    fn reads_first_and_continuation_pages() {
        let catalog = BarcodeCatalog::from_pages([first_page(), second_page()], "Barcode");

        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.lookup("09-111 Black", "S"), Some("7310001"));
        assert_eq!(catalog.lookup("09-111 Black", "M"), Some("7310002"));
        assert_eq!(catalog.lookup("Grey Mélange", "S"), Some("7310003"));
        assert_eq!(catalog.lookup("12-222 Navy", "L"), Some("7310004"));
        assert_eq!(catalog.lookup("12-222 Navy", "S"), None);
    }

    #[test]
    fn first_entry_wins() {
        let catalog = BarcodeCatalog::from_pages([first_page(), second_page()], "Barcode");
        assert_eq!(catalog.lookup("09-111 Black", "S"), Some("7310001"));
        assert_eq!(catalog.entries()[0].barcode, "7310001");
    }

    #[test]
    fn missing_header_yields_no_entries() {
        let grid = Grid::from_strings([["a", "b", "c"]]);
        let catalog = BarcodeCatalog::from_pages([grid], "Barcode");
        assert!(catalog.is_empty());
    }

    #[test]
    fn no_pages_no_entries() {
        let catalog = BarcodeCatalog::from_pages(Vec::new(), "Barcode");
        assert!(catalog.is_empty());
        assert_eq!(catalog.lookup("x", "y"), None);
    }
}
