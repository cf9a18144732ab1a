//! Grid sources: where page grids and page text come from.
//!
//! Physical table detection happens upstream. The engine only needs, per
//! page, the grid of the table that holds line items and the plain text of
//! the page. [`GridSource`] is that seam; [`ExtractedDocument`] reads the
//! JSON an upstream extractor writes and [`CsvSheetSource`] reads one
//! spreadsheet sheet exported as CSV.

use std::path::Path;

use lineitem_grid_models::{Cell, Grid};
use serde::Deserialize;

use crate::DocumentError;

/// Errors raised while reading grids or text from a source.
#[derive(Debug, thiserror::Error)]
pub enum GridSourceError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The extracted-document JSON is malformed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A page outside the document was requested.
    #[error("page {page} requested but the document has {pages} page(s)")]
    PageOutOfRange { page: usize, pages: usize },
}

/// A document that yields one grid (possibly empty) and one text per page.
///
/// Pages are 0-based. An empty grid means "no table found" on that page.
pub trait GridSource {
    /// Short name used in log messages.
    fn label(&self) -> &str;

    fn page_count(&self) -> usize;

    /// Returns the line-item table of `page`.
    ///
    /// # Errors
    ///
    /// Returns [`GridSourceError`] if the page cannot be read.
    fn grid(&self, page: usize) -> Result<Grid, GridSourceError>;

    /// Returns the plain text of `page`.
    ///
    /// # Errors
    ///
    /// Returns [`GridSourceError`] if the page cannot be read.
    fn page_text(&self, page: usize) -> Result<String, GridSourceError>;
}

/// Opens the right [`GridSource`] for `path` based on its extension.
///
/// # Errors
///
/// * [`DocumentError::NoGridSource`] for unsupported file types
/// * [`DocumentError::Source`] if the file cannot be read
pub fn open_source(path: &Path) -> Result<Box<dyn GridSource + Send>, DocumentError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => Ok(Box::new(ExtractedDocument::from_path(path)?)),
        Some("csv") => Ok(Box::new(CsvSheetSource::from_path(path)?)),
        _ => Err(DocumentError::NoGridSource(path.display().to_string())),
    }
}

fn label_for(path: &Path) -> String {
    path.file_stem().map_or_else(
        || path.display().to_string(),
        |stem| stem.to_string_lossy().into_owned(),
    )
}

// ── Extracted-document JSON ──────────────────────────────────────────────

/// One page of upstream extraction output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedPage {
    #[serde(default)]
    pub text: String,
    /// Tables detected on the page in reading order. Cells may be `null`.
    #[serde(default)]
    pub tables: Vec<Grid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ExtractedJson {
    pages: Vec<ExtractedPage>,
}

/// Pages of text and tables produced by an upstream PDF extractor:
///
/// ```json
/// { "pages": [ { "text": "...", "tables": [ [["a", null], ["b", "c"]] ] } ] }
/// ```
///
/// The line-item grid of a page is its last table.
#[derive(Debug, Clone, Default)]
pub struct ExtractedDocument {
    label: String,
    pages: Vec<ExtractedPage>,
}

impl ExtractedDocument {
    #[must_use]
    pub fn new(label: impl Into<String>, pages: Vec<ExtractedPage>) -> Self {
        Self {
            label: label.into(),
            pages,
        }
    }

    /// # Errors
    ///
    /// Returns [`GridSourceError::Json`] if `json` is not a valid extracted
    /// document.
    pub fn from_json(label: impl Into<String>, json: &str) -> Result<Self, GridSourceError> {
        let parsed: ExtractedJson = serde_json::from_str(json)?;
        Ok(Self::new(label, parsed.pages))
    }

    /// # Errors
    ///
    /// Returns [`GridSourceError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, GridSourceError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(label_for(path), &json)
    }

    fn page(&self, page: usize) -> Result<&ExtractedPage, GridSourceError> {
        self.pages.get(page).ok_or(GridSourceError::PageOutOfRange {
            page,
            pages: self.pages.len(),
        })
    }
}

impl GridSource for ExtractedDocument {
    fn label(&self) -> &str {
        &self.label
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn grid(&self, page: usize) -> Result<Grid, GridSourceError> {
        Ok(self.page(page)?.tables.last().cloned().unwrap_or_default())
    }

    fn page_text(&self, page: usize) -> Result<String, GridSourceError> {
        Ok(self.page(page)?.text.clone())
    }
}

// ── CSV sheet ────────────────────────────────────────────────────────────

/// A single spreadsheet sheet exported as CSV; the whole sheet is one page.
///
/// Empty fields become missing cells, the way blank spreadsheet cells read.
#[derive(Debug, Clone, Default)]
pub struct CsvSheetSource {
    label: String,
    grid: Grid,
}

impl CsvSheetSource {
    /// Reads CSV from any reader. No header row is assumed and rows may
    /// have different lengths.
    ///
    /// # Errors
    ///
    /// Returns [`GridSourceError::Csv`] if a record cannot be read.
    pub fn from_reader<R: std::io::Read>(
        label: impl Into<String>,
        reader: R,
    ) -> Result<Self, GridSourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut grid = Grid::default();
        for record in reader.records() {
            let record = record?;
            grid.push_row(
                record
                    .iter()
                    .map(|field| {
                        if field.is_empty() {
                            Cell::Missing
                        } else {
                            Cell::text(field)
                        }
                    })
                    .collect(),
            );
        }

        Ok(Self {
            label: label.into(),
            grid,
        })
    }

    /// # Errors
    ///
    /// Returns [`GridSourceError`] if the file cannot be opened or parsed.
    pub fn from_path(path: &Path) -> Result<Self, GridSourceError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(label_for(path), file)
    }

    const fn check_page(page: usize) -> Result<(), GridSourceError> {
        if page == 0 {
            Ok(())
        } else {
            Err(GridSourceError::PageOutOfRange { page, pages: 1 })
        }
    }
}

impl GridSource for CsvSheetSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn page_count(&self) -> usize {
        1
    }

    fn grid(&self, page: usize) -> Result<Grid, GridSourceError> {
        Self::check_page(page)?;
        Ok(self.grid.clone())
    }

    fn page_text(&self, page: usize) -> Result<String, GridSourceError> {
        Self::check_page(page)?;
        Ok(self
            .grid
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .filter(|cell| !cell.is_empty())
                    .map(Cell::as_str)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
