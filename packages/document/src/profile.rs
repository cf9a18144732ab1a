//! Config-driven document-family profiles.
//!
//! A [`DocumentProfile`] captures everything that differs between document
//! families (purchase orders, delivery challans, ...) in one TOML file: how
//! document-level fields are found, which value anchors a record segment and
//! which one ends it, and how the records inside a segment are laid out. A
//! single generic pipeline handles every family.

use std::path::Path;

use lineitem_record_models::{KeyedRowHints, SizeMatrixHints};
use serde::Deserialize;
use strum_macros::Display;

use crate::ProfileError;

// ── Top-level profile ────────────────────────────────────────────────────

/// A complete document-family profile.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentProfile {
    /// Unique identifier (e.g. `"startex_po"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// How document-level fields and page ranges are determined.
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Where record segments start and stop.
    pub segmentation: SegmentationConfig,
    /// Fields read from labelled cells inside each segment.
    #[serde(default)]
    pub segment_fields: Vec<LabelledField>,
    /// How records are rebuilt from a segment.
    pub records: RecordStrategy,
    /// Barcode catalog settings. Without one every barcode is empty.
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl DocumentProfile {
    /// Loads a profile from a TOML file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ProfileError> {
        let text = std::fs::read_to_string(path)?;
        parse_profile_toml(&text)
    }
}

// ── Document layout ──────────────────────────────────────────────────────

/// How document-level fields and the data/catalog page split are found.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutConfig {
    /// Every page holds data; no document-level fields.
    #[default]
    WholeDocument,
    /// Fields are cut out of page text around key phrases.
    Keyphrase(KeyphraseLayout),
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyphraseLayout {
    /// Fields in extraction order. Later key phrases may reference earlier
    /// fields as `{Field Name}`.
    #[serde(default)]
    pub fields: Vec<KeyphraseField>,
    /// Text that marks the first catalog page. When configured but absent,
    /// the last page is the catalog.
    #[serde(default)]
    pub catalog_marker: Option<String>,
    #[serde(default)]
    pub variant: Option<VariantMarker>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyphraseField {
    pub name: String,
    #[serde(default)]
    pub scope: PageScope,
    pub steps: Vec<TextStep>,
    /// Value used when the steps do not resolve.
    #[serde(default)]
    pub default: Option<String>,
}

/// Which pages a key-phrase field is searched on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PageScope {
    #[default]
    FirstPage,
    /// First page on which the steps resolve.
    AnyPage,
}

/// One text-narrowing step. Key phrases may contain `{Field}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStep {
    /// Text between the first and second occurrence of the phrase, trimmed.
    /// Fails when the phrase is absent.
    After(String),
    /// Text before the first occurrence of the phrase, trimmed.
    Before(String),
    /// Replaces every occurrence of `from` with `to`.
    Replace { from: String, to: String },
}

/// Detects the flagged document variant from a marker inside a context
/// window of the first pages.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantMarker {
    pub context_after: String,
    pub context_before: String,
    pub markers: Vec<String>,
    #[serde(default = "default_variant_pages")]
    pub pages: usize,
}

const fn default_variant_pages() -> usize {
    2
}

// ── Segmentation ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SegmentationConfig {
    pub anchor_column: usize,
    /// Anchor value template (e.g. `"{Style No}"`).
    pub anchor: String,
    /// Terminator value template (e.g. `"HS Code: {HS Code}"`).
    pub terminator: String,
    /// Columns beyond this are dropped before segmentation.
    #[serde(default)]
    pub max_columns: Option<usize>,
}

// ── Labelled-cell segment fields ─────────────────────────────────────────

/// A field whose value sits next to (or below) an exact label cell.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelledField {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub direction: ScanDirection,
    /// Values skipped while scanning. Missing cells read as `nan`.
    #[serde(default = "default_filler")]
    pub skip: Vec<String>,
    /// Only accept values that parse with this `chrono` format.
    #[serde(default)]
    pub datetime_format: Option<String>,
    #[serde(default)]
    pub take: Option<ValueTake>,
    #[serde(default)]
    pub corrections: Vec<ValueCorrection>,
    #[serde(default = "default_true")]
    pub required: bool,
}

fn default_filler() -> Vec<String> {
    vec![String::new(), "nan".to_owned()]
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScanDirection {
    /// Same row, columns right of the label.
    #[default]
    Right,
    /// Next row, starting at the label column.
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValueTake {
    FirstLine,
    FirstWord,
}

impl ValueTake {
    #[must_use]
    pub fn apply(self, value: &str) -> &str {
        match self {
            Self::FirstLine => value.split('\n').next().unwrap_or_default(),
            Self::FirstWord => value.split(' ').next().unwrap_or_default(),
        }
    }
}

/// Named value fixes for known extraction errors of a document family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValueCorrection {
    /// OCR reads the digit zero as a capital letter O.
    OcrLetterOToZero,
}

impl ValueCorrection {
    #[must_use]
    pub fn apply(self, value: &str) -> String {
        match self {
            Self::OcrLetterOToZero => value.replace('O', "0"),
        }
    }
}

// ── Records ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordStrategy {
    SizeMatrix(SizeMatrixHints),
    KeyedRows(KeyedRowHints),
}

// ── Catalog & output ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Last header cell on the first catalog page.
    #[serde(default = "default_catalog_header")]
    pub header_label: String,
}

fn default_catalog_header() -> String {
    "Barcode".to_owned()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Output column order. Empty means static fields, then line-item
    /// columns, as they come.
    #[serde(default)]
    pub columns: Vec<String>,
}

/// Parses a [`DocumentProfile`] from a TOML string.
///
/// # Errors
///
/// Returns [`ProfileError::Toml`] if the TOML is malformed or missing
/// required fields.
pub fn parse_profile_toml(toml_str: &str) -> Result<DocumentProfile, ProfileError> {
    Ok(toml::de::from_str(toml_str)?)
}
