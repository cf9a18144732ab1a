#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for line-item reconstruction.
//!
//! Contains the emitted record shapes, the ordered static-field set copied
//! onto every record, the per-document-family reconstruction hints, and the
//! skip reasons reported for malformed items.

use serde::Deserialize;
use strum_macros::{AsRefStr, Display};

/// Semantic role of a column inside a size-matrix segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum ColumnRole {
    #[strum(serialize = "Color Code")]
    ColorCode,
    #[strum(serialize = "Prepack Code")]
    PrepackCode,
    #[strum(serialize = "Prepacks")]
    Prepacks,
    #[strum(serialize = "Qty")]
    Qty,
}

/// Ordered key/value attributes that are constant for a document or a
/// segment and get copied onto every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticFields {
    entries: Vec<(String, String)>,
}

impl StaticFields {
    /// An empty field list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Sets `name` to `value`, keeping the original position when the field
    /// already exists.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(key, _)| *key == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Value of `name`, if set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether `name` is set, even to an empty value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Field names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a copy of `self` with every field of `other` inserted on top.
    #[must_use]
    pub fn merged_with(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for (name, value) in other.iter() {
            merged.insert(name, value);
        }
        merged
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticFields {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut fields = Self::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

/// One size of one color of a size-matrix item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeLine {
    /// Prepack code of the item, empty without a prepack code column.
    pub prepack_code: String,
    /// `None` when the document family has no prepacks column.
    pub prepacks: Option<i64>,
    /// Color description, `"{code} {name}"` or a raw correction token.
    pub color_code: String,
    /// Size label from the header row.
    pub size: String,
    /// Quantity in the size cell.
    pub prepack_qty: i64,
    /// `prepacks * prepack_qty`, or `prepack_qty` without prepacks.
    pub qty: i64,
    /// Item total from the qty column with `.` separators removed.
    pub style_qty: String,
    /// Catalog barcode for the color and size, empty on a miss.
    pub barcode: String,
}

impl SizeLine {
    /// Output column names in natural order.
    pub const COLUMNS: [&'static str; 8] = [
        "Prepack Code",
        "Prepacks",
        "Color Code",
        "Size",
        "Prepack Qty",
        "Qty",
        "Style Qty",
        "Barcode",
    ];

    fn value(&self, column: &str) -> Option<String> {
        Some(match column {
            "Prepack Code" => self.prepack_code.clone(),
            "Prepacks" => self.prepacks.map(|n| n.to_string()).unwrap_or_default(),
            "Color Code" => self.color_code.clone(),
            "Size" => self.size.clone(),
            "Prepack Qty" => self.prepack_qty.to_string(),
            "Qty" => self.qty.to_string(),
            "Style Qty" => self.style_qty.clone(),
            "Barcode" => self.barcode.clone(),
            _ => return None,
        })
    }
}

/// One keyed row (e.g. an order number with its carton and piece counts).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedLine {
    /// Key field followed by the configured value fields.
    pub values: StaticFields,
}

/// The line-item part of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineItem {
    Size(SizeLine),
    Keyed(KeyedLine),
}

/// A single emitted output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    /// Document fields merged with the segment's own fields.
    pub static_fields: StaticFields,
    pub item: LineItem,
}

impl OutputRecord {
    /// Value of `column`, looked up in the line item first and then in the
    /// static fields.
    #[must_use]
    pub fn value(&self, column: &str) -> Option<String> {
        let own = match &self.item {
            LineItem::Size(line) => line.value(column),
            LineItem::Keyed(line) => line.values.get(column).map(str::to_owned),
        };
        own.or_else(|| self.static_fields.get(column).map(str::to_owned))
    }

    /// Column names in natural order: static fields, then line-item columns.
    #[must_use]
    pub fn default_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self.static_fields.names().map(str::to_owned).collect();
        match &self.item {
            LineItem::Size(_) => columns.extend(SizeLine::COLUMNS.iter().map(|c| (*c).to_owned())),
            LineItem::Keyed(line) => columns.extend(line.values.names().map(str::to_owned)),
        }
        columns
    }
}

/// Uniform-keyed output of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTable {
    columns: Vec<String>,
    records: Vec<OutputRecord>,
}

impl OutputTable {
    /// Builds a table. When `columns` is empty they are derived from the
    /// first record.
    #[must_use]
    pub fn new(columns: Vec<String>, records: Vec<OutputRecord>) -> Self {
        let columns = if columns.is_empty() {
            records
                .first()
                .map(OutputRecord::default_columns)
                .unwrap_or_default()
        } else {
            columns
        };
        Self { columns, records }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn records(&self) -> &[OutputRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record rendered against the column list; absent values are `""`.
    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.records.iter().map(|record| {
            self.columns
                .iter()
                .map(|column| record.value(column).unwrap_or_default())
                .collect()
        })
    }
}

/// Why an item or a single record was left out. Skips never abort a
/// document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Skip {
    #[error("segment {segment}: header row has no size labels")]
    NoSizeColumns { segment: usize },
    #[error("segment {segment}: no color code in row {row}")]
    NoColorCode { segment: usize, row: usize },
    #[error("segment {segment}: too few rows ({rows}) for a line item")]
    NoDataRows { segment: usize, rows: usize },
    #[error("segment {segment}, row {row}: prepacks '{value}' is not a whole number")]
    MalformedPrepacks {
        segment: usize,
        row: usize,
        value: String,
    },
    #[error("segment {segment}, row {row}: zero prepacks")]
    ZeroPrepacks { segment: usize, row: usize },
    #[error("segment {segment}, row {row}: prepack qty '{value}' for size {size} is not a whole number")]
    MalformedPrepackQty {
        segment: usize,
        row: usize,
        size: String,
        value: String,
    },
    #[error("segment {segment}: no key matching '{pattern}'")]
    NoKeyColumn { segment: usize, pattern: String },
    #[error("segment {segment}, row {row}: {found} value(s) after key '{key}', {expected} expected")]
    IncompleteRow {
        segment: usize,
        row: usize,
        key: String,
        found: usize,
        expected: usize,
    },
}

impl Skip {
    /// Whether the skip covers a whole item (every size of it) rather than a
    /// single record.
    #[must_use]
    pub const fn is_group(&self) -> bool {
        !matches!(self, Self::MalformedPrepackQty { .. } | Self::IncompleteRow { .. })
    }
}

/// Result of reconstructing one segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconstruction {
    pub records: Vec<OutputRecord>,
    pub skipped: Vec<Skip>,
    pub barcode_misses: usize,
}

impl Reconstruction {
    pub fn append(&mut self, other: Self) {
        self.records.extend(other.records);
        self.skipped.extend(other.skipped);
        self.barcode_misses += other.barcode_misses;
    }
}

/// Which roles the last one to three header labels take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrailingRoles {
    Qty,
    PrepacksQty,
    PrepackCodePrepacksQty,
}

impl TrailingRoles {
    /// Roles in left-to-right order, ending with the last header label.
    #[must_use]
    pub const fn roles(self) -> &'static [ColumnRole] {
        match self {
            Self::Qty => &[ColumnRole::Qty],
            Self::PrepacksQty => &[ColumnRole::Prepacks, ColumnRole::Qty],
            Self::PrepackCodePrepacksQty => &[
                ColumnRole::PrepackCode,
                ColumnRole::Prepacks,
                ColumnRole::Qty,
            ],
        }
    }
}

/// Layout differences between the plain and flagged variant of a family.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VariantHints {
    pub trailing_roles: TrailingRoles,
    /// Header label that ends the size list when present after its start.
    #[serde(default)]
    pub size_sentinel: Option<String>,
}

/// A color value whose printed form differs from its catalog key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColorCorrection {
    /// Token as it appears in the color column (`Greymelange`).
    pub raw: String,
    /// Catalog form used for barcode lookup (`Grey Mélange`).
    pub display: String,
}

/// Positional hints for size-matrix segments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SizeMatrixHints {
    #[serde(default = "default_header_row")]
    pub header_row: usize,
    #[serde(default = "default_first_group_row")]
    pub first_group_row: usize,
    #[serde(default = "default_group_rows")]
    pub group_rows: usize,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    pub plain: VariantHints,
    /// Used when the document carries the variant flag; falls back to
    /// `plain` when absent.
    #[serde(default)]
    pub flagged: Option<VariantHints>,
    #[serde(default)]
    pub color_corrections: Vec<ColorCorrection>,
}

impl SizeMatrixHints {
    #[must_use]
    pub fn variant(&self, flagged: bool) -> &VariantHints {
        if flagged {
            self.flagged.as_ref().unwrap_or(&self.plain)
        } else {
            &self.plain
        }
    }

    #[must_use]
    pub fn correction(&self, raw: &str) -> Option<&ColorCorrection> {
        self.color_corrections.iter().find(|c| c.raw == raw)
    }
}

const fn default_header_row() -> usize {
    1
}

const fn default_first_group_row() -> usize {
    2
}

const fn default_group_rows() -> usize {
    2
}

fn default_delimiter() -> String {
    "\n".to_owned()
}

/// Hints for segments whose line items are rows identified by a key
/// pattern.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyedRowHints {
    /// Regex a key cell must match (searched, so anchor it).
    pub key_pattern: String,
    /// Output column for the key itself.
    pub key_field: String,
    /// Output columns for the non-empty cells right of the key, in order.
    pub fields: Vec<String>,
    /// Cell values that never count as a value.
    #[serde(default = "default_filler")]
    pub filler: Vec<String>,
}

fn default_filler() -> Vec<String> {
    vec![String::new(), "nan".to_owned()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(size: &str, qty: i64) -> SizeLine {
        SizeLine {
            prepack_code: "P1".to_owned(),
            prepacks: Some(2),
            color_code: "09-111 Black".to_owned(),
            size: size.to_owned(),
            prepack_qty: qty / 2,
            qty,
            style_qty: "1200".to_owned(),
            barcode: String::new(),
        }
    }

    #[test]
    fn static_fields_keep_insertion_order_and_replace_in_place() {
        let mut fields = StaticFields::new();
        fields.insert("Style No", "101");
        fields.insert("HS Code", "6109");
        fields.insert("Style No", "202");
        let names: Vec<&str> = fields.names().collect();
        assert_eq!(names, vec!["Style No", "HS Code"]);
        assert_eq!(fields.get("Style No"), Some("202"));
    }

    #[test]
    fn merged_fields_override_document_values() {
        let document: StaticFields = [("A", "1"), ("B", "2")].into_iter().collect();
        let segment: StaticFields = [("B", "3"), ("C", "4")].into_iter().collect();
        let merged = document.merged_with(&segment);
        let pairs: Vec<(&str, &str)> = merged.iter().collect();
        assert_eq!(pairs, vec![("A", "1"), ("B", "3"), ("C", "4")]);
    }

    #[test]
    fn record_values_prefer_line_item_columns() {
        let record = OutputRecord {
            static_fields: [("Size", "static"), ("Style No", "101")]
                .into_iter()
                .collect(),
            item: LineItem::Size(line("M", 24)),
        };
        assert_eq!(record.value("Size").as_deref(), Some("M"));
        assert_eq!(record.value("Style No").as_deref(), Some("101"));
        assert_eq!(record.value("Qty").as_deref(), Some("24"));
        assert_eq!(record.value("Unknown"), None);
    }

    #[test]
    fn missing_prepacks_render_empty() {
        let mut size_line = line("S", 4);
        size_line.prepacks = None;
        assert_eq!(size_line.value("Prepacks").as_deref(), Some(""));
    }

    #[test]
    fn table_rows_follow_column_order() {
        let record = OutputRecord {
            static_fields: [("Style No", "101")].into_iter().collect(),
            item: LineItem::Size(line("L", 6)),
        };
        let table = OutputTable::new(
            vec!["Size".to_owned(), "Style No".to_owned(), "Total".to_owned()],
            vec![record],
        );
        let rows: Vec<Vec<String>> = table.rows().collect();
        assert_eq!(rows, vec![vec!["L".to_owned(), "101".to_owned(), String::new()]]);
    }

    #[test]
    fn default_columns_put_static_fields_first() {
        let record = OutputRecord {
            static_fields: [("Challan No", "CH-1")].into_iter().collect(),
            item: LineItem::Keyed(KeyedLine {
                values: [("Order No", "123-45"), ("Carton", "12")].into_iter().collect(),
            }),
        };
        let table = OutputTable::new(Vec::new(), vec![record]);
        assert_eq!(table.columns(), ["Challan No", "Order No", "Carton"]);
    }

    #[test]
    fn trailing_roles_end_with_qty() {
        for roles in [
            TrailingRoles::Qty,
            TrailingRoles::PrepacksQty,
            TrailingRoles::PrepackCodePrepacksQty,
        ] {
            assert_eq!(roles.roles().last(), Some(&ColumnRole::Qty));
        }
        assert_eq!(ColumnRole::PrepackCode.as_ref(), "Prepack Code");
    }

    #[test]
    fn hints_fill_defaults_from_toml() {
        let hints: SizeMatrixHints = toml::from_str(
            r#"
            plain = { trailing_roles = "qty" }
            flagged = { trailing_roles = "prepack_code_prepacks_qty", size_sentinel = "ASS" }

            [[color_corrections]]
            raw = "Greymelange"
            display = "Grey Mélange"
            "#,
        )
        .unwrap();
        assert_eq!(hints.header_row, 1);
        assert_eq!(hints.first_group_row, 2);
        assert_eq!(hints.group_rows, 2);
        assert_eq!(hints.delimiter, "\n");
        assert_eq!(hints.variant(false).trailing_roles, TrailingRoles::Qty);
        assert_eq!(hints.variant(true).size_sentinel.as_deref(), Some("ASS"));
        assert_eq!(
            hints.correction("Greymelange").map(|c| c.display.as_str()),
            Some("Grey Mélange")
        );
    }

    #[test]
    fn skip_scope() {
        assert!(Skip::ZeroPrepacks { segment: 1, row: 2 }.is_group());
        assert!(
            !Skip::MalformedPrepackQty {
                segment: 1,
                row: 2,
                size: "M".to_owned(),
                value: "x".to_owned()
            }
            .is_group()
        );
    }
}
