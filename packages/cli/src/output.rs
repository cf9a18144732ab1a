//! Output table serialization.

use clap::ValueEnum;
use lineitem_record_models::OutputTable;
use serde_json::{Map, Value};

/// Errors raised while serializing an output table.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// CSV writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Header row followed by one row per record
    #[default]
    Csv,
    /// Array of objects keyed by column name, in column order
    Json,
}

impl OutputFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Serializes `table` in `format`.
///
/// # Errors
///
/// Returns [`OutputError`] if serialization fails.
pub fn render(table: &OutputTable, format: OutputFormat) -> Result<Vec<u8>, OutputError> {
    match format {
        OutputFormat::Csv => render_csv(table),
        OutputFormat::Json => render_json(table),
    }
}

fn render_csv(table: &OutputTable) -> Result<Vec<u8>, OutputError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(&row)?;
    }
    writer.into_inner().map_err(|e| OutputError::Io(e.into_error()))
}

fn render_json(table: &OutputTable) -> Result<Vec<u8>, OutputError> {
    let objects: Vec<Map<String, Value>> = table
        .rows()
        .map(|row| {
            table
                .columns()
                .iter()
                .cloned()
                .zip(row.into_iter().map(Value::String))
                .collect()
        })
        .collect();
    Ok(serde_json::to_vec_pretty(&objects)?)
}
