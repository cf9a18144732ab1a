//! Concurrent batch processing of documents.
//!
//! Each document runs on its own blocking task with its own pipeline state;
//! up to `jobs` documents are in flight at once. A failing or timed-out
//! document never stops the rest of the batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt as _};
use indicatif::ProgressBar;
use lineitem_document::{
    DocumentError, DocumentProfile, DocumentReport, open_source, process_document,
};

use crate::output::{OutputError, OutputFormat, render};

/// Why a document of the batch produced no output.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("timed out after {0}s")]
    Timeout(u64),

    /// The blocking task panicked or was cancelled.
    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub out_dir: PathBuf,
    pub format: OutputFormat,
    pub jobs: usize,
    pub timeout: Option<Duration>,
}

/// A successfully processed document.
#[derive(Debug, Clone)]
pub struct DocumentOutput {
    pub report: DocumentReport,
    pub path: PathBuf,
}

/// Outcome of one input of the batch.
#[derive(Debug)]
pub struct DocumentOutcome {
    pub input: PathBuf,
    pub result: Result<DocumentOutput, BatchError>,
}

/// Where the output for `input` is written.
#[must_use]
pub fn output_path(input: &Path, out_dir: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "output".into(), |stem| stem.to_string_lossy());
    out_dir.join(format!("{stem}.{}", format.extension()))
}

/// Processes every input and returns the outcomes in input order.
pub async fn run_batch(
    inputs: Vec<PathBuf>,
    profile: Arc<DocumentProfile>,
    options: &BatchOptions,
    progress: &ProgressBar,
) -> Vec<DocumentOutcome> {
    log::info!(
        "Processing {} document(s) with profile '{}' (jobs={})",
        inputs.len(),
        profile.id,
        options.jobs
    );

    let mut outcomes: Vec<(usize, DocumentOutcome)> = stream::iter(inputs.into_iter().enumerate())
        .map(|(index, input)| {
            let profile = Arc::clone(&profile);
            async move {
                let result = run_document(&input, profile, options).await;
                progress.inc(1);
                (index, DocumentOutcome { input, result })
            }
        })
        .buffer_unordered(options.jobs.max(1))
        .collect()
        .await;

    outcomes.sort_by_key(|(index, _)| *index);
    outcomes.into_iter().map(|(_, outcome)| outcome).collect()
}

async fn run_document(
    input: &Path,
    profile: Arc<DocumentProfile>,
    options: &BatchOptions,
) -> Result<DocumentOutput, BatchError> {
    let path = input.to_path_buf();
    let task = tokio::task::spawn_blocking(move || {
        let source = open_source(&path)?;
        process_document(&profile, source.as_ref())
    });

    let processed = match options.timeout {
        Some(limit) => tokio::time::timeout(limit, task)
            .await
            .map_err(|_| BatchError::Timeout(limit.as_secs()))???,
        None => task.await??,
    };

    let bytes = render(&processed.table, options.format)?;
    let path = output_path(input, &options.out_dir, options.format);
    tokio::fs::write(&path, bytes).await.map_err(OutputError::from)?;

    log::debug!("[{}] Wrote {}", processed.report.label, path.display());

    Ok(DocumentOutput {
        report: processed.report,
        path,
    })
}
