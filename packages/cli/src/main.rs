#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch line-item extraction tool.
//!
//! Runs a document-family profile over many documents, writing one output
//! file per input and a summary line per document. Uses
//! `indicatif-log-bridge` (via [`progress::init_logger`]) so log lines and
//! the batch progress bar never fight for the terminal.

mod batch;
mod output;
mod progress;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use lineitem_document::{DocumentProfile, all_profiles, find_profile};

use crate::batch::{BatchOptions, run_batch};
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "lineitem",
    about = "Line-item extraction from purchase orders and delivery challans"
)]
struct Cli {
    /// Show debug output from the extraction pipeline
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract line items from one or more documents
    Extract {
        /// Input documents: extracted-document JSON (`.json`) or spreadsheet
        /// sheets exported as CSV (`.csv`)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Built-in profile id (see `lineitem profiles`)
        #[arg(long, required_unless_present = "profile_file", conflicts_with = "profile_file")]
        profile: Option<String>,
        /// Path to a profile TOML file
        #[arg(long)]
        profile_file: Option<PathBuf>,
        /// Directory the output files are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
        /// Number of documents processed concurrently
        #[arg(long, default_value = "4")]
        jobs: usize,
        /// Give up on a document after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// List the built-in document profiles
    Profiles,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let multi = progress::init_logger(cli.verbose);

    match cli.command {
        Commands::Profiles => {
            println!("{:<20} NAME", "ID");
            println!("{}", "-".repeat(50));
            for profile in &all_profiles() {
                println!("{:<20} {}", profile.id, profile.name);
            }
        }
        Commands::Extract {
            inputs,
            profile,
            profile_file,
            out_dir,
            format,
            jobs,
            timeout_secs,
        } => {
            let profile = match (profile, profile_file) {
                (_, Some(path)) => DocumentProfile::from_path(&path)?,
                (Some(id), None) => find_profile(&id)?,
                (None, None) => return Err("either --profile or --profile-file is required".into()),
            };

            tokio::fs::create_dir_all(&out_dir).await?;

            let options = BatchOptions {
                out_dir,
                format,
                jobs,
                timeout: timeout_secs.map(Duration::from_secs),
            };

            let total = inputs.len();
            let bar = progress::documents_bar(&multi, total as u64);
            let outcomes = run_batch(inputs, Arc::new(profile), &options, &bar).await;
            bar.finish_and_clear();

            println!("{:<40} {:>8}  RESULT", "DOCUMENT", "RECORDS");
            println!("{}", "-".repeat(80));

            let mut failed = 0;
            for outcome in &outcomes {
                let name = outcome.input.display().to_string();
                match &outcome.result {
                    Ok(written) => {
                        println!(
                            "{name:<40} {:>8}  {} -> {}",
                            written.report.records,
                            written.report,
                            written.path.display()
                        );
                    }
                    Err(e) => {
                        failed += 1;
                        log::error!("[{name}] {e}");
                        println!("{name:<40} {:>8}  FAILED: {e}", "-");
                    }
                }
            }

            println!();
            println!("{} of {total} document(s) succeeded", total - failed);

            if failed > 0 {
                return Err(format!("{failed} of {total} document(s) failed").into());
            }
        }
    }

    Ok(())
}
