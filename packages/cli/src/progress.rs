//! Logger and progress bar setup.
//!
//! `log` output is routed through `indicatif-log-bridge` so that log lines
//! are suspended while the batch progress bar redraws.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::LevelFilter;

/// Crates whose log lines are shown without any `RUST_LOG` set.
const LOG_MODULES: &[&str] = &[
    "lineitem",
    "lineitem_cli",
    "lineitem_document",
    "lineitem_grid",
    "lineitem_record",
];

/// Level for the workspace crates. Everything else stays at `warn`.
const fn crate_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge`.
///
/// `RUST_LOG` directives are applied on top of the defaults.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger(verbose: bool) -> MultiProgress {
    let multi = MultiProgress::new();

    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(LevelFilter::Warn);
    for module in LOG_MODULES {
        builder.filter_module(module, crate_level(verbose));
    }
    let logger = builder.parse_env("RUST_LOG").build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Ignore error if logger was already set

    log::set_max_level(level);

    multi
}

/// A bar over the documents of a batch. The total is known up front.
#[must_use]
pub fn documents_bar(multi: &MultiProgress, total: u64) -> ProgressBar {
    let bar = multi.add(ProgressBar::new(total));
    bar.set_style(
        ProgressStyle::with_template("{msg} {wide_bar:.green/dim} {pos}/{len} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    bar.set_message("Documents");
    bar
}
