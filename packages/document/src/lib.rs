#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Document-level line-item extraction.
//!
//! A [`DocumentProfile`] describes one document family (purchase orders,
//! delivery challans, ...). [`process_document`] runs it against a
//! [`GridSource`]: it reads the document-level fields, the barcode catalog
//! and then every data page, carrying at most one pending anchor row from
//! one page to the next, and returns an [`OutputTable`] with a
//! [`DocumentReport`].
//!
//! Built-in profiles live in `profiles/` and are listed by
//! [`registry::all_profiles`].
//!
//! [`OutputTable`]: lineitem_record_models::OutputTable

pub mod catalog;
pub mod keyphrase;
pub mod labelled;
pub mod pipeline;
pub mod profile;
pub mod registry;
pub mod source;
pub mod template;

use lineitem_record::ReconstructError;

pub use catalog::BarcodeCatalog;
pub use keyphrase::{DocumentLayout, KeyphraseFields, StaticFieldExtractor, WholeDocument};
pub use pipeline::{DocumentReport, DocumentRun, ProcessedDocument, process_document};
pub use profile::{DocumentProfile, parse_profile_toml};
pub use registry::{all_profiles, find_profile};
pub use source::{
    CsvSheetSource, ExtractedDocument, ExtractedPage, GridSource, GridSourceError, open_source,
};

/// Errors raised while loading profiles.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// The profile TOML is malformed or incomplete.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No built-in profile has the requested id.
    #[error("Unknown profile: {0}")]
    UnknownProfile(String),
}

/// Errors that fail a whole document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// A static field needed to segment or label the document was not found.
    #[error("Missing static field '{field}' (page {page})")]
    MissingStaticField {
        /// Field name.
        field: String,
        /// 1-based page the field was needed on.
        page: usize,
    },

    /// No grid source can read the input.
    #[error("No grid source for {0}")]
    NoGridSource(String),

    /// The grid source failed.
    #[error(transparent)]
    Source(#[from] GridSourceError),

    /// The profile could not be loaded.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// The profile's reconstruction hints are invalid.
    #[error(transparent)]
    Reconstruct(#[from] ReconstructError),
}
