#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Turns record segments into output records.
//!
//! Column semantics are never declared by the documents themselves; they are
//! inferred per segment from the header row and the position of the first
//! populated cells (see [`roles::ColumnRoleMap`]). Two strategies exist:
//!
//! - [`SizeMatrixReconstructor`]: one record per (color, size) cell of a
//!   size matrix, with `Qty = Prepacks x Prepack Qty`.
//! - [`KeyedRowReconstructor`]: one record per row whose key cell matches a
//!   pattern.
//!
//! Malformed items are reported as [`Skip`](lineitem_record_models::Skip)
//! values next to the records that did come out; only invalid hints fail.

pub mod keyed_rows;
pub mod roles;
pub mod size_matrix;

pub use keyed_rows::KeyedRowReconstructor;
pub use size_matrix::SizeMatrixReconstructor;

/// Errors that stop a reconstructor from being built at all.
#[derive(Debug, thiserror::Error)]
pub enum ReconstructError {
    #[error("invalid reconstruction hints: {0}")]
    InvalidHints(String),
    #[error("invalid key pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Barcode lookup by catalog color key and size.
pub trait BarcodeLookup {
    /// Returns the barcode for (`color`, `size`), or `None` on a miss.
    fn lookup(&self, color: &str, size: &str) -> Option<&str>;
}

impl<T: BarcodeLookup + ?Sized> BarcodeLookup for &T {
    fn lookup(&self, color: &str, size: &str) -> Option<&str> {
        (**self).lookup(color, size)
    }
}

/// A lookup that never finds anything, for families without a catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBarcodes;

impl BarcodeLookup for NoBarcodes {
    fn lookup(&self, _color: &str, _size: &str) -> Option<&str> {
        None
    }
}
