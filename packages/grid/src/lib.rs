#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Structural operations over extracted grids.
//!
//! Three pieces make up the document-independent half of the extraction
//! engine:
//!
//! - [`locate`]: find the first cell equal to a value or matching a regex,
//!   scanning row-major.
//! - [`segment`]: cut a grid into record segments that start at a repeating
//!   anchor value and stop at a terminator value.
//! - [`realign`]: undo the column shifts caused by multi-line cells by
//!   splitting them into neighbouring columns.

pub mod locate;
pub mod realign;
pub mod segment;

pub use locate::{find_first_exact, find_first_pattern};
pub use realign::realign;
pub use segment::segment;

/// Errors raised while segmenting a grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SegmentError {
    /// No row carries the anchor value in the anchor column. This is the
    /// normal outcome for pages without line items.
    #[error("no anchor '{value}' found in column {column}")]
    NoAnchorFound {
        /// Column that was searched.
        column: usize,
        /// Anchor value that was searched for.
        value: String,
    },
}
