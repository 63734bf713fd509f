//! Compares two conversions of a template, e.g. before and after a re-upload.
//!
//! [`compare_results`] is always available and produces a Markdown report
//! with placeholder changes and line diffs of the HTML and CSS. With the
//! `diff` feature, [`comparer::Comparer`] additionally produces a
//! field-level structured diff.

pub mod error;
pub mod report;

#[cfg(feature = "diff")]
pub mod comparer;
#[cfg(feature = "diff")]
pub mod structured;

pub use error::DiffError;
pub use report::{compare_results, TemplateDiffReport};
