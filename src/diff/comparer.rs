use super::error::DiffError;
use super::report::{compare_results, TemplateDiffReport};
use super::structured::{Change, ChangeCollector, ChangeType, ValueRepr};
use crate::models::result::ConversionResult;
use serde_json::Value as JsonValue;
use std::fmt::Write;
use treediff::diff;

/// Top-level fields holding generated markup, compared line by line by the
/// text report rather than field by field.
const MARKUP_FIELDS: &[&str] = &["html", "css"];

/// Builder for creating a `Comparer`.
/// Sets the "base" conversion every later revision is compared against.
#[derive(Default)]
pub struct ComparerBuilder {
    base: Option<ConversionResult>,
    include_markup: bool,
}

impl ComparerBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the base conversion to compare against.
    pub fn set_base(mut self, base: ConversionResult) -> Self {
        self.base = Some(base);
        self
    }

    /// Whether `html`/`css` changes appear in the structured diff. Off by default.
    pub fn set_include_markup(mut self, include_markup: bool) -> Self {
        self.include_markup = include_markup;
        self
    }

    /// Builds the `Comparer`.
    /// Returns an error if the base conversion was not set.
    pub fn build(self) -> Result<Comparer, DiffError> {
        let base = self.base.ok_or(DiffError::MissingBase)?;
        Ok(Comparer {
            base,
            include_markup: self.include_markup,
        })
    }
}

/// Compares template revisions against a stored base conversion.
pub struct Comparer {
    base: ConversionResult,
    include_markup: bool,
}

impl Comparer {
    /// Compares the stored base against a new conversion.
    pub fn compare(&self, other: &ConversionResult) -> Result<ComparisonResult, DiffError> {
        let base_val: JsonValue = serde_json::to_value(&self.base)?;
        let other_val: JsonValue = serde_json::to_value(other)?;

        let mut collector = ChangeCollector::new();
        diff(&base_val, &other_val, &mut collector);

        let changes = if self.include_markup {
            collector.changes
        } else {
            collector
                .changes
                .into_iter()
                .filter(|c| !MARKUP_FIELDS.contains(&c.path.as_str()))
                .collect()
        };

        Ok(ComparisonResult {
            base: self.base.clone(),
            compared: other.clone(),
            changes,
        })
    }
}

/// Holds the results of a comparison between two conversions.
pub struct ComparisonResult {
    base: ConversionResult,
    compared: ConversionResult,
    changes: Vec<Change>,
}

impl ComparisonResult {
    /// Returns the structured list of changes found.
    pub fn get_structured_diff(&self) -> &[Change] {
        &self.changes
    }

    /// Generates the Markdown report with placeholder changes and HTML/CSS line diffs.
    pub fn get_text_report(
        &self,
        base_label: &str,
        changed_label: &str,
    ) -> Result<TemplateDiffReport, DiffError> {
        compare_results(&self.base, &self.compared, base_label, changed_label)
    }

    /// Generates a one-line-per-change summary of the structured diff.
    pub fn get_readable_diff(&self) -> Result<String, DiffError> {
        let mut out = String::new();
        if self.changes.is_empty() {
            writeln!(out, "No changes detected.")?;
            return Ok(out);
        }
        for change in &self.changes {
            let show = |v: &Option<ValueRepr>| {
                v.as_ref()
                    .map(ValueRepr::format_for_display)
                    .unwrap_or_default()
            };
            match change.change_type {
                ChangeType::Added => writeln!(out, "+ {}: {}", change.path, show(&change.new_value))?,
                ChangeType::Removed => writeln!(out, "- {}: {}", change.path, show(&change.old_value))?,
                ChangeType::Modified => writeln!(
                    out,
                    "~ {}: {} -> {}",
                    change.path,
                    show(&change.old_value),
                    show(&change.new_value)
                )?,
            }
        }
        Ok(out)
    }
}
