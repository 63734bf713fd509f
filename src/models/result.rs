use serde::{Deserialize, Serialize};

use crate::models::dimensions::Dimensions;

/// The output of one SVG template conversion.
///
/// This is what the caller persists as a template row; the converter itself
/// stores nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    /// The HTML fragment reproducing the template layout.
    pub html: String,
    /// The stylesheet the fragment depends on.
    pub css: String,
    /// Placeholder names found in the template, deduplicated, in first-seen order.
    pub placeholders: Vec<String>,
    pub page_type: String,
    pub name: String,
    /// Number of text elements lifted out of the SVG.
    pub text_elements: usize,
    /// Number of image/circle/path elements found.
    pub icon_elements: usize,
    /// The coordinate space the percentages were computed against.
    pub dimensions: Dimensions,
}
