//! Conversion defaults, injected per call.

use super::constants::*;

/// The fallback values the converter uses when the SVG leaves something unspecified.
///
/// Passed into every conversion so that tests and hosts can change the
/// defaults without touching process-wide state.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterConfig {
    /// Page width used when the document has no usable viewBox or width.
    pub default_width: f64,
    /// Page height used when the document has no usable viewBox or height.
    pub default_height: f64,
    pub default_font_size: f64,
    pub default_font_family: String,
    pub default_font_weight: String,
    pub default_fill: String,
    /// Width and height given to `<image>` elements without a size.
    pub default_image_size: f64,
    /// Cap applied to the estimated width/height of `<path>` elements.
    pub path_size_cap: f64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            default_width: LETTER_WIDTH_PT,
            default_height: LETTER_HEIGHT_PT,
            default_font_size: DEFAULT_FONT_SIZE,
            default_font_family: DEFAULT_FONT_FAMILY.to_string(),
            default_font_weight: DEFAULT_FONT_WEIGHT.to_string(),
            default_fill: DEFAULT_TEXT_FILL.to_string(),
            default_image_size: DEFAULT_IMAGE_SIZE,
            path_size_cap: PATH_SIZE_CAP,
        }
    }
}

impl ConverterConfig {
    /// US Letter defaults (the same as `Default`).
    pub fn letter() -> Self {
        Self::default()
    }

    /// A4 defaults.
    pub fn a4() -> Self {
        Self {
            default_width: A4_WIDTH_PT,
            default_height: A4_HEIGHT_PT,
            ..Self::default()
        }
    }

    /// Overrides the fallback page size.
    pub fn with_default_page(mut self, width: f64, height: f64) -> Self {
        self.default_width = width;
        self.default_height = height;
        self
    }
}
