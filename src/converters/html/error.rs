use thiserror::Error;

/// Errors that can occur during the SVG to HTML template conversion.
///
/// Malformed SVG is not one of them: the converter is best-effort and
/// degrades to an empty-looking template instead.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Formatting error during HTML/CSS generation: {0}")]
    FormatError(#[from] std::fmt::Error),
}

/// A specialized Result type for template conversion operations.
pub type Result<T> = std::result::Result<T, ConversionError>;
