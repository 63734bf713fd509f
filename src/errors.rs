use crate::converters::html::ConversionError;
use thiserror::Error;

/// Represents errors that can occur while serving a template conversion request.
#[derive(Error, Debug)]
pub enum TemplateApiError {
    /// Neither `svgContent` nor `svgUrl` was provided.
    #[error("svgContent is required")]
    MissingContent,

    /// The request body was not valid JSON for a `ConvertRequest`.
    #[error("Invalid request body: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    /// The endpoint only accepts `POST` (and `OPTIONS` preflight).
    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),

    /// Error originating from the underlying HTTP client (`reqwest`).
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The remote SVG location answered with a non-success status.
    #[error("Fetching SVG failed: Status {status}, Message: {message}")]
    FetchFailed {
        status: reqwest::StatusCode,
        message: String,
    },

    /// An error indicating invalid input was provided to a client function.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The converter failed to produce output.
    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),
}

impl TemplateApiError {
    /// The HTTP status code this error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            TemplateApiError::MissingContent | TemplateApiError::InvalidInput(_) => 400,
            TemplateApiError::MethodNotAllowed(_) => 405,
            TemplateApiError::Network(_) | TemplateApiError::FetchFailed { .. } => 502,
            // An unreadable body is reported like any other unexpected failure.
            TemplateApiError::InvalidRequest(_) | TemplateApiError::Conversion(_) => 500,
        }
    }
}

/// A type alias for `Result<T, TemplateApiError>` for convenience within the crate.
pub type Result<T> = std::result::Result<T, TemplateApiError>;
