use thiserror::Error;

/// Errors raised while comparing two template revisions.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Text diff generation failed: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("Comparer is missing its base template")]
    MissingBase,
}
