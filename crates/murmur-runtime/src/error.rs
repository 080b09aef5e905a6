use thiserror::Error;

/// Errors raised while building the model adapter.
///
/// Failures during generation are reported through the model port as
/// `GenerationError` instead.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Invalid model URL {url}: {reason}")]
    InvalidModelUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
