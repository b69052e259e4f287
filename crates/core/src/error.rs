use thiserror::Error;

/// Pipeline failure kinds.
///
/// Domain-level outcomes ("no plausible type", "cannot satisfy the request")
/// are NOT errors; they live in the [`crate::outcome`] unions. This enum
/// covers the hard failures a caller cannot recover from by rephrasing.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The capability fetch could not complete (network/HTTP/parse failure)
    #[error("Failed to fetch capabilities from {url}: {detail}")]
    Connectivity { url: String, detail: String },

    /// The generative call itself failed (API error, unusable response)
    #[error("Generation backend error: {0}")]
    Backend(String),

    /// Caller contract violation, e.g. a target type absent from metadata
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The model emitted output that breaks the structured contract
    #[error("Model output violated the structured contract: {0}")]
    ConstraintViolation(String),

    /// The underlying call exceeded its deadline
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// The underlying call was cancelled before completing
    #[error("Operation cancelled: {0}")]
    Cancelled(String),
}
