//! Error types for the discovery intake service.

use std::time::Duration;

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Answer validation errors.
///
/// The `Display` strings are user-facing: they are surfaced verbatim next to
/// the input that failed, so they stay in plain second-person English.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("This field is required")]
    Required,

    #[error("Please keep your answer under {max} characters")]
    TooLong { max: usize },

    #[error("Please enter a valid number")]
    NotANumber,

    #[error("Name is required")]
    NameRequired,

    #[error("Email is required")]
    EmailRequired,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please select at least one option")]
    NoSelection,
}

/// Question generation errors (provider or streaming transport).
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation request failed with HTTP {status}")]
    Http { status: u16 },

    #[error("Generation request failed: {0}")]
    Request(String),

    #[error("Generation timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Provider {provider} request failed: {reason}")]
    Provider { provider: String, reason: String },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Submission delivery errors (webhook or submit round trip).
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Webhook rejected the payload with HTTP {status} (not retried)")]
    Rejected { status: u16 },

    #[error("Webhook delivery failed after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },

    #[error("Submission timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Submission transport error: {0}")]
    Transport(String),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
