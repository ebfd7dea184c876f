use std::time::Duration;
use thiserror::Error;

/// Rejection raised by the validator. The message is meant to be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Prompt is too short")]
    PromptTooShort,
    #[error("Prompt exceeds {max} characters")]
    PromptTooLong { max: usize },
    #[error("Unsupported aspect ratio: {0}")]
    UnsupportedAspectRatio(String),
    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("Please sign in before generating images.")]
    NotAuthenticated,
    #[error("Please wait a moment before sending another request.")]
    RateLimited { retry_after: Duration },
    #[error("Queue is full ({capacity}). Please wait for jobs to finish.")]
    QueueFull { capacity: usize },
}

/// Everything `ImageQueue::submit` can reject with. Neither variant mutates pipeline state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Admission(#[from] AdmissionError),
}

/// Transport or provider-level failure (network, auth, quota).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Terminal failure of a single generation, recorded on its history entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Model declined to generate image: {0}")]
    Declined(String),
    #[error("Model response did not contain inline image data.")]
    NoImageData,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authentication with {provider} failed: {reason}")]
    Failed { provider: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, SubmitError>;
