pub mod config;
pub mod error;
pub mod generation;
pub mod identity;
pub mod logger;
pub mod models;
pub mod pipeline;

pub use config::{GeminiConfig, QueueConfig};
pub use error::{
    AdmissionError, AuthError, ConfigError, GenerationError, ProviderError, SubmitError,
    ValidationError,
};
pub use generation::{
    GeminiProvider, GenerationClient, ImageProvider, PlaceholderProvider, RetryPolicy, Sleeper,
};
pub use identity::{DemoIdentityProvider, IdentityProvider};
pub use models::*;
pub use pipeline::{ImageQueue, PipelineEvent, PipelineSnapshot};
