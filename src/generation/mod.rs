pub mod gemini;
pub mod placeholder;
pub mod provider;
pub mod retry;

use crate::{
    error::GenerationError,
    models::{GenerationRequest, ProviderRequest, ProviderResponse},
};
use std::sync::Arc;

pub use gemini::GeminiProvider;
pub use placeholder::PlaceholderProvider;
pub use provider::ImageProvider;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};

/// Calls an `ImageProvider` under a `RetryPolicy` and turns its answer into a data URI.
#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn ImageProvider>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl GenerationClient {
    pub fn new(provider: Arc<dyn ImageProvider>, policy: RetryPolicy) -> Self {
        Self {
            provider,
            policy,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// The aspect ratio is always sent; models that support it also get a size hint.
    pub fn shape_request(request: &GenerationRequest) -> ProviderRequest {
        ProviderRequest {
            prompt: request.prompt.clone(),
            model_id: request.model.id().to_string(),
            aspect_ratio: request.aspect_ratio,
            size_hint: request.model.size_hint(),
        }
    }

    /// Returns a data URI on success. After the last attempt fails, that attempt's error
    /// is returned unchanged.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let call = Self::shape_request(request);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match self.attempt(&call).await {
                Ok(data_uri) => {
                    if attempt > 1 {
                        log::info!("Request {} succeeded on attempt {}", request.id, attempt);
                    }
                    return Ok(data_uri);
                }
                Err(err) if attempt <= self.policy.max_retries => {
                    let delay = self.policy.backoff(attempt);
                    log::warn!(
                        "Generation attempt {}/{} for {} failed: {}. Retrying in {}ms",
                        attempt,
                        self.policy.max_attempts(),
                        request.id,
                        err,
                        delay.as_millis()
                    );
                    self.sleeper.sleep(delay).await;
                }
                Err(err) => {
                    log::debug!(
                        "Generation for {} gave up after {} attempt(s): {}",
                        request.id,
                        attempt,
                        err
                    );
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(&self, call: &ProviderRequest) -> Result<String, GenerationError> {
        match self.provider.generate(call).await? {
            ProviderResponse::Image(payload) if !payload.data.is_empty() => {
                Ok(payload.to_data_uri())
            }
            ProviderResponse::Image(_) | ProviderResponse::Empty => {
                Err(GenerationError::NoImageData)
            }
            ProviderResponse::Declined(reason) => Err(GenerationError::Declined(reason)),
        }
    }
}
