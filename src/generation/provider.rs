use crate::{
    error::ProviderError,
    models::{ProviderRequest, ProviderResponse},
};
use async_trait::async_trait;

/// A remote text-to-image backend. `GenerationClient` is its only caller.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, ProviderError>;
}
