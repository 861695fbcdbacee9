use async_trait::async_trait;

use super::types::SamplingParams;
use crate::core::errors::ApiError;

#[async_trait]
pub trait AiProvider: Send + Sync {
    /// return the provider name (e.g. "openai", "mock")
    fn name(&self) -> &str;

    /// embed a batch of texts; one vector per input, all of equal length
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;

    /// single-shot text generation
    async fn generate(&self, prompt: &str, params: &SamplingParams) -> Result<String, ApiError>;
}
