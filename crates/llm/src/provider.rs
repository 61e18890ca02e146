use async_trait::async_trait;

use docqa_core::config::LlmConfig;

/// Sampling parameters forwarded to the hosted model.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub temperature: f32,
    /// Nucleus-sampling threshold.
    pub top_p: f32,
    pub max_tokens: u32,
}

impl GenerationParams {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
        }
    }
}

/// Trait for hosted text-generation backends — each model implements this.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a completion request and return the generated text.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The remote model could not be reached or rejected the call.
    /// Retry policy belongs to the caller.
    #[error("generation unavailable: {0}")]
    Unavailable(String),

    #[error("generation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("failed to parse model response: {0}")]
    Parse(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}
