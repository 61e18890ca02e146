pub mod claude;
pub mod llama;
pub mod mistral;

use std::sync::Arc;

use docqa_core::config::LlmConfig;

use crate::bedrock::BedrockRuntime;
use crate::provider::{LlmError, LlmProvider};

/// Create the appropriate LLM provider based on config.
pub fn create_provider(
    config: &LlmConfig,
    runtime: Arc<BedrockRuntime>,
) -> Result<Box<dyn LlmProvider>, LlmError> {
    match config.model.as_str() {
        "claude" | "anthropic" => Ok(Box::new(claude::ClaudeProvider::new(
            runtime,
            config.claude_model_id.clone(),
        ))),
        "mistral" => Ok(Box::new(mistral::MistralProvider::new(
            runtime,
            config.mistral_model_id.clone(),
        ))),
        "llama" | "meta" => Ok(Box::new(llama::LlamaProvider::new(
            runtime,
            config.llama_model_id.clone(),
        ))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown model: '{}'",
            other
        ))),
    }
}
