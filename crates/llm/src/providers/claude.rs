use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::bedrock::BedrockRuntime;
use crate::provider::{GenerationParams, LlmError, LlmProvider};

/// Anthropic Claude on the Bedrock runtime, using the model's native
/// messages payload.
pub struct ClaudeProvider {
    runtime: Arc<BedrockRuntime>,
    model_id: String,
}

impl ClaudeProvider {
    pub fn new(runtime: Arc<BedrockRuntime>, model_id: String) -> Self {
        Self { runtime, model_id }
    }
}

fn build_request(prompt: &str, params: &GenerationParams) -> serde_json::Value {
    json!({
        "anthropic_version": "bedrock-2023-05-31",
        "max_tokens": params.max_tokens,
        "temperature": params.temperature,
        "top_p": params.top_p,
        "messages": [
            {
                "role": "user",
                "content": [{ "type": "text", "text": prompt }],
            }
        ],
    })
}

fn parse_response(bytes: &[u8]) -> Result<String, LlmError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| LlmError::Parse(e.to_string()))?;
    value["content"][0]["text"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| LlmError::Parse("missing content[0].text".into()))
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, LlmError> {
        let body = build_request(prompt, params);
        let bytes = self.runtime.invoke(&self.model_id, &body).await?;
        parse_response(&bytes)
    }
}
