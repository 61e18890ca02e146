use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::bedrock::BedrockRuntime;
use crate::provider::{GenerationParams, LlmError, LlmProvider};

/// Mistral Instruct on the Bedrock runtime. The model expects the raw
/// prompt wrapped in `[INST]` instruction markers.
pub struct MistralProvider {
    runtime: Arc<BedrockRuntime>,
    model_id: String,
}

impl MistralProvider {
    pub fn new(runtime: Arc<BedrockRuntime>, model_id: String) -> Self {
        Self { runtime, model_id }
    }
}

fn build_request(prompt: &str, params: &GenerationParams) -> serde_json::Value {
    json!({
        "prompt": format!("<s>[INST] {prompt} [/INST]"),
        "max_tokens": params.max_tokens,
        "temperature": params.temperature,
        "top_p": params.top_p,
    })
}

fn parse_response(bytes: &[u8]) -> Result<String, LlmError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| LlmError::Parse(e.to_string()))?;
    value["outputs"][0]["text"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| LlmError::Parse("missing outputs[0].text".into()))
}

#[async_trait]
impl LlmProvider for MistralProvider {
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
