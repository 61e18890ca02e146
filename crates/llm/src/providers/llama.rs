use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::bedrock::BedrockRuntime;
use crate::provider::{GenerationParams, LlmError, LlmProvider};

/// Meta Llama 3 on the Bedrock runtime. The model is trained on a
/// specific instruction format, so the raw prompt is wrapped in the
/// header markers it expects before being sent.
pub struct LlamaProvider {
    runtime: Arc<BedrockRuntime>,
    model_id: String,
}

impl LlamaProvider {
    pub fn new(runtime: Arc<BedrockRuntime>, model_id: String) -> Self {
        Self { runtime, model_id }
    }
}

fn format_prompt(prompt: &str) -> String {
    format!(
        "<|begin_of_text|><|start_header_id|>user<|end_header_id|>\n{prompt}\n<|eot_id|>\n<|start_header_id|>assistant<|end_header_id|>\n"
    )
}

fn build_request(prompt: &str, params: &GenerationParams) -> serde_json::Value {
    json!({
        "prompt": format_prompt(prompt),
        "max_gen_len": params.max_tokens,
        "temperature": params.temperature,
        "top_p": params.top_p,
    })
}

fn parse_response(bytes: &[u8]) -> Result<String, LlmError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| LlmError::Parse(e.to_string()))?;
    value["generation"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| LlmError::Parse("missing generation".into()))
}

#[async_trait]
impl LlmProvider for LlamaProvider {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> GenerationParams {
        GenerationParams {
            temperature: 0.5,
            top_p: 0.9,
            max_tokens: 512,
        }
    }

    #[test]
    fn prompt_is_wrapped_in_instruction_format() {
        let formatted = format_prompt("hello");
        assert!(formatted.starts_with("<|begin_of_text|>"));
        assert!(formatted.contains("hello"));
        assert!(formatted.ends_with("<|start_header_id|>assistant<|end_header_id|>\n"));
    }

    #[test]
    fn request_uses_max_gen_len() {
        let body = build_request("hello", &params());
        assert_eq!(body["max_gen_len"], 512);
        assert!(body["prompt"].as_str().unwrap().contains("hello"));
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn response_generation_is_extracted() {
        let raw = br#"{"generation": " Hi there. ", "stop_reason": "stop"}"#;
        assert_eq!(parse_response(raw).unwrap(), "Hi there.");
    }

    #[test]
    fn missing_generation_is_parse_error() {
        let err = parse_response(br#"{"outputs": "nope"}"#).unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }
}
