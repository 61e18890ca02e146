use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_bedrockruntime::primitives::Blob;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use docqa_core::config::{AwsConfig, EmbeddingConfig};

use super::traits::{Embedder, EmbeddingError};

/// Amazon Titan embedding backend on the Bedrock runtime.
///
/// Titan embeds one text per `InvokeModel` call, so a batch is a
/// sequential loop of invocations in input order.
pub struct TitanEmbedder {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
    dimensions: usize,
}

#[derive(Deserialize)]
struct TitanResponse {
    embedding: Vec<f32>,
}

fn build_request(text: &str) -> serde_json::Value {
    json!({ "inputText": text })
}

fn parse_response(bytes: &[u8]) -> Result<Vec<f32>, EmbeddingError> {
    let resp: TitanResponse = serde_json::from_slice(bytes)
        .map_err(|e| EmbeddingError::Unavailable(format!("invalid embedding response: {e}")))?;
    Ok(resp.embedding)
}

impl TitanEmbedder {
    pub fn new(
        client: aws_sdk_bedrockruntime::Client,
        model_id: String,
        dimensions: usize,
    ) -> Self {
        Self {
            client,
            model_id,
            dimensions,
        }
    }

    /// Build an embedder from config, loading the AWS credential chain.
    pub async fn from_config(aws: &AwsConfig, embedding: &EmbeddingConfig) -> Self {
        let region = aws_sdk_bedrockruntime::config::Region::new(aws.region.clone());
        let aws_cfg = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;
        Self::new(
            aws_sdk_bedrockruntime::Client::new(&aws_cfg),
            embedding.model_id.clone(),
            embedding.dimensions,
        )
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let body = serde_json::to_vec(&build_request(text))
            .map_err(|e| EmbeddingError::Unavailable(e.to_string()))?;

        let response = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| EmbeddingError::Unavailable(e.to_string()))?;

        let vector = parse_response(response.body().as_ref())?;
        if vector.len() != self.dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }
}

#[async_trait]
impl Embedder for TitanEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed_one(text).await?);
        }
        debug!(model = %self.model_id, count = vectors.len(), "embedded batch");
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
