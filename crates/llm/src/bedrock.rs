//! Shared `InvokeModel` wrapper over the Bedrock runtime client.

use std::time::Duration;

use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use aws_sdk_bedrockruntime::error::SdkError;
use aws_sdk_bedrockruntime::operation::invoke_model::InvokeModelError;
use aws_sdk_bedrockruntime::primitives::Blob;
use tracing::debug;

use docqa_core::config::AwsConfig;

use crate::provider::LlmError;

/// Bedrock runtime client with an operation deadline; a stalled call
/// surfaces as [`LlmError::Timeout`] rather than a generic failure.
pub struct BedrockRuntime {
    client: aws_sdk_bedrockruntime::Client,
    timeout: Duration,
}

impl BedrockRuntime {
    /// Load the AWS credential chain and build a client for the
    /// configured region with `timeout` as the per-operation deadline.
    pub async fn connect(aws: &AwsConfig, timeout: Duration) -> Self {
        let region = aws_sdk_bedrockruntime::config::Region::new(aws.region.clone());
        let timeouts = TimeoutConfig::builder()
            .operation_timeout(timeout)
            .build();
        let aws_cfg = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .timeout_config(timeouts)
            .load()
            .await;
        Self {
            client: aws_sdk_bedrockruntime::Client::new(&aws_cfg),
            timeout,
        }
    }

    /// Invoke `model_id` with a JSON request body in the model's native
    /// structure, returning the raw response bytes.
    pub async fn invoke(
        &self,
        model_id: &str,
        body: &serde_json::Value,
    ) -> Result<Vec<u8>, LlmError> {
        let payload =
            serde_json::to_vec(body).map_err(|e| LlmError::Parse(e.to_string()))?;

        debug!(model_id, "invoking model");

        let response = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(payload))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        Ok(response.body().clone().into_inner())
    }

    fn classify(&self, err: SdkError<InvokeModelError>) -> LlmError {
        let seconds = self.timeout.as_secs();
        match &err {
            SdkError::TimeoutError(_) => LlmError::Timeout { seconds },
            SdkError::DispatchFailure(failure)
                if failure
                    .as_connector_error()
                    .map(|c| c.is_timeout())
                    .unwrap_or(false) =>
            {
                LlmError::Timeout { seconds }
            }
            _ => LlmError::Unavailable(err.to_string()),
        }
    }
}
