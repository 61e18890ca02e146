//! claude-demo — invoke Anthropic Claude on Bedrock with a fixed prompt.
//!
//! Sends one request using the model's native inference payload and
//! prints the response text. Useful as a connectivity check for the
//! configured region and credentials.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use docqa_core::config::{load_dotenv, Config};
use docqa_llm::provider::{GenerationParams, LlmProvider};
use docqa_llm::providers::claude::ClaudeProvider;
use docqa_llm::BedrockRuntime;

const PROMPT: &str = "\
    Analyze this customer feedback: 'I've been waiting too long for my loan approval, and the staff was not helpful.'\n\
    And summarize the top 3 areas of improvement based on these customer feedback responses.";

/// Direct Claude invocation with a fixed prompt.
#[derive(Parser, Debug)]
#[command(name = "claude-demo", version, about)]
struct Cli {
    /// Bedrock model identifier.
    #[arg(long, env = "CLAUDE_MODEL_ID", default_value = "anthropic.claude-v2:1")]
    model_id: String,

    /// Sampling temperature.
    #[arg(long, default_value_t = 0.5)]
    temperature: f32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();

    let runtime = Arc::new(
        BedrockRuntime::connect(
            &config.aws,
            Duration::from_secs(config.llm.request_timeout_secs),
        )
        .await,
    );
    let provider = ClaudeProvider::new(runtime, cli.model_id.clone());

    let params = GenerationParams {
        temperature: cli.temperature,
        top_p: config.llm.top_p,
        max_tokens: 512,
    };

    let text = provider
        .generate(PROMPT, &params)
        .await
        .with_context(|| format!("can't invoke '{}'", cli.model_id))?;

    println!("{text}");
    Ok(())
}
