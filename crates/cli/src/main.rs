mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use docqa_core::config::{load_dotenv, Config};
use docqa_index::{IndexError, VectorIndex};
use docqa_ingest::chunker::ChunkConfig;
use docqa_ingest::embedding::TitanEmbedder;
use docqa_llm::provider::GenerationParams;
use docqa_llm::{create_provider, BedrockRuntime};
use docqa_rag::{AnswerChain, Ingestor, Retriever};

use crate::cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let args = CliArgs::parse();
    let mut config = Config::from_env();
    if let Some(docs_dir) = args.docs_dir {
        config.storage.docs_dir = docs_dir;
    }
    if let Some(index_path) = args.index_path {
        config.storage.index_path = index_path;
    }
    config.log_summary();

    match args.command {
        Command::Ingest => run_ingest(&config).await,
        Command::Ask { model, question } => {
            if let Some(model) = model {
                config.llm.model = model;
            }
            run_ask(&config, &question).await
        }
    }
}

async fn run_ingest(config: &Config) -> Result<()> {
    let chunking = ChunkConfig::new(config.chunking.chunk_size, config.chunking.overlap)
        .context("invalid chunking configuration")?;
    let embedder = Arc::new(TitanEmbedder::from_config(&config.aws, &config.embedding).await);

    let ingestor = Ingestor::new(embedder, chunking, config.embedding.batch_size);
    let summary = ingestor
        .run(&config.storage.docs_dir, &config.storage.index_path)
        .await
        .context("ingestion failed")?;

    if !summary.found_documents() {
        println!(
            "No PDF documents found in {}. Add files and re-run ingest.",
            config.storage.docs_dir.display()
        );
        return Ok(());
    }

    println!(
        "Indexed {} chunk(s) from {} document(s) into {}.",
        summary.chunks,
        summary.documents,
        config.storage.index_path.display()
    );
    Ok(())
}

async fn run_ask(config: &Config, question: &str) -> Result<()> {
    if question.trim().is_empty() {
        bail!("please enter a question");
    }

    let index = match VectorIndex::load(&config.storage.index_path) {
        Ok(index) => index,
        Err(IndexError::NotFound(path)) => {
            bail!(
                "nothing indexed yet (no index at {}) — run `docqa ingest` first",
                path.display()
            );
        }
        Err(e) => return Err(e).context("failed to load index"),
    };
    info!(
        entries = index.len(),
        path = %config.storage.index_path.display(),
        "index loaded"
    );

    let runtime = Arc::new(
        BedrockRuntime::connect(
            &config.aws,
            Duration::from_secs(config.llm.request_timeout_secs),
        )
        .await,
    );
    let provider = create_provider(&config.llm, runtime).context("failed to create provider")?;
    let embedder = Arc::new(TitanEmbedder::from_config(&config.aws, &config.embedding).await);

    let chain = AnswerChain::new(
        embedder,
        provider,
        Retriever::new(config.retrieval.top_k, config.retrieval.min_similarity),
        GenerationParams::from_config(&config.llm),
    );

    let answer = chain.ask(&index, question).await?;

    println!("{}", answer.text);
    if !answer.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &answer.sources {
            println!("  {} (chunk {})", source.source, source.chunk_index);
        }
    }
    Ok(())
}
