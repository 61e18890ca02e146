use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f32(key: &str, default: f32) -> f32 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub aws: AwsConfig,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub storage: StorageConfig,
    pub retrieval: RetrievalConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            aws: AwsConfig::from_env(),
            chunking: ChunkingConfig::from_env(),
            embedding: EmbeddingConfig::from_env(),
            llm: LlmConfig::from_env(),
            storage: StorageConfig::from_env(),
            retrieval: RetrievalConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  aws:        region={}", self.aws.region);
        tracing::info!(
            "  chunking:   chunk_size={}, overlap={}",
            self.chunking.chunk_size,
            self.chunking.overlap
        );
        tracing::info!(
            "  embedding:  model={}, dimensions={}, batch_size={}",
            self.embedding.model_id,
            self.embedding.dimensions,
            self.embedding.batch_size
        );
        tracing::info!(
            "  llm:        model={}, temperature={}, top_p={}, max_tokens={}, timeout={}s",
            self.llm.model,
            self.llm.temperature,
            self.llm.top_p,
            self.llm.max_tokens,
            self.llm.request_timeout_secs
        );
        tracing::info!(
            "  storage:    docs_dir={}, index_path={}",
            self.storage.docs_dir.display(),
            self.storage.index_path.display()
        );
        tracing::info!(
            "  retrieval:  top_k={}, min_similarity={}",
            self.retrieval.top_k,
            self.retrieval.min_similarity
        );
    }
}

// ── AWS ───────────────────────────────────────────────────────

/// Credentials themselves come from the ambient AWS credential chain
/// (env vars, shared config, instance profile).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
}

impl AwsConfig {
    fn from_env() -> Self {
        Self {
            region: env_or("AWS_REGION", "us-east-1"),
        }
    }
}

// ── Chunking ──────────────────────────────────────────────────

/// Raw chunking parameters; validated where chunking happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub overlap: usize,
}

impl ChunkingConfig {
    fn from_env() -> Self {
        Self {
            chunk_size: env_usize("CHUNK_SIZE", 10_000),
            overlap: env_usize("CHUNK_OVERLAP", 1_000),
        }
    }
}

// ── Embedding ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model_id: String,
    pub dimensions: usize,
    pub batch_size: usize,
}

impl EmbeddingConfig {
    fn from_env() -> Self {
        Self {
            model_id: env_or("EMBEDDING_MODEL_ID", "amazon.titan-embed-text-v1"),
            dimensions: env_usize("EMBEDDING_DIMENSIONS", 1536),
            batch_size: env_usize("EMBEDDING_BATCH_SIZE", 64),
        }
    }
}

// ── LLM ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "claude", "mistral", "llama"
    pub model: String,
    pub claude_model_id: String,
    pub mistral_model_id: String,
    pub llama_model_id: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

impl LlmConfig {
    fn from_env() -> Self {
        Self {
            model: env_or("LLM_MODEL", "claude"),
            claude_model_id: env_or("CLAUDE_MODEL_ID", "anthropic.claude-v2:1"),
            mistral_model_id: env_or("MISTRAL_MODEL_ID", "mistral.mistral-7b-instruct-v0:2"),
            llama_model_id: env_or("LLAMA_MODEL_ID", "us.meta.llama3-2-3b-instruct-v1:0"),
            temperature: env_f32("LLM_TEMPERATURE", 0.7),
            top_p: env_f32("LLM_TOP_P", 0.9),
            max_tokens: env_u32("LLM_MAX_TOKENS", 512),
            request_timeout_secs: env_u64("LLM_TIMEOUT_SECS", 60),
        }
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory scanned for PDF documents at ingestion time.
    pub docs_dir: PathBuf,
    /// File the vector index is persisted to.
    pub index_path: PathBuf,
}

impl StorageConfig {
    fn from_env() -> Self {
        Self {
            docs_dir: PathBuf::from(env_or("DOCS_DIR", "data")),
            index_path: PathBuf::from(env_or("INDEX_PATH", "index/docqa.idx")),
        }
    }
}

// ── Retrieval ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
    /// Entries scoring below this are discarded; 0.0 disables the filter.
    pub min_similarity: f32,
}

impl RetrievalConfig {
    fn from_env() -> Self {
        Self {
            top_k: env_usize("RETRIEVAL_TOP_K", 3),
            min_similarity: env_f32("RETRIEVAL_MIN_SIMILARITY", 0.0),
        }
    }
}
