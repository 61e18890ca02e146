//! The two orchestrated flows: ingest-and-index and query-and-answer.
//!
//! Both are linear sequences that fail fast at the first stage error,
//! wrapping it with the stage name. No retries happen here — a
//! retryable remote failure is surfaced to the caller as-is.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use docqa_core::document::{Answer, ChunkRecord};
use docqa_index::{IndexError, VectorIndex};
use docqa_ingest::chunker::{chunk_text, ChunkConfig, ChunkConfigError};
use docqa_ingest::document::{load_documents, LoadError};
use docqa_ingest::embedding::{Embedder, EmbeddingBatcher, EmbeddingError};
use docqa_llm::provider::{GenerationParams, LlmError, LlmProvider};

use crate::prompt;
use crate::retriever::Retriever;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("document loading failed: {0}")]
    Load(#[from] LoadError),

    #[error("invalid chunking parameters: {0}")]
    ChunkConfig(#[from] ChunkConfigError),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index operation failed: {0}")]
    Index(#[from] IndexError),

    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),
}

/// Outcome of an ingest run. Zero documents is a reported condition,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub documents: usize,
    pub chunks: usize,
}

impl IngestSummary {
    pub fn empty() -> Self {
        Self {
            documents: 0,
            chunks: 0,
        }
    }

    pub fn found_documents(&self) -> bool {
        self.documents > 0
    }
}

// ── Ingest flow ─────────────────────────────────────────────────────

/// Load → chunk → embed → index → persist.
pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    chunking: ChunkConfig,
    batch_size: usize,
}

impl Ingestor {
    pub fn new(embedder: Arc<dyn Embedder>, chunking: ChunkConfig, batch_size: usize) -> Self {
        Self {
            embedder,
            chunking,
            batch_size: batch_size.max(1),
        }
    }

    /// Ingest every PDF under `docs_dir`, rebuilding the index from
    /// scratch and atomically replacing the file at `index_path`. The
    /// prior persisted index is untouched until the new one is
    /// completely written.
    pub async fn run(
        &self,
        docs_dir: &Path,
        index_path: &Path,
    ) -> Result<IngestSummary, RagError> {
        let documents = load_documents(docs_dir)?;
        if documents.is_empty() {
            warn!(dir = %docs_dir.display(), "no PDF documents found, nothing to ingest");
            return Ok(IngestSummary::empty());
        }

        let mut records: Vec<ChunkRecord> = Vec::new();
        for doc in &documents {
            let text = doc.document.full_text();
            let chunks = chunk_text(&text, &self.chunking);
            info!(
                source = %doc.document.filename,
                pages = doc.page_count(),
                chunks = chunks.len(),
                "chunked document"
            );
            for (i, chunk) in chunks.into_iter().enumerate() {
                records.push(ChunkRecord {
                    id: Uuid::new_v4(),
                    source: doc.document.filename.clone(),
                    chunk_index: i,
                    char_offset: chunk.char_offset,
                    content: chunk.content,
                });
            }
        }

        // Embed in record order; the batcher flushes full batches as it
        // goes, so vectors concatenate back in the same order.
        let mut batcher = EmbeddingBatcher::new(self.embedder.clone(), self.batch_size);
        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(records.len());
        for record in &records {
            if let Some(flushed) = batcher.add(record.id, record.content.clone()).await? {
                vectors.extend(flushed.into_iter().map(|(_, v)| v));
            }
        }
        vectors.extend(batcher.flush().await?.into_iter().map(|(_, v)| v));

        let summary = IngestSummary {
            documents: documents.len(),
            chunks: records.len(),
        };

        let mut index = VectorIndex::new();
        index.insert(records, vectors)?;
        index.persist(index_path)?;

        info!(
            documents = summary.documents,
            chunks = summary.chunks,
            index = %index_path.display(),
            "ingestion complete"
        );
        Ok(summary)
    }
}

// ── Answer flow ─────────────────────────────────────────────────────

/// Embed query → retrieve → assemble prompt → generate.
pub struct AnswerChain {
    embedder: Arc<dyn Embedder>,
    provider: Box<dyn LlmProvider>,
    retriever: Retriever,
    params: GenerationParams,
}

impl AnswerChain {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        provider: Box<dyn LlmProvider>,
        retriever: Retriever,
        params: GenerationParams,
    ) -> Self {
        Self {
            embedder,
            provider,
            retriever,
            params,
        }
    }

    /// Answer `question` from the indexed documents. The empty-index
    /// case fails before any generation call is made.
    pub async fn ask(&self, index: &VectorIndex, question: &str) -> Result<Answer, RagError> {
        let mut embedded = self.embedder.embed_batch(&[question]).await?;
        if embedded.is_empty() {
            return Err(RagError::Embedding(EmbeddingError::Unavailable(
                "empty embedding response for query".to_string(),
            )));
        }
        let query = embedded.remove(0);

        let hits = self.retriever.retrieve(index, &query)?;
        let texts: Vec<&str> = hits.iter().map(|h| h.record.content.as_str()).collect();
        let rendered = prompt::render(&texts, question);

        info!(sources = hits.len(), "generating answer");
        let text = self.provider.generate(&rendered, &self.params).await?;

        Ok(Answer {
            text,
            sources: hits.into_iter().map(|h| h.record).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Maps texts to fixed 2-d vectors: anything mentioning "ownership"
    /// points one way, everything else the other.
    struct FakeEmbedder;

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts
                .iter()
                .map(|t| {
                    if t.contains("ownership") {
                        vec![1.0, 0.0]
                    } else {
                        vec![0.0, 1.0]
                    }
                })
                .collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    struct FakeProvider {
        calls: Arc<AtomicUsize>,
        last_prompt: Arc<Mutex<String>>,
    }

    impl FakeProvider {
        fn new() -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                last_prompt: Arc::new(Mutex::new(String::new())),
            }
        }

        fn handles(&self) -> (Arc<AtomicUsize>, Arc<Mutex<String>>) {
            (self.calls.clone(), self.last_prompt.clone())
        }
    }

    #[async_trait]
    impl LlmProvider for FakeProvider {
        async fn generate(
            &self,
            prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = prompt.to_string();
            Ok("a generated answer".to_string())
        }
    }

    fn params() -> GenerationParams {
        GenerationParams {
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 512,
        }
    }

    fn record(content: &str, chunk_index: usize) -> ChunkRecord {
        ChunkRecord {
            id: Uuid::new_v4(),
            source: "book.pdf".to_string(),
            chunk_index,
            char_offset: 0,
            content: content.to_string(),
        }
    }

    fn indexed() -> VectorIndex {
        let mut index = VectorIndex::new();
        index
            .insert(
                vec![
                    record("ownership moves values between bindings", 0),
                    record("threads communicate by message passing", 1),
                ],
                vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            )
            .unwrap();
        index
    }

    #[tokio::test]
    async fn ask_returns_answer_with_sources() {
        let chain = AnswerChain::new(
            Arc::new(FakeEmbedder),
            Box::new(FakeProvider::new()),
            Retriever::new(1, 0.0),
            params(),
        );
        let answer = chain.ask(&indexed(), "what is ownership?").await.unwrap();
        assert_eq!(answer.text, "a generated answer");
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].chunk_index, 0);
    }

    #[tokio::test]
    async fn prompt_contains_retrieved_context_and_question() {
        let provider = FakeProvider::new();
        let (_, last_prompt) = provider.handles();
        let chain = AnswerChain::new(
            Arc::new(FakeEmbedder),
            Box::new(provider),
            Retriever::new(2, 0.0),
            params(),
        );
        chain.ask(&indexed(), "what is ownership?").await.unwrap();

        let rendered = last_prompt.lock().unwrap().clone();
        assert!(rendered.contains("ownership moves values between bindings"));
        assert!(rendered.contains("Questions: what is ownership?"));
        // Best match comes first in the context block.
        let a = rendered.find("ownership moves").unwrap();
        let b = rendered.find("message passing").unwrap();
        assert!(a < b);
    }

    #[tokio::test]
    async fn empty_index_fails_before_generation() {
        let provider = FakeProvider::new();
        let (calls, _) = provider.handles();
        let chain = AnswerChain::new(
            Arc::new(FakeEmbedder),
            Box::new(provider),
            Retriever::new(3, 0.0),
            params(),
        );
        let err = chain.ask(&VectorIndex::new(), "anything?").await.unwrap_err();
        assert!(matches!(err, RagError::Index(IndexError::EmptyIndex)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ingest_of_empty_directory_reports_zero() {
        let dir = std::env::temp_dir().join(format!("docqa_chain_empty_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let index_path = dir.join("out.idx");

        let ingestor = Ingestor::new(
            Arc::new(FakeEmbedder),
            ChunkConfig::new(100, 10).unwrap(),
            8,
        );
        let summary = ingestor.run(&dir, &index_path).await.unwrap();
        assert_eq!(summary, IngestSummary::empty());
        assert!(!summary.found_documents());
        // Nothing was persisted.
        assert!(!index_path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
