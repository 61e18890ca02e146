use std::sync::Arc;

use docqa_core::document::ChunkId;

use super::traits::{Embedder, EmbeddingError};

/// Collects (ChunkId, text) pairs and flushes when the batch is full.
pub struct EmbeddingBatcher {
    buffer: Vec<(ChunkId, String)>,
    batch_size: usize,
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingBatcher {
    pub fn new(embedder: Arc<dyn Embedder>, batch_size: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(batch_size),
            batch_size,
            embedder,
        }
    }

    /// Add a chunk to the batch. Returns embeddings if the batch is full (auto-flush).
    pub async fn add(
        &mut self,
        chunk_id: ChunkId,
        text: String,
    ) -> Result<Option<Vec<(ChunkId, Vec<f32>)>>, EmbeddingError> {
        self.buffer.push((chunk_id, text));
        if self.buffer.len() >= self.batch_size {
            Ok(Some(self.flush().await?))
        } else {
            Ok(None)
        }
    }

    /// Force-flush remaining items.
    pub async fn flush(&mut self) -> Result<Vec<(ChunkId, Vec<f32>)>, EmbeddingError> {
        if self.buffer.is_empty() {
            return Ok(Vec::new());
        }
        let batch: Vec<(ChunkId, String)> = self.buffer.drain(..).collect();
        let texts: Vec<&str> = batch.iter().map(|(_, t)| t.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        Ok(batch
            .into_iter()
            .zip(embeddings)
            .map(|((id, _), emb)| (id, emb))
            .collect())
    }

    /// Number of items currently buffered.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
