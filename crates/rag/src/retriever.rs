use docqa_index::{IndexError, ScoredEntry, VectorIndex};
use tracing::debug;

/// Top-K retrieval over a [`VectorIndex`] with an optional similarity
/// floor.
#[derive(Debug, Clone, Copy)]
pub struct Retriever {
    top_k: usize,
    /// Entries scoring below this are discarded; 0.0 disables the filter
    /// (cosine scores can legitimately be negative).
    min_similarity: f32,
}

impl Retriever {
    pub fn new(top_k: usize, min_similarity: f32) -> Self {
        Self {
            top_k,
            min_similarity,
        }
    }

    /// The most similar chunks for `query`, descending by similarity,
    /// never more than `top_k`.
    pub fn retrieve(
        &self,
        index: &VectorIndex,
        query: &[f32],
    ) -> Result<Vec<ScoredEntry>, IndexError> {
        let mut hits = index.search(query, self.top_k)?;
        if self.min_similarity > 0.0 {
            hits.retain(|hit| hit.similarity >= self.min_similarity);
        }
        debug!(hits = hits.len(), top_k = self.top_k, "retrieved chunks");
        Ok(hits)
    }
}
