use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique chunk identifier within an index.
pub type ChunkId = Uuid;

/// A bounded slice of extracted document text, the unit of embedding
/// and retrieval. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: ChunkId,
    /// Filename of the source document.
    pub source: String,
    /// 0-based position within the source document's chunk sequence.
    pub chunk_index: usize,
    /// Character offset of the chunk's start in the source text.
    pub char_offset: usize,
    /// The chunk text content.
    pub content: String,
}

/// A generated answer together with the chunks it was conditioned on.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<ChunkRecord>,
}
