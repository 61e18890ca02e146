pub mod chunker;
pub mod document;
pub mod embedding;

pub use chunker::{ChunkConfig, ChunkConfigError, TextChunk};
pub use document::{ExtractedDocument, ExtractionError, LoadedDocument};
pub use embedding::{Embedder, EmbeddingError};
