pub mod chain;
pub mod prompt;
pub mod retriever;

pub use chain::{AnswerChain, IngestSummary, Ingestor, RagError};
pub use retriever::Retriever;
