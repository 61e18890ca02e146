pub mod batcher;
pub mod titan;
pub mod traits;

pub use batcher::EmbeddingBatcher;
pub use titan::TitanEmbedder;
pub use traits::{Embedder, EmbeddingError};
