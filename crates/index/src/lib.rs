pub mod index;
pub mod similarity;

pub use index::{IndexEntry, IndexError, ScoredEntry, VectorIndex};
pub use similarity::cosine;
