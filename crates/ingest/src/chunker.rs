//! Fixed-window chunking with character overlap.
//!
//! Splits document text into windows of `chunk_size` characters starting
//! every `chunk_size - overlap` characters, so consecutive chunks share
//! exactly `overlap` characters of context. Splitting is deterministic
//! and operates on characters, never mid-codepoint.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ChunkConfigError {
    #[error("chunk_size must be positive")]
    ZeroChunkSize,
    #[error("overlap must be positive")]
    ZeroOverlap,
    #[error("overlap ({overlap}) must be smaller than chunk_size ({chunk_size})")]
    OverlapTooLarge { chunk_size: usize, overlap: usize },
}

/// Validated chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkConfig {
    chunk_size: usize,
    overlap: usize,
}

impl ChunkConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ChunkConfigError> {
        if chunk_size == 0 {
            return Err(ChunkConfigError::ZeroChunkSize);
        }
        if overlap == 0 {
            return Err(ChunkConfigError::ZeroOverlap);
        }
        if overlap >= chunk_size {
            return Err(ChunkConfigError::OverlapTooLarge {
                chunk_size,
                overlap,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Characters between consecutive chunk starts.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 10_000,
            overlap: 1_000,
        }
    }
}

/// A chunk of text and its character offset in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    /// Offset of the first character, counted in characters.
    pub char_offset: usize,
    pub content: String,
}

/// Split `text` into overlapping windows per `config`.
///
/// The final chunk may be shorter than `chunk_size`; no chunk is empty;
/// empty input yields no chunks; input shorter than `chunk_size` yields
/// exactly one chunk. Dropping the first `overlap` characters of every
/// chunk after the first and concatenating reconstructs the input.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Vec<TextChunk> {
    // Byte offset of every character, so windows never split a codepoint.
    let char_starts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let total = char_starts.len();
    if total == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;
    loop {
        let end = (start + config.chunk_size).min(total);
        let byte_start = char_starts[start];
        let byte_end = if end == total {
            text.len()
        } else {
            char_starts[end]
        };
        chunks.push(TextChunk {
            char_offset: start,
            content: text[byte_start..byte_end].to_string(),
        });
        if end == total {
            break;
        }
        start += config.stride();
    }
    chunks
}
