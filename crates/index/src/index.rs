//! In-memory vector index with versioned on-disk persistence.
//!
//! Entries pair a [`ChunkRecord`] with its embedding vector. The file
//! layout is a fixed header (magic, format version, dimensionality,
//! entry count, created-at timestamp) followed by length-prefixed
//! msgpack entries: each `(ChunkRecord, Vec<f32>)` tuple preceded by a
//! u32 little-endian byte length. A format change bumps the version and
//! fails loudly at load time instead of misreading old files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use docqa_core::document::ChunkRecord;

use crate::similarity::cosine;

const MAGIC: &[u8; 4] = b"DQIX";
const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = 4 + 2 + 4 + 8 + 8;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("no index found at {0}")]
    NotFound(PathBuf),

    #[error("corrupt index: {0}")]
    Corrupt(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("chunk/vector count mismatch: {records} records, {vectors} vectors")]
    CountMismatch { records: usize, vectors: usize },

    #[error("the index contains no entries")]
    EmptyIndex,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(String),
}

/// A chunk together with its embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub record: ChunkRecord,
    pub vector: Vec<f32>,
}

/// A search hit: the stored chunk and its similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub record: ChunkRecord,
    pub similarity: f32,
}

/// Append-only store of chunk embeddings with cosine nearest-neighbor
/// search. Dimensionality is fixed by the first inserted vector.
#[derive(Debug)]
pub struct VectorIndex {
    dimensions: Option<usize>,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self {
            dimensions: None,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensionality established by the first insert, if any.
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Append one entry per (record, vector) pair.
    ///
    /// The whole batch is validated before anything is appended, so a
    /// failed insert leaves the index unchanged.
    pub fn insert(
        &mut self,
        records: Vec<ChunkRecord>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<(), IndexError> {
        if records.len() != vectors.len() {
            return Err(IndexError::CountMismatch {
                records: records.len(),
                vectors: vectors.len(),
            });
        }

        let expected = match self.dimensions {
            Some(d) => d,
            None => match vectors.first() {
                Some(v) => v.len(),
                None => return Ok(()),
            },
        };
        for vector in &vectors {
            if vector.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
        }

        self.dimensions = Some(expected);
        self.entries.extend(
            records
                .into_iter()
                .zip(vectors)
                .map(|(record, vector)| IndexEntry { record, vector }),
        );
        Ok(())
    }

    /// Return the `k` entries most similar to `query`, descending by
    /// cosine similarity; ties keep insertion order. Fewer than `k`
    /// entries returns them all.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredEntry>, IndexError> {
        if self.entries.is_empty() {
            return Err(IndexError::EmptyIndex);
        }
        let dims = self.dimensions.unwrap_or(0);
        if query.len() != dims {
            return Err(IndexError::DimensionMismatch {
                expected: dims,
                actual: query.len(),
            });
        }

        let mut scored: Vec<ScoredEntry> = self
            .entries
            .iter()
            .map(|entry| ScoredEntry {
                record: entry.record.clone(),
                similarity: cosine(query, &entry.vector),
            })
            .collect();
        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        scored.truncate(k);
        Ok(scored)
    }

    /// Serialize all entries to `path`, atomically replacing whatever
    /// was there: the file is written to a temporary sibling first and
    /// renamed into place, so the prior persisted state survives any
    /// failure before the rename.
    pub fn persist(&self, path: &Path) -> Result<(), IndexError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = path.with_extension("idx.tmp");
        {
            let mut file = std::io::BufWriter::new(fs::File::create(&tmp_path)?);

            file.write_all(MAGIC)?;
            file.write_all(&FORMAT_VERSION.to_le_bytes())?;
            file.write_all(&(self.dimensions.unwrap_or(0) as u32).to_le_bytes())?;
            file.write_all(&(self.entries.len() as u64).to_le_bytes())?;
            file.write_all(&Utc::now().timestamp().to_le_bytes())?;

            for entry in &self.entries {
                let tuple = (&entry.record, &entry.vector);
                let encoded =
                    rmp_serde::to_vec(&tuple).map_err(|e| IndexError::Serialize(e.to_string()))?;
                let len = encoded.len() as u32;
                file.write_all(&len.to_le_bytes())?;
                file.write_all(&encoded)?;
            }
            file.flush()?;
        }
        fs::rename(&tmp_path, path)?;

        info!(
            path = %path.display(),
            entries = self.entries.len(),
            dimensions = self.dimensions.unwrap_or(0),
            "index persisted"
        );
        Ok(())
    }

    /// Load an index from `path`.
    ///
    /// A missing file is [`IndexError::NotFound`]; anything that does
    /// not parse exactly — wrong magic, unknown version, truncated or
    /// trailing data, wrong-length vectors — is [`IndexError::Corrupt`].
    /// A partially readable file never yields a partial index.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        if !path.exists() {
            return Err(IndexError::NotFound(path.to_path_buf()));
        }

        let data = fs::read(path)?;
        if data.len() < HEADER_LEN {
            return Err(IndexError::Corrupt("truncated header".to_string()));
        }

        if &data[0..4] != MAGIC {
            return Err(IndexError::Corrupt("bad magic".to_string()));
        }
        let version = u16::from_le_bytes(data[4..6].try_into().unwrap());
        if version != FORMAT_VERSION {
            return Err(IndexError::Corrupt(format!(
                "unsupported format version {version} (expected {FORMAT_VERSION})"
            )));
        }
        let dimensions = u32::from_le_bytes(data[6..10].try_into().unwrap()) as usize;
        let count = u64::from_le_bytes(data[10..18].try_into().unwrap()) as usize;

        let mut entries = Vec::with_capacity(count);
        let mut pos = HEADER_LEN;
        for _ in 0..count {
            if pos + 4 > data.len() {
                return Err(IndexError::Corrupt("truncated entry length".to_string()));
            }
            let len = u32::from_le_bytes(data[pos..pos + 4].try_into().unwrap()) as usize;
            pos += 4;

            if pos + len > data.len() {
                return Err(IndexError::Corrupt("truncated entry".to_string()));
            }
            let (record, vector): (ChunkRecord, Vec<f32>) =
                rmp_serde::from_slice(&data[pos..pos + len])
                    .map_err(|e| IndexError::Corrupt(format!("entry decode failed: {e}")))?;
            pos += len;

            if vector.len() != dimensions {
                return Err(IndexError::Corrupt(format!(
                    "entry vector has {} dimensions, header says {dimensions}",
                    vector.len()
                )));
            }
            entries.push(IndexEntry { record, vector });
        }

        if pos != data.len() {
            return Err(IndexError::Corrupt(format!(
                "{} trailing bytes after last entry",
                data.len() - pos
            )));
        }

        debug!(path = %path.display(), entries = entries.len(), "index loaded");
        Ok(Self {
            dimensions: if entries.is_empty() { None } else { Some(dimensions) },
            entries,
        })
    }
}

impl Default for VectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn record(source: &str, chunk_index: usize) -> ChunkRecord {
        ChunkRecord {
            id: Uuid::new_v4(),
            source: source.to_string(),
            chunk_index,
            char_offset: chunk_index * 100,
            content: format!("chunk {chunk_index} of {source}"),
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("docqa_index_{name}_{}.idx", Uuid::new_v4()))
    }

    fn populated() -> VectorIndex {
        let mut index = VectorIndex::new();
        index
            .insert(
                vec![record("a.pdf", 0), record("a.pdf", 1), record("b.pdf", 0)],
                vec![
                    vec![1.0, 0.0, 0.0],
                    vec![0.0, 1.0, 0.0],
                    vec![0.0, 0.0, 1.0],
                ],
            )
            .unwrap();
        index
    }

    #[test]
    fn new_index_is_empty() {
        let index = VectorIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.dimensions(), None);
    }

    #[test]
    fn insert_establishes_dimensions() {
        let index = populated();
        assert_eq!(index.len(), 3);
        assert_eq!(index.dimensions(), Some(3));
    }

    #[test]
    fn insert_empty_batch_is_noop() {
        let mut index = VectorIndex::new();
        index.insert(Vec::new(), Vec::new()).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.dimensions(), None);
    }

    #[test]
    fn mismatched_counts_rejected() {
        let mut index = VectorIndex::new();
        let err = index
            .insert(vec![record("a.pdf", 0)], vec![])
            .unwrap_err();
        assert!(matches!(err, IndexError::CountMismatch { .. }));
    }

    #[test]
    fn wrong_dimension_insert_leaves_index_unchanged() {
        let mut index = populated();
        let err = index
            .insert(vec![record("c.pdf", 0)], vec![vec![1.0, 2.0]])
            .unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn mixed_dimension_batch_rejected_wholesale() {
        let mut index = VectorIndex::new();
        let err = index
            .insert(
                vec![record("a.pdf", 0), record("a.pdf", 1)],
                vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]],
            )
            .unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { .. }));
        assert!(index.is_empty());
        assert_eq!(index.dimensions(), None);
    }

    #[test]
    fn search_empty_index_fails() {
        let index = VectorIndex::new();
        let err = index.search(&[1.0, 0.0, 0.0], 3).unwrap_err();
        assert!(matches!(err, IndexError::EmptyIndex));
    }

    #[test]
    fn search_wrong_query_dimension_fails() {
        let index = populated();
        let err = index.search(&[1.0, 0.0], 3).unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { .. }));
    }

    #[test]
    fn search_ranks_by_similarity() {
        let index = populated();
        let hits = index.search(&[1.0, 0.1, 0.0], 3).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].record.source, "a.pdf");
        assert_eq!(hits[0].record.chunk_index, 0);
        assert!(hits[0].similarity > hits[1].similarity);
        assert!(hits[1].similarity >= hits[2].similarity);
    }

    #[test]
    fn search_with_k_larger_than_index_returns_all() {
        let index = populated();
        let hits = index.search(&[1.0, 0.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn search_truncates_to_k() {
        let index = populated();
        let hits = index.search(&[1.0, 0.0, 0.0], 1).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut index = VectorIndex::new();
        index
            .insert(
                vec![record("first.pdf", 0), record("second.pdf", 0)],
                vec![vec![1.0, 0.0], vec![1.0, 0.0]],
            )
            .unwrap();
        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].record.source, "first.pdf");
        assert_eq!(hits[1].record.source, "second.pdf");
    }

    #[test]
    fn persist_load_roundtrip() {
        let path = temp_path("roundtrip");
        let index = populated();
        index.persist(&path).unwrap();

        let loaded = VectorIndex::load(&path).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.dimensions(), Some(3));
        for (a, b) in index.entries().iter().zip(loaded.entries()) {
            assert_eq!(a.record, b.record);
            assert_eq!(a.vector, b.vector);
        }

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn persist_replaces_prior_state_wholesale() {
        let path = temp_path("replace");
        populated().persist(&path).unwrap();

        let mut rebuilt = VectorIndex::new();
        rebuilt
            .insert(vec![record("new.pdf", 0)], vec![vec![0.5, 0.5]])
            .unwrap();
        rebuilt.persist(&path).unwrap();

        let loaded = VectorIndex::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.entries()[0].record.source, "new.pdf");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let path = temp_path("missing");
        let err = VectorIndex::load(&path).unwrap_err();
        assert!(matches!(err, IndexError::NotFound(_)));
    }

    #[test]
    fn load_truncated_file_is_corrupt() {
        let path = temp_path("truncated");
        populated().persist(&path).unwrap();

        let data = fs::read(&path).unwrap();
        fs::write(&path, &data[..data.len() - 7]).unwrap();

        let err = VectorIndex::load(&path).unwrap_err();
        assert!(matches!(err, IndexError::Corrupt(_)));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_bad_magic_is_corrupt() {
        let path = temp_path("magic");
        populated().persist(&path).unwrap();

        let mut data = fs::read(&path).unwrap();
        data[0] = b'X';
        fs::write(&path, &data).unwrap();

        let err = VectorIndex::load(&path).unwrap_err();
        assert!(matches!(err, IndexError::Corrupt(_)));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_unknown_version_is_corrupt() {
        let path = temp_path("version");
        populated().persist(&path).unwrap();

        let mut data = fs::read(&path).unwrap();
        data[4] = 0xFF;
        data[5] = 0xFF;
        fs::write(&path, &data).unwrap();

        let err = VectorIndex::load(&path).unwrap_err();
        assert!(matches!(err, IndexError::Corrupt(_)));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_trailing_garbage_is_corrupt() {
        let path = temp_path("trailing");
        populated().persist(&path).unwrap();

        let mut data = fs::read(&path).unwrap();
        data.extend_from_slice(b"garbage");
        fs::write(&path, &data).unwrap();

        let err = VectorIndex::load(&path).unwrap_err();
        assert!(matches!(err, IndexError::Corrupt(_)));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_garbage_entry_is_corrupt() {
        let path = temp_path("garbage_entry");
        populated().persist(&path).unwrap();

        // Corrupt the first entry payload, leaving the header intact.
        let mut data = fs::read(&path).unwrap();
        for byte in data.iter_mut().skip(HEADER_LEN + 4).take(8) {
            *byte = 0xFF;
        }
        fs::write(&path, &data).unwrap();

        let err = VectorIndex::load(&path).unwrap_err();
        assert!(matches!(err, IndexError::Corrupt(_)));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn persist_empty_index_roundtrips() {
        let path = temp_path("empty");
        VectorIndex::new().persist(&path).unwrap();

        let loaded = VectorIndex::load(&path).unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.dimensions(), None);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn persist_creates_parent_directories() {
        let dir = std::env::temp_dir().join(format!("docqa_index_nested_{}", Uuid::new_v4()));
        let path = dir.join("sub").join("deep.idx");
        populated().persist(&path).unwrap();
        assert!(path.exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
