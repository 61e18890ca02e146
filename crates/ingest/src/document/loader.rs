use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

use super::{extract_pdf, ExtractedDocument, ExtractionError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to extract {path}: {source}")]
    Extract {
        path: PathBuf,
        source: ExtractionError,
    },
}

/// A document read from disk together with its extracted text.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub document: ExtractedDocument,
}

impl LoadedDocument {
    pub fn page_count(&self) -> usize {
        self.document.pages.len()
    }
}

/// List all `.pdf` files under `dir`, sorted by path for a deterministic
/// ingestion order. A missing or empty directory yields an empty list.
pub fn pdf_files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// Read and extract every PDF under `dir`. Fails fast on the first
/// unreadable or unparseable file, naming it. Documents with no
/// extractable text (scanned/image PDFs) are skipped with a warning.
pub fn load_documents(dir: &Path) -> Result<Vec<LoadedDocument>, LoadError> {
    let files = pdf_files_in(dir);
    let mut documents = Vec::with_capacity(files.len());

    for path in files {
        let bytes = std::fs::read(&path).map_err(|source| LoadError::Read {
            path: path.clone(),
            source,
        })?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let pages = extract_pdf(&bytes).map_err(|source| LoadError::Extract {
            path: path.clone(),
            source,
        })?;

        if pages.is_empty() {
            warn!(path = %path.display(), "no extractable text, skipping");
            continue;
        }

        info!(path = %path.display(), pages = pages.len(), "extracted document");
        documents.push(LoadedDocument {
            path,
            document: ExtractedDocument { filename, pages },
        });
    }

    Ok(documents)
}
