use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ask questions about a directory of PDF documents.
#[derive(Parser, Debug)]
#[command(name = "docqa", version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Directory scanned for PDF documents.
    #[arg(long, env = "DOCS_DIR", global = true)]
    pub docs_dir: Option<PathBuf>,

    /// Path of the persisted vector index.
    #[arg(long, env = "INDEX_PATH", global = true)]
    pub index_path: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract, chunk, embed and index all PDF documents, replacing any
    /// previously persisted index.
    Ingest,

    /// Answer a question from the indexed documents.
    Ask {
        /// Which hosted model answers: "claude", "mistral" or "llama".
        #[arg(long, env = "LLM_MODEL")]
        model: Option<String>,

        /// The question to answer.
        question: String,
    },
}
