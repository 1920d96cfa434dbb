//! # askdocs CLI
//!
//! ```bash
//! askdocs ingest report.pdf notes/        # index files or directories
//! askdocs ask "What is the Q3 budget?"    # answer from indexed documents
//! askdocs sources                         # list indexed source filenames
//! ```
//!
//! All commands accept `--config` pointing to a TOML file; a missing file
//! falls back to built-in defaults. Embedding and LLM calls require
//! `OPENAI_API_KEY` in the environment.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use askdocs::answer::{answer, render_answer};
use askdocs::config::load_config;
use askdocs::embedding::{DisabledEmbedder, OpenAiEmbedder};
use askdocs::ingest::ingest;
use askdocs::llm::OpenAiChat;
use askdocs::models::IngestResult;
use askdocs::store::sqlite::SqliteStore;
use askdocs::store::VectorStore;

/// askdocs — ingest documents into a local vector store and answer
/// questions grounded in them.
#[derive(Parser)]
#[command(name = "askdocs", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Missing file uses defaults.
    #[arg(long, global = true, default_value = "./config/askdocs.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest files (or directories, walked recursively) into the store.
    ///
    /// A batch containing any already-indexed filename is rejected whole:
    /// nothing is written and the conflicting names are listed. Rename
    /// and resubmit the full batch to resolve.
    Ingest {
        /// Files or directories to ingest.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Ask a question answered strictly from the indexed documents.
    Ask {
        /// The question to answer.
        question: String,
    },

    /// List the source filenames currently indexed.
    Sources,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Ingest { paths } => {
            let embedder = Arc::new(OpenAiEmbedder::new(&config.embedding)?);
            let store = SqliteStore::open_or_create(&config.store.path, embedder).await?;
            let result = ingest(&store, &config.chunking, &paths).await?;
            match result {
                IngestResult::Success { chunks_written } => {
                    println!("{chunks_written} chunks stored");
                }
                IngestResult::DuplicateRejected { duplicate_sources } => {
                    let names: Vec<&str> =
                        duplicate_sources.iter().map(|s| s.as_str()).collect();
                    println!("duplicate filenames: [{}]", names.join(", "));
                    println!("nothing was written; rename the files and resubmit the batch");
                }
            }
            store.close().await;
        }

        Commands::Ask { question } => {
            let embedder = Arc::new(OpenAiEmbedder::new(&config.embedding)?);
            let store = SqliteStore::open_or_create(&config.store.path, embedder).await?;
            let llm = OpenAiChat::new(&config.llm)?;
            let result = answer(&store, &llm, &config.retrieval, &question).await?;
            println!("{}", render_answer(&result));
            store.close().await;
        }

        Commands::Sources => {
            // Listing sources never embeds, so no credentials are needed.
            let store =
                SqliteStore::open_or_create(&config.store.path, Arc::new(DisabledEmbedder))
                    .await?;
            let sources = store.list_sources().await?;
            if sources.is_empty() {
                println!("no documents indexed");
            } else {
                for source in sources {
                    println!("{source}");
                }
            }
            store.close().await;
        }
    }

    Ok(())
}
