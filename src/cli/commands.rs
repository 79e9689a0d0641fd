//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "guiderag")]
#[command(about = "Answer vendor questions about the integration guide with retrieval-augmented generation")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chunk, embed and index the documentation
    Ingest {
        /// Documentation file (default: ingest.documentation_path)
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// Clear the index and re-ingest even if vectors exist
        #[arg(short, long)]
        force: bool,
    },
    /// Interactive multi-turn chat
    Chat {
        /// Session identifier (default: random)
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Ask a single question
    Ask {
        /// The question
        question: String,
        /// Session identifier (default: random)
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Show ranked chunks for a query without calling the language model
    Search {
        /// Search query
        query: String,
        /// Number of chunks to return (default: retrieval.top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Skip deduplication and diversity re-ranking
        #[arg(long)]
        no_rerank: bool,
        /// Only chunks from this section title
        #[arg(long)]
        section: Option<String>,
        /// Only chunks for this normalized API endpoint
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Show vector index statistics
    Stats,
    /// Show current configuration
    Config,
}
