//! Retrieval-augmented answering over the integration guide
//!
//! This module turns a vendor question into a grounded answer:
//! - Query preprocessing (conversational / meta detection, intent, follow-up rewriting, expansion)
//! - Hybrid retrieval combining semantic, keyword and metadata signals
//! - Re-ranking for near-duplicates and section diversity
//! - Per-session memory with one-shot summarization and a retrieval cache
//! - Prompt assembly and LLM-based answer generation
//!
//! # Examples
//!
//! ```rust,no_run
//! use guiderag::config::AppConfig;
//! use guiderag::rag::ChatRequest;
//! use guiderag::rag::RagService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = RagService::new(&config).await?;
//!
//!     let response = service
//!         .chat(ChatRequest::new("vendor-42", "How do I call the Search API?"))
//!         .await?;
//!     println!("Answer: {}", response.answer);
//!     println!("Confidence: {}", response.confidence);
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod memory;
pub mod pipeline;
pub mod prompts;
pub mod query;
pub mod reranker;
pub mod retriever;

pub use context::ContextAssembler;
pub use memory::MemoryManager;
pub use memory::SessionMemory;
pub use memory::SessionStats;
pub use pipeline::ChatMetadata;
pub use pipeline::ChatRequest;
pub use pipeline::ChatResponse;
pub use pipeline::Confidence;
pub use pipeline::RagService;
pub use query::ConversationType;
pub use query::EntityType;
pub use query::ProcessedQuery;
pub use query::QueryIntent;
pub use query::QueryPreprocessor;
pub use reranker::ReRanker;
pub use retriever::HybridSearchService;
pub use retriever::ScoreWeights;
