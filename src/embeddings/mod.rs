//! Embeddings generation module
//!
//! Provides the [`Embedder`] seam the retrieval core depends on, and an HTTP
//! backed implementation for two providers:
//! - OpenAI-compatible `/embeddings` (text-embedding-3-small, etc.)
//! - Ollama (local models such as all-minilm)
//!
//! # Examples
//!
//! ```rust,no_run
//! use guiderag::config::AppConfig;
//! use guiderag::embeddings::Embedder;
//! use guiderag::embeddings::EmbeddingService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = EmbeddingService::new(&config)?;
//!
//!     let embedding = service.embed("How do I block a booking?").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod generator;
pub mod text_preprocessing;

use async_trait::async_trait;
pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;
pub use generator::EmbeddingService;
pub use text_preprocessing::preprocess_text_for_embedding;

use crate::errors::Result;

/// Embedding collaborator: text in, fixed-dimension L2-normalized vector out
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Dimensionality of every vector this embedder returns
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts, preserving input order. Empty inputs map to a zero
    /// vector instead of failing.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub batch_size: usize,
}

impl EmbeddingConfig {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Result<Self> {
        let embeddings = &config.embeddings;
        Ok(Self {
            provider: embeddings.provider.parse()?,
            model: embeddings.model.clone(),
            dimension: embeddings.dimension,
            endpoint: embeddings.endpoint.clone(),
            api_key: embeddings.api_key.clone(),
            batch_size: embeddings.batch_size.max(1),
        })
    }
}

/// Scale `vector` to unit length in place; zero vectors are left untouched
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}
