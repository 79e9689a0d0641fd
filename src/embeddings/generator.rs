//! Embedding generation service with preprocessing and batch splitting

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use tracing::info;

use super::client::EmbeddingClient;
use super::l2_normalize;
use super::preprocess_text_for_embedding;
use super::Embedder;
use super::EmbeddingConfig;
use crate::errors::GuideRagError;
use crate::errors::Result;

/// Service for generating normalized embeddings of chunks and queries
pub struct EmbeddingService {
    client: Arc<EmbeddingClient>,
    config: EmbeddingConfig,
}

impl EmbeddingService {
    /// Create a new embedding service
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        Self::from_config(EmbeddingConfig::from_app_config(config)?)
    }

    /// Create from custom config
    pub fn from_config(config: EmbeddingConfig) -> Result<Self> {
        let client = EmbeddingClient::new(
            config.provider,
            config.model.clone(),
            config.endpoint.clone(),
            config.api_key.clone(),
        )?;

        info!(
            "Embedding service ready: {:?} model={} dim={}",
            config.provider, config.model, config.dimension
        );

        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    fn finish(&self, mut embedding: Vec<f32>) -> Result<Vec<f32>> {
        if embedding.len() != self.config.dimension {
            return Err(GuideRagError::EmbeddingError(format!(
                "Embedding dimension mismatch: expected {}, got {}",
                self.config.dimension,
                embedding.len()
            )));
        }
        l2_normalize(&mut embedding);
        Ok(embedding)
    }
}

#[async_trait]
impl Embedder for EmbeddingService {
    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let Some(processed_text) = preprocess_text_for_embedding(text) else {
            return Ok(vec![0.0; self.config.dimension]);
        };

        let embedding = self.client.generate(&processed_text).await?;
        self.finish(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // Preprocess texts and track their positions
        let mut processed_texts = Vec::new();
        let mut empty_positions = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            match preprocess_text_for_embedding(text) {
                Some(processed) => processed_texts.push(processed),
                None => empty_positions.push(i),
            }
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for (batch_no, batch) in processed_texts.chunks(self.config.batch_size).enumerate() {
            debug!("Embedding batch {} ({} texts)", batch_no + 1, batch.len());
            let batch_embeddings = self
                .client
                .generate_batch(batch.iter().map(String::as_str).collect())
                .await?;
            for embedding in batch_embeddings {
                embeddings.push(self.finish(embedding)?);
            }
        }

        // Insert zero vectors for empty texts at correct positions
        let zero_vector = vec![0.0; self.config.dimension];
        for pos in empty_positions {
            embeddings.insert(pos, zero_vector.clone());
        }

        Ok(embeddings)
    }
}
