//! Documentation ingestion: chunk, embed, upsert

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use serde::Serialize;
use tracing::info;
use tracing::warn;

use crate::chunking::DocumentChunker;
use crate::embeddings::Embedder;
use crate::errors::GuideRagError;
use crate::errors::Result;
use crate::vector_store::VectorIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Success,
    /// The index already held vectors and no reindex was forced
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub status: IngestStatus,
    pub chunks_created: usize,
    pub chunks_uploaded: usize,
    pub duration: Duration,
    pub message: String,
}

pub struct Ingestor {
    chunker: DocumentChunker,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl Ingestor {
    pub fn new(chunker: DocumentChunker, embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            chunker,
            embedder,
            index,
        }
    }

    /// Ingest the guide at `path`. Without `force_reindex` a non-empty index
    /// is left untouched.
    pub async fn ingest<P: AsRef<Path>>(&self, path: P, force_reindex: bool) -> Result<IngestReport> {
        let start = Instant::now();

        if force_reindex {
            info!("Force reindex requested, clearing existing vectors");
            self.index.delete_all().await?;
        } else {
            let stats = self.index.stats().await?;
            if stats.count > 0 {
                warn!(
                    "Index already contains {} vectors. Use --force to re-ingest",
                    stats.count
                );
                return Ok(IngestReport {
                    status: IngestStatus::Skipped,
                    chunks_created: 0,
                    chunks_uploaded: 0,
                    duration: start.elapsed(),
                    message: format!(
                        "Index already contains {} vectors. Use --force to re-ingest.",
                        stats.count
                    ),
                });
            }
        }

        let chunks = self.chunker.chunk_file(path.as_ref()).await?;
        if chunks.is_empty() {
            return Err(GuideRagError::InvalidInput(format!(
                "No chunks created from {}",
                path.as_ref().display()
            )));
        }
        let chunks_created = chunks.len();

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(GuideRagError::EmbeddingError(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            )));
        }

        let chunks_uploaded = self
            .index
            .upsert_batch(chunks.into_iter().zip(vectors).collect())
            .await?;

        let duration = start.elapsed();
        info!(
            chunks_created,
            chunks_uploaded,
            duration_ms = duration.as_millis() as u64,
            "Documentation ingested"
        );

        Ok(IngestReport {
            status: IngestStatus::Success,
            chunks_created,
            chunks_uploaded,
            duration,
            message: "Documentation ingested successfully".to_string(),
        })
    }
}
