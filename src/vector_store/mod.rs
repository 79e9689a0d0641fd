//! Vector index abstraction
//!
//! The retrieval core only needs `upsert`, a top-k similarity `query`,
//! `delete_all` and `stats`; [`VectorIndex`] captures exactly that so a
//! hosted index or the bundled [`InMemoryVectorIndex`] can be plugged in.

pub mod memory;

use async_trait::async_trait;
pub use memory::InMemoryVectorIndex;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::Result;
use crate::models::Chunk;
use crate::models::ChunkMetadata;

/// Exact-match constraints applied before similarity ranking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFilter {
    pub section_title: Option<String>,
    pub api_endpoint: Option<String>,
    pub source: Option<String>,
}

impl MetadataFilter {
    pub fn is_empty(&self) -> bool {
        self.section_title.is_none() && self.api_endpoint.is_none() && self.source.is_none()
    }

    pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
        let eq = |want: &Option<String>, have: &str| want.as_deref().map_or(true, |w| w == have);
        eq(&self.section_title, &metadata.section_title)
            && eq(&self.api_endpoint, &metadata.api_endpoint)
            && eq(&self.source, &metadata.source)
    }
}

/// One similarity hit
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMatch {
    pub chunk: Chunk,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub count: usize,
    pub dimension: usize,
}

/// Vector index collaborator
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace the vector stored under `chunk.id`
    async fn upsert(&self, chunk: Chunk, vector: Vec<f32>) -> Result<()>;

    /// Upsert many records, returning how many were written
    async fn upsert_batch(&self, records: Vec<(Chunk, Vec<f32>)>) -> Result<usize> {
        let count = records.len();
        for (chunk, vector) in records {
            self.upsert(chunk, vector).await?;
        }
        Ok(count)
    }

    /// Top-k matches sorted by descending score
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<IndexMatch>>;

    async fn delete_all(&self) -> Result<()>;

    async fn stats(&self) -> Result<IndexStats>;
}
