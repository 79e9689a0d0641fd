//! Brute-force in-memory [`VectorIndex`] with JSON snapshots
//!
//! Vectors live in a `HashMap` behind a tokio `RwLock`; queries score every
//! stored vector by cosine similarity. A snapshot file lets `ingest` and
//! `chat` run as separate processes.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;
use tracing::info;

use super::IndexMatch;
use super::IndexStats;
use super::MetadataFilter;
use super::VectorIndex;
use crate::errors::GuideRagError;
use crate::errors::Result;
use crate::models::Chunk;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredVector {
    chunk: Chunk,
    vector: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    dimension: usize,
    records: Vec<StoredVector>,
}

#[derive(Debug)]
pub struct InMemoryVectorIndex {
    dimension: usize,
    records: RwLock<HashMap<String, StoredVector>>,
}

impl InMemoryVectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            records: RwLock::new(HashMap::new()),
        }
    }

    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Load a snapshot written by [`save`](Self::save)
    pub async fn load<P: AsRef<Path>>(path: P, dimension: usize) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;

        if snapshot.dimension != dimension {
            return Err(GuideRagError::VectorStoreError(format!(
                "Snapshot {} has dimension {}, expected {}",
                path.display(),
                snapshot.dimension,
                dimension
            )));
        }

        let records = snapshot
            .records
            .into_iter()
            .map(|r| (r.chunk.id.clone(), r))
            .collect::<HashMap<_, _>>();
        info!("Loaded {} vectors from {}", records.len(), path.display());

        Ok(Self {
            dimension,
            records: RwLock::new(records),
        })
    }

    /// Load the snapshot if it exists, otherwise start empty
    pub async fn load_or_empty<P: AsRef<Path>>(path: P, dimension: usize) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path, dimension).await
        } else {
            debug!("No snapshot at {}, starting empty", path.as_ref().display());
            Ok(Self::new(dimension))
        }
    }

    /// Write every record to `path` as JSON, sorted by id
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut records: Vec<StoredVector> = self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.chunk.id.cmp(&b.chunk.id));

        let snapshot = Snapshot {
            dimension: self.dimension,
            records,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path, serde_json::to_vec(&snapshot)?).await?;
        info!(
            "Saved {} vectors to {}",
            snapshot.records.len(),
            path.display()
        );
        Ok(())
    }

    fn check_dimension(&self, len: usize) -> Result<()> {
        if len == self.dimension {
            Ok(())
        } else {
            Err(GuideRagError::VectorStoreError(format!(
                "Vector dimension mismatch: expected {}, got {len}",
                self.dimension
            )))
        }
    }
}

pub(crate) fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, chunk: Chunk, vector: Vec<f32>) -> Result<()> {
        self.check_dimension(vector.len())?;
        self.records
            .write()
            .await
            .insert(chunk.id.clone(), StoredVector { chunk, vector });
        Ok(())
    }

    async fn upsert_batch(&self, records: Vec<(Chunk, Vec<f32>)>) -> Result<usize> {
        for (_, vector) in &records {
            self.check_dimension(vector.len())?;
        }
        let count = records.len();
        let mut stored = self.records.write().await;
        for (chunk, vector) in records {
            stored.insert(chunk.id.clone(), StoredVector { chunk, vector });
        }
        Ok(count)
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<IndexMatch>> {
        self.check_dimension(vector.len())?;

        let records = self.records.read().await;
        let mut matches: Vec<IndexMatch> = records
            .values()
            .filter(|r| filter.map_or(true, |f| f.matches(&r.chunk.metadata)))
            .map(|r| IndexMatch {
                chunk: r.chunk.clone(),
                score: cosine_sim(vector, &r.vector),
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn delete_all(&self) -> Result<()> {
        self.records.write().await.clear();
        Ok(())
    }

    async fn stats(&self) -> Result<IndexStats> {
        Ok(IndexStats {
            count: self.records.read().await.len(),
            dimension: self.dimension,
        })
    }
}
