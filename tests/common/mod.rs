//! Deterministic collaborators shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use guiderag::embeddings::Embedder;
use guiderag::llm::CompletionModel;
use guiderag::llm::CompletionRequest;
use guiderag::models::Chunk;
use guiderag::models::ChunkMetadata;
use guiderag::vector_store::IndexMatch;
use guiderag::vector_store::IndexStats;
use guiderag::vector_store::MetadataFilter;
use guiderag::vector_store::VectorIndex;
use guiderag::GuideRagError;
use guiderag::Result;

pub const SUMMARY: &str = "Vendor asked about the Block and Search APIs.";

/// Same vector for every text
pub struct ConstantEmbedder;

#[async_trait]
impl Embedder for ConstantEmbedder {
    fn dimension(&self) -> usize {
        1
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(vec![vec![1.0]; texts.len()])
    }
}

/// Bag-of-words vectors: each lower-cased word bumps one hashed bucket
pub struct HashEmbedder {
    pub dimension: usize,
}

impl HashEmbedder {
    fn vector(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension];
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = word
                .bytes()
                .fold(0usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize))
                % self.dimension;
            vector[bucket] += 1.0;
        }
        guiderag::embeddings::l2_normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }
}

/// Returns a fixed candidate list and counts queries
pub struct FixedIndex {
    matches: Vec<IndexMatch>,
    pub queries: AtomicUsize,
}

impl FixedIndex {
    pub fn new(matches: Vec<IndexMatch>) -> Self {
        Self {
            matches,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorIndex for FixedIndex {
    async fn upsert(&self, _chunk: Chunk, _vector: Vec<f32>) -> Result<()> {
        Ok(())
    }

    async fn query(
        &self,
        _vector: &[f32],
        top_k: usize,
        _filter: Option<&MetadataFilter>,
    ) -> Result<Vec<IndexMatch>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.matches.iter().take(top_k).cloned().collect())
    }

    async fn delete_all(&self) -> Result<()> {
        Ok(())
    }

    async fn stats(&self) -> Result<IndexStats> {
        Ok(IndexStats {
            count: self.matches.len(),
            dimension: 1,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBehavior {
    Answer,
    FailSummaries,
    FailAll,
    Slow(Duration),
}

/// Records every request; summary requests are the two-message ones
pub struct ScriptedLlm {
    behavior: LlmBehavior,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    pub fn new(behavior: LlmBehavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn answer_prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.messages.len() == 1)
            .map(|r| r.messages[0].content.clone())
            .collect()
    }

    pub fn summary_requests(&self) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.messages.len() == 2)
            .count()
    }
}

#[async_trait]
impl CompletionModel for ScriptedLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let is_summary = request.messages.len() == 2;
        let answer_number = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.iter().filter(|r| r.messages.len() == 1).count()
        };

        match self.behavior {
            LlmBehavior::FailAll => Err(GuideRagError::LlmError("model unavailable".to_string())),
            LlmBehavior::FailSummaries if is_summary => {
                Err(GuideRagError::LlmError("summary failed".to_string()))
            }
            LlmBehavior::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok("late answer".to_string())
            }
            _ if is_summary => Ok(SUMMARY.to_string()),
            _ => Ok(format!("answer {answer_number}")),
        }
    }
}

pub fn candidate(id: &str, text: &str, section: &str, score: f32) -> IndexMatch {
    IndexMatch {
        chunk: Chunk::new(
            id,
            text,
            ChunkMetadata {
                section_title: section.to_string(),
                ..Default::default()
            },
        ),
        score,
    }
}

/// Three candidates sharing no words with "What is the Block API?" or its expansion
pub fn block_api_candidates() -> Vec<IndexMatch> {
    vec![
        candidate(
            "c1",
            "Vehicles are set aside for the traveller until payment.",
            "Vehicle Allocation",
            0.9,
        ),
        candidate(
            "c2",
            "Drivers report their live position every minute.",
            "Driver Tracking",
            0.7,
        ),
        candidate("c3", "Refund rules for late cancellations.", "Refunds", 0.5),
    ]
}
