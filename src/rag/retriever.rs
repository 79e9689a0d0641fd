//! Hybrid retrieval: semantic candidates rescored with keyword and metadata signals

use std::collections::BTreeSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::models::ChunkMetadata;
use crate::models::RankedChunk;
use crate::rag::query::QueryIntent;
use crate::vector_store::IndexMatch;
use crate::vector_store::MetadataFilter;
use crate::vector_store::VectorIndex;

/// Hard ceiling on candidates pulled from the index per search
const MAX_CANDIDATES: usize = 20;
const CANDIDATE_MULTIPLIER: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "and", "or", "but", "in", "with", "to", "for",
    "of", "as", "by", "from", "can", "i", "what", "how", "do", "does", "when", "where", "why",
    "should",
];

const ENDPOINT_BONUS: f32 = 0.3;
const TOPIC_BONUS: f32 = 0.2;
const INTENT_BONUS: f32 = 0.15;

/// (word in query, any of these in the section title)
const TOPIC_RULES: &[(&str, &[&str])] = &[
    ("booking", &["booking"]),
    ("flow", &["flow", "flowchart"]),
    ("authentication", &["auth"]),
    ("payment", &["payment"]),
    ("tracking", &["tracking"]),
];

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("static regex: word"));

fn intent_section_terms(intent: QueryIntent) -> &'static [&'static str] {
    match intent {
        QueryIntent::Flow => &["flow", "flowchart", "booking"],
        QueryIntent::Example => &["example"],
        QueryIntent::ApiDetails => &["api", "endpoint"],
        _ => &[],
    }
}

/// Fixed weights of the three relevance signals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub semantic: f32,
    pub keyword: f32,
    pub metadata: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            semantic: 0.5,
            keyword: 0.3,
            metadata: 0.2,
        }
    }
}

impl ScoreWeights {
    pub fn combine(&self, semantic: f32, keyword: f32, metadata: f32) -> f32 {
        semantic * self.semantic + keyword * self.keyword + metadata * self.metadata
    }
}

/// Lower-cased query words longer than two characters, minus stop words
pub fn extract_keywords(query: &str) -> BTreeSet<String> {
    let lower = query.to_lowercase();
    WORD.find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Share of keywords present as words, plus up to 0.3 per keyword for
/// repeated occurrences; capped at 1.0
pub fn keyword_match_score(text: &str, keywords: &BTreeSet<String>) -> f32 {
    if keywords.is_empty() {
        return 0.0;
    }

    let text_lower = text.to_lowercase();
    let text_words: BTreeSet<&str> = WORD.find_iter(&text_lower).map(|m| m.as_str()).collect();

    let matched = keywords
        .iter()
        .filter(|k| text_words.contains(k.as_str()))
        .count();
    let match_ratio = matched as f32 / keywords.len() as f32;

    let proximity_bonus: f32 = keywords
        .iter()
        .map(|k| text_lower.matches(k.as_str()).count())
        .filter(|&occurrences| occurrences > 0)
        .map(|occurrences| (occurrences as f32 * 0.1).min(0.3))
        .sum();

    (match_ratio + proximity_bonus).min(1.0)
}

/// Bonuses for endpoint, topic and intent alignment; capped at 1.0
pub fn metadata_relevance_score(metadata: &ChunkMetadata, query: &str, intent: QueryIntent) -> f32 {
    let query_lower = query.to_lowercase();
    let section = metadata.section_title.to_lowercase();
    let mut score = 0.0;

    let endpoint = metadata.api_endpoint.to_lowercase();
    if !endpoint.is_empty() && query_lower.contains(&endpoint) {
        score += ENDPOINT_BONUS;
    }

    for (query_term, section_terms) in TOPIC_RULES {
        if query_lower.contains(query_term) && section_terms.iter().any(|t| section.contains(t)) {
            score += TOPIC_BONUS;
        }
    }

    if intent_section_terms(intent).iter().any(|t| section.contains(t)) {
        score += INTENT_BONUS;
    }

    f32::min(score, 1.0)
}

/// Number of index candidates fetched for a final list of `top_k`
pub fn candidate_count(top_k: usize) -> usize {
    (top_k * CANDIDATE_MULTIPLIER).min(MAX_CANDIDATES)
}

pub struct HybridSearchService {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    similarity_threshold: f32,
    weights: ScoreWeights,
}

impl HybridSearchService {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>, similarity_threshold: f32) -> Self {
        Self {
            embedder,
            index,
            similarity_threshold,
            weights: ScoreWeights::default(),
        }
    }

    #[must_use]
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Ranked chunks for `query`, highest hybrid score first, at most `top_k`
    pub async fn search(
        &self,
        query: &str,
        intent: QueryIntent,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<RankedChunk>> {
        let keywords = extract_keywords(query);
        debug!("Extracted keywords: {:?}", keywords);

        let retrieve_k = candidate_count(top_k);
        let query_vector = self.embedder.embed(query).await?;
        let candidates = self.index.query(&query_vector, retrieve_k, filter).await?;

        let total = candidates.len();
        let candidates: Vec<IndexMatch> = candidates
            .into_iter()
            .filter(|c| c.score >= self.similarity_threshold)
            .collect();

        if candidates.is_empty() {
            warn!("No semantic results above threshold ({} total)", total);
            return Ok(Vec::new());
        }
        debug!(
            "Retrieved {} candidates ({} above threshold)",
            total,
            candidates.len()
        );

        let ranked = self.score_candidates(query, &keywords, intent, candidates, top_k);

        if !ranked.is_empty() {
            let avg = ranked.iter().map(|r| r.hybrid_score).sum::<f32>() / ranked.len() as f32;
            info!(
                "Hybrid search complete: {} results, avg_hybrid_score={:.3}",
                ranked.len(),
                avg
            );
        }

        Ok(ranked)
    }

    /// Score, sort descending and truncate. Ties keep the index order.
    pub fn score_candidates(
        &self,
        query: &str,
        keywords: &BTreeSet<String>,
        intent: QueryIntent,
        candidates: Vec<IndexMatch>,
        top_k: usize,
    ) -> Vec<RankedChunk> {
        let mut ranked: Vec<RankedChunk> = candidates
            .into_iter()
            .map(|candidate| {
                let semantic_score = candidate.score.clamp(0.0, 1.0);
                let keyword_score = keyword_match_score(&candidate.chunk.text, keywords);
                let metadata_score = metadata_relevance_score(&candidate.chunk.metadata, query, intent);
                let hybrid_score = self.weights.combine(semantic_score, keyword_score, metadata_score);
                RankedChunk {
                    chunk: candidate.chunk,
                    semantic_score,
                    keyword_score,
                    metadata_score,
                    hybrid_score,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.hybrid_score
                .partial_cmp(&a.hybrid_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(top_k);
        ranked
    }
}
