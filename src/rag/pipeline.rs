//! Chat turn orchestration: preprocess -> (cache | search -> rerank) -> generate -> remember

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::text::truncate_str;
use crate::config::AppConfig;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingService;
use crate::errors::GuideRagError;
use crate::errors::Result;
use crate::llm::ChatMessage;
use crate::llm::CompletionModel;
use crate::llm::CompletionRequest;
use crate::llm::LlmService;
use crate::models::ConversationTurn;
use crate::models::RankedChunk;
use crate::models::Role;
use crate::rag::context::ContextAssembler;
use crate::rag::memory::MemoryManager;
use crate::rag::prompts;
use crate::rag::query::ProcessedQuery;
use crate::rag::query::QueryIntent;
use crate::rag::query::QueryPreprocessor;
use crate::rag::reranker::ReRanker;
use crate::rag::retriever::HybridSearchService;
use crate::vector_store::InMemoryVectorIndex;
use crate::vector_store::IndexStats;
use crate::vector_store::MetadataFilter;
use crate::vector_store::VectorIndex;

pub const MAX_SESSION_ID_CHARS: usize = 100;
pub const MAX_QUERY_CHARS: usize = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub query: String,
}

impl ChatRequest {
    pub fn new(session_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            query: query.into(),
        }
    }

    /// Trimmed `(session_id, query)`
    pub fn validate(&self) -> Result<(String, String)> {
        let session_id = self.session_id.trim();
        let query = self.query.trim();

        if session_id.is_empty() {
            return Err(GuideRagError::InvalidInput(
                "Session ID cannot be empty".to_string(),
            ));
        }
        if session_id.chars().count() > MAX_SESSION_ID_CHARS {
            return Err(GuideRagError::InvalidInput(format!(
                "Session ID exceeds {MAX_SESSION_ID_CHARS} characters"
            )));
        }
        if query.is_empty() {
            return Err(GuideRagError::InvalidInput("Query cannot be empty".to_string()));
        }
        if query.chars().count() > MAX_QUERY_CHARS {
            return Err(GuideRagError::InvalidInput(format!(
                "Query exceeds {MAX_QUERY_CHARS} characters"
            )));
        }

        Ok((session_id.to_string(), query.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    None,
}

impl Confidence {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score thresholds for confidence labels
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceThresholds {
    pub minimum: f32,
    pub medium: f32,
    pub high: f32,
}

impl ConfidenceThresholds {
    pub fn label(&self, avg_score: f32, chunk_count: usize) -> Confidence {
        if chunk_count == 0 || avg_score < self.minimum {
            Confidence::None
        } else if avg_score >= self.high {
            Confidence::High
        } else if avg_score >= self.medium {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMetadata {
    pub retrieved_chunks: usize,
    pub avg_score: f32,
    pub latency_ms: f64,
    pub used_cache: bool,
    pub intent: QueryIntent,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub answer: String,
    pub sources: Vec<String>,
    pub confidence: Confidence,
    pub metadata: ChatMetadata,
}

/// Sampling parameters for the two kinds of model call
#[derive(Debug, Clone, Copy)]
struct GenerationSettings {
    temperature: f32,
    max_tokens: usize,
    summary_temperature: f32,
    summary_max_tokens: usize,
    timeout: Duration,
}

/// Composition root for a chat turn
pub struct RagService {
    preprocessor: QueryPreprocessor,
    search: HybridSearchService,
    reranker: ReRanker,
    memory: Arc<MemoryManager>,
    context_assembler: ContextAssembler,
    llm: Arc<dyn CompletionModel>,
    top_k: usize,
    confidence: ConfidenceThresholds,
    generation: GenerationSettings,
}

impl RagService {
    /// Build the HTTP-backed service, loading the index snapshot if present
    ///
    /// # Errors
    /// - Unknown embedding or LLM provider, missing API key
    /// - Unreadable or mismatched index snapshot
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let embedder: Arc<dyn Embedder> = Arc::new(EmbeddingService::new(config)?);
        let index: Arc<dyn VectorIndex> = Arc::new(
            InMemoryVectorIndex::load_or_empty(
                &config.vector_store.snapshot_path,
                config.embedding_dimension(),
            )
            .await?,
        );
        let llm: Arc<dyn CompletionModel> = Arc::new(LlmService::new(config)?);

        Ok(Self::from_services(config, embedder, index, llm))
    }

    /// Assemble from existing collaborators
    #[must_use]
    pub fn from_services(
        config: &AppConfig,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn CompletionModel>,
    ) -> Self {
        let retrieval = &config.retrieval;

        Self {
            preprocessor: QueryPreprocessor::new(),
            search: HybridSearchService::new(embedder, index, retrieval.similarity_threshold),
            reranker: ReRanker::from_config(retrieval),
            memory: Arc::new(MemoryManager::new(config.memory.clone())),
            context_assembler: ContextAssembler::default(),
            llm,
            top_k: retrieval.top_k,
            confidence: ConfidenceThresholds {
                minimum: retrieval.similarity_threshold,
                medium: retrieval.medium_confidence,
                high: retrieval.high_confidence,
            },
            generation: GenerationSettings {
                temperature: config.llm.temperature,
                max_tokens: config.llm.max_tokens,
                summary_temperature: config.llm.summary_temperature,
                summary_max_tokens: config.llm.summary_max_tokens,
                timeout: config.llm_timeout(),
            },
        }
    }

    /// Answer one vendor turn
    ///
    /// # Errors
    /// - `InvalidInput` for an empty or oversized session id or query
    /// - Embedding or vector index failures during search
    /// - `LlmError` / `Timeout` from answer generation; the user turn stays recorded
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let (session_id, query) = request.validate()?;
        let start = Instant::now();
        info!(
            "Chat request: session={}, query={}",
            session_id,
            truncate_str(&query, 100)
        );

        let mut session = self.memory.session(&session_id).await;

        let processed = self
            .preprocessor
            .preprocess(&query, session.conversation_for_query_rewrite());
        session.add_turn(Role::User, query.as_str());

        if processed.is_conversational {
            info!(
                "Conversational query detected: {:?}",
                processed.conversation_type.map(|c| c.as_str())
            );
            let reply = prompts::conversational_reply(processed.conversation_type);
            session.add_turn(Role::Assistant, reply);

            return Ok(ChatResponse {
                session_id,
                answer: reply.to_string(),
                sources: Vec::new(),
                confidence: Confidence::High,
                metadata: ChatMetadata {
                    retrieved_chunks: 0,
                    avg_score: 1.0,
                    latency_ms: elapsed_ms(start),
                    used_cache: false,
                    intent: processed.intent,
                },
            });
        }

        info!(
            "Query intent: {}, is_meta: {}, processed: {}",
            processed.intent,
            processed.is_meta_query,
            truncate_str(&processed.processed_query, 100)
        );

        let (chunks, used_cache) = if processed.is_meta_query && session.has_cached_chunks() {
            info!("Meta-query detected, reusing cached chunks from previous turn");
            (session.cached_chunks().to_vec(), true)
        } else {
            (self.retrieve(&processed, self.top_k, None, true).await?, false)
        };

        if chunks.is_empty() {
            warn!("No relevant chunks found after hybrid search and re-ranking");
            session.add_turn(Role::Assistant, prompts::NO_RELEVANT_CONTEXT_MESSAGE);
            let latency_ms = elapsed_ms(start);
            log_query_metrics(&session_id, 0, 0.0, latency_ms, Confidence::None, used_cache);

            return Ok(ChatResponse {
                session_id,
                answer: prompts::NO_RELEVANT_CONTEXT_MESSAGE.to_string(),
                sources: Vec::new(),
                confidence: Confidence::None,
                metadata: ChatMetadata {
                    retrieved_chunks: 0,
                    avg_score: 0.0,
                    latency_ms,
                    used_cache,
                    intent: processed.intent,
                },
            });
        }

        let avg_score = average_hybrid_score(&chunks);
        info!(
            "Retrieved {} chunks, avg hybrid score: {:.3}",
            chunks.len(),
            avg_score
        );

        if session.needs_summarization() {
            info!("Conversation needs summarization");
            let summary = self.summarize(session.turns_for_summarization()).await;
            match summary {
                Ok(summary) => session.set_summary(summary),
                Err(e) => warn!("Summarization failed, continuing with recent turns: {}", e),
            }
        }

        let memory_context = session.context_for_llm();
        let context = self.context_assembler.assemble(&chunks);
        let prompt = prompts::build_answer_prompt(&context, &memory_context, &query);

        debug!("Generating answer with LLM");
        let answer = self
            .complete_with_timeout(CompletionRequest::from_system_prompt(
                prompt,
                self.generation.temperature,
                self.generation.max_tokens,
            ))
            .await?;

        session.add_turn(Role::Assistant, answer.as_str());
        let sources = self.context_assembler.sources(&chunks);
        let retrieved_chunks = chunks.len();
        if !used_cache {
            session.cache_retrieved_chunks(chunks, query.as_str());
        }
        drop(session);

        let confidence = self.confidence.label(avg_score, retrieved_chunks);
        let latency_ms = elapsed_ms(start);
        log_query_metrics(
            &session_id,
            retrieved_chunks,
            avg_score,
            latency_ms,
            confidence,
            used_cache,
        );

        Ok(ChatResponse {
            session_id,
            answer,
            sources,
            confidence,
            metadata: ChatMetadata {
                retrieved_chunks,
                avg_score,
                latency_ms,
                used_cache,
                intent: processed.intent,
            },
        })
    }

    /// Preprocess and retrieve without touching any session
    ///
    /// # Errors
    /// - Embedding or vector index failures
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&MetadataFilter>,
        rerank: bool,
    ) -> Result<(ProcessedQuery, Vec<RankedChunk>)> {
        let processed = self.preprocessor.preprocess(query.trim(), &[]);
        let chunks = self.retrieve(&processed, top_k, filter, rerank).await?;
        Ok((processed, chunks))
    }

    async fn retrieve(
        &self,
        processed: &ProcessedQuery,
        top_k: usize,
        filter: Option<&MetadataFilter>,
        rerank: bool,
    ) -> Result<Vec<RankedChunk>> {
        debug!("Performing hybrid search");
        let chunks = self
            .search
            .search(&processed.processed_query, processed.intent, top_k, filter)
            .await?;

        if chunks.is_empty() || !rerank {
            return Ok(chunks);
        }
        debug!("Applying re-ranking");
        Ok(self.reranker.rerank(chunks, true, true))
    }

    async fn summarize(&self, turns: &[ConversationTurn]) -> Result<String> {
        let request = CompletionRequest {
            messages: vec![
                ChatMessage::system(prompts::SUMMARY_SYSTEM_MESSAGE),
                ChatMessage::user(prompts::build_summarization_prompt(turns)),
            ],
            temperature: self.generation.summary_temperature,
            max_tokens: self.generation.summary_max_tokens,
        };
        let summary = self.complete_with_timeout(request).await?;
        info!("Summary generated successfully");
        Ok(summary)
    }

    async fn complete_with_timeout(&self, request: CompletionRequest) -> Result<String> {
        let timeout = self.generation.timeout;
        tokio::time::timeout(timeout, self.llm.complete(request))
            .await
            .map_err(|_| {
                GuideRagError::Timeout(format!(
                    "language model did not answer within {}s",
                    timeout.as_secs()
                ))
            })?
    }

    pub fn memory(&self) -> &Arc<MemoryManager> {
        &self.memory
    }

    pub async fn index_stats(&self) -> Result<IndexStats> {
        self.search.index().stats().await
    }

    /// Drop sessions idle for longer than `max_age`
    pub fn cleanup_sessions(&self, max_age: Duration) -> usize {
        self.memory.cleanup_old_sessions(max_age)
    }
}

fn average_hybrid_score(chunks: &[RankedChunk]) -> f32 {
    if chunks.is_empty() {
        return 0.0;
    }
    chunks.iter().map(|c| c.hybrid_score).sum::<f32>() / chunks.len() as f32
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn log_query_metrics(
    session_id: &str,
    retrieved_chunks: usize,
    avg_score: f32,
    latency_ms: f64,
    confidence: Confidence,
    used_cache: bool,
) {
    info!(
        session_id,
        retrieved_chunks,
        avg_score,
        latency_ms,
        confidence = confidence.as_str(),
        used_cache,
        "Query metrics"
    );
}
