//! Per-session conversation memory with one-shot summarization and a
//! retrieval cache for follow-up questions

use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;
use tracing::info;

use crate::config::MemoryConfig;
use crate::models::ConversationTurn;
use crate::models::RankedChunk;
use crate::models::Role;

pub const NO_PREVIOUS_CONVERSATION: &str = "No previous conversation.";

/// Most recent turns kept out of the summary input
const UNSUMMARIZED_TAIL: usize = 3;
/// Turns handed to the follow-up rewriter
const QUERY_REWRITE_TURNS: usize = 5;

/// Chunks from the last fresh search and the query that produced them
#[derive(Debug, Clone)]
struct RetrievalCache {
    chunks: Vec<RankedChunk>,
    query: String,
}

#[derive(Debug, Clone)]
pub struct SessionMemory {
    session_id: String,
    turns: Vec<ConversationTurn>,
    summary: Option<String>,
    cache: Option<RetrievalCache>,
    created_at: DateTime<Utc>,
    last_accessed: DateTime<Utc>,
    max_turns: usize,
    recent_with_summary: usize,
}

impl SessionMemory {
    pub fn new(session_id: impl Into<String>, config: &MemoryConfig) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            turns: Vec::new(),
            summary: None,
            cache: None,
            created_at: now,
            last_accessed: now,
            max_turns: config.max_conversation_turns,
            recent_with_summary: config.recent_turns_with_summary,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn touch(&mut self) {
        self.last_accessed = Utc::now();
    }

    pub fn add_turn(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(ConversationTurn::new(role, content));
        self.touch();
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// True once the window is exceeded, until a summary has been set
    pub fn needs_summarization(&self) -> bool {
        self.turns.len() > self.max_turns && self.summary.is_none()
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = Some(summary.into());
        self.touch();
        info!("Summary set for session {}", self.session_id);
    }

    /// Everything except the last few turns
    pub fn turns_for_summarization(&self) -> &[ConversationTurn] {
        let end = self.turns.len().saturating_sub(UNSUMMARIZED_TAIL);
        &self.turns[..end]
    }

    pub fn conversation_for_query_rewrite(&self) -> &[ConversationTurn] {
        tail(&self.turns, QUERY_REWRITE_TURNS)
    }

    /// Conversation history rendered for the answer prompt
    pub fn context_for_llm(&self) -> String {
        if self.turns.is_empty() {
            return NO_PREVIOUS_CONVERSATION.to_string();
        }

        if self.turns.len() <= self.max_turns {
            return transcript(&self.turns);
        }

        match &self.summary {
            Some(summary) => format!(
                "Previous conversation summary:\n{}\n\nRecent conversation:\n{}",
                summary,
                transcript(tail(&self.turns, self.recent_with_summary))
            ),
            None => transcript(tail(&self.turns, self.max_turns)),
        }
    }

    /// Replace the cached result of the last fresh search
    pub fn cache_retrieved_chunks(&mut self, chunks: Vec<RankedChunk>, query: impl Into<String>) {
        let query = query.into();
        debug!(
            "Caching {} chunks for session {} (query: {})",
            chunks.len(),
            self.session_id,
            query
        );
        self.cache = Some(RetrievalCache { chunks, query });
        self.touch();
    }

    /// Cached chunks; empty before the first cache write
    pub fn cached_chunks(&self) -> &[RankedChunk] {
        self.cache
            .as_ref()
            .map(|c| c.chunks.as_slice())
            .unwrap_or_default()
    }

    pub fn has_cached_chunks(&self) -> bool {
        self.cache.as_ref().is_some_and(|c| !c.chunks.is_empty())
    }

    pub fn last_query(&self) -> Option<&str> {
        self.cache.as_ref().map(|c| c.query.as_str())
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            session_id: self.session_id.clone(),
            total_turns: self.turns.len(),
            has_summary: self.summary.is_some(),
            has_cached_chunks: self.has_cached_chunks(),
            created_at: self.created_at,
            last_accessed: self.last_accessed,
        }
    }

    fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.last_accessed)
            .to_std()
            .unwrap_or_default()
    }
}

fn tail(turns: &[ConversationTurn], n: usize) -> &[ConversationTurn] {
    &turns[turns.len().saturating_sub(n)..]
}

fn transcript(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(ConversationTurn::to_transcript_line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub session_id: String,
    pub total_turns: usize,
    pub has_summary: bool,
    pub has_cached_chunks: bool,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

/// Exclusive access to one session for the duration of a turn
pub type SessionGuard = OwnedMutexGuard<SessionMemory>;

/// Process-wide session map. Each session sits behind its own lock so turns
/// of one session run one at a time while other sessions proceed.
pub struct MemoryManager {
    sessions: DashMap<String, Arc<Mutex<SessionMemory>>>,
    config: MemoryConfig,
}

impl MemoryManager {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Lock the session, creating it on first use
    pub async fn session(&self, session_id: &str) -> SessionGuard {
        let handle = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!("Creating session {}", session_id);
                Arc::new(Mutex::new(SessionMemory::new(session_id, &self.config)))
            })
            .value()
            .clone();

        let mut guard = handle.lock_owned().await;
        guard.touch();
        guard
    }

    pub async fn add_turn(&self, session_id: &str, role: Role, content: impl Into<String>) {
        self.session(session_id).await.add_turn(role, content);
    }

    pub async fn get_context(&self, session_id: &str) -> String {
        self.session(session_id).await.context_for_llm()
    }

    pub async fn needs_summarization(&self, session_id: &str) -> bool {
        self.session(session_id).await.needs_summarization()
    }

    pub async fn set_summary(&self, session_id: &str, summary: impl Into<String>) {
        self.session(session_id).await.set_summary(summary);
    }

    pub async fn cache_retrieved_chunks(
        &self,
        session_id: &str,
        chunks: Vec<RankedChunk>,
        query: impl Into<String>,
    ) {
        self.session(session_id)
            .await
            .cache_retrieved_chunks(chunks, query);
    }

    pub async fn get_cached_chunks(&self, session_id: &str) -> Vec<RankedChunk> {
        self.session(session_id).await.cached_chunks().to_vec()
    }

    pub async fn has_cached_chunks(&self, session_id: &str) -> bool {
        self.session(session_id).await.has_cached_chunks()
    }

    pub async fn conversation_for_query_rewrite(&self, session_id: &str) -> Vec<ConversationTurn> {
        self.session(session_id)
            .await
            .conversation_for_query_rewrite()
            .to_vec()
    }

    /// Stats for an existing session; does not create one
    pub async fn session_stats(&self, session_id: &str) -> Option<SessionStats> {
        let handle = self.sessions.get(session_id)?.value().clone();
        let stats = handle.lock().await.stats();
        Some(stats)
    }

    pub fn clear_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            info!("Cleared session {}", session_id);
        }
        removed
    }

    pub fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop sessions idle longer than `max_age`. Sessions in the middle of a
    /// turn are kept.
    pub fn cleanup_old_sessions(&self, max_age: Duration) -> usize {
        let now = Utc::now();
        let mut removed = 0;

        self.sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) if session.idle_for(now) > max_age => {
                removed += 1;
                false
            }
            _ => true,
        });

        if removed > 0 {
            info!("Cleaned up {} expired sessions", removed);
        }
        removed
    }
}
