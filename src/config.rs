use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::GuideRagError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: default_log_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// `openai` or `ollama`
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
    #[serde(default = "default_embedding_batch_size")]
    pub batch_size: usize,
}

fn default_embedding_provider() -> String {
    "ollama".to_string()
}

fn default_embedding_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "all-minilm".to_string()
}

pub(crate) const fn default_embedding_dimension() -> usize {
    384
}

pub(crate) const fn default_embedding_batch_size() -> usize {
    32
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            endpoint: default_embedding_endpoint(),
            api_key: None,
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            batch_size: default_embedding_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// JSON snapshot of the in-memory index, shared between `ingest` and `chat`
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

fn default_snapshot_path() -> String {
    "data/index.json".to_string()
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// `openai`, `azure` or `ollama`
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model name, or deployment name for Azure
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "default_summary_temperature")]
    pub summary_temperature: f32,
    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: usize,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_provider() -> String {
    "ollama".to_string()
}

fn default_llm_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "gemma3:27b".to_string()
}

fn default_api_version() -> String {
    "2025-01-01-preview".to_string()
}

pub(crate) const fn default_llm_temperature() -> f32 {
    0.05
}

pub(crate) const fn default_llm_max_tokens() -> usize {
    1200
}

pub(crate) const fn default_summary_temperature() -> f32 {
    0.3
}

pub(crate) const fn default_summary_max_tokens() -> usize {
    300
}

pub(crate) const fn default_llm_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            endpoint: default_llm_endpoint(),
            api_key: None,
            model: default_llm_model(),
            api_version: default_api_version(),
            temperature: default_llm_temperature(),
            max_tokens: default_llm_max_tokens(),
            summary_temperature: default_summary_temperature(),
            summary_max_tokens: default_summary_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Semantic candidates scoring below this are discarded before hybrid scoring
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: f32,
    #[serde(default = "default_diversity_threshold")]
    pub diversity_threshold: usize,
    #[serde(default = "default_high_confidence")]
    pub high_confidence: f32,
    #[serde(default = "default_medium_confidence")]
    pub medium_confidence: f32,
}

pub(crate) const fn default_top_k() -> usize {
    5
}

pub(crate) const fn default_similarity_threshold() -> f32 {
    0.30
}

pub(crate) const fn default_duplicate_threshold() -> f32 {
    0.85
}

pub(crate) const fn default_diversity_threshold() -> usize {
    2
}

pub(crate) const fn default_high_confidence() -> f32 {
    0.78
}

pub(crate) const fn default_medium_confidence() -> f32 {
    0.68
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            similarity_threshold: default_similarity_threshold(),
            duplicate_threshold: default_duplicate_threshold(),
            diversity_threshold: default_diversity_threshold(),
            high_confidence: default_high_confidence(),
            medium_confidence: default_medium_confidence(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Retention window: turns kept verbatim before a summary is requested
    #[serde(default = "default_max_conversation_turns")]
    pub max_conversation_turns: usize,
    /// Turns appended after the summary once one exists
    #[serde(default = "default_recent_turns_with_summary")]
    pub recent_turns_with_summary: usize,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,
}

pub(crate) const fn default_max_conversation_turns() -> usize {
    6
}

pub(crate) const fn default_recent_turns_with_summary() -> usize {
    4
}

pub(crate) const fn default_session_ttl_hours() -> u64 {
    24
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_conversation_turns: default_max_conversation_turns(),
            recent_turns_with_summary: default_recent_turns_with_summary(),
            session_ttl_hours: default_session_ttl_hours(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_documentation_path")]
    pub documentation_path: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_min_chunk_tokens")]
    pub min_chunk_tokens: usize,
}

fn default_documentation_path() -> String {
    "documentation.txt".to_string()
}

pub(crate) const fn default_chunk_size() -> usize {
    500
}

pub(crate) const fn default_chunk_overlap() -> usize {
    100
}

pub(crate) const fn default_min_chunk_tokens() -> usize {
    10
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            documentation_path: default_documentation_path(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            min_chunk_tokens: default_min_chunk_tokens(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(GuideRagError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )))
        }
    }

    /// Reject values the retrieval and memory layers cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        let unit = |name: &str, value: f32| -> crate::Result<()> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(GuideRagError::ConfigError(format!(
                    "{name} must be within [0, 1], got {value}"
                )))
            }
        };

        if self.retrieval.top_k == 0 {
            return Err(GuideRagError::ConfigError(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        if self.retrieval.diversity_threshold == 0 {
            return Err(GuideRagError::ConfigError(
                "retrieval.diversity_threshold must be at least 1".to_string(),
            ));
        }
        unit("retrieval.similarity_threshold", self.retrieval.similarity_threshold)?;
        unit("retrieval.duplicate_threshold", self.retrieval.duplicate_threshold)?;
        unit("retrieval.high_confidence", self.retrieval.high_confidence)?;
        unit("retrieval.medium_confidence", self.retrieval.medium_confidence)?;
        if self.retrieval.medium_confidence > self.retrieval.high_confidence {
            return Err(GuideRagError::ConfigError(
                "retrieval.medium_confidence cannot exceed retrieval.high_confidence".to_string(),
            ));
        }

        if self.memory.max_conversation_turns == 0 {
            return Err(GuideRagError::ConfigError(
                "memory.max_conversation_turns must be at least 1".to_string(),
            ));
        }
        if self.embeddings.dimension == 0 {
            return Err(GuideRagError::ConfigError(
                "embeddings.dimension must be at least 1".to_string(),
            ));
        }
        if self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return Err(GuideRagError::ConfigError(
                "ingest.chunk_overlap must be smaller than ingest.chunk_size".to_string(),
            ));
        }

        Ok(())
    }

    /// Get embedding dimension
    pub fn embedding_dimension(&self) -> usize {
        self.embeddings.dimension
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Get LLM endpoint
    pub fn llm_endpoint(&self) -> &str {
        &self.llm.endpoint
    }

    /// Get LLM model
    pub fn llm_model(&self) -> &str {
        &self.llm.model
    }

    /// Deadline for a single answer or summary call
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_secs)
    }

    /// Idle age after which a session may be dropped
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.memory.session_ttl_hours * 3600)
    }
}
