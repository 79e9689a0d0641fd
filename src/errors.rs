use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuideRagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Vector store error: {0}")]
    VectorStoreError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Custom(String),
}

impl GuideRagError {
    /// True when the failure came from an external collaborator
    /// (embedding model, vector index, language model or the network).
    #[must_use]
    pub const fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingError(_)
                | Self::VectorStoreError(_)
                | Self::LlmError(_)
                | Self::Timeout(_)
                | Self::HttpError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GuideRagError>;
