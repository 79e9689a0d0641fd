use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Section label used when a chunk sits under no heading at all
pub const DEFAULT_SECTION_TITLE: &str = "General Documentation";

/// Hierarchical metadata attached to every chunk at ingestion time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub section_title: String,
    #[serde(default)]
    pub h1: String,
    #[serde(default)]
    pub h2: String,
    #[serde(default)]
    pub h3: String,
    /// Normalized endpoint name, empty when the section documents no endpoint
    #[serde(default)]
    pub api_endpoint: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub chunk_index: usize,
    #[serde(default)]
    pub token_count: usize,
}

/// Immutable unit of retrievable content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata,
        }
    }

    /// Section title, or `"unknown"` when the chunk carries none
    pub fn section_key(&self) -> &str {
        if self.metadata.section_title.is_empty() {
            "unknown"
        } else {
            &self.metadata.section_title
        }
    }
}

/// A chunk scored for one search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedChunk {
    pub chunk: Chunk,
    pub semantic_score: f32,
    pub keyword_score: f32,
    pub metadata_score: f32,
    pub hybrid_score: f32,
}

impl RankedChunk {
    pub fn id(&self) -> &str {
        &self.chunk.id
    }

    pub fn text(&self) -> &str {
        &self.chunk.text
    }

    pub fn metadata(&self) -> &ChunkMetadata {
        &self.chunk.metadata
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Speaker label used when a conversation is rendered for the model
    pub const fn speaker(&self) -> &'static str {
        match self {
            Role::User => "Vendor",
            Role::Assistant => "Assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// `"Vendor: ..."` / `"Assistant: ..."`
    pub fn to_transcript_line(&self) -> String {
        format!("{}: {}", self.role.speaker(), self.content)
    }
}
