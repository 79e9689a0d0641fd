//! Context assembly from ranked chunks

use crate::models::RankedChunk;

pub const NO_DOCUMENTATION_FOUND: &str = "No relevant documentation found.";

const SEPARATOR_WIDTH: usize = 80;
const UNKNOWN_SECTION: &str = "Unknown Section";

/// Formats ranked chunks into the documentation block of the answer prompt
pub struct ContextAssembler {
    max_context_length: usize,
}

impl ContextAssembler {
    #[must_use]
    pub const fn new(max_context_length: usize) -> Self {
        Self { max_context_length }
    }

    /// Numbered source blocks in rank order. Blocks that would push the
    /// context past `max_context_length` bytes are dropped, though the first
    /// block is always kept.
    #[must_use]
    pub fn assemble(&self, chunks: &[RankedChunk]) -> String {
        if chunks.is_empty() {
            return NO_DOCUMENTATION_FOUND.to_string();
        }

        let mut blocks: Vec<String> = Vec::with_capacity(chunks.len());
        let mut total_length = 0;

        for (idx, chunk) in chunks.iter().enumerate() {
            let entry = self.format_chunk(idx + 1, chunk);
            if !blocks.is_empty() && total_length + entry.len() > self.max_context_length {
                break;
            }
            total_length += entry.len();
            blocks.push(entry);
        }

        blocks.join("\n")
    }

    fn format_chunk(&self, position: usize, chunk: &RankedChunk) -> String {
        let metadata = chunk.metadata();
        let section = if metadata.section_title.is_empty() {
            UNKNOWN_SECTION
        } else {
            metadata.section_title.as_str()
        };

        let mut label = format!("[Source {position}: {section}");
        if !metadata.api_endpoint.is_empty() {
            label.push_str(&format!(" | Endpoint: {}", metadata.api_endpoint));
        }
        label.push(']');

        format!("{}\n{}\n{}\n", label, chunk.text(), "=".repeat(SEPARATOR_WIDTH))
    }

    /// Distinct non-empty section titles in rank order
    #[must_use]
    pub fn sources(&self, chunks: &[RankedChunk]) -> Vec<String> {
        let mut sources: Vec<String> = Vec::new();
        for chunk in chunks {
            let title = &chunk.metadata().section_title;
            if !title.is_empty() && !sources.contains(title) {
                sources.push(title.clone());
            }
        }
        sources
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(16_000)
    }
}
