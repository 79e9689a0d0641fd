//! Splits the integration guide into retrievable chunks
//!
//! The guide is scanned line by line. Markdown headings (`#`, `##`, `###`)
//! update the active h1/h2/h3; fenced code and brace-balanced JSON blocks are
//! kept whole; a chunk is flushed once adding the next unit would exceed the
//! token budget, and the tail of the flushed chunk is carried over as overlap.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::Digest;
use sha2::Sha256;
use tracing::debug;
use tracing::info;

use crate::config::IngestConfig;
use crate::errors::Result;
use crate::models::Chunk;
use crate::models::ChunkMetadata;
use crate::models::DEFAULT_SECTION_TITLE;

/// Lines after a chunk's start that are searched for an endpoint marker
const ENDPOINT_LOOKAHEAD_LINES: usize = 10;

static HEADING_ENDPOINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*\[(/[^\]]+)\]\s*$").expect("static regex: heading endpoint"));

static CONTENT_ENDPOINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[(/[a-z_]+)\]").expect("static regex: content endpoint"));

static NON_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_]").expect("static regex: non-identifier"));

/// Rough token estimate: four characters per token, at least one per word
pub fn estimate_tokens(text: &str) -> usize {
    let by_chars = text.chars().count().div_ceil(4);
    by_chars.max(text.split_whitespace().count())
}

/// Normalize an endpoint marker such as `/partnerSearchEndpoint` to `search`
pub fn normalize_endpoint(endpoint: &str) -> String {
    let name = endpoint
        .trim()
        .trim_start_matches('/')
        .to_lowercase()
        .replace("partner", "")
        .replace("endpoint", "");
    NON_IDENT.replace_all(&name, "").into_owned()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Headings {
    h1: String,
    h2: String,
    h3: String,
    endpoint: String,
}

impl Headings {
    /// Apply a heading line, returning false for ordinary lines
    fn apply(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        let (level, rest) = if let Some(rest) = trimmed.strip_prefix("### ") {
            (3, rest)
        } else if let Some(rest) = trimmed.strip_prefix("## ") {
            (2, rest)
        } else if let Some(rest) = trimmed.strip_prefix("# ") {
            (1, rest)
        } else {
            return false;
        };

        let (title, endpoint) = match HEADING_ENDPOINT.captures(rest) {
            Some(caps) => (caps[1].trim().to_string(), normalize_endpoint(&caps[2])),
            None => (rest.trim().to_string(), String::new()),
        };

        match level {
            1 => {
                self.h1 = title;
                self.h2.clear();
                self.h3.clear();
                self.endpoint = endpoint;
            }
            2 => {
                self.h2 = title;
                self.h3.clear();
                self.endpoint = endpoint;
            }
            _ => {
                self.h3 = title;
                if !endpoint.is_empty() {
                    self.endpoint = endpoint;
                }
            }
        }
        true
    }

    fn section_title(&self) -> &str {
        [&self.h3, &self.h2, &self.h1]
            .into_iter()
            .find(|h| !h.is_empty())
            .map_or(DEFAULT_SECTION_TITLE, String::as_str)
    }
}

/// A unit that is never split: one line, or a whole code/JSON block
struct Unit {
    text: String,
    tokens: usize,
}

pub struct DocumentChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    min_chunk_tokens: usize,
}

impl DocumentChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize, min_chunk_tokens: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
            min_chunk_tokens,
        }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap, config.min_chunk_tokens)
    }

    /// Read and chunk a guide from disk; `source` is the file name
    pub async fn chunk_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Chunk>> {
        let path = path.as_ref();
        info!("Starting document chunking: {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        let source = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(self.chunk_text(&content, &source))
    }

    pub fn chunk_text(&self, content: &str, source: &str) -> Vec<Chunk> {
        let lines: Vec<&str> = content.lines().collect();
        let mut chunks = Vec::new();
        let mut current: Vec<Unit> = Vec::new();
        let mut current_tokens = 0usize;
        let mut headings = Headings::default();
        let mut chunk_headings = Headings::default();
        let mut chunk_has_content = false;

        let mut i = 0;
        while i < lines.len() {
            let (text, next) = if is_block_start(lines[i]) {
                let end = find_block_end(&lines, i);
                (lines[i..=end].join("\n"), end + 1)
            } else {
                (lines[i].to_string(), i + 1)
            };
            let tokens = estimate_tokens(&text);

            if current_tokens + tokens > self.chunk_size && chunk_has_content {
                self.flush(&current, &chunk_headings, source, &mut chunks);
                current = self.overlap_units(current);
                current_tokens = current.iter().map(|u| u.tokens).sum();
                chunk_has_content = false;
            }

            let is_heading = next == i + 1 && headings.apply(lines[i]);
            if !chunk_has_content && (is_heading || !text.trim().is_empty()) {
                // Headings at the first new line of a chunk describe it
                chunk_headings = headings.clone();
                chunk_has_content = true;
            }

            current.push(Unit { text, tokens });
            current_tokens += tokens;
            i = next;
        }

        if chunk_has_content {
            self.flush(&current, &chunk_headings, source, &mut chunks);
        }

        info!("Document chunked into {} segments", chunks.len());
        chunks
    }

    fn overlap_units(&self, units: Vec<Unit>) -> Vec<Unit> {
        let mut kept = Vec::new();
        let mut tokens = 0;
        for unit in units.into_iter().rev() {
            if tokens + unit.tokens > self.chunk_overlap {
                break;
            }
            tokens += unit.tokens;
            kept.push(unit);
        }
        kept.reverse();
        kept
    }

    fn flush(&self, units: &[Unit], headings: &Headings, source: &str, chunks: &mut Vec<Chunk>) {
        let text = units
            .iter()
            .map(|u| u.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();

        let token_count = estimate_tokens(&text);
        if text.is_empty() || token_count < self.min_chunk_tokens {
            debug!("Dropping short chunk ({} tokens)", token_count);
            return;
        }

        let api_endpoint = if headings.endpoint.is_empty() {
            text.lines()
                .take(ENDPOINT_LOOKAHEAD_LINES)
                .find_map(|line| CONTENT_ENDPOINT.captures(line))
                .map(|caps| normalize_endpoint(&caps[1]))
                .unwrap_or_default()
        } else {
            headings.endpoint.clone()
        };

        let chunk_index = chunks.len();
        let id = chunk_id(source, chunk_index, &text);
        chunks.push(Chunk::new(
            id,
            text,
            ChunkMetadata {
                section_title: headings.section_title().to_string(),
                h1: headings.h1.clone(),
                h2: headings.h2.clone(),
                h3: headings.h3.clone(),
                api_endpoint,
                source: source.to_string(),
                chunk_index,
                token_count,
            },
        ));
    }
}

/// Content-derived stable id
fn chunk_id(source: &str, index: usize, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(index.to_le_bytes());
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

fn is_block_start(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with('{')
}

/// Index of the last line of the block starting at `start`; `start` itself
/// when the block never closes
fn find_block_end(lines: &[&str], start: usize) -> usize {
    if lines[start].trim_start().starts_with("```") {
        return (start + 1..lines.len())
            .find(|&i| lines[i].trim_start().starts_with("```"))
            .unwrap_or(start);
    }

    let mut depth: i64 = 0;
    for (i, line) in lines.iter().enumerate().skip(start) {
        depth += line.matches('{').count() as i64 - line.matches('}').count() as i64;
        if depth <= 0 {
            return i;
        }
    }
    start
}
