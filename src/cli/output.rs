//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `guiderag` CLI

use crate::ingest::IngestReport;
use crate::ingest::IngestStatus;
use crate::models::RankedChunk;
use crate::rag::ChatResponse;
use crate::rag::ProcessedQuery;
use crate::rag::SessionStats;
use crate::vector_store::IndexStats;
use crate::AppConfig;

pub use crate::text::truncate_str;

/// Print the preprocessing outcome ahead of search results
pub fn print_search_header(processed: &ProcessedQuery) {
    println!("🔍 Query: \"{}\"", processed.original_query);
    println!("   Intent: {}", processed.intent);
    if processed.rewritten_query != processed.original_query {
        println!("   Rewritten: {}", processed.rewritten_query);
    }
    println!("   Search text: {}", processed.processed_query);
    if !processed.entities.is_empty() {
        for (kind, values) in &processed.entities {
            println!("   {:?}: {}", kind, values.join(", "));
        }
    }
    println!();
}

/// Print scored chunks, one block each
pub fn print_search_results(chunks: &[RankedChunk]) {
    println!("Found {} chunks:", chunks.len());

    for (idx, chunk) in chunks.iter().enumerate() {
        let metadata = chunk.metadata();
        println!();
        println!(
            "  {}. {} (hybrid {:.3} = semantic {:.3} | keyword {:.3} | metadata {:.3})",
            idx + 1,
            if metadata.section_title.is_empty() {
                "Unknown Section"
            } else {
                metadata.section_title.as_str()
            },
            chunk.hybrid_score,
            chunk.semantic_score,
            chunk.keyword_score,
            chunk.metadata_score
        );
        if !metadata.api_endpoint.is_empty() {
            println!("     Endpoint: {}", metadata.api_endpoint);
        }
        println!("     {}", truncate_str(&chunk.text().replace('\n', " "), 160));
    }
}

pub fn print_chat_response(response: &ChatResponse) {
    println!();
    println!("{}", response.answer);
    println!();
    if !response.sources.is_empty() {
        println!("📚 Sources: {}", response.sources.join(", "));
    }
    println!(
        "📊 Confidence: {} | chunks: {} | avg score: {:.3} | intent: {} | {:.0} ms{}",
        response.confidence,
        response.metadata.retrieved_chunks,
        response.metadata.avg_score,
        response.metadata.intent,
        response.metadata.latency_ms,
        if response.metadata.used_cache {
            " | cached context"
        } else {
            ""
        }
    );
}

pub fn print_session_stats(session_id: &str, stats: Option<&SessionStats>) {
    println!("🗂️  Session {session_id}:");
    match stats {
        Some(stats) => {
            println!("  Exists: true");
            println!("  Turns: {}", stats.total_turns);
            println!("  Summarized: {}", stats.has_summary);
            println!("  Cached chunks: {}", stats.has_cached_chunks);
            println!("  Created: {}", stats.created_at.format("%Y-%m-%d %H:%M:%S"));
            println!(
                "  Last accessed: {}",
                stats.last_accessed.format("%Y-%m-%d %H:%M:%S")
            );
        }
        None => println!("  Exists: false"),
    }
}

pub fn print_index_stats(stats: &IndexStats, snapshot_path: &str) {
    println!("📦 Vector index ({snapshot_path}):");
    println!("  Vectors: {}", stats.count);
    println!("  Dimension: {}", stats.dimension);
}

pub fn print_ingest_report(report: &IngestReport) {
    match report.status {
        IngestStatus::Success => print_success(&report.message),
        IngestStatus::Skipped => print_warning(&report.message),
    }
    println!("  Chunks created: {}", report.chunks_created);
    println!("  Chunks uploaded: {}", report.chunks_uploaded);
    println!("  Duration: {:.2}s", report.duration.as_secs_f64());
}

/// Print configuration, masking secrets
pub fn print_config(config: &AppConfig) {
    println!("📋 guiderag Configuration:");
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Log dir: {}", config.logging.log_dir);
    println!();

    println!("🧠 Embeddings:");
    println!("  Provider: {}", config.embeddings.provider);
    println!("  Endpoint: {}", config.embeddings.endpoint);
    println!("  API key: {}", mask_secret(config.embeddings.api_key.as_deref()));
    println!("  Model: {}", config.embedding_model());
    println!("  Dimension: {}", config.embedding_dimension());
    println!("  Batch size: {}", config.embeddings.batch_size);
    println!();

    println!("📦 Vector store:");
    println!("  Snapshot: {}", config.vector_store.snapshot_path);
    println!();

    println!("🤖 LLM:");
    println!("  Provider: {}", config.llm.provider);
    println!("  Endpoint: {}", config.llm_endpoint());
    println!("  API key: {}", mask_secret(config.llm.api_key.as_deref()));
    println!("  Model: {}", config.llm_model());
    println!(
        "  Answer: temperature {} / max tokens {}",
        config.llm.temperature, config.llm.max_tokens
    );
    println!(
        "  Summary: temperature {} / max tokens {}",
        config.llm.summary_temperature, config.llm.summary_max_tokens
    );
    println!("  Timeout: {}s", config.llm.timeout_secs);
    println!();

    println!("🔎 Retrieval:");
    println!("  Top k: {}", config.retrieval.top_k);
    println!("  Similarity threshold: {}", config.retrieval.similarity_threshold);
    println!("  Duplicate threshold: {}", config.retrieval.duplicate_threshold);
    println!("  Chunks per section: {}", config.retrieval.diversity_threshold);
    println!(
        "  Confidence: high >= {}, medium >= {}",
        config.retrieval.high_confidence, config.retrieval.medium_confidence
    );
    println!();

    println!("💬 Memory:");
    println!("  Window: {} turns", config.memory.max_conversation_turns);
    println!(
        "  Recent turns with summary: {}",
        config.memory.recent_turns_with_summary
    );
    println!("  Session TTL: {}h", config.memory.session_ttl_hours);
    println!();

    println!("📄 Ingest:");
    println!("  Documentation: {}", config.ingest.documentation_path);
    println!(
        "  Chunk size: {} tokens, overlap {}, minimum {}",
        config.ingest.chunk_size, config.ingest.chunk_overlap, config.ingest.min_chunk_tokens
    );
}

fn mask_secret(secret: Option<&str>) -> String {
    match secret {
        Some(s) if s.chars().count() > 8 => {
            let head: String = s.chars().take(4).collect();
            format!("{head}****")
        }
        Some(_) => "****".to_string(),
        None => "(not set)".to_string(),
    }
}

pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {msg}");
}

pub fn print_prompt(msg: &str) {
    use std::io::Write;

    print!("{msg}");
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(None), "(not set)");
        assert_eq!(mask_secret(Some("abc")), "****");
        assert_eq!(mask_secret(Some("sk-1234567890")), "sk-1****");
    }
}
