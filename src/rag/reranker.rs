//! Post-processing of ranked chunks: near-duplicate removal and section diversity

use std::collections::HashMap;
use std::collections::HashSet;

use tracing::debug;

use crate::config::RetrievalConfig;
use crate::models::RankedChunk;

/// Characters of chunk text compared when looking for duplicates
const FINGERPRINT_CHARS: usize = 300;

#[derive(Debug, Clone, Copy)]
pub struct ReRanker {
    duplicate_threshold: f32,
    diversity_threshold: usize,
}

impl Default for ReRanker {
    fn default() -> Self {
        Self::new(0.85, 2)
    }
}

impl ReRanker {
    pub fn new(duplicate_threshold: f32, diversity_threshold: usize) -> Self {
        Self {
            duplicate_threshold,
            diversity_threshold,
        }
    }

    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(config.duplicate_threshold, config.diversity_threshold)
    }

    pub fn diversity_threshold(&self) -> usize {
        self.diversity_threshold
    }

    /// Deduplication always runs before diversity enforcement
    pub fn rerank(
        &self,
        chunks: Vec<RankedChunk>,
        remove_duplicates: bool,
        ensure_diversity: bool,
    ) -> Vec<RankedChunk> {
        if chunks.is_empty() {
            return chunks;
        }
        let input = chunks.len();

        let mut result = chunks;
        if remove_duplicates {
            result = self.remove_duplicates(result);
        }
        if ensure_diversity {
            result = self.ensure_diversity(result);
        }

        debug!("Re-ranked {} chunks to {}", input, result.len());
        result
    }

    /// Drop chunks whose fingerprint mostly repeats one already accepted
    pub fn remove_duplicates(&self, chunks: Vec<RankedChunk>) -> Vec<RankedChunk> {
        let mut seen: Vec<Fingerprint> = Vec::new();
        let mut unique = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            let fingerprint = Fingerprint::of(chunk.text());
            let duplicate = seen
                .iter()
                .any(|prior| fingerprint.overlap(prior) > self.duplicate_threshold);

            if duplicate {
                debug!("Dropping near-duplicate chunk {}", chunk.id());
            } else {
                seen.push(fingerprint);
                unique.push(chunk);
            }
        }

        unique
    }

    /// At most `diversity_threshold` chunks per section. When that keeps fewer
    /// than half of the input, the first excluded chunks are appended back
    /// (up to `diversity_threshold` of them) and the cap may be exceeded.
    pub fn ensure_diversity(&self, chunks: Vec<RankedChunk>) -> Vec<RankedChunk> {
        let input = chunks.len();
        let mut per_section: HashMap<String, usize> = HashMap::new();
        let mut diverse = Vec::with_capacity(input);
        let mut excluded = Vec::new();

        for chunk in chunks {
            let count = per_section.entry(chunk.chunk.section_key().to_string()).or_insert(0);
            if *count < self.diversity_threshold {
                *count += 1;
                diverse.push(chunk);
            } else {
                excluded.push(chunk);
            }
        }

        if diverse.len() < input / 2 {
            debug!(
                "Diversity kept {} of {} chunks, backfilling up to {}",
                diverse.len(),
                input,
                self.diversity_threshold
            );
            diverse.extend(excluded.into_iter().take(self.diversity_threshold));
        }

        diverse
    }
}

/// Lower-cased word set of the leading text of a chunk
struct Fingerprint {
    words: HashSet<String>,
}

impl Fingerprint {
    fn of(text: &str) -> Self {
        let head: String = text.chars().take(FINGERPRINT_CHARS).collect();
        let words = head.to_lowercase().split_whitespace().map(str::to_string).collect();
        Self { words }
    }

    /// Share of this fingerprint's words found in `other`. An empty
    /// fingerprint overlaps nothing, so blank chunks are never duplicates.
    fn overlap(&self, other: &Self) -> f32 {
        if self.words.is_empty() || other.words.is_empty() {
            return 0.0;
        }
        let shared = self.words.intersection(&other.words).count();
        shared as f32 / self.words.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chunk;
    use crate::models::ChunkMetadata;

    fn ranked(id: &str, text: &str, section: &str, score: f32) -> RankedChunk {
        RankedChunk {
            chunk: Chunk::new(
                id,
                text,
                ChunkMetadata {
                    section_title: section.to_string(),
                    ..Default::default()
                },
            ),
            semantic_score: score,
            keyword_score: 0.0,
            metadata_score: 0.0,
            hybrid_score: score,
        }
    }

    fn ids(chunks: &[RankedChunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.id()).collect()
    }

    fn section_counts(chunks: &[RankedChunk]) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for chunk in chunks {
            *counts.entry(chunk.metadata().section_title.as_str()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_block_api_candidates_kept_in_order() {
        let chunks = vec![
            ranked("c1", "Reserve a vehicle before the traveller pays.", "Reservations", 0.45),
            ranked("c2", "Drivers report their live position.", "Driver Tracking", 0.35),
            ranked("c3", "Refund rules for late cancellations.", "Refunds", 0.25),
        ];
        let result = ReRanker::default().rerank(chunks, true, true);
        assert_eq!(ids(&result), vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(ReRanker::default().rerank(Vec::new(), true, true).is_empty());
    }

    #[test]
    fn test_near_duplicates_removed() {
        let chunks = vec![
            ranked("a", "Block API holds the cab for ten minutes", "Block", 0.9),
            ranked("b", "block api holds the cab for ten minutes.", "Block Copy", 0.8),
            ranked("c", "Cancel API releases a held cab", "Cancel", 0.7),
        ];
        let result = ReRanker::default().remove_duplicates(chunks);
        assert_eq!(ids(&result), vec!["a", "c"]);
    }

    #[test]
    fn test_dedup_idempotent() {
        let chunks = vec![
            ranked("a", "one two three four five six seven", "S1", 0.9),
            ranked("b", "one two three four five six seven eight", "S2", 0.8),
            ranked("c", "one two three four nine ten eleven", "S3", 0.7),
            ranked("d", "", "S4", 0.6),
            ranked("e", "  ", "S5", 0.5),
        ];
        let reranker = ReRanker::default();
        let once = reranker.remove_duplicates(chunks);
        let twice = reranker.remove_duplicates(once.clone());
        assert_eq!(once, twice);
        assert_eq!(ids(&once), vec!["a", "c", "d", "e"]);
    }

    #[test]
    fn test_blank_chunks_are_never_duplicates() {
        let chunks = vec![
            ranked("a", "", "S1", 0.9),
            ranked("b", "  ", "S2", 0.8),
            ranked("c", "\n\t", "S3", 0.7),
            ranked("d", "Block holds the cab", "S4", 0.6),
        ];
        let result = ReRanker::default().remove_duplicates(chunks);
        assert_eq!(ids(&result), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_diversity_cap_holds_without_backfill() {
        let chunks = vec![
            ranked("a1", "alpha one", "A", 0.9),
            ranked("a2", "alpha two", "A", 0.8),
            ranked("a3", "alpha three", "A", 0.7),
            ranked("b1", "beta one", "B", 0.6),
            ranked("b2", "beta two", "B", 0.5),
            ranked("c1", "gamma one", "C", 0.4),
        ];
        let result = ReRanker::default().ensure_diversity(chunks);
        assert_eq!(ids(&result), vec!["a1", "a2", "b1", "b2", "c1"]);
        assert!(section_counts(&result).values().all(|&n| n <= 2));
    }

    #[test]
    fn test_backfill_may_exceed_cap() {
        // Every chunk shares one section: the cap would keep 2 of 6, fewer
        // than half, so the next 2 excluded chunks are appended and the
        // section ends up with 4 entries.
        let chunks: Vec<_> = (0..6)
            .map(|i| ranked(&format!("s{i}"), &format!("text number {i}"), "Same", 1.0 - i as f32 * 0.1))
            .collect();
        let result = ReRanker::default().ensure_diversity(chunks);
        assert_eq!(ids(&result), vec!["s0", "s1", "s2", "s3"]);
        assert_eq!(section_counts(&result)["Same"], 4);
    }

    #[test]
    fn test_output_is_subset_of_input() {
        let chunks: Vec<_> = (0..12)
            .map(|i| {
                ranked(
                    &format!("id{i}"),
                    &format!("shared words {} unique{i}", if i % 3 == 0 { "x" } else { "y" }),
                    ["A", "B", "C"][i % 3],
                    1.0 - i as f32 * 0.05,
                )
            })
            .collect();
        let input_ids: HashSet<String> = chunks.iter().map(|c| c.id().to_string()).collect();

        for (dedup, diversify) in [(true, true), (true, false), (false, true), (false, false)] {
            let result = ReRanker::new(0.6, 2).rerank(chunks.clone(), dedup, diversify);
            assert!(result.len() <= chunks.len());
            assert!(result.iter().all(|c| input_ids.contains(c.id())));
        }
    }
}
