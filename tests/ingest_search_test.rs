mod common;

use std::path::PathBuf;
use std::sync::Arc;

use common::*;
use guiderag::chunking::DocumentChunker;
use guiderag::ingest::IngestStatus;
use guiderag::ingest::Ingestor;
use guiderag::rag::ChatRequest;
use guiderag::rag::RagService;
use guiderag::vector_store::InMemoryVectorIndex;
use guiderag::vector_store::MetadataFilter;
use guiderag::vector_store::VectorIndex;
use guiderag::AppConfig;
use guiderag::GuideRagError;
use guiderag::Result;

const DIMENSION: usize = 256;

const GUIDE: &str = "\
## Search API [/partnersearchendpoint]
Search returns available cabs with fares for a route and date.
## Block API [/partnerblockendpoint]
Block holds the selected cab for the traveller until payment.
## Cancel API [/partnercancelendpoint]
Cancel releases a held cab and refunds the traveller in full.
";

fn write_guide(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("documentation.txt");
    std::fs::write(&path, GUIDE).unwrap();
    path
}

fn ingestor(index: Arc<InMemoryVectorIndex>) -> Ingestor {
    // Small budget so every API section becomes its own chunk
    Ingestor::new(
        DocumentChunker::new(30, 0, 3),
        Arc::new(HashEmbedder { dimension: DIMENSION }),
        index,
    )
}

async fn ingested_index(dir: &tempfile::TempDir) -> Result<Arc<InMemoryVectorIndex>> {
    let index = Arc::new(InMemoryVectorIndex::new(DIMENSION));
    let report = ingestor(index.clone()).ingest(write_guide(dir), false).await?;
    assert_eq!(report.status, IngestStatus::Success);
    Ok(index)
}

fn service(index: Arc<InMemoryVectorIndex>, llm: Arc<ScriptedLlm>) -> RagService {
    RagService::from_services(
        &AppConfig::default(),
        Arc::new(HashEmbedder { dimension: DIMENSION }),
        index,
        llm,
    )
}

#[tokio::test]
async fn test_ingest_creates_one_chunk_per_section() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let index = Arc::new(InMemoryVectorIndex::new(DIMENSION));

    let report = ingestor(index.clone()).ingest(write_guide(&dir), false).await?;

    assert_eq!(report.status, IngestStatus::Success);
    assert_eq!(report.chunks_created, 3);
    assert_eq!(report.chunks_uploaded, 3);
    assert_eq!(index.stats().await?.count, 3);
    Ok(())
}

#[tokio::test]
async fn test_second_ingest_skips_unless_forced() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let index = ingested_index(&dir).await?;
    let path = dir.path().join("documentation.txt");

    let skipped = ingestor(index.clone()).ingest(&path, false).await?;
    assert_eq!(skipped.status, IngestStatus::Skipped);
    assert_eq!(skipped.chunks_created, 0);

    let forced = ingestor(index.clone()).ingest(&path, true).await?;
    assert_eq!(forced.status, IngestStatus::Success);
    assert_eq!(index.stats().await?.count, 3);
    Ok(())
}

#[tokio::test]
async fn test_ingest_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let index = Arc::new(InMemoryVectorIndex::new(DIMENSION));

    let err = ingestor(index)
        .ingest(dir.path().join("missing.txt"), false)
        .await
        .unwrap_err();
    assert!(matches!(err, GuideRagError::Io(_)));
}

#[tokio::test]
async fn test_block_question_finds_block_section() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let index = ingested_index(&dir).await?;
    let service = service(index, Arc::new(ScriptedLlm::new(LlmBehavior::Answer)));

    let (_, chunks) = service.search("What is the Block API?", 5, None, true).await?;

    assert!(!chunks.is_empty());
    let top = &chunks[0];
    assert_eq!(top.metadata().section_title, "Block API");
    assert_eq!(top.metadata().api_endpoint, "block");
    assert!(top.text().contains("Block holds the selected cab"));
    assert!(top.metadata_score > 0.0);
    for pair in chunks.windows(2) {
        assert!(pair[0].hybrid_score >= pair[1].hybrid_score);
    }
    Ok(())
}

#[tokio::test]
async fn test_search_respects_metadata_filter() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let index = ingested_index(&dir).await?;
    let service = service(index, Arc::new(ScriptedLlm::new(LlmBehavior::Answer)));

    let filter = MetadataFilter {
        section_title: None,
        api_endpoint: Some("cancel".to_string()),
        source: None,
    };
    let (_, chunks) = service
        .search("How do I cancel and refund the traveller?", 5, Some(&filter), false)
        .await?;

    assert!(chunks
        .iter()
        .all(|c| c.metadata().api_endpoint == "cancel"));
    Ok(())
}

#[tokio::test]
async fn test_chat_over_ingested_guide() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let index = ingested_index(&dir).await?;
    let llm = Arc::new(ScriptedLlm::new(LlmBehavior::Answer));
    let service = service(index, llm.clone());

    let response = service
        .chat(ChatRequest::new("vendor-1", "What is the Block API?"))
        .await?;

    assert_eq!(response.answer, "answer 1");
    assert_eq!(response.sources.first().map(String::as_str), Some("Block API"));
    let prompt = &llm.answer_prompts()[0];
    assert!(prompt.contains("[Source 1: Block API | Endpoint: block]"));
    Ok(())
}

#[tokio::test]
async fn test_snapshot_round_trip() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let index = ingested_index(&dir).await?;
    let snapshot = dir.path().join("index").join("snapshot.json");

    index.save(&snapshot).await?;
    let restored = InMemoryVectorIndex::load(&snapshot, DIMENSION).await?;
    assert_eq!(restored.stats().await?.count, 3);

    let embedder = HashEmbedder { dimension: DIMENSION };
    let query = guiderag::embeddings::Embedder::embed(&embedder, "Block holds the selected cab").await?;
    let original = index.query(&query, 3, None).await?;
    let reloaded = restored.query(&query, 3, None).await?;
    let ids = |matches: &[guiderag::vector_store::IndexMatch]| {
        matches.iter().map(|m| m.chunk.id.clone()).collect::<Vec<_>>()
    };
    assert_eq!(ids(&original), ids(&reloaded));

    let err = InMemoryVectorIndex::load(&snapshot, 8).await.unwrap_err();
    assert!(matches!(err, GuideRagError::VectorStoreError(_)));

    let empty = InMemoryVectorIndex::load_or_empty(dir.path().join("absent.json"), DIMENSION).await?;
    assert_eq!(empty.stats().await?.count, 0);
    Ok(())
}
