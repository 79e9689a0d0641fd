//! Ingestion handler

use std::path::PathBuf;
use std::sync::Arc;

use crate::chunking::DocumentChunker;
use crate::cli::output::print_info;
use crate::cli::output::print_ingest_report;
use crate::embeddings::EmbeddingService;
use crate::ingest::IngestStatus;
use crate::ingest::Ingestor;
use crate::vector_store::InMemoryVectorIndex;
use crate::AppConfig;
use crate::Result;

pub async fn handle_ingest(config: &AppConfig, path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(&config.ingest.documentation_path));
    let snapshot = &config.vector_store.snapshot_path;

    print_info(&format!("📄 Ingesting {}", path.display()));

    let embedder = Arc::new(EmbeddingService::new(config)?);
    let index = Arc::new(
        InMemoryVectorIndex::load_or_empty(snapshot, config.embedding_dimension()).await?,
    );
    let ingestor = Ingestor::new(
        DocumentChunker::from_config(&config.ingest),
        embedder,
        index.clone(),
    );

    let report = ingestor.ingest(&path, force).await?;
    if report.status == IngestStatus::Success {
        index.save(snapshot).await?;
        print_info(&format!("💾 Index saved to {snapshot}"));
    }

    print_ingest_report(&report);
    Ok(())
}
