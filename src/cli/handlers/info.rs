//! Information display handlers

use crate::cli::output::print_config;
use crate::cli::output::print_index_stats;
use crate::cli::output::print_warning;
use crate::vector_store::InMemoryVectorIndex;
use crate::vector_store::VectorIndex;
use crate::AppConfig;
use crate::Result;

pub async fn handle_stats_command(config: &AppConfig) -> Result<()> {
    let snapshot = &config.vector_store.snapshot_path;
    let index = InMemoryVectorIndex::load_or_empty(snapshot, config.embedding_dimension()).await?;
    let stats = index.stats().await?;

    print_index_stats(&stats, snapshot);
    if stats.count == 0 {
        print_warning("Index is empty. Run: guiderag ingest");
    }
    Ok(())
}

pub async fn handle_config_command(config: &AppConfig) -> Result<()> {
    print_config(config);
    Ok(())
}
