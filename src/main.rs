use clap::Parser;
use guiderag::cli::*;
use guiderag::config::AppConfig;
use guiderag::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    if cli.verbose {
        guiderag::logging::init_logging_with_level("debug", &config.logging.log_dir)?;
    } else {
        guiderag::logging::init_logging_with_config(&config.logging)?;
    }
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Ingest { path, force } => {
            handle_ingest(&config, path, force).await?;
        }
        Commands::Chat { session } => {
            handle_chat(&config, session).await?;
        }
        Commands::Ask { question, session } => {
            handle_ask(&config, question, session).await?;
        }
        Commands::Search {
            query,
            top_k,
            no_rerank,
            section,
            endpoint,
        } => {
            handle_search(&config, query, top_k, no_rerank, section, endpoint).await?;
        }
        Commands::Stats => {
            handle_stats_command(&config).await?;
        }
        Commands::Config => {
            handle_config_command(&config).await?;
        }
    }

    Ok(())
}
