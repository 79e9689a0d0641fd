//! RAG (Retrieval-Augmented Generation) handlers

use std::io::Write;
use std::io::{
    self,
};
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use crate::cli::output::*;
use crate::rag::ChatRequest;
use crate::rag::RagService;
use crate::vector_store::MetadataFilter;
use crate::AppConfig;
use crate::GuideRagError;
use crate::Result;

/// Simple spinner for showing progress
struct Spinner {
    message: String,
    running: Arc<AtomicBool>,
}

impl Spinner {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    fn start(&self) {
        let message = self.message.clone();
        let running = self.running.clone();
        running.store(true, Ordering::Relaxed);

        std::thread::spawn(move || {
            let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
            let mut idx = 0;

            while running.load(Ordering::Relaxed) {
                print!("\r   {} {}...", frames[idx], message);
                io::stdout().flush().ok();
                idx = (idx + 1) % frames.len();
                std::thread::sleep(Duration::from_millis(80));
            }

            // Clear the line
            print!("\r{}\r", " ".repeat(80));
            io::stdout().flush().ok();
        });
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
        std::thread::sleep(Duration::from_millis(100));
    }
}

async fn build_service(config: &AppConfig) -> Result<RagService> {
    let service = RagService::new(config).await?;
    if service.index_stats().await?.count == 0 {
        print_warning("Index is empty, answers will have no context. Run: guiderag ingest");
    }
    Ok(service)
}

fn session_or_random(session: Option<String>) -> String {
    session.unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Handle a single question
pub async fn handle_ask(config: &AppConfig, question: String, session: Option<String>) -> Result<()> {
    let service = build_service(config).await?;
    let session_id = session_or_random(session);

    let spinner = Spinner::new("Thinking");
    spinner.start();
    let response = service.chat(ChatRequest::new(session_id, question)).await;
    spinner.stop();

    print_chat_response(&response?);
    Ok(())
}

/// Handle the interactive chat loop
pub async fn handle_chat(config: &AppConfig, session: Option<String>) -> Result<()> {
    let service = build_service(config).await?;
    let mut session_id = session_or_random(session);

    println!("💬 guiderag chat (session {session_id})");
    println!("   Commands: /reset, /stats, /quit");
    println!();

    loop {
        print_prompt("Vendor: ");

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            println!();
            break;
        }
        let question = input.trim();

        if question.is_empty() {
            continue;
        }
        match question {
            "/quit" | "/exit" | "/q" => {
                print_success("👋 Conversation ended. Goodbye!");
                break;
            }
            "/reset" => {
                service.memory().clear_session(&session_id);
                session_id = session_or_random(None);
                print_info(&format!("Started new session {session_id}"));
                continue;
            }
            "/stats" => {
                let stats = service.memory().session_stats(&session_id).await;
                print_session_stats(&session_id, stats.as_ref());
                continue;
            }
            _ => {}
        }

        let expired = service.cleanup_sessions(config.session_ttl());
        if expired > 0 {
            debug!("Dropped {} idle sessions", expired);
        }

        let spinner = Spinner::new("Thinking");
        spinner.start();
        let response = service
            .chat(ChatRequest::new(session_id.as_str(), question))
            .await;
        spinner.stop();

        match response {
            Ok(response) => print_chat_response(&response),
            Err(GuideRagError::InvalidInput(msg)) => print_warning(&msg),
            Err(e) => print_error(&format!("Failed to answer: {e}")),
        }
        println!();
    }

    Ok(())
}

/// Handle raw search: ranked chunks without answer generation
pub async fn handle_search(
    config: &AppConfig,
    query: String,
    top_k: Option<usize>,
    no_rerank: bool,
    section: Option<String>,
    endpoint: Option<String>,
) -> Result<()> {
    let service = build_service(config).await?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k);

    let filter = MetadataFilter {
        section_title: section,
        api_endpoint: endpoint,
        source: None,
    };
    let filter = (!filter.is_empty()).then_some(filter);

    let (processed, chunks) = service
        .search(&query, top_k, filter.as_ref(), !no_rerank)
        .await?;

    print_search_header(&processed);
    if chunks.is_empty() {
        print_warning("No chunks above the similarity threshold");
        return Ok(());
    }
    print_search_results(&chunks);
    Ok(())
}
