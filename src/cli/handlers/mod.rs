//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - ingest: Documentation chunking and indexing
//! - rag: Chat, single questions and raw search
//! - info: Information display (index stats, config)

pub mod info;
pub mod ingest;
pub mod rag;

// Re-export all public handlers
pub use info::*;
pub use ingest::*;
pub use rag::*;
