//! Type definitions module
//!
//! Documents, embeddings and requester contexts shared by the index,
//! the policy filter and the retrieval orchestrator.

pub mod document;
pub mod context;

// Re-export commonly used types
pub use document::{Attributes, Document, Embedding};
pub use context::RequesterContext;
