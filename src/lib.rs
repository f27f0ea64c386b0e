//! scoperag - Access-scoped document retrieval
//!
//! Retrieves only the documents a requester is permitted to see, based on
//! key/value metadata attached to each document and claims presented with
//! each query.
//!
//! # Architecture
//!
//! - **Index**: concurrent document store with copy-on-write snapshots,
//!   populated by the corpus loader
//! - **Policy**: ordered access checks with deny-overrides semantics
//! - **Retrieval**: per-query orchestration and prompt context assembly
//! - **Providers**: metadata and embedding seams with concrete adapters

pub mod errors;
pub mod types;

// Core
pub mod index;
pub mod policy;
pub mod retrieval;

// External collaborators
pub mod providers;

// Interface layer
pub mod cli;
pub mod config;
pub mod demo;
pub mod logging;

// Re-export commonly used types
pub use errors::{ProviderError, RagError, Result};
pub use index::{CorpusLoader, DocumentIndex, LoadReport};
pub use policy::{AccessCheck, PolicyFilter, Verdict};
pub use retrieval::{RetrievalOrchestrator, ScopedPipeline};
pub use types::{Attributes, Document, Embedding, RequesterContext};
