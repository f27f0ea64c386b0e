// Scoped retrieval: per-query policy filtering over the document index
//
// Components:
// - Orchestrator: enumerates the index and applies the policy filter
// - Context Builder: reference consumer that assembles prompt context
// - Pipeline: end-to-end load -> retrieve -> assemble

pub mod orchestrator;
pub mod context;
pub mod pipeline;

// Re-export key types
pub use orchestrator::{DeniedDocument, RetrievalOrchestrator, RetrievalOutcome};
pub use context::{AssembledContext, Consumer, ContextConfig, PromptContextBuilder};
pub use pipeline::{PipelineResult, ScopedPipeline};
