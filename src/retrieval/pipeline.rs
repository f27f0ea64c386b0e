// End-to-end pipeline: corpus load -> scoped retrieval -> prompt context
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::errors::Result;
use crate::index::{CorpusLoader, DocumentIndex, LoadReport, LoaderConfig};
use crate::policy::PolicyFilter;
use crate::providers::{EmbeddingProvider, MetadataProvider};
use crate::retrieval::context::{AssembledContext, ContextConfig, Consumer, PromptContextBuilder};
use crate::retrieval::orchestrator::{RetrievalOrchestrator, RetrievalOutcome};
use crate::types::RequesterContext;

/// Pipeline result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Audited retrieval outcome
    pub outcome: RetrievalOutcome,
    /// Prompt context assembled from the admitted documents
    pub context: AssembledContext,
}

/// Owns the index and wires loader, orchestrator and consumer around it
pub struct ScopedPipeline {
    index: Arc<DocumentIndex>,
    loader: CorpusLoader,
    orchestrator: RetrievalOrchestrator,
    context_builder: PromptContextBuilder,
}

impl ScopedPipeline {
    /// Create with default loader and context settings
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        filter: PolicyFilter,
    ) -> Self {
        Self::with_parts(
            metadata,
            embedder,
            filter,
            LoaderConfig::default(),
            ContextConfig::default(),
        )
    }

    /// Create with explicit loader and context configuration
    pub fn with_parts(
        metadata: Arc<dyn MetadataProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        filter: PolicyFilter,
        loader_config: LoaderConfig,
        context_config: ContextConfig,
    ) -> Self {
        let index = Arc::new(DocumentIndex::new());
        Self {
            loader: CorpusLoader::with_config(metadata, embedder, loader_config),
            orchestrator: RetrievalOrchestrator::new(Arc::clone(&index), Arc::new(filter)),
            context_builder: PromptContextBuilder::with_config(context_config),
            index,
        }
    }

    /// Build every component from configuration
    pub fn from_config(config: &Config, metadata: Arc<dyn MetadataProvider>) -> Result<Self> {
        let filter = PolicyFilter::from_config(&config.policy)?;
        let embedder = config.embedding.build_provider()?;
        Ok(Self::with_parts(
            metadata,
            embedder,
            filter,
            config.loader.clone(),
            config.context.clone(),
        ))
    }

    /// Load the full corpus into the index
    pub async fn load(&self) -> Result<LoadReport> {
        self.loader.load_all(&self.index).await
    }

    /// Rebuild the index from the corpus, swapping it in atomically
    pub async fn reload(&self) -> Result<LoadReport> {
        self.loader.rebuild_all(&self.index).await
    }

    /// Retrieve for the requester and assemble the prompt context
    pub fn execute(&self, query: &str, context: &RequesterContext) -> Result<PipelineResult> {
        let outcome = self.orchestrator.retrieve_audited(query, context)?;
        let assembled = self.context_builder.consume(query, &outcome.admitted);
        Ok(PipelineResult {
            outcome,
            context: assembled,
        })
    }

    /// Retrieval orchestrator sharing this pipeline's index
    pub fn orchestrator(&self) -> &RetrievalOrchestrator {
        &self.orchestrator
    }

    /// Shared index
    pub fn index(&self) -> &Arc<DocumentIndex> {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RagError;
    use crate::providers::{HashEmbedder, ManifestProvider};
    use crate::retrieval::context::NO_DOCUMENTS_NOTICE;
    use crate::types::Document;

    fn pipeline() -> ScopedPipeline {
        let corpus = ManifestProvider::from_documents(vec![
            Document::new("open.txt", "Open content"),
            Document::new("secret.txt", "Secret content").with_attribute("sensitivity", "confidential"),
        ]);
        ScopedPipeline::new(
            Arc::new(corpus),
            Arc::new(HashEmbedder::new()),
            PolicyFilter::standard(),
        )
    }

    #[tokio::test]
    async fn test_execute_before_load_fails() {
        let pipeline = pipeline();
        let result = pipeline.execute("q", &RequesterContext::new());
        assert!(matches!(result, Err(RagError::IndexNotLoaded)));
    }

    #[tokio::test]
    async fn test_execute_builds_scoped_context() {
        let pipeline = pipeline();
        pipeline.load().await.unwrap();

        let result = pipeline
            .execute("What is new?", &RequesterContext::new().with("department", "Dev"))
            .unwrap();

        assert_eq!(result.outcome.admitted_ids(), vec!["open.txt"]);
        assert!(result.context.text.contains("Open content"));
        assert!(!result.context.text.contains("Secret content"));
    }

    #[tokio::test]
    async fn test_nothing_admitted_is_explicit() {
        let corpus = ManifestProvider::from_documents(vec![
            Document::new("internal.txt", "x").with_attribute("sensitivity", "internal"),
        ]);
        let pipeline = ScopedPipeline::new(
            Arc::new(corpus),
            Arc::new(HashEmbedder::new()),
            PolicyFilter::standard(),
        );
        pipeline.load().await.unwrap();

        let result = pipeline.execute("q", &RequesterContext::new()).unwrap();
        assert_eq!(result.outcome.denied.len(), 1);
        assert!(result.context.text.contains(NO_DOCUMENTS_NOTICE));
    }

    #[tokio::test]
    async fn test_from_default_config() {
        let config = Config::default();
        let pipeline =
            ScopedPipeline::from_config(&config, Arc::new(ManifestProvider::new())).unwrap();
        let report = pipeline.load().await.unwrap();
        assert_eq!(report.attempted(), 0);
        assert!(pipeline.execute("q", &RequesterContext::new()).unwrap().outcome.admitted.is_empty());
    }
}
