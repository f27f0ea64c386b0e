//! Corpus loader: metadata provider + embedding provider -> document index
//!
//! Per-document failures never abort a batch. A document whose content or
//! embedding cannot be produced is skipped and reported; a document whose
//! attributes cannot be read is indexed with empty attributes and reported
//! as degraded. Every provider call runs under a timeout and is not retried.

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::errors::{ProviderError, Result};
use crate::index::store::DocumentIndex;
use crate::providers::{EmbeddingProvider, MetadataProvider};
use crate::types::{Attributes, Document, Embedding};

/// Loader configuration (`[loader]` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Documents loaded concurrently
    pub concurrency: usize,
    /// Timeout applied to each provider call
    pub provider_timeout_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            concurrency: num_cpus::get().max(1),
            provider_timeout_ms: 5_000,
        }
    }
}

/// Step at which a document failed to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStage {
    Content,
    Attributes,
    Embedding,
}

impl std::fmt::Display for LoadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStage::Content => write!(f, "content"),
            LoadStage::Attributes => write!(f, "attributes"),
            LoadStage::Embedding => write!(f, "embedding"),
        }
    }
}

/// A document that could not be indexed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub id: String,
    pub stage: LoadStage,
    pub error: ProviderError,
}

/// Batch result of a corpus load
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Identifiers now in the index, sorted
    pub indexed: Vec<String>,
    /// Indexed with empty attributes after an attribute read failure, sorted
    pub degraded: Vec<LoadFailure>,
    /// Skipped documents, sorted by identifier
    pub failures: Vec<LoadFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Index generation after the load was applied
    pub generation: u64,
}

impl LoadReport {
    /// Number of documents attempted
    pub fn attempted(&self) -> usize {
        self.indexed.len() + self.failures.len()
    }

    /// True when every document loaded with its attributes intact
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.degraded.is_empty()
    }

    /// Ids of the documents indexed with empty attributes
    pub fn degraded_ids(&self) -> Vec<&str> {
        self.degraded.iter().map(|f| f.id.as_str()).collect()
    }

    /// Ids of the skipped documents
    pub fn failed_ids(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.id.as_str()).collect()
    }
}

struct LoadedDocument {
    document: Document,
    embedding: Embedding,
    degraded: Option<LoadFailure>,
}

/// Populates a [`DocumentIndex`] from external providers
pub struct CorpusLoader {
    metadata: Arc<dyn MetadataProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    config: LoaderConfig,
}

impl CorpusLoader {
    /// Create a loader with default configuration
    pub fn new(metadata: Arc<dyn MetadataProvider>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self::with_config(metadata, embedder, LoaderConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(
        metadata: Arc<dyn MetadataProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: LoaderConfig,
    ) -> Self {
        Self {
            metadata,
            embedder,
            config,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.provider_timeout_ms)
    }

    async fn bounded<T, F>(&self, call: F) -> std::result::Result<T, ProviderError>
    where
        F: Future<Output = std::result::Result<T, ProviderError>>,
    {
        match tokio::time::timeout(self.timeout(), call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                duration_ms: self.config.provider_timeout_ms,
            }),
        }
    }

    async fn load_document(&self, id: String) -> std::result::Result<LoadedDocument, LoadFailure> {
        let content = self
            .bounded(self.metadata.read_content(&id))
            .await
            .map_err(|error| LoadFailure {
                id: id.clone(),
                stage: LoadStage::Content,
                error,
            })?;

        let (attributes, degraded) = match self.bounded(self.metadata.list_attributes(&id)).await {
            Ok(attributes) => (attributes, None),
            Err(error) => {
                warn!(doc_id = %id, error = %error, "attributes unreadable; indexing with none");
                (
                    Attributes::new(),
                    Some(LoadFailure {
                        id: id.clone(),
                        stage: LoadStage::Attributes,
                        error,
                    }),
                )
            }
        };

        let embedding = self
            .bounded(self.embedder.embed(&content, &attributes))
            .await
            .and_then(|embedding| {
                if embedding.dimension() == self.embedder.dimension() {
                    Ok(embedding)
                } else {
                    Err(ProviderError::Embedding(format!(
                        "{} returned {} dimensions, expected {}",
                        self.embedder.name(),
                        embedding.dimension(),
                        self.embedder.dimension()
                    )))
                }
            })
            .map_err(|error| LoadFailure {
                id: id.clone(),
                stage: LoadStage::Embedding,
                error,
            })?;

        Ok(LoadedDocument {
            document: Document {
                id,
                content,
                attributes,
            },
            embedding,
            degraded,
        })
    }

    /// Load every identifier the metadata provider lists
    pub async fn load_all(&self, index: &DocumentIndex) -> Result<LoadReport> {
        let ids = self.bounded(self.metadata.list_documents()).await?;
        Ok(self.load(index, ids).await)
    }

    /// Load the given identifiers, putting each into the index as it completes
    pub async fn load(&self, index: &DocumentIndex, ids: Vec<String>) -> LoadReport {
        let started_at = Utc::now();
        let mut indexed = Vec::new();
        let mut degraded = Vec::new();
        let mut failures = Vec::new();

        let mut outcomes = stream::iter(ids)
            .map(|id| self.load_document(id))
            .buffer_unordered(self.config.concurrency.max(1));

        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Ok(loaded) => {
                    indexed.push(loaded.document.id.clone());
                    degraded.extend(loaded.degraded);
                    index.put(loaded.document, loaded.embedding);
                }
                Err(failure) => {
                    warn!(doc_id = %failure.id, stage = ?failure.stage, error = %failure.error, "skipping document");
                    failures.push(failure);
                }
            }
        }

        index.mark_loaded();
        self.finish(index, started_at, indexed, degraded, failures)
    }

    /// Load into a fresh set of entries and swap it into the index in one step
    pub async fn rebuild(&self, index: &DocumentIndex, ids: Vec<String>) -> LoadReport {
        let started_at = Utc::now();
        let mut entries = Vec::new();
        let mut degraded = Vec::new();
        let mut failures = Vec::new();

        let mut outcomes = stream::iter(ids)
            .map(|id| self.load_document(id))
            .buffer_unordered(self.config.concurrency.max(1));

        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Ok(loaded) => {
                    degraded.extend(loaded.degraded);
                    entries.push((loaded.document, loaded.embedding));
                }
                Err(failure) => {
                    warn!(doc_id = %failure.id, stage = ?failure.stage, error = %failure.error, "skipping document");
                    failures.push(failure);
                }
            }
        }

        let indexed = entries.iter().map(|(doc, _)| doc.id.clone()).collect();
        index.replace_all(entries);
        self.finish(index, started_at, indexed, degraded, failures)
    }

    /// Rebuild from every identifier the metadata provider lists
    pub async fn rebuild_all(&self, index: &DocumentIndex) -> Result<LoadReport> {
        let ids = self.bounded(self.metadata.list_documents()).await?;
        Ok(self.rebuild(index, ids).await)
    }

    fn finish(
        &self,
        index: &DocumentIndex,
        started_at: DateTime<Utc>,
        mut indexed: Vec<String>,
        mut degraded: Vec<LoadFailure>,
        mut failures: Vec<LoadFailure>,
    ) -> LoadReport {
        indexed.sort();
        degraded.sort_by(|a, b| a.id.cmp(&b.id));
        failures.sort_by(|a, b| a.id.cmp(&b.id));

        let report = LoadReport {
            indexed,
            degraded,
            failures,
            started_at,
            finished_at: Utc::now(),
            generation: index.generation(),
        };

        info!(
            indexed = report.indexed.len(),
            degraded = report.degraded.len(),
            failed = report.failures.len(),
            embedder = self.embedder.name(),
            generation = report.generation,
            "corpus load finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{HashEmbedder, ManifestProvider};
    use async_trait::async_trait;

    fn corpus() -> ManifestProvider {
        ManifestProvider::from_documents(vec![
            Document::new("a.txt", "alpha").with_attribute("sensitivity", "internal"),
            Document::new("b.txt", "beta"),
            Document::new("c.txt", "gamma").with_attribute("user_id", "123"),
        ])
    }

    /// Wraps a manifest and fails selected documents at selected stages
    struct Flaky {
        inner: ManifestProvider,
        bad_content: Vec<&'static str>,
        bad_attributes: Vec<&'static str>,
        slow: Vec<&'static str>,
    }

    #[async_trait]
    impl MetadataProvider for Flaky {
        async fn list_documents(&self) -> std::result::Result<Vec<String>, ProviderError> {
            self.inner.list_documents().await
        }

        async fn read_content(&self, id: &str) -> std::result::Result<String, ProviderError> {
            if self.slow.contains(&id) {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            if self.bad_content.contains(&id) {
                return Err(ProviderError::Content {
                    id: id.to_string(),
                    reason: "unreadable".to_string(),
                });
            }
            self.inner.read_content(id).await
        }

        async fn list_attributes(&self, id: &str) -> std::result::Result<Attributes, ProviderError> {
            if self.bad_attributes.contains(&id) {
                return Err(ProviderError::Attributes {
                    id: id.to_string(),
                    reason: "xattr list failed".to_string(),
                });
            }
            self.inner.list_attributes(id).await
        }
    }

    /// Embedder that returns the wrong vector length
    struct Misshapen;

    #[async_trait]
    impl EmbeddingProvider for Misshapen {
        async fn embed(&self, _: &str, _: &Attributes) -> std::result::Result<Embedding, ProviderError> {
            Ok(Embedding::new(vec![1.0]))
        }

        fn dimension(&self) -> usize {
            4
        }

        fn name(&self) -> &str {
            "misshapen"
        }
    }

    fn loader(metadata: impl MetadataProvider + 'static) -> CorpusLoader {
        CorpusLoader::with_config(
            Arc::new(metadata),
            Arc::new(HashEmbedder::new()),
            LoaderConfig {
                concurrency: 2,
                provider_timeout_ms: 200,
            },
        )
    }

    #[tokio::test]
    async fn test_load_all_indexes_everything() {
        let index = DocumentIndex::new();
        let report = loader(corpus()).load_all(&index).await.unwrap();

        assert!(report.is_clean());
        assert_eq!(report.indexed, vec!["a.txt", "b.txt", "c.txt"]);
        assert!(index.is_loaded());
        assert_eq!(index.len(), 3);
        assert_eq!(
            index.get("a.txt").unwrap().document.attribute("sensitivity"),
            Some("internal")
        );
    }

    #[tokio::test]
    async fn test_empty_load_marks_index_loaded() {
        let index = DocumentIndex::new();
        let report = loader(ManifestProvider::new()).load_all(&index).await.unwrap();
        assert_eq!(report.attempted(), 0);
        assert!(index.is_loaded());
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_attribute_failure_degrades() {
        let index = DocumentIndex::new();
        let flaky = Flaky {
            inner: corpus(),
            bad_content: vec![],
            bad_attributes: vec!["a.txt"],
            slow: vec![],
        };
        let report = loader(flaky).load_all(&index).await.unwrap();

        assert_eq!(report.indexed.len(), 3);
        assert_eq!(report.degraded_ids(), vec!["a.txt"]);
        assert_eq!(report.degraded[0].stage, LoadStage::Attributes);
        assert!(index.get("a.txt").unwrap().document.attributes.is_empty());
    }

    #[tokio::test]
    async fn test_content_failure_skips_document() {
        let index = DocumentIndex::new();
        let flaky = Flaky {
            inner: corpus(),
            bad_content: vec!["b.txt"],
            bad_attributes: vec![],
            slow: vec![],
        };
        let report = loader(flaky).load_all(&index).await.unwrap();

        assert_eq!(report.indexed, vec!["a.txt", "c.txt"]);
        assert_eq!(report.failed_ids(), vec!["b.txt"]);
        assert_eq!(report.failures[0].stage, LoadStage::Content);
        assert!(index.get("b.txt").is_none());
    }

    #[tokio::test]
    async fn test_timeout_is_reported_as_failure() {
        let index = DocumentIndex::new();
        let flaky = Flaky {
            inner: corpus(),
            bad_content: vec![],
            bad_attributes: vec![],
            slow: vec!["c.txt"],
        };
        let report = loader(flaky).load_all(&index).await.unwrap();

        assert_eq!(report.failed_ids(), vec!["c.txt"]);
        assert_eq!(
            report.failures[0].error,
            ProviderError::Timeout { duration_ms: 200 }
        );
        assert_eq!(index.len(), 2);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_embedding_failure() {
        let index = DocumentIndex::new();
        let loader = CorpusLoader::new(Arc::new(corpus()), Arc::new(Misshapen));
        let report = loader.load_all(&index).await.unwrap();

        assert!(report.indexed.is_empty());
        assert_eq!(report.failures.len(), 3);
        assert!(report
            .failures
            .iter()
            .all(|f| f.stage == LoadStage::Embedding));
    }

    #[tokio::test]
    async fn test_rebuild_replaces_previous_contents() {
        let index = DocumentIndex::new();
        index.put(Document::new("stale.txt", "old"), Embedding::new(vec![0.0, 0.0]));

        let report = loader(corpus()).rebuild_all(&index).await.unwrap();

        assert_eq!(report.indexed.len(), 3);
        assert!(index.get("stale.txt").is_none());
        assert_eq!(index.enumerate().ids(), vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_loader_config_default() {
        let config = LoaderConfig::default();
        assert!(config.concurrency >= 1);
        assert_eq!(config.provider_timeout_ms, 5_000);
    }
}
