//! In-memory metadata provider, loadable from a TOML corpus manifest.
//!
//! ```toml
//! [[documents]]
//! id = "public_announcement.txt"
//! content = "This is a public announcement about upcoming office changes."
//!
//! [documents.attributes]
//! type = "public"
//! published_by = "HR"
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{ProviderError, RagError, Result};
use crate::providers::MetadataProvider;
use crate::types::{Attributes, Document};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Manifest {
    #[serde(default)]
    documents: Vec<Document>,
}

/// Corpus held in memory, keyed by document identifier
#[derive(Debug, Clone, Default)]
pub struct ManifestProvider {
    documents: BTreeMap<String, Document>,
}

impl ManifestProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an iterator of documents; later duplicates win
    pub fn from_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        Self {
            documents: documents
                .into_iter()
                .map(|doc| (doc.id.clone(), doc))
                .collect(),
        }
    }

    /// Parse a TOML manifest
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(contents)
            .map_err(|e| RagError::ManifestError(format!("Failed to parse manifest: {}", e)))?;

        let mut seen = std::collections::BTreeSet::new();
        for doc in &manifest.documents {
            if doc.id.trim().is_empty() {
                return Err(RagError::ManifestError(
                    "Document id must not be empty".to_string(),
                ));
            }
            if !seen.insert(doc.id.as_str()) {
                return Err(RagError::ManifestError(format!(
                    "Duplicate document id: {}",
                    doc.id
                )));
            }
        }

        Ok(Self::from_documents(manifest.documents))
    }

    /// Read and parse a TOML manifest file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RagError::ManifestError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Serialize the corpus back to manifest form
    pub fn to_toml_string(&self) -> Result<String> {
        let manifest = Manifest {
            documents: self.documents.values().cloned().collect(),
        };
        toml::to_string_pretty(&manifest)
            .map_err(|e| RagError::ManifestError(format!("Failed to serialize manifest: {}", e)))
    }

    /// Add or replace a document
    pub fn insert(&mut self, document: Document) {
        self.documents.insert(document.id.clone(), document);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn lookup(&self, id: &str) -> std::result::Result<&Document, ProviderError> {
        self.documents
            .get(id)
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl MetadataProvider for ManifestProvider {
    async fn list_documents(&self) -> std::result::Result<Vec<String>, ProviderError> {
        Ok(self.documents.keys().cloned().collect())
    }

    async fn read_content(&self, id: &str) -> std::result::Result<String, ProviderError> {
        Ok(self.lookup(id)?.content.clone())
    }

    async fn list_attributes(&self, id: &str) -> std::result::Result<Attributes, ProviderError> {
        Ok(self.lookup(id)?.attributes.clone())
    }
}
