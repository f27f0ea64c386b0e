//! External collaborator seams
//!
//! The core never reads storage or runs a model directly. Corpus loading goes
//! through [`MetadataProvider`] (content + attributes) and
//! [`EmbeddingProvider`] (vector per document). Concrete adapters:
//!
//! - [`ManifestProvider`]: in-memory corpus, optionally parsed from TOML
//! - [`XattrProvider`]: files in a directory, attributes from `user.*` xattrs
//! - [`HashEmbedder`]: deterministic FNV-based stand-in vectors
//! - [`OllamaEmbedder`]: embeddings from a local Ollama server

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::types::{Attributes, Embedding};

pub mod manifest;
pub mod hash;
pub mod ollama;
#[cfg(unix)]
pub mod xattr_fs;

pub use manifest::ManifestProvider;
pub use hash::HashEmbedder;
pub use ollama::OllamaEmbedder;
#[cfg(unix)]
pub use xattr_fs::XattrProvider;

/// Source of document content and metadata attributes
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Identifiers of every document the provider can serve
    async fn list_documents(&self) -> Result<Vec<String>, ProviderError>;

    /// Raw text content of a document
    async fn read_content(&self, id: &str) -> Result<String, ProviderError>;

    /// Attribute key/value pairs of a document
    async fn list_attributes(&self, id: &str) -> Result<Attributes, ProviderError>;
}

/// Produces the vector stored alongside each indexed document.
///
/// Implementations must be deterministic for a given `(text, attributes)`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str, attributes: &Attributes) -> Result<Embedding, ProviderError>;

    /// Length of every vector this provider returns
    fn dimension(&self) -> usize;

    /// Short provider name for logs
    fn name(&self) -> &str;
}
