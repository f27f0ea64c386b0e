//! Error types for scoperag
//!
//! Library code returns [`RagError`]. Failures raised by external
//! collaborators (metadata storage, embedding backends) are reported as
//! [`ProviderError`] and folded into per-document load failures by the loader.

use thiserror::Error;

/// Main error type for the retrieval pipeline
#[derive(Error, Debug)]
pub enum RagError {
    /// Retrieval was attempted before any corpus load completed
    #[error("Document index is not loaded; run a corpus load before retrieving")]
    IndexNotLoaded,

    /// A collaborator failed outside of a per-document load batch
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Corpus manifest errors
    #[error("Manifest error: {0}")]
    ManifestError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Failure reported by a metadata or embedding provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The identifier is unknown to the provider
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Document content could not be read
    #[error("Failed to read content of {id}: {reason}")]
    Content { id: String, reason: String },

    /// Attribute listing or reading failed
    #[error("Failed to read attributes of {id}: {reason}")]
    Attributes { id: String, reason: String },

    /// Embedding backend failed
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// The collaborator did not answer in time
    #[error("Provider call timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Filesystem does not support the metadata backend
    #[error("Unsupported metadata backend: {0}")]
    Unsupported(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, RagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RagError::IndexNotLoaded;
        assert!(err.to_string().contains("not loaded"));
    }

    #[test]
    fn test_provider_error_conversion() {
        let err: RagError = ProviderError::Timeout { duration_ms: 250 }.into();
        assert!(err.to_string().contains("250ms"));
    }

    #[test]
    fn test_attribute_error_mentions_document() {
        let err = ProviderError::Attributes {
            id: "notes.txt".to_string(),
            reason: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("notes.txt"));
        assert!(err.to_string().contains("permission denied"));
    }
}
