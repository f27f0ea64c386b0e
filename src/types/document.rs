//! Indexed document and embedding types
//!
//! A [`Document`] is immutable once indexed. Re-indexing builds a new value
//! and swaps it into the index whole.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Document attributes keyed by attribute name.
///
/// `BTreeMap` keeps enumeration deterministic for prompts, embeddings and tests.
pub type Attributes = BTreeMap<String, String>;

/// A piece of content together with its metadata attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique, stable identifier (a path for filesystem corpora)
    pub id: String,
    /// Raw text content
    pub content: String,
    /// Metadata attributes describing ownership, provenance and sensitivity
    #[serde(default)]
    pub attributes: Attributes,
}

impl Document {
    /// Create a document without attributes
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            attributes: Attributes::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Replace all attributes
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Look up a single attribute
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Attributes rendered as `k=v, k=v` in key order
    pub fn attributes_line(&self) -> String {
        render_attributes(&self.attributes)
    }

    /// Text handed to embedding providers: content, then the attribute line.
    pub fn embedding_text(&self) -> String {
        embedding_text(&self.content, &self.attributes)
    }
}

/// Render attributes as `k=v` pairs joined by `, `
pub fn render_attributes(attributes: &Attributes) -> String {
    attributes
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the text an embedding model would see for this content
pub fn embedding_text(content: &str, attributes: &Attributes) -> String {
    if attributes.is_empty() {
        content.to_string()
    } else {
        format!(
            "{}\n\nExtended Attributes: {}",
            content,
            render_attributes(attributes)
        )
    }
}

/// Fixed-length vector produced once at index time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding(Vec<f64>);

impl Embedding {
    /// Wrap a vector produced by an embedding provider
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Vector length
    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Read-only view of the components
    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

impl fmt::Display for Embedding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
