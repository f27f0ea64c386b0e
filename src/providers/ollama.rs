//! Embedding provider backed by a local Ollama server
//!
//! Calls `POST /api/embeddings` with the document text (content plus the
//! attribute line) and checks the returned vector length.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::errors::{ProviderError, Result};
use crate::providers::EmbeddingProvider;
use crate::types::{document::embedding_text, Attributes, Embedding};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f64>,
}

/// HTTP client for Ollama embeddings
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
    dimension: usize,
}

impl OllamaEmbedder {
    /// Create a new embedder
    ///
    /// # Arguments
    /// * `base_url` - Ollama base URL (e.g. http://127.0.0.1:11434)
    /// * `model` - embedding model tag (e.g. nomic-embed-text)
    /// * `dimension` - expected vector length
    /// * `timeout` - per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            dimension,
        })
    }

    /// Model tag used for requests
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/api/embeddings", self.base_url)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(
        &self,
        text: &str,
        attributes: &Attributes,
    ) -> std::result::Result<Embedding, ProviderError> {
        let prompt = embedding_text(text, attributes);
        let response = self
            .client
            .post(self.endpoint())
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: &prompt,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Embedding(format!("Ollama request timed out: {}", e))
                } else {
                    ProviderError::Embedding(format!("Failed to connect to Ollama: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::Embedding(format!(
                "Ollama API error: {}",
                response.status()
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Embedding(format!("Failed to parse response: {}", e)))?;

        if body.embedding.len() != self.dimension {
            return Err(ProviderError::Embedding(format!(
                "Expected {} dimensions from {}, got {}",
                self.dimension,
                self.model,
                body.embedding.len()
            )));
        }

        debug!(model = %self.model, dimension = self.dimension, "received embedding");
        Ok(Embedding::new(body.embedding))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
