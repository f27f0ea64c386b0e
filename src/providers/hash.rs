//! Deterministic stand-in embeddings
//!
//! Hashes the embedding text with FNV-1a (64 bit). Component 0 is the hash,
//! component 1 the text length in bytes; any further components are salted
//! hashes scaled into `[0, 1)`. Stable across runs and platforms, carries no
//! semantic meaning.

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::providers::EmbeddingProvider;
use crate::types::{document::embedding_text, Attributes, Embedding};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Default vector length: `[hash, length]`
pub const DEFAULT_HASH_DIMENSION: usize = 2;

/// FNV-1a over a byte slice
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    fnv1a64_with_seed(FNV_OFFSET_BASIS, bytes)
}

fn fnv1a64_with_seed(seed: u64, bytes: &[u8]) -> u64 {
    bytes.iter().fold(seed, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// FNV-hash embedding provider
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Two-component embedder
    pub fn new() -> Self {
        Self::with_dimension(DEFAULT_HASH_DIMENSION)
    }

    /// Embedder producing `dimension` components (at least one)
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Synchronous core, shared with the async trait impl
    pub fn embed_text(&self, text: &str) -> Embedding {
        let bytes = text.as_bytes();
        let hash = fnv1a64(bytes);

        let mut values = Vec::with_capacity(self.dimension);
        values.push(hash as f64);
        if self.dimension > 1 {
            values.push(bytes.len() as f64);
        }
        for salt in 2..self.dimension as u64 {
            let salted = fnv1a64_with_seed(hash ^ salt.wrapping_mul(FNV_PRIME), bytes);
            values.push(salted as f64 / u64::MAX as f64);
        }
        Embedding::new(values)
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str, attributes: &Attributes) -> Result<Embedding, ProviderError> {
        Ok(self.embed_text(&embedding_text(text, attributes)))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hash"
    }
}
