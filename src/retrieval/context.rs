// Prompt context builder: the reference downstream consumer of admitted documents
use serde::{Deserialize, Serialize};

use crate::types::Document;

/// Downstream consumer of retrieval results.
///
/// The core makes no assumption about what a consumer does with the
/// admitted documents.
pub trait Consumer {
    type Output;

    fn consume(&self, query: &str, documents: &[Document]) -> Self::Output;
}

/// Context assembly configuration (`[context]` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Maximum tokens for retrieved context
    pub max_context_tokens: usize,
    /// Include document attributes in context
    pub include_attributes: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: 2000,
            include_attributes: true,
        }
    }
}

/// Assembled prompt context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledContext {
    /// The formatted context text
    pub text: String,
    /// Number of documents included
    pub document_count: usize,
    /// Estimated token count of the included documents
    pub estimated_tokens: usize,
    /// Document IDs included
    pub document_ids: Vec<String>,
    /// Admitted documents left out because of the token budget
    pub omitted: usize,
}

/// Message used when nothing was admitted
pub const NO_DOCUMENTS_NOTICE: &str =
    "No relevant documents were found for this query with the requester's permissions.";

/// Message used when documents were admitted but none fit the token budget
pub const OVER_BUDGET_NOTICE: &str =
    "Admitted documents exceeded the context budget and were left out.";

/// Formats admitted documents into the context block an LLM prompt would carry
pub struct PromptContextBuilder {
    config: ContextConfig,
}

impl PromptContextBuilder {
    /// Create new context builder with default config
    pub fn new() -> Self {
        Self {
            config: ContextConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Build context from admitted documents
    pub fn build(&self, query: &str, documents: &[Document]) -> AssembledContext {
        let mut text = format!("User query: {}\n\n", query);

        if documents.is_empty() {
            text.push_str(NO_DOCUMENTS_NOTICE);
            text.push('\n');
            return AssembledContext {
                text,
                document_count: 0,
                estimated_tokens: 0,
                document_ids: Vec::new(),
                omitted: 0,
            };
        }

        text.push_str("Retrieved information:\n");

        let mut total_tokens = 0;
        let mut included_ids = Vec::new();

        for doc in documents {
            // Rough estimate: ~4 chars per token
            let doc_tokens = doc.content.len() / 4;
            if total_tokens + doc_tokens > self.config.max_context_tokens {
                continue;
            }

            text.push_str(&self.format_document(included_ids.len() + 1, doc));
            total_tokens += doc_tokens;
            included_ids.push(doc.id.clone());
        }

        if included_ids.is_empty() {
            text.push_str(OVER_BUDGET_NOTICE);
            text.push('\n');
        }

        AssembledContext {
            text,
            document_count: included_ids.len(),
            estimated_tokens: total_tokens,
            omitted: documents.len() - included_ids.len(),
            document_ids: included_ids,
        }
    }

    fn format_document(&self, index: usize, doc: &Document) -> String {
        let mut block = format!("### Document {} (Id: {})\nContent: {}\n", index, doc.id, doc.content);
        if self.config.include_attributes {
            block.push_str(&format!("Attributes: {}\n", doc.attributes_line()));
        }
        block.push('\n');
        block
    }

    /// Get current configuration
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }
}

impl Default for PromptContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Consumer for PromptContextBuilder {
    type Output = AssembledContext;

    fn consume(&self, query: &str, documents: &[Document]) -> AssembledContext {
        self.build(query, documents)
    }
}
