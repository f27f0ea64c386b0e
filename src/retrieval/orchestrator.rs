// Retrieval orchestrator: index snapshot -> policy filter -> admitted documents
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{RagError, Result};
use crate::index::DocumentIndex;
use crate::policy::{Denial, PolicyFilter};
use crate::types::{Document, RequesterContext};

/// A document withheld from the requester, with the check that withheld it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeniedDocument {
    pub id: String,
    pub denial: Denial,
}

/// Audited result of one retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalOutcome {
    /// Correlates log lines of one request
    pub request_id: Uuid,
    /// Query as received; not used for ranking
    pub query: String,
    /// Index generation the snapshot was taken at
    pub generation: u64,
    /// Documents evaluated
    pub evaluated: usize,
    /// Admitted documents in index enumeration order
    pub admitted: Vec<Document>,
    /// Withheld documents in index enumeration order
    pub denied: Vec<DeniedDocument>,
    pub timestamp: DateTime<Utc>,
}

impl RetrievalOutcome {
    /// Identifiers of the admitted documents
    pub fn admitted_ids(&self) -> Vec<&str> {
        self.admitted.iter().map(|d| d.id.as_str()).collect()
    }
}

/// Applies the policy filter to every indexed document for a query
#[derive(Debug, Clone)]
pub struct RetrievalOrchestrator {
    index: Arc<DocumentIndex>,
    filter: Arc<PolicyFilter>,
}

impl RetrievalOrchestrator {
    /// Create new orchestrator over a shared index and filter
    pub fn new(index: Arc<DocumentIndex>, filter: Arc<PolicyFilter>) -> Self {
        Self { index, filter }
    }

    /// Documents the requester may see, in index enumeration order.
    ///
    /// Fails with [`RagError::IndexNotLoaded`] before the first corpus load so
    /// an empty result always means "nothing admitted".
    pub fn retrieve(&self, query: &str, context: &RequesterContext) -> Result<Vec<Document>> {
        Ok(self.retrieve_audited(query, context)?.admitted)
    }

    /// Retrieve and keep the per-document denial record
    pub fn retrieve_audited(
        &self,
        query: &str,
        context: &RequesterContext,
    ) -> Result<RetrievalOutcome> {
        if !self.index.is_loaded() {
            return Err(RagError::IndexNotLoaded);
        }

        let request_id = Uuid::new_v4();
        let snapshot = self.index.enumerate();
        info!(
            %request_id,
            query,
            context = %context,
            documents = snapshot.len(),
            generation = snapshot.generation(),
            "retrieving documents"
        );

        let mut admitted = Vec::new();
        let mut denied = Vec::new();

        for entry in snapshot.iter() {
            let doc = &entry.document;
            let decision = self.filter.evaluate(&doc.attributes, context);

            match decision.denied_by {
                Some(denial) => {
                    debug!(
                        %request_id,
                        doc_id = %doc.id,
                        check = %denial.check,
                        reason = %denial.reason,
                        "document withheld"
                    );
                    denied.push(DeniedDocument {
                        id: doc.id.clone(),
                        denial,
                    });
                }
                None => {
                    debug!(%request_id, doc_id = %doc.id, "document admitted");
                    admitted.push(doc.clone());
                }
            }
        }

        info!(
            %request_id,
            admitted = admitted.len(),
            denied = denied.len(),
            "retrieval finished"
        );

        Ok(RetrievalOutcome {
            request_id,
            query: query.to_string(),
            generation: snapshot.generation(),
            evaluated: snapshot.len(),
            admitted,
            denied,
            timestamp: Utc::now(),
        })
    }

    /// Shared index
    pub fn index(&self) -> &Arc<DocumentIndex> {
        &self.index
    }

    /// Active policy filter
    pub fn filter(&self) -> &PolicyFilter {
        &self.filter
    }
}
