//! Document index store
//!
//! Single writer, many readers. The entry map lives behind an `Arc` and is
//! copied on write, so a reader holding an [`IndexSnapshot`] keeps a
//! consistent view while loads continue. Entries are themselves `Arc`-shared
//! and never mutated: a `put` swaps in a fully built entry under the write
//! lock, so no reader can observe a half-written document.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::types::{Document, Embedding};

/// A document together with the embedding computed for it at index time
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub document: Document,
    pub embedding: Embedding,
}

type EntryMap = BTreeMap<String, Arc<IndexEntry>>;

#[derive(Debug, Default)]
struct IndexState {
    entries: Arc<EntryMap>,
    generation: u64,
    loaded: bool,
}

/// Point-in-time view of the index.
///
/// Iteration is ascending by document identifier and unaffected by writes
/// that happen after the snapshot was taken.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    entries: Arc<EntryMap>,
    generation: u64,
}

impl IndexSnapshot {
    /// Index generation this snapshot was taken at
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in identifier order
    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values().map(Arc::as_ref)
    }

    /// Identifiers in enumeration order
    pub fn ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// In-memory registry of indexed documents
#[derive(Debug, Default)]
pub struct DocumentIndex {
    state: RwLock<IndexState>,
}

impl DocumentIndex {
    /// Create an empty, not yet loaded index
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or atomically replace the entry for `document.id`
    pub fn put(&self, document: Document, embedding: Embedding) {
        let id = document.id.clone();
        let entry = Arc::new(IndexEntry {
            document,
            embedding,
        });

        let mut state = self.write();
        let replaced = Arc::make_mut(&mut state.entries)
            .insert(id.clone(), entry)
            .is_some();
        state.generation += 1;
        debug!(doc_id = %id, replaced, generation = state.generation, "indexed document");
    }

    /// Remove an entry, returning whether it existed
    pub fn remove(&self, id: &str) -> bool {
        let mut state = self.write();
        if !state.entries.contains_key(id) {
            return false;
        }
        Arc::make_mut(&mut state.entries).remove(id);
        state.generation += 1;
        debug!(doc_id = %id, generation = state.generation, "removed document");
        true
    }

    /// Fetch a single entry
    pub fn get(&self, id: &str) -> Option<Arc<IndexEntry>> {
        self.read().entries.get(id).cloned()
    }

    /// Take a consistent snapshot of all entries
    pub fn enumerate(&self) -> IndexSnapshot {
        let state = self.read();
        IndexSnapshot {
            entries: Arc::clone(&state.entries),
            generation: state.generation,
        }
    }

    /// Swap in a whole new set of entries in one step (index rebuild).
    ///
    /// Readers see either the complete old set or the complete new set.
    pub fn replace_all<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (Document, Embedding)>,
    {
        let map: EntryMap = entries
            .into_iter()
            .map(|(document, embedding)| {
                (
                    document.id.clone(),
                    Arc::new(IndexEntry {
                        document,
                        embedding,
                    }),
                )
            })
            .collect();

        let mut state = self.write();
        state.entries = Arc::new(map);
        state.generation += 1;
        state.loaded = true;
        debug!(
            documents = state.entries.len(),
            generation = state.generation,
            "replaced index contents"
        );
    }

    /// Drop every entry; the index stays in its current loaded state
    pub fn clear(&self) {
        let mut state = self.write();
        state.entries = Arc::new(EntryMap::new());
        state.generation += 1;
    }

    /// Record that a corpus load has completed
    pub fn mark_loaded(&self) {
        self.write().loaded = true;
    }

    /// Whether any corpus load has completed
    pub fn is_loaded(&self) -> bool {
        self.read().loaded
    }

    /// Mutation counter, bumped by every put/remove/replace/clear
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }
}
