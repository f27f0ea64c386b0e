// Document index: in-memory registry of documents and their embeddings
//
// Components:
// - Store: copy-on-write map with atomic put/replace and snapshot reads
// - Loader: drives metadata and embedding providers to populate the store

pub mod store;
pub mod loader;

// Re-export key types
pub use store::{DocumentIndex, IndexEntry, IndexSnapshot};
pub use loader::{CorpusLoader, LoadFailure, LoadReport, LoadStage, LoaderConfig};
