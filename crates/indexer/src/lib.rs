//! # Indexer
//!
//! Loads documentation files into the retrieval collection: walk → filter by extension →
//! checksum → overlapping character chunks → deterministic ids → batched writes.
//!
//! Re-indexing unchanged content produces the same chunk ids, so repeated runs overwrite rather
//! than duplicate.

mod chunker;
mod indexer;

pub use chunker::{Chunker, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
pub use indexer::{
    checksum, chunk_id, collect_files, is_indexable, DocumentIndexer, IndexReport, BATCH_SIZE,
    INDEXABLE_EXTENSIONS,
};
