//! # RAG
//!
//! Retrieval-augmented generation support: embeds questions, searches a vector collection, and
//! keeps only neighbours within the relevance threshold.
//!
//! - [`VectorStore`]: the vector backend seam; [`ChromaClient`] speaks its HTTP/JSON API.
//! - [`RetrievalService`]: owns the lazily resolved collection handle and the threshold.
//! - [`Retriever`]: the narrow query interface the pipeline depends on.
//!
//! Distances are cosine distances: 0 is identical, 2 is opposite.

use async_trait::async_trait;
use modbot_core::{Document, DocumentMetadata};

mod chroma;
mod error;
mod service;

pub use chroma::{ChromaClient, DEFAULT_VECTOR_DB_URL};
pub use error::RagError;
pub use service::{RetrievalService, DEFAULT_COLLECTION_NAME, DEFAULT_RELEVANCE_THRESHOLD};

/// One neighbour returned by a similarity search, in backend ranking order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub id: String,
    pub text: String,
    /// Cosine distance to the query.
    pub distance: f32,
    pub metadata: DocumentMetadata,
}

/// A document paired with its embedding, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedDocument {
    pub document: Document,
    pub embedding: Vec<f32>,
}

/// Vector backend operations. Collection ids are opaque strings issued by the backend.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Looks a collection up by name; [`RagError::NotFound`] when absent.
    async fn get_collection(&self, name: &str) -> Result<String, RagError>;

    /// Creates a cosine-distance collection; [`RagError::AlreadyExists`] when another caller won the race.
    async fn create_collection(&self, name: &str) -> Result<String, RagError>;

    /// Nearest neighbours of `embedding`, closest first.
    async fn query(
        &self,
        collection_id: &str,
        embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<ScoredDocument>, RagError>;

    async fn add(&self, collection_id: &str, documents: &[EmbeddedDocument]) -> Result<(), RagError>;

    async fn delete(&self, collection_id: &str, ids: &[String]) -> Result<(), RagError>;

    async fn count(&self, collection_id: &str) -> Result<usize, RagError>;
}

/// Question → relevant snippet texts. Implemented by [`RetrievalService`]; substituted in tests.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, question: &str, top_n: usize) -> Result<Vec<String>, RagError>;
}
