//! Retrieval service: lazily resolved collection handle plus relevance-filtered search.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use embedding::EmbeddingService;
use modbot_core::Document;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::{EmbeddedDocument, RagError, Retriever, ScoredDocument, VectorStore};

/// Default collection name.
pub const DEFAULT_COLLECTION_NAME: &str = "mod_docs";

/// Maximum accepted cosine distance. Permissive: favours recall over precision.
pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 1.2;

/// Owns the collection handle for its lifetime. The handle is resolved at most once, on first use,
/// even when several callers race; afterwards every caller reuses it.
pub struct RetrievalService {
    store: Arc<dyn VectorStore>,
    embedding_service: Arc<dyn EmbeddingService>,
    collection_name: String,
    collection_id: RwLock<Option<String>>,
    /// f32 bits; read by every query, written by [`set_relevance_threshold`](Self::set_relevance_threshold).
    relevance_threshold: AtomicU32,
}

impl RetrievalService {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedding_service: Arc<dyn EmbeddingService>,
        collection_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            embedding_service,
            collection_name: collection_name.into(),
            collection_id: RwLock::new(None),
            relevance_threshold: AtomicU32::new(DEFAULT_RELEVANCE_THRESHOLD.to_bits()),
        }
    }

    pub fn with_relevance_threshold(self, threshold: f32) -> Self {
        self.set_relevance_threshold(threshold);
        self
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Maximum accepted distance (0 = identical, larger = less similar).
    pub fn relevance_threshold(&self) -> f32 {
        f32::from_bits(self.relevance_threshold.load(Ordering::Relaxed))
    }

    pub fn set_relevance_threshold(&self, threshold: f32) {
        info!(threshold, "Relevance threshold updated");
        self.relevance_threshold.store(threshold.to_bits(), Ordering::Relaxed);
    }

    /// Returns the cached collection id, resolving it on first use.
    ///
    /// Fast path: shared lock, return the cached id. Slow path: exclusive lock, re-check (another
    /// caller may have finished while this one waited), then get-by-name, create on not-found, and
    /// retry the get once if the create lost a race.
    pub async fn ensure_collection(&self) -> Result<String, RagError> {
        if let Some(id) = self.collection_id.read().await.as_ref() {
            return Ok(id.clone());
        }

        let mut guard = self.collection_id.write().await;
        if let Some(id) = guard.as_ref() {
            return Ok(id.clone());
        }

        let id = self.resolve_collection().await?;
        info!(collection = %self.collection_name, id = %id, "step: collection handle cached");
        *guard = Some(id.clone());
        Ok(id)
    }

    async fn resolve_collection(&self) -> Result<String, RagError> {
        match self.store.get_collection(&self.collection_name).await {
            Ok(id) => Ok(id),
            Err(RagError::NotFound(_)) => {
                info!(collection = %self.collection_name, "Collection not found, creating");
                match self.store.create_collection(&self.collection_name).await {
                    Ok(id) => Ok(id),
                    Err(RagError::AlreadyExists(_)) => {
                        debug!(collection = %self.collection_name, "Lost create race, re-reading collection");
                        self.store.get_collection(&self.collection_name).await
                    }
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Neighbours of `question` within the relevance threshold, in backend ranking order.
    ///
    /// A missing collection, an empty query embedding or an empty result is zero documents, not an
    /// error.
    #[instrument(skip(self, question), fields(query_len = question.len()))]
    pub async fn query_documents(&self, question: &str, top_n: usize) -> Result<Vec<ScoredDocument>, RagError> {
        let collection_id = self.ensure_collection().await?;

        let query_embedding = self
            .embedding_service
            .embed(question)
            .await
            .map_err(|e| RagError::Embedding(format!("{e:#}")))?;
        if query_embedding.is_empty() {
            warn!(collection = %self.collection_name, "Query embedding is empty, returning no results");
            return Ok(Vec::new());
        }
        debug!(dimension = query_embedding.len(), "step: query embedding done");

        let scored = match self.store.query(&collection_id, &query_embedding, top_n).await {
            Ok(rows) => rows,
            Err(RagError::NotFound(_)) => {
                warn!(collection = %self.collection_name, "Collection missing at query time, returning no results");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let threshold = self.relevance_threshold();
        let count_before = scored.len();
        if count_before > 0 {
            let distances: Vec<f32> = scored.iter().map(|d| d.distance).collect();
            let min_d = distances.iter().cloned().fold(f32::NAN, f32::min);
            let max_d = distances.iter().cloned().fold(f32::NAN, f32::max);
            let mean_d = distances.iter().sum::<f32>() / distances.len() as f32;
            info!(
                count = count_before,
                distance_min = %min_d,
                distance_mean = %mean_d,
                distance_max = %max_d,
                threshold,
                "step: similarity search distance distribution"
            );
        }

        // Strict rejection above the threshold, inclusive at it. NaN distances never pass.
        let kept: Vec<ScoredDocument> = scored
            .into_iter()
            .filter(|d| d.distance <= threshold)
            .collect();

        if count_before > 0 && kept.is_empty() {
            warn!(
                threshold,
                count_before,
                "All neighbours above relevance threshold, no documents kept"
            );
        }
        for (i, doc) in kept.iter().enumerate() {
            debug!(
                index = i,
                id = %doc.id,
                distance = doc.distance,
                source = ?doc.metadata.get("source"),
                "retrieved document"
            );
        }
        info!(kept = kept.len(), count_before, "step: retrieval done");
        Ok(kept)
    }

    /// Texts of [`query_documents`](Self::query_documents).
    pub async fn query(&self, question: &str, top_n: usize) -> Result<Vec<String>, RagError> {
        Ok(self
            .query_documents(question, top_n)
            .await?
            .into_iter()
            .map(|d| d.text)
            .collect())
    }

    /// Embeds each document individually and writes the successes as one batch.
    ///
    /// Individual embedding failures, including empty vectors, are logged and skipped. Returns the number written; fails
    /// when documents were given but none could be embedded.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn add_documents(&self, documents: Vec<Document>) -> Result<usize, RagError> {
        if documents.is_empty() {
            return Ok(0);
        }
        let collection_id = self.ensure_collection().await?;
        let attempted = documents.len();

        let mut embedded = Vec::with_capacity(attempted);
        for document in documents {
            match self.embedding_service.embed(&document.text).await {
                Ok(embedding) if embedding.is_empty() => warn!(
                    id = %document.id,
                    source = ?document.source(),
                    "Empty embedding, skipping document"
                ),
                Ok(embedding) => embedded.push(EmbeddedDocument { document, embedding }),
                Err(e) => warn!(
                    id = %document.id,
                    source = ?document.source(),
                    error = %e,
                    "Embedding failed, skipping document"
                ),
            }
        }

        if embedded.is_empty() {
            return Err(RagError::NoDocuments(attempted));
        }

        self.store.add(&collection_id, &embedded).await?;
        info!(added = embedded.len(), attempted, "step: documents added");
        Ok(embedded.len())
    }

    pub async fn delete_document(&self, id: &str) -> Result<(), RagError> {
        let collection_id = self.ensure_collection().await?;
        self.store.delete(&collection_id, &[id.to_string()]).await?;
        info!(id = %id, "Document deleted");
        Ok(())
    }

    pub async fn count(&self) -> Result<usize, RagError> {
        let collection_id = self.ensure_collection().await?;
        self.store.count(&collection_id).await
    }
}

#[async_trait]
impl Retriever for RetrievalService {
    async fn retrieve(&self, question: &str, top_n: usize) -> Result<Vec<String>, RagError> {
        self.query(question, top_n).await
    }
}
