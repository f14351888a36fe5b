//! Tests for `RetrievalService` with an in-process mock vector store and mock embedding service.
//!
//! Covers: single collection resolution under concurrency, create-race retry, threshold filtering,
//! missing-collection queries, empty embeddings, and partial embedding failures when adding
//! documents.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use embedding::EmbeddingService;
use modbot_core::Document;
use rag::{EmbeddedDocument, RagError, RetrievalService, Retriever, ScoredDocument, VectorStore};

/// Embeds to a fixed vector; texts containing "FAIL" error out and "EMPTY" embed to nothing.
struct MockEmbeddingService {
    calls: AtomicUsize,
}

impl MockEmbeddingService {
    fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl EmbeddingService for MockEmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.contains("FAIL") {
            anyhow::bail!("embedding backend unavailable");
        }
        if text.contains("EMPTY") {
            return Ok(Vec::new());
        }
        Ok(vec![0.1; 8])
    }
}

#[derive(Clone, Copy, PartialEq)]
enum CollectionState {
    Exists,
    Missing,
    /// Create reports AlreadyExists; the following get succeeds.
    RaceLost,
}

/// Mock store: counts collection lookups/creates, returns scripted neighbours, records adds.
struct MockStore {
    state: Mutex<CollectionState>,
    get_calls: AtomicUsize,
    create_calls: AtomicUsize,
    neighbours: Vec<ScoredDocument>,
    query_calls: AtomicUsize,
    query_not_found: bool,
    added: Mutex<Vec<EmbeddedDocument>>,
    deleted: Mutex<Vec<String>>,
}

impl MockStore {
    fn new(state: CollectionState) -> Self {
        Self {
            state: Mutex::new(state),
            get_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            neighbours: Vec::new(),
            query_calls: AtomicUsize::new(0),
            query_not_found: false,
            added: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    fn with_neighbours(mut self, neighbours: &[(&str, f32)]) -> Self {
        self.neighbours = neighbours
            .iter()
            .map(|(text, distance)| ScoredDocument {
                id: format!("id-{text}"),
                text: text.to_string(),
                distance: *distance,
                metadata: Default::default(),
            })
            .collect();
        self
    }
}

#[async_trait]
impl VectorStore for MockStore {
    async fn get_collection(&self, name: &str) -> Result<String, RagError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        // Give racing callers time to pile up on the lock.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let state = *self.state.lock().unwrap();
        match state {
            CollectionState::Exists => Ok("col-1".to_string()),
            CollectionState::Missing => Err(RagError::NotFound(name.to_string())),
            CollectionState::RaceLost => {
                if self.create_calls.load(Ordering::SeqCst) > 0 {
                    Ok("col-raced".to_string())
                } else {
                    Err(RagError::NotFound(name.to_string()))
                }
            }
        }
    }

    async fn create_collection(&self, name: &str) -> Result<String, RagError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        match *state {
            CollectionState::RaceLost => Err(RagError::AlreadyExists(name.to_string())),
            _ => {
                *state = CollectionState::Exists;
                Ok("col-new".to_string())
            }
        }
    }

    async fn query(&self, _id: &str, _embedding: &[f32], n: usize) -> Result<Vec<ScoredDocument>, RagError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        if self.query_not_found {
            return Err(RagError::NotFound("col-1".to_string()));
        }
        Ok(self.neighbours.iter().take(n).cloned().collect())
    }

    async fn add(&self, _id: &str, documents: &[EmbeddedDocument]) -> Result<(), RagError> {
        self.added.lock().unwrap().extend_from_slice(documents);
        Ok(())
    }

    async fn delete(&self, _id: &str, ids: &[String]) -> Result<(), RagError> {
        self.deleted.lock().unwrap().extend_from_slice(ids);
        Ok(())
    }

    async fn count(&self, _id: &str) -> Result<usize, RagError> {
        Ok(self.added.lock().unwrap().len())
    }
}

fn service(store: Arc<MockStore>) -> (RetrievalService, Arc<MockEmbeddingService>) {
    let embedder = Arc::new(MockEmbeddingService::new());
    (RetrievalService::new(store, embedder.clone(), "mod_docs"), embedder)
}

/// **Test: 16 concurrent first uses resolve the collection exactly once and all see the same id.**
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ensure_collection_resolves_once_under_concurrency() {
    let store = Arc::new(MockStore::new(CollectionState::Exists));
    let (service, _) = service(store.clone());
    let service = Arc::new(service);

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let service = service.clone();
        tasks.push(tokio::spawn(async move { service.ensure_collection().await.unwrap() }));
    }
    let mut ids = HashSet::new();
    for task in tasks {
        ids.insert(task.await.unwrap());
    }

    assert_eq!(ids.len(), 1);
    assert_eq!(store.get_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);

    service.ensure_collection().await.unwrap();
    assert_eq!(store.get_calls.load(Ordering::SeqCst), 1);
}

/// **Test: a missing collection is created once and the created id is cached.**
#[tokio::test]
async fn ensure_collection_creates_when_missing() {
    let store = Arc::new(MockStore::new(CollectionState::Missing));
    let (service, _) = service(store.clone());

    assert_eq!(service.ensure_collection().await.unwrap(), "col-new");
    assert_eq!(service.ensure_collection().await.unwrap(), "col-new");
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.get_calls.load(Ordering::SeqCst), 1);
}

/// **Test: losing the create race ("already exists") falls back to one more get.**
#[tokio::test]
async fn ensure_collection_retries_get_after_create_race() {
    let store = Arc::new(MockStore::new(CollectionState::RaceLost));
    let (service, _) = service(store.clone());

    assert_eq!(service.ensure_collection().await.unwrap(), "col-raced");
    assert_eq!(store.get_calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);
}

/// **Test: documents beyond the threshold are dropped whatever their rank; the boundary is kept.**
#[tokio::test]
async fn query_filters_by_threshold_and_keeps_order() {
    let store = Arc::new(
        MockStore::new(CollectionState::Exists).with_neighbours(&[
            ("close", 0.2),
            ("far", 0.9),
            ("boundary", 0.5),
            ("farther", 1.4),
        ]),
    );
    let (service, _) = service(store);
    service.set_relevance_threshold(0.5);

    let texts = service.query("how does hunger work", 10).await.unwrap();
    assert_eq!(texts, vec!["close".to_string(), "boundary".to_string()]);
}

#[tokio::test]
async fn query_respects_top_n() {
    let store = Arc::new(
        MockStore::new(CollectionState::Exists).with_neighbours(&[("a", 0.1), ("b", 0.2), ("c", 0.3)]),
    );
    let (service, _) = service(store);
    assert_eq!(service.query("q", 2).await.unwrap(), vec!["a", "b"]);
}

#[tokio::test]
async fn default_threshold_is_permissive() {
    let store = Arc::new(MockStore::new(CollectionState::Exists).with_neighbours(&[("a", 1.1), ("b", 1.3)]));
    let (service, _) = service(store);
    assert_eq!(service.relevance_threshold(), rag::DEFAULT_RELEVANCE_THRESHOLD);
    assert_eq!(service.query("q", 5).await.unwrap(), vec!["a"]);
}

/// **Test: a collection that vanished at query time yields zero results, not an error.**
#[tokio::test]
async fn query_not_found_is_empty() {
    let mut store = MockStore::new(CollectionState::Exists).with_neighbours(&[("a", 0.1)]);
    store.query_not_found = true;
    let (service, _) = service(Arc::new(store));
    assert!(service.query("q", 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn query_surfaces_embedding_failure() {
    let store = Arc::new(MockStore::new(CollectionState::Exists));
    let (service, _) = service(store);
    let err = service.query("please FAIL", 3).await.unwrap_err();
    assert!(matches!(err, RagError::Embedding(_)));
}

/// **Test: an empty query embedding yields zero results without querying the store.**
#[tokio::test]
async fn query_with_empty_embedding_is_empty() {
    let store = Arc::new(MockStore::new(CollectionState::Exists).with_neighbours(&[("a", 0.1)]));
    let (service, embedder) = service(store.clone());

    assert!(service.query("EMPTY question", 3).await.unwrap().is_empty());
    assert!(service.retrieve("EMPTY question", 3).await.unwrap().is_empty());
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.query_calls.load(Ordering::SeqCst), 0);
}

/// **Test: a document whose embedding comes back empty is skipped like a failed one.**
#[tokio::test]
async fn add_documents_skips_empty_embeddings() {
    let store = Arc::new(MockStore::new(CollectionState::Exists));
    let (service, _) = service(store.clone());

    let added = service
        .add_documents(vec![Document::new("1", "EMPTY body"), Document::new("2", "hunger decays hourly")])
        .await
        .unwrap();
    assert_eq!(added, 1);
    let ids: Vec<String> = store.added.lock().unwrap().iter().map(|d| d.document.id.clone()).collect();
    assert_eq!(ids, vec!["2"]);

    let err = service
        .add_documents(vec![Document::new("3", "EMPTY again")])
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::NoDocuments(1)));
}

/// **Test: one failed embedding is skipped; the rest are written as a single batch.**
#[tokio::test]
async fn add_documents_skips_failed_embeddings() {
    let store = Arc::new(MockStore::new(CollectionState::Exists));
    let (service, embedder) = service(store.clone());

    let docs = vec![
        Document::new("1", "hunger decays hourly").with_metadata("source", "a.md"),
        Document::new("2", "FAIL here").with_metadata("source", "b.md"),
        Document::new("3", "thirst decays faster").with_metadata("source", "c.md"),
    ];
    let added = service.add_documents(docs).await.unwrap();

    assert_eq!(added, 2);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
    let ids: Vec<String> = store.added.lock().unwrap().iter().map(|d| d.document.id.clone()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(service.count().await.unwrap(), 2);
}

#[tokio::test]
async fn add_documents_fails_when_nothing_embeds() {
    let store = Arc::new(MockStore::new(CollectionState::Exists));
    let (service, _) = service(store.clone());
    let err = service
        .add_documents(vec![Document::new("1", "FAIL"), Document::new("2", "FAIL too")])
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::NoDocuments(2)));
    assert!(store.added.lock().unwrap().is_empty());
}

#[tokio::test]
async fn add_documents_empty_input_is_noop() {
    let store = Arc::new(MockStore::new(CollectionState::Exists));
    let (service, _) = service(store.clone());
    assert_eq!(service.add_documents(Vec::new()).await.unwrap(), 0);
    assert_eq!(store.get_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn delete_passes_through() {
    let store = Arc::new(MockStore::new(CollectionState::Exists));
    let (service, _) = service(store.clone());
    service.delete_document("chunk-9").await.unwrap();
    assert_eq!(*store.deleted.lock().unwrap(), vec!["chunk-9".to_string()]);
}

#[tokio::test]
async fn retriever_trait_delegates_to_query() {
    let store = Arc::new(MockStore::new(CollectionState::Exists).with_neighbours(&[("a", 0.1)]));
    let (service, _) = service(store);
    let retriever: &dyn Retriever = &service;
    assert_eq!(retriever.retrieve("q", 3).await.unwrap(), vec!["a"]);
}
