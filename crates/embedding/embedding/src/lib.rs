//! # Text Embeddings
//!
//! Defines the embedding service interface used by retrieval and indexing.
//!
//! Vectors are compared with cosine distance downstream, so implementations only need to be
//! consistent: the same model must embed both stored documents and queries.
//!
//! ```rust
//! use embedding::EmbeddingService;
//!
//! async fn example(service: &impl EmbeddingService) -> Result<(), anyhow::Error> {
//!     let embedding = service.embed("How does hunger decay?").await?;
//!     println!("Embedding dimension: {}", embedding.len());
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;

/// Service for generating text embeddings.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Generates an embedding vector for a single text string.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error>;

    /// Generates embedding vectors for multiple texts, in input order.
    ///
    /// The default embeds one text at a time and fails on the first error; callers that need
    /// per-item failure handling should call [`embed`](Self::embed) directly.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}
