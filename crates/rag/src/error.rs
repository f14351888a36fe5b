use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    /// Collection (or the addressed resource) does not exist. Queries treat this as zero results.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Collection already exists: {0}")]
    AlreadyExists(String),

    #[error("Vector backend error ({status}) during {operation}: {body}")]
    Http {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("Vector backend transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Every document in a batch failed to embed.
    #[error("No documents could be embedded ({0} attempted)")]
    NoDocuments(usize),

    #[error("Malformed backend response: {0}")]
    Decode(String),
}
