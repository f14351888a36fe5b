//! File discovery, checksums and batched submission to the retrieval service.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use modbot_core::Document;
use rag::RetrievalService;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::Chunker;

/// Chunks submitted per `add_documents` call.
pub const BATCH_SIZE: usize = 25;

/// Text-like extensions considered for indexing (compared case-insensitively).
pub const INDEXABLE_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "json", "yaml", "yml", "toml", "lua", "ini", "cfg", "csv",
];

/// Outcome of one [`DocumentIndexer::index_path`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub files_indexed: usize,
    /// Empty, unreadable or non-UTF-8 files.
    pub files_skipped: usize,
    pub chunks_indexed: usize,
}

pub fn is_indexable(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| INDEXABLE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

/// Hex SHA-256 of the content.
pub fn checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Deterministic chunk id: hex SHA-256 of `"{path}:{checksum}:{index}"`.
pub fn chunk_id(path: &str, checksum: &str, index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{path}:{checksum}:{index}").as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Indexable files under `root` (or `root` itself when it is a file), sorted for stable runs.
///
/// A single file is returned even if its extension is not in the list.
pub fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let metadata = std::fs::metadata(root).with_context(|| format!("cannot access {}", root.display()))?;
    if metadata.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_indexable(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Turns files into chunk documents and writes them through a [`RetrievalService`].
pub struct DocumentIndexer {
    service: Arc<RetrievalService>,
    chunker: Chunker,
    batch_size: usize,
}

impl DocumentIndexer {
    pub fn new(service: Arc<RetrievalService>) -> Self {
        Self {
            service,
            chunker: Chunker::default(),
            batch_size: BATCH_SIZE,
        }
    }

    pub fn with_chunker(mut self, chunker: Chunker) -> Self {
        self.chunker = chunker;
        self
    }

    /// Chunk documents for one file's content. Metadata: `source`, `checksum`, `chunk_index`.
    pub fn documents_for(&self, source: &str, content: &str) -> Vec<Document> {
        let sum = checksum(content);
        self.chunker
            .chunk(content)
            .into_iter()
            .enumerate()
            .map(|(index, text)| {
                Document::new(chunk_id(source, &sum, index), text)
                    .with_metadata("source", source)
                    .with_metadata("checksum", sum.clone())
                    .with_metadata("chunk_index", index.to_string())
            })
            .collect()
    }

    /// Indexes a directory (recursively) or a single file.
    ///
    /// A failing batch aborts the run; chunks from earlier batches stay stored.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn index_path(&self, path: &Path) -> Result<IndexReport> {
        let files = collect_files(path)?;
        info!(files = files.len(), "step: files discovered");

        let mut report = IndexReport::default();
        let mut pending: Vec<Document> = Vec::new();

        for file in files {
            let content = match tokio::fs::read_to_string(&file).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "Skipping unreadable file");
                    report.files_skipped += 1;
                    continue;
                }
            };
            if content.trim().is_empty() {
                debug!(file = %file.display(), "Skipping empty file");
                report.files_skipped += 1;
                continue;
            }

            let source = file.to_string_lossy();
            let documents = self.documents_for(&source, &content);
            debug!(file = %source, chunks = documents.len(), "file chunked");
            report.files_indexed += 1;
            pending.extend(documents);

            while pending.len() >= self.batch_size {
                let batch: Vec<Document> = pending.drain(..self.batch_size).collect();
                report.chunks_indexed += self.submit(batch).await?;
            }
        }
        if !pending.is_empty() {
            report.chunks_indexed += self.submit(pending).await?;
        }

        info!(
            files_indexed = report.files_indexed,
            files_skipped = report.files_skipped,
            chunks_indexed = report.chunks_indexed,
            "step: indexing done"
        );
        Ok(report)
    }

    async fn submit(&self, batch: Vec<Document>) -> Result<usize> {
        let size = batch.len();
        let added = self
            .service
            .add_documents(batch)
            .await
            .with_context(|| format!("failed to add batch of {size} chunks"))?;
        debug!(size, added, "batch submitted");
        Ok(added)
    }
}
