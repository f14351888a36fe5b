//! Core types: intent, response mode, and stored documents.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse category assigned to a user query; decides whether retrieval runs and which mode answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Mod or technical question; the only intent that triggers retrieval.
    Knowledge,
    /// Greetings, filler, small talk.
    Conversational,
    /// Questions about where things live on the server (channels).
    Navigation,
    /// Account linking and verification.
    AccountHelp,
    /// Questions about the bot itself or where the user is.
    Identity,
}

impl Intent {
    /// Whether answering this intent benefits from retrieved documentation.
    pub fn needs_retrieval(self) -> bool {
        matches!(self, Intent::Knowledge)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Knowledge => "knowledge",
            Intent::Conversational => "conversational",
            Intent::Navigation => "navigation",
            Intent::AccountHelp => "account_help",
            Intent::Identity => "identity",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation mode; each owns a system prompt and a fixed parameter bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseMode {
    /// Short replies for chat, navigation and account help.
    Fast,
    /// Mid-length answers without retrieved context.
    Standard,
    /// Long answers grounded in retrieved snippets.
    Deep,
}

impl ResponseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseMode::Fast => "fast",
            ResponseMode::Standard => "standard",
            ResponseMode::Deep => "deep",
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered metadata attached to a stored document. At minimum carries `source`.
pub type DocumentMetadata = BTreeMap<String, String>;

/// A unit of text stored in the vector backend. `id` is caller-assigned and globally unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: DocumentMetadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The `source` metadata field, used in diagnostics.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_knowledge_needs_retrieval() {
        assert!(Intent::Knowledge.needs_retrieval());
        for intent in [
            Intent::Conversational,
            Intent::Navigation,
            Intent::AccountHelp,
            Intent::Identity,
        ] {
            assert!(!intent.needs_retrieval(), "{intent} should not retrieve");
        }
    }

    #[test]
    fn document_metadata_is_ordered_and_exposes_source() {
        let doc = Document::new("a", "text")
            .with_metadata("source", "docs/metabolism.md")
            .with_metadata("chunk_index", "0");
        assert_eq!(doc.source(), Some("docs/metabolism.md"));
        let keys: Vec<&str> = doc.metadata.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["chunk_index", "source"]);

        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"id\":\"a\""));
    }
}
