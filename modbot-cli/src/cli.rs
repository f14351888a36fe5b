//! CLI parser.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "modbot")]
#[command(about = "Mod community Q&A bot: ask, classify, index docs, manage quotas", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Answer a question through the full pipeline (rate limit, retrieval, generation).
    Ask {
        /// User identifier the quota is charged to.
        #[arg(short, long, default_value = "cli")]
        user: String,
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Print the intent assigned to a message.
    Classify {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Index a documentation directory or a single file into the collection.
    Index { path: PathBuf },
    /// Number of chunks stored in the collection.
    Count,
    /// Delete one stored chunk by id.
    Delete { id: String },
    /// Show a user's request count in the current window.
    Quota { user: String },
    /// Clear a user's request counter.
    ResetQuota { user: String },
}
