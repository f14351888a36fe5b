//! modbot CLI: ask questions, classify text, index documentation, manage quotas.
//! Config from env (and `.env`).

use anyhow::Result;
use clap::Parser;
use indexer::DocumentIndexer;
use modbot_cli::{Cli, Commands};
use modbot_core::init_tracing;
use pipeline::{build_components, Answer, BotConfig};
use tracing::error;

const MSG_GENERATION_FAILED: &str = "Sorry, I couldn't come up with an answer right now. Please try again later.";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Commands::Classify { text } = &cli.command {
        println!("{}", intent::classify(&text.join(" ")));
        return Ok(());
    }

    let config = BotConfig::load()?;
    init_tracing(&config.log_file)?;
    let components = build_components(&config).await?;

    match cli.command {
        Commands::Ask { user, question } => {
            let pipeline = components.pipeline();
            match pipeline.answer(&user, &question.join(" ")).await {
                Ok(Answer::Replied { text, intent, mode }) => {
                    println!("{text}");
                    eprintln!("[intent={intent} mode={mode}]");
                }
                Ok(Answer::RateLimited { reset_in, .. }) => {
                    println!("You're sending messages too quickly. Try again in {}s.", reset_in.as_secs());
                }
                Err(modbot_core::BotError::Generation(e)) => {
                    error!(error = %e, "Generation failed");
                    println!("{MSG_GENERATION_FAILED}");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Index { path } => {
            let indexer = DocumentIndexer::new(components.retrieval.clone());
            let report = indexer.index_path(&path).await?;
            println!(
                "Indexed {} files ({} chunks), skipped {}",
                report.files_indexed, report.chunks_indexed, report.files_skipped
            );
        }
        Commands::Count => {
            println!("{}", components.document_count().await?);
        }
        Commands::Delete { id } => {
            components.delete_document(&id).await?;
            println!("Deleted {id}");
        }
        Commands::Quota { user } => {
            let count = components.rate_limiter.get_count(&user).await?;
            println!("{user}: {count}/{} requests in the current window", components.rate_limiter.limit());
        }
        Commands::ResetQuota { user } => {
            components.rate_limiter.reset(&user).await?;
            println!("Reset quota for {user}");
        }
        Commands::Classify { .. } => {}
    }
    Ok(())
}
