//! clipbase command line entry point.
//!
//! Reads a page capture as JSON (from a file or stdin), saves it through the
//! pipeline, and manages the local inbox. Logging goes to stderr so stdout
//! stays machine-readable JSON.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use clipbase_client::capture::PageCapture;
use clipbase_client::pipeline::{InboxSync, Pipeline, SaveOutcome};
use clipbase_core::AppConfig;
use clipbase_core::inbox::{InboxDb, InboxLimits};

#[derive(Parser)]
#[command(name = "clipbase", version, about = "Save captured web pages into a Feishu Bitable base")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Save a capture; reads capture JSON from a file or stdin
    Save {
        /// Path to a capture JSON file (stdin when omitted)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List inbox items, newest first
    List,
    /// Remove an inbox item by id
    Remove { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    match cli.command {
        Command::Save { file } => save(&config, file).await,
        Command::List => list(&config).await,
        Command::Remove { id } => remove(&config, &id).await,
    }
}

async fn save(config: &AppConfig, file: Option<PathBuf>) -> Result<()> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading capture from stdin")?;
            buf
        }
    };
    let capture: PageCapture = serde_json::from_str(&raw).context("parsing capture JSON")?;

    let pipeline = Pipeline::from_config(config).await.map_err(surface_detail)?;

    match pipeline.save(&capture).await.map_err(surface_detail)? {
        SaveOutcome::Saved { record, inbox } => {
            let inbox_status = match inbox {
                InboxSync::Synced(_) => "synced",
                InboxSync::Failed(_) => "failed",
            };
            println!(
                "{}",
                serde_json::json!({
                    "status": "saved",
                    "record_id": record.record_id,
                    "inbox": inbox_status,
                })
            );
        }
        SaveOutcome::Duplicate(item) => {
            println!("{}", serde_json::json!({ "status": "duplicate", "item": item }));
        }
    }
    Ok(())
}

async fn list(config: &AppConfig) -> Result<()> {
    let inbox = open_inbox(config).await?;
    let items = inbox.list().await?;
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}

async fn remove(config: &AppConfig, id: &str) -> Result<()> {
    let inbox = open_inbox(config).await?;
    if inbox.remove(id).await? {
        tracing::info!(id, "inbox item removed");
    } else {
        anyhow::bail!("no inbox item with id {id}");
    }
    Ok(())
}

async fn open_inbox(config: &AppConfig) -> Result<InboxDb> {
    let inbox = InboxDb::open(
        &config.inbox_db_path,
        InboxLimits { max_items: config.inbox_max_items, max_age: config.inbox_max_age() },
    )
    .await?;
    Ok(inbox)
}

/// Print the diagnostic detail block to stderr before bubbling the error up.
fn surface_detail(err: clipbase_core::Error) -> anyhow::Error {
    if let Some(detail) = err.detail() {
        eprintln!("--- details ---\n{detail}");
    }
    anyhow::Error::new(err)
}
