//! Offline inspection of a message log.
//!
//! Parses every line with the same codec the HTTP server uses and prints the resulting records
//! as pretty JSON, optionally keeping only one source label.
use anyhow::{Context, Result};
use clap::Parser;
use postlog::{
    config::Config,
    logging,
    records::{AppendLogStore, Record, codec},
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "postlog-entries",
    about = "Print the parsed entries of a message log"
)]
struct Cli {
    /// Message log to read (defaults to `POSTLOG_MESSAGE_LOG`, then `log.txt`).
    #[arg(long)]
    log: Option<PathBuf>,
    /// Keep only entries with this source label, e.g. `Assistente` or `Usuário`.
    #[arg(long)]
    source: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_stderr_tracing();
    dotenvy::dotenv().ok();

    let path = match cli.log {
        Some(path) => path,
        None => Config::from_env()?.message_log_path,
    };
    let store = AppendLogStore::new(&path);
    let lines = store
        .read_all()
        .await
        .with_context(|| format!("failed to read message log at {}", path.display()))?;

    let entries: Vec<Record> = lines
        .iter()
        .map(|line| codec::parse_line(line))
        .filter(|entry| {
            cli.source
                .as_deref()
                .is_none_or(|source| entry.source == source)
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
