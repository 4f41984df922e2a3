//! audioscan CLI
//!
//! `scan` emits one JSON object per file plus a summary; `write` applies tag
//! fields to every candidate file under the root and reports counts. Logs go
//! to stderr so stdout stays machine-readable.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use audioscan::{human, scan_directory, write_directory, ScanOptions, ScanSummary, WriteRequest};

#[derive(Parser)]
#[command(name = "audioscan", version, about = "Audio metadata scanner and tag writer")]
struct Cli {
    /// Path to a TOML options file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a directory tree and emit metadata records as JSON lines
    Scan {
        /// Root directory to scan
        directory: PathBuf,

        /// Worker pool size
        #[arg(long, env = "AUDIOSCAN_WORKERS")]
        workers: Option<usize>,

        /// Skip the cover art resolver
        #[arg(long)]
        no_cover_art: bool,
    },
    /// Write tag fields to every audio file under a directory
    Write {
        /// Root directory to process
        directory: PathBuf,

        #[command(flatten)]
        fields: WriteFields,
    },
}

#[derive(Args)]
struct WriteFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    artist: Option<String>,
    #[arg(long)]
    album: Option<String>,
    #[arg(long)]
    year: Option<String>,
    #[arg(long)]
    genre: Option<String>,
    #[arg(long)]
    comment: Option<String>,
}

impl From<WriteFields> for WriteRequest {
    fn from(fields: WriteFields) -> Self {
        WriteRequest {
            title: fields.title,
            artist: fields.artist,
            album: fields.album,
            year: fields.year,
            genre: fields.genre,
            comment: fields.comment,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut options = match &cli.config {
        Some(path) => ScanOptions::load(path)?,
        None => ScanOptions::default(),
    };

    match cli.command {
        Command::Scan {
            directory,
            workers,
            no_cover_art,
        } => {
            if let Some(workers) = workers {
                options.max_workers = workers;
            }
            if no_cover_art {
                options.extract_cover_art = false;
            }

            let results = scan_directory(&directory, &options).await?;
            for result in &results {
                println!("{}", serde_json::to_string(result)?);
            }

            let summary = ScanSummary::from_results(&results);
            info!(
                files = summary.total_files,
                degraded = summary.degraded_files,
                total_size = %human::format_size(summary.total_size),
                "Scan complete"
            );
            println!("{}", serde_json::to_string(&summary)?);
        }
        Command::Write { directory, fields } => {
            let request: WriteRequest = fields.into();
            let (outcomes, summary) = write_directory(&directory, &request, &options).await?;
            for (path, outcome) in &outcomes {
                info!(file = %path.display(), outcome = ?outcome, "Write outcome");
            }
            println!("{}", serde_json::to_string(&summary)?);
        }
    }

    Ok(())
}
