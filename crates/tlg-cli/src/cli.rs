use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tlg_types::{parse_day, Day};

#[derive(Parser)]
#[command(name = "tlg", about = "Topic ledger: dated topic observations with change tracking", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Ledger root holding the entry and topic directories
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Config file (default: <root>/ledger.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay every entry and regenerate all topic documents
    Rebuild(RebuildArgs),
    /// Validate topic documents and check the rebuild is a no-op
    Verify(VerifyArgs),
    /// Print the seeded pick order for a candidate list
    Sample(SampleArgs),
    /// Run the daily ingestion from local candidate and summary files
    Ingest(IngestArgs),
    /// Show a topic's history
    Show(ShowArgs),
    /// Count documents in the ledger
    Status(StatusArgs),
}

#[derive(Args)]
pub struct RebuildArgs {
    /// Compute and report without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct VerifyArgs {}

#[derive(Args)]
pub struct SampleArgs {
    /// JSON array of {article, rank, views}
    #[arg(long)]
    pub candidates: PathBuf,
    #[arg(short, long, default_value = "1")]
    pub k: usize,
    #[arg(long, conflicts_with = "date")]
    pub seed: Option<u64>,
    /// Derive the seed from this day (default: today)
    #[arg(long, value_parser = parse_day)]
    pub date: Option<Day>,
}

#[derive(Args)]
pub struct IngestArgs {
    /// JSON array of {article, rank, views}
    #[arg(long)]
    pub candidates: PathBuf,
    /// JSON object mapping article names to summaries
    #[arg(long)]
    pub summaries: PathBuf,
    /// Run date (default: today)
    #[arg(long, value_parser = parse_day)]
    pub date: Option<Day>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Topic key or topic document name
    pub topic: String,
}

#[derive(Args)]
pub struct StatusArgs {}
