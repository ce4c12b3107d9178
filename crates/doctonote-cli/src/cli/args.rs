use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "doctonote",
    version,
    about = "Resolve public ratings for doctors listed on booking pages"
)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// YAML config file (defaults to DOCTONOTE_* environment variables)
    #[arg(long, global = true, env = "DOCTONOTE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Rating backend base URL
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Rating store file
    #[arg(long, global = true, conflicts_with = "memory")]
    pub store: Option<PathBuf>,

    /// Keep ratings in memory for this run only
    #[arg(long, global = true)]
    pub memory: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve the rating of one doctor
    Resolve(ResolveArgs),
    /// Resolve a listing file of cards, one at a time
    Batch(BatchArgs),
    /// Inspect the rating cache
    Cache(CacheArgs),
    /// Re-resolve a listing file whenever it changes, until Ctrl-C
    Watch(WatchArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub address: String,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit non-zero when the backend failed and the fallback was served
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// JSON array of `{ "elementId", "name", "address" }` cards
    pub file: PathBuf,

    /// Delay between items in milliseconds (overrides config)
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Print one JSON object per rendered card
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// JSON array of `{ "elementId", "name", "address" }` cards
    pub file: PathBuf,

    /// How often the file is checked, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub poll_ms: u64,

    /// Print one JSON object per rendered card
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub cmd: CacheCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CacheCommand {
    /// List cached entries
    List {
        #[arg(long)]
        json: bool,
    },
}
