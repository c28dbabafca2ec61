use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "tunekeeper")]
#[command(about = "Keeps a music folder tree and its media library in line", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ./Config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check rules, prune, import, rebuild playlists and sync devices
    Run,
    /// Check library and filesystem rules without changing anything
    Check,
    /// Trigger sync on every attached device
    Sync,
    /// Print configuration values
    PrintConfig,
}
