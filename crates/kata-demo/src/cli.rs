use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kata-demo")]
#[command(about = "Ready-made hooks built on kata", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to engine config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default engine config file
    Init {
        /// Path for new config file
        #[arg(default_value = "kata.toml")]
        path: PathBuf,
    },
    /// PreToolUse hook denying reads of .env files
    PreRead,
    /// Stop hook that reports back after background work
    AsyncStop {
        /// Simulated background work
        #[arg(long, default_value = "2000")]
        delay_ms: u64,
        /// Timeout announced to the host
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// SessionStart hook refreshing the plugin marketplace in the background
    MarketplaceUpdate {
        /// Host CLI to invoke
        #[arg(long, default_value = "claude")]
        program: String,
    },
}
