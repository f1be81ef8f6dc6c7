mod cli;
mod config;
mod hooks;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    kata_sdk::init_logging();

    let cli = Cli::parse();

    let definition = match cli.command {
        Commands::Init { path } => return config::run_init(&path),
        Commands::PreRead => hooks::pre_read::definition()?,
        Commands::AsyncStop {
            delay_ms,
            timeout_ms,
        } => hooks::async_stop::definition(delay_ms, timeout_ms)?,
        Commands::MarketplaceUpdate { program } => hooks::marketplace::definition(program)?,
    };

    let config = config::load(cli.config.as_deref())?;
    tracing::debug!(config = ?config, "Running hook");
    kata_sdk::run_hook_with_config(definition, config).await;
    Ok(())
}
