//! media-vault CLI tool

#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{DeleteCommand, ReplaceCommand, ShowCommand, StoreCommand};
use media_vault::config::{MediaVaultConfig, DEFAULT_CONFIG_FILE};
use media_vault::observability::{self, ObservabilityConfig};
use media_vault::MediaStorageService;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "media-vault")]
#[command(version)]
#[command(about = "Store, inspect and delete media assets in an object store", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload files as new assets
    Store(StoreCommand),
    /// Print a stored manifest
    Show(ShowCommand),
    /// Upload a file and delete the asset it supersedes
    Replace(ReplaceCommand),
    /// Delete an asset and every object it owns
    Delete(DeleteCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    observability::init_with(&ObservabilityConfig::new("media-vault-cli").with_default_directive("warn"))?;

    let config = MediaVaultConfig::load_from(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let service = MediaStorageService::connect(&config)
        .await
        .context("Failed to connect to object store")?;

    match cli.command {
        Commands::Store(cmd) => cmd.execute(&service).await?,
        Commands::Show(cmd) => cmd.execute(&service).await?,
        Commands::Replace(cmd) => cmd.execute(&service).await?,
        Commands::Delete(cmd) => cmd.execute(&service).await?,
    }

    Ok(())
}
