//! Replace command

use super::{read_upload, INFO, SUCCESS};
use anyhow::{Context, Result};
use clap::Args;
use console::style;
use media_vault::{MediaKind, MediaStorageService};
use std::path::PathBuf;

/// Upload a file, then delete the asset it supersedes
#[derive(Debug, Args)]
pub struct ReplaceCommand {
    /// Manifest key of the asset being replaced
    pub manifest_key: String,

    /// Media kind of the new file
    #[arg(short, long)]
    pub kind: MediaKind,

    /// Logical purpose of the new file
    #[arg(short, long)]
    pub purpose: String,

    /// Content type; guessed from the file name when omitted
    #[arg(long)]
    pub content_type: Option<String>,

    /// Replacement file
    pub file: PathBuf,
}

impl ReplaceCommand {
    /// Execute the replace command
    ///
    /// # Errors
    ///
    /// Returns an error if the old manifest cannot be loaded, the new file is
    /// rejected, or the old asset cannot be deleted.
    pub async fn execute(&self, service: &MediaStorageService) -> Result<()> {
        let existing = service
            .load(&self.manifest_key)
            .await
            .with_context(|| format!("Failed to load {}", self.manifest_key))?;
        let upload = read_upload(&self.file, self.content_type.as_deref())?;

        let asset = service
            .replace(Some(&existing), self.kind, &self.purpose, &upload)
            .await?;

        println!("{} Removed {}", INFO, style(&self.manifest_key).dim());
        println!("{} {}", SUCCESS, style(&asset.manifest_key).green());
        Ok(())
    }
}
