//! Delete command

use super::{INFO, SUCCESS};
use anyhow::Result;
use clap::Args;
use console::style;
use media_vault::MediaStorageService;

/// Delete an asset and every object its manifest lists
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Key of the asset's manifest
    pub manifest_key: String,
}

impl DeleteCommand {
    /// Execute the delete command
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be loaded or a delete fails.
    pub async fn execute(&self, service: &MediaStorageService) -> Result<()> {
        let manifest = service.load(&self.manifest_key).await?;
        let objects = manifest.keys().count();

        service.delete(Some(&manifest)).await?;

        println!(
            "{} Deleted {} ({} objects)",
            SUCCESS,
            style(&self.manifest_key).green(),
            objects + 1
        );
        println!("{} {}", INFO, style(&manifest.original.url).dim());
        Ok(())
    }
}
