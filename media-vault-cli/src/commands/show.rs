//! Show command

use anyhow::Result;
use clap::Args;
use media_vault::MediaStorageService;

/// Print a stored manifest as JSON
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Key of the manifest to print
    pub manifest_key: String,
}

impl ShowCommand {
    /// Execute the show command
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing or invalid.
    pub async fn execute(&self, service: &MediaStorageService) -> Result<()> {
        let manifest = service.load(&self.manifest_key).await?;
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        Ok(())
    }
}
