//! Store command

use super::{read_upload, SUCCESS};
use anyhow::Result;
use clap::Args;
use console::style;
use media_vault::{MediaKind, MediaStorageService};
use std::path::PathBuf;

/// Upload one or more files as new assets
#[derive(Debug, Args)]
pub struct StoreCommand {
    /// Media kind (image, video, audio, document)
    #[arg(short, long)]
    pub kind: MediaKind,

    /// Logical purpose, used as a key segment (e.g. avatar)
    #[arg(short, long)]
    pub purpose: String,

    /// Content type for every file; guessed from each file name when omitted
    #[arg(long)]
    pub content_type: Option<String>,

    /// Files to upload
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

impl StoreCommand {
    /// Execute the store command
    ///
    /// Files are read up front and stored as one batch; the first failure
    /// stops the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or the pipeline rejects it.
    pub async fn execute(&self, service: &MediaStorageService) -> Result<()> {
        let uploads = self
            .files
            .iter()
            .map(|path| read_upload(path, self.content_type.as_deref()))
            .collect::<Result<Vec<_>>>()?;

        let assets = service.store_all(self.kind, &self.purpose, &uploads).await?;

        for (path, asset) in self.files.iter().zip(&assets) {
            println!(
                "{} {} {}",
                SUCCESS,
                style(path.display()).dim(),
                style(&asset.manifest_key).green()
            );
        }
        Ok(())
    }
}
