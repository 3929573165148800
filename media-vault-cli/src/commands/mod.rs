//! CLI command implementations

pub mod delete;
pub mod replace;
pub mod show;
pub mod store;

pub use delete::DeleteCommand;
pub use replace::ReplaceCommand;
pub use show::ShowCommand;
pub use store::StoreCommand;

use anyhow::{Context, Result};
use console::Emoji;
use media_vault::MediaUpload;
use std::path::Path;

pub static SUCCESS: Emoji = Emoji("✓", "√");
pub static INFO: Emoji = Emoji("ℹ", "i");

/// Reads a file into an upload
///
/// The content type is guessed from the file name unless given.
pub fn read_upload(path: &Path, content_type: Option<&str>) -> Result<MediaUpload> {
    let content =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let content_type = content_type
        .map(str::to_string)
        .or_else(|| mime_guess::from_path(path).first_raw().map(str::to_string));
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());

    Ok(MediaUpload::new(filename, content_type, content))
}
