//! Configuration management for media-vault
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `MEDIA_VAULT_` prefix, `__`
//!    between section and key)
//! 2. `./media-vault.toml`, or an explicit file
//! 3. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # media-vault.toml
//! [storage]
//! bucket = "media"
//! region = "eu-west-1"
//! endpoint = "http://localhost:9000"
//! path_style_access = true
//! public_base_url = "https://cdn.example.com"
//!
//! [media]
//! parallel_variants = true
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use media_vault::config::MediaVaultConfig;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = MediaVaultConfig::load()?;
//! println!("bucket: {}", config.storage.bucket);
//!
//! // MEDIA_VAULT_STORAGE__BUCKET=other overrides the file
//! # Ok(())
//! # }
//! ```

use crate::error::{MediaError, MediaResult};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "media-vault.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "MEDIA_VAULT_";

/// Object store connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Bucket holding every asset
    pub bucket: String,

    /// Region the bucket lives in
    pub region: String,

    /// Custom endpoint for S3-compatible services
    pub endpoint: Option<String>,

    /// Static access key; the SDK credential chain is used when unset
    pub access_key_id: Option<String>,

    /// Static secret key; the SDK credential chain is used when unset
    pub secret_access_key: Option<String>,

    /// Base URL prefixed to keys in descriptor URLs (CDN, bucket website)
    pub public_base_url: Option<String>,

    /// Address buckets as `{endpoint}/{bucket}` instead of virtual hosts
    pub path_style_access: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            bucket: "media".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            public_base_url: None,
            path_style_access: false,
        }
    }
}

impl StorageSettings {
    /// Checks that the settings can address a bucket
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Validation`] if the bucket or region is blank.
    pub fn validate(&self) -> MediaResult<()> {
        if self.bucket.trim().is_empty() {
            return Err(MediaError::validation("storage.bucket must not be blank"));
        }
        if self.region.trim().is_empty() {
            return Err(MediaError::validation("storage.region must not be blank"));
        }
        Ok(())
    }
}

/// Pipeline behaviour settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    /// Render and upload image variants concurrently
    pub parallel_variants: bool,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            parallel_variants: true,
        }
    }
}

/// Complete media-vault configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MediaVaultConfig {
    /// Object store settings
    #[serde(default)]
    pub storage: StorageSettings,

    /// Pipeline settings
    #[serde(default)]
    pub media: MediaSettings,
}

impl MediaVaultConfig {
    /// Load configuration from `./media-vault.toml` and the environment
    ///
    /// A missing file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result is invalid.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file and the environment
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use media_vault::config::MediaVaultConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = MediaVaultConfig::load_from("./config/production.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config: Self = Self::figment(path.as_ref()).extract()?;
        config.storage.validate()?;
        Ok(config)
    }

    /// The layered provider used by [`MediaVaultConfig::load_from`]
    #[must_use]
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = MediaVaultConfig::default();
        assert_eq!(config.storage.bucket, "media");
        assert_eq!(config.storage.region, "us-east-1");
        assert!(!config.storage.path_style_access);
        assert!(config.media.parallel_variants);
        assert!(config.storage.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("media-vault.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[storage]
bucket = "assets"
endpoint = "http://localhost:9000"
path_style_access = true

[media]
parallel_variants = false
"#
        )
        .unwrap();

        // Jail serializes tests that read MEDIA_VAULT_* variables
        figment::Jail::expect_with(|_| {
            let config = MediaVaultConfig::load_from(&path).unwrap();
            assert_eq!(config.storage.bucket, "assets");
            assert_eq!(config.storage.endpoint.as_deref(), Some("http://localhost:9000"));
            assert!(config.storage.path_style_access);
            assert_eq!(config.storage.region, "us-east-1");
            assert!(!config.media.parallel_variants);
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        figment::Jail::expect_with(|_| {
            let config = MediaVaultConfig::load_from(dir.path().join("absent.toml")).unwrap();
            assert_eq!(config.storage.bucket, "media");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
[storage]
bucket = "from-file"
region = "eu-west-1"
"#,
            )?;
            jail.set_env("MEDIA_VAULT_STORAGE__BUCKET", "from-env");
            jail.set_env("MEDIA_VAULT_STORAGE__PATH_STYLE_ACCESS", "true");
            jail.set_env("MEDIA_VAULT_MEDIA__PARALLEL_VARIANTS", "false");

            let config = MediaVaultConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.storage.bucket, "from-env");
            assert_eq!(config.storage.region, "eu-west-1");
            assert!(config.storage.path_style_access);
            assert!(!config.media.parallel_variants);
            Ok(())
        });
    }

    #[test]
    fn test_blank_bucket_is_rejected() {
        let settings = StorageSettings {
            bucket: "  ".to_string(),
            ..StorageSettings::default()
        };
        assert!(settings.validate().unwrap_err().is_validation());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("media-vault.toml");
        std::fs::write(&path, "[storage]\nbucket = \"\"\n").unwrap();
        figment::Jail::expect_with(|_| {
            assert!(MediaVaultConfig::load_from(&path).is_err());
            Ok(())
        });
    }
}
