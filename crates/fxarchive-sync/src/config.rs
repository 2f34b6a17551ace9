//! Pipeline configuration.

use std::path::PathBuf;

use directories::ProjectDirs;
use fxarchive_fetch::FetchOptions;
use fxarchive_store::DEFAULT_PATH_CACHE_CAPACITY;
use fxarchive_store::url::BASE_URL;
use fxarchive_types::{ArchiveError, Result};

/// Settings of one synchronisation run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Root directory of all artifacts.
    pub data_root: PathBuf,
    /// Base URL of the provider datafeed.
    pub base_url: String,
    /// Keep the compressed provider cache after an hour is processed.
    pub keep_compressed_cache: bool,
    /// Keep the decompressed provider cache after an hour is processed.
    pub keep_decompressed_cache: bool,
    /// Write the normalized uncompressed tick file (`.bin`).
    pub store_uncompressed: bool,
    /// Write the normalized compressed tick file (`.rar`).
    pub store_compressed: bool,
    /// Store downloaded responses in the compressed provider cache.
    pub persist_raw: bool,
    /// Record 404 and empty responses as marker files.
    pub persist_errors: bool,
    /// Capacity of the path memo.
    pub path_cache_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            base_url: BASE_URL.to_string(),
            keep_compressed_cache: false,
            keep_decompressed_cache: false,
            store_uncompressed: false,
            store_compressed: true,
            persist_raw: false,
            persist_errors: true,
            path_cache_capacity: DEFAULT_PATH_CACHE_CAPACITY,
        }
    }
}

impl SyncConfig {
    /// Creates the default configuration rooted at `data_root`.
    #[must_use]
    pub fn with_data_root(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            ..Self::default()
        }
    }

    /// Checks that the settings can produce a usable archive.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Argument`] if no normalized artifact would be
    /// written or the path memo has no capacity.
    pub fn validate(&self) -> Result<()> {
        if !self.store_compressed && !self.store_uncompressed {
            return Err(ArchiveError::argument(
                "at least one of store_compressed and store_uncompressed must be set",
            ));
        }
        if self.path_cache_capacity == 0 {
            return Err(ArchiveError::argument("path cache capacity must be positive"));
        }
        Ok(())
    }

    /// Returns the options passed to the fetcher.
    #[must_use]
    pub const fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            persist_raw: self.persist_raw,
            persist_errors: self.persist_errors,
        }
    }
}

/// Returns the platform data directory for fxarchive.
///
/// - Linux: `~/.local/share/fxarchive/`
/// - macOS: `~/Library/Application Support/fxarchive/`
/// - Windows: `C:\Users\<User>\AppData\Roaming\fxarchive\data\`
#[must_use]
pub fn default_data_root() -> PathBuf {
    ProjectDirs::from("", "", "fxarchive").map_or_else(dirs_fallback, |proj_dirs| {
        proj_dirs.data_dir().to_path_buf()
    })
}

fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".fxarchive")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert!(config.store_compressed);
        assert!(!config.store_uncompressed);
        assert!(config.persist_errors);
        assert_eq!(config.path_cache_capacity, 128);
        assert!(config.base_url.starts_with("https://"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_no_output() {
        let config = SyncConfig {
            store_compressed: false,
            store_uncompressed: false,
            ..SyncConfig::with_data_root("/tmp/fx")
        };
        assert!(matches!(config.validate(), Err(ArchiveError::Argument(_))));
    }

    #[test]
    fn test_fetch_options() {
        let config = SyncConfig {
            persist_raw: true,
            persist_errors: false,
            ..SyncConfig::with_data_root("/tmp/fx")
        };
        let options = config.fetch_options();
        assert!(options.persist_raw);
        assert!(!options.persist_errors);
    }
}
