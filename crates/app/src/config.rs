use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vidshelf_media::thumbnail::{ThumbnailPolicy, MIB};
use vidshelf_state::recommend::MAX_RECOMMENDATIONS;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// User settings read from `<config_dir>/vidshelf/config.json`. Every field
/// is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub thumbnail_workers: usize,
    pub max_thumbnail_source_mib: u64,
    pub defer_threshold_mib: u64,
    pub defer_delay_ms: u64,
    pub attempt_timeout_secs: u64,
    pub max_retries: u32,
    pub jpeg_quality: u8,
    pub recommendation_count: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            thumbnail_workers: 2,
            max_thumbnail_source_mib: 100,
            defer_threshold_mib: 50,
            defer_delay_ms: 100,
            attempt_timeout_secs: 8,
            max_retries: 2,
            jpeg_quality: 50,
            recommendation_count: MAX_RECOMMENDATIONS,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vidshelf").join("config.json"))
    }

    /// Loads the user config. A missing file yields defaults; a broken one
    /// is logged and also yields defaults.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            tracing::debug!("no config directory, using defaults");
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(Some(config)) => {
                tracing::info!(path = %path.display(), "loaded config");
                config
            }
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!("{e}, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: AppConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(config.sanitized()))
    }

    fn sanitized(mut self) -> Self {
        self.thumbnail_workers = self.thumbnail_workers.max(1);
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
        self
    }

    /// The one policy shared by list rows and recommendation cards.
    pub fn thumbnail_policy(&self) -> ThumbnailPolicy {
        ThumbnailPolicy {
            max_source_bytes: self.max_thumbnail_source_mib.saturating_mul(MIB),
            max_retries: self.max_retries,
            attempt_timeout: Duration::from_secs(self.attempt_timeout_secs),
            jpeg_quality: self.jpeg_quality,
        }
    }

    pub fn defer_threshold_bytes(&self) -> u64 {
        self.defer_threshold_mib.saturating_mul(MIB)
    }

    pub fn defer_delay(&self) -> Duration {
        Duration::from_millis(self.defer_delay_ms)
    }
}
