//! Settings for the history store and share links

use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::codec::LogCodec;
use crate::constants::{DEFAULT_DASHBOARD_ORIGIN, HISTORY_CAPACITY, STORAGE_KEY};
use crate::encoder::OverflowPolicy;
use crate::store::{HistoryStore, JsonFileStorage};

/// Error returned when a config file cannot be read or written
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("utc offset of {0} minutes is out of range")]
    InvalidOffset(i32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page that receives exported blobs
    pub dashboard_origin: String,
    /// JSON file holding the history slot
    pub history_path: PathBuf,
    /// Readings kept before the oldest is evicted
    pub capacity: usize,
    /// How out-of-range values and gaps are encoded
    pub overflow: OverflowPolicy,
    /// Wall-clock zone of the sharing devices, minutes east of UTC
    pub utc_offset_minutes: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dashboard_origin: DEFAULT_DASHBOARD_ORIGIN.to_owned(),
            history_path: PathBuf::from(format!("{STORAGE_KEY}.json")),
            capacity: HISTORY_CAPACITY,
            overflow: OverflowPolicy::default(),
            utc_offset_minutes: 0,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file; missing fields take their defaults
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_owned(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        std::fs::write(path, content).map_err(io_err)
    }

    /// # Errors
    /// Returns an error if the offset is a day or more.
    pub fn zone(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidOffset(self.utc_offset_minutes))
    }

    /// # Errors
    /// Returns an error if the offset is a day or more.
    pub fn codec(&self) -> Result<LogCodec, ConfigError> {
        Ok(LogCodec::new().with_zone(self.zone()?).with_policy(self.overflow))
    }

    pub fn open_store(&self) -> HistoryStore<JsonFileStorage> {
        HistoryStore::with_capacity(JsonFileStorage::new(&self.history_path), self.capacity)
    }
}
