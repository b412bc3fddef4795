//! Provider configuration.
//!
//! Tunables of the window controller. Configuration can be loaded from a JSON
//! file, from environment variables, or created programmatically.

use media_viewer_scheduler::PreloadConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Most screens that may be preloaded on each side
pub const MAX_PRELOADED_SCREENS: i32 = 64;

/// Configuration for a [`MediaProvider`](crate::MediaProvider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Smallest half-width of the loaded window, in entries
    pub min_ids_limit: usize,
    /// Screens kept loaded on each side of the visible one
    pub preloaded_screens: i32,
    /// Screens of margin left when the window is re-centered
    pub preload_threshold_screens: i32,
    /// Most entries a drag may select
    pub max_selected_items: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            min_ids_limit: 16,
            preloaded_screens: 4,
            preload_threshold_screens: 1,
            max_selected_items: 100,
        }
    }
}

impl ProviderConfig {
    /// Sets the smallest window half-width.
    pub fn with_min_ids_limit(mut self, limit: usize) -> Self {
        self.min_ids_limit = limit;
        self
    }

    /// Sets the screens preloaded on each side.
    pub fn with_preloaded_screens(mut self, screens: i32) -> Self {
        self.preloaded_screens = screens;
        self
    }

    /// Sets the re-centering threshold in screens.
    pub fn with_preload_threshold_screens(mut self, screens: i32) -> Self {
        self.preload_threshold_screens = screens;
        self
    }

    /// Sets the drag-selection cap.
    pub fn with_max_selected_items(mut self, count: usize) -> Self {
        self.max_selected_items = count;
        self
    }

    /// Screen counts for the preload heuristic.
    pub fn preload(&self) -> PreloadConfig {
        PreloadConfig {
            preloaded_screens: self.preloaded_screens,
            threshold_screens: self.preload_threshold_screens,
        }
    }

    /// Checks that the values describe a window that can actually scroll.
    ///
    /// # Errors
    /// Returns an error if `min_ids_limit` is zero, `preloaded_screens` is
    /// outside `1..=MAX_PRELOADED_SCREENS`, or the threshold leaves no room
    /// before a re-center.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_ids_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "min_ids_limit".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !(1..=MAX_PRELOADED_SCREENS).contains(&self.preloaded_screens) {
            return Err(ConfigError::InvalidValue {
                key: "preloaded_screens".to_string(),
                reason: format!("must be in 1..={MAX_PRELOADED_SCREENS}"),
            });
        }
        if !(0..self.preloaded_screens).contains(&self.preload_threshold_screens) {
            return Err(ConfigError::InvalidValue {
                key: "preload_threshold_screens".to_string(),
                reason: format!("must be in 0..{}", self.preloaded_screens),
            });
        }
        Ok(())
    }

    /// Loads configuration from environment variables.
    ///
    /// Environment variables:
    /// - `MEDIA_VIEWER_MIN_IDS_LIMIT` (default: 16)
    /// - `MEDIA_VIEWER_PRELOADED_SCREENS` (default: 4)
    /// - `MEDIA_VIEWER_PRELOAD_THRESHOLD_SCREENS` (default: 1)
    /// - `MEDIA_VIEWER_MAX_SELECTED_ITEMS` (default: 100)
    ///
    /// # Errors
    /// Returns an error if any variable does not parse or the result fails
    /// [`validate`](Self::validate).
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = env_value("MEDIA_VIEWER_MIN_IDS_LIMIT")? {
            config.min_ids_limit = value;
        }
        if let Some(value) = env_value("MEDIA_VIEWER_PRELOADED_SCREENS")? {
            config.preloaded_screens = value;
        }
        if let Some(value) = env_value("MEDIA_VIEWER_PRELOAD_THRESHOLD_SCREENS")? {
            config.preload_threshold_screens = value;
        }
        if let Some(value) = env_value("MEDIA_VIEWER_MAX_SELECTED_ITEMS")? {
            config.max_selected_items = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file. Missing keys take their defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

fn env_value<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("cannot parse {raw:?}"),
        }),
        Err(_) => Ok(None),
    }
}

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid value for a configuration parameter
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// I/O error reading or writing a configuration file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed configuration file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
