/// Engine configuration
///
/// Window sizes and list lengths used by the statistics engine. Loaded from
/// an optional JSON file; every field falls back to its default.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading a config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_completion_window_days() -> u32 {
    30
}
fn default_weekly_window_days() -> u32 {
    7
}
fn default_monthly_window_days() -> u32 {
    30
}
fn default_top_streaks() -> usize {
    5
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Window for the per-habit completion percentage
    #[serde(default = "default_completion_window_days")]
    pub completion_window_days: u32,
    /// Window for the dashboard's weekly progress
    #[serde(default = "default_weekly_window_days")]
    pub weekly_window_days: u32,
    /// Window for the dashboard's monthly progress
    #[serde(default = "default_monthly_window_days")]
    pub monthly_window_days: u32,
    /// How many habits the dashboard ranks by current streak
    #[serde(default = "default_top_streaks")]
    pub top_streaks: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            completion_window_days: default_completion_window_days(),
            weekly_window_days: default_weekly_window_days(),
            monthly_window_days: default_monthly_window_days(),
            top_streaks: default_top_streaks(),
        }
    }
}

impl TrackerConfig {
    /// `<config dir>/habit_streaks/config.json`, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("habit_streaks").join("config.json"))
    }

    /// Read the config at `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }
}
