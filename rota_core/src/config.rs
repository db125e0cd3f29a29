//! Configuration file support for Rota.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/rota/config.toml`.

use crate::forecast::{ForecastOrder, DEFAULT_FORECAST_WEEKS};
use crate::pod::DEFAULT_RECENCY_DEPTH;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub forecast: ForecastConfig,

    #[serde(default)]
    pub selection: SelectionConfig,
}

/// Device change intervals
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_pod_interval_days")]
    pub pod_interval_days: u32,

    #[serde(default = "default_sensor_interval_days")]
    pub sensor_interval_days: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            pod_interval_days: default_pod_interval_days(),
            sensor_interval_days: default_sensor_interval_days(),
        }
    }
}

/// Forecast output configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_forecast_weeks")]
    pub weeks: u32,

    #[serde(default)]
    pub order: ForecastOrder,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            weeks: default_forecast_weeks(),
            order: ForecastOrder::default(),
        }
    }
}

/// Pod selection configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// How many previous pod sites to avoid
    #[serde(default = "default_recency_depth")]
    pub recency_depth: usize,

    /// Fixed random seed; entropy when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            recency_depth: default_recency_depth(),
            seed: None,
        }
    }
}

// Default value functions
fn default_pod_interval_days() -> u32 {
    3
}

fn default_sensor_interval_days() -> u32 {
    10
}

fn default_forecast_weeks() -> u32 {
    DEFAULT_FORECAST_WEEKS
}

fn default_recency_depth() -> usize {
    DEFAULT_RECENCY_DEPTH
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(config_path) if config_path.exists() => Self::load_from(&config_path),
            other => {
                tracing::info!("No config file found at {:?}, using defaults", other);
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("rota").join("config.toml"))
    }

    /// Reject values that would stall the forecast or disable the rules
    pub fn validate(&self) -> Result<()> {
        if self.schedule.pod_interval_days == 0 {
            return Err(Error::Config("pod_interval_days must be at least 1".into()));
        }
        if self.schedule.sensor_interval_days == 0 {
            return Err(Error::Config(
                "sensor_interval_days must be at least 1".into(),
            ));
        }
        if self.forecast.weeks == 0 {
            return Err(Error::Config("forecast weeks must be at least 1".into()));
        }
        if self.selection.recency_depth == 0 {
            return Err(Error::Config("recency_depth must be at least 1".into()));
        }
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to_optional(Self::default_config_path())
    }

    fn save_to_optional(&self, path: Option<PathBuf>) -> Result<()> {
        let path = path.ok_or_else(|| {
            Error::Config("No config directory available on this system".into())
        })?;
        self.save_to(&path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
