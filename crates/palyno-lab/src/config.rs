//! # Lab Configuration
//!
//! Validation thresholds and report defaults.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PALYNO_MIN_TOTAL_GRAINS=200                                        │
//! │     PALYNO_MIN_GRAINS_STRICTNESS=warning                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/palyno/palyno.toml (Linux)                               │
//! │     ~/Library/Application Support/org.palyno.palyno/palyno.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     100 grains minimum (blocking), 10000 per species, 50 species       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # palyno.toml
//! [validation]
//! min_total_grains = 100
//! max_grains_per_species = 10000
//! max_species = 50
//! min_grains_strictness = "error"  # error | warning
//!
//! [report]
//! top_n = 10
//! default_window_days = 30
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use palyno_core::{DateRange, MinGrainsStrictness, ValidationConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{LabError, LabResult};

/// Config file name inside the platform config directory.
pub const CONFIG_FILENAME: &str = "palyno.toml";

/// Longest default report window accepted, about a century.
pub const MAX_WINDOW_DAYS: u32 = 36_500;

// =============================================================================
// Report Settings
// =============================================================================

/// Defaults for report generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Number of species in the top-species ranking.
    pub top_n: usize,
    /// Days covered by the report when no dates are given.
    pub default_window_days: u32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            top_n: 10,
            default_window_days: 30,
        }
    }
}

impl ReportSettings {
    /// The default report window ending on `today`.
    pub fn default_range(&self, today: NaiveDate) -> LabResult<DateRange> {
        Ok(DateRange::last_days(today, self.default_window_days)?)
    }
}

// =============================================================================
// Lab Configuration
// =============================================================================

/// Complete lab configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabConfig {
    /// Thresholds handed to the validation engine.
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Report defaults.
    #[serde(default)]
    pub report: ReportSettings,
}

impl LabConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (palyno.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> LabResult<Self> {
        let mut config = Self::default();

        let explicit = config_path.is_some();
        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading lab config from file");
                config = Self::from_file(&path)?;
            } else if explicit {
                warn!(?path, "Config file not found, using defaults");
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML file without applying overrides.
    pub fn from_file(path: &Path) -> LabResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> LabResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(LabError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, self.to_toml()?)?;

        info!(?path, "Lab config saved");
        Ok(path)
    }

    /// Renders the configuration as pretty TOML.
    pub fn to_toml(&self) -> LabResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> LabResult<()> {
        if self.validation.min_total_grains < 0 {
            return Err(LabError::InvalidConfig(
                "min_total_grains cannot be negative".into(),
            ));
        }

        if self.validation.max_grains_per_species < 0 {
            return Err(LabError::InvalidConfig(
                "max_grains_per_species cannot be negative".into(),
            ));
        }

        if self.validation.max_species == 0 {
            return Err(LabError::InvalidConfig(
                "max_species must be greater than 0".into(),
            ));
        }

        if self.report.top_n == 0 {
            return Err(LabError::InvalidConfig(
                "top_n must be greater than 0".into(),
            ));
        }

        if self.report.default_window_days == 0 || self.report.default_window_days > MAX_WINDOW_DAYS {
            return Err(LabError::InvalidConfig(format!(
                "default_window_days must be between 1 and {}",
                MAX_WINDOW_DAYS
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup. Unparseable values are
    /// logged and ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("PALYNO_MIN_TOTAL_GRAINS") {
            match value.parse::<i64>() {
                Ok(n) => {
                    debug!(min_total_grains = n, "Overriding minimum grains from environment");
                    self.validation.min_total_grains = n;
                }
                Err(_) => warn!(value = %value, "Ignoring invalid PALYNO_MIN_TOTAL_GRAINS"),
            }
        }

        if let Some(value) = lookup("PALYNO_MAX_GRAINS_PER_SPECIES") {
            match value.parse::<i64>() {
                Ok(n) => self.validation.max_grains_per_species = n,
                Err(_) => warn!(value = %value, "Ignoring invalid PALYNO_MAX_GRAINS_PER_SPECIES"),
            }
        }

        if let Some(value) = lookup("PALYNO_MAX_SPECIES") {
            match value.parse::<usize>() {
                Ok(n) => self.validation.max_species = n,
                Err(_) => warn!(value = %value, "Ignoring invalid PALYNO_MAX_SPECIES"),
            }
        }

        if let Some(value) = lookup("PALYNO_MIN_GRAINS_STRICTNESS") {
            match value.parse::<MinGrainsStrictness>() {
                Ok(strictness) => {
                    debug!(%strictness, "Overriding minimum grains strictness from environment");
                    self.validation.min_grains_strictness = strictness;
                }
                Err(e) => warn!(error = %e, "Ignoring invalid PALYNO_MIN_GRAINS_STRICTNESS"),
            }
        }

        if let Some(value) = lookup("PALYNO_TOP_N") {
            match value.parse::<usize>() {
                Ok(n) => self.report.top_n = n,
                Err(_) => warn!(value = %value, "Ignoring invalid PALYNO_TOP_N"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "palyno", "palyno")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
    }
}
