//! Watcher configuration
//!
//! Loaded from TOML; every key is optional and falls back to its default.

use crate::classify::ClassifierThresholds;
use dayline_core::PlannerOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration loading or validation failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Scheduler timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Debounce window coalescing change bursts
    pub debounce_ms: u64,
    /// Frame interval waited for a stable layout
    pub frame_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 10,
            frame_ms: 16,
        }
    }
}

impl SchedulerConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

/// Startup polling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupConfig {
    pub poll_interval_ms: u64,
    pub timeout_ms: u64,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            timeout_ms: 30_000,
        }
    }
}

impl StartupConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Logging defaults (overridden by `RUST_LOG`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Install the global subscriber at this level
    pub fn init(&self) -> anyhow::Result<()> {
        crate::logging::init_tracing(&self.level)
    }
}

/// Complete watcher configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    pub planner: PlannerOptions,
    pub classifier: ClassifierThresholds,
    pub scheduler: SchedulerConfig,
    pub startup: StartupConfig,
    pub logging: LoggingConfig,
}

impl WatcherConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every value is within its accepted range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let overlap = self.planner.overlap_px;
        if !overlap.is_finite() || !(0.0..=64.0).contains(&overlap) {
            return Err(invalid("planner.overlap_px", "must be between 0 and 64"));
        }
        if self.classifier.small_change == 0 {
            return Err(invalid("classifier.small_change", "must be at least 1"));
        }
        if self.classifier.sparse_total == 0 {
            return Err(invalid("classifier.sparse_total", "must be at least 1"));
        }
        if self.scheduler.debounce_ms > 1_000 {
            return Err(invalid("scheduler.debounce_ms", "must be at most 1000"));
        }
        if self.scheduler.frame_ms > 1_000 {
            return Err(invalid("scheduler.frame_ms", "must be at most 1000"));
        }
        if self.startup.poll_interval_ms == 0 {
            return Err(invalid("startup.poll_interval_ms", "must be at least 1"));
        }
        if self.startup.timeout_ms < self.startup.poll_interval_ms {
            return Err(invalid(
                "startup.timeout_ms",
                "must be at least startup.poll_interval_ms",
            ));
        }
        if !matches!(
            self.logging.level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(invalid("logging.level", "expected trace|debug|info|warn|error"));
        }
        Ok(())
    }

    /// Annotated example document with every default spelled out
    pub fn example() -> &'static str {
        r#"# Dayline watcher configuration

[planner]
# Pixels a marker is lifted above the first row of its day
overlap_px = 3.0
# stable_identity: keys follow the day, moves are in-place updates
# position_label: keys follow position + label, moves are remove + add
key_strategy = "stable_identity"

[classifier]
# A folder switch removes more than `removal_burst` rows
# and leaves fewer than `sparse_total`
removal_burst = 10
sparse_total = 5
scroll_removed_limit = 5
small_change = 3

[scheduler]
debounce_ms = 10
frame_ms = 16

[startup]
poll_interval_ms = 500
timeout_ms = 30000

[logging]
level = "info"
"#
    }
}

fn invalid(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.to_string(),
    }
}
