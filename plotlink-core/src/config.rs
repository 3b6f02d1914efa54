//! Driver configuration loaded from TOML.
//!
//! ```toml
//! [transform]
//! translate_x = 100.0
//! translate_y = 50.0
//! scale = 2.0
//!
//! [link]
//! ack_timeout_ms = 30000
//! max_line_length = 1024
//!
//! [logging]
//! level = "info"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PlotError;
use crate::framer::DEFAULT_MAX_LINE_LENGTH;
use crate::transform::Transform;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Initial logical → device transform.
    pub transform: Transform,
    /// Protocol tuning.
    pub link: LinkConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Protocol tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Milliseconds to wait for an acknowledgment. 0 waits forever.
    pub ack_timeout_ms: u64,
    /// Longest device line accepted before it is discarded.
    pub max_line_length: usize,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            ack_timeout_ms: 0,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl LinkConfig {
    /// The ack deadline, `None` when disabled.
    pub fn ack_timeout(&self) -> Option<Duration> {
        (self.ack_timeout_ms > 0).then(|| Duration::from_millis(self.ack_timeout_ms))
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl DriverConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, PlotError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write the default configuration to a file (for bootstrapping).
    pub fn write_default(path: &Path) -> Result<(), PlotError> {
        let text = toml::to_string_pretty(&Self::default())
            .map_err(|e| PlotError::Config(e.to_string()))?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────
