//! TOML widget definitions.
//!
//! ```toml
//! timezone = "America/Los_Angeles"
//!
//! [[countdown]]
//! end = "2040-12-31 00:00:00"
//! template = "{DAYS} Days {HOURS}:{MINUTES}:{SECONDS}"
//! end_message = "The sale has ended"
//! utc_offset = 8
//!
//! [[counter]]
//! endpoint = "https://example.com/stats.json"
//! property = "total"
//! speed = "8s"
//! update = 15000
//! ```

use std::path::Path;

use chrono::TimeZone;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::widget::{CountdownConfig, CounterConfig};
use crate::error::ConfigError;
use crate::time::{Clock, TimeCalibrator};

/// A countdown as written in the file; the end instant is resolved
/// against the client zone by [`CountdownSection::resolve`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownSection {
    pub end: String,
    pub template: String,
    #[serde(default)]
    pub end_message: String,
    /// Hours behind UTC; DST-aware default when absent.
    #[serde(default)]
    pub utc_offset: Option<i32>,
}

impl CountdownSection {
    pub fn resolve<Z: TimeZone, C: Clock>(
        &self,
        calibrator: &TimeCalibrator<Z, C>,
    ) -> Result<CountdownConfig, ConfigError> {
        CountdownConfig::resolve(
            &self.end,
            self.template.clone(),
            self.end_message.clone(),
            self.utc_offset
                .unwrap_or_else(|| calibrator.default_offset_hours()),
            calibrator,
        )
    }
}

/// Widget definitions loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WidgetsConfig {
    /// IANA name of the client zone; the machine's zone when absent.
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub countdown: Vec<CountdownSection>,
    #[serde(default)]
    pub counter: Vec<CounterConfig>,
}

impl WidgetsConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: WidgetsConfig = toml::from_str(content)?;
        cfg.client_zone()?;
        for counter in &cfg.counter {
            counter.validate()?;
        }
        Ok(cfg)
    }

    /// Load from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not describe
    /// valid widgets.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let cfg = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            countdowns = cfg.countdown.len(),
            counters = cfg.counter.len(),
            "widget definitions loaded"
        );
        Ok(cfg)
    }

    /// The configured client zone, if any.
    pub fn client_zone(&self) -> Result<Option<Tz>, ConfigError> {
        self.timezone
            .as_deref()
            .map(|name| {
                name.parse::<Tz>()
                    .map_err(|e| ConfigError::invalid("timezone", e.to_string()))
            })
            .transpose()
    }

    /// Resolve every countdown against `calibrator`.
    pub fn countdowns<Z: TimeZone, C: Clock>(
        &self,
        calibrator: &TimeCalibrator<Z, C>,
    ) -> Result<Vec<CountdownConfig>, ConfigError> {
        self.countdown.iter().map(|s| s.resolve(calibrator)).collect()
    }
}
