//! Per-widget configuration, validated once at construction.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::duration::{deserialize_ms, parse_duration_ms};
use super::Attributes;
use crate::error::ConfigError;
use crate::time::{parse_instant, Clock, TimeCalibrator};

pub const ATTR_END: &str = "data-end";
pub const ATTR_END_MESSAGE: &str = "data-end-message";
pub const ATTR_UTC_OFFSET: &str = "data-utc-offset";
pub const ATTR_ENDPOINT: &str = "data-endpoint";
pub const ATTR_COUNT_PROPERTY: &str = "data-count-property";
pub const ATTR_SPEED: &str = "data-speed";
pub const ATTR_UPDATE: &str = "data-update";
pub const ATTR_SEED: &str = "data-seed";

/// Immutable countdown configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownConfig {
    /// Target instant.
    pub end: DateTime<Utc>,
    /// Display template with `{DAYS}`-style placeholders.
    pub template: String,
    /// Shown instead of the template once the countdown ends.
    pub end_message: String,
    /// Hours behind UTC the target is expressed in.
    pub utc_offset: i32,
}

impl CountdownConfig {
    /// Build from element attributes; `template` is the element's content.
    ///
    /// `data-end` is required. A missing `data-utc-offset` falls back to the
    /// calibrator's DST-aware default.
    pub fn from_attributes<Z: TimeZone, C: Clock>(
        attrs: &Attributes,
        template: impl Into<String>,
        calibrator: &TimeCalibrator<Z, C>,
    ) -> Result<Self, ConfigError> {
        let raw_end = attrs
            .get(ATTR_END)
            .ok_or_else(|| ConfigError::MissingKey(ATTR_END.to_string()))?;
        let utc_offset = match attrs.get(ATTR_UTC_OFFSET) {
            Some(raw) => parse_offset(ATTR_UTC_OFFSET, raw)?,
            None => calibrator.default_offset_hours(),
        };
        Self::resolve(
            raw_end,
            template.into(),
            attrs.get(ATTR_END_MESSAGE).unwrap_or_default().to_string(),
            utc_offset,
            calibrator,
        )
    }

    pub(crate) fn resolve<Z: TimeZone, C: Clock>(
        raw_end: &str,
        template: String,
        end_message: String,
        utc_offset: i32,
        calibrator: &TimeCalibrator<Z, C>,
    ) -> Result<Self, ConfigError> {
        let end = parse_instant(raw_end, calibrator.zone())
            .ok_or_else(|| ConfigError::invalid(ATTR_END, format!("unparseable instant '{raw_end}'")))?;
        if !(-14..=14).contains(&utc_offset) {
            return Err(ConfigError::invalid(
                ATTR_UTC_OFFSET,
                format!("{utc_offset} is outside -14..=14"),
            ));
        }
        Ok(Self {
            end,
            template,
            end_message,
            utc_offset,
        })
    }
}

fn parse_offset(key: &str, raw: &str) -> Result<i32, ConfigError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|e| ConfigError::invalid(key, format!("'{raw}': {e}")))
}

/// Immutable counter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterConfig {
    /// Data source endpoint.
    pub endpoint: String,
    /// Property of the response holding the count.
    #[serde(default = "default_property")]
    pub property: String,
    /// Wall-clock time allotted to animate one gap.
    #[serde(
        default = "default_animation_budget_ms",
        alias = "speed",
        deserialize_with = "deserialize_ms"
    )]
    pub animation_budget_ms: u64,
    /// Delay between polls.
    #[serde(
        default = "default_poll_interval_ms",
        alias = "update",
        deserialize_with = "deserialize_ms"
    )]
    pub poll_interval_ms: u64,
    /// Seed for reproducible step sizes (None = entropy).
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_property() -> String {
    "total".into()
}
fn default_animation_budget_ms() -> u64 {
    8_000
}
fn default_poll_interval_ms() -> u64 {
    15_000
}

impl CounterConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            property: default_property(),
            animation_budget_ms: default_animation_budget_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            seed: None,
        }
    }

    /// Build from element attributes. `data-endpoint` is required.
    pub fn from_attributes(attrs: &Attributes) -> Result<Self, ConfigError> {
        let endpoint = attrs
            .get(ATTR_ENDPOINT)
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingKey(ATTR_ENDPOINT.to_string()))?;

        let mut cfg = Self::new(endpoint.trim());
        if let Some(property) = attrs.get(ATTR_COUNT_PROPERTY) {
            cfg.property = property.to_string();
        }
        if let Some(raw) = attrs.get(ATTR_SPEED) {
            cfg.animation_budget_ms = duration_attr(ATTR_SPEED, raw)?;
        }
        if let Some(raw) = attrs.get(ATTR_UPDATE) {
            cfg.poll_interval_ms = duration_attr(ATTR_UPDATE, raw)?;
        }
        if let Some(raw) = attrs.get(ATTR_SEED) {
            let seed = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::invalid(ATTR_SEED, format!("'{raw}': {e}")))?;
            cfg.seed = Some(seed);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingKey("endpoint".into()));
        }
        if self.property.is_empty() {
            return Err(ConfigError::invalid("property", "must not be empty"));
        }
        if self.animation_budget_ms == 0 {
            return Err(ConfigError::invalid("animation_budget_ms", "must be positive"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::invalid("poll_interval_ms", "must be positive"));
        }
        Ok(())
    }

    pub fn animation_budget(&self) -> Duration {
        Duration::from_millis(self.animation_budget_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn duration_attr(key: &str, raw: &str) -> Result<u64, ConfigError> {
    parse_duration_ms(raw).ok_or_else(|| ConfigError::invalid(key, format!("invalid duration '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;
    use chrono_tz::America::Los_Angeles;

    fn calibrator() -> TimeCalibrator<chrono_tz::Tz, FixedClock> {
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        TimeCalibrator::with_clock(Los_Angeles, FixedClock(now))
    }

    #[test]
    fn countdown_from_attributes() {
        let attrs = Attributes::from_iter([
            (ATTR_END, "2040-12-31 00:00:00"),
            (ATTR_UTC_OFFSET, "5"),
            (ATTR_END_MESSAGE, "Sale over"),
        ]);
        let cfg = CountdownConfig::from_attributes(&attrs, "{DAYS} days", &calibrator()).unwrap();
        assert_eq!(cfg.end, Utc.with_ymd_and_hms(2040, 12, 31, 8, 0, 0).unwrap());
        assert_eq!(cfg.utc_offset, 5);
        assert_eq!(cfg.end_message, "Sale over");
        assert_eq!(cfg.template, "{DAYS} days");
    }

    #[test]
    fn countdown_offset_defaults_from_dst() {
        let attrs = Attributes::from_iter([(ATTR_END, "2040-12-31")]);
        let cfg = CountdownConfig::from_attributes(&attrs, "", &calibrator()).unwrap();
        assert_eq!(cfg.utc_offset, 7);
        assert_eq!(cfg.end_message, "");
    }

    #[test]
    fn countdown_rejects_missing_or_bad_end() {
        let missing = Attributes::default();
        assert_eq!(
            CountdownConfig::from_attributes(&missing, "", &calibrator()),
            Err(ConfigError::MissingKey(ATTR_END.into()))
        );
        let bad = Attributes::from_iter([(ATTR_END, "whenever")]);
        assert!(matches!(
            CountdownConfig::from_attributes(&bad, "", &calibrator()),
            Err(ConfigError::InvalidValue { .. })
        ));
        let bad_offset = Attributes::from_iter([(ATTR_END, "2040-12-31"), (ATTR_UTC_OFFSET, "PST")]);
        assert!(CountdownConfig::from_attributes(&bad_offset, "", &calibrator()).is_err());
    }

    #[test]
    fn counter_defaults() {
        let attrs = Attributes::from_iter([(ATTR_ENDPOINT, "https://example.com/count.json")]);
        let cfg = CounterConfig::from_attributes(&attrs).unwrap();
        assert_eq!(cfg.property, "total");
        assert_eq!(cfg.animation_budget_ms, 8_000);
        assert_eq!(cfg.poll_interval_ms, 15_000);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn counter_reads_durations_and_seed() {
        let attrs = Attributes::from_iter([
            (ATTR_ENDPOINT, "/rest/count"),
            (ATTR_COUNT_PROPERTY, "signups"),
            (ATTR_SPEED, "4s"),
            (ATTR_UPDATE, "1m"),
            (ATTR_SEED, "42"),
        ]);
        let cfg = CounterConfig::from_attributes(&attrs).unwrap();
        assert_eq!(cfg.property, "signups");
        assert_eq!(cfg.animation_budget(), Duration::from_secs(4));
        assert_eq!(cfg.poll_interval(), Duration::from_secs(60));
        assert_eq!(cfg.seed, Some(42));
    }

    #[test]
    fn counter_rejects_missing_endpoint_and_zero_interval() {
        assert_eq!(
            CounterConfig::from_attributes(&Attributes::default()),
            Err(ConfigError::MissingKey(ATTR_ENDPOINT.into()))
        );
        let zero = Attributes::from_iter([(ATTR_ENDPOINT, "/count"), (ATTR_UPDATE, "0")]);
        assert!(CounterConfig::from_attributes(&zero).is_err());
    }
}
