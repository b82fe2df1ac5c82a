//! Countdown engine implementation.
//!
//! The engine is a wall-clock-based state machine. It does not own a timer;
//! the caller (normally [`run_countdown`](super::run_countdown)) calls
//! `tick()` once a second.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Ticking -> Ended
//! ```
//!
//! `Ended` is terminal. An engine without a valid configuration never
//! leaves `Idle`.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::template;
use crate::config::{Attributes, CountdownConfig};
use crate::error::CountdownError;
use crate::events::Event;
use crate::time::{Clock, Remaining, SystemClock, TimeCalibrator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Idle,
    Ticking,
    Ended,
}

/// Core countdown engine.
#[derive(Debug, Clone)]
pub struct CountdownEngine<Z: TimeZone, C: Clock = SystemClock> {
    calibrator: TimeCalibrator<Z, C>,
    config: Result<CountdownConfig, String>,
    state: CountdownState,
    remaining: Option<Remaining>,
}

impl<Z: TimeZone, C: Clock> CountdownEngine<Z, C> {
    /// Create an engine in the `Idle` state.
    pub fn new(calibrator: TimeCalibrator<Z, C>, config: CountdownConfig) -> Self {
        Self {
            calibrator,
            config: Ok(config),
            state: CountdownState::Idle,
            remaining: None,
        }
    }

    /// Create an engine from element attributes.
    ///
    /// Configuration problems are logged and leave the engine permanently
    /// idle; they are reported again by [`start`](Self::start).
    pub fn from_attributes(
        calibrator: TimeCalibrator<Z, C>,
        attrs: &Attributes,
        template: impl Into<String>,
    ) -> Self {
        let config = CountdownConfig::from_attributes(attrs, template, &calibrator).map_err(|e| {
            tracing::warn!(error = %e, "countdown configuration rejected; staying idle");
            e.to_string()
        });
        Self {
            calibrator,
            config,
            state: CountdownState::Idle,
            remaining: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn config(&self) -> Option<&CountdownConfig> {
        self.config.as_ref().ok()
    }

    /// Remaining time as of the last tick.
    pub fn remaining(&self) -> Option<Remaining> {
        self.remaining
    }

    /// Calendar date of the target in the client zone, e.g. `Mon Dec 31 2040`.
    pub fn date_label(&self) -> Option<String> {
        let end = self.config().map(|c| c.end)?;
        Some(
            end.with_timezone(self.calibrator.zone())
                .naive_local()
                .format("%a %b %d %Y")
                .to_string(),
        )
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Move `Idle -> Ticking`.
    ///
    /// Starting while already ticking is a no-op returning `Ok(None)`.
    pub fn start(&mut self) -> Result<Option<Event>, CountdownError> {
        match self.state {
            CountdownState::Idle => {
                let config = self
                    .config
                    .as_ref()
                    .map_err(|e| CountdownError::NotConfigured(e.clone()))?;
                let event = Event::CountdownStarted {
                    end: config.end,
                    utc_offset: config.utc_offset,
                    at: self.calibrator.now(),
                };
                tracing::debug!(end = %config.end, utc_offset = config.utc_offset, "countdown started");
                self.state = CountdownState::Ticking;
                Ok(Some(event))
            }
            CountdownState::Ticking => Ok(None),
            CountdownState::Ended => Err(CountdownError::AlreadyEnded),
        }
    }

    /// Recompute the remaining time and produce the next display.
    ///
    /// Returns `CountdownTicked` while time remains, `CountdownEnded` exactly
    /// once when it runs out, and `None` when not ticking.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != CountdownState::Ticking {
            return None;
        }
        let config = self.config.as_ref().ok()?;
        let remaining = self
            .calibrator
            .remaining_until(config.end, Some(config.utc_offset));
        self.remaining = Some(remaining);
        let at = self.calibrator.now();

        if remaining.is_zero() {
            self.state = CountdownState::Ended;
            tracing::info!(end = %config.end, "countdown ended");
            return Some(Event::CountdownEnded {
                display: config.end_message.clone(),
                at,
            });
        }

        let display = template::render(
            &config.template,
            &remaining,
            &self.date_label().unwrap_or_default(),
        );
        Some(Event::CountdownTicked {
            remaining,
            display,
            at,
        })
    }

    /// Target instant, if configured.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.config().map(|c| c.end)
    }
}
