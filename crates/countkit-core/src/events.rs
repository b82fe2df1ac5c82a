use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::Remaining;

/// Why the counter's displayed value moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountChange {
    /// First reading: jump straight to the value.
    Snap,
    /// Gap of exactly one closed directly.
    Nudge,
    /// One randomized animation step.
    Step,
}

/// Every state change in a widget produces an Event.
/// Drivers render from them; embedders may observe them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CountdownStarted {
        end: DateTime<Utc>,
        utc_offset: i32,
        at: DateTime<Utc>,
    },
    CountdownTicked {
        remaining: Remaining,
        display: String,
        at: DateTime<Utc>,
    },
    /// Remaining time hit zero; the end message replaces the template.
    CountdownEnded {
        display: String,
        at: DateTime<Utc>,
    },
    CounterChanged {
        current: u64,
        updated: u64,
        cause: CountChange,
        at: DateTime<Utc>,
    },
    CounterTargetRaised {
        current: u64,
        updated: u64,
        at: DateTime<Utc>,
    },
    PollFailed {
        consecutive: u32,
        reason: String,
        at: DateTime<Utc>,
    },
    /// Failure limit reached; no further polls for this widget.
    PollingHalted {
        failures: u32,
        at: DateTime<Utc>,
    },
}
