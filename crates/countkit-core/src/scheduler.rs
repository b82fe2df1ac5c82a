//! Recurring timers owned by exactly one logical loop.
//!
//! A [`RecurringTimer`] is a slot: arming it cancels whatever the slot held
//! before, so a loop can never stack two intervals. Each arming produces a
//! new [`TimerToken`]; tokens from earlier armings stop matching
//! [`RecurringTimer::is_current`] as soon as the slot is re-armed or
//! cancelled.
//!
//! Timers are driven by `tokio::time`, so they honour a paused test clock.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Shortest period a timer will run at.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Identifies one arming of a [`RecurringTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Debug)]
pub struct RecurringTimer {
    name: &'static str,
    interval: Option<Interval>,
    generation: u64,
}

impl RecurringTimer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            interval: None,
            generation: 0,
        }
    }

    /// Arm with the first tick one `period` from now.
    pub fn arm(&mut self, period: Duration) -> TimerToken {
        let period = period.max(MIN_PERIOD);
        self.install(time::interval_at(Instant::now() + period, period), period)
    }

    /// Arm with the first tick immediately.
    pub fn arm_immediate(&mut self, period: Duration) -> TimerToken {
        let period = period.max(MIN_PERIOD);
        self.install(time::interval(period), period)
    }

    fn install(&mut self, mut interval: Interval, period: Duration) -> TimerToken {
        self.cancel();
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
        self.generation += 1;
        tracing::trace!(timer = self.name, generation = self.generation, ?period, "timer armed");
        TimerToken(self.generation)
    }

    /// Drop the current interval, if any. Returns whether one was armed.
    pub fn cancel(&mut self) -> bool {
        let was_armed = self.interval.take().is_some();
        if was_armed {
            tracing::trace!(timer = self.name, generation = self.generation, "timer cancelled");
            self.generation += 1;
        }
        was_armed
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Whether `token` belongs to the live arming.
    pub fn is_current(&self, token: TimerToken) -> bool {
        self.is_armed() && token.0 == self.generation
    }

    /// Wait for the next tick. Pends forever while disarmed.
    pub async fn tick(&mut self) -> TimerToken {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
                TimerToken(self.generation)
            }
            None => std::future::pending().await,
        }
    }
}
