//! Counter animation state machine.
//!
//! Two loops feed this machine: polls deliver confirmed values through
//! [`CounterAnimator::on_poll`], and the step timer advances the displayed
//! value through [`CounterAnimator::step`]. Like the countdown engine it owns
//! no timers; [`run_counter`](super::run_counter) schedules both loops.
//!
//! Invariants:
//! - `current <= updated`, and both only grow
//! - after [`POLL_FAILURE_LIMIT`] consecutive failures polling is over for
//!   good; there is no reset

use std::time::Duration;

use chrono::Utc;
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::config::CounterConfig;
use crate::error::FetchError;
use crate::events::{CountChange, Event};
use crate::format::group_thousands;
use crate::scheduler::MIN_PERIOD;

/// Consecutive failed polls after which polling stops.
pub const POLL_FAILURE_LIMIT: u32 = 3;

/// Largest single animation step.
pub const MAX_STEP: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountState {
    /// Value on display.
    pub current: u64,
    /// Latest confirmed value.
    pub updated: u64,
}

impl CountState {
    pub fn gap(&self) -> u64 {
        self.updated.saturating_sub(self.current)
    }

    pub fn is_settled(&self) -> bool {
        self.gap() == 0
    }
}

/// Consecutive-failure counter gating the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollHealth {
    failures: u32,
}

impl PollHealth {
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn is_halted(&self) -> bool {
        self.failures >= POLL_FAILURE_LIMIT
    }

    fn record_success(&mut self) {
        self.failures = 0;
    }

    fn record_failure(&mut self) -> u32 {
        self.failures += 1;
        self.failures
    }
}

/// One poll's result as the animator sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A usable reading, truncated to an integer.
    Count(u64),
    Failed(String),
}

impl From<Result<f64, FetchError>> for PollOutcome {
    /// Zero and non-finite readings count as failures. Negative readings
    /// are accepted as a successful poll that cannot move the counter.
    fn from(result: Result<f64, FetchError>) -> Self {
        match result {
            Ok(v) if v.is_finite() && v != 0.0 => PollOutcome::Count(v.max(0.0).trunc() as u64),
            Ok(v) => PollOutcome::Failed(format!("unusable reading {v}")),
            Err(e) => PollOutcome::Failed(e.to_string()),
        }
    }
}

/// Animated counter state.
#[derive(Debug, Clone)]
pub struct CounterAnimator<R: Rng = Mcg128Xsl64> {
    state: CountState,
    health: PollHealth,
    budget: Duration,
    /// Steps taken per timer tick, fixed whenever a poll reshapes the gap.
    steps_per_tick: u64,
    rng: R,
}

impl CounterAnimator<Mcg128Xsl64> {
    /// Create an animator; `seed` makes step sizes reproducible.
    pub fn new(budget: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self::with_rng(budget, rng)
    }

    pub fn from_config(config: &CounterConfig) -> Self {
        Self::new(config.animation_budget(), config.seed)
    }
}

impl<R: Rng> CounterAnimator<R> {
    pub fn with_rng(budget: Duration, rng: R) -> Self {
        Self {
            state: CountState::default(),
            health: PollHealth::default(),
            budget,
            steps_per_tick: 1,
            rng,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountState {
        self.state
    }

    pub fn health(&self) -> PollHealth {
        self.health
    }

    pub fn polling_halted(&self) -> bool {
        self.health.is_halted()
    }

    /// The displayed value, thousands-grouped.
    pub fn display(&self) -> String {
        group_thousands(self.state.current)
    }

    /// Step period that spreads the remaining gap over the animation
    /// budget, or `None` when there is nothing to animate.
    ///
    /// Never shorter than [`MIN_PERIOD`]; gaps too large for that are
    /// covered by taking [`steps_per_tick`](Self::steps_per_tick) steps on
    /// each tick.
    pub fn animation_period(&self) -> Option<Duration> {
        let gap = self.state.gap();
        if gap == 0 {
            return None;
        }
        let nanos = self.budget.as_nanos() / u128::from(gap);
        let period = Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX));
        Some(period.max(MIN_PERIOD))
    }

    /// Random steps applied by one call to [`step`](Self::step).
    pub fn steps_per_tick(&self) -> u64 {
        self.steps_per_tick
    }

    /// `ceil(gap * MIN_PERIOD / budget)`, at least one.
    fn plan_steps_per_tick(&mut self) {
        let gap = u128::from(self.state.gap());
        let budget = self.budget.as_nanos().max(1);
        let steps = (gap * MIN_PERIOD.as_nanos()).div_ceil(budget);
        self.steps_per_tick = u64::try_from(steps).unwrap_or(u64::MAX).max(1);
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply one poll result. Ignored once polling has halted.
    pub fn on_poll(&mut self, outcome: PollOutcome) -> Vec<Event> {
        let mut events = Vec::new();
        if self.health.is_halted() {
            return events;
        }

        match outcome {
            PollOutcome::Count(value) => {
                self.health.record_success();

                if self.state.current == 0 && value > 0 {
                    self.state = CountState {
                        current: value,
                        updated: value,
                    };
                    tracing::debug!(value, "counter snapped to first reading");
                    events.push(self.changed(CountChange::Snap));
                } else if value > self.state.current && value > self.state.updated {
                    self.state.updated = value;
                    events.push(Event::CounterTargetRaised {
                        current: self.state.current,
                        updated: value,
                        at: Utc::now(),
                    });
                }

                // A gap of one would leave the stepper a single unit short.
                if self.state.gap() == 1 {
                    self.state.current += 1;
                    events.push(self.changed(CountChange::Nudge));
                }
                self.plan_steps_per_tick();
            }
            PollOutcome::Failed(reason) => {
                let consecutive = self.health.record_failure();
                tracing::debug!(consecutive, %reason, "counter poll failed");
                events.push(Event::PollFailed {
                    consecutive,
                    reason,
                    at: Utc::now(),
                });
                if self.health.is_halted() {
                    tracing::warn!(
                        failures = consecutive,
                        "counter polling halted; display frozen at {}",
                        self.display()
                    );
                    events.push(Event::PollingHalted {
                        failures: consecutive,
                        at: Utc::now(),
                    });
                }
            }
        }

        events
    }

    /// Advance the display by [`steps_per_tick`](Self::steps_per_tick)
    /// random steps, each in `1..=min(gap, MAX_STEP)`.
    ///
    /// Returns `None` once `current` has caught up with `updated`.
    pub fn step(&mut self) -> Option<Event> {
        if self.state.is_settled() {
            return None;
        }
        for _ in 0..self.steps_per_tick {
            let gap = self.state.gap();
            if gap == 0 {
                break;
            }
            self.state.current += self.rng.gen_range(1..=gap.min(MAX_STEP));
        }
        Some(self.changed(CountChange::Step))
    }

    fn changed(&self, cause: CountChange) -> Event {
        Event::CounterChanged {
            current: self.state.current,
            updated: self.state.updated,
            cause,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn animator() -> CounterAnimator {
        CounterAnimator::new(Duration::from_millis(8_000), Some(7))
    }

    fn causes(events: &[Event]) -> Vec<CountChange> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::CounterChanged { cause, .. } => Some(*cause),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn first_reading_snaps_without_animation() {
        let mut a = animator();
        let events = a.on_poll(PollOutcome::Count(57));
        assert_eq!(causes(&events), vec![CountChange::Snap]);
        assert_eq!(a.state(), CountState { current: 57, updated: 57 });
        assert_eq!(a.animation_period(), None);
        assert!(a.step().is_none());
    }

    #[test]
    fn gap_of_one_is_closed_directly() {
        let mut a = animator();
        a.on_poll(PollOutcome::Count(10));
        let events = a.on_poll(PollOutcome::Count(11));
        assert_eq!(causes(&events), vec![CountChange::Nudge]);
        assert_eq!(a.state(), CountState { current: 11, updated: 11 });
        assert!(a.step().is_none());
    }

    #[test]
    fn larger_gap_raises_target_and_animates() {
        let mut a = animator();
        a.on_poll(PollOutcome::Count(100));
        let events = a.on_poll(PollOutcome::Count(140));
        assert!(matches!(
            events.as_slice(),
            [Event::CounterTargetRaised { current: 100, updated: 140, .. }]
        ));
        assert_eq!(a.animation_period(), Some(Duration::from_millis(200)));

        let mut steps = 0;
        while let Some(Event::CounterChanged { current, updated, cause, .. }) = a.step() {
            assert_eq!(cause, CountChange::Step);
            assert!(current <= updated);
            steps += 1;
        }
        assert_eq!(a.state(), CountState { current: 140, updated: 140 });
        assert!((8..=40).contains(&steps));
    }

    #[test]
    fn smaller_readings_never_lower_the_target() {
        let mut a = animator();
        a.on_poll(PollOutcome::Count(100));
        a.on_poll(PollOutcome::Count(150));
        a.step();
        let before = a.state();
        let events = a.on_poll(PollOutcome::Count(120));
        assert!(causes(&events).iter().all(|c| *c == CountChange::Nudge));
        assert_eq!(a.state().updated, 150);
        assert!(a.state().current >= before.current);
    }

    #[test]
    fn three_failures_halt_polling_for_good() {
        let mut a = animator();
        a.on_poll(PollOutcome::Count(5));
        for expected in 1..=2 {
            a.on_poll(PollOutcome::Failed("timeout".into()));
            assert_eq!(a.health().failures(), expected);
            assert!(!a.polling_halted());
        }
        let events = a.on_poll(PollOutcome::Failed("timeout".into()));
        assert!(matches!(events.last(), Some(Event::PollingHalted { failures: 3, .. })));
        assert!(a.polling_halted());

        // No reset path, and readings are ignored from here on.
        assert!(a.on_poll(PollOutcome::Count(500)).is_empty());
        assert_eq!(a.state(), CountState { current: 5, updated: 5 });
        assert!(a.polling_halted());
    }

    #[test]
    fn success_resets_failure_count() {
        let mut a = animator();
        a.on_poll(PollOutcome::Failed("x".into()));
        a.on_poll(PollOutcome::Failed("x".into()));
        a.on_poll(PollOutcome::Count(3));
        assert_eq!(a.health().failures(), 0);
    }

    #[test]
    fn zero_and_non_finite_readings_are_failures() {
        assert!(matches!(PollOutcome::from(Ok(0.0)), PollOutcome::Failed(_)));
        assert!(matches!(PollOutcome::from(Ok(f64::NAN)), PollOutcome::Failed(_)));
        assert!(matches!(
            PollOutcome::from(Err(FetchError::Unavailable("down".into()))),
            PollOutcome::Failed(_)
        ));
        assert_eq!(PollOutcome::from(Ok(1234.9)), PollOutcome::Count(1234));
        assert_eq!(PollOutcome::from(Ok(-4.0)), PollOutcome::Count(0));
    }

    #[test]
    fn display_is_grouped() {
        let mut a = animator();
        a.on_poll(PollOutcome::Count(1_234_567));
        assert_eq!(a.display(), "1,234,567");
    }

    #[test]
    fn huge_gap_still_finishes_within_budget() {
        let budget = Duration::from_millis(8_000);
        let mut a = CounterAnimator::new(budget, Some(3));
        a.on_poll(PollOutcome::Count(1_000));
        a.on_poll(PollOutcome::Count(101_000));

        let period = a.animation_period().unwrap();
        assert_eq!(period, MIN_PERIOD);
        assert_eq!(a.steps_per_tick(), 13);

        let mut ticks: u32 = 0;
        while a.step().is_some() {
            ticks += 1;
        }
        assert_eq!(a.state(), CountState { current: 101_000, updated: 101_000 });
        assert!(period * ticks <= budget, "{ticks} ticks overran the budget");
    }

    #[test]
    fn small_gap_takes_one_step_per_tick() {
        let mut a = animator();
        a.on_poll(PollOutcome::Count(100));
        a.on_poll(PollOutcome::Count(140));
        assert_eq!(a.steps_per_tick(), 1);
    }

    proptest! {
        #[test]
        fn steps_are_monotonic_and_bounded(
            seed in any::<u64>(),
            start in 1u64..1_000,
            gap in 2u64..500,
        ) {
            let mut a = CounterAnimator::new(Duration::from_millis(8_000), Some(seed));
            a.on_poll(PollOutcome::Count(start));
            a.on_poll(PollOutcome::Count(start + gap));
            let mut last = a.state().current;
            while a.step().is_some() {
                let s = a.state();
                prop_assert!(s.current > last);
                prop_assert!(s.current - last <= MAX_STEP);
                prop_assert!(s.current <= s.updated);
                last = s.current;
            }
            prop_assert_eq!(a.state().current, start + gap);
            prop_assert!(a.step().is_none());
        }
    }
}
