//! # countkit Core Library
//!
//! This library provides the computational core of two page widgets: a
//! countdown to a fixed instant and an animated counter fed by a polled
//! data source. Markup, styling and transport quirks stay with the host;
//! widgets talk to it through [`Surface`] and [`DataSource`].
//!
//! ## Architecture
//!
//! - **Time calibration**: shifts the client's now into the target's fixed
//!   UTC offset, with a one-hour daylight-saving correction
//! - **Countdown engine**: `Idle -> Ticking -> Ended` state machine that
//!   renders a placeholder template once a second
//! - **Counter animator**: tracks displayed vs. confirmed values and
//!   advances the display in randomized steps inside a time budget,
//!   giving up on a source after three consecutive failed polls
//! - **Scheduler**: one cancellable recurring timer per loop
//!
//! Engines are plain state machines; the async drivers [`run_countdown`]
//! and [`run_counter`] own the timers.
//!
//! ## Key Components
//!
//! - [`TimeCalibrator`]: calibrated now and remaining-time arithmetic
//! - [`CountdownEngine`]: countdown state machine
//! - [`CounterAnimator`]: counter state machine
//! - [`WidgetsConfig`]: TOML widget definitions

pub mod config;
pub mod countdown;
pub mod counter;
pub mod error;
pub mod events;
pub mod format;
pub mod scheduler;
pub mod surface;
pub mod time;

pub use config::{Attributes, CountdownConfig, CounterConfig, WidgetsConfig};
pub use countdown::{run_countdown, CountdownEngine, CountdownState};
pub use counter::{run_counter, CountState, CounterAnimator, DataSource, HttpDataSource, PollOutcome};
pub use error::{ConfigError, CoreError, CountdownError, FetchError};
pub use events::{CountChange, Event};
pub use scheduler::{RecurringTimer, TimerToken};
pub use surface::{MemorySurface, Surface};
pub use time::{Clock, Remaining, TimeCalibrator};
