mod animator;
mod driver;
mod source;

pub use animator::{
    CountState, CounterAnimator, PollHealth, PollOutcome, MAX_STEP, POLL_FAILURE_LIMIT,
};
pub use driver::run_counter;
pub use source::{extract_count, DataSource, HttpDataSource};
