mod driver;
mod engine;
pub mod template;

pub use driver::{run_countdown, TICK_PERIOD};
pub use engine::{CountdownEngine, CountdownState};
