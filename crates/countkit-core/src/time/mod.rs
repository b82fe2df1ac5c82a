mod calibrator;
mod clock;
mod parse;

pub use calibrator::{
    adjust_offset_for_dst, decompose, time_difference_ms, Remaining, TimeCalibrator,
    DEFAULT_OFFSET_HOURS,
};
pub use clock::{Clock, FixedClock, SystemClock, TokioClock};
pub use parse::parse_instant;
