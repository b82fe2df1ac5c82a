//! Offset calibration and remaining-time arithmetic.
//!
//! A countdown's target is expressed as a wall time in some fixed zone
//! (`utc_offset` hours behind UTC, the sign convention of a client's
//! timezone offset), while the viewer may sit anywhere. The calibrator
//! shifts the client's "now" into that zone and measures the distance to
//! the target.
//!
//! ## DST correction
//!
//! A fixed offset cannot follow daylight saving. When the calibrated now and
//! the target disagree on DST status the offset is nudged by one hour:
//!
//! ```text
//! dst_now && !dst_end  -> offset - 1
//! !dst_now && dst_end  -> offset + 1
//! otherwise            -> offset
//! ```
//!
//! This is an approximation, not a zone-database lookup.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};

/// Offset used when a caller does not supply one (UTC-8).
pub const DEFAULT_OFFSET_HOURS: i32 = 8;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// A non-negative time span split into display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Remaining {
    pub days: u64,
    /// 0..=23
    pub hours: u64,
    /// 0..=59
    pub minutes: u64,
    /// 0..=59
    pub seconds: u64,
    /// The span the units were derived from, in milliseconds.
    pub total_ms: u64,
}

impl Remaining {
    /// Split a millisecond span into days, hours, minutes and seconds.
    ///
    /// Sub-second remainders are floored away from the units but kept in
    /// `total_ms`, so a span of 400 ms reads as all-zero units yet is still
    /// distinguishable from zero.
    pub fn from_ms(ms: u64) -> Self {
        Self {
            days: ms / MS_PER_DAY,
            hours: (ms / MS_PER_HOUR) % 24,
            minutes: (ms / MS_PER_MINUTE) % 60,
            seconds: (ms / MS_PER_SECOND) % 60,
            total_ms: ms,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.total_ms == 0
    }

    /// Milliseconds represented by the unit fields alone.
    pub fn unit_ms(&self) -> u64 {
        self.days * MS_PER_DAY
            + self.hours * MS_PER_HOUR
            + self.minutes * MS_PER_MINUTE
            + self.seconds * MS_PER_SECOND
    }
}

/// See [`Remaining::from_ms`].
pub fn decompose(ms: u64) -> Remaining {
    Remaining::from_ms(ms)
}

/// Milliseconds from `start` to `end`, clamped at zero.
pub fn time_difference_ms(end: DateTime<Utc>, start: DateTime<Utc>) -> u64 {
    let diff = (end - start).num_milliseconds();
    u64::try_from(diff).unwrap_or(0)
}

/// Apply the one-hour DST nudge to an offset.
pub fn adjust_offset_for_dst(offset_hours: i32, dst_now: bool, dst_end: bool) -> i32 {
    match (dst_now, dst_end) {
        (true, false) => offset_hours - 1,
        (false, true) => offset_hours + 1,
        _ => offset_hours,
    }
}

/// Computes calibrated instants and remaining durations for one client zone.
#[derive(Debug, Clone)]
pub struct TimeCalibrator<Z: TimeZone, C: Clock = SystemClock> {
    zone: Z,
    clock: C,
}

impl TimeCalibrator<Local> {
    /// Calibrator for the machine's local zone and system clock.
    pub fn local() -> Self {
        Self::new(Local)
    }
}

impl<Z: TimeZone> TimeCalibrator<Z> {
    pub fn new(zone: Z) -> Self {
        Self {
            zone,
            clock: SystemClock,
        }
    }
}

impl<Z: TimeZone, C: Clock> TimeCalibrator<Z, C> {
    pub fn with_clock(zone: Z, clock: C) -> Self {
        Self { zone, clock }
    }

    pub fn zone(&self) -> &Z {
        &self.zone
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Minutes the client zone is behind UTC at a given UTC wall time.
    fn west_minutes_at(&self, utc: &NaiveDateTime) -> i32 {
        -self.zone.offset_from_utc_datetime(utc).fix().local_minus_utc() / 60
    }

    /// Whether the client zone observes daylight saving at `instant`.
    ///
    /// True when the instant's offset is smaller (in minutes west of UTC)
    /// than the larger of the January 1 and July 1 offsets of the same year.
    /// Works in both hemispheres and is false everywhere for zones without
    /// DST.
    pub fn is_daylight_saving(&self, instant: DateTime<Utc>) -> bool {
        let year = instant.with_timezone(&self.zone).year();
        let reference = |month| {
            NaiveDate::from_ymd_opt(year, month, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        };
        let (Some(january), Some(july)) = (reference(1), reference(7)) else {
            return false;
        };
        let standard = self
            .west_minutes_at(&january)
            .max(self.west_minutes_at(&july));
        self.west_minutes_at(&instant.naive_utc()) < standard
    }

    /// Offset a widget should assume when none is configured: 7 while the
    /// client observes DST, 8 otherwise.
    pub fn default_offset_hours(&self) -> i32 {
        if self.is_daylight_saving(self.clock.now()) {
            DEFAULT_OFFSET_HOURS - 1
        } else {
            DEFAULT_OFFSET_HOURS
        }
    }

    /// The client's now, shifted as if observed from `offset_hours` behind UTC.
    pub fn calibrated_now(&self, offset_hours: i32) -> DateTime<Utc> {
        let now = self.clock.now();
        let local_ms = i64::from(self.west_minutes_at(&now.naive_utc())) * 60_000;
        let target_ms = i64::from(offset_hours) * 3_600_000;
        if local_ms == target_ms {
            return now;
        }
        now + Duration::milliseconds(target_ms - local_ms)
    }

    /// Milliseconds until `end` from `start`, or from the clock's now.
    pub fn time_difference_ms(&self, end: DateTime<Utc>, start: Option<DateTime<Utc>>) -> u64 {
        time_difference_ms(end, start.unwrap_or_else(|| self.clock.now()))
    }

    /// Time left until `end`, observed from the DST-corrected offset.
    ///
    /// `offset_hours` defaults to [`DEFAULT_OFFSET_HOURS`].
    pub fn remaining_until(&self, end: DateTime<Utc>, offset_hours: Option<i32>) -> Remaining {
        let offset = offset_hours.unwrap_or(DEFAULT_OFFSET_HOURS);
        let dst_now = self.is_daylight_saving(self.calibrated_now(offset));
        let dst_end = self.is_daylight_saving(end);
        let adjusted = adjust_offset_for_dst(offset, dst_now, dst_end);
        if adjusted != offset {
            tracing::trace!(offset, adjusted, dst_now, dst_end, "DST offset correction");
        }
        let start = self.calibrated_now(adjusted);
        decompose(time_difference_ms(end, start))
    }
}
