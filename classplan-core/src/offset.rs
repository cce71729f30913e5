//! Relative date spans ("publish one week and two days after the previous item").

use std::fmt;

use chrono::{DateTime, Days, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A non-negative (weeks, days) span added to a reference date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateOffset {
    weeks: u32,
    days: u32,
}

/// Adding an offset moved the date outside what the calendar can represent,
/// or onto a wall-clock time that does not exist in the zone (DST gap).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("adding {offset} to {reference} does not give a valid local time")]
pub struct DateOutOfRange {
    pub offset: DateOffset,
    pub reference: String,
}

impl DateOffset {
    pub const ZERO: DateOffset = DateOffset { weeks: 0, days: 0 };

    pub const fn new(weeks: u32, days: u32) -> Self {
        Self { weeks, days }
    }

    pub fn weeks(&self) -> u32 {
        self.weeks
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn total_days(&self) -> u64 {
        u64::from(self.weeks) * 7 + u64::from(self.days)
    }

    pub fn is_zero(&self) -> bool {
        self.total_days() == 0
    }

    /// Calendar addition in the reference's own zone.
    ///
    /// The local wall-clock time is kept, so 09:00 stays 09:00 across a DST
    /// change. On a repeated hour the earlier instant is used.
    pub fn apply<Tz>(&self, reference: &DateTime<Tz>) -> Result<DateTime<Tz>, DateOutOfRange>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        if self.is_zero() {
            return Ok(reference.clone());
        }

        let out_of_range = || DateOutOfRange {
            offset: *self,
            reference: reference.to_rfc3339(),
        };

        let local = reference
            .naive_local()
            .checked_add_days(Days::new(self.total_days()))
            .ok_or_else(out_of_range)?;

        reference
            .timezone()
            .from_local_datetime(&local)
            .earliest()
            .ok_or_else(out_of_range)
    }
}

impl fmt::Display for DateOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}w{}d", self.weeks, self.days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use chrono_tz::America::New_York;

    #[test]
    fn adds_weeks_and_days() {
        let r = New_York.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();
        let out = DateOffset::new(2, 3).apply(&r).unwrap();
        assert_eq!(out, New_York.with_ymd_and_hms(2025, 6, 18, 9, 30, 0).unwrap());
    }

    #[test]
    fn zero_offset_is_identity() {
        let r = New_York.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(DateOffset::ZERO.apply(&r).unwrap(), r);
        assert_eq!(DateOffset::default(), DateOffset::ZERO);
    }

    #[test]
    fn keeps_wall_clock_across_dst() {
        // 2025-03-09 is the spring-forward date in New York.
        let r = New_York.with_ymd_and_hms(2025, 3, 7, 8, 0, 0).unwrap();
        let out = DateOffset::new(0, 3).apply(&r).unwrap();
        assert_eq!(out.hour(), 8);
        assert_eq!((out - r).num_hours(), 71);
    }

    #[test]
    fn nonexistent_local_time_is_rejected() {
        let r = New_York.with_ymd_and_hms(2025, 3, 8, 2, 30, 0).unwrap();
        let err = DateOffset::new(0, 1).apply(&r).unwrap_err();
        assert_eq!(err.offset, DateOffset::new(0, 1));
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(DateOffset::new(1, 4).to_string(), "1w4d");
    }
}
