//! Time-of-day activation window.
//!
//! A [`TimeRange`] limits dark mode to part of the day, e.g. `22:00`–`06:00`.
//! Ranges whose start is later than their end wrap past midnight.
//!
//! Range endpoints are stored as the strings the user typed. They are only
//! parsed when a containment check runs, and a range that does not parse is
//! treated as open (every time is inside it). That way a typo in the settings
//! never switches dark mode off for good.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{NocturneError, Result};

const MINUTES_PER_DAY: u16 = 24 * 60;

/// A wall-clock time at minute granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    /// Midnight, `00:00`.
    pub const MIDNIGHT: ClockTime = ClockTime { minutes: 0 };

    /// Builds a time from hours and minutes, or `None` when out of range.
    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(ClockTime {
                minutes: hour * 60 + minute,
            })
        } else {
            None
        }
    }

    /// Parses `HH:MM` (one or two hour digits, two minute digits).
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || NocturneError::InvalidTime(text.to_string());

        let (hour, minute) = text.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        if !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let hour: u16 = hour.parse().map_err(|_| invalid())?;
        let minute: u16 = minute.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).ok_or_else(invalid)
    }

    /// The current local time.
    pub fn now() -> Self {
        Self::from(Local::now().time())
    }

    /// Hour component (0–23).
    pub fn hour(self) -> u16 {
        self.minutes / 60
    }

    /// Minute component (0–59).
    pub fn minute(self) -> u16 {
        self.minutes % 60
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_since_midnight(self) -> u16 {
        self.minutes
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(time: NaiveTime) -> Self {
        // Seconds are dropped; containment is evaluated per minute.
        let minutes = (time.hour() * 60 + time.minute()) as u16;
        ClockTime {
            minutes: minutes % MINUTES_PER_DAY,
        }
    }
}

impl FromStr for ClockTime {
    type Err = NocturneError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// The daily window during which dark mode may activate.
///
/// Serialized as `{"start": "HH:MM", "end": "HH:MM"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

impl TimeRange {
    /// Creates a range from raw `HH:MM` strings. No validation happens here.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        TimeRange {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates a range from parsed clock times.
    pub fn between(start: ClockTime, end: ClockTime) -> Self {
        TimeRange {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    /// Parses both endpoints, failing on the first malformed one.
    pub fn bounds(&self) -> Result<(ClockTime, ClockTime)> {
        Ok((ClockTime::parse(&self.start)?, ClockTime::parse(&self.end)?))
    }

    /// Returns `true` when the range wraps past midnight.
    ///
    /// Malformed ranges never wrap.
    pub fn wraps_midnight(&self) -> bool {
        matches!(self.bounds(), Ok((start, end)) if start > end)
    }

    /// Tests whether `now` falls inside the range, endpoints included.
    ///
    /// A malformed range contains every time.
    pub fn contains(&self, now: ClockTime) -> bool {
        match self.bounds() {
            Ok((start, end)) => contains(start, end, now),
            Err(err) => {
                tracing::warn!(
                    start = %self.start,
                    end = %self.end,
                    error = %err,
                    "ignoring malformed time range"
                );
                true
            }
        }
    }
}

fn contains(start: ClockTime, end: ClockTime, now: ClockTime) -> bool {
    if start <= end {
        start <= now && now <= end
    } else {
        now >= start || now <= end
    }
}
