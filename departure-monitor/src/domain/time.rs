//! Wall-clock times in departure responses.
//!
//! The provider sends planned and live departure times as bare "HH:MM"
//! strings with no date. [`ClockTime`] parses them and does nothing more:
//! it carries no date, so comparisons across midnight are not meaningful.

use std::fmt;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day with minute precision.
///
/// # Examples
///
/// ```
/// use departure_monitor::domain::ClockTime;
///
/// let t = ClockTime::parse_hhmm("08:05").unwrap();
/// assert_eq!(t.minutes_of_day(), 485);
/// assert_eq!(t.to_string(), "08:05");
///
/// assert!(ClockTime::parse_hhmm("805").is_err());
/// assert!(ClockTime::parse_hhmm("24:00").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime {
    hour: u32,
    minute: u32,
}

impl ClockTime {
    /// Parse a zero-padded "HH:MM" string.
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| TimeError::new("missing ':' separator"))?;
        let hour = two_digits(h).ok_or_else(|| TimeError::new("hour is not two digits"))?;
        let minute = two_digits(m).ok_or_else(|| TimeError::new("minute is not two digits"))?;

        match (hour, minute) {
            (24.., _) => Err(TimeError::new("hour out of range")),
            (_, 60..) => Err(TimeError::new("minute out of range")),
            _ => Ok(Self { hour, minute }),
        }
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Minutes since midnight.
    pub fn minutes_of_day(&self) -> i32 {
        (self.hour * 60 + self.minute) as i32
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

fn two_digits(s: &str) -> Option<u32> {
    if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
