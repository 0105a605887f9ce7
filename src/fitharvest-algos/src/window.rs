use std::fmt;

use chrono::{NaiveTime, Timelike};

use crate::AggregationError;

const SECONDS_PER_DAY: u32 = 86_400;

/// Time-of-day filter, inclusive at both ends.
///
/// `start == end` selects the whole day. `start > end` wraps across midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::full_day()
    }
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Builds a window from optional bounds. A missing start opens at
    /// midnight and a missing end closes at the last second of the day, so a
    /// single bound never turns into an overnight window.
    pub fn from_bounds(start: Option<NaiveTime>, end: Option<NaiveTime>) -> Self {
        match (start, end) {
            (None, None) => Self::full_day(),
            (start, end) => Self::new(
                start.unwrap_or_default(),
                end.unwrap_or_else(last_second_of_day),
            ),
        }
    }

    pub fn full_day() -> Self {
        Self::new(NaiveTime::default(), NaiveTime::default())
    }

    pub fn is_full_day(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.is_full_day() {
            true
        } else if self.start < self.end {
            self.start <= time && time <= self.end
        } else {
            time >= self.start || time <= self.end
        }
    }

    /// Length of the window in minutes, used as the coverage denominator.
    pub fn minutes(&self) -> f64 {
        let start = self.start.num_seconds_from_midnight();
        let end = self.end.num_seconds_from_midnight();
        let seconds = if start == end {
            SECONDS_PER_DAY
        } else if start < end {
            end - start
        } else {
            SECONDS_PER_DAY - (start - end)
        };
        f64::from(seconds) / 60.0
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_full_day() {
            f.write_str("full day")
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

fn last_second_of_day() -> NaiveTime {
    NaiveTime::default() - chrono::TimeDelta::seconds(1)
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, AggregationError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| AggregationError::InvalidTimeOfDay(value.to_string()))
}
