use std::{fmt, str::FromStr};

use crate::{AggregationError, TimeWindow};

/// A percentile in percent, strictly between 0 and 100.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Percentile(f64);

impl Percentile {
    pub fn new(p: f64) -> Result<Self, AggregationError> {
        if p.is_finite() && p > 0.0 && p < 100.0 {
            Ok(Self(p))
        } else {
            Err(AggregationError::InvalidPercentile(p))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Percentile {
    type Error = AggregationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percentile> for f64 {
    fn from(value: Percentile) -> Self {
        value.0
    }
}

impl FromStr for Percentile {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed.strip_prefix('p').unwrap_or(trimmed);
        let p = number
            .parse::<f64>()
            .map_err(|_| AggregationError::UnparsablePercentile(s.to_string()))?;
        Self::new(p)
    }
}

impl fmt::Display for Percentile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationConfig {
    pub time_window: TimeWindow,
    pub rolling_window_days: u32,
    pub percentiles: Vec<Percentile>,
    /// Also compute rolling means of every percentile column.
    pub roll_percentiles: bool,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            time_window: TimeWindow::full_day(),
            rolling_window_days: 7,
            percentiles: Vec::new(),
            roll_percentiles: false,
        }
    }
}

impl AggregationConfig {
    pub fn with_time_window(self, time_window: TimeWindow) -> Self {
        Self {
            time_window,
            ..self
        }
    }

    pub fn with_rolling_window_days(self, rolling_window_days: u32) -> Self {
        Self {
            rolling_window_days,
            ..self
        }
    }

    pub fn with_percentiles(self, percentiles: Vec<Percentile>) -> Self {
        Self {
            percentiles,
            ..self
        }
    }

    pub fn with_rolling_percentiles(self, roll_percentiles: bool) -> Self {
        Self {
            roll_percentiles,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), AggregationError> {
        if self.rolling_window_days == 0 {
            return Err(AggregationError::InvalidRollingWindow);
        }
        for percentile in &self.percentiles {
            Percentile::new(percentile.value())?;
        }
        Ok(())
    }
}
