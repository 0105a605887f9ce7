use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AggregationError {
    #[error("percentile {0} must lie strictly between 0 and 100")]
    InvalidPercentile(f64),
    #[error("cannot parse percentile `{0}`")]
    UnparsablePercentile(String),
    #[error("rolling window must cover at least one day")]
    InvalidRollingWindow,
    #[error("cannot parse time of day `{0}`, expected HH:MM or HH:MM:SS")]
    InvalidTimeOfDay(String),
}
