#[macro_use]
extern crate serde;

mod error;
pub use error::AggregationError;

pub(crate) mod window;
pub use window::{TimeWindow, parse_time_of_day};

pub(crate) mod config;
pub use config::{AggregationConfig, Percentile};

pub(crate) mod daily;
pub use daily::{DailyAggregate, DailyAggregator, DailyTable, PercentileValue};

pub mod helpers;
