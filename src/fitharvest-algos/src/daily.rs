use std::{collections::BTreeMap, fmt};

use chrono::NaiveDate;
use fitharvest_types::Sample;

use crate::{
    AggregationConfig, AggregationError, Percentile,
    helpers::stats::{mean, mean_bpm, percentile},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileValue {
    pub percentile: Percentile,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub mean: f64,
    pub min: u8,
    pub max: u8,
    pub count: usize,
    pub coverage_pct: f64,
    pub percentiles: Vec<PercentileValue>,
    /// Mean of `mean` over the trailing rolling window of existing rows.
    pub rolling_mean: f64,
    /// Rolling means of each percentile column, empty unless requested.
    pub rolling_percentiles: Vec<PercentileValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTable {
    pub config: AggregationConfig,
    pub rows: Vec<DailyAggregate>,
    /// Samples that passed the time-of-day filter.
    pub sample_count: usize,
}

impl DailyTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|row| row.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|row| row.date)
    }
}

pub struct DailyAggregator {
    config: AggregationConfig,
}

impl DailyAggregator {
    pub fn new(config: AggregationConfig) -> Result<Self, AggregationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Per-day aggregates of `samples`, ordered by date. Pure: the same
    /// samples and config always produce the same table.
    pub fn aggregate(&self, samples: &[Sample]) -> DailyTable {
        let window = self.config.time_window;

        let mut days: BTreeMap<NaiveDate, Vec<u8>> = BTreeMap::new();
        let mut sample_count = 0;
        for sample in samples
            .iter()
            .filter(|sample| window.contains(sample.timestamp.time()))
        {
            days.entry(sample.timestamp.date_naive())
                .or_default()
                .push(sample.heart_rate);
            sample_count += 1;
        }

        let minutes = window.minutes();
        let mut rows = days
            .into_iter()
            .filter_map(|(date, values)| self.day(date, values, minutes))
            .collect::<Vec<_>>();
        self.apply_rolling(&mut rows);

        DailyTable {
            config: self.config.clone(),
            rows,
            sample_count,
        }
    }

    fn day(&self, date: NaiveDate, mut values: Vec<u8>, minutes: f64) -> Option<DailyAggregate> {
        values.sort_unstable();
        let min = *values.first()?;
        let max = *values.last()?;
        let count = values.len();

        let percentiles = self
            .config
            .percentiles
            .iter()
            .map(|&p| PercentileValue {
                percentile: p,
                value: percentile(&values, p.value()),
            })
            .collect();

        Some(DailyAggregate {
            date,
            mean: mean_bpm(&values),
            min,
            max,
            count,
            coverage_pct: f64::min(100.0, count as f64 / minutes * 100.0),
            percentiles,
            rolling_mean: 0.0,
            rolling_percentiles: Vec::new(),
        })
    }

    /// Trailing window over existing rows; days without data are not filled in.
    fn apply_rolling(&self, rows: &mut [DailyAggregate]) {
        let window = self.config.rolling_window_days as usize;

        let rolled = (0..rows.len())
            .map(|i| {
                let trailing = &rows[(i + 1).saturating_sub(window)..=i];
                let rolling_mean = mean(&trailing.iter().map(|row| row.mean).collect::<Vec<_>>());

                let rolling_percentiles = if self.config.roll_percentiles {
                    self.config
                        .percentiles
                        .iter()
                        .enumerate()
                        .map(|(column, &p)| PercentileValue {
                            percentile: p,
                            value: mean(
                                &trailing
                                    .iter()
                                    .map(|row| row.percentiles[column].value)
                                    .collect::<Vec<_>>(),
                            ),
                        })
                        .collect()
                } else {
                    Vec::new()
                };

                (rolling_mean, rolling_percentiles)
            })
            .collect::<Vec<_>>();

        for (row, (rolling_mean, rolling_percentiles)) in rows.iter_mut().zip(rolled) {
            row.rolling_mean = rolling_mean;
            row.rolling_percentiles = rolling_percentiles;
        }
    }
}

impl fmt::Display for DailyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<10} {:>7} {:>4} {:>4} {:>6} {:>9}",
            "date", "mean", "min", "max", "count", "coverage"
        )?;
        for p in &self.config.percentiles {
            write!(f, " {:>7}", p.to_string())?;
        }
        write!(f, " {:>7}", format!("roll{}", self.config.rolling_window_days))?;
        if self.config.roll_percentiles {
            for p in &self.config.percentiles {
                write!(f, " {:>9}", format!("roll{p}"))?;
            }
        }
        writeln!(f)?;

        for row in &self.rows {
            write!(
                f,
                "{:<10} {:>7.2} {:>4} {:>4} {:>6} {:>8.1}%",
                row.date.to_string(),
                row.mean,
                row.min,
                row.max,
                row.count,
                row.coverage_pct
            )?;
            for value in &row.percentiles {
                write!(f, " {:>7.2}", value.value)?;
            }
            write!(f, " {:>7.2}", row.rolling_mean)?;
            for value in &row.rolling_percentiles {
                write!(f, " {:>9.2}", value.value)?;
            }
            writeln!(f)?;
        }

        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => write!(
                f,
                "{} samples over {} days ({first} to {last}), window {}",
                self.sample_count,
                self.rows.len(),
                self.config.time_window
            ),
            _ => write!(f, "no samples in window {}", self.config.time_window),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, NaiveTime, TimeDelta, TimeZone, Utc};
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;
    use crate::TimeWindow;

    fn start_of(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    fn per_minute(start: DateTime<Utc>, count: i64, bpm: u8) -> Vec<Sample> {
        let source: Arc<str> = Arc::from("part/file.fit");
        (0..count)
            .map(|i| Sample::new(start + TimeDelta::minutes(i), bpm, source.clone()))
            .collect()
    }

    fn sample_at(time: DateTime<Utc>, bpm: u8) -> Sample {
        Sample::new(time, bpm, Arc::from("part/file.fit"))
    }

    fn aggregator(config: AggregationConfig) -> DailyAggregator {
        DailyAggregator::new(config).unwrap()
    }

    #[test]
    fn empty_input_yields_empty_table() {
        let table = aggregator(AggregationConfig::default()).aggregate(&[]);
        assert!(table.is_empty());
        assert_eq!(table.sample_count, 0);
        assert_eq!(table.to_string().lines().last(), Some("no samples in window full day"));
    }

    #[test]
    fn daily_statistics() {
        let day = start_of(2024, 1, 10);
        let samples = vec![
            sample_at(day + TimeDelta::hours(1), 50),
            sample_at(day + TimeDelta::hours(2), 60),
            sample_at(day + TimeDelta::hours(3), 70),
            sample_at(day + TimeDelta::hours(4), 80),
        ];
        let config = AggregationConfig::default()
            .with_percentiles(vec![Percentile::new(50.0).unwrap(), Percentile::new(25.0).unwrap()]);
        let table = aggregator(config).aggregate(&samples);

        assert_eq!(table.rows.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row.date, day.date_naive());
        assert_eq!(row.mean, 65.0);
        assert_eq!(row.min, 50);
        assert_eq!(row.max, 80);
        assert_eq!(row.count, 4);
        assert_eq!(row.percentiles[0].value, 65.0);
        assert_eq!(row.percentiles[1].value, 57.5);
        assert_eq!(row.rolling_mean, 65.0);
    }

    #[test]
    fn groups_by_utc_date_in_order() {
        let samples = vec![
            sample_at(start_of(2024, 1, 12) + TimeDelta::hours(5), 70),
            sample_at(start_of(2024, 1, 10) + TimeDelta::hours(23), 60),
            sample_at(start_of(2024, 1, 11), 65),
        ];
        let table = aggregator(AggregationConfig::default()).aggregate(&samples);
        let dates = table.rows.iter().map(|row| row.date).collect::<Vec<_>>();
        assert_eq!(
            dates,
            vec![
                start_of(2024, 1, 10).date_naive(),
                start_of(2024, 1, 11).date_naive(),
                start_of(2024, 1, 12).date_naive(),
            ]
        );
    }

    #[test]
    fn full_day_coverage_is_complete() {
        let table = aggregator(AggregationConfig::default())
            .aggregate(&per_minute(start_of(2024, 2, 1), 1440, 60));
        assert_eq!(table.rows[0].count, 1440);
        assert_eq!(table.rows[0].coverage_pct, 100.0);
    }

    #[test]
    fn half_day_coverage() {
        let table = aggregator(AggregationConfig::default())
            .aggregate(&per_minute(start_of(2024, 2, 1), 720, 60));
        assert_eq!(table.rows[0].coverage_pct, 50.0);
    }

    #[test]
    fn duplicate_samples_clip_coverage() {
        let day = start_of(2024, 2, 1);
        let mut samples = per_minute(day, 1440, 60);
        samples.extend(per_minute(day, 560, 61));
        let table = aggregator(AggregationConfig::default()).aggregate(&samples);
        assert_eq!(table.rows[0].count, 2000);
        assert_eq!(table.rows[0].coverage_pct, 100.0);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let day = start_of(2024, 3, 3);
        let window = TimeWindow::new(
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        );
        let samples = vec![
            sample_at(day + TimeDelta::hours(8), 55),
            sample_at(day + TimeDelta::hours(9), 65),
            sample_at(day + TimeDelta::hours(9) + TimeDelta::seconds(1), 200),
            sample_at(day + TimeDelta::hours(7) + TimeDelta::minutes(59), 200),
        ];
        let table = aggregator(AggregationConfig::default().with_time_window(window))
            .aggregate(&samples);
        assert_eq!(table.sample_count, 2);
        assert_eq!(table.rows[0].count, 2);
        assert_eq!(table.rows[0].mean, 60.0);
        // 2 samples over a 60 minute window
        assert!((table.rows[0].coverage_pct - 2.0 / 60.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn rolling_mean_uses_existing_rows_only() {
        // three days with data, one missing day in between
        let samples = vec![
            sample_at(start_of(2024, 4, 1), 60),
            sample_at(start_of(2024, 4, 2), 70),
            sample_at(start_of(2024, 4, 4), 80),
        ];
        let config = AggregationConfig::default().with_rolling_window_days(2);
        let table = aggregator(config).aggregate(&samples);
        let rolling = table.rows.iter().map(|row| row.rolling_mean).collect::<Vec<_>>();
        assert_eq!(rolling, vec![60.0, 65.0, 75.0]);
    }

    #[test]
    fn rolling_percentiles_when_requested() {
        let samples = vec![
            sample_at(start_of(2024, 4, 1), 60),
            sample_at(start_of(2024, 4, 1) + TimeDelta::hours(1), 80),
            sample_at(start_of(2024, 4, 2), 100),
        ];
        let p50 = Percentile::new(50.0).unwrap();
        let config = AggregationConfig::default()
            .with_rolling_window_days(3)
            .with_percentiles(vec![p50]);

        let table = aggregator(config.clone()).aggregate(&samples);
        assert!(table.rows[1].rolling_percentiles.is_empty());

        let table = aggregator(config.with_rolling_percentiles(true)).aggregate(&samples);
        assert_eq!(
            table.rows[1].rolling_percentiles,
            vec![PercentileValue {
                percentile: p50,
                value: 85.0
            }]
        );
    }

    #[test]
    fn aggregation_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let base = start_of(2024, 6, 1);
        let source: Arc<str> = Arc::from("part/file.fit");
        let samples = (0..5_000)
            .map(|_| {
                Sample::new(
                    base + TimeDelta::seconds(rng.random_range(0..14 * 86_400)),
                    rng.random_range(40..=180),
                    source.clone(),
                )
            })
            .collect::<Vec<_>>();

        let config = AggregationConfig::default()
            .with_time_window(TimeWindow::new(
                NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            ))
            .with_percentiles(vec![
                Percentile::new(5.0).unwrap(),
                Percentile::new(95.0).unwrap(),
            ])
            .with_rolling_percentiles(true);
        let aggregator = aggregator(config);

        let first = aggregator.aggregate(&samples);
        let second = aggregator.aggregate(&samples);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = AggregationConfig::default().with_rolling_window_days(0);
        assert!(DailyAggregator::new(config).is_err());
    }

    #[test]
    fn table_display_has_header_and_summary() {
        let samples = per_minute(start_of(2024, 2, 1), 3, 60);
        let config = AggregationConfig::default().with_percentiles(vec![Percentile::new(90.0).unwrap()]);
        let text = aggregator(config).aggregate(&samples).to_string();
        let lines = text.lines().collect::<Vec<_>>();
        assert!(lines[0].starts_with("date"));
        assert!(lines[0].contains("p90"));
        assert!(lines[1].starts_with("2024-02-01"));
        assert_eq!(lines[2], "3 samples over 1 days (2024-02-01 to 2024-02-01), window full day");
    }
}
