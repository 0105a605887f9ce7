#[macro_use]
extern crate log;

use std::{
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::Context;
use chrono::NaiveTime;
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use fitharvest::{
    CancelFlag, Explorer, HarvestConfig,
    harvester::{ArchiveLayout, Selection},
};
use fitharvest_algos::{AggregationConfig, Percentile, TimeWindow, parse_time_of_day};

#[derive(Parser)]
pub struct FitHarvestCli {
    /// Account export archive holding the `UploadedFiles` parts
    #[arg(env, long)]
    pub archive: PathBuf,
    /// Decode only the newest N data files
    #[arg(env, long)]
    pub limit: Option<u32>,
    #[arg(env, long, default_value = "UploadedFiles")]
    pub part_marker: String,
    #[arg(env, long, default_value = ".zip")]
    pub part_suffix: String,
    #[arg(env, long, default_value = ".fit")]
    pub data_suffix: String,
    /// Decode threads, 0 for one per core
    #[arg(env, long, default_value_t = 0)]
    pub workers: usize,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
    #[clap(subcommand)]
    pub subcommand: FitHarvestCommand,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum FitHarvestCommand {
    ///
    /// Print per-day heart rate statistics
    ///
    Daily {
        /// Window start, HH:MM or HH:MM:SS (UTC)
        #[arg(long, value_parser = parse_time_of_day)]
        start: Option<NaiveTime>,
        /// Window end, inclusive. Equal to start means the whole day; defaults to 23:59:59
        #[arg(long, value_parser = parse_time_of_day)]
        end: Option<NaiveTime>,
        #[arg(long, default_value_t = 7)]
        rolling_days: u32,
        /// Comma separated, e.g. `5,50,95`
        #[arg(long, value_delimiter = ',')]
        percentiles: Vec<Percentile>,
        /// Also roll the percentile columns
        #[arg(long)]
        roll_percentiles: bool,
    },
    ///
    /// Dump the merged sample stream
    ///
    Samples,
    ///
    /// Print harvest and decode counters
    ///
    Diagnostics,
}

fn main() -> anyhow::Result<()> {
    let env_file = dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(error) = env_file {
        debug!("{}", error);
    }

    let cli = FitHarvestCli::parse();

    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || {
        warn!("stopping after running decodes finish");
        handler_flag.cancel();
    })?;

    let config = HarvestConfig::default()
        .with_layout(ArchiveLayout {
            part_marker: cli.part_marker,
            part_suffix: cli.part_suffix,
            data_suffix: cli.data_suffix,
        })
        .with_selection(Selection::from_limit(cli.limit))
        .with_workers(cli.workers);
    let mut explorer = Explorer::new(config, cancel)?;

    let dataset = explorer
        .load_path(&cli.archive)
        .with_context(|| format!("failed to load {}", cli.archive.display()))?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match cli.subcommand {
        FitHarvestCommand::Daily {
            start,
            end,
            rolling_days,
            percentiles,
            roll_percentiles,
        } => {
            let config = AggregationConfig::default()
                .with_time_window(TimeWindow::from_bounds(start, end))
                .with_rolling_window_days(rolling_days)
                .with_percentiles(percentiles)
                .with_rolling_percentiles(roll_percentiles);
            let table = explorer.aggregate(&dataset, config)?;

            match cli.format {
                OutputFormat::Table => writeln!(out, "{}", table)?,
                OutputFormat::Json => {
                    let report = serde_json::json!({
                        "outcome": dataset.diagnostics.outcome(),
                        "diagnostics": dataset.diagnostics,
                        "table": table,
                    });
                    serde_json::to_writer_pretty(&mut out, &report)?;
                    writeln!(out)?;
                }
            }
        }
        FitHarvestCommand::Samples => match cli.format {
            OutputFormat::Table => {
                writeln!(out, "timestamp,heart_rate,source")?;
                for sample in &dataset.samples {
                    writeln!(out, "{}", sample)?;
                }
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut out, &dataset.samples)?;
                writeln!(out)?;
            }
        },
        FitHarvestCommand::Diagnostics => match cli.format {
            OutputFormat::Table => write!(out, "{}", dataset.diagnostics)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut out, &dataset.diagnostics)?;
                writeln!(out)?;
            }
        },
    }

    out.flush()?;
    Ok(())
}
