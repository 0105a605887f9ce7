#[macro_use]
extern crate log;

mod error;
pub use error::HarvestError;

mod config;
pub use config::HarvestConfig;

pub mod classifier;
pub mod harvester;
pub mod timekeeper;

mod diagnostics;
pub use diagnostics::{Diagnostics, FileKind, Issue, Outcome};

mod pipeline;
pub use pipeline::{CancelFlag, Dataset, Decoder, FileOutcome, FileReport, process_file};

mod cache;
pub use cache::{DatasetCache, DatasetKey};

mod explorer;
pub use explorer::Explorer;

#[cfg(test)]
mod fixtures;
