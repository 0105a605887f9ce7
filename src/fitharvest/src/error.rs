use fitharvest_algos::AggregationError;
use fitharvest_codec::FitError;
use strum::IntoStaticStr;
use thiserror::Error;
use zip::result::ZipError;

#[derive(Debug, Error, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum HarvestError {
    /// The root export could not be opened. Fatal for the whole run.
    #[error("cannot open archive {name}: {source}")]
    ArchiveOpen { name: String, source: ZipError },
    /// A part archive inside the export could not be read; its entries are skipped.
    #[error("cannot read part archive {part}: {source}")]
    PartArchive { part: String, source: ZipError },
    #[error("cannot read {part}/{entry}: {source}")]
    EntryRead {
        part: String,
        entry: String,
        source: ZipError,
    },
    #[error("malformed stream in {entry}: {source}")]
    MalformedStream { entry: String, source: FitError },
    #[error("cannot start decode workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

impl HarvestError {
    /// Short machine-readable name of the failure.
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Part or entry the failure refers to.
    pub fn location(&self) -> String {
        match self {
            Self::ArchiveOpen { name, .. } => name.clone(),
            Self::PartArchive { part, .. } => part.clone(),
            Self::EntryRead { part, entry, .. } => format!("{part}/{entry}"),
            Self::MalformedStream { entry, .. } => entry.clone(),
            Self::WorkerPool(_) | Self::Aggregation(_) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_location() {
        let error = HarvestError::MalformedStream {
            entry: "p.zip/a.fit".to_string(),
            source: FitError::InvalidFileCrc,
        };
        assert_eq!(error.kind(), "malformed_stream");
        assert_eq!(error.location(), "p.zip/a.fit");
        assert_eq!(error.to_string(), "malformed stream in p.zip/a.fit: InvalidFileCrc");

        let error = HarvestError::EntryRead {
            part: "p.zip".to_string(),
            entry: "a.fit".to_string(),
            source: ZipError::FileNotFound,
        };
        assert_eq!(error.kind(), "entry_read");
        assert_eq!(error.location(), "p.zip/a.fit");
    }
}
