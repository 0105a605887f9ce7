use std::{collections::BTreeMap, fmt};

use fitharvest_codec::{FileTypeCode, FitError};
use serde::Serialize;

use crate::HarvestError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: &'static str,
    pub location: String,
    pub detail: String,
}

impl From<&HarvestError> for Issue {
    fn from(error: &HarvestError) -> Self {
        Self {
            kind: error.kind(),
            location: error.location(),
            detail: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Complete,
    /// Stopped early; the dataset covers only the files decoded before.
    Cancelled,
    /// Nothing failed fatally but no sample was produced.
    EmptyResult,
}

/// Census bucket of one file that was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Typed(FileTypeCode),
    /// No `file_id` type to classify by.
    Unknown,
    /// Bytes could not be read or decoded far enough to classify.
    Corrupted,
}

impl From<&FitError> for FileKind {
    fn from(error: &FitError) -> Self {
        match error {
            FitError::MissingFileId => Self::Unknown,
            _ => Self::Corrupted,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Typed(code) => write!(f, "{code}"),
            Self::Unknown => f.write_str("unknown"),
            Self::Corrupted => f.write_str("corrupted"),
        }
    }
}

/// Counters and per-file failures of one harvest and decode run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub parts_found: usize,
    pub parts_failed: usize,
    pub files_found: usize,
    pub files_selected: usize,
    pub files_decoded: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub files_cancelled: usize,
    pub monitoring_records: usize,
    pub unresolved_timestamps: usize,
    pub samples: usize,
    /// Files read per FIT file type, plus `unknown` and `corrupted`.
    pub file_types: BTreeMap<String, usize>,
    pub issues: Vec<Issue>,
}

impl Diagnostics {
    pub fn record_issue(&mut self, error: &HarvestError) {
        warn!("{error}");
        self.issues.push(Issue::from(error));
    }

    pub fn count_file_kind(&mut self, kind: FileKind) {
        *self.file_types.entry(kind.to_string()).or_default() += 1;
    }

    pub fn outcome(&self) -> Outcome {
        if self.files_cancelled > 0 {
            Outcome::Cancelled
        } else if self.samples == 0 {
            Outcome::EmptyResult
        } else {
            Outcome::Complete
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "parts: {} found, {} failed",
            self.parts_found, self.parts_failed
        )?;
        writeln!(
            f,
            "files: {} found, {} selected, {} decoded, {} skipped, {} failed, {} cancelled",
            self.files_found,
            self.files_selected,
            self.files_decoded,
            self.files_skipped,
            self.files_failed,
            self.files_cancelled
        )?;
        writeln!(
            f,
            "records: {} monitoring, {} unresolved timestamps, {} samples",
            self.monitoring_records, self.unresolved_timestamps, self.samples
        )?;
        for (file_type, count) in &self.file_types {
            writeln!(f, "  {file_type}: {count}")?;
        }
        for issue in &self.issues {
            writeln!(f, "  [{}] {}", issue.kind, issue.detail)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fitharvest_codec::FileType;

    use super::*;

    #[test]
    fn outcome() {
        let mut diagnostics = Diagnostics::default();
        assert_eq!(diagnostics.outcome(), Outcome::EmptyResult);

        diagnostics.samples = 10;
        assert_eq!(diagnostics.outcome(), Outcome::Complete);

        diagnostics.files_cancelled = 2;
        assert_eq!(diagnostics.outcome(), Outcome::Cancelled);
    }

    #[test]
    fn cancelled_without_samples_is_not_empty() {
        let diagnostics = Diagnostics {
            files_selected: 1,
            files_cancelled: 1,
            ..Default::default()
        };
        assert_eq!(diagnostics.outcome(), Outcome::Cancelled);
    }

    #[test]
    fn file_type_census() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.count_file_kind(FileKind::Typed(FileType::MonitoringB.into()));
        diagnostics.count_file_kind(FileKind::Typed(FileType::MonitoringB.into()));
        diagnostics.count_file_kind(FileKind::Typed(FileTypeCode(250)));
        diagnostics.count_file_kind((&FitError::MissingFileId).into());
        diagnostics.count_file_kind((&FitError::InvalidFileCrc).into());
        diagnostics.count_file_kind((&FitError::Truncated).into());

        assert_eq!(diagnostics.file_types["monitoring_b (32)"], 2);
        assert_eq!(diagnostics.file_types["unknown (250)"], 1);
        assert_eq!(diagnostics.file_types["unknown"], 1);
        assert_eq!(diagnostics.file_types["corrupted"], 2);
        assert!(diagnostics.to_string().contains("  monitoring_b (32): 2"));
    }

    #[test]
    fn issues_from_errors() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.record_issue(&HarvestError::MalformedStream {
            entry: "p.zip/a.fit".to_string(),
            source: FitError::Truncated,
        });
        assert_eq!(
            diagnostics.issues,
            vec![Issue {
                kind: "malformed_stream",
                location: "p.zip/a.fit".to_string(),
                detail: "malformed stream in p.zip/a.fit: Truncated".to_string(),
            }]
        );
        let json = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(json["issues"][0]["kind"], "malformed_stream");
    }
}
