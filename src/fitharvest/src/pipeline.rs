use std::{
    io::{Read, Seek},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use fitharvest_types::Sample;
use rayon::prelude::*;

use crate::{
    Diagnostics, HarvestError,
    diagnostics::FileKind,
    classifier::{Category, classify},
    harvester::{ExportArchive, Selection},
    timekeeper::{FileSamples, decode_monitoring},
};

/// Shared stop request. Checked before each file decode starts.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Merged, time-ordered samples of an export plus what happened on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub samples: Vec<Sample>,
    pub diagnostics: Diagnostics,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[derive(Debug)]
pub enum FileOutcome {
    Decoded(FileSamples),
    Skipped,
    Failed(HarvestError),
    Cancelled,
}

#[derive(Debug)]
pub struct FileReport {
    /// Census bucket; `None` when the file was never read.
    pub kind: Option<FileKind>,
    pub outcome: FileOutcome,
}

impl FileReport {
    fn unreadable(error: HarvestError) -> Self {
        Self {
            kind: Some(FileKind::Corrupted),
            outcome: FileOutcome::Failed(error),
        }
    }
}

/// Classifies one file and, for monitoring files, decodes its samples.
pub fn process_file(bytes: &[u8], source: &Arc<str>) -> FileReport {
    let malformed = |error| {
        FileOutcome::Failed(HarvestError::MalformedStream {
            entry: source.to_string(),
            source: error,
        })
    };

    let category = classify(bytes);
    let kind = Some(category.kind());
    let outcome = match category {
        Category::DetailedMonitoring(_) => match decode_monitoring(bytes, source) {
            Ok(file) => FileOutcome::Decoded(file),
            Err(error) => malformed(error),
        },
        Category::Other(_) => FileOutcome::Skipped,
        Category::Unreadable(error) => malformed(error),
    };

    FileReport { kind, outcome }
}

impl Diagnostics {
    fn absorb(&mut self, report: FileReport, samples: &mut Vec<Sample>) {
        if let Some(kind) = report.kind {
            self.count_file_kind(kind);
        }

        match report.outcome {
            FileOutcome::Decoded(file) => {
                self.files_decoded += 1;
                self.monitoring_records += file.monitoring_records;
                self.unresolved_timestamps += file.unresolved;
                self.samples += file.samples.len();
                samples.extend(file.samples);
            }
            FileOutcome::Skipped => self.files_skipped += 1,
            FileOutcome::Failed(error) => {
                self.files_failed += 1;
                self.record_issue(&error);
            }
            FileOutcome::Cancelled => self.files_cancelled += 1,
        }
    }
}

/// Decodes the files of an export on a worker pool, one part at a time.
pub struct Decoder {
    pool: rayon::ThreadPool,
    cancel: CancelFlag,
}

impl Decoder {
    /// `workers == 0` sizes the pool to the available cores.
    pub fn new(workers: usize, cancel: CancelFlag) -> Result<Self, HarvestError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("fit-decode-{index}"))
            .build()?;
        Ok(Self { pool, cancel })
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn run<R: Read + Seek>(
        &self,
        archive: &mut ExportArchive<R>,
        selection: Selection,
    ) -> Dataset {
        let harvest = archive.harvest(selection);
        let mut diagnostics = Diagnostics {
            parts_found: harvest.parts,
            parts_failed: harvest.failures.len(),
            files_found: harvest.total_entries,
            files_selected: harvest.manifest.len(),
            ..Default::default()
        };
        for failure in &harvest.failures {
            diagnostics.issues.push(failure.into());
        }

        let mut samples = Vec::new();
        for (part, entries) in harvest.manifest.by_part() {
            if self.cancel.is_cancelled() {
                diagnostics.files_cancelled += entries.len();
                continue;
            }

            let files = match archive.open_part(part) {
                Ok(mut part) => entries
                    .iter()
                    .map(|entry| (entry.source(), part.read_entry(&entry.entry)))
                    .collect::<Vec<_>>(),
                Err(error) => {
                    diagnostics.parts_failed += 1;
                    diagnostics.files_failed += entries.len();
                    diagnostics.record_issue(&error);
                    continue;
                }
            };

            let reports = self.pool.install(|| {
                files
                    .into_par_iter()
                    .map(|(source, bytes)| match bytes {
                        _ if self.cancel.is_cancelled() => FileReport {
                            kind: None,
                            outcome: FileOutcome::Cancelled,
                        },
                        Ok(bytes) => process_file(&bytes, &source),
                        Err(error) => FileReport::unreadable(error),
                    })
                    .collect::<Vec<_>>()
            });

            for report in reports {
                diagnostics.absorb(report, &mut samples);
            }
            debug!("{part}: {} samples so far", samples.len());
        }

        // Stable, so equal timestamps keep manifest order.
        samples.sort_by_key(|sample| sample.timestamp);

        info!(
            "decoded {} of {} files into {} samples ({} skipped, {} failed)",
            diagnostics.files_decoded,
            diagnostics.files_selected,
            samples.len(),
            diagnostics.files_skipped,
            diagnostics.files_failed
        );
        if self.cancel.is_cancelled() {
            warn!("cancelled, {} files not decoded", diagnostics.files_cancelled);
        } else if samples.is_empty() {
            warn!("no heart rate samples found in {}", archive.name());
        }

        Dataset {
            samples,
            diagnostics,
        }
    }
}
