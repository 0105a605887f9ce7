use std::io::{Cursor, Write};

use fitharvest_codec::{FileType, testing::FitFileBuilder};
use zip::{ZipWriter, write::SimpleFileOptions};

use crate::harvester::{ArchiveLayout, ExportArchive};

pub fn zip_bytes<N: AsRef<str>>(entries: &[(N, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in entries {
        writer
            .start_file(name.as_ref(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn export_bytes(parts: &[(&str, Vec<u8>)]) -> Vec<u8> {
    zip_bytes(parts)
}

pub fn export(parts: &[(&str, Vec<u8>)]) -> ExportArchive<Cursor<Vec<u8>>> {
    ExportArchive::from_reader(
        "export.zip",
        Cursor::new(export_bytes(parts)),
        ArchiveLayout::default(),
    )
    .unwrap()
}

/// Monitoring file with one reading per minute from `start` (FIT seconds):
/// a full timestamp first, compressed `timestamp_16` values after.
pub fn monitoring_file(start: u32, heart_rates: &[u8]) -> Vec<u8> {
    heart_rates
        .iter()
        .enumerate()
        .fold(
            FitFileBuilder::new().file_id(FileType::MonitoringB.as_u8()),
            |builder, (i, &heart_rate)| {
                let time = start + 60 * i as u32;
                if i == 0 {
                    builder.monitoring(Some(time), None, Some(heart_rate))
                } else {
                    builder.monitoring(None, Some(time as u16), Some(heart_rate))
                }
            },
        )
        .build()
}

pub fn activity_file(start: u32) -> Vec<u8> {
    FitFileBuilder::new()
        .file_id(FileType::Activity.as_u8())
        .monitoring(Some(start), None, Some(150))
        .build()
}
