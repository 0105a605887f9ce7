use std::{
    cmp::Ordering,
    fmt,
    fs::File,
    io::{BufReader, Cursor, Read, Seek},
    path::Path,
    sync::Arc,
};

use serde::Serialize;
use zip::{
    ZipArchive,
    result::{ZipError, ZipResult},
};

use crate::HarvestError;

/// Naming convention of an export: which root entries are part archives and
/// which part entries are data files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveLayout {
    pub part_marker: String,
    pub part_suffix: String,
    /// Matched case-insensitively.
    pub data_suffix: String,
}

impl Default for ArchiveLayout {
    fn default() -> Self {
        Self {
            part_marker: "UploadedFiles".to_string(),
            part_suffix: ".zip".to_string(),
            data_suffix: ".fit".to_string(),
        }
    }
}

impl ArchiveLayout {
    pub fn is_part(&self, name: &str) -> bool {
        name.contains(&self.part_marker) && name.ends_with(&self.part_suffix)
    }

    pub fn is_data_file(&self, name: &str) -> bool {
        name.to_lowercase()
            .ends_with(&self.data_suffix.to_lowercase())
    }
}

/// Compares digit runs by numeric value so `Part2` sorts before `Part10`.
/// Names equal under that rule fall back to plain byte order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    fn split_digits(bytes: &[u8]) -> (&[u8], &[u8]) {
        let end = bytes
            .iter()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(bytes.len());
        bytes.split_at(end)
    }

    fn trim_zeros(digits: &[u8]) -> &[u8] {
        let start = digits
            .iter()
            .position(|b| *b != b'0')
            .unwrap_or(digits.len());
        &digits[start..]
    }

    let (mut left, mut right) = (a.as_bytes(), b.as_bytes());
    loop {
        match (left.first(), right.first()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let (l_digits, l_rest) = split_digits(left);
                let (r_digits, r_rest) = split_digits(right);
                let (l_digits, r_digits) = (trim_zeros(l_digits), trim_zeros(r_digits));
                let ordering = l_digits
                    .len()
                    .cmp(&r_digits.len())
                    .then_with(|| l_digits.cmp(r_digits));
                if ordering != Ordering::Equal {
                    return ordering;
                }
                (left, right) = (l_rest, r_rest);
            }
            (Some(l), Some(r)) => {
                if l != r {
                    return l.cmp(r);
                }
                (left, right) = (&left[1..], &right[1..]);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestEntry {
    pub part: Arc<str>,
    pub entry: String,
}

impl ManifestEntry {
    pub fn new(part: Arc<str>, entry: impl Into<String>) -> Self {
        Self {
            part,
            entry: entry.into(),
        }
    }

    /// Label carried by every sample decoded from this entry.
    pub fn source(&self) -> Arc<str> {
        Arc::from(self.to_string())
    }
}

impl Ord for ManifestEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.part, &other.part).then_with(|| natural_cmp(&self.entry, &other.entry))
    }
}

impl PartialOrd for ManifestEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.part, self.entry)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    /// The trailing N entries of the manifest.
    Newest(u32),
}

impl Selection {
    pub fn from_limit(limit: Option<u32>) -> Self {
        limit.map_or(Self::All, Self::Newest)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all files"),
            Self::Newest(n) => write!(f, "newest {n} files"),
        }
    }
}

/// Chronologically ordered data files of an export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(mut entries: Vec<ManifestEntry>) -> Self {
        entries.sort();
        entries.dedup();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn windowed(&self, selection: Selection) -> Self {
        let keep = match selection {
            Selection::All => self.entries.len(),
            Selection::Newest(n) => self.entries.len().min(n as usize),
        };
        Self {
            entries: self.entries[self.entries.len() - keep..].to_vec(),
        }
    }

    /// Consecutive runs of entries sharing a part, in manifest order.
    pub fn by_part(&self) -> Vec<(&Arc<str>, &[ManifestEntry])> {
        self.entries
            .chunk_by(|a, b| a.part == b.part)
            .map(|entries| (&entries[0].part, entries))
            .collect()
    }
}

/// Result of listing an export. Failed parts are reported, not fatal.
#[derive(Debug)]
pub struct Harvest {
    pub manifest: Manifest,
    pub parts: usize,
    /// Data files across every readable part, before selection.
    pub total_entries: usize,
    pub failures: Vec<HarvestError>,
}

/// Identity of an export's contents, derived from its central directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArchiveFingerprint([u8; 32]);

impl fmt::Display for ArchiveFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

const MAX_PREALLOCATION: u64 = 1 << 20;

fn read_all<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> ZipResult<Vec<u8>> {
    let mut file = archive.by_name(name)?;
    // The declared size comes from the zip header and may be corrupt.
    let mut bytes = Vec::with_capacity(file.size().min(MAX_PREALLOCATION) as usize);
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// The outer export zip.
pub struct ExportArchive<R> {
    name: String,
    archive: ZipArchive<R>,
    layout: ArchiveLayout,
}

impl ExportArchive<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>, layout: ArchiveLayout) -> Result<Self, HarvestError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path).map_err(|error| HarvestError::ArchiveOpen {
            name: name.clone(),
            source: ZipError::Io(error),
        })?;
        Self::from_reader(name, BufReader::new(file), layout)
    }
}

impl<R: Read + Seek> ExportArchive<R> {
    pub fn from_reader(
        name: impl Into<String>,
        reader: R,
        layout: ArchiveLayout,
    ) -> Result<Self, HarvestError> {
        let name = name.into();
        let archive = ZipArchive::new(reader).map_err(|source| HarvestError::ArchiveOpen {
            name: name.clone(),
            source,
        })?;
        Ok(Self {
            name,
            archive,
            layout,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> &ArchiveLayout {
        &self.layout
    }

    /// Part archive names in natural order.
    pub fn part_names(&self) -> Vec<String> {
        let mut parts = self
            .archive
            .file_names()
            .filter(|name| self.layout.is_part(name))
            .map(String::from)
            .collect::<Vec<_>>();
        parts.sort_by(|a, b| natural_cmp(a, b));
        parts
    }

    /// Reads one part into memory and opens it as a zip.
    pub fn open_part(&mut self, part: &str) -> Result<PartArchive, HarvestError> {
        let failure = |source| HarvestError::PartArchive {
            part: part.to_string(),
            source,
        };
        let bytes = read_all(&mut self.archive, part).map_err(failure)?;
        let archive = ZipArchive::new(Cursor::new(bytes)).map_err(failure)?;
        Ok(PartArchive {
            name: Arc::from(part),
            archive,
        })
    }

    /// Lists every data file of every part, then applies `selection`.
    pub fn harvest(&mut self, selection: Selection) -> Harvest {
        let parts = self.part_names();
        let mut entries = Vec::new();
        let mut failures = Vec::new();

        for part in &parts {
            match self.open_part(part) {
                Ok(archive) => {
                    let before = entries.len();
                    entries.extend(
                        archive
                            .data_entries(&self.layout)
                            .into_iter()
                            .map(|entry| ManifestEntry::new(archive.name().clone(), entry)),
                    );
                    debug!("{part}: {} data files", entries.len() - before);
                }
                Err(error) => {
                    warn!("skipping part: {error}");
                    failures.push(error);
                }
            }
        }

        let manifest = Manifest::new(entries);
        let total_entries = manifest.len();
        let manifest = manifest.windowed(selection);
        info!(
            "{}: {} parts, {} data files, {} selected ({selection})",
            self.name,
            parts.len(),
            total_entries,
            manifest.len()
        );

        Harvest {
            manifest,
            parts: parts.len(),
            total_entries,
            failures,
        }
    }

    /// Hash over entry names, CRCs and sizes plus the layout. Reads no entry data.
    pub fn fingerprint(&mut self) -> Result<ArchiveFingerprint, HarvestError> {
        let mut hasher = blake3::Hasher::new();
        for value in [
            &self.layout.part_marker,
            &self.layout.part_suffix,
            &self.layout.data_suffix,
        ] {
            hasher.update(value.as_bytes());
            hasher.update(&[0]);
        }

        for index in 0..self.archive.len() {
            let file = self
                .archive
                .by_index_raw(index)
                .map_err(|source| HarvestError::ArchiveOpen {
                    name: self.name.clone(),
                    source,
                })?;
            hasher.update(file.name().as_bytes());
            hasher.update(&[0]);
            hasher.update(&file.crc32().to_le_bytes());
            hasher.update(&file.size().to_le_bytes());
            hasher.update(&file.compressed_size().to_le_bytes());
        }

        Ok(ArchiveFingerprint(*hasher.finalize().as_bytes()))
    }
}

/// A part archive held in memory.
pub struct PartArchive {
    name: Arc<str>,
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl PartArchive {
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn data_entries(&self, layout: &ArchiveLayout) -> Vec<String> {
        self.archive
            .file_names()
            .filter(|name| layout.is_data_file(name))
            .map(String::from)
            .collect()
    }

    pub fn read_entry(&mut self, entry: &str) -> Result<Vec<u8>, HarvestError> {
        read_all(&mut self.archive, entry).map_err(|source| HarvestError::EntryRead {
            part: self.name.to_string(),
            entry: entry.to_string(),
            source,
        })
    }
}
