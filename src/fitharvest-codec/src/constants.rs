use std::fmt;

use strum::{Display, EnumString, FromRepr};

/// Seconds between the Unix epoch and the FIT epoch (1989-12-31T00:00:00Z).
pub const FIT_EPOCH_OFFSET: i64 = 631_065_600;

pub const FIT_SIGNATURE: [u8; 4] = *b".FIT";

// Global message numbers
pub const MESG_FILE_ID: u16 = 0;
pub const MESG_MONITORING: u16 = 55;

// file_id fields
pub const FILE_ID_TYPE: u8 = 0;
pub const FILE_ID_MANUFACTURER: u8 = 1;
pub const FILE_ID_PRODUCT: u8 = 2;
pub const FILE_ID_SERIAL_NUMBER: u8 = 3;
pub const FILE_ID_TIME_CREATED: u8 = 4;

// monitoring fields
pub const MONITORING_TIMESTAMP_16: u8 = 26;
pub const MONITORING_HEART_RATE: u8 = 27;

/// Field number every message uses for its absolute timestamp.
pub const FIELD_TIMESTAMP: u8 = 253;

/// FIT `file` enum values, named as in the FIT profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, FromRepr)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum FileType {
    Device = 1,
    Settings = 2,
    Sport = 3,
    Activity = 4,
    Workout = 5,
    Course = 6,
    Schedules = 7,
    Weight = 9,
    Totals = 10,
    Goals = 11,
    BloodPressure = 14,
    #[strum(to_string = "monitoring_a")]
    MonitoringA = 15,
    ActivitySummary = 20,
    MonitoringDaily = 28,
    #[strum(to_string = "monitoring_b")]
    MonitoringB = 32,
    Segment = 34,
    SegmentList = 35,
    ExdConfiguration = 40,
}

impl FileType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Raw `file_id.type` value. Manufacturer specific codes have no [`FileType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileTypeCode(pub u8);

impl FileTypeCode {
    pub fn known(self) -> Option<FileType> {
        FileType::from_repr(self.0)
    }
}

impl From<FileType> for FileTypeCode {
    fn from(value: FileType) -> Self {
        Self(value.as_u8())
    }
}

impl fmt::Display for FileTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.known() {
            Some(file_type) => write!(f, "{} ({})", file_type, self.0),
            None => write!(f, "unknown ({})", self.0),
        }
    }
}
