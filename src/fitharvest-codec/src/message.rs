use chrono::{DateTime, Utc};

use crate::{
    FileTypeCode, FitError, RawRecord,
    constants::{
        FIELD_TIMESTAMP, FILE_ID_MANUFACTURER, FILE_ID_PRODUCT, FILE_ID_SERIAL_NUMBER,
        FILE_ID_TIME_CREATED, FILE_ID_TYPE, FIT_EPOCH_OFFSET, MESG_FILE_ID, MESG_MONITORING,
        MONITORING_HEART_RATE, MONITORING_TIMESTAMP_16,
    },
};

/// Seconds since the FIT epoch (1989-12-31T00:00:00Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FitTimestamp(pub u32);

impl FitTimestamp {
    pub fn seconds(self) -> u32 {
        self.0
    }

    pub fn checked_add(self, seconds: u32) -> Option<Self> {
        self.0.checked_add(seconds).map(Self)
    }

    pub fn to_utc(self) -> DateTime<Utc> {
        DateTime::from_timestamp(i64::from(self.0) + FIT_EPOCH_OFFSET, 0).unwrap_or_default()
    }

    pub fn from_utc(time: DateTime<Utc>) -> Option<Self> {
        u32::try_from(time.timestamp() - FIT_EPOCH_OFFSET)
            .ok()
            .map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileIdentity {
    pub file_type: Option<FileTypeCode>,
    pub manufacturer: Option<u16>,
    pub product: Option<u16>,
    pub serial_number: Option<u32>,
    pub time_created: Option<FitTimestamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Monitoring {
    pub timestamp: Option<FitTimestamp>,
    pub timestamp_16: Option<u16>,
    pub heart_rate: Option<u8>,
}

/// The message categories this workspace consumes. Everything else collapses
/// into [`Message::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    FileId(FileIdentity),
    Monitoring(Monitoring),
    Other { global: u16 },
}

fn integer<T: TryFrom<u64>>(
    record: &RawRecord,
    number: u8,
    message: &'static str,
    field: &'static str,
) -> Result<Option<T>, FitError> {
    let Some(value) = record.field(number) else {
        return Ok(None);
    };

    value
        .as_u64()
        .and_then(|value| T::try_from(value).ok())
        .map(Some)
        .ok_or(FitError::UnexpectedFieldType { message, field })
}

impl TryFrom<RawRecord> for Message {
    type Error = FitError;

    fn try_from(record: RawRecord) -> Result<Self, Self::Error> {
        Self::try_from(&record)
    }
}

impl TryFrom<&RawRecord> for Message {
    type Error = FitError;

    fn try_from(record: &RawRecord) -> Result<Self, Self::Error> {
        match record.global {
            MESG_FILE_ID => {
                const NAME: &str = "file_id";
                Ok(Self::FileId(FileIdentity {
                    file_type: integer(record, FILE_ID_TYPE, NAME, "type")?.map(FileTypeCode),
                    manufacturer: integer(record, FILE_ID_MANUFACTURER, NAME, "manufacturer")?,
                    product: integer(record, FILE_ID_PRODUCT, NAME, "product")?,
                    serial_number: integer(record, FILE_ID_SERIAL_NUMBER, NAME, "serial_number")?,
                    time_created: integer(record, FILE_ID_TIME_CREATED, NAME, "time_created")?
                        .map(FitTimestamp),
                }))
            }
            MESG_MONITORING => {
                const NAME: &str = "monitoring";
                Ok(Self::Monitoring(Monitoring {
                    timestamp: integer(record, FIELD_TIMESTAMP, NAME, "timestamp")?
                        .map(FitTimestamp),
                    timestamp_16: integer(record, MONITORING_TIMESTAMP_16, NAME, "timestamp_16")?,
                    heart_rate: integer(record, MONITORING_HEART_RATE, NAME, "heart_rate")?,
                }))
            }
            global => Ok(Self::Other { global }),
        }
    }
}
