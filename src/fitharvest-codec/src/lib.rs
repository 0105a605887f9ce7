mod error;
pub use error::FitError;

pub mod constants;
pub use constants::{FileType, FileTypeCode};

mod crc;
pub use crc::crc16;

mod helpers;
pub use helpers::Endian;

mod header;
pub use header::FileHeader;

mod definition;
pub use definition::{BaseType, Definition, FieldDefinition};

mod value;
pub use value::Value;

mod record;
pub use record::RawRecord;

mod message;
pub use message::{FileIdentity, FitTimestamp, Message, Monitoring};

mod reader;
pub use reader::{FitReader, decode};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
