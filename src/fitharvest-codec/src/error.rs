use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{self:?}")]
pub enum FitError {
    FileTooShort,
    InvalidHeaderSize(u8),
    InvalidSignature,
    InvalidHeaderCrc,
    InvalidFileCrc,
    Truncated,
    UndefinedLocalMessage(u8),
    InvalidArchitecture(u8),
    InvalidBaseType(u8),
    UnexpectedFieldType {
        message: &'static str,
        field: &'static str,
    },
    MissingFileId,
}
