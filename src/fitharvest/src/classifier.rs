use fitharvest_codec::{FileType, FileTypeCode, FitError, Message, decode};

use crate::diagnostics::FileKind;

/// What a FIT file is, judged by its first `file_id` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    /// Per-minute monitoring file carrying heart rate samples.
    DetailedMonitoring(FileTypeCode),
    Other(FileTypeCode),
    Unreadable(FitError),
}

impl Category {
    pub fn file_type(&self) -> Option<FileTypeCode> {
        match self {
            Self::DetailedMonitoring(code) | Self::Other(code) => Some(*code),
            Self::Unreadable(_) => None,
        }
    }

    pub fn kind(&self) -> FileKind {
        match self {
            Self::DetailedMonitoring(code) | Self::Other(code) => FileKind::Typed(*code),
            Self::Unreadable(error) => error.into(),
        }
    }
}

pub fn is_detailed_monitoring(code: FileTypeCode) -> bool {
    matches!(
        code.known(),
        Some(FileType::MonitoringA | FileType::MonitoringB)
    )
}

/// Decodes `bytes` only as far as the first `file_id` message.
pub fn classify(bytes: &[u8]) -> Category {
    for message in decode(bytes).messages() {
        match message {
            Ok(Message::FileId(identity)) => {
                return match identity.file_type {
                    Some(code) if is_detailed_monitoring(code) => {
                        Category::DetailedMonitoring(code)
                    }
                    Some(code) => Category::Other(code),
                    None => Category::Unreadable(FitError::MissingFileId),
                };
            }
            Ok(_) => continue,
            Err(error) => return Category::Unreadable(error),
        }
    }

    Category::Unreadable(FitError::MissingFileId)
}
