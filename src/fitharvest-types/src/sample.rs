use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};

/// One heart-rate reading with its reconstructed UTC instant and the archive
/// entry it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub heart_rate: u8,
    pub source: Arc<str>,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, heart_rate: u8, source: Arc<str>) -> Self {
        Self {
            timestamp,
            heart_rate,
            source,
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            self.timestamp.to_rfc3339(),
            self.heart_rate,
            self.source
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample() -> Sample {
        Sample::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 6, 30, 0).unwrap(),
            54,
            Arc::from("UploadedFiles_0-_Part1.zip/123_WELLNESS.fit"),
        )
    }

    #[test]
    fn display_is_csv_row() {
        assert_eq!(
            sample().to_string(),
            "2024-05-01T06:30:00+00:00,54,UploadedFiles_0-_Part1.zip/123_WELLNESS.fit"
        );
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"heart_rate\":54"));
        let parsed: Sample = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample());
    }
}
