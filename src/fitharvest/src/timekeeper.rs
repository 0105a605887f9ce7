use std::sync::Arc;

use fitharvest_codec::{FitError, FitTimestamp, Message, Monitoring, decode};
use fitharvest_types::Sample;

/// Per-file timestamp anchor. Never shared between files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderState {
    pub last_absolute_time: Option<FitTimestamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved(FitTimestamp),
    /// `timestamp_16` seen before any full timestamp.
    Unresolved,
    /// Neither timestamp field present.
    Untimed,
}

impl DecoderState {
    /// Resolves the time of one monitoring record and returns the state for
    /// the next one.
    pub fn advance(self, record: &Monitoring) -> (Self, Resolution) {
        match (record.timestamp, record.timestamp_16, self.last_absolute_time) {
            (Some(timestamp), _, _) => (
                Self {
                    last_absolute_time: Some(timestamp),
                },
                Resolution::Resolved(timestamp),
            ),
            (None, Some(timestamp_16), Some(anchor)) => {
                // Modular distance from the anchor's low 16 bits.
                let delta = timestamp_16.wrapping_sub(anchor.seconds() as u16);
                match anchor.checked_add(u32::from(delta)) {
                    Some(time) => (
                        Self {
                            last_absolute_time: Some(time),
                        },
                        Resolution::Resolved(time),
                    ),
                    None => (self, Resolution::Unresolved),
                }
            }
            (None, Some(_), None) => (self, Resolution::Unresolved),
            (None, None, _) => (self, Resolution::Untimed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSamples {
    pub samples: Vec<Sample>,
    pub monitoring_records: usize,
    /// Records dropped because their compressed time had no anchor.
    pub unresolved: usize,
}

/// Decodes every monitoring record in `bytes` into heart rate samples.
///
/// Any decode error discards the whole file.
pub fn decode_monitoring(bytes: &[u8], source: &Arc<str>) -> Result<FileSamples, FitError> {
    let (_, file) = decode(bytes).messages().try_fold(
        (DecoderState::default(), FileSamples::default()),
        |(state, mut file), message| -> Result<_, FitError> {
            let Message::Monitoring(record) = message? else {
                return Ok((state, file));
            };

            file.monitoring_records += 1;
            let (state, resolution) = state.advance(&record);
            match (resolution, record.heart_rate) {
                (Resolution::Resolved(time), Some(heart_rate)) => {
                    file.samples
                        .push(Sample::new(time.to_utc(), heart_rate, source.clone()));
                }
                (Resolution::Resolved(_), None) | (Resolution::Untimed, _) => {}
                (Resolution::Unresolved, _) => {
                    debug!("{source}: dropped monitoring record without time anchor");
                    file.unresolved += 1;
                }
            }

            Ok((state, file))
        },
    )?;

    Ok(file)
}
