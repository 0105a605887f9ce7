use crate::{
    Definition, FileHeader, FitError, Message, RawRecord, Value,
    constants::FIELD_TIMESTAMP,
    crc::crc16,
    helpers::{BufferReader, ByteCursor},
};

const LOCAL_MESSAGE_TYPES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    NextFile,
    Records,
    Done,
}

/// Lazy decoder over the data messages of a FIT byte stream.
///
/// Definition messages are consumed internally; only data messages are
/// yielded. Chained FIT files in the same buffer are decoded back to back.
/// After the first error the reader is exhausted.
pub struct FitReader<'a> {
    remaining: &'a [u8],
    file: &'a [u8],
    records: ByteCursor<'a>,
    definitions: [Option<Definition>; LOCAL_MESSAGE_TYPES],
    last_timestamp: Option<u32>,
    state: ReaderState,
}

/// Starts a fresh decode pass over `bytes`.
pub fn decode(bytes: &[u8]) -> FitReader<'_> {
    FitReader::new(bytes)
}

impl<'a> FitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            remaining: bytes,
            file: &[],
            records: ByteCursor::default(),
            definitions: Default::default(),
            last_timestamp: None,
            state: ReaderState::NextFile,
        }
    }

    /// Typed view of the stream, see [`Message`].
    pub fn messages(self) -> impl Iterator<Item = Result<Message, FitError>> + 'a {
        self.map(|record| record.and_then(Message::try_from))
    }

    fn begin_file(&mut self) -> Result<(), FitError> {
        let header = FileHeader::parse(self.remaining)?;
        let data_end = header.data_end();
        if self.remaining.len() < data_end + 2 {
            return Err(FitError::Truncated);
        }

        let (file, rest) = self.remaining.split_at(data_end + 2);
        self.file = file;
        self.remaining = rest;
        self.records = ByteCursor::new(&file[header.size()..data_end]);
        self.definitions = Default::default();
        self.last_timestamp = None;
        Ok(())
    }

    fn finish_file(&mut self) -> Result<(), FitError> {
        let (body, crc) = self.file.split_at(self.file.len() - 2);
        if crc16(body) != u16::from_le_bytes([crc[0], crc[1]]) {
            return Err(FitError::InvalidFileCrc);
        }

        self.state = if self.remaining.iter().all(|&b| b == 0) {
            ReaderState::Done
        } else {
            ReaderState::NextFile
        };
        Ok(())
    }

    fn read_record(&mut self) -> Result<Option<RawRecord>, FitError> {
        let header = self.records.pop_front()?;

        if header & 0x80 != 0 {
            // Compressed timestamp header: 2-bit local type, 5-bit time offset.
            let local = (header >> 5) & 0x03;
            let offset = u32::from(header & 0x1F);
            let timestamp = self.last_timestamp.map(|last| {
                let timestamp = (last & !0x1F).wrapping_add(offset);
                if offset < (last & 0x1F) {
                    timestamp.wrapping_add(0x20)
                } else {
                    timestamp
                }
            });
            return self.read_data(local, timestamp).map(Some);
        }

        let local = header & 0x0F;
        if header & 0x40 != 0 {
            let definition = Definition::parse(&mut self.records, header & 0x20 != 0)?;
            self.definitions[usize::from(local)] = Some(definition);
            Ok(None)
        } else {
            self.read_data(local, None).map(Some)
        }
    }

    fn read_data(
        &mut self,
        local: u8,
        compressed_timestamp: Option<u32>,
    ) -> Result<RawRecord, FitError> {
        let definition = self.definitions[usize::from(local)]
            .as_ref()
            .ok_or(FitError::UndefinedLocalMessage(local))?;

        let mut record = RawRecord::new(definition.global);
        for field in &definition.fields {
            let raw = self.records.take(usize::from(field.size))?;
            if let Some(value) = Value::decode_field(field, raw, definition.endian) {
                record.fields.insert(field.number, value);
            }
        }
        self.records.skip(definition.developer_size)?;

        let explicit_timestamp = match record.field(FIELD_TIMESTAMP) {
            Some(Value::UInt32(timestamp)) => Some(*timestamp),
            _ => None,
        };
        match (explicit_timestamp, compressed_timestamp) {
            (Some(timestamp), _) => self.last_timestamp = Some(timestamp),
            (None, Some(timestamp)) => {
                record
                    .fields
                    .insert(FIELD_TIMESTAMP, Value::UInt32(timestamp));
                self.last_timestamp = Some(timestamp);
            }
            (None, None) => {}
        }

        Ok(record)
    }

    fn fail(&mut self, error: FitError) -> Option<Result<RawRecord, FitError>> {
        self.state = ReaderState::Done;
        Some(Err(error))
    }
}

impl Iterator for FitReader<'_> {
    type Item = Result<RawRecord, FitError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                ReaderState::Done => return None,
                ReaderState::NextFile => match self.begin_file() {
                    Ok(()) => self.state = ReaderState::Records,
                    Err(error) => return self.fail(error),
                },
                ReaderState::Records => {
                    if self.records.is_empty() {
                        if let Err(error) = self.finish_file() {
                            return self.fail(error);
                        }
                        continue;
                    }

                    match self.read_record() {
                        Ok(Some(record)) => return Some(Ok(record)),
                        Ok(None) => continue,
                        Err(error) => return self.fail(error),
                    }
                }
            }
        }
    }
}

impl std::iter::FusedIterator for FitReader<'_> {}
