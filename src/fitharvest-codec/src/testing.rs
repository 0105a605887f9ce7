//! Fixture writer for tests. Emits minimal but valid FIT files: every message
//! is preceded by its own definition on local type 0.

use crate::{
    BaseType, FileHeader,
    constants::{
        FIELD_TIMESTAMP, FILE_ID_TYPE, FIT_SIGNATURE, MESG_FILE_ID, MESG_MONITORING,
        MONITORING_HEART_RATE, MONITORING_TIMESTAMP_16,
    },
    crc::crc16,
    helpers::Endian,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Enum(u8),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    String(String),
}

impl Field {
    fn base_type(&self) -> BaseType {
        match self {
            Self::Enum(_) => BaseType::Enum,
            Self::UInt8(_) => BaseType::UInt8,
            Self::UInt16(_) => BaseType::UInt16,
            Self::UInt32(_) => BaseType::UInt32,
            Self::String(_) => BaseType::String,
        }
    }

    fn encode(&self, endian: Endian) -> Vec<u8> {
        match (self, endian) {
            (Self::Enum(v) | Self::UInt8(v), _) => vec![*v],
            (Self::UInt16(v), Endian::Little) => v.to_le_bytes().to_vec(),
            (Self::UInt16(v), Endian::Big) => v.to_be_bytes().to_vec(),
            (Self::UInt32(v), Endian::Little) => v.to_le_bytes().to_vec(),
            (Self::UInt32(v), Endian::Big) => v.to_be_bytes().to_vec(),
            (Self::String(v), _) => {
                let mut bytes = v.as_bytes().to_vec();
                bytes.push(0);
                bytes
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FitFileBuilder {
    endian: Endian,
    records: Vec<u8>,
}

impl FitFileBuilder {
    const COMPRESSED_LOCAL_TYPE: u8 = 1;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn architecture(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn file_id(self, file_type: u8) -> Self {
        self.message(MESG_FILE_ID, &[(FILE_ID_TYPE, Field::Enum(file_type))])
    }

    pub fn monitoring(
        self,
        timestamp: Option<u32>,
        timestamp_16: Option<u16>,
        heart_rate: Option<u8>,
    ) -> Self {
        let mut fields = Vec::new();
        if let Some(timestamp) = timestamp {
            fields.push((FIELD_TIMESTAMP, Field::UInt32(timestamp)));
        }
        if let Some(timestamp_16) = timestamp_16 {
            fields.push((MONITORING_TIMESTAMP_16, Field::UInt16(timestamp_16)));
        }
        if let Some(heart_rate) = heart_rate {
            fields.push((MONITORING_HEART_RATE, Field::UInt8(heart_rate)));
        }
        self.message(MESG_MONITORING, &fields)
    }

    /// Monitoring message using a compressed timestamp record header.
    pub fn compressed_monitoring(mut self, offset: u8, heart_rate: u8) -> Self {
        let local = Self::COMPRESSED_LOCAL_TYPE;
        self.push_definition(
            local,
            MESG_MONITORING,
            &[(MONITORING_HEART_RATE, Field::UInt8(heart_rate))],
            None,
        );
        self.records.push(0x80 | (local << 5) | (offset & 0x1F));
        self.records.push(heart_rate);
        self
    }

    pub fn message(self, global: u16, fields: &[(u8, Field)]) -> Self {
        self.message_with_developer_bytes(global, fields, &[])
    }

    pub fn message_with_developer_bytes(
        mut self,
        global: u16,
        fields: &[(u8, Field)],
        developer: &[u8],
    ) -> Self {
        let developer_size = (!developer.is_empty()).then_some(developer.len());
        self.push_definition(0, global, fields, developer_size);
        self.records.push(0x00);
        for (_, field) in fields {
            self.records.extend(field.encode(self.endian));
        }
        self.records.extend_from_slice(developer);
        self
    }

    /// Appends bytes verbatim to the record section.
    pub fn raw_record_bytes(mut self, bytes: &[u8]) -> Self {
        self.records.extend_from_slice(bytes);
        self
    }

    fn push_definition(
        &mut self,
        local: u8,
        global: u16,
        fields: &[(u8, Field)],
        developer_size: Option<usize>,
    ) {
        let developer_flag = if developer_size.is_some() { 0x20 } else { 0 };
        self.records.push(0x40 | developer_flag | local);
        self.records.push(0x00);
        self.records.push(self.endian.as_architecture());
        match self.endian {
            Endian::Little => self.records.extend(global.to_le_bytes()),
            Endian::Big => self.records.extend(global.to_be_bytes()),
        }
        self.records.push(fields.len() as u8);
        for (number, field) in fields {
            self.records.push(*number);
            self.records.push(field.encode(self.endian).len() as u8);
            self.records.push(field.base_type().as_u8());
        }
        if let Some(size) = developer_size {
            self.records.extend([1, 0, size as u8, 0]);
        }
    }

    pub fn build(self) -> Vec<u8> {
        let mut bytes = vec![FileHeader::SIZE, 0x20];
        bytes.extend(2132_u16.to_le_bytes());
        bytes.extend((self.records.len() as u32).to_le_bytes());
        bytes.extend(FIT_SIGNATURE);
        let header_crc = crc16(&bytes);
        bytes.extend(header_crc.to_le_bytes());

        bytes.extend(self.records);
        let file_crc = crc16(&bytes);
        bytes.extend(file_crc.to_le_bytes());
        bytes
    }
}
