use crate::{
    FitError,
    helpers::{BufferReader, ByteCursor, Endian},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Enum,
    SInt8,
    UInt8,
    SInt16,
    UInt16,
    SInt32,
    UInt32,
    String,
    Float32,
    Float64,
    UInt8z,
    UInt16z,
    UInt32z,
    Byte,
    SInt64,
    UInt64,
    UInt64z,
}

impl BaseType {
    /// Decodes a base type byte. Only the base type number (low 5 bits) is
    /// significant; the endian-ability flag is ignored.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value & 0x1F {
            0 => Some(Self::Enum),
            1 => Some(Self::SInt8),
            2 => Some(Self::UInt8),
            3 => Some(Self::SInt16),
            4 => Some(Self::UInt16),
            5 => Some(Self::SInt32),
            6 => Some(Self::UInt32),
            7 => Some(Self::String),
            8 => Some(Self::Float32),
            9 => Some(Self::Float64),
            10 => Some(Self::UInt8z),
            11 => Some(Self::UInt16z),
            12 => Some(Self::UInt32z),
            13 => Some(Self::Byte),
            14 => Some(Self::SInt64),
            15 => Some(Self::UInt64),
            16 => Some(Self::UInt64z),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Enum => 0x00,
            Self::SInt8 => 0x01,
            Self::UInt8 => 0x02,
            Self::SInt16 => 0x83,
            Self::UInt16 => 0x84,
            Self::SInt32 => 0x85,
            Self::UInt32 => 0x86,
            Self::String => 0x07,
            Self::Float32 => 0x88,
            Self::Float64 => 0x89,
            Self::UInt8z => 0x0A,
            Self::UInt16z => 0x8B,
            Self::UInt32z => 0x8C,
            Self::Byte => 0x0D,
            Self::SInt64 => 0x8E,
            Self::UInt64 => 0x8F,
            Self::UInt64z => 0x90,
        }
    }

    pub fn size(self) -> usize {
        match self {
            Self::Enum | Self::SInt8 | Self::UInt8 | Self::UInt8z | Self::Byte | Self::String => 1,
            Self::SInt16 | Self::UInt16 | Self::UInt16z => 2,
            Self::SInt32 | Self::UInt32 | Self::UInt32z | Self::Float32 => 4,
            Self::SInt64 | Self::UInt64 | Self::UInt64z | Self::Float64 => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefinition {
    pub number: u8,
    pub size: u8,
    pub base_type: BaseType,
}

/// Layout of one local message type, as announced by a definition message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub global: u16,
    pub endian: Endian,
    pub fields: Vec<FieldDefinition>,
    /// Total size of developer fields, which are skipped when reading data.
    pub developer_size: usize,
}

impl Definition {
    pub(crate) fn parse(
        cursor: &mut ByteCursor<'_>,
        has_developer_fields: bool,
    ) -> Result<Self, FitError> {
        let _reserved = cursor.pop_front()?;
        let architecture = cursor.pop_front()?;
        let endian = Endian::from_architecture(architecture)
            .ok_or(FitError::InvalidArchitecture(architecture))?;
        let global = cursor.read_u16(endian)?;

        let field_count = cursor.pop_front()?;
        let mut fields = Vec::with_capacity(usize::from(field_count));
        for _ in 0..field_count {
            let [number, size, base_type] = cursor.read::<3>()?;
            let base_type =
                BaseType::from_u8(base_type).ok_or(FitError::InvalidBaseType(base_type))?;
            fields.push(FieldDefinition {
                number,
                size,
                base_type,
            });
        }

        let mut developer_size = 0;
        if has_developer_fields {
            let developer_count = cursor.pop_front()?;
            for _ in 0..developer_count {
                let [_number, size, _developer_index] = cursor.read::<3>()?;
                developer_size += usize::from(size);
            }
        }

        Ok(Self {
            global,
            endian,
            fields,
            developer_size,
        })
    }

    /// Size in bytes of a data message using this definition.
    pub fn data_size(&self) -> usize {
        self.fields
            .iter()
            .map(|field| usize::from(field.size))
            .sum::<usize>()
            + self.developer_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_type_ignores_endian_flag() {
        assert_eq!(BaseType::from_u8(0x84), Some(BaseType::UInt16));
        assert_eq!(BaseType::from_u8(0x04), Some(BaseType::UInt16));
        assert_eq!(BaseType::from_u8(0x1F), None);
    }

    #[test]
    fn base_type_code_roundtrip() {
        for code in 0..=16_u8 {
            let base_type = BaseType::from_u8(code).unwrap();
            assert_eq!(BaseType::from_u8(base_type.as_u8()), Some(base_type));
        }
    }

    #[test]
    fn parses_big_endian_definition_with_developer_fields() {
        let data = [
            0x00, // reserved
            0x01, // big endian
            0x00, 0x37, // global 55
            0x02, // two fields
            253, 4, 0x86, // timestamp
            27, 1, 0x02, // heart_rate
            0x01, // one developer field
            0, 3, 0, //
        ];
        let mut cursor = ByteCursor::new(&data);
        let definition = Definition::parse(&mut cursor, true).unwrap();
        assert_eq!(definition.global, 55);
        assert_eq!(definition.endian, Endian::Big);
        assert_eq!(definition.fields.len(), 2);
        assert_eq!(definition.developer_size, 3);
        assert_eq!(definition.data_size(), 8);
        assert!(cursor.is_empty());
    }

    #[test]
    fn rejects_unknown_architecture() {
        let data = [0x00, 0x07, 0x00, 0x00, 0x00];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(
            Definition::parse(&mut cursor, false),
            Err(FitError::InvalidArchitecture(7))
        );
    }

    #[test]
    fn rejects_unknown_base_type() {
        let data = [0x00, 0x00, 0x00, 0x00, 0x01, 3, 1, 0x1F];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(
            Definition::parse(&mut cursor, false),
            Err(FitError::InvalidBaseType(0x1F))
        );
    }
}
