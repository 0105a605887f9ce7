use crate::{
    FitError,
    constants::FIT_SIGNATURE,
    crc::crc16,
    helpers::{BufferReader, ByteCursor, Endian},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub header_size: u8,
    pub protocol_version: u8,
    pub profile_version: u16,
    pub data_size: u32,
    pub crc: Option<u16>,
}

impl FileHeader {
    pub const LEGACY_SIZE: u8 = 12;
    pub const SIZE: u8 = 14;

    pub fn parse(bytes: &[u8]) -> Result<Self, FitError> {
        if bytes.len() < usize::from(Self::LEGACY_SIZE) {
            return Err(FitError::FileTooShort);
        }

        let mut cursor = ByteCursor::new(bytes);
        let header_size = cursor.pop_front()?;
        if header_size != Self::LEGACY_SIZE && header_size != Self::SIZE {
            return Err(FitError::InvalidHeaderSize(header_size));
        }

        if bytes.len() < usize::from(header_size) {
            return Err(FitError::FileTooShort);
        }

        let protocol_version = cursor.pop_front()?;
        let profile_version = cursor.read_u16(Endian::Little)?;
        let data_size = cursor.read_u32(Endian::Little)?;
        if cursor.read::<4>()? != FIT_SIGNATURE {
            return Err(FitError::InvalidSignature);
        }

        let crc = if header_size == Self::SIZE {
            let crc = cursor.read_u16(Endian::Little)?;
            // A zero header CRC means the writer did not compute one.
            if crc != 0 && crc != crc16(&bytes[..usize::from(Self::LEGACY_SIZE)]) {
                return Err(FitError::InvalidHeaderCrc);
            }
            Some(crc)
        } else {
            None
        };

        Ok(Self {
            header_size,
            protocol_version,
            profile_version,
            data_size,
            crc,
        })
    }

    pub fn size(&self) -> usize {
        usize::from(self.header_size)
    }

    /// Offset of the file CRC, relative to the start of the header.
    pub fn data_end(&self) -> usize {
        self.size() + self.data_size as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_header(data_size: u32) -> Vec<u8> {
        let mut bytes = vec![12, 0x10];
        bytes.extend_from_slice(&2093_u16.to_le_bytes());
        bytes.extend_from_slice(&data_size.to_le_bytes());
        bytes.extend_from_slice(b".FIT");
        bytes
    }

    #[test]
    fn parses_legacy_header() {
        let header = FileHeader::parse(&legacy_header(42)).unwrap();
        assert_eq!(header.header_size, 12);
        assert_eq!(header.profile_version, 2093);
        assert_eq!(header.data_size, 42);
        assert_eq!(header.crc, None);
        assert_eq!(header.data_end(), 54);
    }

    #[test]
    fn verifies_header_crc() {
        let mut bytes = legacy_header(0);
        bytes[0] = 14;
        let crc = crc16(&bytes);
        bytes.extend_from_slice(&crc.to_le_bytes());
        assert_eq!(FileHeader::parse(&bytes).unwrap().crc, Some(crc));

        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert_eq!(FileHeader::parse(&bytes), Err(FitError::InvalidHeaderCrc));
    }

    #[test]
    fn zero_header_crc_is_accepted() {
        let mut bytes = legacy_header(0);
        bytes[0] = 14;
        bytes.extend_from_slice(&[0, 0]);
        assert!(FileHeader::parse(&bytes).is_ok());
    }

    #[test]
    fn rejects_bad_signature() {
        let mut bytes = legacy_header(0);
        bytes[9] = b'X';
        assert_eq!(FileHeader::parse(&bytes), Err(FitError::InvalidSignature));
    }

    #[test]
    fn rejects_short_input() {
        assert_eq!(FileHeader::parse(&[12, 0, 0]), Err(FitError::FileTooShort));
    }

    #[test]
    fn rejects_unknown_header_size() {
        let mut bytes = legacy_header(0);
        bytes[0] = 13;
        bytes.push(0);
        assert_eq!(FileHeader::parse(&bytes), Err(FitError::InvalidHeaderSize(13)));
    }
}
