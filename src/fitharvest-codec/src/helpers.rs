use crate::error::FitError;

type Result<T> = std::result::Result<T, InvalidIndexError>;

#[derive(Debug)]
pub struct InvalidIndexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    pub fn from_architecture(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Little),
            1 => Some(Self::Big),
            _ => None,
        }
    }

    pub fn as_architecture(self) -> u8 {
        match self {
            Self::Little => 0,
            Self::Big => 1,
        }
    }
}

pub trait BufferReader {
    fn read<const N: usize>(&mut self) -> Result<[u8; N]>;
    fn pop_front(&mut self) -> Result<u8>;

    fn read_u16(&mut self, endian: Endian) -> Result<u16> {
        let bytes = self.read()?;
        Ok(match endian {
            Endian::Little => u16::from_le_bytes(bytes),
            Endian::Big => u16::from_be_bytes(bytes),
        })
    }

    fn read_u32(&mut self, endian: Endian) -> Result<u32> {
        let bytes = self.read()?;
        Ok(match endian {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        })
    }
}

/// Forward-only view over a borrowed byte slice.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.position.checked_add(len).ok_or(InvalidIndexError)?;
        let slice = self.data.get(self.position..end).ok_or(InvalidIndexError)?;
        self.position = end;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }
}

impl BufferReader for ByteCursor<'_> {
    fn read<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.take(N)?.try_into().map_err(|_| InvalidIndexError)
    }

    fn pop_front(&mut self) -> Result<u8> {
        let [byte] = self.read::<1>()?;
        Ok(byte)
    }
}

impl From<InvalidIndexError> for FitError {
    fn from(_: InvalidIndexError) -> Self {
        Self::Truncated
    }
}
