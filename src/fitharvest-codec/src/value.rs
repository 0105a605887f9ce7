use std::fmt;

use crate::{BaseType, FieldDefinition, helpers::Endian};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Enum(u8),
    SInt8(i8),
    UInt8(u8),
    SInt16(i16),
    UInt16(u16),
    SInt32(i32),
    UInt32(u32),
    SInt64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
}

macro_rules! from_bytes {
    ($ty:ty, $raw:expr, $endian:expr) => {{
        let bytes = $raw.try_into().ok()?;
        match $endian {
            Endian::Little => <$ty>::from_le_bytes(bytes),
            Endian::Big => <$ty>::from_be_bytes(bytes),
        }
    }};
}

impl Value {
    /// Integer view of the value. Signed values are accepted when non-negative.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::Enum(v) | Self::UInt8(v) => Some(u64::from(v)),
            Self::UInt16(v) => Some(u64::from(v)),
            Self::UInt32(v) => Some(u64::from(v)),
            Self::UInt64(v) => Some(v),
            Self::SInt8(v) => u64::try_from(v).ok(),
            Self::SInt16(v) => u64::try_from(v).ok(),
            Self::SInt32(v) => u64::try_from(v).ok(),
            Self::SInt64(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    pub(crate) fn decode_field(
        field: &FieldDefinition,
        raw: &[u8],
        endian: Endian,
    ) -> Option<Self> {
        let base_type = field.base_type;
        match base_type {
            BaseType::String => {
                let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
                if end == 0 {
                    return None;
                }
                Some(Self::String(String::from_utf8_lossy(&raw[..end]).into_owned()))
            }
            BaseType::Byte if raw.len() > 1 => {
                if raw.iter().all(|&b| b == 0xFF) {
                    None
                } else {
                    Some(Self::Bytes(raw.to_vec()))
                }
            }
            _ => {
                let size = base_type.size();
                if raw.len() == size {
                    Self::decode_scalar(base_type, raw, endian)
                } else if !raw.is_empty() && raw.len() % size == 0 {
                    let values = raw
                        .chunks_exact(size)
                        .map(|chunk| Self::decode_scalar(base_type, chunk, endian))
                        .collect::<Vec<_>>();
                    if values.iter().all(Option::is_none) {
                        return None;
                    }
                    // Invalid elements keep their slot so indices stay meaningful.
                    Some(Self::Array(
                        values
                            .into_iter()
                            .map(|value| value.unwrap_or(Self::Bytes(Vec::new())))
                            .collect(),
                    ))
                } else {
                    Some(Self::Bytes(raw.to_vec()))
                }
            }
        }
    }

    fn decode_scalar(base_type: BaseType, raw: &[u8], endian: Endian) -> Option<Self> {
        let value = match base_type {
            BaseType::Enum => Self::Enum(*raw.first()?).valid_unless(0xFF)?,
            BaseType::Byte => Self::Bytes(raw.to_vec()).valid_unless(0xFF)?,
            BaseType::UInt8 => Self::UInt8(*raw.first()?).valid_unless(0xFF)?,
            BaseType::UInt8z => Self::UInt8(*raw.first()?).valid_unless(0)?,
            BaseType::SInt8 => Self::SInt8(from_bytes!(i8, raw, endian)).valid_unless(0x7F)?,
            BaseType::UInt16 => Self::UInt16(from_bytes!(u16, raw, endian)).valid_unless(0xFFFF)?,
            BaseType::UInt16z => Self::UInt16(from_bytes!(u16, raw, endian)).valid_unless(0)?,
            BaseType::SInt16 => Self::SInt16(from_bytes!(i16, raw, endian)).valid_unless(0x7FFF)?,
            BaseType::UInt32 => {
                Self::UInt32(from_bytes!(u32, raw, endian)).valid_unless(0xFFFF_FFFF)?
            }
            BaseType::UInt32z => Self::UInt32(from_bytes!(u32, raw, endian)).valid_unless(0)?,
            BaseType::SInt32 => {
                Self::SInt32(from_bytes!(i32, raw, endian)).valid_unless(0x7FFF_FFFF)?
            }
            BaseType::UInt64 => {
                Self::UInt64(from_bytes!(u64, raw, endian)).valid_unless(u64::MAX)?
            }
            BaseType::UInt64z => Self::UInt64(from_bytes!(u64, raw, endian)).valid_unless(0)?,
            BaseType::SInt64 => {
                Self::SInt64(from_bytes!(i64, raw, endian)).valid_unless(i64::MAX as u64)?
            }
            BaseType::Float32 => {
                let bits = from_bytes!(u32, raw, endian);
                if bits == u32::MAX {
                    return None;
                }
                Self::Float32(f32::from_bits(bits))
            }
            BaseType::Float64 => {
                let bits = from_bytes!(u64, raw, endian);
                if bits == u64::MAX {
                    return None;
                }
                Self::Float64(f64::from_bits(bits))
            }
            BaseType::String => return None,
        };
        Some(value)
    }

    /// Filters out the base type's "invalid" sentinel.
    fn valid_unless(self, invalid: u64) -> Option<Self> {
        let raw = match &self {
            Self::Enum(v) | Self::UInt8(v) => u64::from(*v),
            Self::SInt8(v) => u64::from(v.to_le_bytes()[0]),
            Self::UInt16(v) => u64::from(*v),
            Self::SInt16(v) => u64::from(u16::from_le_bytes(v.to_le_bytes())),
            Self::UInt32(v) => u64::from(*v),
            Self::SInt32(v) => u64::from(u32::from_le_bytes(v.to_le_bytes())),
            Self::UInt64(v) => *v,
            Self::SInt64(v) => u64::from_le_bytes(v.to_le_bytes()),
            Self::Bytes(bytes) => u64::from(*bytes.first()?),
            _ => return Some(self),
        };
        (raw != invalid).then_some(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enum(v) | Self::UInt8(v) => write!(f, "{v}"),
            Self::SInt8(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::SInt16(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::SInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::SInt64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Bytes(v) => write!(f, "0x{}", hex::encode(v)),
            Self::Array(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}
