const CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
    0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
];

fn update(crc: u16, byte: u8) -> u16 {
    let mut tmp = CRC_TABLE[usize::from(crc & 0xF)];
    let mut crc = (crc >> 4) & 0x0FFF;
    crc = crc ^ tmp ^ CRC_TABLE[usize::from(byte & 0xF)];

    tmp = CRC_TABLE[usize::from(crc & 0xF)];
    crc = (crc >> 4) & 0x0FFF;
    crc ^ tmp ^ CRC_TABLE[usize::from((byte >> 4) & 0xF)]
}

/// CRC-16 used by FIT headers and file trailers.
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(0, |crc, &byte| update(crc, byte))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(crc16(&[]), 0);
    }

    #[test]
    fn check_value() {
        assert_eq!(crc16(b"123456789"), 0xBB3D);
    }

    #[test]
    fn appended_crc_zeroes_residue() {
        let mut data = b"monitoring".to_vec();
        let crc = crc16(&data);
        data.extend_from_slice(&crc.to_le_bytes());
        assert_eq!(crc16(&data), 0);
    }
}
