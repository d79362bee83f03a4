//! CRC-8 checksum (polynomial 0x07, init 0x00, no reflection, no final XOR)
//!
//! Table driven so the receive path costs one lookup per byte. The parser
//! folds bytes in with [`crc8_update`] as they arrive; the serializer runs
//! [`crc8`] over the finished header and payload. Both produce the same value
//! for the same bytes.

/// Generator polynomial (x^8 + x^2 + x + 1)
pub const CRC8_POLY: u8 = 0x07;

/// Initial register value
pub const CRC8_INIT: u8 = 0x00;

/// Lookup table: `CRC8_TABLE[n]` is the CRC of the single byte `n`
pub static CRC8_TABLE: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC8_POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Fold one byte into a running CRC
#[inline]
pub fn crc8_update(crc: u8, byte: u8) -> u8 {
    CRC8_TABLE[(crc ^ byte) as usize]
}

/// Compute the CRC of a byte slice
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(CRC8_INIT, |crc, &byte| crc8_update(crc, byte))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_head_and_tail() {
        assert_eq!(&CRC8_TABLE[..8], &[0x00, 0x07, 0x0E, 0x09, 0x1C, 0x1B, 0x12, 0x15]);
        assert_eq!(CRC8_TABLE[0x80], 0x89);
        assert_eq!(CRC8_TABLE[0xFF], 0xF3);
    }

    #[test]
    fn test_check_value() {
        // Standard check input for CRC-8 (poly 0x07, init 0x00)
        assert_eq!(crc8(b"123456789"), 0xF4);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(crc8(&[]), CRC8_INIT);
    }

    #[test]
    fn test_empty_pong_header() {
        assert_eq!(crc8(&[0x01]), 0x07);
        assert_eq!(crc8(&[0x01, 0x00]), 0x15);
    }

    #[test]
    fn test_incremental_matches_bulk() {
        let data = [0x10, 0x03, 0x01, 0x02, 0x03];
        let mut running = CRC8_INIT;
        for &byte in &data {
            running = crc8_update(running, byte);
        }
        assert_eq!(running, crc8(&data));
        assert_eq!(running, 0x40);
    }
}
