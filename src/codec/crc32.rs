//! CRC32 checksums for PNG chunk integrity.
//!
//! The reflected CRC32 the PNG standard specifies: initial register
//! `0xFFFFFFFF`, polynomial `0xEDB88320` applied LSB-first, final value
//! complemented. The 256-entry table is built once, on first use, and
//! shared process-wide.

use std::sync::LazyLock;

static CRC_TABLE: LazyLock<[u32; 256]> = LazyLock::new(|| {
    let mut table = [0u32; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        let mut c = i as u32;
        for _ in 0..8 {
            c = if c & 1 == 1 {
                0xEDB8_8320 ^ (c >> 1)
            } else {
                c >> 1
            };
        }
        *entry = c;
    }
    table
});

/// CRC32 of a byte span.
pub(crate) fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &b in data {
        crc = CRC_TABLE[((crc ^ b as u32) & 0xFF) as usize] ^ (crc >> 8);
    }
    !crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert_eq!(crc32(&[]), 0);
    }

    #[test]
    fn standard_check_value() {
        // The CRC32 reference check value
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn iend_chunk_crc() {
        // Every PNG ends with the same four bytes of CRC over "IEND"
        assert_eq!(crc32(b"IEND"), 0xAE42_6082);
    }

    #[test]
    fn sensitive_to_single_byte_change() {
        assert_ne!(crc32(b"pHYs"), crc32(b"pHYt"));
    }
}
