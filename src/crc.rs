//! CRC-16 Implementation for Wenet packets
//!
//! Every framed packet carries a CRC-16/CCITT-FALSE over its padded payload,
//! appended little-endian after the payload. The parity encoder covers the
//! payload and the CRC together.

use crc::{Algorithm, Crc};

/// CCITT polynomial
const CRC_POLYNOMIAL: u16 = 0x1021;

/// CRC-16/CCITT-FALSE algorithm configuration
const CRC_CCITT_FALSE: Algorithm<u16> = Algorithm {
    width: 16,
    poly: CRC_POLYNOMIAL,
    init: 0xffff,
    refin: false,
    refout: false,
    xorout: 0x0000,
    check: 0x29b1,
    residue: 0x0000,
};

/// Packet CRC instance
const PACKET_CRC: Crc<u16> = Crc::<u16>::new(&CRC_CCITT_FALSE);

/// Calculate the 16-bit packet CRC
///
/// # Example
/// ```
/// use rustywenet::crc::crc16;
///
/// assert_eq!(crc16(b"123456789"), 0x29b1);
/// ```
pub fn crc16(data: &[u8]) -> u16 {
    PACKET_CRC.checksum(data)
}

/// Check a payload followed by its little-endian CRC
///
/// Returns `false` when `data` is too short to hold a CRC.
pub fn check_crc16(data: &[u8]) -> bool {
    if data.len() < 2 {
        return false;
    }
    let (payload, crc_bytes) = data.split_at(data.len() - 2);
    let received = u16::from_le_bytes([crc_bytes[0], crc_bytes[1]]);
    crc16(payload) == received
}
