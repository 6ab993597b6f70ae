//! Conversions between packed bytes and one-symbol-per-byte bit streams
//!
//! The encoder and interleaver work on bits stored one per byte (0 or 1),
//! while packets travel as packed bytes. All packing is MSB-first.

use bitvec::prelude::*;

/// Unpack bytes into one bit per output byte, MSB first
///
/// # Example
/// ```
/// use rustywenet::util::bitvec_utils::unpack_bits;
///
/// assert_eq!(unpack_bits(&[0xa0]), vec![1, 0, 1, 0, 0, 0, 0, 0]);
/// ```
pub fn unpack_bits(bytes: &[u8]) -> Vec<u8> {
    bytes.view_bits::<Msb0>().iter().map(|bit| *bit as u8).collect()
}

/// Pack one-bit-per-byte values into bytes, MSB first
///
/// Any nonzero value counts as a set bit. The final byte is zero padded in
/// its low bits when `bits.len()` is not a multiple of 8.
pub fn pack_bits(bits: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0u8; bits.len().div_ceil(8)];
    let view = bytes.view_bits_mut::<Msb0>();
    for (i, bit) in bits.iter().enumerate() {
        view.set(i, *bit != 0);
    }
    bytes
}

/// Pack a bit slice into bytes, MSB first, zero padded
pub fn bitslice_to_bytes(bs: &BitSlice<u8, Msb0>) -> Vec<u8> {
    let mut bytes = vec![0u8; bs.len().div_ceil(8)];
    bytes.view_bits_mut::<Msb0>()[..bs.len()].copy_from_bitslice(bs);
    bytes
}

/// Render bits as a `0`/`1` string for log output
pub trait BitvecToString {
    fn to_bit_string(&self) -> String;
}

impl BitvecToString for BitSlice<u8, Msb0> {
    fn to_bit_string(&self) -> String {
        self.iter().map(|b| if *b { '1' } else { '0' }).collect()
    }
}
