//! Repeat-accumulate LDPC encoding for Wenet
//!
//! This module implements the systematic RA-LDPC encoder used by the Wenet
//! downlink. A block of 2064 information bits (a 256 byte payload plus its
//! 16-bit CRC) produces 516 parity bits.
//!
//! **Encoding**: each parity bit is the integer sum of `row_weight`
//! information bits named by the connection table, plus the previous parity
//! bit, reduced modulo 2. The running "accumulate" term makes the parity loop
//! strictly sequential.
//!
//! Decoding happens on the ground station and is not part of this crate.

mod encode;
mod table;

pub use encode::{EncodeError, Encoder};
pub use table::{ConnectionTable, TableError};

#[cfg(test)]
pub(crate) use table::random_table;

/// Dimensions of an RA-LDPC code
///
/// The three values belong to one connection table; they cannot be chosen
/// independently of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeParams {
    /// Number of systematic information bits (Nibits)
    pub info_bits: usize,
    /// Number of parity bits (Npbits)
    pub parity_bits: usize,
    /// Information bits summed per parity bit (Nwt)
    pub row_weight: usize,
}

impl CodeParams {
    /// The Wenet code of March 2016: 2064 information bits, 516 parity bits,
    /// row weight 12
    pub const WENET: CodeParams = CodeParams {
        info_bits: 2064,
        parity_bits: 516,
        row_weight: 12,
    };

    pub const fn new(info_bits: usize, parity_bits: usize, row_weight: usize) -> Self {
        CodeParams {
            info_bits,
            parity_bits,
            row_weight,
        }
    }

    /// Number of entries in the connection table
    pub const fn table_len(&self) -> usize {
        self.parity_bits * self.row_weight
    }

    /// Information bits + parity bits
    pub const fn codeword_bits(&self) -> usize {
        self.info_bits + self.parity_bits
    }
}

impl Default for CodeParams {
    fn default() -> Self {
        CodeParams::WENET
    }
}
