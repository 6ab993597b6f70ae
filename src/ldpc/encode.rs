//! RA-LDPC encoder
//!
//! Parity bits are produced from the information bits and the connection
//! table with a running accumulator.

use bitvec::prelude::*;
use snafu::prelude::*;
use tracing::{debug, trace};

use super::{CodeParams, ConnectionTable};
use crate::util::bitvec_utils::{bitslice_to_bytes, pack_bits, unpack_bits, BitvecToString};

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum EncodeError {
    #[snafu(display("Information block must be {expected} {unit}, got {actual}"))]
    WrongLength {
        expected: usize,
        actual: usize,
        unit: &'static str,
    },

    #[snafu(display("Information bit {position} is {value}, expected 0 or 1"))]
    NonBinary { position: usize, value: u8 },

    #[snafu(display("{info_bits} information bits cannot be packed into whole bytes"))]
    UnpackableBlock { info_bits: usize },
}

/// Systematic RA-LDPC encoder bound to one connection table
#[derive(Debug, Clone)]
pub struct Encoder {
    table: ConnectionTable,
}

impl Encoder {
    pub fn new(table: ConnectionTable) -> Self {
        let params = table.params();
        debug!(
            info_bits = params.info_bits,
            parity_bits = params.parity_bits,
            "RA-LDPC encoder ready"
        );
        Encoder { table }
    }

    pub fn params(&self) -> CodeParams {
        self.table.params()
    }

    pub fn table(&self) -> &ConnectionTable {
        &self.table
    }

    /// Accumulator recurrence shared by every entry point
    ///
    /// `info_bit(i)` yields information bit `i` as 0 or 1, `emit(p, bit)`
    /// receives parity bit `p`.
    fn accumulate(&self, info_bit: impl Fn(usize) -> u32, mut emit: impl FnMut(usize, bool)) {
        let mut prev = 0u32;
        for (p, row) in self.table.rows().enumerate() {
            // Integer sum; only the final value is reduced
            let par: u32 = row.iter().map(|&i| info_bit(i as usize)).sum();
            let bit = (par + prev) & 1;
            prev = bit;
            emit(p, bit == 1);
        }
    }

    /// Encode an information block into parity bits
    ///
    /// # Arguments
    /// * `info` - `info_bits` information bits
    /// * `parity` - Output buffer for `parity_bits` parity bits
    ///
    /// # Panics
    /// Panics if either slice has the wrong length.
    ///
    /// # Example
    /// ```
    /// use bitvec::prelude::*;
    /// use rustywenet::ldpc::{CodeParams, ConnectionTable, Encoder};
    ///
    /// let params = CodeParams::new(4, 2, 2);
    /// let encoder = Encoder::new(ConnectionTable::new(params, vec![1, 2, 3, 4]).unwrap());
    ///
    /// let info = bits![u8, Msb0; 1, 0, 0, 0];
    /// let mut parity = bitvec![u8, Msb0; 0; 2];
    /// encoder.encode_bits(info, &mut parity);
    /// // p0 = 1, p1 = 0 + 0 + p0
    /// assert_eq!(parity.as_bitslice(), bits![u8, Msb0; 1, 1]);
    /// ```
    pub fn encode_bits(&self, info: &BitSlice<u8, Msb0>, parity: &mut BitSlice<u8, Msb0>) {
        let params = self.params();
        assert_eq!(info.len(), params.info_bits, "Information block must be {} bits", params.info_bits);
        assert_eq!(parity.len(), params.parity_bits, "Parity block must be {} bits", params.parity_bits);

        self.accumulate(|i| info[i] as u32, |p, bit| parity.set(p, bit));
        trace!(parity = %parity.to_bit_string(), "parity block");
    }

    /// Encode one bit per byte, rejecting anything but 0 and 1
    pub fn encode(&self, info: &[u8]) -> Result<Vec<u8>, EncodeError> {
        let params = self.params();
        ensure!(
            info.len() == params.info_bits,
            WrongLengthSnafu {
                expected: params.info_bits,
                actual: info.len(),
                unit: "bits",
            }
        );
        if let Some((position, &value)) = info.iter().enumerate().find(|(_, b)| **b > 1) {
            return NonBinarySnafu { position, value }.fail();
        }

        let mut parity = vec![0u8; params.parity_bits];
        self.accumulate(|i| info[i] as u32, |p, bit| parity[p] = bit as u8);
        Ok(parity)
    }

    /// Encode a packed payload, returning packed parity
    ///
    /// The payload is unpacked MSB first and must be exactly
    /// `info_bits / 8` bytes (258 for the Wenet code). Parity comes back
    /// MSB first with the last byte zero padded, so 516 parity bits occupy
    /// 65 bytes.
    pub fn encode_bytes(&self, payload: &[u8]) -> Result<Vec<u8>, EncodeError> {
        let params = self.params();
        ensure!(
            params.info_bits % 8 == 0,
            UnpackableBlockSnafu { info_bits: params.info_bits }
        );
        ensure!(
            payload.len() * 8 == params.info_bits,
            WrongLengthSnafu {
                expected: params.info_bits / 8,
                actual: payload.len(),
                unit: "bytes",
            }
        );

        let info = payload.view_bits::<Msb0>();
        let mut parity = bitvec![u8, Msb0; 0; params.parity_bits];
        self.encode_bits(info, &mut parity);
        Ok(bitslice_to_bytes(&parity))
    }

    /// Information bits followed by parity bits, one bit per byte
    pub fn systematic_codeword(&self, info: &[u8]) -> Result<Vec<u8>, EncodeError> {
        let parity = self.encode(info)?;
        let mut codeword = Vec::with_capacity(info.len() + parity.len());
        codeword.extend_from_slice(info);
        codeword.extend_from_slice(&parity);
        Ok(codeword)
    }

    /// Systematic codeword of a packed payload, packed
    pub fn systematic_codeword_bytes(&self, payload: &[u8]) -> Result<Vec<u8>, EncodeError> {
        let info = unpack_bits(payload);
        let codeword = self.systematic_codeword(&info)?;
        Ok(pack_bits(&codeword))
    }
}
