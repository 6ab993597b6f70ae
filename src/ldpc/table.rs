//! Connection table for the repeat-accumulate LDPC encoder
//!
//! The table is the sparse part of the parity-check matrix: for every parity
//! bit, `row_weight` consecutive entries name the (1-based) information bits
//! that are summed to form it. Tables are produced offline by the code design
//! tools and shipped as a text file of integers ("Hrows" file).

use std::path::{Path, PathBuf};

use snafu::prelude::*;
use tracing::{debug, trace};

use super::CodeParams;

#[derive(Debug, Snafu)]
pub enum TableError {
    #[snafu(display("Code parameters must be nonzero: {info_bits} info bits, {parity_bits} parity bits, row weight {row_weight}"))]
    InvalidParams {
        info_bits: usize,
        parity_bits: usize,
        row_weight: usize,
    },

    #[snafu(display("Information bit count {info_bits} does not fit in a 16-bit table entry"))]
    TooManyInfoBits { info_bits: usize },

    #[snafu(display("Connection table must hold {expected} entries, got {actual}"))]
    WrongLength { expected: usize, actual: usize },

    #[snafu(display("Table entry {position} is {value}, outside 1..={max}"))]
    IndexOutOfRange { position: usize, value: u16, max: usize },

    #[snafu(display("Unable to parse \"{token}\" on line {line} as a table entry"))]
    Parse { line: usize, token: String },

    #[snafu(display("Unable to read connection table {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Validated, immutable connection table
///
/// Entries are stored 0-based; the 1-based form only exists at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTable {
    params: CodeParams,
    indices: Vec<u16>,
}

impl ConnectionTable {
    /// Build a table from 1-based entries, checking length and range
    ///
    /// # Example
    /// ```
    /// use rustywenet::ldpc::{CodeParams, ConnectionTable};
    ///
    /// let params = CodeParams::new(4, 2, 2);
    /// let table = ConnectionTable::new(params, vec![1, 2, 3, 4]).unwrap();
    /// assert_eq!(table.row(1), &[2, 3]);
    /// ```
    pub fn new(params: CodeParams, entries: Vec<u16>) -> Result<Self, TableError> {
        ensure!(
            params.info_bits > 0 && params.parity_bits > 0 && params.row_weight > 0,
            InvalidParamsSnafu {
                info_bits: params.info_bits,
                parity_bits: params.parity_bits,
                row_weight: params.row_weight,
            }
        );
        ensure!(
            params.info_bits <= u16::MAX as usize,
            TooManyInfoBitsSnafu { info_bits: params.info_bits }
        );

        let expected = params.table_len();
        ensure!(
            entries.len() == expected,
            WrongLengthSnafu { expected, actual: entries.len() }
        );

        let mut indices = entries;
        for (position, entry) in indices.iter_mut().enumerate() {
            let value = *entry;
            ensure!(
                value >= 1 && (value as usize) <= params.info_bits,
                IndexOutOfRangeSnafu { position, value, max: params.info_bits }
            );
            *entry = value - 1;
        }

        debug!(
            info_bits = params.info_bits,
            parity_bits = params.parity_bits,
            row_weight = params.row_weight,
            "connection table loaded"
        );

        Ok(ConnectionTable { params, indices })
    }

    /// Parse the textual Hrows format
    ///
    /// Integers may be separated by commas and/or whitespace. `//` comments
    /// run to the end of the line and `/* ... */` comments may span lines.
    pub fn from_hrows_text(params: CodeParams, text: &str) -> Result<Self, TableError> {
        let mut entries = Vec::with_capacity(params.table_len());
        let mut in_block_comment = false;

        for (line_idx, raw_line) in text.lines().enumerate() {
            let line = strip_comments(raw_line, &mut in_block_comment);
            for token in line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
            {
                let value = token.parse::<u16>().map_err(|_| TableError::Parse {
                    line: line_idx + 1,
                    token: token.to_string(),
                })?;
                entries.push(value);
            }
        }

        trace!(entries = entries.len(), "parsed hrows text");
        Self::new(params, entries)
    }

    /// Read and parse an Hrows file
    pub fn from_file(params: CodeParams, path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).context(IoSnafu { path })?;
        Self::from_hrows_text(params, &text)
    }

    pub fn params(&self) -> CodeParams {
        self.params
    }

    /// 0-based information bit indices feeding parity bit `p`
    ///
    /// # Panics
    /// Panics if `p >= parity_bits`.
    pub fn row(&self, p: usize) -> &[u16] {
        let w = self.params.row_weight;
        &self.indices[p * w..(p + 1) * w]
    }

    /// Iterate rows in parity order
    pub fn rows(&self) -> std::slice::ChunksExact<'_, u16> {
        self.indices.chunks_exact(self.params.row_weight)
    }

    /// 1-based entries, as they appear in an Hrows file
    pub fn to_entries(&self) -> Vec<u16> {
        self.indices.iter().map(|i| i + 1).collect()
    }
}

/// Remove `//` and `/* */` comments from one line
fn strip_comments(line: &str, in_block_comment: &mut bool) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    loop {
        if *in_block_comment {
            match rest.find("*/") {
                Some(end) => {
                    *in_block_comment = false;
                    rest = &rest[end + 2..];
                }
                None => return out,
            }
        }

        let line_comment = rest.find("//");
        let block_comment = rest.find("/*");
        match (line_comment, block_comment) {
            (Some(l), Some(b)) if b < l => {
                out.push_str(&rest[..b]);
                out.push(' ');
                *in_block_comment = true;
                rest = &rest[b + 2..];
            }
            (Some(l), _) => {
                out.push_str(&rest[..l]);
                return out;
            }
            (None, Some(b)) => {
                out.push_str(&rest[..b]);
                out.push(' ');
                *in_block_comment = true;
                rest = &rest[b + 2..];
            }
            (None, None) => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

/// Seeded random table for tests
#[cfg(test)]
pub(crate) fn random_table(params: CodeParams, seed: u64) -> ConnectionTable {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(seed);
    let entries = (0..params.table_len())
        .map(|_| rng.random_range(1..=params.info_bits as u16))
        .collect();
    ConnectionTable::new(params, entries).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> CodeParams {
        CodeParams::new(6, 3, 2)
    }

    #[test]
    fn test_new_converts_to_zero_based() {
        let table = ConnectionTable::new(small(), vec![1, 6, 2, 3, 5, 4]).unwrap();
        assert_eq!(table.row(0), &[0, 5]);
        assert_eq!(table.row(1), &[1, 2]);
        assert_eq!(table.row(2), &[4, 3]);
        assert_eq!(table.rows().count(), 3);
        assert_eq!(table.to_entries(), vec![1, 6, 2, 3, 5, 4]);
    }

    #[test]
    fn test_wrong_length() {
        let err = ConnectionTable::new(small(), vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, TableError::WrongLength { expected: 6, actual: 3 }));
    }

    #[test]
    fn test_zero_entry_rejected() {
        let err = ConnectionTable::new(small(), vec![1, 2, 0, 3, 4, 5]).unwrap_err();
        assert!(matches!(err, TableError::IndexOutOfRange { position: 2, value: 0, max: 6 }));
    }

    #[test]
    fn test_entry_past_end_rejected() {
        let err = ConnectionTable::new(small(), vec![1, 2, 3, 4, 5, 7]).unwrap_err();
        assert!(matches!(err, TableError::IndexOutOfRange { position: 5, value: 7, .. }));
    }

    #[test]
    fn test_zero_params_rejected() {
        let err = ConnectionTable::new(CodeParams::new(4, 0, 2), vec![]).unwrap_err();
        assert!(matches!(err, TableError::InvalidParams { .. }));
    }

    #[test]
    fn test_info_bits_past_u16_rejected() {
        let err = ConnectionTable::new(CodeParams::new(70_000, 1, 1), vec![1]).unwrap_err();
        assert!(matches!(err, TableError::TooManyInfoBits { info_bits: 70_000 }));
    }

    #[test]
    fn test_parse_hrows_text() {
        let text = "// read from file created via make_Hrows_txt.m\n\
                    1, 6,\n\
                    2 ,3, /* row 2 */ 5,\n\
                    /* multi\n   line */ 4\n";
        let table = ConnectionTable::from_hrows_text(small(), text).unwrap();
        assert_eq!(table.to_entries(), vec![1, 6, 2, 3, 5, 4]);
    }

    #[test]
    fn test_parse_bad_token() {
        let err = ConnectionTable::from_hrows_text(small(), "1, 2,\n3, x4, 5, 6").unwrap_err();
        match err {
            TableError::Parse { line, token } => {
                assert_eq!(line, 2);
                assert_eq!(token, "x4");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = ConnectionTable::from_file(small(), "/nonexistent/Hrow2064.txt").unwrap_err();
        assert!(matches!(err, TableError::Io { .. }));
        assert!(err.to_string().contains("Hrow2064.txt"));
    }

    #[test]
    fn test_random_table_in_range() {
        let table = random_table(CodeParams::WENET, 7);
        assert!(table.rows().flatten().all(|&i| (i as usize) < CodeParams::WENET.info_bits));
    }
}
