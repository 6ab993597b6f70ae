//! Diagonal Interleaver
//!
//! Spreads burst errors over time before the symbols go out over the radio.
//! The interleaver keeps `depth` layers of `size × size` symbols. Every block
//! of `size` symbols is pushed through all layers in turn; within a layer each
//! row is a shift register and the output is read along a diagonal:
//!
//! - **Forward** (transmit): row `i` reads column `size - 1 - i`, delaying it
//!   by `i` blocks per layer.
//! - **Reverse** (receive): row `i` reads column `i`, delaying it by
//!   `size - 1 - i` blocks per layer.
//!
//! A forward and a reverse interleaver with the same `size` and `depth`
//! therefore delay every row by the same `depth × (size - 1)` blocks, which
//! restores the original order.
//!
//! Layers are chained: layer `k + 1` consumes the block as rewritten by
//! layer `k`.

use snafu::prelude::*;
use tracing::{debug, trace};

/// Fill value used by forward interleavers for "no symbol yet"
pub const PUNCTURE_MARKER: u8 = 0;

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum InterleaveError {
    #[snafu(display("Interleaver size and depth must be nonzero and fit in memory, got size {size} depth {depth}"))]
    InvalidConfig { size: usize, depth: usize },

    #[snafu(display("Symbol block must be {expected} symbols, got {actual}"))]
    BlockLength { expected: usize, actual: usize },

    #[snafu(display("Symbol stream of {actual} symbols is not a whole number of {size} symbol blocks"))]
    StreamLength { size: usize, actual: usize },
}

/// Which side of the link the interleaver sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Transmit side
    Forward,
    /// Receive side, undoes `Forward`
    Reverse,
}

/// Interleaver dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterleaverConfig {
    /// Symbols per block, and rows/columns per layer
    pub size: usize,
    /// Number of chained layers
    pub depth: usize,
    /// Value a forward interleaver emits before real symbols arrive
    pub puncture_marker: u8,
}

impl Default for InterleaverConfig {
    fn default() -> Self {
        Self {
            size: 256,
            depth: 10,
            puncture_marker: PUNCTURE_MARKER,
        }
    }
}

impl InterleaverConfig {
    /// Total number of cells across all layers, `None` on overflow
    pub fn buffer_len(&self) -> Option<usize> {
        self.size.checked_mul(self.size)?.checked_mul(self.depth)
    }
}

/// Stateful multi-layer diagonal interleaver
///
/// One instance serves one stream in one direction.
#[derive(Debug, Clone)]
pub struct DiagonalInterleaver {
    config: InterleaverConfig,
    direction: Direction,
    buffer: Vec<u8>,
}

impl DiagonalInterleaver {
    /// Create an interleaver and initialize it for `direction`
    ///
    /// # Example
    /// ```
    /// use rustywenet::interleaver::{DiagonalInterleaver, Direction, InterleaverConfig};
    ///
    /// let config = InterleaverConfig { size: 4, depth: 1, puncture_marker: 9 };
    /// let mut tx = DiagonalInterleaver::new(config, Direction::Forward).unwrap();
    ///
    /// let mut block = [1, 1, 1, 1];
    /// tx.interleave_symbols(&mut block).unwrap();
    /// // Only row 0 has no delay
    /// assert_eq!(block, [1, 9, 9, 9]);
    /// ```
    pub fn new(config: InterleaverConfig, direction: Direction) -> Result<Self, InterleaveError> {
        let cells = config
            .buffer_len()
            .filter(|_| config.size > 0 && config.depth > 0)
            .context(InvalidConfigSnafu { size: config.size, depth: config.depth })?;

        let mut interleaver = DiagonalInterleaver {
            config,
            direction,
            buffer: vec![0u8; cells],
        };
        interleaver.initialize(direction);
        Ok(interleaver)
    }

    /// Set the direction and discard all history
    pub fn initialize(&mut self, direction: Direction) {
        self.direction = direction;
        debug!(
            ?direction,
            size = self.config.size,
            depth = self.config.depth,
            cells = self.buffer.len(),
            "interleaver initialized"
        );
        self.flush();
    }

    /// Fill every cell with the direction's fill value
    pub fn flush(&mut self) {
        let fill = self.fill_value();
        self.buffer.fill(fill);
        trace!(fill, "interleaver flushed");
    }

    /// Value every cell holds after a flush
    ///
    /// Reverse interleavers fill with 0 so undrained output decodes as
    /// harmless data; forward interleavers fill with the puncture marker.
    pub fn fill_value(&self) -> u8 {
        match self.direction {
            Direction::Forward => self.config.puncture_marker,
            Direction::Reverse => 0,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn config(&self) -> InterleaverConfig {
        self.config
    }

    /// Blocks before a forward/reverse pair returns real symbols
    pub fn latency_blocks(&self) -> usize {
        self.config.depth * (self.config.size - 1)
    }

    /// Flat index of (layer, row, column)
    #[inline]
    fn index(&self, layer: usize, row: usize, col: usize) -> usize {
        (layer * self.config.size + row) * self.config.size + col
    }

    /// Column row `row` is read from
    #[inline]
    fn read_column(&self, row: usize) -> usize {
        match self.direction {
            Direction::Forward => self.config.size - 1 - row,
            Direction::Reverse => row,
        }
    }

    /// Push one block of `size` symbols through every layer, in place
    ///
    /// # Errors
    /// `InterleaveError::BlockLength` if `symbols.len() != size`.
    pub fn interleave_symbols(&mut self, symbols: &mut [u8]) -> Result<(), InterleaveError> {
        let size = self.config.size;
        ensure!(
            symbols.len() == size,
            BlockLengthSnafu { expected: size, actual: symbols.len() }
        );

        for layer in 0..self.config.depth {
            for (row, symbol) in symbols.iter_mut().enumerate() {
                let start = self.index(layer, row, 0);
                let read = start + self.read_column(row);
                let cells = &mut self.buffer[start..start + size];

                // Age the row by one block, newest symbol in the last column
                cells.copy_within(1.., 0);
                cells[size - 1] = *symbol;

                *symbol = self.buffer[read];
            }
        }

        Ok(())
    }

    /// Interleave consecutive blocks of a longer buffer
    ///
    /// # Errors
    /// `InterleaveError::StreamLength` if the length is not a multiple of
    /// `size`; the buffer is left untouched in that case.
    pub fn interleave_stream(&mut self, symbols: &mut [u8]) -> Result<(), InterleaveError> {
        let size = self.config.size;
        ensure!(
            symbols.len() % size == 0,
            StreamLengthSnafu { size, actual: symbols.len() }
        );

        for block in symbols.chunks_exact_mut(size) {
            self.interleave_symbols(block)?;
        }
        Ok(())
    }

    /// Interleave a symbol stream of any length and drain the pipeline
    ///
    /// The last partial block is padded with the puncture marker and
    /// `latency_blocks()` marker blocks follow, so a matched interleaver on
    /// the other side hands back every input symbol. The result is a whole
    /// number of blocks.
    pub fn interleave_padded(&mut self, symbols: &[u8]) -> Result<Vec<u8>, InterleaveError> {
        let size = self.config.size;
        let data_blocks = symbols.len().div_ceil(size);
        let drain_blocks = self.latency_blocks();

        let mut stream = vec![self.config.puncture_marker; (data_blocks + drain_blocks) * size];
        stream[..symbols.len()].copy_from_slice(symbols);
        self.interleave_stream(&mut stream)?;

        debug!(data_blocks, drain_blocks, "interleaved padded stream");
        Ok(stream)
    }
}
