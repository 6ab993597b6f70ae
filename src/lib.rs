pub mod crc;
pub mod interleaver;
pub mod ldpc;
pub mod packet;
pub mod tracing_init;
pub mod util;

pub use interleaver::{DiagonalInterleaver, Direction, InterleaverConfig};
pub use ldpc::{CodeParams, ConnectionTable, Encoder};
pub use packet::{FramerConfig, PacketFramer};
