//! Wenet Packet Encoder - offline version of the transmit chain
//!
//! Frames a file as a sequence of Wenet packets, optionally adding RA-LDPC
//! parity and running the bit stream through a forward diagonal interleaver.
//!
//! Usage:
//!   cargo run --bin wenettx -- [OPTIONS] <input> <output>
//!   wenettx [OPTIONS] <input> <output>
//!
//! Options:
//!   -t, --table <path>           Hrows connection table; enables FEC
//!   -l, --payload-length <n>     Payload bytes per packet (default: 256)
//!   -i, --interleave             Write interleaved bits, one per byte
//!       --size <n>               Interleaver block size (default: 256)
//!       --depth <n>              Interleaver depth (default: 10)
//!   -m, --message <text>         Send a text message packet ahead of the file
//!   -v, --verbose                Debug logging (RUST_LOG overrides)
//!   -h, --help                   Show this help message
//!
//! Examples:
//!   # Plain framing, no FEC
//!   wenettx image.ssdv frames.bin
//!
//!   # FEC and interleaving with the 2064-bit code
//!   wenettx -t Hrow2064.txt -i image.ssdv tx_bits.bin

use std::path::PathBuf;

use rustywenet::interleaver::{DiagonalInterleaver, Direction, InterleaverConfig};
use rustywenet::ldpc::{CodeParams, ConnectionTable, Encoder};
use rustywenet::packet::{FramerConfig, PacketFramer};
use rustywenet::tracing_init::init_tracing;
use rustywenet::util::bitvec_utils::unpack_bits;
use tracing::info;

struct TxConfig {
    input_path: PathBuf,
    output_path: PathBuf,
    table_path: Option<PathBuf>,
    framer: FramerConfig,
    interleaver: Option<InterleaverConfig>,
    message: Option<String>,
    verbose: bool,
}

impl TxConfig {
    fn parse_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();

        let mut framer = FramerConfig::default();
        let mut interleaver_config = InterleaverConfig::default();
        let mut interleave = false;
        let mut table_path = None;
        let mut input_path = None;
        let mut output_path = None;
        let mut message = None;
        let mut verbose = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-t" | "--table" => {
                    i += 1;
                    let value = args.get(i).ok_or("Missing value for --table")?;
                    table_path = Some(PathBuf::from(value));
                }
                "-l" | "--payload-length" => {
                    i += 1;
                    let value = args.get(i).ok_or("Missing value for --payload-length")?;
                    framer.payload_length = value
                        .parse()
                        .map_err(|_| format!("Invalid payload length: {}", value))?;
                }
                "-i" | "--interleave" => {
                    interleave = true;
                }
                "--size" => {
                    i += 1;
                    let value = args.get(i).ok_or("Missing value for --size")?;
                    interleaver_config.size = value
                        .parse()
                        .map_err(|_| format!("Invalid interleaver size: {}", value))?;
                }
                "--depth" => {
                    i += 1;
                    let value = args.get(i).ok_or("Missing value for --depth")?;
                    interleaver_config.depth = value
                        .parse()
                        .map_err(|_| format!("Invalid interleaver depth: {}", value))?;
                }
                "-m" | "--message" => {
                    i += 1;
                    message = Some(args.get(i).ok_or("Missing value for --message")?.clone());
                }
                "-v" | "--verbose" => {
                    verbose = true;
                }
                "-h" | "--help" => {
                    print_help(&args[0]);
                    std::process::exit(0);
                }
                arg if !arg.starts_with('-') => {
                    if input_path.is_none() {
                        input_path = Some(PathBuf::from(arg));
                    } else if output_path.is_none() {
                        output_path = Some(PathBuf::from(arg));
                    } else {
                        return Err(format!("Unexpected argument: {}", arg));
                    }
                }
                arg => return Err(format!("Unknown option: {}", arg)),
            }
            i += 1;
        }

        if framer.payload_length == 0 {
            return Err("Payload length must be at least 1".to_string());
        }

        Ok(TxConfig {
            input_path: input_path.ok_or("Missing input file argument")?,
            output_path: output_path.ok_or("Missing output file argument")?,
            table_path,
            framer,
            interleaver: interleave.then_some(interleaver_config),
            message,
            verbose,
        })
    }
}

fn print_help(program: &str) {
    eprintln!("Wenet Packet Encoder");
    eprintln!();
    eprintln!("Usage: {} [OPTIONS] <input> <output>", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -t, --table <path>        Hrows connection table; enables FEC");
    eprintln!("  -l, --payload-length <n>  Payload bytes per packet (default: 256)");
    eprintln!("  -i, --interleave          Write interleaved bits, one per byte");
    eprintln!("      --size <n>            Interleaver block size (default: 256)");
    eprintln!("      --depth <n>           Interleaver depth (default: 10)");
    eprintln!("  -m, --message <text>      Send a text message packet ahead of the file");
    eprintln!("  -v, --verbose             Debug logging (RUST_LOG overrides)");
    eprintln!("  -h, --help                Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} image.ssdv frames.bin", program);
    eprintln!("  {} -t Hrow2064.txt -i image.ssdv tx_bits.bin", program);
}

fn run(config: &TxConfig) -> Result<(), String> {
    let fec = match &config.table_path {
        Some(path) => {
            let table = ConnectionTable::from_file(CodeParams::WENET, path).map_err(|e| e.to_string())?;
            Some(Encoder::new(table))
        }
        None => None,
    };

    let mut framer = PacketFramer::new(config.framer, fec).map_err(|e| e.to_string())?;

    let input = std::fs::read(&config.input_path)
        .map_err(|e| format!("Failed to read {}: {}", config.input_path.display(), e))?;

    let mut frames = Vec::with_capacity(input.len().div_ceil(config.framer.payload_length) * framer.frame_len());
    let mut packets = 0usize;
    if let Some(message) = &config.message {
        frames.extend(framer.text_message(message).map_err(|e| e.to_string())?);
        packets += 1;
    }
    for packet in input.chunks(config.framer.payload_length) {
        frames.extend(framer.frame(packet).map_err(|e| e.to_string())?);
        packets += 1;
    }
    info!(packets, fec = framer.has_fec(), bytes = frames.len(), "framed input");

    let output = match config.interleaver {
        Some(interleaver_config) => {
            let mut interleaver = DiagonalInterleaver::new(interleaver_config, Direction::Forward)
                .map_err(|e| e.to_string())?;
            interleaver
                .interleave_padded(&unpack_bits(&frames))
                .map_err(|e| e.to_string())?
        }
        None => frames,
    };

    std::fs::write(&config.output_path, &output)
        .map_err(|e| format!("Failed to write {}: {}", config.output_path.display(), e))?;
    info!(path = %config.output_path.display(), bytes = output.len(), "wrote output");

    Ok(())
}

fn main() {
    let config = match TxConfig::parse_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Try --help for usage");
            std::process::exit(1);
        }
    };

    init_tracing(config.verbose);

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
