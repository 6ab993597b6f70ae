//! Wenet packet framing
//!
//! A framed packet is laid out as:
//!
//! ```text
//! | preamble (16 × 0x55) | unique word AB CD EF 01 | payload | CRC-16 (LE) | parity (FEC only) |
//! ```
//!
//! The payload is truncated or padded with `pad_byte` to `payload_length`.
//! With FEC on, the RA-LDPC parity of `payload ++ crc` follows the CRC.
//!
//! Text message packets (type 0x00) carry a length byte and a big-endian
//! message counter in front of up to 252 bytes of text.

use snafu::prelude::*;
use tracing::{debug, trace};

use crate::crc::crc16;
use crate::ldpc::{EncodeError, Encoder};

/// Bit-sync preamble
pub const PREAMBLE: [u8; 16] = [0x55; 16];

/// Frame sync word searched for by the receiver
pub const UNIQUE_WORD: [u8; 4] = [0xab, 0xcd, 0xef, 0x01];

/// Bytes of header before the payload
pub const HEADER_LEN: usize = PREAMBLE.len() + UNIQUE_WORD.len();

/// Bytes of CRC after the payload
pub const CRC_LEN: usize = 2;

/// Packet type byte of text messages
pub const TEXT_MESSAGE_TYPE: u8 = 0x00;

/// Longest text a message packet carries
pub const MAX_TEXT_LEN: usize = 252;

/// Build a text message packet body
///
/// Layout: type 0x00, length (u8), counter (u16 big-endian), text. Text
/// past `MAX_TEXT_LEN` bytes is dropped.
///
/// # Example
/// ```
/// use rustywenet::packet::text_message_packet;
///
/// assert_eq!(text_message_packet(0x0102, b"hi"), vec![0x00, 2, 0x01, 0x02, b'h', b'i']);
/// ```
pub fn text_message_packet(counter: u16, message: &[u8]) -> Vec<u8> {
    let text = &message[..message.len().min(MAX_TEXT_LEN)];
    let mut packet = Vec::with_capacity(4 + text.len());
    packet.push(TEXT_MESSAGE_TYPE);
    packet.push(text.len() as u8);
    packet.extend_from_slice(&counter.to_be_bytes());
    packet.extend_from_slice(text);
    packet
}

#[derive(Debug, Snafu)]
pub enum FrameError {
    #[snafu(display("FEC needs payload plus CRC to fill {needed} bytes, but the payload length is {payload_length}"))]
    FecLength { payload_length: usize, needed: usize },

    #[snafu(display("Parity encoding failed: {source}"))]
    Encode { source: EncodeError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramerConfig {
    /// Payload bytes per packet, before the CRC
    pub payload_length: usize,
    /// Fill for packets shorter than `payload_length`
    pub pad_byte: u8,
    /// Add parity to idle frames when the framer has FEC
    pub fec_idle: bool,
}

impl Default for FramerConfig {
    fn default() -> Self {
        Self {
            payload_length: 256,
            pad_byte: 0x55,
            fec_idle: true,
        }
    }
}

/// Turns raw packets into transmit-ready frames
#[derive(Debug, Clone)]
pub struct PacketFramer {
    config: FramerConfig,
    fec: Option<Encoder>,
    text_message_count: u16,
}

impl PacketFramer {
    /// Create a framer, optionally with parity encoding
    ///
    /// With an encoder the payload plus CRC must fill the code's
    /// information block exactly.
    pub fn new(config: FramerConfig, fec: Option<Encoder>) -> Result<Self, FrameError> {
        if let Some(encoder) = &fec {
            let needed = encoder.params().info_bits / 8;
            ensure!(
                encoder.params().info_bits % 8 == 0 && config.payload_length + CRC_LEN == needed,
                FecLengthSnafu {
                    payload_length: config.payload_length,
                    needed,
                }
            );
        }

        debug!(
            payload_length = config.payload_length,
            fec = fec.is_some(),
            "packet framer ready"
        );
        Ok(PacketFramer {
            config,
            fec,
            text_message_count: 0,
        })
    }

    pub fn config(&self) -> FramerConfig {
        self.config
    }

    pub fn has_fec(&self) -> bool {
        self.fec.is_some()
    }

    /// Length in bytes of a frame carrying parity when FEC is enabled
    ///
    /// Idle frames with `fec_idle` off are shorter by the parity bytes.
    pub fn frame_len(&self) -> usize {
        let parity = self
            .fec
            .as_ref()
            .map_or(0, |e| e.params().parity_bits.div_ceil(8));
        HEADER_LEN + self.config.payload_length + CRC_LEN + parity
    }

    /// Frame one packet, with parity when FEC is enabled
    pub fn frame(&self, packet: &[u8]) -> Result<Vec<u8>, FrameError> {
        self.frame_with(packet, self.fec.as_ref())
    }

    /// Frame an idle message
    ///
    /// The body is a 0x00 control byte followed by `DE <callsign>: \t<message>`.
    /// Parity is added only when `fec_idle` is set.
    pub fn idle_frame(&self, callsign: &str, message: &str) -> Result<Vec<u8>, FrameError> {
        let mut body = vec![TEXT_MESSAGE_TYPE];
        body.extend_from_slice(format!("DE {}: \t{}", callsign, message).as_bytes());
        let fec = self.fec.as_ref().filter(|_| self.config.fec_idle);
        self.frame_with(&body, fec)
    }

    /// Frame the next text message
    ///
    /// The counter is bumped before use, so the first message is number 1;
    /// it wraps after 65535.
    pub fn text_message(&mut self, message: &str) -> Result<Vec<u8>, FrameError> {
        self.text_message_count = self.text_message_count.wrapping_add(1);
        let packet = text_message_packet(self.text_message_count, message.as_bytes());
        debug!(counter = self.text_message_count, len = packet.len() - 4, "text message");
        self.frame(&packet)
    }

    /// Number of the last text message framed
    pub fn text_message_count(&self) -> u16 {
        self.text_message_count
    }

    fn frame_with(&self, packet: &[u8], fec: Option<&Encoder>) -> Result<Vec<u8>, FrameError> {
        let payload_length = self.config.payload_length;
        if packet.len() > payload_length {
            trace!(len = packet.len(), payload_length, "truncating packet");
        }

        let mut payload = packet[..packet.len().min(payload_length)].to_vec();
        payload.resize(payload_length, self.config.pad_byte);
        let crc = crc16(&payload);

        let mut frame = Vec::with_capacity(self.frame_len());
        frame.extend_from_slice(&PREAMBLE);
        frame.extend_from_slice(&UNIQUE_WORD);
        frame.extend_from_slice(&payload);
        frame.extend_from_slice(&crc.to_le_bytes());

        if let Some(encoder) = fec {
            let parity = encoder
                .encode_bytes(&frame[HEADER_LEN..])
                .context(EncodeSnafu)?;
            frame.extend_from_slice(&parity);
        }

        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::check_crc16;
    use crate::ldpc::{random_table, CodeParams};

    fn wenet_encoder() -> Encoder {
        Encoder::new(random_table(CodeParams::WENET, 21))
    }

    #[test]
    fn test_frame_layout_without_fec() {
        let framer = PacketFramer::new(FramerConfig::default(), None).unwrap();
        let packet: Vec<u8> = (0..=255u8).collect();
        let frame = framer.frame(&packet).unwrap();

        assert_eq!(frame.len(), framer.frame_len());
        assert_eq!(frame.len(), 16 + 4 + 256 + 2);
        assert_eq!(&frame[..16], &PREAMBLE);
        assert_eq!(&frame[16..20], &UNIQUE_WORD);
        assert_eq!(&frame[20..276], &packet[..]);
        assert!(check_crc16(&frame[HEADER_LEN..]));
    }

    #[test]
    fn test_short_packet_is_padded() {
        let config = FramerConfig { payload_length: 8, ..Default::default() };
        let framer = PacketFramer::new(config, None).unwrap();
        let frame = framer.frame(&[1, 2, 3]).unwrap();
        let padded = [1, 2, 3, 0x55, 0x55, 0x55, 0x55, 0x55];
        assert_eq!(&frame[HEADER_LEN..HEADER_LEN + 8], &padded);
        assert_eq!(&frame[HEADER_LEN + 8..], &crc16(&padded).to_le_bytes());
    }

    #[test]
    fn test_pad_byte_is_configurable() {
        let config = FramerConfig { payload_length: 6, pad_byte: 0, fec_idle: false };
        let framer = PacketFramer::new(config, None).unwrap();
        let frame = framer.frame(&[7]).unwrap();
        assert_eq!(&frame[HEADER_LEN..HEADER_LEN + 6], &[7, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_long_packet_is_truncated() {
        let config = FramerConfig { payload_length: 4, ..Default::default() };
        let framer = PacketFramer::new(config, None).unwrap();
        let frame = framer.frame(&[9, 8, 7, 6, 5, 4]).unwrap();
        assert_eq!(frame.len(), HEADER_LEN + 4 + CRC_LEN);
        assert_eq!(&frame[HEADER_LEN..HEADER_LEN + 4], &[9, 8, 7, 6]);
    }

    #[test]
    fn test_frame_with_fec() {
        let encoder = wenet_encoder();
        let framer = PacketFramer::new(FramerConfig::default(), Some(encoder.clone())).unwrap();
        let packet: Vec<u8> = (0..=255u8).collect();
        let frame = framer.frame(&packet).unwrap();

        assert_eq!(frame.len(), 16 + 4 + 258 + 65);
        assert_eq!(frame.len(), framer.frame_len());

        let info = &frame[HEADER_LEN..HEADER_LEN + 258];
        assert!(check_crc16(info));
        assert_eq!(&frame[HEADER_LEN + 258..], &encoder.encode_bytes(info).unwrap()[..]);
    }

    #[test]
    fn test_fec_length_mismatch() {
        let config = FramerConfig { payload_length: 200, ..Default::default() };
        let err = PacketFramer::new(config, Some(wenet_encoder())).unwrap_err();
        assert!(matches!(err, FrameError::FecLength { payload_length: 200, needed: 258 }));
    }

    #[test]
    fn test_idle_frame_with_fec() {
        let encoder = wenet_encoder();
        let framer = PacketFramer::new(FramerConfig::default(), Some(encoder.clone())).unwrap();
        let frame = framer.idle_frame("N0CALL", "hello").unwrap();
        assert_eq!(frame.len(), framer.frame_len());

        let body = b"\x00DE N0CALL: \thello";
        assert_eq!(&frame[HEADER_LEN..HEADER_LEN + body.len()], &body[..]);
        assert_eq!(frame[HEADER_LEN + body.len()], 0x55);

        let info = &frame[HEADER_LEN..HEADER_LEN + 258];
        assert!(check_crc16(info));
        assert_eq!(&frame[HEADER_LEN + 258..], &encoder.encode_bytes(info).unwrap()[..]);
    }

    #[test]
    fn test_idle_frame_without_fec() {
        let config = FramerConfig { fec_idle: false, ..Default::default() };
        let framer = PacketFramer::new(config, Some(wenet_encoder())).unwrap();
        let frame = framer.idle_frame("N0CALL", "hello").unwrap();
        assert_eq!(frame.len(), HEADER_LEN + 256 + CRC_LEN);
        assert!(check_crc16(&frame[HEADER_LEN..]));
    }

    #[test]
    fn test_text_message_packet_layout() {
        let packet = text_message_packet(513, b"CQ DE VK5QI");
        assert_eq!(&packet[..4], &[TEXT_MESSAGE_TYPE, 11, 0x02, 0x01]);
        assert_eq!(&packet[4..], b"CQ DE VK5QI");
    }

    #[test]
    fn test_text_message_is_clipped() {
        let long = vec![b'x'; 300];
        let packet = text_message_packet(1, &long);
        assert_eq!(packet.len(), 4 + MAX_TEXT_LEN);
        assert_eq!(packet[1], 252);
    }

    #[test]
    fn test_text_message_counter() {
        let mut framer = PacketFramer::new(FramerConfig::default(), None).unwrap();
        let first = framer.text_message("one").unwrap();
        let second = framer.text_message("two").unwrap();
        assert_eq!(framer.text_message_count(), 2);

        assert_eq!(&first[HEADER_LEN..HEADER_LEN + 7], &[0x00, 3, 0x00, 0x01, b'o', b'n', b'e']);
        assert_eq!(&second[HEADER_LEN + 2..HEADER_LEN + 4], &[0x00, 0x02]);
        // Remainder of the payload is padding
        assert!(first[HEADER_LEN + 7..HEADER_LEN + 256].iter().all(|&b| b == 0x55));
        assert!(check_crc16(&first[HEADER_LEN..]));
    }

    #[test]
    fn test_text_message_counter_wraps() {
        let mut framer = PacketFramer::new(FramerConfig::default(), None).unwrap();
        framer.text_message_count = u16::MAX - 1;
        let last = framer.text_message("a").unwrap();
        assert_eq!(&last[HEADER_LEN + 2..HEADER_LEN + 4], &[0xff, 0xff]);
        let wrapped = framer.text_message("b").unwrap();
        assert_eq!(framer.text_message_count(), 0);
        assert_eq!(&wrapped[HEADER_LEN + 2..HEADER_LEN + 4], &[0x00, 0x00]);
    }
}
