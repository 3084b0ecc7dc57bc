//! Packet mode.
//!
//! A packet is protocol id | payload | CRC-16, cut into 25-byte chunks
//! for transmission. Each chunk carries a trailing metadata byte:
//! bit 7 flags the final chunk, bits 6..2 hold a 5-bit counter. The
//! counter numbers the chunks from zero, except on the final chunk where
//! it holds the number of used data bytes.

use m17_core::crc16::{crc_m17_bytes, verify_crc};
use m17_core::FrameError;

/// Data bytes per chunk
pub const CHUNK_DATA_SIZE: usize = 25;
/// Chunk size including the metadata byte
pub const CHUNK_SIZE: usize = 26;
/// 32 chunks of 25 bytes bound the framed packet (id + payload + CRC)
pub const MAX_FRAMED_SIZE: usize = 32 * CHUNK_DATA_SIZE;
/// Largest payload that still fits the chunk counter space
pub const MAX_PAYLOAD_SIZE: usize = MAX_FRAMED_SIZE - 3;

const EOP_FLAG: u8 = 0x80;

/// Packet protocol identifier, the first framed byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolId {
    Raw,
    Ax25,
    Aprs,
    SixLowPan,
    Ipv4,
    Sms,
    Winlink,
    Tle,
    Unknown(u8),
}

impl ProtocolId {
    pub fn from_raw(x: u8) -> Self {
        match x {
            0 => ProtocolId::Raw,
            1 => ProtocolId::Ax25,
            2 => ProtocolId::Aprs,
            3 => ProtocolId::SixLowPan,
            4 => ProtocolId::Ipv4,
            5 => ProtocolId::Sms,
            6 => ProtocolId::Winlink,
            7 => ProtocolId::Tle,
            other => ProtocolId::Unknown(other),
        }
    }

    pub fn into_raw(self) -> u8 {
        match self {
            ProtocolId::Raw => 0,
            ProtocolId::Ax25 => 1,
            ProtocolId::Aprs => 2,
            ProtocolId::SixLowPan => 3,
            ProtocolId::Ipv4 => 4,
            ProtocolId::Sms => 5,
            ProtocolId::Winlink => 6,
            ProtocolId::Tle => 7,
            ProtocolId::Unknown(x) => x,
        }
    }
}

impl core::fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProtocolId::Raw => write!(f, "Raw"),
            ProtocolId::Ax25 => write!(f, "Ax25"),
            ProtocolId::Aprs => write!(f, "Aprs"),
            ProtocolId::SixLowPan => write!(f, "SixLowPan"),
            ProtocolId::Ipv4 => write!(f, "Ipv4"),
            ProtocolId::Sms => write!(f, "Sms"),
            ProtocolId::Winlink => write!(f, "Winlink"),
            ProtocolId::Tle => write!(f, "Tle"),
            ProtocolId::Unknown(x) => write!(f, "Unknown({})", x),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub protocol: ProtocolId,
    payload: Vec<u8>,
}

impl Packet {
    pub fn new(protocol: ProtocolId, payload: Vec<u8>) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::InvalidLength {
                field: "packet_payload",
                expected: MAX_PAYLOAD_SIZE,
                found: payload.len(),
            });
        }
        Ok(Packet { protocol, payload })
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The framed byte string: id | payload | CRC over id + payload.
    pub fn frame_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload.len() + 3);
        out.push(self.protocol.into_raw());
        out.extend_from_slice(&self.payload);
        let crc = crc_m17_bytes(&out);
        out.extend_from_slice(&crc);
        out
    }

    /// Cut the framed bytes into transmission chunks.
    pub fn chunks(&self) -> Vec<[u8; CHUNK_SIZE]> {
        let framed = self.frame_bytes();
        let mut out = Vec::with_capacity((framed.len() + CHUNK_DATA_SIZE - 1) / CHUNK_DATA_SIZE);

        for (i, piece) in framed.chunks(CHUNK_DATA_SIZE).enumerate() {
            let last = (i + 1) * CHUNK_DATA_SIZE >= framed.len();
            let mut chunk = [0u8; CHUNK_SIZE];
            chunk[..piece.len()].copy_from_slice(piece);
            chunk[CHUNK_SIZE - 1] = if last {
                EOP_FLAG | ((piece.len() as u8) << 2)
            } else {
                ((i as u8) & 0x1F) << 2
            };
            out.push(chunk);
        }
        out
    }

    pub fn chunk_count(&self) -> usize {
        (self.payload.len() + 3 + CHUNK_DATA_SIZE - 1) / CHUNK_DATA_SIZE
    }
}

impl core::fmt::Display for Packet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Packet[{}]: {} bytes", self.protocol, self.payload.len())
    }
}

/// Reassembles a packet from received chunks.
///
/// Chunks must arrive in counter order; exact duplicates are absorbed,
/// anything else aborts the packet in progress. A CRC failure on the
/// final chunk drops the packet but leaves the assembler reusable.
#[derive(Debug, Clone, Default)]
pub struct PacketAssembler {
    buf: Vec<u8>,
    next_counter: u8,
    last_chunk: Option<[u8; CHUNK_SIZE]>,
}

impl PacketAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.buf.clear();
        self.next_counter = 0;
        self.last_chunk = None;
    }

    /// Number of data chunks absorbed so far.
    pub fn chunks_pending(&self) -> usize {
        self.next_counter as usize
    }

    /// Feed one received chunk. Returns the finished packet on the
    /// end-of-packet chunk, None while more chunks are expected.
    pub fn push(&mut self, chunk: &[u8; CHUNK_SIZE]) -> Result<Option<Packet>, FrameError> {
        let trailer = chunk[CHUNK_SIZE - 1];
        let eop = trailer & EOP_FLAG != 0;
        let counter = (trailer >> 2) & 0x1F;

        if !eop {
            if counter == self.next_counter {
                self.buf.extend_from_slice(&chunk[..CHUNK_DATA_SIZE]);
                self.next_counter += 1;
                self.last_chunk = Some(*chunk);
                return Ok(None);
            }
            // exact retransmission of the previous chunk is harmless
            if self.next_counter > 0 && counter == self.next_counter - 1 {
                if self.last_chunk.as_ref() == Some(chunk) {
                    return Ok(None);
                }
                let counter_val = counter;
                self.reset();
                return Err(FrameError::DuplicateMismatch { counter: counter_val });
            }
            let expected = self.next_counter;
            self.reset();
            return Err(FrameError::ChunkGap { expected, found: counter });
        }

        // final chunk: the counter holds the used byte count
        let used = counter as usize;
        if used == 0 || used > CHUNK_DATA_SIZE {
            self.reset();
            return Err(FrameError::InvalidValue {
                field: "packet_final_count",
                value: counter as u64,
            });
        }

        let mut framed = core::mem::take(&mut self.buf);
        framed.extend_from_slice(&chunk[..used]);
        self.reset();

        // id + CRC is the shortest possible framed packet
        if framed.len() < 3 || !verify_crc(&framed) {
            return Err(FrameError::CrcMismatch {
                expected: m17_core::crc16::crc_m17(&framed[..framed.len().saturating_sub(2)]),
                found: framed
                    .len()
                    .checked_sub(2)
                    .map(|n| u16::from_be_bytes([framed[n], framed[n + 1]]))
                    .unwrap_or(0),
            });
        }

        let protocol = ProtocolId::from_raw(framed[0]);
        let payload = framed[1..framed.len() - 2].to_vec();
        Ok(Some(Packet { protocol, payload }))
    }
}

// TLE helper ////////////////////////////////////////////////////////////////

/// Standard length of a two-line element set line
pub const TLE_LINE_LEN: usize = 69;
/// Satellite name limit in the common TLE title line
pub const TLE_NAME_MAX: usize = 24;

/// Two-Line Element set carried as a TLE-protocol packet.
/// Payload layout: name 0x0A line1 0x0A line2 0x00.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlePacket {
    pub name: String,
    pub line1: String,
    pub line2: String,
}

impl TlePacket {
    /// Quick shape probe: standard lines are 69 chars and start "1 "/"2 ".
    pub fn is_valid(&self) -> bool {
        self.line1.len() == TLE_LINE_LEN
            && self.line2.len() == TLE_LINE_LEN
            && self.line1.starts_with("1 ")
            && self.line2.starts_with("2 ")
    }

    /// Encode into a packet, normalizing the fields: the name is cut to
    /// 24 characters, both element lines are space-padded to 69.
    /// Overlong element lines are refused rather than silently clipped.
    pub fn to_packet(&self) -> Result<Packet, FrameError> {
        for line in [&self.line1, &self.line2] {
            if line.len() > TLE_LINE_LEN {
                return Err(FrameError::InvalidLength {
                    field: "tle_line",
                    expected: TLE_LINE_LEN,
                    found: line.len(),
                });
            }
        }

        let name: String = self.name.chars().take(TLE_NAME_MAX).collect();
        let mut payload = Vec::with_capacity(TLE_NAME_MAX + 2 * TLE_LINE_LEN + 3);
        payload.extend_from_slice(name.as_bytes());
        payload.push(b'\n');
        payload.extend_from_slice(format!("{:<width$}", self.line1, width = TLE_LINE_LEN).as_bytes());
        payload.push(b'\n');
        payload.extend_from_slice(format!("{:<width$}", self.line2, width = TLE_LINE_LEN).as_bytes());
        payload.push(0);

        Packet::new(ProtocolId::Tle, payload)
    }

    /// Parse a TLE packet. Non-standard element line lengths are logged
    /// and rejected.
    pub fn from_packet(packet: &Packet) -> Result<Self, FrameError> {
        if packet.protocol != ProtocolId::Tle {
            return Err(FrameError::InvalidValue {
                field: "protocol_id",
                value: packet.protocol.into_raw() as u64,
            });
        }

        let mut payload = packet.payload();
        if payload.last() == Some(&0) {
            payload = &payload[..payload.len() - 1];
        }
        let text = core::str::from_utf8(payload)
            .map_err(|_| FrameError::InvalidValue { field: "tle_utf8", value: 0 })?;

        let mut lines = text.split('\n');
        let name = lines.next().unwrap_or("").to_string();
        let line1 = lines.next().unwrap_or("").to_string();
        let line2 = lines.next().unwrap_or("").to_string();

        for line in [&line1, &line2] {
            if line.len() != TLE_LINE_LEN {
                tracing::warn!(
                    "rejecting TLE element line of {} chars (want {})",
                    line.len(),
                    TLE_LINE_LEN
                );
                return Err(FrameError::InvalidLength {
                    field: "tle_line",
                    expected: TLE_LINE_LEN,
                    found: line.len(),
                });
            }
        }

        Ok(TlePacket { name, line1, line2 })
    }
}

impl core::fmt::Display for TlePacket {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let valid = if self.is_valid() { "valid" } else { "invalid" };
        write!(f, "TlePacket({}, {})", self.name, valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISS_NAME: &str = "ISS (ZARYA)";
    const ISS_LINE1: &str =
        "1 25544U 98067A   21275.52043534  .00001234  00000-0  12345-4 0  9999";
    const ISS_LINE2: &str =
        "2 25544  51.6442 123.4567 0001234  12.3456 234.5678 15.48919755123456";

    fn roundtrip(packet: &Packet) -> Packet {
        let mut asm = PacketAssembler::new();
        let mut result = None;
        for chunk in packet.chunks() {
            result = asm.push(&chunk).unwrap();
        }
        result.expect("packet must complete on the last chunk")
    }

    #[test]
    fn test_single_chunk_packet() {
        let packet = Packet::new(ProtocolId::Sms, b"hi there".to_vec()).unwrap();
        let chunks = packet.chunks();
        assert_eq!(chunks.len(), 1);
        // 8 payload + id + crc = 11 used bytes, EOP set
        assert_eq!(chunks[0][25], 0x80 | (11 << 2));
        assert_eq!(roundtrip(&packet), packet);
    }

    #[test]
    fn test_multi_chunk_packet() {
        let payload: Vec<u8> = (0..200u16).map(|i| i as u8).collect();
        let packet = Packet::new(ProtocolId::Raw, payload).unwrap();
        let chunks = packet.chunks();
        // 203 framed bytes -> 8 full chunks + 3-byte tail
        assert_eq!(chunks.len(), 9);
        for (i, chunk) in chunks[..8].iter().enumerate() {
            assert_eq!(chunk[25], (i as u8) << 2);
        }
        assert_eq!(chunks[8][25], 0x80 | (3 << 2));
        assert_eq!(roundtrip(&packet), packet);
    }

    #[test]
    fn test_exact_chunk_boundary() {
        // framed length a multiple of 25: final chunk carries 25 bytes
        let packet = Packet::new(ProtocolId::Raw, vec![7u8; 47]).unwrap();
        let chunks = packet.chunks();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1][25], 0x80 | (25 << 2));
        assert_eq!(roundtrip(&packet), packet);
    }

    #[test]
    fn test_payload_size_limit() {
        assert!(Packet::new(ProtocolId::Raw, vec![0; MAX_PAYLOAD_SIZE]).is_ok());
        assert!(Packet::new(ProtocolId::Raw, vec![0; MAX_PAYLOAD_SIZE + 1]).is_err());
    }

    #[test]
    fn test_assembler_rejects_gap() {
        let packet = Packet::new(ProtocolId::Raw, vec![1u8; 100]).unwrap();
        let chunks = packet.chunks();
        assert_eq!(chunks.len(), 5);
        let mut asm = PacketAssembler::new();
        asm.push(&chunks[0]).unwrap();
        // skip chunk 1
        assert!(matches!(
            asm.push(&chunks[2]),
            Err(FrameError::ChunkGap { expected: 1, found: 2 })
        ));
    }

    #[test]
    fn test_assembler_absorbs_exact_duplicate() {
        let packet = Packet::new(ProtocolId::Raw, vec![2u8; 60]).unwrap();
        let chunks = packet.chunks();
        let mut asm = PacketAssembler::new();
        asm.push(&chunks[0]).unwrap();
        assert_eq!(asm.push(&chunks[0]).unwrap(), None);
        asm.push(&chunks[1]).unwrap();
        let done = asm.push(&chunks[2]).unwrap();
        assert_eq!(done.unwrap(), packet);
    }

    #[test]
    fn test_assembler_rejects_mismatched_duplicate() {
        let packet = Packet::new(ProtocolId::Raw, vec![3u8; 60]).unwrap();
        let chunks = packet.chunks();
        let mut asm = PacketAssembler::new();
        asm.push(&chunks[0]).unwrap();
        let mut tampered = chunks[0];
        tampered[4] ^= 0xFF;
        assert!(matches!(
            asm.push(&tampered),
            Err(FrameError::DuplicateMismatch { counter: 0 })
        ));
    }

    #[test]
    fn test_assembler_crc_failure_recoverable() {
        let packet = Packet::new(ProtocolId::Aprs, b"test data".to_vec()).unwrap();
        let mut chunks = packet.chunks();
        chunks[0][2] ^= 0x10;
        let mut asm = PacketAssembler::new();
        let mut err = None;
        for chunk in &chunks {
            match asm.push(chunk) {
                Err(e) => err = Some(e),
                Ok(_) => {}
            }
        }
        assert!(matches!(err, Some(FrameError::CrcMismatch { .. })));

        // the same assembler keeps working for the next packet
        let mut done = None;
        for chunk in packet.chunks() {
            done = asm.push(&chunk).unwrap();
        }
        assert_eq!(done.unwrap(), packet);
    }

    #[test]
    fn test_tle_roundtrip() {
        let tle = TlePacket {
            name: ISS_NAME.to_string(),
            line1: ISS_LINE1.to_string(),
            line2: ISS_LINE2.to_string(),
        };
        assert!(tle.is_valid());
        let packet = tle.to_packet().unwrap();
        assert_eq!(packet.protocol, ProtocolId::Tle);
        let parsed = TlePacket::from_packet(&packet).unwrap();
        assert_eq!(parsed, tle);
    }

    #[test]
    fn test_tle_through_chunks() {
        let tle = TlePacket {
            name: ISS_NAME.to_string(),
            line1: ISS_LINE1.to_string(),
            line2: ISS_LINE2.to_string(),
        };
        let packet = tle.to_packet().unwrap();
        assert!(packet.chunk_count() > 1);
        let rebuilt = roundtrip(&packet);
        assert_eq!(TlePacket::from_packet(&rebuilt).unwrap(), tle);
    }

    #[test]
    fn test_tle_short_line_padded() {
        let tle = TlePacket {
            name: "SAT".to_string(),
            line1: "1 short".to_string(),
            line2: "2 short".to_string(),
        };
        let packet = tle.to_packet().unwrap();
        // parser sees 69-char space-padded lines
        let parsed = TlePacket::from_packet(&packet).unwrap();
        assert_eq!(parsed.line1.len(), TLE_LINE_LEN);
        assert!(parsed.line1.starts_with("1 short"));
    }

    #[test]
    fn test_tle_overlong_line_rejected() {
        let tle = TlePacket {
            name: "SAT".to_string(),
            line1: "1 ".repeat(40),
            line2: ISS_LINE2.to_string(),
        };
        assert!(tle.to_packet().is_err());
    }

    #[test]
    fn test_tle_nonstandard_payload_rejected() {
        let packet = Packet::new(ProtocolId::Tle, b"NAME\nshort\nlines\0".to_vec()).unwrap();
        assert!(TlePacket::from_packet(&packet).is_err());
    }

    #[test]
    fn test_tle_wrong_protocol_rejected() {
        let packet = Packet::new(ProtocolId::Sms, b"hello".to_vec()).unwrap();
        assert!(TlePacket::from_packet(&packet).is_err());
    }
}
