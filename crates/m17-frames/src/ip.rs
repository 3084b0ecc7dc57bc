//! M17-over-IP encapsulation.
//!
//! 54 bytes: "M17 " magic | stream id u16 | LSF without CRC (28) |
//! frame number u16 | 16-byte payload | CRC-16 over bytes 4..52.
//! This is what reflectors and peers exchange over UDP.

use crate::lsf::Lsf;
use crate::stream::EOT_FLAG;
use m17_core::crc16::crc_m17;
use m17_core::type_field::TYPE_VOICE_STREAM;
use m17_core::{Address, FrameError, IP_FRAME_SIZE, M17_MAGIC, STREAM_PAYLOAD_BYTES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpFrame {
    pub stream_id: u16,
    pub lsf: Lsf,
    frame_number: u16,
    pub payload: [u8; STREAM_PAYLOAD_BYTES],
}

impl IpFrame {
    pub fn new(
        lsf: Lsf,
        stream_id: u16,
        frame_number: u16,
        payload: [u8; STREAM_PAYLOAD_BYTES],
    ) -> Self {
        IpFrame { stream_id, lsf, frame_number, payload }
    }

    /// Convenience constructor for a plain voice stream frame.
    /// `payload` may be shorter than 16 bytes and is zero-padded.
    pub fn create(
        dst: &str,
        src: &str,
        stream_id: u16,
        payload: &[u8],
    ) -> Result<Self, FrameError> {
        if payload.len() > STREAM_PAYLOAD_BYTES {
            return Err(FrameError::InvalidLength {
                field: "ip_payload",
                expected: STREAM_PAYLOAD_BYTES,
                found: payload.len(),
            });
        }
        let lsf = Lsf::new(
            Address::from_callsign(dst)?,
            Address::from_callsign(src)?,
            TYPE_VOICE_STREAM,
        );
        let mut padded = [0u8; STREAM_PAYLOAD_BYTES];
        padded[..payload.len()].copy_from_slice(payload);
        Ok(IpFrame { stream_id, lsf, frame_number: 0, payload: padded })
    }

    pub fn with_frame_number(mut self, frame_number: u16, eot: bool) -> Self {
        self.frame_number = frame_number & 0x7FFF;
        if eot {
            self.frame_number |= EOT_FLAG;
        }
        self
    }

    pub fn frame_number(&self) -> u16 {
        self.frame_number
    }

    pub fn sequence(&self) -> u16 {
        self.frame_number & 0x7FFF
    }

    pub fn is_eot(&self) -> bool {
        self.frame_number & EOT_FLAG != 0
    }

    pub fn to_bytes(&self) -> [u8; IP_FRAME_SIZE] {
        let mut out = [0u8; IP_FRAME_SIZE];
        out[0..4].copy_from_slice(&M17_MAGIC);
        out[4..6].copy_from_slice(&self.stream_id.to_be_bytes());
        out[6..34].copy_from_slice(&self.lsf.to_bytes_without_crc());
        out[34..36].copy_from_slice(&self.frame_number.to_be_bytes());
        out[36..52].copy_from_slice(&self.payload);
        let crc = crc_m17(&out[4..52]);
        out[52..54].copy_from_slice(&crc.to_be_bytes());
        out
    }

    /// Check whether a datagram starts with the M17 magic.
    pub fn is_m17(data: &[u8]) -> bool {
        data.len() >= 4 && data[0..4] == M17_MAGIC
    }

    pub fn parse(data: &[u8]) -> Result<Self, FrameError> {
        if data.len() != IP_FRAME_SIZE {
            return Err(FrameError::InvalidLength {
                field: "ip_frame",
                expected: IP_FRAME_SIZE,
                found: data.len(),
            });
        }
        if data[0..4] != M17_MAGIC {
            return Err(FrameError::BadMagic {
                found: data[0..4].try_into().unwrap(),
            });
        }
        let expected = crc_m17(&data[4..52]);
        let found = u16::from_be_bytes([data[52], data[53]]);
        if expected != found {
            return Err(FrameError::CrcMismatch { expected, found });
        }

        Ok(IpFrame {
            stream_id: u16::from_be_bytes([data[4], data[5]]),
            lsf: Lsf::from_header_bytes(data[6..34].try_into().unwrap()),
            frame_number: u16::from_be_bytes([data[34], data[35]]),
            payload: data[36..52].try_into().unwrap(),
        })
    }
}

impl core::fmt::Display for IpFrame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "IpFrame[SID={:04x}]: {} -> {} [FN={}]",
            self.stream_id,
            self.lsf.src,
            self.lsf.dst,
            self.sequence()
        )
    }
}
