//! Stream frames.
//!
//! A stream frame carries a 6-byte LICH chunk and an 18-byte payload:
//! 2-byte frame number (bit 15 flags end of transmission, bits 14..0
//! count modulo 2^15) followed by 16 opaque payload bytes, typically two
//! Codec2 voice blocks. No CRC; the FEC and the LSF's checksum carry the
//! link.

use m17_core::{FrameError, LICH_CHUNK_SIZE, STREAM_PAYLOAD_BYTES};

pub const EOT_FLAG: u16 = 0x8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFrame {
    pub lich_chunk: [u8; LICH_CHUNK_SIZE],
    frame_number: u16,
    pub payload: [u8; STREAM_PAYLOAD_BYTES],
}

impl StreamFrame {
    /// Build a frame. `frame_number` is taken modulo 2^15; `eot` sets
    /// the end-of-transmission flag in bit 15.
    pub fn new(
        lich_chunk: [u8; LICH_CHUNK_SIZE],
        frame_number: u16,
        payload: [u8; STREAM_PAYLOAD_BYTES],
        eot: bool,
    ) -> Self {
        let mut fn_field = frame_number & 0x7FFF;
        if eot {
            fn_field |= EOT_FLAG;
        }
        StreamFrame { lich_chunk, frame_number: fn_field, payload }
    }

    /// Raw 16-bit frame number field, flag included.
    pub fn frame_number(&self) -> u16 {
        self.frame_number
    }

    /// Sequence counter without the EOT flag.
    pub fn sequence(&self) -> u16 {
        self.frame_number & 0x7FFF
    }

    pub fn is_eot(&self) -> bool {
        self.frame_number & EOT_FLAG != 0
    }

    /// The 18 payload bytes that enter the convolutional encoder.
    pub fn payload_bytes(&self) -> [u8; 18] {
        let mut out = [0u8; 18];
        out[0..2].copy_from_slice(&self.frame_number.to_be_bytes());
        out[2..18].copy_from_slice(&self.payload);
        out
    }

    /// Parse the 18-byte payload form.
    pub fn from_payload_bytes(
        lich_chunk: [u8; LICH_CHUNK_SIZE],
        data: &[u8],
    ) -> Result<Self, FrameError> {
        if data.len() != 18 {
            return Err(FrameError::InvalidLength {
                field: "stream_payload",
                expected: 18,
                found: data.len(),
            });
        }
        Ok(StreamFrame {
            lich_chunk,
            frame_number: u16::from_be_bytes([data[0], data[1]]),
            payload: data[2..18].try_into().unwrap(),
        })
    }

    /// FEC-encode into a 48-byte sync-prefixed RF frame.
    pub fn encode_rf(&self) -> Vec<u8> {
        crate::rf::encode_stream(self)
    }

    /// Decode 368 soft bits back into a frame. The LICH quality metric
    /// is dropped here; use [`crate::rf::decode_stream`] to feed a
    /// [`crate::lich::LichCollector`].
    pub fn decode_rf(soft: &[m17_core::SoftBit]) -> Result<Self, FrameError> {
        Ok(crate::rf::decode_stream(soft)?.frame)
    }
}

impl core::fmt::Display for StreamFrame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let eot = if self.is_eot() { " [EOT]" } else { "" };
        write!(f, "StreamFrame[{}]{}", self.sequence(), eot)
    }
}
