//! Link Setup Frame.
//!
//! 30 bytes on the wire: DST(6) | SRC(6) | TYPE(2) | META(14) | CRC(2),
//! the CRC covering the first 28. The TYPE field is kept raw and parsed
//! on demand; the META bytes are decoded lazily through the tag the TYPE
//! field carries.

use crate::meta::{MetaExtendedCallsign, MetaNonce, MetaPosition, MetaText};
use m17_core::crc16::{crc_m17, crc_m17_bytes};
use m17_core::type_field::{
    self, build_v3, detect_version, parse_v2, parse_v3, EncryptionType, M17Version, MetaType,
    PayloadType, TypeFieldV2, TypeFieldV3,
};
use m17_core::{Address, FrameError, LICH_CHUNK_COUNT, LSF_SIZE, LSF_SIZE_WITH_CRC, META_SIZE};

/// Decoded view of the META field, tagged by the TYPE field.
#[derive(Debug, Clone, PartialEq)]
pub enum Meta {
    None,
    Position(MetaPosition),
    ExtendedCallsign(MetaExtendedCallsign),
    Nonce(MetaNonce),
    AesIv([u8; META_SIZE]),
    Text(MetaText),
    /// META types the TYPE field does not map to a known layout
    Raw([u8; META_SIZE]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lsf {
    pub dst: Address,
    pub src: Address,
    pub type_field: u16,
    pub meta: [u8; META_SIZE],
}

impl Lsf {
    pub fn new(dst: Address, src: Address, type_field: u16) -> Self {
        Lsf { dst, src, type_field, meta: [0u8; META_SIZE] }
    }

    /// CRC over the 28 header bytes.
    pub fn crc(&self) -> u16 {
        crc_m17(&self.to_bytes_without_crc())
    }

    pub fn version(&self) -> M17Version {
        detect_version(self.type_field)
    }

    pub fn type_v2(&self) -> TypeFieldV2 {
        parse_v2(self.type_field)
    }

    pub fn type_v3(&self) -> TypeFieldV3 {
        parse_v3(self.type_field)
    }

    /// Which META layout the TYPE field selects.
    /// For v2 frames the encryption subtype fills that role while
    /// encryption is off; with encryption on the META carries the nonce.
    pub fn meta_type(&self) -> MetaType {
        match self.version() {
            M17Version::V3 => self.type_v3().meta,
            M17Version::V2 => {
                let tf = self.type_v2();
                if tf.encryption != EncryptionType::None {
                    return MetaType::Unknown(0xFF);
                }
                match tf.subtype {
                    type_field::EncryptionSubtype::Gnss => MetaType::Gnss,
                    type_field::EncryptionSubtype::ExtendedCallsign => MetaType::ExtendedCallsign,
                    _ => MetaType::None,
                }
            }
        }
    }

    /// Decode the META bytes through the TYPE tag.
    pub fn meta(&self) -> Result<Meta, FrameError> {
        if self.version() == M17Version::V2 {
            let tf = self.type_v2();
            if tf.encryption != EncryptionType::None {
                return Ok(Meta::Nonce(MetaNonce::from_bytes(&self.meta)));
            }
        }
        Ok(match self.meta_type() {
            MetaType::None => {
                if self.meta == [0u8; META_SIZE] {
                    Meta::None
                } else {
                    Meta::Raw(self.meta)
                }
            }
            MetaType::Gnss => Meta::Position(MetaPosition::from_bytes(&self.meta)),
            MetaType::ExtendedCallsign => {
                Meta::ExtendedCallsign(MetaExtendedCallsign::from_bytes(&self.meta))
            }
            MetaType::Text => Meta::Text(MetaText::from_bytes(&self.meta)?),
            MetaType::AesIv => Meta::AesIv(self.meta),
            MetaType::Unknown(_) => Meta::Raw(self.meta),
        })
    }

    // META setters. These fill the 14 bytes only; picking the matching
    // TYPE tag stays with the caller, the frame being a plain value.

    pub fn set_position(&mut self, position: &MetaPosition) {
        self.meta = position.to_bytes();
    }

    pub fn set_extended_callsign(&mut self, callsign1: Address, callsign2: Address) {
        self.meta = MetaExtendedCallsign { callsign1, callsign2 }.to_bytes();
    }

    pub fn set_nonce(&mut self, timestamp: u64, ctr: [u8; 10]) {
        self.meta = MetaNonce { timestamp, ctr }.to_bytes();
    }

    pub fn set_aes_iv(&mut self, iv: [u8; META_SIZE]) {
        self.meta = iv;
    }

    pub fn set_text_block(&mut self, block: &MetaText) {
        self.meta = block.to_bytes();
    }

    pub fn to_bytes_without_crc(&self) -> [u8; LSF_SIZE] {
        let mut out = [0u8; LSF_SIZE];
        out[0..6].copy_from_slice(&self.dst.to_bytes());
        out[6..12].copy_from_slice(&self.src.to_bytes());
        out[12..14].copy_from_slice(&self.type_field.to_be_bytes());
        out[14..28].copy_from_slice(&self.meta);
        out
    }

    pub fn to_bytes(&self) -> [u8; LSF_SIZE_WITH_CRC] {
        let mut out = [0u8; LSF_SIZE_WITH_CRC];
        out[0..28].copy_from_slice(&self.to_bytes_without_crc());
        let crc = crc_m17_bytes(&out[0..28]);
        out[28..30].copy_from_slice(&crc);
        out
    }

    /// Parse a 30-byte LSF, verifying the CRC.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FrameError> {
        if data.len() != LSF_SIZE_WITH_CRC {
            return Err(FrameError::InvalidLength {
                field: "lsf",
                expected: LSF_SIZE_WITH_CRC,
                found: data.len(),
            });
        }
        let expected = crc_m17(&data[0..28]);
        let found = u16::from_be_bytes([data[28], data[29]]);
        if expected != found {
            return Err(FrameError::CrcMismatch { expected, found });
        }
        Ok(Self::from_header_bytes(data[0..28].try_into().unwrap()))
    }

    /// Parse the 28 header bytes without a CRC, as embedded in IP frames.
    pub fn from_header_bytes(data: &[u8; LSF_SIZE]) -> Self {
        Lsf {
            dst: Address::from_bytes(data[0..6].try_into().unwrap()),
            src: Address::from_bytes(data[6..12].try_into().unwrap()),
            type_field: u16::from_be_bytes([data[12], data[13]]),
            meta: data[14..28].try_into().unwrap(),
        }
    }

    /// Cut the 240 frame bits into six 40-bit LICH chunks. Each chunk
    /// carries its 3-bit counter in the top bits of the sixth byte.
    pub fn lich_chunks(&self) -> [[u8; 6]; LICH_CHUNK_COUNT] {
        let bytes = self.to_bytes();
        core::array::from_fn(|i| {
            let mut chunk = [0u8; 6];
            chunk[0..5].copy_from_slice(&bytes[i * 5..i * 5 + 5]);
            chunk[5] = (i as u8) << 5;
            chunk
        })
    }

    /// Fragment a text message into a sequence of v3 LSFs, one META
    /// block each, ready for transmission on consecutive frames.
    pub fn create_text_message_frames(
        dst: Address,
        src: Address,
        text: &str,
    ) -> Result<Vec<Lsf>, FrameError> {
        let type_field = build_v3(
            PayloadType::DataOnly,
            type_field::Encryption::None,
            false,
            MetaType::Text,
            0,
        );
        let blocks = MetaText::encode_blocks(text)?;
        Ok(blocks
            .iter()
            .map(|block| {
                let mut lsf = Lsf::new(dst, src, type_field);
                lsf.set_text_block(block);
                lsf
            })
            .collect())
    }
}

impl core::fmt::Display for Lsf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "LSF: {} -> {} [type=0x{:04x}]", self.src, self.dst, self.type_field)
    }
}
