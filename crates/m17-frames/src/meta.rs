//! Decoded views of the 14-byte LSF META field.
//!
//! The META bytes are opaque on the wire; the TYPE field tags which of
//! these layouts applies. Each view codec is a plain to/from-bytes pair.

use m17_core::{Address, FrameError, META_SIZE};

/// Seconds from the Unix epoch to 2020-01-01T00:00:00Z, the epoch the
/// nonce timestamp counts from.
pub const EPOCH_2020: u64 = 1_577_836_800;

/// Latitude step in degrees per LSB of the signed 24-bit field
const LAT_SCALE: f64 = 180.0 / 8_388_608.0;
/// Longitude step in degrees per LSB
const LON_SCALE: f64 = 360.0 / 8_388_608.0;
/// Altitude offset in metres
const ALT_BIAS: f64 = 1500.0;

/// Origin of the position data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    None,
    GnssFix,
    GnssDeadReckoning,
    GnssLastKnown,
    UserInput,
    External,
    Unknown(u8),
}

impl DataSource {
    pub fn from_raw(x: u8) -> Self {
        match x {
            0 => DataSource::None,
            1 => DataSource::GnssFix,
            2 => DataSource::GnssDeadReckoning,
            3 => DataSource::GnssLastKnown,
            4 => DataSource::UserInput,
            5 => DataSource::External,
            other => DataSource::Unknown(other),
        }
    }

    pub fn into_raw(self) -> u8 {
        match self {
            DataSource::None => 0,
            DataSource::GnssFix => 1,
            DataSource::GnssDeadReckoning => 2,
            DataSource::GnssLastKnown => 3,
            DataSource::UserInput => 4,
            DataSource::External => 5,
            DataSource::Unknown(x) => x,
        }
    }
}

/// Kind of transmitting station
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationType {
    Fixed,
    Mobile,
    Portable,
    Unknown(u8),
}

impl StationType {
    pub fn from_raw(x: u8) -> Self {
        match x {
            0 => StationType::Fixed,
            1 => StationType::Mobile,
            2 => StationType::Portable,
            other => StationType::Unknown(other),
        }
    }

    pub fn into_raw(self) -> u8 {
        match self {
            StationType::Fixed => 0,
            StationType::Mobile => 1,
            StationType::Portable => 2,
            StationType::Unknown(x) => x,
        }
    }
}

/// GNSS position META block.
///
/// Layout: source(1) | station(1) | lat i24 | lon i24 | alt u16 biased
/// +1500 m | bearing u16 | speed u8 | reserved(1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetaPosition {
    pub data_source: DataSource,
    pub station_type: StationType,
    /// Degrees, south negative
    pub latitude: f64,
    /// Degrees, west negative
    pub longitude: f64,
    /// Metres above MSL, representable range -1500..64035
    pub altitude: f64,
    /// Degrees, 0..359
    pub bearing: u16,
    /// km/h, saturates at 255
    pub speed: u8,
}

impl Default for MetaPosition {
    fn default() -> Self {
        MetaPosition {
            data_source: DataSource::None,
            station_type: StationType::Fixed,
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
            bearing: 0,
            speed: 0,
        }
    }
}

impl MetaPosition {
    pub fn to_bytes(&self) -> [u8; META_SIZE] {
        let mut out = [0u8; META_SIZE];
        out[0] = self.data_source.into_raw();
        out[1] = self.station_type.into_raw();

        let lat = scale_i24(self.latitude / LAT_SCALE);
        out[2..5].copy_from_slice(&lat);
        let lon = scale_i24(self.longitude / LON_SCALE);
        out[5..8].copy_from_slice(&lon);

        let alt = (self.altitude + ALT_BIAS).round().clamp(0.0, 65535.0) as u16;
        out[8..10].copy_from_slice(&alt.to_be_bytes());
        out[10..12].copy_from_slice(&(self.bearing % 360).to_be_bytes());
        out[12] = self.speed;
        out
    }

    pub fn from_bytes(data: &[u8; META_SIZE]) -> Self {
        MetaPosition {
            data_source: DataSource::from_raw(data[0]),
            station_type: StationType::from_raw(data[1]),
            latitude: read_i24(&data[2..5]) as f64 * LAT_SCALE,
            longitude: read_i24(&data[5..8]) as f64 * LON_SCALE,
            altitude: u16::from_be_bytes([data[8], data[9]]) as f64 - ALT_BIAS,
            bearing: u16::from_be_bytes([data[10], data[11]]),
            speed: data[12],
        }
    }
}

fn scale_i24(value: f64) -> [u8; 3] {
    let v = value.round().clamp(-8_388_608.0, 8_388_607.0) as i32;
    let b = v.to_be_bytes();
    [b[1], b[2], b[3]]
}

fn read_i24(bytes: &[u8]) -> i32 {
    let sign = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    i32::from_be_bytes([sign, bytes[0], bytes[1], bytes[2]])
}

/// Extended Callsign Data: two extra routing callsigns plus 2 reserved bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaExtendedCallsign {
    pub callsign1: Address,
    pub callsign2: Address,
}

impl MetaExtendedCallsign {
    pub fn to_bytes(&self) -> [u8; META_SIZE] {
        let mut out = [0u8; META_SIZE];
        out[0..6].copy_from_slice(&self.callsign1.to_bytes());
        out[6..12].copy_from_slice(&self.callsign2.to_bytes());
        out
    }

    pub fn from_bytes(data: &[u8; META_SIZE]) -> Self {
        MetaExtendedCallsign {
            callsign1: Address::from_bytes(data[0..6].try_into().unwrap()),
            callsign2: Address::from_bytes(data[6..12].try_into().unwrap()),
        }
    }
}

/// Nonce META block for the scrambler and AES modes: 4-byte timestamp on
/// the 2020 epoch plus 10 bytes of counter state. The core routes these
/// bytes, it never interprets them cryptographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaNonce {
    /// Unix timestamp, seconds. Stored on the 2020 epoch, saturating below.
    pub timestamp: u64,
    pub ctr: [u8; 10],
}

impl MetaNonce {
    pub fn to_bytes(&self) -> [u8; META_SIZE] {
        let mut out = [0u8; META_SIZE];
        let ts = self.timestamp.saturating_sub(EPOCH_2020).min(u32::MAX as u64) as u32;
        out[0..4].copy_from_slice(&ts.to_be_bytes());
        out[4..14].copy_from_slice(&self.ctr);
        out
    }

    pub fn from_bytes(data: &[u8; META_SIZE]) -> Self {
        let ts = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        MetaNonce {
            timestamp: ts as u64 + EPOCH_2020,
            ctr: data[4..14].try_into().unwrap(),
        }
    }
}

/// One block of a multi-block text message.
///
/// Control byte: [BLOCK_COUNT:4][BLOCK_INDEX:4], index 1-based, followed
/// by 13 payload bytes. Up to 15 blocks carry 195 text bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaText {
    pub block_count: u8,
    pub block_index: u8,
    pub data: [u8; 13],
}

impl MetaText {
    pub fn to_bytes(&self) -> [u8; META_SIZE] {
        let mut out = [0u8; META_SIZE];
        out[0] = (self.block_count << 4) | (self.block_index & 0x0F);
        out[1..14].copy_from_slice(&self.data);
        out
    }

    pub fn from_bytes(data: &[u8; META_SIZE]) -> Result<Self, FrameError> {
        let block_count = data[0] >> 4;
        let block_index = data[0] & 0x0F;
        if block_count == 0 {
            return Err(FrameError::InvalidValue { field: "text_block_count", value: 0 });
        }
        if block_index == 0 || block_index > block_count {
            return Err(FrameError::InvalidValue {
                field: "text_block_index",
                value: block_index as u64,
            });
        }
        Ok(MetaText {
            block_count,
            block_index,
            data: data[1..14].try_into().unwrap(),
        })
    }

    /// Fragment a text message into META blocks, 13 bytes each.
    /// Splitting is byte-wise; the concatenation of all blocks decodes
    /// back to valid UTF-8 even if individual blocks do not.
    pub fn encode_blocks(text: &str) -> Result<Vec<MetaText>, FrameError> {
        let bytes = text.as_bytes();
        if bytes.len() > 13 * 15 {
            return Err(FrameError::InvalidLength {
                field: "text",
                expected: 195,
                found: bytes.len(),
            });
        }

        let count = bytes.chunks(13).count().max(1) as u8;
        let mut blocks = Vec::with_capacity(count as usize);
        for (i, chunk) in bytes.chunks(13).enumerate() {
            let mut data = [0u8; 13];
            data[..chunk.len()].copy_from_slice(chunk);
            blocks.push(MetaText { block_count: count, block_index: i as u8 + 1, data });
        }
        if blocks.is_empty() {
            blocks.push(MetaText { block_count: 1, block_index: 1, data: [0u8; 13] });
        }
        Ok(blocks)
    }

    /// Reassemble a message from blocks received in order.
    /// Missing, out-of-order or inconsistently counted blocks invalidate
    /// the whole collection.
    pub fn decode_blocks(blocks: &[MetaText]) -> Result<String, FrameError> {
        let first = blocks.first().ok_or(FrameError::MissingEnd)?;
        let count = first.block_count;
        if blocks.len() != count as usize {
            return Err(FrameError::InvalidLength {
                field: "text_blocks",
                expected: count as usize,
                found: blocks.len(),
            });
        }

        let mut bytes = Vec::with_capacity(13 * blocks.len());
        for (i, block) in blocks.iter().enumerate() {
            if block.block_count != count {
                return Err(FrameError::DuplicateMismatch { counter: block.block_index });
            }
            if block.block_index != i as u8 + 1 {
                return Err(FrameError::ChunkGap {
                    expected: i as u8 + 1,
                    found: block.block_index,
                });
            }
            bytes.extend_from_slice(&block.data);
        }

        while bytes.last() == Some(&0) {
            bytes.pop();
        }
        String::from_utf8(bytes)
            .map_err(|_| FrameError::InvalidValue { field: "text_utf8", value: 0 })
    }
}
