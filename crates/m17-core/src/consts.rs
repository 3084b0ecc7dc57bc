// Protocol constants: sync words, frame geometry, address ranges

// Sync words (16-bit, big-endian on the wire) ///////////////////////////////

/// Link Setup Frame sync word
pub const SYNC_LSF: u16 = 0x55F7;
/// Stream frame sync word
pub const SYNC_STREAM: u16 = 0xFF5D;
/// Packet frame sync word
pub const SYNC_PACKET: u16 = 0x75FF;
/// BERT frame sync word
pub const SYNC_BERT: u16 = 0xDF55;
/// End of transmission marker
pub const EOT_MARKER: u16 = 0x555D;

// Frame geometry ////////////////////////////////////////////////////////////

/// Payload bits per RF frame, after puncturing
pub const FRAME_PAYLOAD_BITS: usize = 368;
/// Payload bytes per RF frame
pub const FRAME_PAYLOAD_BYTES: usize = 46;
/// Full RF frame: 2 sync bytes + 46 payload bytes
pub const RF_FRAME_BYTES: usize = 48;

/// LSF without CRC: DST(6) + SRC(6) + TYPE(2) + META(14)
pub const LSF_SIZE: usize = 28;
/// LSF with trailing CRC
pub const LSF_SIZE_WITH_CRC: usize = 30;
/// META field size within the LSF
pub const META_SIZE: usize = 14;

/// Stream payload bytes per frame
pub const STREAM_PAYLOAD_BYTES: usize = 16;
/// LICH chunk size (48 bits)
pub const LICH_CHUNK_SIZE: usize = 6;
/// Golay-protected LICH chunk size (96 bits)
pub const LICH_ENCODED_SIZE: usize = 12;
/// Number of LICH chunks that make up one LSF
pub const LICH_CHUNK_COUNT: usize = 6;

/// M17-over-IP frame size: MAGIC(4) + SID(2) + LSF(28) + FN(2) + PAYLOAD(16) + CRC(2)
pub const IP_FRAME_SIZE: usize = 54;
/// Magic number prefixing every M17-over-IP frame
pub const M17_MAGIC: [u8; 4] = *b"M17 ";
/// Default M17 UDP port
pub const DEFAULT_PORT: u16 = 17000;

// Addressing ////////////////////////////////////////////////////////////////

/// Base-40 callsign alphabet. Index 0 (space) doubles as the high-digit pad.
pub const CALLSIGN_ALPHABET: &[u8; 40] = b" ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-/.";

/// Largest regular callsign value (40^9 - 1)
pub const MAX_CALLSIGN_VALUE: u64 = 40u64.pow(9) - 1;
/// First hash-prefixed address (40^9)
pub const HASH_ADDRESS_MIN: u64 = 40u64.pow(9);
/// Last hash-prefixed address (40^9 + 40^8 - 1)
pub const HASH_ADDRESS_MAX: u64 = 40u64.pow(9) + 40u64.pow(8) - 1;
/// Broadcast address, textual form "@ALL"
pub const BROADCAST_ADDRESS: u64 = 0xFFFF_FFFF_FFFF;
