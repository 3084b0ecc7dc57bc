use crate::address::AddressError;

/// Errors reported while building or parsing M17 frames.
/// The core never logs or retries; every failure surfaces here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    InvalidLength { field: &'static str, expected: usize, found: usize },
    InvalidValue { field: &'static str, value: u64 },
    CrcMismatch { expected: u16, found: u16 },
    BadMagic { found: [u8; 4] },
    /// Golay or Viterbi could not recover a codeword within tolerance
    GolayDecodeFailure,
    /// Packet or LICH chunk arrived out of sequence
    ChunkGap { expected: u8, found: u8 },
    /// A chunk counter was seen twice with differing content
    DuplicateMismatch { counter: u8 },
    /// Reassembly ended without an end-of-packet chunk
    MissingEnd,
    UnsupportedVersion { type_field: u16 },
    Address(AddressError),
}

impl From<AddressError> for FrameError {
    fn from(e: AddressError) -> Self {
        FrameError::Address(e)
    }
}
