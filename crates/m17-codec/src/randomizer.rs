//! Payload whitening.
//!
//! A fixed 46-byte sequence is XORed MSB-first over the 368 frame bits to
//! keep the symbol stream DC-balanced. The operation is its own inverse.

use m17_core::bits::{SoftBit, SOFT_ONE};

/// 46-byte randomizing sequence
pub const RAND_SEQ: [u8; 46] = [
    0xD6, 0xB5, 0xE2, 0x30, 0x82, 0xFF, 0x84, 0x62, 0xBA, 0x4E,
    0x96, 0x90, 0xD8, 0x98, 0xDD, 0x5D, 0x0C, 0xC8, 0x52, 0x43,
    0x91, 0x1D, 0xF8, 0x6E, 0x68, 0x2F, 0x35, 0xDA, 0x14, 0xEA,
    0xCD, 0x76, 0x19, 0x8D, 0xD5, 0x80, 0xD1, 0x33, 0x87, 0x13,
    0x57, 0x18, 0x2D, 0x29, 0x78, 0xC3,
];

#[inline]
fn rand_bit(i: usize) -> u8 {
    (RAND_SEQ[i / 8] >> (7 - (i % 8))) & 1
}

/// XOR the whitening sequence into 368 hard bits, in place.
pub fn randomize_bits(bits: &mut [u8]) {
    assert!(bits.len() >= 368, "randomize_bits: need 368 bits");
    for (i, bit) in bits.iter_mut().take(368).enumerate() {
        *bit ^= rand_bit(i);
    }
}

/// Mirror soft values where the whitening sequence has a 1, in place.
/// An erasure maps onto itself.
pub fn randomize_soft(soft: &mut [SoftBit]) {
    assert!(soft.len() >= 368, "randomize_soft: need 368 soft bits");
    for (i, s) in soft.iter_mut().take(368).enumerate() {
        if rand_bit(i) != 0 {
            *s = SOFT_ONE - *s;
        }
    }
}
