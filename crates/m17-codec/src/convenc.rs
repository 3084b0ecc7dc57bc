//! Convolutional encoder and puncturing for M17.
//!
//! K=5 rate-1/2 code, generators G1 = 0x19 and G2 = 0x17, fed MSB first.
//! Frames are terminated with four zero bits so the encoder always ends
//! in the all-zero state.

use m17_core::bits::{SoftBit, SOFT_ERASURE};

pub const POLY_G1: u8 = 0x19;
pub const POLY_G2: u8 = 0x17;

/// State for the rate-1/2 convolutional encoder.
#[derive(Clone, Copy, Debug)]
pub struct ConvEncState {
    delayed: [u8; 4],
}

impl ConvEncState {
    /// Create a new encoder state (all zeros).
    #[inline]
    pub fn new() -> Self {
        Self { delayed: [0; 4] }
    }

    /// Reset to all-zero state.
    #[inline]
    pub fn reset(&mut self) {
        self.delayed = [0; 4];
    }

    /// Encode a single input bit into the (G1, G2) output pair.
    #[inline(always)]
    pub fn encode_bit(&mut self, bit: u8) -> (u8, u8) {
        let d = self.delayed;

        // G1 = 0x19: taps on the input and the 3rd/4th delay
        let g1 = bit ^ d[2] ^ d[3];
        // G2 = 0x17: taps on the input and the 1st/2nd/4th delay
        let g2 = bit ^ d[0] ^ d[1] ^ d[3];

        // shift register
        self.delayed[3] = d[2];
        self.delayed[2] = d[1];
        self.delayed[1] = d[0];
        self.delayed[0] = bit;

        (g1, g2)
    }

    /// Encode a bit-per-byte slice into `2 * input.len()` output bits.
    /// Panics if `output` is too short.
    pub fn encode(&mut self, input: &[u8], output: &mut [u8]) {
        assert!(output.len() >= input.len() * 2);
        for (i, &bit) in input.iter().enumerate() {
            let (g1, g2) = self.encode_bit(bit);
            output[i * 2] = g1;
            output[i * 2 + 1] = g2;
        }
    }
}

impl Default for ConvEncState {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a frame: appends the four flush bits, so N input bits produce
/// 2*(N+4) coded bits and the trellis terminates in state zero.
pub fn conv_encode(bits: &[u8]) -> Vec<u8> {
    let mut enc = ConvEncState::new();
    let mut out = vec![0u8; (bits.len() + 4) * 2];
    enc.encode(bits, &mut out);
    for i in 0..4 {
        let (g1, g2) = enc.encode_bit(0);
        out[(bits.len() + i) * 2] = g1;
        out[(bits.len() + i) * 2 + 1] = g2;
    }
    out
}

// Puncture schedules ////////////////////////////////////////////////////////

/// P1, Link Setup Frames: keeps 46 of every 61 bits, 488 -> 368
pub const PUNCTURE_P1: [u8; 61] = [
    1,
    1, 0, 1, 1, 1, 0, 1, 1, 1, 0, 1, 1, 1, 0, 1, 1, 1, 0, 1, 1,
    1, 0, 1, 1, 1, 0, 1, 1, 1, 0, 1, 1, 1, 0, 1, 1, 1, 0, 1, 1,
    1, 0, 1, 1, 1, 0, 1, 1, 1, 0, 1, 1, 1, 0, 1, 1, 1, 0, 1, 1,
];

/// P2, stream and BERT frames: drops every 12th bit, 296 -> 272
pub const PUNCTURE_P2: [u8; 12] = [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0];

/// P3, packet frames: drops every 8th bit, 420 -> 368
pub const PUNCTURE_P3: [u8; 8] = [1, 1, 1, 1, 1, 1, 1, 0];

/// Drop the bits the repeating pattern marks with 0.
pub fn puncture(bits: &[u8], pattern: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bits.len());
    let mut p = 0;
    for &bit in bits {
        if pattern[p] != 0 {
            out.push(bit);
        }
        p = (p + 1) % pattern.len();
    }
    out
}

/// Re-inflate a punctured stream to its original `coded_len` by
/// inserting erasures at the punctured positions. Kept positions beyond
/// the received bits also become erasures, which regenerates the tail a
/// transmitter truncated to hit the frame size (BERT).
pub fn depuncture(soft: &[SoftBit], pattern: &[u8], coded_len: usize) -> Vec<SoftBit> {
    let mut out = Vec::with_capacity(coded_len);
    let mut idx = 0;

    for i in 0..coded_len {
        if pattern[i % pattern.len()] != 0 && idx < soft.len() {
            out.push(soft[idx]);
            idx += 1;
        } else {
            out.push(SOFT_ERASURE);
        }
    }
    debug_assert_eq!(idx, soft.len(), "depuncture: leftover received bits");

    out
}
