//! Golay(24,12) codec protecting the LICH chunks.
//!
//! Systematic code: the 12 data bits sit in the upper half of the 24-bit
//! codeword, the parity in the lower half. Corrects up to 3 bit errors.

use m17_core::bits::{SoftBit, SOFT_ONE, SOFT_ZERO};

/// Generator columns for the parity half, one entry per data bit
pub const ENCODE_MATRIX: [u16; 12] = [
    0x8EB, 0x93E, 0xA97, 0xDC6, 0x367, 0x6CD,
    0xD99, 0x3DA, 0x7B4, 0xF68, 0x63B, 0xC75,
];

/// Inverse matrix used by the algebraic branch of the hard decoder
pub const DECODE_MATRIX: [u16; 12] = [
    0xC75, 0x49F, 0x93E, 0x6E3, 0xDC6, 0xF13,
    0xAB9, 0x1ED, 0x3DA, 0x7B4, 0xF68, 0xA4F,
];

/// Soft decode gives up when the winning codeword is still further away
/// than four full bit flips.
const SDECODE_REJECT: u32 = 4 * SOFT_ONE as u32;

/// Encode a 12-bit value into a 24-bit codeword (data in the upper half).
pub fn golay24_encode(data: u16) -> u32 {
    let data = (data & 0x0FFF) as u32;
    ((data << 12) | syndrome(data as u16) as u32) & 0xFF_FFFF
}

fn syndrome(data: u16) -> u16 {
    let mut checksum = 0u16;
    for (i, &col) in ENCODE_MATRIX.iter().enumerate() {
        if data & (1 << i) != 0 {
            checksum ^= col;
        }
    }
    checksum
}

/// Hard decode a 24-bit codeword via staged syndrome search.
/// Returns the data word and the number of corrected errors, or None
/// when more than 3 bits are wrong.
pub fn golay24_decode(codeword: u32) -> Option<(u16, u32)> {
    let data = ((codeword >> 12) & 0xFFF) as u16;
    let parity = (codeword & 0xFFF) as u16;

    let s = parity ^ syndrome(data);
    let weight = s.count_ones();

    // All errors in the parity half
    if weight <= 3 {
        return Some((data, weight));
    }

    // One data error, up to two parity errors
    for i in 0..12 {
        let test = s ^ ENCODE_MATRIX[i];
        if test.count_ones() <= 2 {
            return Some((data ^ (1 << i), test.count_ones() + 1));
        }
    }

    // Two data errors, up to one parity error
    for i in 0..11 {
        for j in (i + 1)..12 {
            let test = s ^ ENCODE_MATRIX[i] ^ ENCODE_MATRIX[j];
            if test.count_ones() <= 1 {
                return Some((data ^ (1 << i) ^ (1 << j), test.count_ones() + 2));
            }
        }
    }

    // Algebraic pass through the inverse matrix
    let mut inv = 0u16;
    for (i, &col) in DECODE_MATRIX.iter().enumerate() {
        if s & (1 << i) != 0 {
            inv ^= col;
        }
    }

    // All errors in the data half
    if inv.count_ones() <= 3 {
        return Some((data ^ inv, inv.count_ones()));
    }

    // One parity error, up to two data errors
    for &col in DECODE_MATRIX.iter() {
        let test = inv ^ col;
        if test.count_ones() <= 2 {
            return Some((data ^ test, test.count_ones() + 1));
        }
    }

    None
}

/// Soft decode 24 soft bits (MSB first) by exhaustive minimum-distance
/// search over all 4096 codewords. Deterministic: on a distance tie the
/// numerically lowest codeword wins. Returns the data word and the
/// winning distance, which callers reuse as a chunk quality metric.
pub fn golay24_sdecode(soft: &[SoftBit]) -> Option<(u16, u32)> {
    assert_eq!(soft.len(), 24, "golay24_sdecode: need 24 soft bits");

    let mut best_data = 0u16;
    let mut best_dist = u32::MAX;

    for data in 0..4096u16 {
        let cw = golay24_encode(data);
        let mut dist = 0u32;
        for (i, &s) in soft.iter().enumerate() {
            let expected = if (cw >> (23 - i)) & 1 != 0 { SOFT_ONE } else { SOFT_ZERO };
            dist += s.abs_diff(expected) as u32;
        }
        if dist < best_dist {
            best_dist = dist;
            best_data = data;
        }
    }

    if best_dist >= SDECODE_REJECT {
        return None;
    }
    Some((best_data, best_dist))
}

/// Golay-protect a 6-byte LICH chunk: four 12-bit words become four
/// 24-bit codewords, 96 bits total.
pub fn encode_lich(chunk: &[u8; 6]) -> [u8; 12] {
    let words = [
        ((chunk[0] as u16) << 4) | (chunk[1] >> 4) as u16,
        (((chunk[1] & 0x0F) as u16) << 8) | chunk[2] as u16,
        ((chunk[3] as u16) << 4) | (chunk[4] >> 4) as u16,
        (((chunk[4] & 0x0F) as u16) << 8) | chunk[5] as u16,
    ];

    let mut out = [0u8; 12];
    for (w, &word) in words.iter().enumerate() {
        let cw = golay24_encode(word);
        out[w * 3] = (cw >> 16) as u8;
        out[w * 3 + 1] = (cw >> 8) as u8;
        out[w * 3 + 2] = cw as u8;
    }
    out
}

/// Recover a 6-byte LICH chunk from 96 soft bits. The returned metric is
/// the summed distance of the four codeword decisions (lower is better).
/// None when any codeword is beyond repair.
pub fn decode_lich(soft: &[SoftBit]) -> Option<([u8; 6], u32)> {
    assert_eq!(soft.len(), 96, "decode_lich: need 96 soft bits");

    let mut words = [0u16; 4];
    let mut metric = 0u32;
    for w in 0..4 {
        let (data, dist) = golay24_sdecode(&soft[w * 24..(w + 1) * 24])?;
        words[w] = data;
        metric += dist;
    }

    let mut chunk = [0u8; 6];
    chunk[0] = (words[0] >> 4) as u8;
    chunk[1] = ((words[0] & 0x0F) << 4) as u8 | (words[1] >> 8) as u8;
    chunk[2] = words[1] as u8;
    chunk[3] = (words[2] >> 4) as u8;
    chunk[4] = ((words[2] & 0x0F) << 4) as u8 | (words[3] >> 8) as u8;
    chunk[5] = words[3] as u8;
    Some((chunk, metric))
}
