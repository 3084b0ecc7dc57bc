//! Soft-decision Viterbi decoder for the K=5 rate-1/2 code.
//!
//! 16-state trellis. Branch metrics are summed absolute distances between
//! the expected outputs (0x0000/0xFFFF) and the received soft values, so a
//! 0x7FFF erasure loads both hypotheses equally and punctured positions
//! drop out of the decision. The four flush bits pin the final state to
//! zero, which is where traceback starts.

use crate::convenc::depuncture;
use m17_core::bits::{SoftBit, SOFT_ONE, SOFT_ZERO};

/// Constraint length of the code.
const K: usize = 5;

/// Number of states in the trellis (2^(K-1)).
const NUM_STATES: usize = 1 << (K - 1);

/// Type used to accumulate path metrics.
/// 32 bits leave ample headroom for the longest M17 frame (244 steps
/// of at most 0x1FFFE each).
type Metric = u32;

/// One decision bit per state and trellis step.
type DecisionBitmap = u16;

pub struct ViterbiDecoder {
    /// Expected (G1, G2) soft outputs for the transition into each state
    /// from its even-numbered predecessor. The odd predecessor produces
    /// the exact inverse, as does flipping the input bit.
    expected: [[SoftBit; 2]; NUM_STATES],
}

impl ViterbiDecoder {
    pub fn new() -> Self {
        let mut expected = [[SOFT_ZERO; 2]; NUM_STATES];
        for (state, exp) in expected.iter_mut().enumerate() {
            // state bit 3 is the input that caused the transition,
            // bits 2..0 are the younger three delay taps of the
            // even predecessor (whose oldest delay bit is zero)
            let input = ((state >> 3) & 1) as u8;
            let pred = (state << 1) & (NUM_STATES - 1);
            let d1 = ((pred >> 3) & 1) as u8;
            let d2 = ((pred >> 2) & 1) as u8;
            let d3 = ((pred >> 1) & 1) as u8;
            let d4 = (pred & 1) as u8;

            let g1 = input ^ d3 ^ d4;
            let g2 = input ^ d1 ^ d2 ^ d4;
            exp[0] = if g1 != 0 { SOFT_ONE } else { SOFT_ZERO };
            exp[1] = if g2 != 0 { SOFT_ONE } else { SOFT_ZERO };
        }
        Self { expected }
    }

    /// Decode soft bit pairs into the information bits, flush bits
    /// included. `received.len()` must be even.
    pub fn decode(&self, received: &[SoftBit]) -> Vec<u8> {
        assert!(received.len() % 2 == 0, "viterbi: odd number of soft bits");
        let steps = received.len() / 2;

        let mut decisions: Vec<DecisionBitmap> = Vec::with_capacity(steps);

        // Encoder starts in state 0; everything else gets half of the
        // metric range so it can never win early on.
        let mut metrics: [Metric; NUM_STATES] = [Metric::MAX / 2; NUM_STATES];
        metrics[0] = 0;

        for pair in received.chunks_exact(2) {
            let mut dec: DecisionBitmap = 0;

            let next: [Metric; NUM_STATES] = core::array::from_fn(|state| {
                let exp = self.expected[state];
                let bm_even = pair[0].abs_diff(exp[0]) as Metric
                    + pair[1].abs_diff(exp[1]) as Metric;
                // the odd predecessor expects the inverted outputs
                let bm_odd = 2 * SOFT_ONE as Metric - bm_even;

                let pred_even = (state << 1) & (NUM_STATES - 1);
                let pred_odd = pred_even | 1;
                let m_even = metrics[pred_even].saturating_add(bm_even);
                let m_odd = metrics[pred_odd].saturating_add(bm_odd);

                // ties break toward the lower-numbered predecessor
                if m_odd < m_even {
                    dec |= 1 << state;
                    m_odd
                } else {
                    m_even
                }
            });

            metrics = next;
            decisions.push(dec);
        }

        // Traceback. The flush bits force the encoder into state 0.
        let mut state = 0usize;
        let mut out = vec![0u8; steps];
        for (i, dec) in decisions.iter().enumerate().rev() {
            out[i] = ((state >> 3) & 1) as u8;
            let pred_bit = ((dec >> state) & 1) as usize;
            state = ((state << 1) & (NUM_STATES - 1)) | pred_bit;
        }
        out
    }

    /// Re-inflate a punctured stream to `coded_len` with erasures, then
    /// decode.
    pub fn decode_punctured(&self, received: &[SoftBit], pattern: &[u8], coded_len: usize) -> Vec<u8> {
        let full = depuncture(received, pattern, coded_len);
        self.decode(&full)
    }
}

impl Default for ViterbiDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot decode of an unpunctured soft stream.
pub fn viterbi_decode(received: &[SoftBit]) -> Vec<u8> {
    ViterbiDecoder::new().decode(received)
}

/// One-shot decode of a punctured soft stream whose unpunctured length
/// is `coded_len`.
pub fn viterbi_decode_punctured(received: &[SoftBit], pattern: &[u8], coded_len: usize) -> Vec<u8> {
    ViterbiDecoder::new().decode_punctured(received, pattern, coded_len)
}
