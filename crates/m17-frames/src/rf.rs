//! RF error control: frame bytes to sync-prefixed air frames and back.
//!
//! Transmit runs CRC/framing, convolutional encoding, puncturing,
//! interleaving and randomizing, then prefixes the sync word. Receive
//! inverts the chain, feeding soft bits through the Viterbi decoder.
//! Every frame type shares the 368-bit payload geometry; only the
//! puncture schedule and the sync word differ.

use crate::bert::{BertFrame, BERT_PAYLOAD_BITS};
use crate::lsf::Lsf;
use crate::packet::CHUNK_SIZE;
use crate::stream::StreamFrame;
use m17_core::bits::{bits_to_bytes, bytes_to_bits, soft_from_bit, SoftBit};
use m17_core::{FrameError, FRAME_PAYLOAD_BITS, RF_FRAME_BYTES, SYNC_BERT, SYNC_LSF, SYNC_PACKET, SYNC_STREAM};
use m17_codec::convenc::{conv_encode, puncture, PUNCTURE_P1, PUNCTURE_P2, PUNCTURE_P3};
use m17_codec::golay;
use m17_codec::interleaver::interleave_vec;
use m17_codec::randomizer::{randomize_bits, randomize_soft};
use m17_codec::viterbi::viterbi_decode_punctured;

/// A decoded stream frame together with the quality of its LICH chunk.
/// `lich_metric` is None when the Golay decode failed; the chunk bytes
/// are zeroed then and must not reach a collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDecoded {
    pub frame: StreamFrame,
    pub lich_metric: Option<u32>,
}

/// Interleave, randomize and pack 368 payload bits behind a sync word.
fn finalize_tx(bits: &[u8], sync: u16) -> Vec<u8> {
    debug_assert_eq!(bits.len(), FRAME_PAYLOAD_BITS);
    let mut interleaved = interleave_vec(bits);
    randomize_bits(&mut interleaved);

    let mut out = Vec::with_capacity(RF_FRAME_BYTES);
    out.extend_from_slice(&sync.to_be_bytes());
    out.extend_from_slice(&bits_to_bytes(&interleaved));
    out
}

/// Derandomize and deinterleave 368 received soft bits.
fn prepare_rx(soft: &[SoftBit]) -> Result<Vec<SoftBit>, FrameError> {
    if soft.len() != FRAME_PAYLOAD_BITS {
        return Err(FrameError::InvalidLength {
            field: "rf_payload",
            expected: FRAME_PAYLOAD_BITS,
            found: soft.len(),
        });
    }
    let mut derandomized = soft.to_vec();
    randomize_soft(&mut derandomized);
    Ok(interleave_vec(&derandomized))
}

/// Unwrap a hard 48-byte RF frame: check the sync word and widen the
/// 368 payload bits to the soft scale.
pub fn soft_from_rf_frame(frame: &[u8], expected_sync: u16) -> Result<Vec<SoftBit>, FrameError> {
    if frame.len() != RF_FRAME_BYTES {
        return Err(FrameError::InvalidLength {
            field: "rf_frame",
            expected: RF_FRAME_BYTES,
            found: frame.len(),
        });
    }
    let sync = u16::from_be_bytes([frame[0], frame[1]]);
    if sync != expected_sync {
        return Err(FrameError::InvalidValue { field: "sync_word", value: sync as u64 });
    }
    Ok(bytes_to_bits(&frame[2..], FRAME_PAYLOAD_BITS)
        .iter()
        .map(|&b| soft_from_bit(b))
        .collect())
}

// LSF ///////////////////////////////////////////////////////////////////////

/// LSF with CRC (240 bits) -> conv (488) -> P1 (368) -> air frame.
pub fn encode_lsf(lsf: &Lsf) -> Vec<u8> {
    let bits = bytes_to_bits(&lsf.to_bytes(), 240);
    let coded = conv_encode(&bits);
    let punctured = puncture(&coded, &PUNCTURE_P1);
    finalize_tx(&punctured, SYNC_LSF)
}

/// Decode 368 soft bits into an LSF, CRC verified.
pub fn decode_lsf(soft: &[SoftBit]) -> Result<Lsf, FrameError> {
    let deinterleaved = prepare_rx(soft)?;
    let bits = viterbi_decode_punctured(&deinterleaved, &PUNCTURE_P1, 488);
    let bytes = bits_to_bytes(&bits[..240]);
    Lsf::from_bytes(&bytes)
}

// Stream ////////////////////////////////////////////////////////////////////

/// Golay-protected LICH chunk (96 bits) followed by the conv+P2 coded
/// payload (272 bits). The 368 bits interleave and randomize together.
pub fn encode_stream(frame: &StreamFrame) -> Vec<u8> {
    let lich = golay::encode_lich(&frame.lich_chunk);
    let mut bits = bytes_to_bits(&lich, 96);

    let payload_bits = bytes_to_bits(&frame.payload_bytes(), 144);
    let coded = conv_encode(&payload_bits);
    bits.extend(puncture(&coded, &PUNCTURE_P2));

    finalize_tx(&bits, SYNC_STREAM)
}

/// Decode 368 soft bits into a stream frame. A LICH chunk the Golay
/// decoder cannot repair is dropped silently: the frame comes back with
/// a zeroed chunk and no metric, the payload still decodes.
pub fn decode_stream(soft: &[SoftBit]) -> Result<StreamDecoded, FrameError> {
    let deinterleaved = prepare_rx(soft)?;

    let (lich_chunk, lich_metric) = match golay::decode_lich(&deinterleaved[..96]) {
        Some((chunk, metric)) => (chunk, Some(metric)),
        None => ([0u8; 6], None),
    };

    let bits = viterbi_decode_punctured(&deinterleaved[96..], &PUNCTURE_P2, 296);
    let bytes = bits_to_bytes(&bits[..144]);
    let frame = StreamFrame::from_payload_bytes(lich_chunk, &bytes)?;

    Ok(StreamDecoded { frame, lich_metric })
}

// Packet ////////////////////////////////////////////////////////////////////

/// One 26-byte packet chunk (206 significant bits) -> conv (420) ->
/// P3 (368) -> air frame.
pub fn encode_packet_chunk(chunk: &[u8; CHUNK_SIZE]) -> Vec<u8> {
    let bits = bytes_to_bits(chunk, 206);
    let coded = conv_encode(&bits);
    let punctured = puncture(&coded, &PUNCTURE_P3);
    finalize_tx(&punctured, SYNC_PACKET)
}

/// Decode 368 soft bits into a 26-byte packet chunk.
pub fn decode_packet_chunk(soft: &[SoftBit]) -> Result<[u8; CHUNK_SIZE], FrameError> {
    let deinterleaved = prepare_rx(soft)?;
    let bits = viterbi_decode_punctured(&deinterleaved, &PUNCTURE_P3, 420);
    let bytes = bits_to_bytes(&bits[..206]);
    Ok(bytes.try_into().unwrap())
}

/// Encode every chunk of a packet into consecutive air frames.
pub fn encode_packet(packet: &crate::packet::Packet) -> Vec<Vec<u8>> {
    packet.chunks().iter().map(encode_packet_chunk).collect()
}

// BERT //////////////////////////////////////////////////////////////////////

/// 197 PRBS bits -> conv (402) -> P2 (369, truncated to 368) -> air
/// frame. The dropped tail position returns as an erasure on receive.
pub fn encode_bert(frame: &BertFrame) -> Vec<u8> {
    let bits = bytes_to_bits(&frame.payload, BERT_PAYLOAD_BITS);
    let coded = conv_encode(&bits);
    let mut punctured = puncture(&coded, &PUNCTURE_P2);
    punctured.truncate(FRAME_PAYLOAD_BITS);
    finalize_tx(&punctured, SYNC_BERT)
}

/// Decode 368 soft bits into a BERT frame.
pub fn decode_bert(soft: &[SoftBit]) -> Result<BertFrame, FrameError> {
    let deinterleaved = prepare_rx(soft)?;
    let bits = viterbi_decode_punctured(&deinterleaved, &PUNCTURE_P2, 402);
    let bytes = bits_to_bytes(&bits[..BERT_PAYLOAD_BITS]);
    Ok(BertFrame::from_payload(&bytes))
}
